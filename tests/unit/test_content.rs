//! Unit tests for the lesson catalogue
//!
//! Tests cover:
//! - Bundled catalogue integrity
//! - Validation of custom catalogues
//! - Answer splitting and display lines
//! - Tutor context text

use tigang::content::{format_answer_lines, split_points, unit_label, Catalogue};
use tigang::errors::ContentError;

mod bundled_tests {
    use super::*;

    #[test]
    fn test_bundled_catalogue_loads() {
        let catalogue = Catalogue::bundled().unwrap();
        assert!(!catalogue.lessons().is_empty());
        assert_eq!(catalogue.first().id, 1);
    }

    #[test]
    fn test_every_lesson_has_questions() {
        let catalogue = Catalogue::bundled().unwrap();
        for lesson in catalogue.lessons() {
            assert!(!lesson.qa.is_empty(), "lesson {} is empty", lesson.id);
            assert!(!lesson.title.is_empty());
            assert!(!lesson.unit.is_empty());
        }
    }

    #[test]
    fn test_grouping_keeps_catalogue_order() {
        let catalogue = Catalogue::bundled().unwrap();
        let flattened: Vec<u32> = catalogue
            .grouped()
            .into_iter()
            .flat_map(|(_, lessons)| lessons.into_iter().map(|l| l.id))
            .collect();
        let ids: Vec<u32> = catalogue.lessons().iter().map(|l| l.id).collect();
        assert_eq!(flattened, ids);
        assert_eq!(catalogue.units().len(), catalogue.grouped().len());
    }

    #[test]
    fn test_unit_labels_are_short() {
        let catalogue = Catalogue::bundled().unwrap();
        for unit in catalogue.units() {
            let label = unit_label(unit);
            assert!(label.ends_with("单元"), "unexpected label {}", label);
        }
    }

    #[test]
    fn test_full_context_mentions_every_lesson() {
        let catalogue = Catalogue::bundled().unwrap();
        let context = catalogue.full_context();
        for lesson in catalogue.lessons() {
            assert!(context.contains(&lesson.title));
        }
    }

    #[test]
    fn test_lesson_context_contains_questions_and_answers() {
        let catalogue = Catalogue::bundled().unwrap();
        let lesson = catalogue.first();
        let context = lesson.context();
        for qa in &lesson.qa {
            assert!(context.contains(&qa.question));
            assert!(context.contains(&qa.answer));
        }
    }
}

mod validation_tests {
    use super::*;

    #[test]
    fn test_empty_catalogue_rejected() {
        assert!(matches!(Catalogue::from_json("[]"), Err(ContentError::Empty)));
    }

    #[test]
    fn test_duplicate_lesson_rejected() {
        let raw = r#"[
            {"id": 1, "title": "a", "unit": "u", "qa": [{"id": 1, "question": "q", "answer": "a"}]},
            {"id": 1, "title": "b", "unit": "u", "qa": [{"id": 1, "question": "q", "answer": "a"}]}
        ]"#;
        assert!(matches!(
            Catalogue::from_json(raw),
            Err(ContentError::DuplicateLesson(1))
        ));
    }

    #[test]
    fn test_lesson_without_questions_rejected() {
        let raw = r#"[{"id": 7, "title": "a", "unit": "u", "qa": []}]"#;
        assert!(matches!(
            Catalogue::from_json(raw),
            Err(ContentError::NoQuestions(7))
        ));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        assert!(matches!(
            Catalogue::from_json("{not json"),
            Err(ContentError::Parse(_))
        ));
    }

    #[test]
    fn test_from_path_missing_file() {
        let result = Catalogue::from_path(std::path::Path::new("/nonexistent/lessons.json"));
        assert!(matches!(result, Err(ContentError::Parse(_))));
    }

    #[test]
    fn test_from_path_reads_custom_catalogue() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lessons.json");
        std::fs::write(
            &path,
            r#"[{"id": 3, "title": "第3课 太平天国运动", "unit": "第一单元 x", "qa": [{"id": 1, "question": "q", "answer": "a"}]}]"#,
        )
        .unwrap();
        let catalogue = Catalogue::from_path(&path).unwrap();
        assert_eq!(catalogue.first().id, 3);
        assert!(catalogue.select("太平").is_ok());
    }
}

mod answer_tests {
    use super::*;

    #[test]
    fn test_split_points_on_circled_numbers() {
        let parts = split_points("①割香港岛；②赔款2100万元；③五口通商");
        assert_eq!(parts, vec!["①割香港岛；", "②赔款2100万元；", "③五口通商"]);
    }

    #[test]
    fn test_split_points_without_markers() {
        assert_eq!(split_points("打开中国市场"), vec!["打开中国市场"]);
        assert_eq!(split_points(""), vec![""]);
    }

    #[test]
    fn test_split_points_keeps_leading_text() {
        let parts = split_points("意义：①第一②第二");
        assert_eq!(parts, vec!["意义：", "①第一", "②第二"]);
    }

    #[test]
    fn test_format_answer_lines_breaks_after_semicolons() {
        let lines = format_answer_lines("政治上，开始沦为半殖民地；经济上，开始卷入世界市场");
        assert_eq!(
            lines,
            vec!["政治上，开始沦为半殖民地；", "经济上，开始卷入世界市场"]
        );
    }
}
