//! Which screen is showing, and which sidebar unit is open.

use std::collections::BTreeSet;
use std::fmt;

use crate::content::Catalogue;
use crate::errors::{ContentError, QuizError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Home,
    Review,
    Quiz,
    DeepDive,
}

impl ViewMode {
    pub fn label(self) -> &'static str {
        match self {
            ViewMode::Home => "首页",
            ViewMode::Review => "提纲",
            ViewMode::Quiz => "测验",
            ViewMode::DeepDive => "问纲哥",
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone)]
pub struct Navigator {
    view: ViewMode,
    active_lesson: Option<u32>,
    expanded_units: BTreeSet<String>,
}

impl Navigator {
    /// Home screen, no lesson, the first unit open.
    pub fn new(catalogue: &Catalogue) -> Self {
        let expanded_units = catalogue
            .units()
            .first()
            .map(|u| BTreeSet::from([u.to_string()]))
            .unwrap_or_default();
        Self {
            view: ViewMode::Home,
            active_lesson: None,
            expanded_units,
        }
    }

    pub fn view(&self) -> ViewMode {
        self.view
    }

    pub fn active_lesson(&self) -> Option<u32> {
        self.active_lesson
    }

    pub fn is_expanded(&self, unit: &str) -> bool {
        self.expanded_units.contains(unit)
    }

    /// Open a lesson in review and expand only its unit.
    pub fn select_lesson(&mut self, catalogue: &Catalogue, id: u32) -> Result<(), ContentError> {
        let lesson = catalogue.require(id)?;
        self.active_lesson = Some(id);
        self.view = ViewMode::Review;
        self.expanded_units = BTreeSet::from([lesson.unit.clone()]);
        Ok(())
    }

    /// Accordion: close the unit if open, otherwise open it alone.
    pub fn toggle_unit(&mut self, unit: &str) {
        if !self.expanded_units.remove(unit) {
            self.expanded_units = BTreeSet::from([unit.to_string()]);
        }
    }

    pub fn go_home(&mut self) {
        self.active_lesson = None;
        self.view = ViewMode::Home;
    }

    pub fn switch_view(&mut self, view: ViewMode) -> Result<(), QuizError> {
        if view == ViewMode::Home {
            self.go_home();
            return Ok(());
        }
        if self.active_lesson.is_none() {
            return Err(QuizError::NoLessonSelected);
        }
        self.view = view;
        Ok(())
    }

    /// The home screen's start button: open the first lesson.
    pub fn start(&mut self, catalogue: &Catalogue) -> Result<(), ContentError> {
        self.select_lesson(catalogue, catalogue.first().id)
    }
}
