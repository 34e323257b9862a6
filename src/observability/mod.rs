//! Observability module
//!
//! Structured logging setup and helpers for keeping secrets and control
//! characters out of log output.

pub mod telemetry;
