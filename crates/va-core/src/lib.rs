//! # va-core
//!
//! Core types shared across the Value Analyst client crates:
//! - The five fixed analysis steps and their per-step status
//! - Backend wire shape of a session and the reconciled view model
//! - Session-list status heuristic and localized labels
//! - Citation values produced by the report renderer
//! - Cross-cutting error types

pub mod entities;
pub mod enums;
pub mod errors;

pub use entities::{AnalysisSession, BackendSession, Citation, StepRecord};
pub use enums::{AnalysisStep, Language, ListStatus, StepStatus};
pub use errors::CoreError;
