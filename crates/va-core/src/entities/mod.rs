//! Entity structs for the Value Analyst client.

pub mod citation;
pub mod session;

pub use citation::Citation;
pub use session::{AnalysisSession, BackendSession, StepRecord};
