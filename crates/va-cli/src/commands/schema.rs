use anyhow::bail;
use schemars::schema_for;
use va_core::{AnalysisSession, BackendSession, Citation, StepRecord};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::SchemaArgs;
use crate::output::output;

/// Handle `valan schema`.
pub fn handle(args: &SchemaArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let schema = match args.type_name.trim().to_ascii_lowercase().as_str() {
        "session" | "analysis-session" => schema_for!(AnalysisSession),
        "backend-session" => schema_for!(BackendSession),
        "step-record" | "step" => schema_for!(StepRecord),
        "citation" => schema_for!(Citation),
        other => bail!(
            "unknown schema type '{other}' (expected session, backend-session, step-record, citation)"
        ),
    };
    output(&schema, flags.format)
}
