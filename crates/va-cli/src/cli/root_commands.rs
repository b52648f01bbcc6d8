use std::path::PathBuf;

use clap::{Args, Subcommand};
use va_core::AnalysisStep;

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// List analysis sessions.
    Sessions,
    /// Upload a report (PDF) and create a new session.
    Upload(UploadArgs),
    /// Add another document to an existing session.
    #[command(name = "add-file")]
    AddFile(AddFileArgs),
    /// Trigger one analysis step.
    Analyze(AnalyzeArgs),
    /// Remove a document from a session.
    #[command(name = "delete-file")]
    DeleteFile(DeleteFileArgs),
    /// Fetch a session once and print a step's report with its citations.
    Show(ShowArgs),
    /// Poll a session until a step finishes, then print its report.
    Watch(WatchArgs),
    /// Download a session backup (zip).
    Export(ExportArgs),
    /// Restore a session from a backup zip.
    Import(ImportArgs),
    /// Interactive workbench over one or more sessions.
    Open(OpenArgs),
    /// Dump JSON schema for a view type.
    Schema(SchemaArgs),
}

/// Arguments for `valan upload`.
#[derive(Clone, Debug, Args)]
pub struct UploadArgs {
    /// Report to upload.
    pub file: PathBuf,
}

/// Arguments for `valan add-file`.
#[derive(Clone, Debug, Args)]
pub struct AddFileArgs {
    pub session: String,
    pub file: PathBuf,
}

/// Arguments for `valan analyze`.
#[derive(Clone, Debug, Args)]
pub struct AnalyzeArgs {
    pub session: String,
    /// business, mda, financial, competitor, valuation (or 1-5)
    pub step: AnalysisStep,
}

/// Arguments for `valan delete-file`.
#[derive(Clone, Debug, Args)]
pub struct DeleteFileArgs {
    pub session: String,
    /// Static path (`/static/...`) or bare file name.
    pub file: String,
}

/// Arguments for `valan show`.
#[derive(Clone, Debug, Args)]
pub struct ShowArgs {
    pub session: String,
    /// Step to show (defaults to general.default_step).
    #[arg(short, long)]
    pub step: Option<AnalysisStep>,
    /// Resolve citation N of the report to a document location.
    #[arg(long)]
    pub cite: Option<usize>,
}

/// Arguments for `valan watch`.
#[derive(Clone, Debug, Args)]
pub struct WatchArgs {
    pub session: String,
    /// Step to follow (defaults to general.default_step).
    #[arg(short, long)]
    pub step: Option<AnalysisStep>,
    /// Trigger the step before watching.
    #[arg(long)]
    pub run: bool,
}

/// Arguments for `valan export`.
#[derive(Clone, Debug, Args)]
pub struct ExportArgs {
    pub session: String,
    /// Output path (defaults to the name suggested by the backend).
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for `valan import`.
#[derive(Clone, Debug, Args)]
pub struct ImportArgs {
    /// Backup zip produced by `valan export`.
    pub archive: PathBuf,
}

/// Arguments for `valan open`.
#[derive(Clone, Debug, Args)]
pub struct OpenArgs {
    /// Session to open right away.
    pub session: Option<String>,
}

/// Arguments for `valan schema`.
#[derive(Clone, Debug, Args)]
pub struct SchemaArgs {
    /// session, backend-session, step-record, citation
    pub type_name: String,
}
