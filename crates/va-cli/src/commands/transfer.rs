use std::path::PathBuf;

use anyhow::Context;
use serde_json::json;
use va_client::file_name_of;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::{ExportArgs, ImportArgs};
use crate::context::AppContext;
use crate::messages::Message;
use crate::output::output;
use crate::progress::Progress;

/// Handle `valan export`.
pub async fn handle_export(
    args: &ExportArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let spinner = Progress::spinner(&args.session);
    let archive = match ctx.client.export_session(&args.session).await {
        Ok(archive) => archive,
        Err(error) => {
            spinner.finish_err(Message::ExportFailed.text(ctx.lang));
            return Err(error).context(Message::ExportFailed.text(ctx.lang));
        }
    };
    spinner.finish_clear();

    let path = export_path(args.output.clone(), archive.file_name.as_deref(), &args.session);
    tokio::fs::write(&path, &archive.bytes)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;

    output(
        &json!({
            "session_id": args.session,
            "path": path.display().to_string(),
            "bytes": archive.bytes.len(),
            "message": Message::Exported.text(ctx.lang),
        }),
        flags.format,
    )
}

/// Handle `valan import`.
pub async fn handle_import(
    args: &ImportArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let response = ctx
        .client
        .import_session(&args.archive)
        .await
        .with_context(|| Message::ImportFailed.text(ctx.lang))?;

    output(
        &json!({
            "session_id": response.session_id,
            "message": Message::Imported.text(ctx.lang),
            "backend_message": response.message,
        }),
        flags.format,
    )
}

/// Explicit path, else the backend's suggested name (last segment only, into
/// the working directory), else `session-{id}.zip`.
fn export_path(explicit: Option<PathBuf>, suggested: Option<&str>, session_id: &str) -> PathBuf {
    explicit.unwrap_or_else(|| {
        suggested
            .map(file_name_of)
            .map(|name| name.trim_start_matches('.'))
            .filter(|name| !name.is_empty())
            .map_or_else(|| PathBuf::from(format!("session-{session_id}.zip")), PathBuf::from)
    })
}
