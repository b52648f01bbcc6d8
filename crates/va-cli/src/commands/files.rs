use anyhow::Context;
use serde_json::json;
use va_client::file_name_of;
use va_sync::to_static_path;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::{AddFileArgs, DeleteFileArgs, UploadArgs};
use crate::context::AppContext;
use crate::messages::Message;
use crate::output::output;
use crate::progress::Progress;

/// Handle `valan upload`.
pub async fn handle_upload(
    args: &UploadArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let spinner = Progress::spinner(&args.file.display().to_string());
    let response = match ctx.client.upload(&args.file).await {
        Ok(response) => response,
        Err(error) => {
            spinner.finish_err(Message::UploadFailed.text(ctx.lang));
            return Err(error).context(Message::UploadFailed.text(ctx.lang));
        }
    };
    spinner.finish_clear();

    output(
        &json!({
            "session_id": response.session_id,
            "message": Message::UploadSucceeded.text(ctx.lang),
            "backend_message": response.message,
            "file_path": response.file_path,
        }),
        flags.format,
    )
}

/// Handle `valan add-file`.
pub async fn handle_add(
    args: &AddFileArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let spinner = Progress::spinner(&args.file.display().to_string());
    let response = match ctx.client.add_file(&args.session, &args.file).await {
        Ok(response) => response,
        Err(error) => {
            spinner.finish_err(Message::AddFileFailed.text(ctx.lang));
            return Err(error).context(Message::AddFileFailed.text(ctx.lang));
        }
    };
    spinner.finish_clear();

    let files: Vec<String> = response
        .file_paths
        .iter()
        .map(|path| to_static_path(path))
        .collect();
    output(
        &json!({
            "session_id": args.session,
            "message": Message::FileAdded.text(ctx.lang),
            "backend_message": response.message,
            "files": files,
        }),
        flags.format,
    )
}

/// Handle `valan delete-file`.
pub async fn handle_delete(
    args: &DeleteFileArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let ack = ctx
        .client
        .delete_file(&args.session, &args.file)
        .await
        .with_context(|| Message::DeleteFailed.text(ctx.lang))?;

    output(
        &json!({
            "session_id": args.session,
            "file": file_name_of(&args.file),
            "message": Message::FileDeleted.text(ctx.lang),
            "backend_message": ack.message,
        }),
        flags.format,
    )
}
