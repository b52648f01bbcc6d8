use anyhow::Context;
use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::AnalyzeArgs;
use crate::context::AppContext;
use crate::messages::Message;
use crate::output::output;

/// Handle `valan analyze`.
pub async fn handle(args: &AnalyzeArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let response = ctx
        .client
        .analyze(&args.session, args.step)
        .await
        .with_context(|| Message::AnalyzeFailed.text(ctx.lang))?;

    let message = if response.already_running() {
        Message::AnalysisAlreadyRunning
    } else {
        Message::AnalysisStarted
    };
    output(
        &json!({
            "session_id": args.session,
            "step": args.step,
            "status": response.status,
            "message": message.text(ctx.lang),
            "backend_message": response.message,
        }),
        flags.format,
    )
}
