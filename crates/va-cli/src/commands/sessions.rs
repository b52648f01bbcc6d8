use anyhow::Context;
use va_sync::reconcile;

use crate::cli::GlobalFlags;
use crate::commands::shared::views::SessionRow;
use crate::context::AppContext;
use crate::messages::Message;
use crate::output::output;

/// Handle `valan sessions`.
pub async fn handle(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let rows = list_rows(ctx).await?;
    output(&rows, flags.format)
}

/// Every session the backend knows, newest first as returned.
pub async fn list_rows(ctx: &AppContext) -> anyhow::Result<Vec<SessionRow>> {
    let sessions = ctx
        .client
        .list_sessions()
        .await
        .with_context(|| Message::LoadFailed.text(ctx.lang))?;
    tracing::debug!(count = sessions.len(), "sessions listed");

    Ok(sessions
        .into_iter()
        .map(reconcile)
        .map(|session| SessionRow::from_session(&session, ctx.lang))
        .collect())
}
