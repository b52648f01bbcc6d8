use anyhow::{Context, bail};
use va_sync::{ViewState, reconcile};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::ShowArgs;
use crate::commands::shared::report::{StepReport, print_report};
use crate::context::AppContext;
use crate::messages::Message;

/// Handle `valan show`.
pub async fn handle(args: &ShowArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let raw = ctx
        .client
        .get_session(&args.session)
        .await
        .with_context(|| Message::LoadFailed.text(ctx.lang))?;
    let step = args.step.unwrap_or(ctx.config.general.default_step);
    let mut state = ViewState::with_session(reconcile(raw), step);

    let mut report = build(&state, ctx)?;
    if let Some(ordinal) = args.cite {
        let Some(citation) = report.citation(ordinal) else {
            bail!("{} (^{ordinal})", Message::CitationNotFound.text(ctx.lang));
        };
        state.apply_citation(citation);
        report = build(&state, ctx)?;
    }

    print_report(&report, state.current_file.as_deref(), flags)
}

fn build(state: &ViewState, ctx: &AppContext) -> anyhow::Result<StepReport> {
    StepReport::from_state(state, &ctx.client, ctx.lang)
        .context(Message::LoadFailed.text(ctx.lang))
}
