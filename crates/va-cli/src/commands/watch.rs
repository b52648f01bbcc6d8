use anyhow::Context;
use va_core::{AnalysisStep, StepRecord, StepStatus};
use va_sync::{ViewState, reconcile};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::WatchArgs;
use crate::commands::shared::report::{StepReport, print_report};
use crate::context::AppContext;
use crate::messages::Message;
use crate::progress::Progress;

/// Handle `valan watch`.
pub async fn handle(args: &WatchArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let step = args.step.unwrap_or(ctx.config.general.default_step);

    let mut tracker = if args.run {
        let before = ctx
            .client
            .get_session(&args.session)
            .await
            .with_context(|| Message::LoadFailed.text(ctx.lang))?;
        let before = reconcile(before).step(step).clone();
        ctx.client
            .analyze(&args.session, step)
            .await
            .with_context(|| Message::AnalyzeFailed.text(ctx.lang))?;
        Completion::after_run(step, before)
    } else {
        Completion::passive(step)
    };

    let sync = ctx.synchronizer();
    sync.select_step(step);
    sync.open_session(&args.session);
    let mut rx = sync.subscribe();

    let spinner = Progress::spinner(&format!(
        "{}: {}",
        Message::Waiting.text(ctx.lang),
        step.title(ctx.lang)
    ));

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let interrupted = loop {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break true;
                }
                let state = rx.borrow_and_update().clone();
                let Some(status) = tracker.observe(&state) else {
                    continue;
                };
                spinner.set_message(&format!(
                    "{}: {} [{}]",
                    Message::Waiting.text(ctx.lang),
                    step.title(ctx.lang),
                    status.label(ctx.lang)
                ));
                if tracker.is_done(&state) {
                    break false;
                }
            }
            _ = &mut ctrl_c => break true,
        }
    };
    sync.stop_polling();

    if interrupted {
        spinner.finish_err(&status_line(&sync.snapshot(), ctx));
    } else {
        spinner.finish_clear();
    }

    let state = sync.snapshot();
    match StepReport::from_state(&state, &ctx.client, ctx.lang) {
        Some(report) => print_report(&report, state.current_file.as_deref(), flags),
        None => Err(anyhow::anyhow!(Message::LoadFailed.text(ctx.lang))),
    }
}

fn status_line(state: &ViewState, ctx: &AppContext) -> String {
    format!(
        "{}: {}",
        state.current_step.title(ctx.lang),
        state.current_status().label(ctx.lang)
    )
}

/// Decides when a watched step has finished.
///
/// Right after a trigger the backend may still report the previous outcome,
/// so a terminal status only counts once the step was seen running or its
/// record differs from the one captured before the trigger.
#[derive(Debug)]
struct Completion {
    step: AnalysisStep,
    before: Option<StepRecord>,
    seen_active: bool,
}

impl Completion {
    const fn passive(step: AnalysisStep) -> Self {
        Self {
            step,
            before: None,
            seen_active: false,
        }
    }

    const fn after_run(step: AnalysisStep, before: StepRecord) -> Self {
        Self {
            step,
            before: Some(before),
            seen_active: false,
        }
    }

    /// Record a new state; returns the step status if a session is loaded.
    fn observe(&mut self, state: &ViewState) -> Option<StepStatus> {
        let status = state.session.as_ref()?.status(self.step);
        if status == StepStatus::Running {
            self.seen_active = true;
        }
        Some(status)
    }

    fn is_done(&self, state: &ViewState) -> bool {
        let Some(session) = state.session.as_ref() else {
            return false;
        };
        let record = session.step(self.step);
        if !record.status.is_terminal() {
            return false;
        }
        match &self.before {
            None => true,
            Some(before) => self.seen_active || record != before,
        }
    }
}

#[cfg(test)]
mod tests {
    use va_core::AnalysisSession;

    use super::*;

    fn state_with(record: StepRecord) -> ViewState {
        let mut session = AnalysisSession::new("s-1", "now");
        session.set_step(record);
        ViewState::with_session(session, AnalysisStep::Mda)
    }

    fn record(status: StepStatus, text: Option<&str>) -> StepRecord {
        StepRecord::with_output(AnalysisStep::Mda, status, text.map(str::to_string))
    }

    #[test]
    fn passive_watch_ends_on_any_terminal_status() {
        let mut completion = Completion::passive(AnalysisStep::Mda);
        let state = state_with(record(StepStatus::Completed, Some("# old")));
        assert_eq!(completion.observe(&state), Some(StepStatus::Completed));
        assert!(completion.is_done(&state));
    }

    #[test]
    fn stale_outcome_after_trigger_is_not_completion() {
        let before = record(StepStatus::Completed, Some("# old"));
        let mut completion = Completion::after_run(AnalysisStep::Mda, before.clone());

        let stale = state_with(before);
        completion.observe(&stale);
        assert!(!completion.is_done(&stale));

        let running = state_with(record(StepStatus::Running, None));
        completion.observe(&running);
        assert!(!completion.is_done(&running));

        let rerun = state_with(record(StepStatus::Completed, Some("# old")));
        completion.observe(&rerun);
        assert!(completion.is_done(&rerun));
    }

    #[test]
    fn changed_record_counts_without_seeing_running() {
        let before = record(StepStatus::Failed, Some("Error: timeout"));
        let mut completion = Completion::after_run(AnalysisStep::Mda, before);
        let state = state_with(record(StepStatus::Completed, Some("# new")));
        completion.observe(&state);
        assert!(completion.is_done(&state));
    }

    #[test]
    fn nothing_is_done_before_first_snapshot() {
        let mut completion = Completion::passive(AnalysisStep::Mda);
        let empty = ViewState::new(AnalysisStep::Mda);
        assert_eq!(completion.observe(&empty), None);
        assert!(!completion.is_done(&empty));
    }
}
