//! Single-writer view state.

use serde::Serialize;
use tokio::sync::watch;
use va_core::{AnalysisSession, AnalysisStep, Citation, StepStatus};

/// Everything the workbench shows for the open session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewState {
    /// Session being displayed; poll results for any other id are dropped.
    pub session_id: Option<String>,
    /// Last applied snapshot; `None` until the first poll (or upload) lands.
    pub session: Option<AnalysisSession>,
    /// Selected `/static/...` file.
    pub current_file: Option<String>,
    pub current_step: AnalysisStep,
    /// 1-based page the document viewer should show.
    pub target_page: u32,
    pub highlight_rect: Option<[f64; 4]>,
}

/// Where the document viewer should point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewerTarget {
    /// `/static/...` path; join with the backend base URL to load it.
    pub file: String,
    pub page: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight_rect: Option<[f64; 4]>,
}

impl ViewState {
    #[must_use]
    pub const fn new(current_step: AnalysisStep) -> Self {
        Self {
            session_id: None,
            session: None,
            current_file: None,
            current_step,
            target_page: 1,
            highlight_rect: None,
        }
    }

    /// State for a loaded `session` shown on `step`, first file selected.
    #[must_use]
    pub fn with_session(session: AnalysisSession, step: AnalysisStep) -> Self {
        Self {
            session_id: Some(session.id.clone()),
            current_file: session.file_paths.first().cloned(),
            session: Some(session),
            ..Self::new(step)
        }
    }

    /// Jump to a cited page. The highlight is only replaced when the citation
    /// carries a rectangle.
    pub fn apply_citation(&mut self, citation: Citation) {
        self.target_page = citation.page.max(1);
        if citation.rect.is_some() {
            self.highlight_rect = citation.rect;
        }
    }

    /// Status of the selected step; `PENDING` when no session is loaded.
    #[must_use]
    pub fn current_status(&self) -> StepStatus {
        self.session
            .as_ref()
            .map_or(StepStatus::Pending, |session| session.status(self.current_step))
    }

    /// Markdown report of the selected step, once it is `COMPLETED`.
    #[must_use]
    pub fn current_result(&self) -> Option<&str> {
        self.session
            .as_ref()
            .and_then(|session| session.step(self.current_step).result.as_deref())
    }

    /// Failure text of the selected step, once it is `FAILED`.
    #[must_use]
    pub fn current_error(&self) -> Option<&str> {
        self.session
            .as_ref()
            .and_then(|session| session.step(self.current_step).error.as_deref())
    }

    /// True while the selected step is running; the run action is disabled.
    #[must_use]
    pub fn is_analyzing(&self) -> bool {
        self.current_status() == StepStatus::Running
    }

    #[must_use]
    pub fn viewer_target(&self) -> Option<ViewerTarget> {
        self.current_file.as_ref().map(|file| ViewerTarget {
            file: file.clone(),
            page: self.target_page,
            highlight_rect: self.highlight_rect,
        })
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(AnalysisStep::default())
    }
}

/// Owner of the [`ViewState`]. Writes go through `&self` methods of this
/// crate only; everyone else gets a receiver.
#[derive(Debug)]
pub struct SessionStore {
    tx: watch::Sender<ViewState>,
}

impl SessionStore {
    #[must_use]
    pub fn new(initial: ViewState) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.tx.subscribe()
    }

    /// Clone of the current state.
    #[must_use]
    pub fn snapshot(&self) -> ViewState {
        self.tx.borrow().clone()
    }

    /// Mutate the state; subscribers are notified only if `f` returns true.
    pub(crate) fn modify(&self, f: impl FnOnce(&mut ViewState) -> bool) -> bool {
        self.tx.send_if_modified(f)
    }

    /// Wait until any in-progress write has finished.
    pub(crate) fn barrier(&self) {
        self.tx.send_if_modified(|_| false);
    }

    /// Apply a polled snapshot if `is_current` still holds and it belongs to
    /// the displayed session. Returns whether it was applied.
    pub(crate) fn apply_poll(
        &self,
        session: AnalysisSession,
        is_current: impl FnOnce() -> bool,
    ) -> bool {
        let mut applied = false;
        self.tx.send_if_modified(|state| {
            if !is_current() || state.session_id.as_deref() != Some(session.id.as_str()) {
                return false;
            }
            applied = true;

            let mut changed = false;
            if state.current_file.is_none()
                && let Some(first) = session.file_paths.first()
            {
                state.current_file = Some(first.clone());
                changed = true;
            }
            if state.session.as_ref() != Some(&session) {
                state.session = Some(session);
                changed = true;
            }
            changed
        });
        applied
    }
}
