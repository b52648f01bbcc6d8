//! Poller and user actions over the [`SessionStore`].

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::{AbortHandle, JoinHandle, JoinSet};
use tokio::time::MissedTickBehavior;
use va_client::{BackendClient, ClientError};
use va_core::{AnalysisStep, BackendSession, Citation};

use crate::reconcile::{optimistic_session, reconcile};
use crate::store::{SessionStore, ViewState};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Where poll results come from.
pub trait SessionSource: Send + Sync + 'static {
    fn fetch_session(
        &self,
        session_id: &str,
    ) -> impl Future<Output = Result<BackendSession, ClientError>> + Send;
}

impl SessionSource for BackendClient {
    fn fetch_session(
        &self,
        session_id: &str,
    ) -> impl Future<Output = Result<BackendSession, ClientError>> + Send {
        self.get_session(session_id)
    }
}

struct Poller {
    session_id: String,
    handle: JoinHandle<()>,
}

/// Drives one session view: applies user actions and keeps exactly one
/// poller running for the displayed session.
///
/// Must be used from within a tokio runtime.
pub struct SessionSynchronizer<S: SessionSource> {
    source: Arc<S>,
    store: Arc<SessionStore>,
    interval: Duration,
    /// Bumped whenever a poller is stopped; results from older epochs are
    /// dropped.
    epoch: Arc<AtomicU64>,
    poller: Mutex<Option<Poller>>,
}

impl<S: SessionSource> SessionSynchronizer<S> {
    #[must_use]
    pub fn new(source: Arc<S>, default_step: AnalysisStep, interval: Duration) -> Self {
        Self {
            source,
            store: Arc::new(SessionStore::new(ViewState::new(default_step))),
            interval,
            epoch: Arc::new(AtomicU64::new(0)),
            poller: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.store.subscribe()
    }

    #[must_use]
    pub fn snapshot(&self) -> ViewState {
        self.store.snapshot()
    }

    /// Session id the running poller is fetching, if any.
    #[must_use]
    pub fn active_session(&self) -> Option<String> {
        self.lock_poller()
            .as_ref()
            .filter(|poller| !poller.handle.is_finished())
            .map(|poller| poller.session_id.clone())
    }

    // ── Polling ────────────────────────────────────────────────────

    /// Replace any running poller with one for `session_id`: an immediate
    /// fetch, then one per interval. If another session is displayed, the
    /// view switches to `session_id` so its results are applied.
    pub fn start_polling(&self, session_id: &str) {
        let mut slot = self.lock_poller();
        self.halt(slot.take());
        self.store.modify(|state| {
            if state.session_id.as_deref() == Some(session_id) {
                return false;
            }
            *state = ViewState {
                session_id: Some(session_id.to_string()),
                ..ViewState::new(state.current_step)
            };
            true
        });

        let epoch = self.epoch.load(Ordering::SeqCst);
        let handle = tokio::spawn(poll_loop(PollTask {
            source: Arc::clone(&self.source),
            store: Arc::clone(&self.store),
            current_epoch: Arc::clone(&self.epoch),
            epoch,
            session_id: session_id.to_string(),
            interval: self.interval,
        }));
        tracing::debug!(session_id, epoch, "poller started");

        *slot = Some(Poller {
            session_id: session_id.to_string(),
            handle,
        });
    }

    /// Stop polling. No poll result is applied after this returns.
    pub fn stop_polling(&self) {
        let mut slot = self.lock_poller();
        self.halt(slot.take());
    }

    fn halt(&self, poller: Option<Poller>) {
        let previous = self.epoch.fetch_add(1, Ordering::SeqCst);
        self.store.barrier();
        if let Some(poller) = poller {
            poller.handle.abort();
            tracing::debug!(session_id = %poller.session_id, epoch = previous, "poller stopped");
        }
    }

    fn lock_poller(&self) -> std::sync::MutexGuard<'_, Option<Poller>> {
        self.poller.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ── User actions ───────────────────────────────────────────────

    /// Show an existing session and start polling it.
    pub fn open_session(&self, session_id: &str) {
        self.stop_polling();
        self.store.modify(|state| {
            *state = ViewState {
                session_id: Some(session_id.to_string()),
                ..ViewState::new(state.current_step)
            };
            true
        });
        self.start_polling(session_id);
    }

    /// Show the local stand-in for a just-uploaded document and start polling
    /// the new session.
    pub fn adopt_upload(&self, session_id: &str, file_name: &str) {
        self.stop_polling();
        let session = optimistic_session(session_id, file_name);
        self.store.modify(|state| {
            *state = ViewState {
                session_id: Some(session_id.to_string()),
                current_file: session.file_path.clone(),
                session: Some(session),
                ..ViewState::new(state.current_step)
            };
            true
        });
        self.start_polling(session_id);
    }

    pub fn select_step(&self, step: AnalysisStep) {
        self.store.modify(|state| {
            let changed = state.current_step != step;
            state.current_step = step;
            changed
        });
    }

    pub fn select_file(&self, file: &str) {
        self.store.modify(|state| {
            let changed = state.current_file.as_deref() != Some(file);
            state.current_file = Some(file.to_string());
            changed
        });
    }

    /// Point the viewer at a cited page.
    pub fn open_citation(&self, citation: Citation) {
        self.store.modify(|state| {
            state.apply_citation(citation);
            true
        });
    }

    /// Return to the session list: stop polling and drop the session.
    pub fn close_session(&self) {
        self.stop_polling();
        self.store.modify(|state| {
            *state = ViewState::new(state.current_step);
            true
        });
    }
}

impl<S: SessionSource> Drop for SessionSynchronizer<S> {
    fn drop(&mut self) {
        if let Some(poller) = self.lock_poller().take() {
            poller.handle.abort();
        }
    }
}

struct PollTask<S> {
    source: Arc<S>,
    store: Arc<SessionStore>,
    current_epoch: Arc<AtomicU64>,
    epoch: u64,
    session_id: String,
    interval: Duration,
}

/// Tick, fetch each tick in its own task, apply results newer than the last
/// applied one. Once a result is applied, older fetches still in flight are
/// aborted. Aborting this task drops the `JoinSet`, cancelling fetches.
async fn poll_loop<S: SessionSource>(task: PollTask<S>) {
    let mut ticker = tokio::time::interval(task.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut fetches = JoinSet::new();
    let mut in_flight: BTreeMap<u64, AbortHandle> = BTreeMap::new();
    let mut next_seq: u64 = 0;
    let mut last_applied: u64 = 0;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                next_seq += 1;
                let seq = next_seq;
                let source = Arc::clone(&task.source);
                let session_id = task.session_id.clone();
                let handle = fetches.spawn(async move { (seq, source.fetch_session(&session_id).await) });
                in_flight.insert(seq, handle);
            }
            Some(joined) = fetches.join_next(), if !fetches.is_empty() => {
                match joined {
                    Ok((seq, Ok(raw))) => {
                        in_flight.remove(&seq);
                        if seq <= last_applied {
                            tracing::debug!(session_id = %task.session_id, seq, last_applied, "dropping stale poll result");
                            continue;
                        }
                        let session = reconcile(raw);
                        let applied = task.store.apply_poll(session, || {
                            task.current_epoch.load(Ordering::SeqCst) == task.epoch
                        });
                        if applied {
                            last_applied = seq;
                            cancel_older(&mut in_flight, seq);
                        } else {
                            tracing::debug!(session_id = %task.session_id, seq, "poll result no longer current");
                        }
                    }
                    Ok((seq, Err(error))) => {
                        in_flight.remove(&seq);
                        tracing::warn!(session_id = %task.session_id, seq, %error, "session poll failed");
                    }
                    Err(error) if error.is_cancelled() => {}
                    Err(error) => {
                        tracing::warn!(session_id = %task.session_id, %error, "session poll task ended abnormally");
                    }
                }
            }
        }
    }
}

/// Abort every fetch issued before `seq`.
fn cancel_older(in_flight: &mut BTreeMap<u64, AbortHandle>, seq: u64) {
    let newer = in_flight.split_off(&seq);
    for (older, handle) in std::mem::replace(in_flight, newer) {
        tracing::debug!(seq = older, "aborting superseded fetch");
        handle.abort();
    }
}
