//! Poller behaviour against a scripted session source, on paused time.

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pretty_assertions::assert_eq;
use va_client::ClientError;
use va_core::{AnalysisStep, BackendSession, Citation, StepStatus};
use va_sync::{SessionSource, SessionSynchronizer};

const INTERVAL: Duration = Duration::from_secs(3);

#[derive(Default)]
struct FakeSource {
    sessions: Mutex<HashMap<String, BackendSession>>,
    calls: Mutex<Vec<String>>,
    delays: Mutex<VecDeque<Duration>>,
    failing: AtomicBool,
    cancelled: Arc<AtomicUsize>,
}

/// Counts fetches dropped before their response was produced.
struct CancelGuard {
    armed: bool,
    cancelled: Arc<AtomicUsize>,
}

impl Drop for CancelGuard {
    fn drop(&mut self) {
        if self.armed {
            self.cancelled.fetch_add(1, Ordering::SeqCst);
        }
    }
}

impl FakeSource {
    fn put(&self, session: BackendSession) {
        self.sessions
            .lock()
            .unwrap()
            .insert(session.id.clone(), session);
    }

    fn delay_next(&self, delay: Duration) {
        self.delays.lock().unwrap().push_back(delay);
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn cancelled(&self) -> usize {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl SessionSource for FakeSource {
    fn fetch_session(
        &self,
        session_id: &str,
    ) -> impl Future<Output = Result<BackendSession, ClientError>> + Send {
        self.calls.lock().unwrap().push(session_id.to_string());
        let delay = self.delays.lock().unwrap().pop_front().unwrap_or_default();
        let response = if self.failing.load(Ordering::SeqCst) {
            Err(ClientError::Api {
                status: 500,
                message: "Internal Server Error".into(),
            })
        } else {
            self.sessions
                .lock()
                .unwrap()
                .get(session_id)
                .cloned()
                .ok_or_else(|| ClientError::Api {
                    status: 404,
                    message: "会话未找到".into(),
                })
        };
        let mut guard = CancelGuard {
            armed: true,
            cancelled: Arc::clone(&self.cancelled),
        };
        async move {
            tokio::time::sleep(delay).await;
            guard.armed = false;
            response
        }
    }
}

fn wire(id: &str, business: &str, files: &[&str]) -> BackendSession {
    let paths: Vec<String> = files
        .iter()
        .map(|name| format!("/srv/analyst/uploads/knowledge/{name}"))
        .collect();
    BackendSession {
        id: id.into(),
        created_at: Some("2024-05-01T08:30:00".into()),
        file_paths_json: Some(serde_json::to_string(&paths).unwrap()),
        business_status: Some(business.into()),
        ..BackendSession::default()
    }
}

fn setup() -> (Arc<FakeSource>, SessionSynchronizer<FakeSource>) {
    let source = Arc::new(FakeSource::default());
    let sync = SessionSynchronizer::new(Arc::clone(&source), AnalysisStep::Business, INTERVAL);
    (source, sync)
}

async fn settle() {
    tokio::time::sleep(Duration::from_millis(10)).await;
}

#[tokio::test(start_paused = true)]
async fn immediate_fetch_then_fixed_interval() {
    let (source, sync) = setup();
    source.put(wire("a", "RUNNING", &["a.pdf"]));

    sync.open_session("a");
    settle().await;
    assert_eq!(source.calls(), vec!["a"]);
    assert!(sync.snapshot().is_analyzing());

    tokio::time::sleep(INTERVAL).await;
    assert_eq!(source.calls().len(), 2);
    tokio::time::sleep(INTERVAL).await;
    assert_eq!(source.calls().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn switching_sessions_leaves_one_poller() {
    let (source, sync) = setup();
    source.put(wire("a", "COMPLETED", &["a.pdf"]));
    source.put(wire("b", "PENDING", &["b.pdf"]));

    sync.open_session("a");
    settle().await;
    sync.open_session("b");
    settle().await;

    tokio::time::sleep(INTERVAL * 4 + Duration::from_millis(500)).await;

    let calls = source.calls();
    assert_eq!(calls.iter().filter(|id| *id == "a").count(), 1);
    assert_eq!(calls.iter().filter(|id| *id == "b").count(), 5);
    assert_eq!(sync.active_session().as_deref(), Some("b"));

    let state = sync.snapshot();
    assert_eq!(state.session.map(|s| s.id).as_deref(), Some("b"));
    assert_eq!(state.current_file.as_deref(), Some("/static/knowledge/b.pdf"));
}

#[tokio::test(start_paused = true)]
async fn restarting_same_session_keeps_one_poller() {
    let (source, sync) = setup();
    source.put(wire("a", "PENDING", &[]));

    sync.start_polling("a");
    sync.start_polling("a");
    settle().await;
    assert_eq!(source.calls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn start_polling_alone_displays_the_session() {
    let (source, sync) = setup();
    source.put(wire("a", "RUNNING", &["a.pdf"]));
    source.put(wire("b", "COMPLETED", &["b.pdf"]));

    sync.start_polling("a");
    settle().await;
    let state = sync.snapshot();
    assert_eq!(state.session_id.as_deref(), Some("a"));
    assert_eq!(state.session.map(|s| s.id).as_deref(), Some("a"));
    assert_eq!(state.current_file.as_deref(), Some("/static/knowledge/a.pdf"));

    sync.start_polling("b");
    tokio::time::sleep(INTERVAL + Duration::from_millis(500)).await;
    let state = sync.snapshot();
    assert_eq!(state.session_id.as_deref(), Some("b"));
    assert_eq!(state.current_status(), StepStatus::Completed);
    assert_eq!(state.current_file.as_deref(), Some("/static/knowledge/b.pdf"));
    assert_eq!(sync.active_session().as_deref(), Some("b"));
}

#[tokio::test(start_paused = true)]
async fn superseded_fetches_are_aborted() {
    let (source, sync) = setup();
    source.put(wire("a", "PENDING", &[]));
    source.delay_next(Duration::from_secs(60));

    sync.open_session("a");
    settle().await;
    assert_eq!(source.cancelled(), 0);

    tokio::time::sleep(INTERVAL).await;
    assert!(sync.snapshot().session.is_some());
    assert_eq!(source.cancelled(), 1);

    tokio::time::sleep(INTERVAL * 3).await;
    assert_eq!(source.cancelled(), 1);
}

#[tokio::test(start_paused = true)]
async fn late_response_from_previous_session_is_dropped() {
    let (source, sync) = setup();
    source.put(wire("a", "COMPLETED", &["a.pdf"]));
    source.put(wire("b", "PENDING", &["b.pdf"]));
    source.delay_next(Duration::from_secs(2));

    sync.open_session("a");
    settle().await;
    sync.open_session("b");
    tokio::time::sleep(Duration::from_secs(5)).await;

    let state = sync.snapshot();
    assert_eq!(state.session_id.as_deref(), Some("b"));
    assert_eq!(state.session.map(|s| s.id).as_deref(), Some("b"));
}

#[tokio::test(start_paused = true)]
async fn older_sequence_never_overwrites_newer() {
    let (source, sync) = setup();
    source.put(wire("a", "RUNNING", &["a.pdf"]));
    // First fetch hangs past the second tick.
    source.delay_next(Duration::from_secs(5));

    sync.open_session("a");
    settle().await;
    source.put(wire("a", "COMPLETED", &["a.pdf"]));

    tokio::time::sleep(Duration::from_millis(3_500)).await;
    assert_eq!(sync.snapshot().current_status(), StepStatus::Completed);

    // The hung first fetch (RUNNING) resolves at t=5s and must be ignored.
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(source.calls().len(), 2);
    assert_eq!(sync.snapshot().current_status(), StepStatus::Completed);
}

#[tokio::test(start_paused = true)]
async fn hung_fetch_does_not_block_next_tick() {
    let (source, sync) = setup();
    source.put(wire("a", "PENDING", &[]));
    source.delay_next(Duration::from_secs(60));

    sync.open_session("a");
    settle().await;
    assert!(sync.snapshot().session.is_none());

    tokio::time::sleep(INTERVAL).await;
    assert_eq!(source.calls().len(), 2);
    assert!(sync.snapshot().session.is_some());
}

#[tokio::test(start_paused = true)]
async fn fetch_errors_keep_last_known_good() {
    let (source, sync) = setup();
    source.put(wire("a", "RUNNING", &["a.pdf"]));

    sync.open_session("a");
    settle().await;
    let before = sync.snapshot();
    assert!(before.session.is_some());

    source.failing.store(true, Ordering::SeqCst);
    tokio::time::sleep(INTERVAL * 2).await;

    assert_eq!(source.calls().len(), 3);
    assert_eq!(sync.snapshot(), before);
    assert_eq!(sync.active_session().as_deref(), Some("a"));
}

#[tokio::test(start_paused = true)]
async fn first_file_is_selected_only_once() {
    let (source, sync) = setup();
    source.put(wire("a", "PENDING", &["one.pdf", "two.pdf"]));

    sync.open_session("a");
    settle().await;
    assert_eq!(
        sync.snapshot().current_file.as_deref(),
        Some("/static/knowledge/one.pdf")
    );

    sync.select_file("/static/knowledge/two.pdf");
    tokio::time::sleep(INTERVAL).await;
    assert_eq!(
        sync.snapshot().current_file.as_deref(),
        Some("/static/knowledge/two.pdf")
    );
}

#[tokio::test(start_paused = true)]
async fn stop_polling_halts_fetches() {
    let (source, sync) = setup();
    source.put(wire("a", "PENDING", &[]));

    sync.open_session("a");
    settle().await;
    sync.stop_polling();
    tokio::time::sleep(INTERVAL * 3).await;

    assert_eq!(source.calls().len(), 1);
    assert!(sync.active_session().is_none());
}

#[tokio::test(start_paused = true)]
async fn upload_shows_optimistic_session_until_first_poll() {
    let (source, sync) = setup();
    source.put(wire("new", "PENDING", &["report.pdf"]));
    source.delay_next(Duration::from_secs(1));

    sync.adopt_upload("new", "report.pdf");
    let state = sync.snapshot();
    assert_eq!(state.current_file.as_deref(), Some("/static/report.pdf"));
    let optimistic = state.session.expect("optimistic session");
    assert_eq!(optimistic.file_paths, vec!["/static/report.pdf"]);

    tokio::time::sleep(Duration::from_secs(2)).await;
    let state = sync.snapshot();
    assert_eq!(
        state.session.map(|s| s.file_paths),
        Some(vec!["/static/knowledge/report.pdf".to_string()])
    );
    // Selection made at upload time is kept.
    assert_eq!(state.current_file.as_deref(), Some("/static/report.pdf"));
}

#[tokio::test(start_paused = true)]
async fn citations_move_the_viewer() {
    let (source, sync) = setup();
    source.put(wire("a", "COMPLETED", &["a.pdf"]));
    sync.open_session("a");
    settle().await;

    sync.open_citation(Citation {
        page: 12,
        rect: Some([1.0, 2.0, 3.0, 4.0]),
    });
    sync.open_citation(Citation::page(36));

    let target = sync.snapshot().viewer_target().expect("file selected");
    assert_eq!(target.page, 36);
    assert_eq!(target.highlight_rect, Some([1.0, 2.0, 3.0, 4.0]));
}

#[tokio::test(start_paused = true)]
async fn close_session_returns_to_list_state() {
    let (source, sync) = setup();
    source.put(wire("a", "COMPLETED", &["a.pdf"]));
    sync.open_session("a");
    sync.select_step(AnalysisStep::Valuation);
    settle().await;

    sync.close_session();
    let state = sync.snapshot();
    assert!(state.session_id.is_none());
    assert!(state.session.is_none());
    assert!(state.current_file.is_none());
    assert_eq!(state.current_step, AnalysisStep::Valuation);

    tokio::time::sleep(INTERVAL * 2).await;
    assert_eq!(source.calls().len(), 1);
    assert!(sync.snapshot().session.is_none());
}

#[tokio::test(start_paused = true)]
async fn subscribers_see_poll_updates() {
    let (source, sync) = setup();
    source.put(wire("a", "RUNNING", &[]));
    let mut rx = sync.subscribe();

    sync.open_session("a");
    rx.changed().await.unwrap();
    source.put(wire("a", "COMPLETED", &[]));

    let state = rx
        .wait_for(|state| state.current_status() == StepStatus::Completed)
        .await
        .unwrap()
        .clone();
    assert_eq!(state.session_id.as_deref(), Some("a"));
}
