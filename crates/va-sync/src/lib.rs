//! # va-sync
//!
//! Keeps the client's view of one analysis session in step with the backend.
//!
//! - [`reconcile`] maps the backend's wire session onto [`AnalysisSession`],
//!   rewriting filesystem paths into `/static/...` URLs.
//! - [`SessionStore`] is the single-writer container for [`ViewState`];
//!   readers subscribe through a `tokio::sync::watch` channel.
//! - [`SessionSynchronizer`] owns the store, applies user actions and runs
//!   the poller: one immediate fetch, then one per interval, with stale
//!   responses discarded.
//!
//! [`AnalysisSession`]: va_core::AnalysisSession

mod reconcile;
mod store;
mod synchronizer;

pub use reconcile::{optimistic_session, reconcile, to_static_path};
pub use store::{SessionStore, ViewState, ViewerTarget};
pub use synchronizer::{DEFAULT_POLL_INTERVAL, SessionSource, SessionSynchronizer};
