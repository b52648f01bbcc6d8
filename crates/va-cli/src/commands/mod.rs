pub mod analyze;
pub mod dispatch;
pub mod files;
pub mod schema;
pub mod sessions;
pub mod shared;
pub mod show;
pub mod transfer;
pub mod watch;
pub mod workbench;
