//! Command implementations for agentsync-cli

pub mod diff;
pub mod status;
pub mod sync;

pub use diff::run_diff;
pub use status::run_status;
pub use sync::{run_apply, run_backport, run_sync};
