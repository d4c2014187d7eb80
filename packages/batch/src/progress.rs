//! Progress reporting for the batch runner.
//!
//! The runner announces its work through [`ProgressCallback`] so the
//! rendering choice (an `indicatif` bar, plain logging, nothing at all)
//! stays out of this crate. The total only becomes known after the
//! resume filter, so implementations must tolerate a late
//! [`ProgressCallback::set_total`].

use std::sync::Arc;

/// Receiver for batch run progress.
///
/// `Send + Sync` so one instance can be shared across a run via `Arc`.
pub trait ProgressCallback: Send + Sync {
    /// Announce the number of items this run will attempt.
    fn set_total(&self, total: u64);

    /// Advance by `delta` completed items.
    fn inc(&self, delta: u64);

    /// Name the item currently being processed.
    fn set_message(&self, msg: String);

    /// End the run with a summary message.
    fn finish(&self, msg: String);
}

/// Silent [`ProgressCallback`] for tests and non-interactive callers.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
}

/// Returns a shared [`NullProgress`] instance.
#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}
