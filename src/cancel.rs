//! Cooperative cancellation for in-progress batches.
//!
//! The pipeline checks the flag between documents, never mid-document: a
//! document that has started extraction runs to completion, then the batch
//! stops with [`crate::error::StitchError::Cancelled`]. Nothing partial is
//! written.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A cloneable cancellation flag shared between the caller and the pipeline.
///
/// Clones share the same underlying flag. Hand one clone to
/// [`crate::config::StitchConfigBuilder::cancel`] and keep another to call
/// [`CancelFlag::cancel`] from a signal handler or UI thread.
#[derive(Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Has cancellation been requested?
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for CancelFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("CancelFlag").field(&self.is_cancelled()).finish()
    }
}
