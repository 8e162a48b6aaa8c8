use crate::{Error, Result};

use parking_lot::Mutex;
use sprig_core::driver::InterruptHandle;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A host-provided cancellation signal.
///
/// Clones share state. Attach a token with [`Db::with_cancel_token`]; every
/// statement dispatched through that handle checks it first, and cancelling
/// also interrupts a statement already running on drivers that support it.
///
/// [`Db::with_cancel_token`]: crate::Db::with_cancel_token
#[derive(Clone, Default)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    cancelled: AtomicBool,
    hooks: Mutex<Vec<InterruptHandle>>,
}

impl CancelToken {
    pub fn new() -> CancelToken {
        CancelToken::default()
    }

    /// Cancels the token. Only the first call runs the interrupt hooks.
    pub fn cancel(&self) {
        if self.inner.cancelled.swap(true, Ordering::SeqCst) {
            return;
        }

        tracing::debug!("cancel token fired");

        for hook in self.inner.hooks.lock().iter() {
            hook();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Fails with [`Error::cancelled`] once the token has been cancelled.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(Error::cancelled())
        } else {
            Ok(())
        }
    }

    pub(crate) fn on_cancel(&self, hook: InterruptHandle) {
        self.inner.hooks.lock().push(hook);
    }
}

impl fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
