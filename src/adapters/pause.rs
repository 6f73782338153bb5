//! Shutdown-aware sleeping.
//!
//! [`ShutdownSignal`] is a cloneable flag plus condvar.  The signal thread
//! calls [`ShutdownSignal::trigger`]; the control thread sleeps through
//! [`Pause::pause`], which wakes at once when the flag flips.

use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::app::ports::Pause;

#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request shutdown and wake every sleeper.
    pub fn trigger(&self) {
        let (flag, cvar) = &*self.inner;
        *flag.lock().unwrap_or_else(PoisonError::into_inner) = true;
        cvar.notify_all();
    }

    pub fn is_triggered(&self) -> bool {
        *self.inner.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Pause for ShutdownSignal {
    fn pause(&self, duration: Duration) -> bool {
        let (flag, cvar) = &*self.inner;
        // No representable deadline: sleep until shutdown.
        let deadline = Instant::now().checked_add(duration);
        let mut stopped = flag.lock().unwrap_or_else(PoisonError::into_inner);
        while !*stopped {
            stopped = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return true;
                    }
                    cvar.wait_timeout(stopped, deadline - now)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0
                }
                None => cvar.wait(stopped).unwrap_or_else(PoisonError::into_inner),
            };
        }
        false
    }

    fn shutdown_requested(&self) -> bool {
        self.is_triggered()
    }
}
