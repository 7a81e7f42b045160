//! Shutdown trigger shared by the signal forwarder, the controller and its handles.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

/// What a call to [`ShutdownTrigger::fire`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fired {
    /// First request: graceful shutdown started.
    Graceful,
    /// A later request with escalation enabled: the drain is cut short.
    Forced,
    /// A later request with escalation disabled: no effect.
    Ignored,
}

/// Process-wide shutdown state. Created once by the controller; the graceful token
/// is cancelled exactly once, on the first [`fire`](ShutdownTrigger::fire), and is
/// the token handed to every long-lived operation (resource open, accept loop).
#[derive(Clone)]
pub struct ShutdownTrigger {
    inner: Arc<TriggerInner>,
}

struct TriggerInner {
    graceful: CancellationToken,
    forced: CancellationToken,
    fired: AtomicUsize,
    escalate: bool,
}

impl ShutdownTrigger {
    pub fn new(escalate: bool) -> Self {
        Self {
            inner: Arc::new(TriggerInner {
                graceful: CancellationToken::new(),
                forced: CancellationToken::new(),
                fired: AtomicUsize::new(0),
                escalate,
            }),
        }
    }

    /// Record a shutdown request (signal or programmatic).
    pub fn fire(&self) -> Fired {
        let previous = self.inner.fired.fetch_add(1, Ordering::SeqCst);
        if previous == 0 {
            self.inner.graceful.cancel();
            Fired::Graceful
        } else if self.inner.escalate {
            self.inner.forced.cancel();
            Fired::Forced
        } else {
            Fired::Ignored
        }
    }

    pub fn is_shutting_down(&self) -> bool {
        self.inner.graceful.is_cancelled()
    }

    pub fn is_forced(&self) -> bool {
        self.inner.forced.is_cancelled()
    }

    /// Token cancelled on the first request.
    pub fn token(&self) -> CancellationToken {
        self.inner.graceful.clone()
    }

    pub(crate) fn forced_token(&self) -> CancellationToken {
        self.inner.forced.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_fire_is_graceful_second_forces() {
        let trigger = ShutdownTrigger::new(true);
        assert!(!trigger.is_shutting_down());

        assert_eq!(trigger.fire(), Fired::Graceful);
        assert!(trigger.is_shutting_down());
        assert!(!trigger.is_forced());

        assert_eq!(trigger.fire(), Fired::Forced);
        assert!(trigger.is_forced());
        assert_eq!(trigger.fire(), Fired::Forced);
    }

    #[test]
    fn escalation_disabled_ignores_repeats() {
        let trigger = ShutdownTrigger::new(false);
        assert_eq!(trigger.fire(), Fired::Graceful);
        assert_eq!(trigger.fire(), Fired::Ignored);
        assert!(!trigger.is_forced());
    }

    #[test]
    fn clones_share_state() {
        let trigger = ShutdownTrigger::new(true);
        let token = trigger.token();
        let other = trigger.clone();

        assert_eq!(other.fire(), Fired::Graceful);
        assert!(token.is_cancelled());
        assert_eq!(trigger.fire(), Fired::Forced);
    }
}
