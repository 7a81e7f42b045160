//! Lifecycle error types returned by the controller.

use thiserror::Error;

/// Errors returned by [`Controller::run`](crate::Controller::run). Every variant is fatal:
/// the controller is in [`Phase::Failed`](crate::Phase::Failed) when one is returned.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// SIGINT/SIGTERM handlers could not be installed.
    #[error("failed to install signal handlers")]
    SignalHandler(#[source] std::io::Error),

    /// The resource provider failed to open; the listener was never bound.
    #[error("failed to open {resource}")]
    ResourceOpen {
        resource: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The listener could not bind its address.
    #[error("failed to bind listener on {addr}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// The accept loop hit a non-recoverable error.
    #[error("listener failed")]
    Listener(#[source] std::io::Error),

    /// The accept loop returned while no shutdown had been requested.
    #[error("listener exited before shutdown was requested")]
    ListenerExited,

    /// The listener task panicked.
    #[error("listener task panicked")]
    ListenerPanicked,
}
