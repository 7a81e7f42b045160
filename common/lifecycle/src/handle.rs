//! Observer/trigger handle for a controller that has been moved into `run`.

use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::phase::Phase;
use crate::shutdown::{Fired, ShutdownTrigger};

/// Clone-able handle returned by [`Controller::handle`](crate::Controller::handle).
#[derive(Clone)]
pub struct ControllerHandle {
    pub(crate) trigger: ShutdownTrigger,
    pub(crate) phase: watch::Receiver<Phase>,
    pub(crate) local_addr: Arc<OnceLock<SocketAddr>>,
}

impl ControllerHandle {
    /// Same effect as receiving SIGINT/SIGTERM: the first call starts graceful shutdown,
    /// a later call forces it when escalation is enabled.
    pub fn request_shutdown(&self) -> Fired {
        self.trigger.fire()
    }

    pub fn is_shutting_down(&self) -> bool {
        self.trigger.is_shutting_down()
    }

    /// Cancelled when shutdown begins.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.trigger.token()
    }

    pub fn phase(&self) -> Phase {
        *self.phase.borrow()
    }

    /// Address the listener is bound to, once it is.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr.get().copied()
    }

    /// Wait until the listener is accepting connections. Returns `None` if the
    /// controller stopped or failed before ever binding.
    pub async fn listening(&self) -> Option<SocketAddr> {
        let mut phase = self.phase.clone();
        // Err means the controller was dropped; whatever was recorded stays valid
        drop(phase.wait_for(|p| *p != Phase::Init && *p != Phase::Starting).await);
        self.local_addr()
    }

    /// Wait until the controller reaches `Stopped` or `Failed`.
    pub async fn finished(&self) -> Phase {
        let mut phase = self.phase.clone();
        drop(phase.wait_for(Phase::is_terminal).await);
        self.phase()
    }
}
