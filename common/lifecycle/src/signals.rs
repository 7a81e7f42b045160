use tokio::signal::unix::{signal, Signal, SignalKind};
use tracing::{info, warn};

use crate::shutdown::{Fired, ShutdownTrigger};

pub(crate) struct Signals {
    interrupt: Signal,
    terminate: Signal,
}

/// Install SIGINT and SIGTERM handlers. Once installed, the default disposition is
/// replaced for the rest of the process lifetime.
pub(crate) fn install() -> std::io::Result<Signals> {
    Ok(Signals {
        interrupt: signal(SignalKind::interrupt())?,
        terminate: signal(SignalKind::terminate())?,
    })
}

/// Forward every received signal to the trigger until the task is aborted.
pub(crate) async fn forward(mut signals: Signals, trigger: ShutdownTrigger) {
    loop {
        let name = tokio::select! {
            _ = signals.interrupt.recv() => "SIGINT",
            _ = signals.terminate.recv() => "SIGTERM",
        };

        match trigger.fire() {
            Fired::Graceful => info!(signal = name, "received {name}"),
            Fired::Forced => warn!(signal = name, "received {name} again, forcing shutdown"),
            Fired::Ignored => info!(signal = name, "received {name}, shutdown already in progress"),
        }
    }
}
