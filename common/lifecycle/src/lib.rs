//! Process lifecycle for a single HTTP service: open a shared resource, serve on a
//! supervised listener task, trap SIGINT/SIGTERM, then drain in-flight requests
//! within a bounded deadline before releasing the resource exactly once.

mod controller;
mod error;
mod handle;
mod metrics;
mod phase;
mod provider;
mod server;
mod shutdown;
mod signals;

pub use controller::{Controller, ControllerBuilder, DrainOutcome, ShutdownReport};
pub use error::LifecycleError;
pub use handle::ControllerHandle;
pub use phase::Phase;
pub use provider::ResourceProvider;
pub use server::Server;
pub use shutdown::{Fired, ShutdownTrigger};
