pub mod config;
pub mod env;
pub mod logging;
pub mod metrics;
pub mod router;
pub mod server;
