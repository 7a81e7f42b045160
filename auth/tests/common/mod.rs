#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use auth::config::Config;
use auth::server::{controller_builder, serve, ServeError};
use lifecycle::{Controller, ControllerHandle, ShutdownReport};
use tokio::task::JoinHandle;

/// Config bound to an ephemeral loopback port, pointing at a database that is never
/// dialled because the pool is lazy.
pub fn test_config(extra: &[(&str, &str)]) -> Config {
    let mut vars = vec![
        ("HTTP_HOST", "127.0.0.1"),
        ("HTTP_PORT", "0"),
        ("DB_USER", "auth"),
        ("DB_PASSWORD", "auth"),
        ("DB_HOST", "localhost"),
        ("DB_PORT", "5432"),
        ("DB_NAME", "auth"),
        ("DB_CLOSE_TIMEOUT_SECS", "1"),
    ];
    vars.extend_from_slice(extra);
    Config::from_vars(vars.into_iter().map(|(k, v)| (k.to_string(), v.to_string()))).unwrap()
}

pub struct ServerHandle {
    pub controller: ControllerHandle,
    pub task: JoinHandle<Result<ShutdownReport, ServeError>>,
}

impl ServerHandle {
    pub async fn for_config(config: Config) -> ServerHandle {
        let controller = controller_builder(&config).with_trap_signals(false).build();
        Self::for_controller(config, controller)
    }

    pub fn for_controller(config: Config, controller: Controller) -> ServerHandle {
        let handle = controller.handle();
        let task = tokio::spawn(serve(config, controller));
        ServerHandle {
            controller: handle,
            task,
        }
    }

    pub async fn addr(&self) -> Option<SocketAddr> {
        self.controller.listening().await
    }

    pub async fn stop(self) -> Result<ShutdownReport, ServeError> {
        self.controller.request_shutdown();
        self.join().await
    }

    pub async fn join(self) -> Result<ShutdownReport, ServeError> {
        tokio::time::timeout(Duration::from_secs(15), self.task)
            .await
            .expect("timed out")
            .expect("server panicked")
    }
}
