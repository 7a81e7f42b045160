//! HTTP listener with graceful drain.

use std::io;
use std::net::SocketAddr;

use axum::Router;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as AutoBuilder;
use hyper_util::server::graceful::GracefulShutdown;
use tokio::net::TcpListener;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tower::Service;
use tracing::{debug, info, warn};

use crate::error::LifecycleError;

/// A bound listener plus the routing table it serves.
pub struct Server {
    listener: TcpListener,
    app: Router,
    local_addr: SocketAddr,
}

impl Server {
    pub async fn bind(addr: &str, app: Router) -> Result<Self, LifecycleError> {
        let bind_error = |source| LifecycleError::Bind {
            addr: addr.to_string(),
            source,
        };
        let listener = TcpListener::bind(addr).await.map_err(bind_error)?;
        let local_addr = listener.local_addr().map_err(bind_error)?;

        Ok(Self {
            listener,
            app,
            local_addr,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Accept connections until `stop` is cancelled, then close the listener and wait
    /// for in-flight connections to finish. Idle keep-alive connections are closed
    /// right away.
    ///
    /// Every connection task lives in a `JoinSet` owned by this future: dropping the
    /// future (e.g. aborting the task running it) tears all of them down.
    pub async fn serve(self, stop: CancellationToken) -> io::Result<()> {
        let Server { listener, app, .. } = self;

        let builder = AutoBuilder::new(TokioExecutor::new());
        let graceful = GracefulShutdown::new();
        let mut connections = JoinSet::new();

        loop {
            tokio::select! {
                biased;

                _ = stop.cancelled() => {
                    info!(
                        in_flight = connections.len(),
                        "Lifecycle: stopped accepting connections"
                    );
                    break;
                }
                Some(_) = connections.join_next(), if !connections.is_empty() => {}
                result = listener.accept() => {
                    let (socket, _) = match result {
                        Ok(conn) => conn,
                        Err(e) if is_connection_error(&e) => {
                            debug!("failed to accept connection: {}", e);
                            continue;
                        }
                        Err(e) => return Err(e),
                    };

                    if let Err(e) = socket.set_nodelay(true) {
                        warn!("failed to set TCP_NODELAY: {}", e);
                    }

                    let app = app.clone();
                    let service = hyper::service::service_fn(move |req: hyper::Request<hyper::body::Incoming>| {
                        let mut app = app.clone();
                        let req = req.map(axum::body::Body::new);
                        async move { app.call(req).await }
                    });

                    let conn = builder.serve_connection_with_upgrades(TokioIo::new(socket), service);
                    let conn = graceful.watch(conn.into_owned());

                    connections.spawn(async move {
                        if let Err(e) = conn.await {
                            debug!("connection closed: {}", e);
                        }
                    });
                }
            }
        }

        drop(listener);
        graceful.shutdown().await;
        while connections.join_next().await.is_some() {}

        Ok(())
    }
}

/// Errors tied to a single incoming connection rather than the listening socket.
fn is_connection_error(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionReset
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::get;
    use std::time::Duration;

    #[tokio::test]
    async fn bind_reports_local_addr() {
        let server = Server::bind("127.0.0.1:0", Router::new()).await.unwrap();
        assert!(server.local_addr().ip().is_loopback());
        assert_ne!(server.local_addr().port(), 0);
    }

    #[tokio::test]
    async fn bind_fails_on_used_port() {
        let first = Server::bind("127.0.0.1:0", Router::new()).await.unwrap();
        let addr = first.local_addr().to_string();

        let err = Server::bind(&addr, Router::new()).await.err().unwrap();
        assert!(matches!(err, LifecycleError::Bind { addr: a, .. } if a == addr));
    }

    #[tokio::test]
    async fn serves_until_stopped() {
        let app = Router::new().route("/ping", get(|| async { "pong" }));
        let server = Server::bind("127.0.0.1:0", app).await.unwrap();
        let addr = server.local_addr();
        let stop = CancellationToken::new();
        let task = tokio::spawn(server.serve(stop.clone()));

        let body = reqwest::get(format!("http://{addr}/ping"))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert_eq!(body, "pong");

        stop.cancel();
        let result = tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .expect("timed out")
            .unwrap();
        assert!(result.is_ok());

        // listener is closed once serve returns
        assert!(reqwest::get(format!("http://{addr}/ping")).await.is_err());
    }

    #[test]
    fn connection_errors_are_recoverable() {
        let reset = io::Error::from(io::ErrorKind::ConnectionReset);
        assert!(is_connection_error(&reset));
        let other = io::Error::from(io::ErrorKind::PermissionDenied);
        assert!(!is_connection_error(&other));
    }
}
