//! Lifecycle controller: ordered startup, supervised listener, signal-triggered bounded drain.

use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use axum::Router;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn, Instrument};

use crate::error::LifecycleError;
use crate::handle::ControllerHandle;
use crate::metrics;
use crate::phase::Phase;
use crate::provider::ResourceProvider;
use crate::server::Server;
use crate::shutdown::ShutdownTrigger;
use crate::signals;

/// How the drain window ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrainOutcome {
    /// Every in-flight request finished before the deadline.
    Completed,
    /// The deadline elapsed; remaining connections were torn down.
    DeadlineExpired,
    /// A second shutdown request cut the drain short.
    Forced,
}

impl DrainOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            DrainOutcome::Completed => "completed",
            DrainOutcome::DeadlineExpired => "deadline_expired",
            DrainOutcome::Forced => "forced",
        }
    }
}

/// Returned by [`Controller::run`] after a clean stop.
#[derive(Clone, Debug)]
pub struct ShutdownReport {
    pub drain: DrainOutcome,
    /// Time from shutdown initiation until the resource was released.
    pub elapsed: Duration,
}

#[derive(Clone, Debug)]
struct ControllerOptions {
    name: String,
    drain_timeout: Duration,
    trap_signals: bool,
    force_on_second_signal: bool,
}

pub struct ControllerBuilder {
    options: ControllerOptions,
}

impl ControllerBuilder {
    /// Deadline for in-flight requests once shutdown begins (default 5s).
    pub fn with_drain_timeout(mut self, timeout: Duration) -> Self {
        self.options.drain_timeout = timeout;
        self
    }

    /// Install SIGINT/SIGTERM handlers (default true). Tests disable this and use
    /// [`ControllerHandle::request_shutdown`] instead.
    pub fn with_trap_signals(mut self, trap: bool) -> Self {
        self.options.trap_signals = trap;
        self
    }

    /// Let a second shutdown request end the drain immediately (default true).
    pub fn with_force_on_second_signal(mut self, force: bool) -> Self {
        self.options.force_on_second_signal = force;
        self
    }

    pub fn build(self) -> Controller {
        let (phase_tx, _) = watch::channel(Phase::Init);
        Controller {
            trigger: ShutdownTrigger::new(self.options.force_on_second_signal),
            options: self.options,
            phase_tx,
            local_addr: Arc::new(OnceLock::new()),
        }
    }
}

/// Owns the startup/shutdown ordering of one service process. Build it, grab a
/// [`handle`](Controller::handle) if something needs to observe or stop it, then
/// hand it to [`run`](Controller::run).
pub struct Controller {
    options: ControllerOptions,
    trigger: ShutdownTrigger,
    phase_tx: watch::Sender<Phase>,
    local_addr: Arc<OnceLock<SocketAddr>>,
}

impl Controller {
    pub fn builder(name: &str) -> ControllerBuilder {
        ControllerBuilder {
            options: ControllerOptions {
                name: name.to_string(),
                drain_timeout: Duration::from_secs(5),
                trap_signals: true,
                force_on_second_signal: true,
            },
        }
    }

    pub fn handle(&self) -> ControllerHandle {
        ControllerHandle {
            trigger: self.trigger.clone(),
            phase: self.phase_tx.subscribe(),
            local_addr: self.local_addr.clone(),
        }
    }

    /// Run the service to completion:
    ///
    /// 1. open the resource (failure is fatal, the listener is never bound)
    /// 2. build the router from it and bind `bind`
    /// 3. serve on a supervised task until a shutdown request
    /// 4. drain until in-flight requests finish, the deadline expires, or a second
    ///    request forces it
    /// 5. release the resource, exactly once
    ///
    /// A shutdown requested before the listener is bound stops cleanly without
    /// binding. Deadline expiry is reported in the [`ShutdownReport`], not as an error.
    pub async fn run<P, F>(
        self,
        provider: P,
        bind: &str,
        routes: F,
    ) -> Result<ShutdownReport, LifecycleError>
    where
        P: ResourceProvider,
        F: FnOnce(P::Resource) -> Router,
    {
        let span = tracing::info_span!("lifecycle", service = %self.options.name);
        self.run_inner(provider, bind, routes).instrument(span).await
    }

    async fn run_inner<P, F>(
        self,
        provider: P,
        bind: &str,
        routes: F,
    ) -> Result<ShutdownReport, LifecycleError>
    where
        P: ResourceProvider,
        F: FnOnce(P::Resource) -> Router,
    {
        let signal_task = if self.options.trap_signals {
            match signals::install() {
                Ok(installed) => Some(tokio::spawn(signals::forward(
                    installed,
                    self.trigger.clone(),
                ))),
                Err(e) => {
                    self.set_phase(Phase::Failed);
                    error!(error = ?e, "Lifecycle: could not install signal handlers");
                    return Err(LifecycleError::SignalHandler(e));
                }
            }
        } else {
            None
        };

        let result = self.run_phases(provider, bind, routes).await;

        if let Some(task) = signal_task {
            task.abort();
        }
        result
    }

    async fn run_phases<P, F>(
        &self,
        provider: P,
        bind: &str,
        routes: F,
    ) -> Result<ShutdownReport, LifecycleError>
    where
        P: ResourceProvider,
        F: FnOnce(P::Resource) -> Router,
    {
        let name = self.options.name.as_str();
        let shutdown = self.trigger.token();

        self.set_phase(Phase::Starting);
        info!(resource = provider.name(), "Lifecycle: opening resource");

        let opened = tokio::select! {
            biased;
            result = provider.open(&shutdown) => result,
            _ = shutdown.cancelled() => {
                return Ok(self.stop_before_listening(None, &provider).await);
            }
        };
        let resource = match opened {
            Ok(resource) => resource,
            Err(e) if shutdown.is_cancelled() => {
                debug!("Lifecycle: resource open aborted by shutdown: {}", e);
                return Ok(self.stop_before_listening(None, &provider).await);
            }
            Err(e) => {
                self.set_phase(Phase::Failed);
                error!(resource = provider.name(), error = ?e, "Lifecycle: failed to open resource");
                return Err(LifecycleError::ResourceOpen {
                    resource: provider.name(),
                    source: Box::new(e),
                });
            }
        };

        if shutdown.is_cancelled() {
            return Ok(self.stop_before_listening(Some(resource), &provider).await);
        }

        let app = routes(resource.clone());
        let server = match Server::bind(bind, app).await {
            Ok(server) => server,
            Err(e) => {
                error!(error = ?e, "Lifecycle: {}", e);
                provider.close(resource).await;
                self.set_phase(Phase::Failed);
                return Err(e);
            }
        };

        let addr = server.local_addr();
        if self.local_addr.set(addr).is_err() {
            warn!("Lifecycle: listener address already recorded");
        }
        let mut listener: JoinHandle<std::io::Result<()>> =
            tokio::spawn(server.serve(shutdown.clone()));
        self.set_phase(Phase::Running);
        info!(address = %addr, "{name} listening on {addr}");

        tokio::select! {
            biased;
            _ = shutdown.cancelled() => {}
            exited = &mut listener => {
                let err = match exited {
                    Ok(Ok(())) => LifecycleError::ListenerExited,
                    Ok(Err(e)) => LifecycleError::Listener(e),
                    Err(_) => LifecycleError::ListenerPanicked,
                };
                error!(error = ?err, "Lifecycle: {}", err);
                provider.close(resource).await;
                self.set_phase(Phase::Failed);
                return Err(err);
            }
        }

        let shutdown_clock = Instant::now();
        self.set_phase(Phase::ShuttingDown);
        metrics::emit_shutdown_initiated(name, "signal");
        info!(
            drain_timeout_secs = self.options.drain_timeout.as_secs_f64(),
            "Lifecycle: shutdown initiated, draining in-flight requests"
        );

        let forced = self.trigger.forced_token();
        let drain = tokio::select! {
            biased;
            exited = &mut listener => {
                match exited {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => warn!("Lifecycle: listener failed while draining: {}", e),
                    Err(e) => warn!("Lifecycle: listener task ended abnormally while draining: {}", e),
                }
                DrainOutcome::Completed
            }
            _ = forced.cancelled() => DrainOutcome::Forced,
            _ = tokio::time::sleep(self.options.drain_timeout) => DrainOutcome::DeadlineExpired,
        };

        if drain != DrainOutcome::Completed {
            warn!(
                drain = drain.as_str(),
                elapsed_secs = shutdown_clock.elapsed().as_secs_f64(),
                "Lifecycle: abandoning in-flight requests"
            );
            listener.abort();
            // wait for the connection tasks to be torn down before releasing the resource
            drop(listener.await);
        }

        info!(resource = provider.name(), "Lifecycle: releasing resource");
        provider.close(resource).await;

        let elapsed = shutdown_clock.elapsed();
        self.set_phase(Phase::Stopped);
        metrics::emit_shutdown_completed(name, drain, elapsed.as_secs_f64());
        info!(
            drain = drain.as_str(),
            total_duration_secs = elapsed.as_secs_f64(),
            "{name} stopped gracefully"
        );

        Ok(ShutdownReport { drain, elapsed })
    }

    async fn stop_before_listening<P>(
        &self,
        resource: Option<P::Resource>,
        provider: &P,
    ) -> ShutdownReport
    where
        P: ResourceProvider,
    {
        let clock = Instant::now();
        metrics::emit_shutdown_initiated(&self.options.name, "signal");
        info!("Lifecycle: shutdown requested during startup, listener not started");
        if let Some(resource) = resource {
            provider.close(resource).await;
        }
        let elapsed = clock.elapsed();
        self.set_phase(Phase::Stopped);
        metrics::emit_shutdown_completed(
            &self.options.name,
            DrainOutcome::Completed,
            elapsed.as_secs_f64(),
        );
        info!("{} stopped gracefully", self.options.name);
        ShutdownReport {
            drain: DrainOutcome::Completed,
            elapsed,
        }
    }

    fn set_phase(&self, phase: Phase) {
        let previous = self.phase_tx.send_replace(phase);
        metrics::emit_phase(&self.options.name, phase);
        debug!(from = %previous, to = %phase, "Lifecycle: phase transition");
    }
}
