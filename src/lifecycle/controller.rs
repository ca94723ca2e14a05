//! Start/stop control of a single server instance.
//!
//! # Responsibilities
//! - Select plain or TLS serving, once, at construction
//! - Spawn the accept loop on its own task without blocking the caller
//! - Translate the loop's exit into exactly one completion outcome
//! - Keep an intentional stop from ever reading as a failure

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum_server::Handle;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::watch;

use crate::config::ServerConfig;
use crate::error::{report, Stage, StageError};
use crate::lifecycle::completion::{Completion, CompletionSender};
use crate::lifecycle::shutdown::{LifecycleState, Stopper};
use crate::net::tls::{load_tls_config, TlsError};

/// Parameters the controller is constructed with.
#[derive(Debug, Clone, Default)]
pub struct ServerParams {
    /// PEM certificate chain. Empty means unset.
    pub tls_cert_file: String,
    /// PEM private key. Empty means unset.
    pub tls_key_file: String,
    /// Drain deadline for in-flight connections on stop. `None` waits
    /// indefinitely.
    pub shutdown_grace: Option<Duration>,
}

impl ServerParams {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            tls_cert_file: config.tls.cert.clone(),
            tls_key_file: config.tls.key.clone(),
            shutdown_grace: Some(config.shutdown_grace()),
        }
    }
}

/// How connections are served for the whole of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServeMode {
    Plain,
    Tls { cert: PathBuf, key: PathBuf },
}

impl ServeMode {
    /// TLS iff both certificate and key are configured.
    pub fn select(params: &ServerParams) -> Self {
        if params.tls_cert_file.is_empty() || params.tls_key_file.is_empty() {
            ServeMode::Plain
        } else {
            ServeMode::Tls {
                cert: PathBuf::from(&params.tls_cert_file),
                key: PathBuf::from(&params.tls_key_file),
            }
        }
    }

    pub fn is_tls(&self) -> bool {
        matches!(self, ServeMode::Tls { .. })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ServeMode::Plain => "plain",
            ServeMode::Tls { .. } => "tls",
        }
    }
}

/// Why the serving task ended other than by request.
#[derive(Debug, Error)]
pub enum ServeError {
    #[error("failed to take over listener")]
    Listener(#[source] std::io::Error),
    #[error(transparent)]
    Tls(#[from] TlsError),
    #[error("server I/O failure")]
    Io(#[source] std::io::Error),
    #[error("server exited without a shutdown request")]
    UnexpectedExit,
    #[error("serving task ended without reporting an outcome")]
    Aborted,
}

/// How the serving task ended.
#[derive(Debug)]
pub enum ServeOutcome {
    /// Stopped on request. Not an error.
    Closed,
    Failed(ServeError),
}

impl ServeOutcome {
    /// Classify the accept loop's return. Only a clean return after a stop
    /// request counts as closed.
    pub fn classify(result: Result<(), ServeError>, stop_requested: bool) -> Self {
        match result {
            Ok(()) if stop_requested => ServeOutcome::Closed,
            Ok(()) => ServeOutcome::Failed(ServeError::UnexpectedExit),
            Err(err) => ServeOutcome::Failed(err),
        }
    }

    /// The value reported through the completion signal.
    pub fn into_result(self) -> Result<(), StageError> {
        match self {
            ServeOutcome::Closed => Ok(()),
            ServeOutcome::Failed(err) => Err(StageError::new(Stage::StartServer, err)),
        }
    }
}

/// Errors returned synchronously by the controller.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("server cannot be started again (state: {0})")]
    AlreadyStarted(LifecycleState),
}

/// Owns one server run: start on a listener, stop on request, report once.
pub struct LifecycleController {
    mode: ServeMode,
    app: Router,
    handle: Handle,
    state: Arc<watch::Sender<LifecycleState>>,
    stopper: Stopper,
}

impl LifecycleController {
    pub fn new(params: ServerParams, app: Router) -> Self {
        let mode = ServeMode::select(&params);
        let handle = Handle::new();
        let (state, _) = watch::channel(LifecycleState::Idle);
        let state = Arc::new(state);
        let stopper = Stopper::new(handle.clone(), Arc::clone(&state), params.shutdown_grace);

        Self {
            mode,
            app,
            handle,
            state,
            stopper,
        }
    }

    /// Serving mode chosen for this controller.
    pub fn mode(&self) -> &ServeMode {
        &self.mode
    }

    pub fn state(&self) -> LifecycleState {
        *self.state.borrow()
    }

    /// Subscribe to state transitions.
    pub fn watch_state(&self) -> watch::Receiver<LifecycleState> {
        self.state.subscribe()
    }

    /// A handle that can stop this controller from elsewhere.
    pub fn stopper(&self) -> Stopper {
        self.stopper.clone()
    }

    /// Start serving on `listener` in a spawned task and return immediately.
    ///
    /// Everything that goes wrong once the task is running is reported only
    /// through the returned [`Completion`]. Must be called within a tokio
    /// runtime.
    pub fn start(&self, listener: TcpListener) -> Result<Completion, LifecycleError> {
        let claimed = self.state.send_if_modified(|state| {
            if *state == LifecycleState::Idle {
                *state = LifecycleState::Running;
                true
            } else {
                false
            }
        });
        if !claimed {
            return Err(LifecycleError::AlreadyStarted(self.state()));
        }

        let (tx, completion) = Completion::channel();
        let mode = self.mode.clone();
        let app = self.app.clone();
        let handle = self.handle.clone();
        let state = Arc::clone(&self.state);

        tracing::info!(mode = mode.as_str(), "Starting server");

        let run = RunGuard::new(state, tx);
        tokio::spawn(async move {
            let result = serve(mode, listener, app, handle).await;
            run.finish(result);
        });

        Ok(completion)
    }

    /// Request a graceful shutdown. See [`Stopper::stop`].
    pub fn stop(&self) {
        self.stopper.stop();
    }
}

/// Settles one run: marks the controller `Stopped`, then reports through the
/// completion. Dropping it unfinished (the serving task panicked) settles the
/// run as [`ServeError::Aborted`].
struct RunGuard {
    state: Arc<watch::Sender<LifecycleState>>,
    tx: Option<CompletionSender>,
}

impl RunGuard {
    fn new(state: Arc<watch::Sender<LifecycleState>>, tx: CompletionSender) -> Self {
        Self {
            state,
            tx: Some(tx),
        }
    }

    fn finish(mut self, result: Result<(), ServeError>) {
        let previous = self.state.send_replace(LifecycleState::Stopped);
        let outcome = ServeOutcome::classify(result, previous == LifecycleState::ShuttingDown);

        match &outcome {
            ServeOutcome::Closed => tracing::info!("Server closed"),
            ServeOutcome::Failed(err) => {
                tracing::error!(error = %report(err), "Server failed")
            }
        }
        if let Some(tx) = self.tx.take() {
            tx.complete(outcome.into_result());
        }
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        let Some(tx) = self.tx.take() else {
            return;
        };

        self.state.send_replace(LifecycleState::Stopped);
        tracing::error!("Serving task ended without reporting an outcome");
        tx.complete(ServeOutcome::Failed(ServeError::Aborted).into_result());
    }
}

async fn serve(
    mode: ServeMode,
    listener: TcpListener,
    app: Router,
    handle: Handle,
) -> Result<(), ServeError> {
    let listener = listener.into_std().map_err(ServeError::Listener)?;
    let service = app.into_make_service();

    match mode {
        ServeMode::Plain => axum_server::from_tcp(listener)
            .handle(handle)
            .serve(service)
            .await
            .map_err(ServeError::Io),
        ServeMode::Tls { cert, key } => {
            let tls = load_tls_config(&cert, &key).await?;
            axum_server::from_tcp_rustls(listener, tls)
                .handle(handle)
                .serve(service)
                .await
                .map_err(ServeError::Io)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(cert: &str, key: &str) -> ServerParams {
        ServerParams {
            tls_cert_file: cert.to_string(),
            tls_key_file: key.to_string(),
            shutdown_grace: None,
        }
    }

    #[test]
    fn tls_needs_both_paths() {
        assert_eq!(ServeMode::select(&params("", "")), ServeMode::Plain);
        assert_eq!(ServeMode::select(&params("cert.pem", "")), ServeMode::Plain);
        assert_eq!(ServeMode::select(&params("", "key.pem")), ServeMode::Plain);
        assert_eq!(
            ServeMode::select(&params("cert.pem", "key.pem")),
            ServeMode::Tls {
                cert: PathBuf::from("cert.pem"),
                key: PathBuf::from("key.pem"),
            }
        );
    }

    #[test]
    fn clean_return_after_stop_is_closed() {
        let outcome = ServeOutcome::classify(Ok(()), true);
        assert!(matches!(outcome, ServeOutcome::Closed));
        assert!(outcome.into_result().is_ok());
    }

    #[test]
    fn clean_return_without_stop_is_a_failure() {
        let outcome = ServeOutcome::classify(Ok(()), false);
        assert!(matches!(
            outcome,
            ServeOutcome::Failed(ServeError::UnexpectedExit)
        ));
        let err = outcome.into_result().unwrap_err();
        assert_eq!(err.stage(), Stage::StartServer);
    }

    #[test]
    fn errors_fail_even_after_stop() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "accept failed");
        let outcome = ServeOutcome::classify(Err(ServeError::Io(io)), true);
        let err = outcome.into_result().unwrap_err();
        assert_eq!(err.stage(), Stage::StartServer);
        assert_eq!(
            report(&err),
            "start server: server I/O failure\ncaused by: accept failed"
        );
    }

    #[test]
    fn new_controller_is_idle() {
        let controller = LifecycleController::new(ServerParams::default(), Router::new());
        assert_eq!(controller.state(), LifecycleState::Idle);
        assert_eq!(controller.mode(), &ServeMode::Plain);
    }

    #[test]
    fn stop_before_start_leaves_controller_idle() {
        let controller = LifecycleController::new(ServerParams::default(), Router::new());
        controller.stop();
        assert_eq!(controller.state(), LifecycleState::Idle);
    }

    #[tokio::test]
    async fn panicking_serving_task_still_settles_the_run() {
        let (state, mut watcher) = watch::channel(LifecycleState::Running);
        let state = Arc::new(state);
        let stopper = Stopper::new(Handle::new(), Arc::clone(&state), None);
        let (tx, completion) = Completion::channel();

        let run = RunGuard::new(state, tx);
        let task = tokio::spawn(async move {
            let _run = run;
            panic!("handler blew up");
        });
        assert!(task.await.unwrap_err().is_panic());

        assert_eq!(*watcher.borrow_and_update(), LifecycleState::Stopped);
        assert!(!stopper.stop());
        assert_eq!(stopper.state(), LifecycleState::Stopped);

        let err = completion.wait().await.unwrap_err();
        assert_eq!(err.stage(), Stage::StartServer);
        assert!(matches!(
            err.into_source().downcast_ref::<ServeError>(),
            Some(ServeError::Aborted)
        ));
    }

    #[tokio::test]
    async fn finished_run_reports_once_and_stops() {
        let (state, _) = watch::channel(LifecycleState::ShuttingDown);
        let state = Arc::new(state);
        let (tx, completion) = Completion::channel();

        RunGuard::new(Arc::clone(&state), tx).finish(Ok(()));

        assert_eq!(*state.borrow(), LifecycleState::Stopped);
        assert!(completion.wait().await.is_ok());
    }
}
