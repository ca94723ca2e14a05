//! Startup orchestration.
//!
//! # Responsibilities
//! - Parse flags and load configuration
//! - Initialize logging from the loaded configuration
//! - Build the application router and bind the listener
//! - Start the controller and hand back everything needed to wait or stop
//!
//! # Design Decisions
//! - Fail fast: every setup error is fatal and names its stage
//! - Setup errors are delivered through the same completion as serving
//!   errors, so the entry point has a single place to wait
//! - The listener binds last (traffic only when ready)

use std::ffi::OsString;
use std::net::SocketAddr;

use clap::error::ErrorKind;
use tokio::net::TcpListener;

use crate::cli::Cli;
use crate::config::{read_config, ServerConfig};
use crate::error::{report, Stage, StageError};
use crate::http::build_router;
use crate::lifecycle::completion::Completion;
use crate::lifecycle::controller::{LifecycleController, ServerParams};
use crate::lifecycle::shutdown::Stopper;
use crate::net::listener;
use crate::observability::logging;

/// A configured but not yet started server.
pub struct Configured {
    pub config: ServerConfig,
    pub listener: TcpListener,
    pub local_addr: SocketAddr,
    pub controller: LifecycleController,
}

/// Run every setup phase up to, not including, serving.
///
/// `args` exclude the program name. `--help` and `--version` print and exit
/// the process.
pub async fn configure<I, T>(args: I) -> Result<Configured, StageError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let cli = match Cli::parse_args(args) {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => return Err(StageError::new(Stage::ParseFlags, e)),
    };

    let config = read_config(&cli.config_files(), std::env::vars())
        .map_err(|e| StageError::new(Stage::ReadConfig, e))?;

    logging::try_init(&config.log).map_err(|e| StageError::new(Stage::InitLogging, e))?;
    tracing::info!(config = ?config, "Using config");

    let app = build_router(&config);

    let (listener, local_addr) = listener::bind(&config.bind_address())
        .await
        .map_err(|e| StageError::new(Stage::Listen, e))?;

    let controller = LifecycleController::new(ServerParams::from_config(&config), app);

    Ok(Configured {
        config,
        listener,
        local_addr,
        controller,
    })
}

/// A started server, or the record of why it never started.
pub struct Running {
    local_addr: Option<SocketAddr>,
    controller: Option<LifecycleController>,
    completion: Completion,
}

impl Running {
    fn failed(err: StageError) -> Self {
        Self {
            local_addr: None,
            controller: None,
            completion: Completion::resolved(Err(err)),
        }
    }

    /// Address the server listens on; `None` if setup failed.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// A stop handle for other tasks; `None` if setup failed.
    pub fn stopper(&self) -> Option<Stopper> {
        self.controller.as_ref().map(LifecycleController::stopper)
    }

    /// Request a graceful shutdown. No-op if setup failed.
    pub fn stop(&self) {
        if let Some(controller) = &self.controller {
            controller.stop();
        }
    }

    /// Wait for the terminal outcome.
    pub async fn wait(self) -> Result<(), StageError> {
        self.completion.wait().await
    }
}

/// Configure and start the server.
///
/// Never fails directly: a setup failure comes back as a [`Running`] whose
/// completion already holds the error, annotated with `configure`.
pub async fn start<I, T>(args: I) -> Running
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let Configured {
        listener,
        local_addr,
        controller,
        ..
    } = match configure(args).await {
        Ok(configured) => configured,
        Err(err) => {
            tracing::error!(error = %report(&err), "Setup failed");
            return Running::failed(StageError::new(Stage::Configure, err));
        }
    };

    tracing::info!(address = %local_addr, "Listening");

    match controller.start(listener) {
        Ok(completion) => Running {
            local_addr: Some(local_addr),
            controller: Some(controller),
            completion,
        },
        Err(err) => Running::failed(StageError::new(Stage::StartServer, err)),
    }
}
