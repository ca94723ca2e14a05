//! lifeline server entry point.

use std::process::ExitCode;

use lifeline::error;
use lifeline::lifecycle::{signals, startup};

#[tokio::main]
async fn main() -> ExitCode {
    let running = startup::start(std::env::args_os().skip(1)).await;

    if let Some(stopper) = running.stopper() {
        tokio::spawn(signals::stop_on_signal(stopper));
    }

    match running.wait().await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Error starting server: {}", error::report(&err));
            ExitCode::FAILURE
        }
    }
}
