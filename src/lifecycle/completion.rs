//! Single-use completion signal for a serving task.

use tokio::sync::oneshot;

use crate::error::{Stage, StageError};
use crate::lifecycle::controller::ServeError;

type Outcome = Result<(), StageError>;

/// Write side, owned by the serving task. Consumed by its single send.
#[derive(Debug)]
pub(crate) struct CompletionSender {
    tx: oneshot::Sender<Outcome>,
}

impl CompletionSender {
    pub(crate) fn complete(self, outcome: Outcome) {
        // Nobody waiting is fine: the outcome was already logged.
        let _ = self.tx.send(outcome);
    }
}

/// Terminal outcome of a server run.
///
/// Resolves exactly once: `Ok(())` after an intentional stop, `Err` for any
/// other reason the server ended.
#[derive(Debug)]
pub struct Completion {
    rx: oneshot::Receiver<Outcome>,
}

impl Completion {
    pub(crate) fn channel() -> (CompletionSender, Completion) {
        let (tx, rx) = oneshot::channel();
        (CompletionSender { tx }, Completion { rx })
    }

    /// A completion that is already resolved, e.g. because setup failed
    /// before anything could be served.
    pub fn resolved(outcome: Result<(), StageError>) -> Self {
        let (tx, completion) = Self::channel();
        tx.complete(outcome);
        completion
    }

    /// Wait for the server to finish.
    ///
    /// A serving task that died without reporting (a panic) counts as a
    /// failure.
    pub async fn wait(self) -> Result<(), StageError> {
        match self.rx.await {
            Ok(outcome) => outcome,
            Err(_) => Err(StageError::new(Stage::StartServer, ServeError::Aborted)),
        }
    }
}
