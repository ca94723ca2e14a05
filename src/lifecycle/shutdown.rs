//! Shutdown coordination for the server.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use axum_server::Handle;
use tokio::sync::watch;

/// Where a controller is in its run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Constructed, not started.
    Idle,
    /// Serving task spawned.
    Running,
    /// Graceful shutdown requested, serving task still unwinding.
    ShuttingDown,
    /// Serving task finished. Terminal.
    Stopped,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LifecycleState::Idle => "idle",
            LifecycleState::Running => "running",
            LifecycleState::ShuttingDown => "shutting down",
            LifecycleState::Stopped => "stopped",
        })
    }
}

/// Requests graceful shutdown of a running controller.
///
/// Cheap to clone; hand one to a signal task or anything else that may need
/// to stop the server. Only the first effective call does anything.
#[derive(Clone)]
pub struct Stopper {
    handle: Handle,
    state: Arc<watch::Sender<LifecycleState>>,
    grace: Option<Duration>,
}

impl Stopper {
    pub(crate) fn new(
        handle: Handle,
        state: Arc<watch::Sender<LifecycleState>>,
        grace: Option<Duration>,
    ) -> Self {
        Self {
            handle,
            state,
            grace,
        }
    }

    /// Ask the server to stop accepting connections and drain.
    ///
    /// Returns `true` when this call initiated the shutdown. Calls before
    /// start, after the server stopped, or after another stop are no-ops.
    pub fn stop(&self) -> bool {
        let initiated = self.state.send_if_modified(|state| {
            if *state == LifecycleState::Running {
                *state = LifecycleState::ShuttingDown;
                true
            } else {
                false
            }
        });

        if initiated {
            tracing::info!(
                grace_secs = self.grace.map(|g| g.as_secs()),
                "Graceful shutdown requested"
            );
            self.handle.graceful_shutdown(self.grace);
        } else {
            tracing::debug!(state = %*self.state.borrow(), "Stop ignored");
        }
        initiated
    }

    /// Current state of the controller this stopper belongs to.
    pub fn state(&self) -> LifecycleState {
        *self.state.borrow()
    }
}

impl fmt::Debug for Stopper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stopper")
            .field("state", &*self.state.borrow())
            .field("grace", &self.grace)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stopper_in(state: LifecycleState) -> Stopper {
        let (tx, _) = watch::channel(state);
        Stopper::new(Handle::new(), Arc::new(tx), None)
    }

    #[test]
    fn stop_while_running_initiates_once() {
        let stopper = stopper_in(LifecycleState::Running);
        assert!(stopper.stop());
        assert_eq!(stopper.state(), LifecycleState::ShuttingDown);
        assert!(!stopper.stop());
        assert_eq!(stopper.state(), LifecycleState::ShuttingDown);
    }

    #[test]
    fn stop_before_start_is_ignored() {
        let stopper = stopper_in(LifecycleState::Idle);
        assert!(!stopper.stop());
        assert_eq!(stopper.state(), LifecycleState::Idle);
    }

    #[test]
    fn stop_after_stopped_is_ignored() {
        let stopper = stopper_in(LifecycleState::Stopped);
        assert!(!stopper.stop());
        assert_eq!(stopper.state(), LifecycleState::Stopped);
    }

    #[test]
    fn clones_share_the_guard() {
        let stopper = stopper_in(LifecycleState::Running);
        let other = stopper.clone();
        assert!(other.stop());
        assert!(!stopper.stop());
    }

    #[test]
    fn concurrent_stops_initiate_exactly_once() {
        let stopper = stopper_in(LifecycleState::Running);
        let initiated: usize = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    let stopper = stopper.clone();
                    scope.spawn(move || stopper.stop())
                })
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap() as usize)
                .sum()
        });
        assert_eq!(initiated, 1);
    }
}
