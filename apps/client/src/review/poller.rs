//! Status poller — a cancellable background task that asks the service
//! whether the draft is ready.
//!
//! The task reports progress as `PollEvent`s over an mpsc channel and stops
//! on completion, after too many consecutive request failures, or when its
//! `PollHandle` is cancelled or dropped.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::api_client::GrantService;
use crate::errors::GENERIC_LOAD_ERROR;
use crate::models::{GenerationStatus, GrantContent};

#[derive(Debug, Clone, Copy)]
pub struct PollSettings {
    pub interval: Duration,
    /// Consecutive failed requests tolerated before giving up. Must be ≥ 1.
    pub max_consecutive_failures: u32,
}

#[derive(Debug, Clone)]
pub enum PollEvent {
    /// The service answered but the draft is not ready yet.
    Waiting {
        attempt: u32,
        status: GenerationStatus,
        message: Option<String>,
    },
    /// A request failed; another will be attempted.
    RequestFailed { consecutive: u32 },
    Completed(GrantContent),
    /// Polling gave up. Carries the message to show.
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Completed,
    Failed,
    Cancelled,
}

/// Owner's handle on a running poller. Dropping it cancels the task.
pub struct PollHandle {
    cancel: watch::Sender<bool>,
    task: Option<JoinHandle<PollOutcome>>,
}

impl PollHandle {
    pub fn cancel(&self) {
        let _ = self.cancel.send(true);
    }

    /// Waits for the task to stop and reports why it stopped.
    pub async fn finished(mut self) -> PollOutcome {
        match self.task.take() {
            Some(task) => task.await.unwrap_or_else(|e| {
                error!("Status poller task failed: {e}");
                PollOutcome::Cancelled
            }),
            None => PollOutcome::Cancelled,
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        let _ = self.cancel.send(true);
    }
}

/// Starts polling immediately on the current runtime.
pub fn spawn_poller(
    service: Arc<dyn GrantService>,
    settings: PollSettings,
    events: mpsc::UnboundedSender<PollEvent>,
) -> PollHandle {
    let (cancel, cancelled) = watch::channel(false);
    let task = tokio::spawn(run(service, settings, events, cancelled));
    PollHandle {
        cancel,
        task: Some(task),
    }
}

async fn run(
    service: Arc<dyn GrantService>,
    settings: PollSettings,
    events: mpsc::UnboundedSender<PollEvent>,
    mut cancel: watch::Receiver<bool>,
) -> PollOutcome {
    let max_failures = settings.max_consecutive_failures.max(1);
    let mut attempt = 0u32;
    let mut failures = 0u32;

    loop {
        attempt += 1;
        debug!(attempt, "Checking grant status...");

        let result = tokio::select! {
            result = service.status() => result,
            _ = cancelled(&mut cancel) => return stop(),
        };

        match result {
            Ok(response) => {
                failures = 0;
                match response.status {
                    GenerationStatus::Completed => {
                        info!(attempt, "Grant generation completed");
                        let content =
                            GrantContent::from_value(response.data.unwrap_or(Value::Null));
                        let _ = events.send(PollEvent::Completed(content));
                        return PollOutcome::Completed;
                    }
                    status => {
                        if status == GenerationStatus::Error {
                            warn!(
                                "Service reported an error: {}",
                                response.message.as_deref().unwrap_or("<no message>")
                            );
                        } else {
                            debug!("Grant status: {}", status.as_str());
                        }
                        let _ = events.send(PollEvent::Waiting {
                            attempt,
                            status,
                            message: response.message,
                        });
                    }
                }
            }
            Err(e) => {
                failures += 1;
                error!(failures, "Error checking status: {e}");
                if failures >= max_failures {
                    let message = e.user_message(GENERIC_LOAD_ERROR);
                    let _ = events.send(PollEvent::Failed(message));
                    return PollOutcome::Failed;
                }
                let _ = events.send(PollEvent::RequestFailed {
                    consecutive: failures,
                });
            }
        }

        tokio::select! {
            _ = tokio::time::sleep(settings.interval) => {}
            _ = cancelled(&mut cancel) => return stop(),
        }
    }
}

fn stop() -> PollOutcome {
    info!("Status polling cancelled");
    PollOutcome::Cancelled
}

/// Resolves once cancellation is requested or the handle is gone.
async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    loop {
        let requested = *cancel.borrow_and_update();
        if requested || cancel.changed().await.is_err() {
            return;
        }
    }
}
