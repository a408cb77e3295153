use std::sync::Arc;
use std::time::Duration;

use console_logging::{console_debug, console_info, console_warn};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::{ConsoleApi, EngineEvent, EventSink, PollOutcome, TaskId, TaskStatus};

#[derive(Debug, Clone)]
pub struct PollSettings {
    pub interval: Duration,
    /// Give up after this long; `None` polls until a terminal status.
    pub max_duration: Option<Duration>,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            max_duration: Some(Duration::from_secs(60 * 60)),
        }
    }
}

/// Owned handle to a running status poller. Dropping the handle does not
/// stop the poller; call [`PollHandle::cancel`].
#[derive(Debug)]
pub struct PollHandle {
    task_id: TaskId,
    token: CancellationToken,
    join: JoinHandle<PollOutcome>,
}

impl PollHandle {
    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    pub async fn wait(self) -> PollOutcome {
        self.join.await.unwrap_or(PollOutcome::Cancelled)
    }
}

/// Starts polling the status endpoint for `task_id`. Must be called from
/// within a tokio runtime. The final outcome is both emitted to `sink` as
/// [`EngineEvent::PollFinished`] and returned from [`PollHandle::wait`].
pub fn spawn_poll(
    api: Arc<dyn ConsoleApi>,
    task_id: TaskId,
    settings: PollSettings,
    sink: Arc<dyn EventSink>,
) -> PollHandle {
    let token = CancellationToken::new();
    let join = tokio::spawn(run_poll(
        api,
        task_id.clone(),
        settings,
        sink,
        token.clone(),
    ));
    PollHandle {
        task_id,
        token,
        join,
    }
}

async fn run_poll(
    api: Arc<dyn ConsoleApi>,
    task_id: TaskId,
    settings: PollSettings,
    sink: Arc<dyn EventSink>,
    token: CancellationToken,
) -> PollOutcome {
    console_info!("Polling task {} every {:?}", task_id, settings.interval);
    let outcome = poll_until_done(api.as_ref(), &task_id, &settings, sink.as_ref(), &token).await;
    console_info!("Stopped polling task {}: {:?}", task_id, outcome);
    sink.emit(EngineEvent::PollFinished {
        task_id,
        outcome: outcome.clone(),
    });
    outcome
}

async fn poll_until_done(
    api: &dyn ConsoleApi,
    task_id: &str,
    settings: &PollSettings,
    sink: &dyn EventSink,
    token: &CancellationToken,
) -> PollOutcome {
    let started = Instant::now();
    // First request one interval after submission, like a repeating timer.
    let mut ticker = tokio::time::interval_at(started + settings.interval, settings.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = token.cancelled() => return PollOutcome::Cancelled,
            _ = ticker.tick() => {}
        }

        let elapsed = started.elapsed();
        if settings.max_duration.is_some_and(|max| elapsed >= max) {
            console_warn!("Task {} still running after {:?}; giving up", task_id, elapsed);
            return PollOutcome::TimedOut { elapsed };
        }

        let result = tokio::select! {
            _ = token.cancelled() => return PollOutcome::Cancelled,
            result = api.task_status(task_id) => result,
        };

        match result {
            Ok(report) => match report.status {
                TaskStatus::Completed => {
                    return PollOutcome::Completed {
                        filename: report.filename,
                    }
                }
                TaskStatus::Error => {
                    return PollOutcome::Failed {
                        error: report.error,
                    }
                }
                _ => sink.emit(EngineEvent::TaskStatus {
                    task_id: task_id.to_string(),
                    report,
                }),
            },
            Err(err) if err.is_transport() => {
                console_warn!("Status check for task {} failed: {}", task_id, err);
                return PollOutcome::Unreachable(err);
            }
            Err(err) => {
                // The server answered; keep polling.
                console_debug!("Status check for task {} answered {}", task_id, err);
            }
        }
    }
}
