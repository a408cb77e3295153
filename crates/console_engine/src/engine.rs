use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use console_logging::{console_debug, console_error, console_info, console_warn};
use tokio::sync::mpsc;

use crate::poll::{spawn_poll, PollHandle, PollSettings};
use crate::{
    ApiError, ApiSettings, Collection, ConsoleApi, EngineEvent, EventSink, FailureKind,
    ReqwestApi, TaskId,
};

#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub api: ApiSettings,
    pub poll: PollSettings,
}

enum EngineCommand {
    List { collection: Collection },
    Upload { path: PathBuf, name: String },
    Delete { filename: String },
    Submit { filename: String },
    StartPolling { task_id: TaskId },
    Shutdown,
}

/// Runs requests and pollers on a dedicated runtime thread. Results are
/// delivered to the [`EventSink`] given at construction.
pub struct EngineHandle {
    cmd_tx: mpsc::UnboundedSender<EngineCommand>,
    worker: Option<thread::JoinHandle<()>>,
}

impl EngineHandle {
    pub fn new(config: EngineConfig, sink: Arc<dyn EventSink>) -> Result<Self, ApiError> {
        let api = Arc::new(ReqwestApi::new(config.api)?);
        Self::with_api(api, config.poll, sink)
    }

    pub fn with_api(
        api: Arc<dyn ConsoleApi>,
        poll: PollSettings,
        sink: Arc<dyn EventSink>,
    ) -> Result<Self, ApiError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("console-engine-worker")
            .enable_all()
            .build()
            .map_err(|err| ApiError::new(FailureKind::Io, err.to_string()))?;
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();

        let worker = thread::Builder::new()
            .name("console-engine".to_string())
            .spawn(move || runtime.block_on(command_loop(api, poll, sink, cmd_rx)))
            .map_err(|err| ApiError::new(FailureKind::Io, err.to_string()))?;

        Ok(Self {
            cmd_tx,
            worker: Some(worker),
        })
    }

    pub fn list_files(&self, collection: Collection) {
        self.send(EngineCommand::List { collection });
    }

    pub fn upload(&self, path: impl Into<PathBuf>, name: impl Into<String>) {
        self.send(EngineCommand::Upload {
            path: path.into(),
            name: name.into(),
        });
    }

    pub fn delete(&self, filename: impl Into<String>) {
        self.send(EngineCommand::Delete {
            filename: filename.into(),
        });
    }

    pub fn submit(&self, filename: impl Into<String>) {
        self.send(EngineCommand::Submit {
            filename: filename.into(),
        });
    }

    /// Starts a poller unless one is already live for `task_id`.
    pub fn start_polling(&self, task_id: impl Into<TaskId>) {
        self.send(EngineCommand::StartPolling {
            task_id: task_id.into(),
        });
    }

    /// Cancels all pollers and waits for the runtime thread to exit.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        let _ = self.cmd_tx.send(EngineCommand::Shutdown);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                console_error!("Engine thread panicked");
            }
        }
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            console_warn!("Engine command dropped: runtime thread has exited");
        }
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn command_loop(
    api: Arc<dyn ConsoleApi>,
    poll: PollSettings,
    sink: Arc<dyn EventSink>,
    mut cmd_rx: mpsc::UnboundedReceiver<EngineCommand>,
) {
    let mut pollers: HashMap<TaskId, PollHandle> = HashMap::new();

    while let Some(command) = cmd_rx.recv().await {
        pollers.retain(|_, handle| !handle.is_finished());
        match command {
            EngineCommand::StartPolling { task_id } => {
                if pollers.contains_key(&task_id) {
                    console_warn!("Task {} is already being polled", task_id);
                    continue;
                }
                let handle = spawn_poll(api.clone(), task_id.clone(), poll.clone(), sink.clone());
                pollers.insert(task_id, handle);
            }
            EngineCommand::Shutdown => break,
            request => {
                let api = api.clone();
                let sink = sink.clone();
                tokio::spawn(async move {
                    handle_request(api.as_ref(), request, sink).await;
                });
            }
        }
    }

    console_info!("Engine shutting down; cancelling {} poller(s)", pollers.len());
    for handle in pollers.values() {
        handle.cancel();
    }
    for (_, handle) in pollers {
        let _ = handle.wait().await;
    }
}

async fn handle_request(api: &dyn ConsoleApi, command: EngineCommand, sink: Arc<dyn EventSink>) {
    let event = match command {
        EngineCommand::List { collection } => {
            console_debug!("Listing {:?} files", collection);
            EngineEvent::Listed {
                collection,
                result: api.list_files(collection).await,
            }
        }
        EngineCommand::Upload { path, name } => {
            let result = api.upload_file(&path, &name, sink.clone()).await;
            EngineEvent::Uploaded { name, result }
        }
        EngineCommand::Delete { filename } => {
            let result = api.delete_file(&filename).await;
            EngineEvent::Deleted { filename, result }
        }
        EngineCommand::Submit { filename } => {
            let result = api.submit_process(&filename).await;
            EngineEvent::Submitted { filename, result }
        }
        EngineCommand::StartPolling { .. }
        | EngineCommand::Shutdown => return,
    };
    if let Some(err) = failure_of(&event) {
        console_warn!("Request failed: {}", err);
    }
    sink.emit(event);
}

fn failure_of(event: &EngineEvent) -> Option<&ApiError> {
    match event {
        EngineEvent::Listed { result: Err(err), .. }
        | EngineEvent::Uploaded { result: Err(err), .. }
        | EngineEvent::Deleted { result: Err(err), .. }
        | EngineEvent::Submitted { result: Err(err), .. } => Some(err),
        _ => None,
    }
}
