use std::sync::{mpsc, Arc};
use std::thread;

use anyhow::Context;
use console_core::{
    AudioStreamInfo, Effect, FileEntry, ListKind, Msg, PollResult, TaskPhase, VideoStreamInfo,
};
use console_engine::{
    Collection, EngineConfig, EngineEvent, EngineHandle, EventSink, MediaFile,
    PollOutcome, TaskStatus,
};
use console_logging::{console_debug, console_info};

use super::app::Inbox;

/// Turns effects from `update` into engine commands and timers.
pub struct EffectRunner {
    engine: EngineHandle,
    inbox: mpsc::Sender<Inbox>,
}

impl EffectRunner {
    pub fn new(config: EngineConfig, inbox: mpsc::Sender<Inbox>) -> anyhow::Result<Self> {
        console_info!("Using API at {}", config.api.base_url);
        let sink = Arc::new(MsgSink {
            inbox: inbox.clone(),
        });
        let engine = EngineHandle::new(config, sink).context("starting engine")?;
        Ok(Self { engine, inbox })
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::ListFiles { kind } => self.engine.list_files(map_kind(kind)),
                Effect::UploadFile { path, name } => {
                    console_info!("Upload {} from {:?}", name, path);
                    self.engine.upload(path, name);
                }
                Effect::DeleteFile { filename } => {
                    console_info!("Delete {}", filename);
                    self.engine.delete(filename);
                }
                Effect::SubmitProcess { filename } => {
                    console_info!("Submit {} for processing", filename);
                    self.engine.submit(filename);
                }
                Effect::StartPolling { task_id } => self.engine.start_polling(task_id),
                Effect::DismissMessageAfter { id, after } => {
                    let inbox = self.inbox.clone();
                    thread::spawn(move || {
                        thread::sleep(after);
                        let _ = inbox.send(Inbox::Msg(Msg::MessageExpired { id }));
                    });
                }
            }
        }
    }

    /// Cancels live pollers and stops the engine thread.
    pub fn shutdown(self) {
        self.engine.shutdown();
    }
}

struct MsgSink {
    inbox: mpsc::Sender<Inbox>,
}

impl EventSink for MsgSink {
    fn emit(&self, event: EngineEvent) {
        let msg = map_event(event);
        console_debug!("Engine message {:?}", msg);
        let _ = self.inbox.send(Inbox::Msg(msg));
    }
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::Listed { collection, result } => Msg::FilesListed {
            kind: map_collection(collection),
            result: result
                .map(|files| files.into_iter().map(map_file).collect())
                .map_err(|err| err.user_text()),
        },
        EngineEvent::UploadProgress { name, sent, total } => {
            Msg::UploadProgress { name, sent, total }
        }
        EngineEvent::Uploaded { name, result } => Msg::UploadFinished {
            name,
            result: result.map_err(|err| err.user_text()),
        },
        EngineEvent::Deleted { filename, result } => Msg::FileDeleted {
            filename,
            result: result.map_err(|err| err.user_text()),
        },
        EngineEvent::Submitted { filename, result } => Msg::ProcessSubmitted {
            filename,
            result: result.map_err(|err| err.user_text()),
        },
        EngineEvent::TaskStatus { task_id, report } => Msg::TaskStatusObserved {
            task_id,
            phase: map_status(report.status),
        },
        EngineEvent::PollFinished { task_id, outcome } => Msg::PollFinished {
            task_id,
            result: map_outcome(outcome),
        },
    }
}

fn map_kind(kind: ListKind) -> Collection {
    match kind {
        ListKind::Uploaded => Collection::Uploaded,
        ListKind::Processed => Collection::Processed,
    }
}

fn map_collection(collection: Collection) -> ListKind {
    match collection {
        Collection::Uploaded => ListKind::Uploaded,
        Collection::Processed => ListKind::Processed,
    }
}

fn map_file(file: MediaFile) -> FileEntry {
    FileEntry {
        filename: file.filename,
        size: file.size.unwrap_or_else(|| "unknown".to_string()),
        video_streams: file.video_streams.map(|streams| {
            streams
                .into_iter()
                .map(|stream| VideoStreamInfo {
                    codec: stream.codec,
                    resolution: stream.resolution,
                    fps: stream.fps,
                })
                .collect()
        }),
        audio_streams: file.audio_streams.map(|streams| {
            streams
                .into_iter()
                .map(|stream| AudioStreamInfo {
                    codec: stream.codec,
                    language: stream.language,
                })
                .collect()
        }),
    }
}

fn map_status(status: TaskStatus) -> TaskPhase {
    match status {
        TaskStatus::Queued => TaskPhase::Queued,
        TaskStatus::Processing => TaskPhase::Processing,
        TaskStatus::Completed => TaskPhase::Completed,
        TaskStatus::Error => TaskPhase::Failed,
        TaskStatus::Other(status) => TaskPhase::Other(status),
    }
}

fn map_outcome(outcome: PollOutcome) -> PollResult {
    match outcome {
        PollOutcome::Completed { filename } => PollResult::Completed { filename },
        PollOutcome::Failed { error } => PollResult::Failed { error },
        PollOutcome::TimedOut { .. } => PollResult::TimedOut,
        PollOutcome::Unreachable(err) => PollResult::Unreachable {
            reason: err.user_text(),
        },
        PollOutcome::Cancelled => PollResult::Cancelled,
    }
}
