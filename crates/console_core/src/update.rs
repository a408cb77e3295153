use crate::{
    validate_drop, AppState, Effect, ListKind, Msg, PendingConfirmation, PollResult, Severity,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::PageLoaded => vec![
            state.request(Effect::ListFiles {
                kind: ListKind::Uploaded,
            }),
            state.request(Effect::ListFiles {
                kind: ListKind::Processed,
            }),
        ],
        Msg::RefreshRequested(kind) => vec![state.request(Effect::ListFiles { kind })],
        Msg::FilesDropped(files) => {
            if files.is_empty() {
                return (state, Vec::new());
            }
            let (accepted, rejected) = validate_drop(state.policy(), files);
            if !rejected.is_empty() {
                let lines: Vec<String> = rejected.iter().map(ToString::to_string).collect();
                state.raise_alert(lines.join("\n"));
            }
            accepted
                .into_iter()
                .map(|file| {
                    state.start_upload(&file.name);
                    state.request(Effect::UploadFile {
                        path: file.path,
                        name: file.name,
                    })
                })
                .collect()
        }
        Msg::UploadProgress { name, sent, total } => {
            state.upload_progress(&name, sent, total);
            Vec::new()
        }
        Msg::UploadFinished { name, result } => {
            state.request_answered();
            state.finish_upload(&name);
            match result {
                Ok(()) => vec![state.request(Effect::ListFiles {
                    kind: ListKind::Uploaded,
                })],
                Err(_) => {
                    state.raise_alert(format!("File {name} is too large or failed to upload!"));
                    Vec::new()
                }
            }
        }
        Msg::FilesListed { kind, result } => {
            state.request_answered();
            match result {
                Ok(files) => {
                    state.set_files(kind, files);
                    Vec::new()
                }
                Err(reason) => {
                    let what = match kind {
                        ListKind::Uploaded => "files",
                        ListKind::Processed => "processed files",
                    };
                    vec![state.notify(format!("Error fetching {what}: {reason}"), Severity::Error)]
                }
            }
        }
        Msg::DeleteClicked { filename } => {
            state.ask(PendingConfirmation::Delete { filename });
            Vec::new()
        }
        Msg::ProcessClicked { filename } => {
            if state.has_active_task_for(&filename) {
                vec![already_processing(&mut state, &filename)]
            } else {
                state.ask(PendingConfirmation::Process { filename });
                Vec::new()
            }
        }
        Msg::ConfirmationAnswered(accepted) => match state.take_confirmation() {
            Some(PendingConfirmation::Delete { filename }) if accepted => {
                vec![state.request(Effect::DeleteFile { filename })]
            }
            Some(PendingConfirmation::Process { filename }) if accepted => {
                if state.has_active_task_for(&filename) {
                    vec![already_processing(&mut state, &filename)]
                } else {
                    state.start_submission(&filename);
                    vec![state.request(Effect::SubmitProcess { filename })]
                }
            }
            _ => Vec::new(),
        },
        Msg::FileDeleted { filename: _, result } => {
            state.request_answered();
            match result {
                Ok(()) => vec![
                    state.notify("File has been deleted", Severity::Success),
                    state.request(Effect::ListFiles {
                        kind: ListKind::Uploaded,
                    }),
                ],
                Err(reason) => vec![state.notify(
                    format!("Error deleting file: {reason}"),
                    Severity::Error,
                )],
            }
        }
        Msg::ProcessSubmitted { filename, result } => {
            state.request_answered();
            state.finish_submission(&filename);
            match result {
                Ok(task_id) => {
                    let mut effects = vec![state.notify(
                        format!("Video added to processing queue: {task_id}"),
                        Severity::Success,
                    )];
                    if state.track_task(task_id.clone(), filename) {
                        effects.push(Effect::StartPolling { task_id });
                    }
                    effects
                }
                Err(reason) => vec![state.notify(
                    format!("Error processing file: {reason}"),
                    Severity::Error,
                )],
            }
        }
        Msg::TaskStatusObserved { task_id, phase } => {
            let changed = match state.task_mut(&task_id) {
                Some(task) if !task.phase.is_terminal() && !phase.is_terminal() => {
                    let changed = task.phase != phase;
                    task.phase = phase;
                    changed
                }
                _ => false,
            };
            if changed {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::PollFinished { task_id, result } => {
            let filename = match state.task_mut(&task_id) {
                Some(task) if !task.phase.is_terminal() => {
                    task.phase = result.phase();
                    task.filename.clone()
                }
                // Unknown task or outcome already applied.
                _ => return (state, Vec::new()),
            };
            state.mark_dirty();
            match result {
                PollResult::Completed { filename: reported } => vec![
                    state.notify(
                        format!("Processing completed: {}", reported.unwrap_or(filename)),
                        Severity::Success,
                    ),
                    state.request(Effect::ListFiles {
                        kind: ListKind::Processed,
                    }),
                ],
                PollResult::Failed { error } => vec![state.notify(
                    format!(
                        "Processing error: {}",
                        error.unwrap_or_else(|| "unknown error".to_string())
                    ),
                    Severity::Error,
                )],
                PollResult::TimedOut => vec![state.notify(
                    format!("Processing timed out: {filename}"),
                    Severity::Error,
                )],
                PollResult::Unreachable { reason } => vec![state.notify(
                    format!("Error checking status: {reason}"),
                    Severity::Error,
                )],
                PollResult::Cancelled => Vec::new(),
            }
        }
        Msg::MessageExpired { id } => {
            if state.messages_mut().expire(id) {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::MessageClosed => {
            if state.messages_mut().close() {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::AlertDismissed => {
            if state.clear_alert() {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn already_processing(state: &mut AppState, filename: &str) -> Effect {
    state.notify(format!("{filename} is already being processed"), Severity::Info)
}
