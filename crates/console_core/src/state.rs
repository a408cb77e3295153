use std::time::Duration;

use crate::view_model::{
    render_file_list, AppViewModel, ConfirmView, TaskRowView, UploadRowView,
};
use crate::{
    Effect, FileEntry, ListKind, MessageSlot, Severity, TaskId, TaskPhase, UploadPolicy,
    DEFAULT_DISMISS_AFTER,
};

/// Finished tasks kept for display; older ones are dropped when new tasks
/// are tracked.
pub const MAX_FINISHED_TASKS: usize = 20;

/// A question waiting for a yes/no answer before its effect is issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingConfirmation {
    Delete { filename: String },
    Process { filename: String },
}

impl PendingConfirmation {
    pub fn prompt(&self) -> String {
        match self {
            PendingConfirmation::Delete { filename } => {
                format!("Are you sure you want to delete {filename}?")
            }
            PendingConfirmation::Process { filename } => {
                format!("Are you sure you want to process {filename}?")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TaskRecord {
    pub(crate) task_id: TaskId,
    pub(crate) filename: String,
    pub(crate) phase: TaskPhase,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct UploadRecord {
    name: String,
    sent: u64,
    total: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    policy: UploadPolicy,
    dismiss_after: Duration,
    uploaded: Vec<FileEntry>,
    processed: Vec<FileEntry>,
    tasks: Vec<TaskRecord>,
    /// Filenames sent for processing whose submission has not been answered.
    submitting: Vec<String>,
    uploads: Vec<UploadRecord>,
    messages: MessageSlot,
    alert: Option<String>,
    confirmation: Option<PendingConfirmation>,
    in_flight: usize,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_settings(UploadPolicy::default(), DEFAULT_DISMISS_AFTER)
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(policy: UploadPolicy, dismiss_after: Duration) -> Self {
        Self {
            policy,
            dismiss_after,
            uploaded: Vec::new(),
            processed: Vec::new(),
            tasks: Vec::new(),
            submitting: Vec::new(),
            uploads: Vec::new(),
            messages: MessageSlot::new(),
            alert: None,
            confirmation: None,
            in_flight: 0,
            dirty: false,
        }
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            uploaded: render_file_list(ListKind::Uploaded, &self.uploaded),
            processed: render_file_list(ListKind::Processed, &self.processed),
            message: self.messages.current().cloned(),
            alert: self.alert.clone(),
            confirmation: self.confirmation.as_ref().map(|pending| ConfirmView {
                prompt: pending.prompt(),
            }),
            tasks: self
                .tasks
                .iter()
                .map(|task| TaskRowView {
                    task_id: task.task_id.clone(),
                    filename: task.filename.clone(),
                    phase: task.phase.clone(),
                })
                .collect(),
            uploads: self
                .uploads
                .iter()
                .map(|upload| UploadRowView::new(&upload.name, upload.sent, upload.total))
                .collect(),
            busy: !self.is_settled(),
            dirty: self.dirty,
        }
    }

    /// Returns whether the state changed since the last call and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Nothing in flight: no request awaiting a response, no question
    /// awaiting an answer and no task still being polled.
    pub fn is_settled(&self) -> bool {
        self.in_flight == 0
            && self.confirmation.is_none()
            && self.tasks.iter().all(|task| task.phase.is_terminal())
    }

    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    pub fn files(&self, kind: ListKind) -> &[FileEntry] {
        match kind {
            ListKind::Uploaded => &self.uploaded,
            ListKind::Processed => &self.processed,
        }
    }

    /// True while a submission for `filename` awaits its answer or its
    /// task has not reached a terminal phase.
    pub fn has_active_task_for(&self, filename: &str) -> bool {
        self.submitting.iter().any(|pending| pending == filename)
            || self
                .tasks
                .iter()
                .any(|task| task.filename == filename && !task.phase.is_terminal())
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Bookkeeping for an effect that will answer with exactly one message.
    pub(crate) fn request(&mut self, effect: Effect) -> Effect {
        self.in_flight += 1;
        self.mark_dirty();
        effect
    }

    pub(crate) fn request_answered(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
        self.mark_dirty();
    }

    pub(crate) fn notify(&mut self, text: impl Into<String>, severity: Severity) -> Effect {
        let id = self.messages.show(text, severity);
        self.mark_dirty();
        Effect::DismissMessageAfter {
            id,
            after: self.dismiss_after,
        }
    }

    pub(crate) fn messages_mut(&mut self) -> &mut MessageSlot {
        &mut self.messages
    }

    pub(crate) fn raise_alert(&mut self, text: String) {
        self.alert = Some(text);
        self.mark_dirty();
    }

    pub(crate) fn clear_alert(&mut self) -> bool {
        self.alert.take().is_some()
    }

    pub(crate) fn set_files(&mut self, kind: ListKind, files: Vec<FileEntry>) {
        match kind {
            ListKind::Uploaded => self.uploaded = files,
            ListKind::Processed => self.processed = files,
        }
        self.mark_dirty();
    }

    pub(crate) fn ask(&mut self, pending: PendingConfirmation) {
        self.confirmation = Some(pending);
        self.mark_dirty();
    }

    pub(crate) fn take_confirmation(&mut self) -> Option<PendingConfirmation> {
        let pending = self.confirmation.take();
        if pending.is_some() {
            self.mark_dirty();
        }
        pending
    }

    pub(crate) fn start_submission(&mut self, filename: &str) {
        self.submitting.push(filename.to_string());
    }

    pub(crate) fn finish_submission(&mut self, filename: &str) {
        if let Some(index) = self.submitting.iter().position(|pending| pending == filename) {
            self.submitting.remove(index);
        }
    }

    pub(crate) fn task_mut(&mut self, task_id: &str) -> Option<&mut TaskRecord> {
        self.tasks.iter_mut().find(|task| task.task_id == task_id)
    }

    /// Registers a submitted task. Returns false if the id is already known.
    pub(crate) fn track_task(&mut self, task_id: TaskId, filename: String) -> bool {
        if self.tasks.iter().any(|task| task.task_id == task_id) {
            return false;
        }
        self.prune_finished_tasks();
        self.tasks.push(TaskRecord {
            task_id,
            filename,
            phase: TaskPhase::Submitted,
        });
        self.mark_dirty();
        true
    }

    /// Drops the oldest terminal tasks beyond [`MAX_FINISHED_TASKS`].
    fn prune_finished_tasks(&mut self) {
        let finished = self
            .tasks
            .iter()
            .filter(|task| task.phase.is_terminal())
            .count();
        let mut excess = finished.saturating_sub(MAX_FINISHED_TASKS);
        self.tasks.retain(|task| {
            if excess > 0 && task.phase.is_terminal() {
                excess -= 1;
                false
            } else {
                true
            }
        });
    }

    pub(crate) fn start_upload(&mut self, name: &str) {
        self.uploads.push(UploadRecord {
            name: name.to_string(),
            sent: 0,
            total: 0,
        });
        self.mark_dirty();
    }

    pub(crate) fn upload_progress(&mut self, name: &str, sent: u64, total: u64) {
        if let Some(upload) = self.uploads.iter_mut().find(|upload| upload.name == name) {
            upload.sent = sent;
            upload.total = total;
            self.mark_dirty();
        }
    }

    pub(crate) fn finish_upload(&mut self, name: &str) {
        if let Some(index) = self.uploads.iter().position(|upload| upload.name == name) {
            self.uploads.remove(index);
            self.mark_dirty();
        }
    }
}
