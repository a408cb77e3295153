use crate::{DroppedFile, FileEntry, ListKind, NoticeId, PollResult, TaskId, TaskPhase};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Console opened; both lists are fetched.
    PageLoaded,
    /// User asked to re-fetch one of the lists.
    RefreshRequested(ListKind),
    /// User dropped or selected files for upload.
    FilesDropped(Vec<DroppedFile>),
    /// Engine progress for an upload.
    UploadProgress { name: String, sent: u64, total: u64 },
    /// Engine completion for an upload.
    UploadFinished {
        name: String,
        result: Result<(), String>,
    },
    /// Engine response for a listing request.
    FilesListed {
        kind: ListKind,
        result: Result<Vec<FileEntry>, String>,
    },
    /// User clicked Delete on an uploaded file.
    DeleteClicked { filename: String },
    /// User clicked Process on an uploaded file.
    ProcessClicked { filename: String },
    /// User answered the pending confirmation.
    ConfirmationAnswered(bool),
    /// Engine response for a delete request.
    FileDeleted {
        filename: String,
        result: Result<(), String>,
    },
    /// Engine response for a process submission.
    ProcessSubmitted {
        filename: String,
        result: Result<TaskId, String>,
    },
    /// A poll tick observed a non-terminal status.
    TaskStatusObserved { task_id: TaskId, phase: TaskPhase },
    /// A status poller stopped.
    PollFinished { task_id: TaskId, result: PollResult },
    /// Auto-dismiss timer for a message fired.
    MessageExpired { id: NoticeId },
    /// User clicked the message close control.
    MessageClosed,
    /// User acknowledged the blocking alert.
    AlertDismissed,
    /// Leaves the state untouched.
    NoOp,
}
