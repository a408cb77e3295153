use std::path::PathBuf;
use std::time::Duration;

use crate::{ListKind, NoticeId, TaskId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    ListFiles { kind: ListKind },
    UploadFile { path: PathBuf, name: String },
    DeleteFile { filename: String },
    SubmitProcess { filename: String },
    StartPolling { task_id: TaskId },
    DismissMessageAfter { id: NoticeId, after: Duration },
}
