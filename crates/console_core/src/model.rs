pub type TaskId = String;

/// Which server-side collection a list refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListKind {
    Uploaded,
    Processed,
}

/// One file as mirrored from a listing response.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FileEntry {
    pub filename: String,
    pub size: String,
    pub video_streams: Option<Vec<VideoStreamInfo>>,
    pub audio_streams: Option<Vec<AudioStreamInfo>>,
}

impl FileEntry {
    pub fn new(filename: impl Into<String>, size: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            size: size.into(),
            video_streams: None,
            audio_streams: None,
        }
    }

    /// True when the server reported stream metadata of either kind.
    pub fn has_stream_details(&self) -> bool {
        self.video_streams.is_some() || self.audio_streams.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VideoStreamInfo {
    pub codec: Option<String>,
    pub resolution: Option<String>,
    pub fps: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AudioStreamInfo {
    pub codec: Option<String>,
    pub language: Option<String>,
}

/// Client-side view of a processing task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskPhase {
    /// Submission accepted, no status observed yet.
    Submitted,
    Queued,
    Processing,
    /// Server reported a status this client does not know; still polling.
    Other(String),
    Completed,
    Failed,
    TimedOut,
    Unreachable,
    Cancelled,
}

impl TaskPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskPhase::Completed
                | TaskPhase::Failed
                | TaskPhase::TimedOut
                | TaskPhase::Unreachable
                | TaskPhase::Cancelled
        )
    }

    pub fn label(&self) -> &str {
        match self {
            TaskPhase::Submitted => "submitted",
            TaskPhase::Queued => "queued",
            TaskPhase::Processing => "processing",
            TaskPhase::Other(status) => status.as_str(),
            TaskPhase::Completed => "completed",
            TaskPhase::Failed => "error",
            TaskPhase::TimedOut => "timed out",
            TaskPhase::Unreachable => "unreachable",
            TaskPhase::Cancelled => "cancelled",
        }
    }
}

/// How a status poller ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollResult {
    Completed { filename: Option<String> },
    Failed { error: Option<String> },
    TimedOut,
    Unreachable { reason: String },
    Cancelled,
}

impl PollResult {
    pub fn phase(&self) -> TaskPhase {
        match self {
            PollResult::Completed { .. } => TaskPhase::Completed,
            PollResult::Failed { .. } => TaskPhase::Failed,
            PollResult::TimedOut => TaskPhase::TimedOut,
            PollResult::Unreachable { .. } => TaskPhase::Unreachable,
            PollResult::Cancelled => TaskPhase::Cancelled,
        }
    }
}
