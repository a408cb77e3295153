use crate::{format_size, FileEntry, ListKind, Msg, Notice, TaskId, TaskPhase};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub uploaded: ListView,
    pub processed: ListView,
    pub message: Option<Notice>,
    pub alert: Option<String>,
    pub confirmation: Option<ConfirmView>,
    pub tasks: Vec<TaskRowView>,
    pub uploads: Vec<UploadRowView>,
    pub busy: bool,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListView {
    pub items: Vec<ListItemView>,
}

impl ListView {
    /// Item at a 1-based position, as numbered when rendered.
    pub fn item(&self, position: usize) -> Option<&ListItemView> {
        position.checked_sub(1).and_then(|index| self.items.get(index))
    }

    pub fn action_count(&self) -> usize {
        self.items.iter().map(|item| item.actions.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItemView {
    /// `None` for the placeholder item.
    pub filename: Option<String>,
    pub label: String,
    /// Nested stream lines; `None` when the file carries no stream metadata.
    pub details: Option<Vec<String>>,
    pub actions: Vec<ItemAction>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemAction {
    Process,
    Delete,
}

impl ItemAction {
    pub fn label(self) -> &'static str {
        match self {
            ItemAction::Process => "Process",
            ItemAction::Delete => "Delete",
        }
    }

    pub fn msg(self, filename: &str) -> Msg {
        let filename = filename.to_string();
        match self {
            ItemAction::Process => Msg::ProcessClicked { filename },
            ItemAction::Delete => Msg::DeleteClicked { filename },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmView {
    pub prompt: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRowView {
    pub task_id: TaskId,
    pub filename: String,
    pub phase: TaskPhase,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRowView {
    pub name: String,
    pub progress: String,
    pub percent: Option<u8>,
}

impl UploadRowView {
    pub fn new(name: &str, sent: u64, total: u64) -> Self {
        let percent = (total > 0).then(|| (sent.min(total) * 100 / total) as u8);
        Self {
            name: name.to_string(),
            progress: format!("{} / {}", format_size(sent), format_size(total)),
            percent,
        }
    }
}

/// Builds the list view for one collection. Pure and total: any
/// combination of present or missing stream fields renders.
pub fn render_file_list(kind: ListKind, files: &[FileEntry]) -> ListView {
    if files.is_empty() {
        let label = match kind {
            ListKind::Uploaded => "No files uploaded yet",
            ListKind::Processed => "No processed files yet",
        };
        return ListView {
            items: vec![ListItemView {
                filename: None,
                label: label.to_string(),
                details: None,
                actions: Vec::new(),
            }],
        };
    }

    let actions = match kind {
        ListKind::Uploaded => vec![ItemAction::Process, ItemAction::Delete],
        ListKind::Processed => Vec::new(),
    };

    ListView {
        items: files
            .iter()
            .map(|file| ListItemView {
                filename: Some(file.filename.clone()),
                label: format!("{} ({})", file.filename, file.size),
                details: file.has_stream_details().then(|| stream_lines(file)),
                actions: actions.clone(),
            })
            .collect(),
    }
}

fn stream_lines(file: &FileEntry) -> Vec<String> {
    let video = file.video_streams.iter().flatten().enumerate().map(|(index, video)| {
        format!(
            "Video Stream {}: {}, Resolution: {}, FPS: {}",
            index + 1,
            upper_or_unknown(video.codec.as_deref()),
            video.resolution.as_deref().unwrap_or("unknown"),
            video.fps.as_deref().unwrap_or("unknown"),
        )
    });
    let audio = file.audio_streams.iter().flatten().enumerate().map(|(index, audio)| {
        format!(
            "Audio Stream {}: {}, Language: {}",
            index + 1,
            upper_or_unknown(audio.codec.as_deref()),
            upper_or_unknown(audio.language.as_deref()),
        )
    });
    video.chain(audio).collect()
}

fn upper_or_unknown(value: Option<&str>) -> String {
    value.unwrap_or("unknown").to_uppercase()
}
