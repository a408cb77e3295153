//! Upload console core: pure state machine and view-model helpers.
mod effect;
mod model;
mod msg;
mod notice;
mod state;
mod update;
mod upload;
mod view_model;

pub use effect::Effect;
pub use model::{AudioStreamInfo, FileEntry, ListKind, PollResult, TaskId, TaskPhase, VideoStreamInfo};
pub use msg::Msg;
pub use notice::{MessageSlot, Notice, NoticeId, Severity, DEFAULT_DISMISS_AFTER};
pub use state::{AppState, PendingConfirmation, MAX_FINISHED_TASKS};
pub use update::update;
pub use upload::{format_size, validate_drop, DroppedFile, RejectReason, Rejection, UploadPolicy};
pub use view_model::{
    render_file_list, AppViewModel, ConfirmView, ItemAction, ListItemView, ListView, TaskRowView,
    UploadRowView,
};
