//! Upload console engine: REST client, status pollers and effect execution.
mod api;
mod engine;
mod poll;
mod sink;
mod types;

pub use api::{ApiSettings, ConsoleApi, ReqwestApi};
pub use engine::{EngineConfig, EngineHandle};
pub use poll::{spawn_poll, PollHandle, PollSettings};
pub use sink::{ChannelEventSink, EventSink};
pub use types::{
    ApiError, AudioStream, Collection, EngineEvent, FailureKind, MediaFile, PollOutcome,
    StatusReport, TaskId, TaskStatus, VideoStream,
};
