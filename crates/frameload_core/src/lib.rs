//! Frame loader core: pure, single-threaded coordinator for a tree of nested
//! documents, their fetch jobs and their secondary resources.
mod address;
mod completion;
mod effect;
mod error;
mod events;
mod frame;
mod job;
mod loader;
mod msg;
mod queue;
mod types;
mod update;

pub use effect::{Effect, UiEvent, UiEventKind};
pub use error::{Failure, LoadError, TransportError};
pub use frame::FrameView;
pub use job::{FetchJob, JobEvent, JobState};
pub use loader::FrameLoader;
pub use msg::Msg;
pub use queue::{ResourceRequest, SecondaryRequestQueue};
pub use types::{
    Color, FrameId, FrameSettings, JobId, LoadState, LoaderConfig, Navigation, OpenOptions,
    Outcome, QueueStats, DEFAULT_REQUEST_LIMIT,
};
pub use update::update;
