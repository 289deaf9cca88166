use crate::{FrameId, FrameSettings, JobEvent, JobId, OpenOptions};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User opened a URL in the top-level frame.
    OpenUrl { url: String, options: OpenOptions },
    /// Link activation in `source`, honouring its `target` attribute.
    Navigate {
        source: FrameId,
        target: Option<String>,
        url: String,
        options: OpenOptions,
    },
    /// User pressed Stop.
    Stop,
    StopFrame(FrameId),
    /// Reload everything, framesets included.
    Reload,
    /// Reload leaf frames only, keeping frameset documents.
    ReloadFrames,
    /// Transport callback for a job.
    Job { job_id: JobId, event: JobEvent },
    /// Parser found a nested frame element.
    AddChildFrame {
        parent: FrameId,
        name: Option<String>,
    },
    RequestResource { frame: FrameId, url: String },
    CancelResource { frame: FrameId, url: String },
    SetSettings {
        frame: FrameId,
        settings: FrameSettings,
    },
    NoOp,
}
