use crate::{FrameId, FrameSettings, JobId};

/// Work the loader asks its collaborators to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Transport: start fetching `url` and report back with `job_id`.
    StartFetch {
        job_id: JobId,
        url: String,
        reload: bool,
    },
    /// Transport: abandon the job. Late events for it are ignored anyway.
    CancelFetch { job_id: JobId },
    /// Parser: a new document starts in `frame`.
    BeginDocument {
        frame: FrameId,
        base_url: String,
        offset_x: i32,
        offset_y: i32,
    },
    WriteDocument { frame: FrameId, bytes: Vec<u8> },
    EndDocument { frame: FrameId },
    /// Pass-through of secondary-resource bytes. `last` with empty `bytes`
    /// closes the stream; if nothing came before, the resource is unavailable.
    ResourceData {
        frame: FrameId,
        url: String,
        bytes: Vec<u8>,
        last: bool,
    },
    /// Presentation: (re)apply display settings to `frame`.
    ApplySettings {
        frame: FrameId,
        settings: FrameSettings,
    },
    Notify(UiEvent),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiEvent {
    pub frame: FrameId,
    pub kind: UiEventKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEventKind {
    Started(String),
    Redirected(String),
    StatusText(String),
    Error { url: String, message: String },
    FrameInserted { parent: FrameId },
    /// A link asked for a window outside this tree.
    NewWindow(String),
    Completed,
    Canceled,
}

impl UiEventKind {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Canceled)
    }
}
