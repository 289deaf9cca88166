use crate::queue::SecondaryRequestQueue;
use crate::{Failure, FrameId, FrameSettings, JobId, LoadState, OpenOptions};

/// One node of the frame arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Frame {
    pub(crate) parent: Option<FrameId>,
    pub(crate) name: Option<String>,
    pub(crate) children: Vec<FrameId>,
    pub(crate) url: String,
    /// Requested URL of the outstanding document job until its first byte arrives.
    pub(crate) working_url: String,
    pub(crate) parsing: bool,
    pub(crate) content_complete: bool,
    pub(crate) reload: bool,
    pub(crate) offset_x: i32,
    pub(crate) offset_y: i32,
    pub(crate) document_job: Option<JobId>,
    pub(crate) queue: SecondaryRequestQueue,
    pub(crate) settings: FrameSettings,
    pub(crate) load: LoadState,
    /// Number of open() calls on this frame so far.
    pub(crate) generation: u32,
    pub(crate) stopped: bool,
    pub(crate) failure: Option<Failure>,
}

impl Frame {
    pub(crate) fn root(settings: FrameSettings, request_limit: usize) -> Self {
        Self::new(None, None, settings, request_limit, LoadState::Idle, true)
    }

    pub(crate) fn child(
        parent: FrameId,
        name: Option<String>,
        settings: FrameSettings,
        request_limit: usize,
    ) -> Self {
        Self::new(
            Some(parent),
            name,
            settings,
            request_limit,
            LoadState::Pending,
            false,
        )
    }

    fn new(
        parent: Option<FrameId>,
        name: Option<String>,
        settings: FrameSettings,
        request_limit: usize,
        load: LoadState,
        content_complete: bool,
    ) -> Self {
        Self {
            parent,
            name,
            children: Vec::new(),
            url: String::new(),
            working_url: String::new(),
            parsing: false,
            content_complete,
            reload: false,
            offset_x: 0,
            offset_y: 0,
            document_job: None,
            queue: SecondaryRequestQueue::new(request_limit),
            settings,
            load,
            generation: 0,
            stopped: false,
            failure: None,
        }
    }

    /// Starts a new open() generation fetching `url` with `job_id`.
    pub(crate) fn begin_generation(&mut self, url: String, options: OpenOptions, job_id: JobId) {
        self.working_url = url;
        self.reload = options.reload;
        self.offset_x = options.offset_x;
        self.offset_y = options.offset_y;
        self.document_job = Some(job_id);
        self.content_complete = false;
        self.load = LoadState::Pending;
        self.generation += 1;
        self.stopped = false;
        self.failure = None;
    }

    pub(crate) fn view(&self, id: FrameId, fully_complete: bool) -> FrameView {
        FrameView {
            id,
            parent: self.parent,
            name: self.name.clone(),
            url: self.url.clone(),
            working_url: self.working_url.clone(),
            parsing: self.parsing,
            content_complete: self.content_complete,
            fully_complete,
            reload: self.reload,
            children: self.children.clone(),
            load: self.load,
            generation: self.generation,
            document_job: self.document_job,
            failure: self.failure.clone(),
            settings: self.settings.clone(),
        }
    }
}

/// Read-only snapshot of a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameView {
    pub id: FrameId,
    pub parent: Option<FrameId>,
    pub name: Option<String>,
    pub url: String,
    pub working_url: String,
    pub parsing: bool,
    pub content_complete: bool,
    pub fully_complete: bool,
    pub reload: bool,
    pub children: Vec<FrameId>,
    pub load: LoadState,
    pub generation: u32,
    pub document_job: Option<JobId>,
    pub failure: Option<Failure>,
    pub settings: FrameSettings,
}
