use std::collections::BTreeMap;
use std::fmt;

use crate::{FrameId, JobId, TransportError};

/// Lifecycle of a fetch job. Jobs leave the table on any terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    /// Started, nothing received yet.
    Pending,
    /// At least one redirect, no data yet.
    Redirected,
    /// Data has started arriving.
    Active,
    Completed,
    Failed,
    Cancelled,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

/// Callback delivered by the transport for a started job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobEvent {
    /// The request moved to a new URL. Only valid before the first `Data`.
    Redirected(String),
    /// Next chunk of the append-only response body.
    Data(Vec<u8>),
    /// Non-fatal advisory from the transport.
    Warning(String),
    Finished,
    Failed(TransportError),
}

impl fmt::Display for JobEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobEvent::Redirected(url) => write!(f, "redirect to {url}"),
            JobEvent::Data(bytes) => write!(f, "{} bytes", bytes.len()),
            JobEvent::Warning(message) => write!(f, "warning `{message}`"),
            JobEvent::Finished => write!(f, "finished"),
            JobEvent::Failed(err) => write!(f, "{err}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum JobPurpose {
    Document(FrameId),
    Resource { frame: FrameId, request_url: String },
}

/// One outstanding fetch, owned by the frame that issued it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchJob {
    pub(crate) url: String,
    pub(crate) reload: bool,
    pub(crate) purpose: JobPurpose,
    pub(crate) state: JobState,
}

impl FetchJob {
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn reload(&self) -> bool {
        self.reload
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn is_document(&self) -> bool {
        matches!(self.purpose, JobPurpose::Document(_))
    }

    /// Follows a redirect; refused once data has arrived.
    pub(crate) fn redirect(&mut self, url: &str) -> Result<(), JobState> {
        match self.state {
            JobState::Pending | JobState::Redirected => {
                self.url = url.to_string();
                self.state = JobState::Redirected;
                Ok(())
            }
            other => Err(other),
        }
    }

    /// Records a data chunk; returns true for the first one.
    pub(crate) fn receive_data(&mut self) -> bool {
        let first = self.state != JobState::Active;
        self.state = JobState::Active;
        first
    }
}

/// Live (non-terminal) jobs keyed by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct JobTable {
    next_id: JobId,
    live: BTreeMap<JobId, FetchJob>,
}

impl Default for JobTable {
    fn default() -> Self {
        Self {
            next_id: 1,
            live: BTreeMap::new(),
        }
    }
}

impl JobTable {
    pub(crate) fn start(&mut self, url: String, reload: bool, purpose: JobPurpose) -> JobId {
        let id = self.next_id;
        self.next_id += 1;
        self.live.insert(
            id,
            FetchJob {
                url,
                reload,
                purpose,
                state: JobState::Pending,
            },
        );
        id
    }

    pub(crate) fn get(&self, id: JobId) -> Option<&FetchJob> {
        self.live.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: JobId) -> Option<&mut FetchJob> {
        self.live.get_mut(&id)
    }

    /// Moves a job to a terminal state and forgets it. `None` if it was not live.
    pub(crate) fn finish(&mut self, id: JobId, state: JobState) -> Option<FetchJob> {
        debug_assert!(state.is_terminal());
        let mut job = self.live.remove(&id)?;
        job.state = state;
        Some(job)
    }

    pub(crate) fn live_count(&self) -> usize {
        self.live.len()
    }

    pub(crate) fn document_count(&self) -> usize {
        self.live
            .values()
            .filter(|job| job.is_document())
            .count()
    }
}
