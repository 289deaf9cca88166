use std::collections::VecDeque;

use crate::{JobId, QueueStats};

/// A secondary-resource request waiting for a job slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRequest {
    /// The URL as requested by the parser; identity for dedupe and cancel.
    pub url: String,
    /// `url` resolved against the frame's document URL.
    pub resolved: String,
}

/// Per-frame FIFO of secondary-resource requests served by at most `limit`
/// concurrently active jobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecondaryRequestQueue {
    limit: usize,
    pending: VecDeque<ResourceRequest>,
    active: Vec<(JobId, String)>,
}

impl SecondaryRequestQueue {
    pub fn new(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
            pending: VecDeque::new(),
            active: Vec::new(),
        }
    }

    /// Queues a request unless the same URL is already pending or active.
    pub fn request(&mut self, request: ResourceRequest) -> bool {
        if self.contains(&request.url) {
            return false;
        }
        self.pending.push_back(request);
        true
    }

    /// Drops a pending request. Active requests are left to finish.
    pub fn cancel(&mut self, url: &str) -> bool {
        let before = self.pending.len();
        self.pending.retain(|request| request.url != url);
        before != self.pending.len()
    }

    /// Starts jobs for pending requests while capacity allows. Returns how many started.
    pub fn dispatch<F>(&mut self, mut start: F) -> usize
    where
        F: FnMut(&ResourceRequest) -> JobId,
    {
        let mut started = 0;
        while self.active.len() < self.limit {
            let Some(request) = self.pending.pop_front() else {
                break;
            };
            let job_id = start(&request);
            self.active.push((job_id, request.url));
            started += 1;
        }
        started
    }

    /// Releases the slot held by `job_id`, returning the request URL it served.
    pub fn complete(&mut self, job_id: JobId) -> Option<String> {
        let index = self.active.iter().position(|(id, _)| *id == job_id)?;
        Some(self.active.remove(index).1)
    }

    pub fn drop_pending(&mut self) -> usize {
        let dropped = self.pending.len();
        self.pending.clear();
        dropped
    }

    /// Forgets everything; returns the active jobs the caller must cancel,
    /// with the request URL each one served.
    pub fn clear(&mut self) -> Vec<(JobId, String)> {
        self.pending.clear();
        std::mem::take(&mut self.active)
    }

    pub fn contains(&self, url: &str) -> bool {
        self.pending.iter().any(|request| request.url == url)
            || self.active.iter().any(|(_, active)| active == url)
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty() && self.active.is_empty()
    }

    pub fn stats(&self) -> QueueStats {
        QueueStats {
            pending: self.pending.len(),
            active: self.active.len(),
            limit: self.limit,
        }
    }
}
