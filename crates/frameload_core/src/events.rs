//! Transport callbacks for document and secondary-resource jobs.

use frameload_logging::{loader_debug, loader_info, loader_trace, loader_warn};

use crate::job::{JobPurpose, JobState};
use crate::loader::FrameLoader;
use crate::{Effect, Failure, FrameId, JobEvent, JobId, UiEventKind};

impl FrameLoader {
    /// Applies one transport callback. Events for jobs that already reached a
    /// terminal state (including cancelled ones) are dropped.
    pub fn on_job_event(&mut self, job_id: JobId, event: JobEvent) {
        let Some(job) = self.jobs.get(job_id) else {
            loader_trace!("dropping {} for stale job {}", event, job_id);
            return;
        };
        match job.purpose.clone() {
            JobPurpose::Document(frame) => self.on_document_event(frame, job_id, event),
            JobPurpose::Resource { frame, request_url } => {
                self.on_resource_event(frame, job_id, request_url, event)
            }
        }
    }

    fn on_document_event(&mut self, frame: FrameId, job_id: JobId, event: JobEvent) {
        match event {
            JobEvent::Redirected(url) => {
                let awaiting_data = self
                    .frames
                    .get(&frame)
                    .is_some_and(|f| !f.working_url.is_empty());
                let accepted = awaiting_data
                    && self
                        .jobs
                        .get_mut(job_id)
                        .is_some_and(|job| job.redirect(&url).is_ok());
                if !accepted {
                    self.protocol_violation(
                        frame,
                        job_id,
                        format!("redirect to {url} after data started"),
                    );
                    return;
                }
                if let Some(f) = self.frames.get_mut(&frame) {
                    f.working_url = url.clone();
                }
                loader_debug!("{} redirected to {}", frame, url);
                self.notify(frame, UiEventKind::Redirected(url));
            }
            JobEvent::Data(bytes) => {
                let first = self
                    .jobs
                    .get_mut(job_id)
                    .is_some_and(|job| job.receive_data());
                if first {
                    self.begin_document(frame);
                }
                self.outbox.push(Effect::WriteDocument { frame, bytes });
            }
            JobEvent::Warning(message) => {
                loader_info!("{} transport warning ignored: {}", frame, message);
            }
            JobEvent::Finished => {
                self.jobs.finish(job_id, JobState::Completed);
                let Some(f) = self.frames.get_mut(&frame) else {
                    return;
                };
                f.document_job = None;
                if !f.working_url.is_empty() {
                    // Empty body: the document still begins, with no bytes.
                    self.begin_document(frame);
                }
                self.end_parsing(frame);
                loader_debug!("{} document finished", frame);
                self.content_finished(frame);
            }
            JobEvent::Failed(err) => {
                self.jobs.finish(job_id, JobState::Failed);
                loader_warn!("{} transport failure: {}", frame, err);
                self.fail_document(frame, Failure::Transport(err));
            }
        }
    }

    /// First data of a document: the working URL becomes the document URL.
    fn begin_document(&mut self, frame: FrameId) {
        self.clear_children(frame);
        let Some(f) = self.frames.get_mut(&frame) else {
            return;
        };
        f.url = std::mem::take(&mut f.working_url);
        f.parsing = true;
        let base_url = f.url.clone();
        let (offset_x, offset_y) = (f.offset_x, f.offset_y);
        self.outbox.push(Effect::BeginDocument {
            frame,
            base_url: base_url.clone(),
            offset_x,
            offset_y,
        });
        self.notify(frame, UiEventKind::StatusText(format!("Loading {base_url}")));
    }

    fn end_parsing(&mut self, frame: FrameId) {
        if let Some(f) = self.frames.get_mut(&frame) {
            if f.parsing {
                f.parsing = false;
                self.outbox.push(Effect::EndDocument { frame });
            }
        }
    }

    fn protocol_violation(&mut self, frame: FrameId, job_id: JobId, message: String) {
        loader_warn!("{} protocol violation on job {}: {}", frame, job_id, message);
        if self.jobs.finish(job_id, JobState::Failed).is_some() {
            self.outbox.push(Effect::CancelFetch { job_id });
        }
        self.fail_document(frame, Failure::ProtocolViolation(message));
    }

    /// Ends the frame's load with `failure`. Siblings and ancestors carry on.
    fn fail_document(&mut self, frame: FrameId, failure: Failure) {
        let Some(f) = self.frames.get_mut(&frame) else {
            return;
        };
        f.document_job = None;
        let url = if f.working_url.is_empty() {
            f.url.clone()
        } else {
            std::mem::take(&mut f.working_url)
        };
        f.failure = Some(failure.clone());
        self.end_parsing(frame);

        let message = failure.to_string();
        self.notify(
            frame,
            UiEventKind::StatusText(format!("Error loading {url}: {message}")),
        );
        self.notify(frame, UiEventKind::Error { url, message });
        self.content_finished(frame);
    }

    fn on_resource_event(
        &mut self,
        frame: FrameId,
        job_id: JobId,
        request_url: String,
        event: JobEvent,
    ) {
        match event {
            JobEvent::Redirected(url) => {
                let followed = self
                    .jobs
                    .get_mut(job_id)
                    .is_some_and(|job| job.redirect(&url).is_ok());
                if followed {
                    loader_trace!("{} resource {} redirected to {}", frame, request_url, url);
                } else {
                    loader_warn!(
                        "{} protocol violation on resource job {}: redirect to {} after data started",
                        frame,
                        job_id,
                        url
                    );
                    self.jobs.finish(job_id, JobState::Failed);
                    self.outbox.push(Effect::CancelFetch { job_id });
                    self.resource_done(frame, job_id, request_url);
                }
            }
            JobEvent::Data(bytes) => {
                if let Some(job) = self.jobs.get_mut(job_id) {
                    job.receive_data();
                }
                self.outbox.push(Effect::ResourceData {
                    frame,
                    url: request_url,
                    bytes,
                    last: false,
                });
            }
            JobEvent::Warning(message) => {
                loader_info!("{} resource {} warning ignored: {}", frame, request_url, message);
            }
            JobEvent::Finished => {
                self.jobs.finish(job_id, JobState::Completed);
                self.resource_done(frame, job_id, request_url);
            }
            JobEvent::Failed(err) => {
                loader_warn!("{} resource {} unavailable: {}", frame, request_url, err);
                self.jobs.finish(job_id, JobState::Failed);
                self.resource_done(frame, job_id, request_url);
            }
        }
    }

    /// Frees the queue slot, closes the pass-through stream and serves the next request.
    fn resource_done(&mut self, frame: FrameId, job_id: JobId, request_url: String) {
        if let Some(f) = self.frames.get_mut(&frame) {
            f.queue.complete(job_id);
        }
        self.outbox.push(Effect::ResourceData {
            frame,
            url: request_url,
            bytes: Vec::new(),
            last: true,
        });
        self.dispatch_resources(frame);
    }
}
