use std::collections::BTreeMap;

use frameload_logging::{loader_debug, loader_trace};
use url::Url;

use crate::address;
use crate::frame::{Frame, FrameView};
use crate::job::{FetchJob, JobPurpose, JobState, JobTable};
use crate::queue::ResourceRequest;
use crate::{
    Effect, FrameId, FrameSettings, JobId, LoadError, LoaderConfig, Navigation, OpenOptions,
    QueueStats, UiEvent, UiEventKind,
};

/// Coordinator for one tree of nested documents.
///
/// All operations run on the caller's thread and apply their full state
/// transition, completion propagation included, before returning. Work for
/// collaborators accumulates as [`Effect`]s, drained with [`take_effects`].
///
/// [`take_effects`]: FrameLoader::take_effects
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameLoader {
    pub(crate) frames: BTreeMap<FrameId, Frame>,
    pub(crate) root: FrameId,
    next_frame: u32,
    pub(crate) jobs: JobTable,
    request_limit: usize,
    pub(crate) outbox: Vec<Effect>,
}

impl Default for FrameLoader {
    fn default() -> Self {
        Self::new(LoaderConfig::default())
    }
}

impl FrameLoader {
    pub fn new(config: LoaderConfig) -> Self {
        let request_limit = config.request_limit.max(1);
        let root = FrameId(0);
        let mut frames = BTreeMap::new();
        frames.insert(root, Frame::root(config.root_settings, request_limit));
        Self {
            frames,
            root,
            next_frame: 1,
            jobs: JobTable::default(),
            request_limit,
            outbox: Vec::new(),
        }
    }

    pub fn root(&self) -> FrameId {
        self.root
    }

    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.outbox)
    }

    pub fn frame(&self, id: FrameId) -> Option<FrameView> {
        self.frames
            .get(&id)
            .map(|frame| frame.view(id, self.is_fully_complete(id)))
    }

    pub fn children(&self, id: FrameId) -> &[FrameId] {
        self.frames
            .get(&id)
            .map(|frame| frame.children.as_slice())
            .unwrap_or_default()
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Non-terminal document jobs across the whole tree.
    pub fn active_document_jobs(&self) -> usize {
        self.jobs.document_count()
    }

    /// Non-terminal jobs of any kind.
    pub fn live_jobs(&self) -> usize {
        self.jobs.live_count()
    }

    /// A live job; `None` once it reached a terminal state.
    pub fn job(&self, job_id: JobId) -> Option<&FetchJob> {
        self.jobs.get(job_id)
    }

    pub fn queue_stats(&self, id: FrameId) -> Option<QueueStats> {
        self.frames.get(&id).map(|frame| frame.queue.stats())
    }

    /// Opens `url` in `frame`, superseding whatever the frame was loading.
    ///
    /// A malformed URL fails before anything changes.
    pub fn open_url(
        &mut self,
        frame: FrameId,
        url: &str,
        options: OpenOptions,
    ) -> Result<JobId, LoadError> {
        let parsed = address::parse_absolute(url)?;
        if !self.frames.contains_key(&frame) {
            return Err(LoadError::UnknownFrame(frame));
        }

        self.abort_document(frame);
        self.clear_children(frame);
        self.clear_resources(frame);
        self.supersede(frame);

        let target = parsed.to_string();
        let job_id = self.jobs.start(
            target.clone(),
            options.reload,
            JobPurpose::Document(frame),
        );
        let f = self.frame_mut(frame)?;
        f.begin_generation(target.clone(), options, job_id);
        loader_debug!("{} opening {} as job {}", frame, target, job_id);

        self.outbox.push(Effect::StartFetch {
            job_id,
            url: target.clone(),
            reload: options.reload,
        });
        self.notify(frame, UiEventKind::Started(target));
        self.rearm_ancestors(frame);
        Ok(job_id)
    }

    /// Follows a link activated in `source`. `url` resolves against the
    /// source document.
    ///
    /// `_self` (or no target) opens in `source`, `_parent` in its parent,
    /// `_top` in the root and any other name in the frame carrying it. `_blank`
    /// and names no frame carries leave the tree alone and report `NewWindow`.
    pub fn navigate(
        &mut self,
        source: FrameId,
        target: Option<&str>,
        url: &str,
        options: OpenOptions,
    ) -> Result<Navigation, LoadError> {
        let origin = self.frame_ref(source)?;
        let parent = origin.parent;
        let base = Url::parse(&origin.url).ok();
        let resolved = address::resolve(base.as_ref(), url)?.to_string();

        let frame = match target.map(str::trim).filter(|name| !name.is_empty()) {
            None | Some("_self") => Some(source),
            Some("_parent") => Some(parent.unwrap_or(source)),
            Some("_top") => Some(self.root),
            Some("_blank") => None,
            Some(name) => self.find_frame(name),
        };
        match frame {
            Some(frame) => {
                self.open_url(frame, &resolved, options)?;
                Ok(Navigation::Opened(frame))
            }
            None => {
                loader_debug!("{} asks for a new window on {}", source, resolved);
                self.notify(source, UiEventKind::NewWindow(resolved.clone()));
                Ok(Navigation::NewWindow(resolved))
            }
        }
    }

    /// Reopens the root document bypassing caches. `None` when nothing was loaded yet.
    pub fn reload(&mut self) -> Result<Option<JobId>, LoadError> {
        let url = self
            .frames
            .get(&self.root)
            .map(|root| root.url.clone())
            .unwrap_or_default();
        if url.is_empty() {
            return Ok(None);
        }
        self.open_url(self.root, &url, OpenOptions::reload()).map(Some)
    }

    /// Reloads the leaf frames of a frameset without refetching the frameset
    /// documents themselves. Without frames this is a full [`reload`].
    ///
    /// [`reload`]: FrameLoader::reload
    pub fn reload_frames(&mut self) -> Result<(), LoadError> {
        if self.children(self.root).is_empty() {
            return self.reload().map(|_| ());
        }
        self.reload_subframes(self.root)
    }

    fn reload_subframes(&mut self, id: FrameId) -> Result<(), LoadError> {
        let children = self.children(id).to_vec();
        for child in children {
            if self.children(child).is_empty() {
                let url = self.frame_ref(child)?.url.clone();
                if url.is_empty() {
                    continue;
                }
                self.open_url(child, &url, OpenOptions::reload())?;
            } else {
                self.reload_subframes(child)?;
            }
        }
        Ok(())
    }

    /// Creates a nested frame while `parent` is parsing its document.
    pub fn add_child_frame(
        &mut self,
        parent: FrameId,
        name: Option<&str>,
    ) -> Result<FrameId, LoadError> {
        let request_limit = self.request_limit;
        let id = FrameId(self.next_frame);
        let p = self.frame_mut(parent)?;
        if !p.parsing {
            return Err(LoadError::NotParsing(parent));
        }
        p.children.push(id);
        let settings = p.settings.clone();
        self.next_frame += 1;

        self.frames.insert(
            id,
            Frame::child(
                parent,
                name.map(ToOwned::to_owned),
                settings.clone(),
                request_limit,
            ),
        );
        loader_debug!("{} inserted into {} (name {:?})", id, parent, name);
        self.outbox.push(Effect::ApplySettings {
            frame: id,
            settings,
        });
        self.notify(id, UiEventKind::FrameInserted { parent });
        Ok(id)
    }

    /// Queues a secondary resource of `frame`; relative URLs resolve against its document.
    pub fn request_resource(&mut self, frame: FrameId, url: &str) -> Result<(), LoadError> {
        let f = self.frame_ref(frame)?;
        let base = Url::parse(&f.url).ok();
        let resolved = address::resolve(base.as_ref(), url)?;

        let f = self.frame_mut(frame)?;
        let queued = f.queue.request(ResourceRequest {
            url: url.to_string(),
            resolved: resolved.to_string(),
        });
        if !queued {
            loader_trace!("{} already has {} queued", frame, url);
            return Ok(());
        }
        self.dispatch_resources(frame);
        Ok(())
    }

    /// Withdraws a pending request. Returns false if it was active or unknown.
    pub fn cancel_resource(&mut self, frame: FrameId, url: &str) -> Result<bool, LoadError> {
        let cancelled = self.frame_mut(frame)?.queue.cancel(url);
        if cancelled {
            loader_trace!("{} dropped pending request {}", frame, url);
        }
        Ok(cancelled)
    }

    /// Applies `settings` to `frame` and all of its descendants.
    pub fn set_settings(&mut self, frame: FrameId, settings: FrameSettings) -> Result<(), LoadError> {
        self.frame_ref(frame)?;
        let mut stack = vec![frame];
        while let Some(id) = stack.pop() {
            let Some(f) = self.frames.get_mut(&id) else {
                continue;
            };
            f.settings = settings.clone();
            stack.extend(f.children.iter().rev().copied());
            self.outbox.push(Effect::ApplySettings {
                frame: id,
                settings: settings.clone(),
            });
        }
        Ok(())
    }

    /// Finds a frame by name: direct children first, then each subtree in order.
    pub fn find_frame(&self, name: &str) -> Option<FrameId> {
        self.find_in(self.root, name)
    }

    fn find_in(&self, id: FrameId, name: &str) -> Option<FrameId> {
        let children = self.children(id);
        children
            .iter()
            .copied()
            .find(|child| {
                self.frames
                    .get(child)
                    .and_then(|frame| frame.name.as_deref())
                    == Some(name)
            })
            .or_else(|| children.iter().find_map(|child| self.find_in(*child, name)))
    }

    pub(crate) fn frame_ref(&self, id: FrameId) -> Result<&Frame, LoadError> {
        self.frames.get(&id).ok_or(LoadError::UnknownFrame(id))
    }

    pub(crate) fn frame_mut(&mut self, id: FrameId) -> Result<&mut Frame, LoadError> {
        self.frames.get_mut(&id).ok_or(LoadError::UnknownFrame(id))
    }

    pub(crate) fn notify(&mut self, frame: FrameId, kind: UiEventKind) {
        self.outbox.push(Effect::Notify(UiEvent { frame, kind }));
    }

    /// Cancels the document job, ends parsing and clears the working URL.
    pub(crate) fn abort_document(&mut self, id: FrameId) {
        let Some(f) = self.frames.get_mut(&id) else {
            return;
        };
        if let Some(job_id) = f.document_job.take() {
            if self.jobs.finish(job_id, JobState::Cancelled).is_some() {
                loader_debug!("{} cancelled document job {}", id, job_id);
                self.outbox.push(Effect::CancelFetch { job_id });
            }
        }
        f.working_url.clear();
        if f.parsing {
            f.parsing = false;
            self.outbox.push(Effect::EndDocument { frame: id });
        }
    }

    /// Discards every descendant of `id` along with their jobs.
    pub(crate) fn clear_children(&mut self, id: FrameId) {
        let Some(f) = self.frames.get_mut(&id) else {
            return;
        };
        let children = std::mem::take(&mut f.children);
        for child in children {
            self.discard_frame(child);
        }
    }

    fn discard_frame(&mut self, id: FrameId) {
        self.abort_document(id);
        self.clear_resources(id);
        self.clear_children(id);
        if self.frames.remove(&id).is_some() {
            loader_trace!("{} discarded", id);
        }
    }

    /// Drops pending secondary requests and cancels the active ones, closing
    /// their pass-through streams.
    pub(crate) fn clear_resources(&mut self, id: FrameId) {
        let Some(f) = self.frames.get_mut(&id) else {
            return;
        };
        for (job_id, url) in f.queue.clear() {
            if self.jobs.finish(job_id, JobState::Cancelled).is_some() {
                self.outbox.push(Effect::CancelFetch { job_id });
            }
            self.outbox.push(Effect::ResourceData {
                frame: id,
                url,
                bytes: Vec::new(),
                last: true,
            });
        }
    }

    pub(crate) fn dispatch_resources(&mut self, id: FrameId) {
        let Some(f) = self.frames.get_mut(&id) else {
            return;
        };
        let reload = f.reload;
        let jobs = &mut self.jobs;
        let outbox = &mut self.outbox;
        f.queue.dispatch(|request| {
            let job_id = jobs.start(
                request.resolved.clone(),
                reload,
                JobPurpose::Resource {
                    frame: id,
                    request_url: request.url.clone(),
                },
            );
            loader_trace!("{} fetching resource {} as job {}", id, request.url, job_id);
            outbox.push(Effect::StartFetch {
                job_id,
                url: request.resolved.clone(),
                reload,
            });
            job_id
        });
    }
}
