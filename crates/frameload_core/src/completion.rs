//! Bottom-up completion aggregation.
//!
//! A frame is fully complete when its own content is complete and every
//! current child is fully complete. The state is derived on every query;
//! only the *edge* (the `Completed`/`Canceled` notification for the current
//! generation) is remembered, in [`LoadState`].

use frameload_logging::loader_debug;

use crate::loader::FrameLoader;
use crate::{FrameId, LoadError, LoadState, Outcome, UiEventKind};

impl FrameLoader {
    pub fn is_fully_complete(&self, id: FrameId) -> bool {
        let Some(frame) = self.frames.get(&id) else {
            return false;
        };
        frame.content_complete
            && frame
                .children
                .iter()
                .all(|child| self.is_fully_complete(*child))
    }

    /// Stops `frame` and its whole subtree. Pending loads end as `Canceled`.
    ///
    /// Once this returns, no document events from the subtree reach the parser
    /// or the UI. Active secondary jobs are allowed to drain.
    pub fn stop(&mut self, frame: FrameId) -> Result<(), LoadError> {
        self.frame_ref(frame)?;
        loader_debug!("stopping {}", frame);
        self.stop_subtree(frame);
        Ok(())
    }

    fn stop_subtree(&mut self, id: FrameId) {
        // Flag before descending: the last stopped child may complete this frame.
        let Some(frame) = self.frames.get_mut(&id) else {
            return;
        };
        if frame.load == LoadState::Pending {
            frame.stopped = true;
        }
        for child in self.children(id).to_vec() {
            self.stop_subtree(child);
        }
        self.abort_document(id);
        if let Some(frame) = self.frames.get_mut(&id) {
            frame.queue.drop_pending();
            frame.content_complete = true;
        }
        self.evaluate(id);
    }

    /// Marks the frame's own content complete and propagates.
    pub(crate) fn content_finished(&mut self, id: FrameId) {
        if let Some(frame) = self.frames.get_mut(&id) {
            frame.content_complete = true;
            self.evaluate(id);
        }
    }

    /// Fires the completion edge for `id` if it just became fully complete,
    /// then walks up to the parent.
    pub(crate) fn evaluate(&mut self, id: FrameId) {
        let mut current = Some(id);
        while let Some(id) = current {
            if !self.is_fully_complete(id) {
                return;
            }
            let Some(frame) = self.frames.get_mut(&id) else {
                return;
            };
            if frame.load != LoadState::Pending {
                return;
            }
            let outcome = if frame.stopped {
                Outcome::Canceled
            } else {
                Outcome::Completed
            };
            frame.load = LoadState::Done(outcome);
            current = frame.parent;

            loader_debug!("{} fully complete: {:?}", id, outcome);
            let kind = match outcome {
                Outcome::Completed => UiEventKind::Completed,
                Outcome::Canceled => UiEventKind::Canceled,
            };
            self.notify(id, kind);
        }
    }

    /// An opened generation replaced before it settled still reports, as canceled.
    /// The new generation starts right away, so the parent is not re-evaluated.
    pub(crate) fn supersede(&mut self, id: FrameId) {
        let Some(frame) = self.frames.get_mut(&id) else {
            return;
        };
        if frame.generation > 0 && frame.load == LoadState::Pending {
            frame.load = LoadState::Done(Outcome::Canceled);
            loader_debug!("{} generation {} superseded", id, frame.generation);
            self.notify(id, UiEventKind::Canceled);
        }
    }

    /// A new load somewhere below starts a new generation of every ancestor
    /// that completed, announced with `Started`, so each reports once more
    /// when it settles. A canceled ancestor keeps its edge and ends the walk.
    pub(crate) fn rearm_ancestors(&mut self, id: FrameId) {
        let mut parent = self.frames.get(&id).and_then(|frame| frame.parent);
        while let Some(id) = parent {
            let Some(frame) = self.frames.get_mut(&id) else {
                return;
            };
            parent = frame.parent;
            match frame.load {
                LoadState::Done(Outcome::Canceled) => return,
                LoadState::Done(Outcome::Completed) => {
                    frame.load = LoadState::Pending;
                    frame.generation += 1;
                    let url = frame.url.clone();
                    loader_debug!("{} generation {} waits on a reloaded child", id, frame.generation);
                    self.notify(id, UiEventKind::Started(url));
                }
                LoadState::Pending | LoadState::Idle => {}
            }
        }
    }
}
