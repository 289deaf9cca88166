#![allow(dead_code)]

use std::sync::Once;

use frameload_core::{Effect, FrameId, FrameLoader, JobEvent, JobId, OpenOptions, UiEventKind};

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(frameload_logging::initialize_for_tests);
}

pub fn data(text: &str) -> JobEvent {
    JobEvent::Data(text.as_bytes().to_vec())
}

/// UI event kinds emitted for `frame`, in order.
pub fn ui_kinds(effects: &[Effect], frame: FrameId) -> Vec<UiEventKind> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::Notify(event) if event.frame == frame => Some(event.kind.clone()),
            _ => None,
        })
        .collect()
}

/// Only the `Completed` / `Canceled` edges for `frame`.
pub fn terminal_events(effects: &[Effect], frame: FrameId) -> Vec<UiEventKind> {
    ui_kinds(effects, frame)
        .into_iter()
        .filter(UiEventKind::is_terminal)
        .collect()
}

pub fn started_jobs(effects: &[Effect]) -> Vec<(JobId, String)> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::StartFetch { job_id, url, .. } => Some((*job_id, url.clone())),
            _ => None,
        })
        .collect()
}

pub fn cancelled_jobs(effects: &[Effect]) -> Vec<JobId> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::CancelFetch { job_id } => Some(*job_id),
            _ => None,
        })
        .collect()
}

/// Opens `url` in `frame` and delivers a first chunk so the frame is parsing.
pub fn open_parsing(loader: &mut FrameLoader, frame: FrameId, url: &str) -> JobId {
    let job = loader
        .open_url(frame, url, OpenOptions::default())
        .expect("open url");
    loader.on_job_event(job, data("<html>"));
    job
}

/// Root document at `http://example/` with two child frames `a` and `b`,
/// each opened and parsing. The root document is still streaming.
pub struct FramesetFixture {
    pub loader: FrameLoader,
    pub root: FrameId,
    pub root_job: JobId,
    pub a: FrameId,
    pub a_job: JobId,
    pub b: FrameId,
    pub b_job: JobId,
}

impl FramesetFixture {
    pub fn new() -> Self {
        let mut loader = FrameLoader::default();
        let root = loader.root();
        let root_job = open_parsing(&mut loader, root, "http://example/");
        let a = loader.add_child_frame(root, Some("a")).expect("child a");
        let a_job = open_parsing(&mut loader, a, "http://example/a");
        let b = loader.add_child_frame(root, Some("b")).expect("child b");
        let b_job = open_parsing(&mut loader, b, "http://example/b");
        loader.take_effects();
        Self {
            loader,
            root,
            root_job,
            a,
            a_job,
            b,
            b_job,
        }
    }
}
