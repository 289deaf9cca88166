//! Drives one page load: transport events in, loader effects out.

use std::collections::{HashMap, VecDeque};
use std::io::Write;
use std::time::{Duration, Instant};

use frameload_core::{Effect, FrameId, FrameLoader, OpenOptions, Outcome, UiEventKind};
use frameload_engine::{Discovery, DocumentScanner, EngineHandle};
use frameload_logging::{loader_debug, loader_trace, loader_warn};

use crate::report;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

pub(crate) struct Session<W: Write> {
    loader: FrameLoader,
    engine: EngineHandle,
    scanner: DocumentScanner,
    out: W,
    resources: HashMap<(FrameId, String), usize>,
    outcome: Option<Outcome>,
}

impl<W: Write> Session<W> {
    pub fn new(loader: FrameLoader, engine: EngineHandle, out: W) -> Self {
        Self {
            loader,
            engine,
            scanner: DocumentScanner::new(),
            out,
            resources: HashMap::new(),
            outcome: None,
        }
    }

    /// Loads `url` into the root frame and runs until the root reports and
    /// its jobs have drained, or stops the load once `timeout` has passed.
    pub fn run(&mut self, url: &str, options: OpenOptions, timeout: Duration) -> anyhow::Result<Outcome> {
        let root = self.loader.root();
        self.loader.open_url(root, url, options)?;
        self.execute_pending()?;

        let deadline = Instant::now() + timeout;
        loop {
            if let Some(outcome) = self.outcome {
                // Secondary resources still in flight are drained first.
                if self.loader.live_jobs() == 0 {
                    return Ok(outcome);
                }
            }
            if Instant::now() >= deadline {
                if self.outcome.is_none() {
                    loader_warn!("Giving up on {} after {:?}", url, timeout);
                    self.loader.stop(root)?;
                    self.execute_pending()?;
                }
                return Ok(self.outcome.unwrap_or(Outcome::Canceled));
            }
            if let Some(event) = self.engine.recv_timeout(POLL_INTERVAL) {
                loader_trace!("job {}: {}", event.job_id, event.event);
                self.loader.on_job_event(event.job_id, event.event);
                self.execute_pending()?;
            }
        }
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.out
    }

    /// Executes effects until the loader has nothing more to say. Parser
    /// callbacks made while executing produce further effects, run in turn.
    fn execute_pending(&mut self) -> anyhow::Result<()> {
        let mut queue: VecDeque<Effect> = self.loader.take_effects().into();
        while let Some(effect) = queue.pop_front() {
            self.execute(effect)?;
            queue.extend(self.loader.take_effects());
        }
        Ok(())
    }

    fn execute(&mut self, effect: Effect) -> anyhow::Result<()> {
        match effect {
            Effect::StartFetch {
                job_id,
                url,
                reload,
            } => self.engine.start(job_id, url, reload),
            Effect::CancelFetch { job_id } => self.engine.cancel(job_id),
            Effect::BeginDocument {
                frame, base_url, ..
            } => self.scanner.begin(frame, &base_url),
            Effect::WriteDocument { frame, bytes } => {
                for discovery in self.scanner.write(frame, &bytes) {
                    self.discovered(frame, discovery);
                }
            }
            Effect::EndDocument { frame } => self.scanner.end(frame),
            Effect::ResourceData {
                frame,
                url,
                bytes,
                last,
            } => {
                let key = (frame, url);
                *self.resources.entry(key.clone()).or_default() += bytes.len();
                if last {
                    let total = self.resources.remove(&key).unwrap_or_default();
                    let label = report::frame_label(&self.loader, frame);
                    writeln!(self.out, "{}", report::describe_resource(&label, &key.1, total))?;
                }
            }
            Effect::ApplySettings { frame, settings } => {
                loader_debug!(
                    "{} uses {} {}pt on {}",
                    frame,
                    settings.font_family,
                    settings.font_size,
                    settings.background_color
                );
            }
            Effect::Notify(event) => {
                writeln!(self.out, "{}", report::describe(&self.loader, &event))?;
                if event.frame == self.loader.root() {
                    match event.kind {
                        UiEventKind::Completed => self.outcome = Some(Outcome::Completed),
                        UiEventKind::Canceled => self.outcome = Some(Outcome::Canceled),
                        _ => {}
                    }
                }
            }
        }
        Ok(())
    }

    /// Parser callbacks for an element found in `frame`'s document.
    fn discovered(&mut self, frame: FrameId, discovery: Discovery) {
        match discovery {
            Discovery::ChildFrame { name, url } => {
                let child = match self.loader.add_child_frame(frame, name.as_deref()) {
                    Ok(child) => child,
                    Err(err) => {
                        loader_warn!("Ignoring frame in {}: {}", frame, err);
                        return;
                    }
                };
                let result = match url {
                    Some(url) => self
                        .loader
                        .open_url(child, &url, OpenOptions::default())
                        .map(|_| ()),
                    // Nothing will ever load here.
                    None => self.loader.stop(child),
                };
                if let Err(err) = result {
                    loader_warn!("Could not open {}: {}", child, err);
                    if let Err(err) = self.loader.stop(child) {
                        loader_warn!("Could not stop {}: {}", child, err);
                    }
                }
            }
            Discovery::Image { src } => {
                let autoload = self
                    .loader
                    .frame(frame)
                    .is_some_and(|view| view.settings.autoload_images);
                if !autoload {
                    return;
                }
                if let Err(err) = self.loader.request_resource(frame, &src) {
                    loader_warn!("Skipping image {} in {}: {}", src, frame, err);
                }
            }
        }
    }
}
