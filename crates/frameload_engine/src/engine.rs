use std::collections::HashMap;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use frameload_core::{JobEvent, JobId, TransportError};
use frameload_logging::{loader_debug, loader_error, loader_trace};
use tokio_util::sync::CancellationToken;

use crate::fetch::{ChannelSink, FetchSettings, Fetcher, ReqwestFetcher};
use crate::TransportEvent;

enum EngineCommand {
    Start {
        job_id: JobId,
        url: String,
        reload: bool,
    },
    Cancel {
        job_id: JobId,
    },
}

type Running = Arc<Mutex<HashMap<JobId, CancellationToken>>>;

/// Transport running fetch jobs on a background tokio runtime.
///
/// Jobs run concurrently; their callbacks are serialized into one channel
/// read with [`try_recv`](EngineHandle::try_recv) or
/// [`recv_timeout`](EngineHandle::recv_timeout).
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<TransportEvent>,
}

impl EngineHandle {
    pub fn new(settings: FetchSettings) -> Self {
        Self::with_fetcher(Arc::new(ReqwestFetcher::new(settings)))
    }

    pub fn with_fetcher(fetcher: Arc<dyn Fetcher>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    loader_error!("failed to start transport runtime: {}", err);
                    return;
                }
            };
            let running: Running = Arc::default();
            while let Ok(command) = cmd_rx.recv() {
                match command {
                    EngineCommand::Start {
                        job_id,
                        url,
                        reload,
                    } => {
                        let token = CancellationToken::new();
                        if let Ok(mut running) = running.lock() {
                            running.insert(job_id, token.clone());
                        }
                        let fetcher = fetcher.clone();
                        let event_tx = event_tx.clone();
                        let running = running.clone();
                        runtime.spawn(async move {
                            run_job(fetcher.as_ref(), job_id, url, reload, token, event_tx).await;
                            if let Ok(mut running) = running.lock() {
                                running.remove(&job_id);
                            }
                        });
                    }
                    EngineCommand::Cancel { job_id } => {
                        let token = running
                            .lock()
                            .ok()
                            .and_then(|mut running| running.remove(&job_id));
                        if let Some(token) = token {
                            loader_debug!("cancelling job {}", job_id);
                            token.cancel();
                        }
                    }
                }
            }
        });

        Self { cmd_tx, event_rx }
    }

    pub fn start(&self, job_id: JobId, url: impl Into<String>, reload: bool) {
        let _ = self.cmd_tx.send(EngineCommand::Start {
            job_id,
            url: url.into(),
            reload,
        });
    }

    /// Abandons the job. Callbacks already queued may still arrive.
    pub fn cancel(&self, job_id: JobId) {
        let _ = self.cmd_tx.send(EngineCommand::Cancel { job_id });
    }

    pub fn try_recv(&self) -> Option<TransportEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<TransportEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

async fn run_job(
    fetcher: &dyn Fetcher,
    job_id: JobId,
    url: String,
    reload: bool,
    token: CancellationToken,
    event_tx: mpsc::Sender<TransportEvent>,
) {
    let sink = ChannelSink::new(event_tx.clone());
    let event = tokio::select! {
        _ = token.cancelled() => {
            loader_trace!("job {} stopped before finishing", job_id);
            return;
        }
        result = fetcher.fetch(job_id, &url, reload, &sink) => match result {
            Ok(metadata) => {
                loader_debug!(
                    "job {} fetched {} bytes from {}",
                    job_id,
                    metadata.byte_len,
                    metadata.final_url
                );
                JobEvent::Finished
            }
            Err(err) => JobEvent::Failed(TransportError::from(err)),
        },
    };
    let _ = event_tx.send(TransportEvent::new(job_id, event));
}
