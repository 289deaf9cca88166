use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use frameload_core::{JobEvent, JobId};
use futures_util::StreamExt;
use reqwest::header::{CACHE_CONTROL, CONTENT_TYPE, PRAGMA};

use crate::{FailureKind, FetchError, FetchMetadata, TransportEvent};

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub redirect_limit: usize,
    pub max_bytes: u64,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            redirect_limit: 5,
            max_bytes: 5 * 1024 * 1024,
        }
    }
}

/// Receives job callbacks while a fetch is running.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: TransportEvent);
}

pub struct ChannelSink {
    tx: mpsc::Sender<TransportEvent>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<TransportEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: TransportEvent) {
        let _ = self.tx.send(event);
    }
}

/// Runs one fetch, streaming `Redirected` and `Data` callbacks to the sink.
///
/// The terminal callback (`Finished` or `Failed`) is left to the caller, which
/// derives it from the returned result.
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(
        &self,
        job_id: JobId,
        url: &str,
        reload: bool,
        sink: &dyn EventSink,
    ) -> Result<FetchMetadata, FetchError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    settings: FetchSettings,
}

impl ReqwestFetcher {
    pub fn new(settings: FetchSettings) -> Self {
        Self { settings }
    }

    fn build_client(&self, chain: Arc<Mutex<Vec<String>>>) -> Result<reqwest::Client, FetchError> {
        let redirect_limit = self.settings.redirect_limit;
        let policy = reqwest::redirect::Policy::custom(move |attempt| {
            if attempt.previous().len() > redirect_limit {
                return attempt.error("redirect limit exceeded");
            }
            if let Ok(mut chain) = chain.lock() {
                chain.push(attempt.url().to_string());
            }
            attempt.follow()
        });

        reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .timeout(self.settings.request_timeout)
            .redirect(policy)
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))
    }
}

#[async_trait::async_trait]
impl Fetcher for ReqwestFetcher {
    async fn fetch(
        &self,
        job_id: JobId,
        url: &str,
        reload: bool,
        sink: &dyn EventSink,
    ) -> Result<FetchMetadata, FetchError> {
        let parsed = reqwest::Url::parse(url)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
        let chain = Arc::new(Mutex::new(Vec::new()));
        let client = self.build_client(chain.clone())?;

        let mut request = client.get(parsed);
        if reload {
            request = request
                .header(CACHE_CONTROL, "no-cache")
                .header(PRAGMA, "no-cache");
        }
        let response = request.send().await.map_err(map_reqwest_error)?;

        // Redirects are reported before any data, in the order they were followed.
        let redirects: Vec<String> = chain
            .lock()
            .map(|chain| chain.clone())
            .unwrap_or_default();
        for target in &redirects {
            sink.emit(TransportEvent::new(
                job_id,
                JobEvent::Redirected(target.clone()),
            ));
        }

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        if let Some(content_len) = response.content_length() {
            if content_len > self.settings.max_bytes {
                return Err(FetchError::new(
                    FailureKind::TooLarge {
                        max_bytes: self.settings.max_bytes,
                        actual: Some(content_len),
                    },
                    "response too large",
                ));
            }
        }

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        let mut byte_len = 0u64;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk: Bytes = chunk.map_err(map_reqwest_error)?;
            byte_len += chunk.len() as u64;
            if byte_len > self.settings.max_bytes {
                return Err(FetchError::new(
                    FailureKind::TooLarge {
                        max_bytes: self.settings.max_bytes,
                        actual: Some(byte_len),
                    },
                    "response too large",
                ));
            }
            if !chunk.is_empty() {
                sink.emit(TransportEvent::new(job_id, JobEvent::Data(chunk.to_vec())));
            }
        }

        Ok(FetchMetadata {
            original_url: url.to_string(),
            final_url,
            redirect_count: redirects.len(),
            content_type,
            byte_len,
        })
    }
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_redirect() {
        return FetchError::new(FailureKind::RedirectLimitExceeded, err.to_string());
    }
    FetchError::new(FailureKind::Network, err.to_string())
}
