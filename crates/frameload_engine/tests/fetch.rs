use std::sync::{Arc, Mutex};
use std::time::Duration;

use frameload_core::JobEvent;
use frameload_engine::{EventSink, FailureKind, FetchSettings, Fetcher, ReqwestFetcher, TransportEvent};
use pretty_assertions::assert_eq;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct TestSink {
    events: Arc<Mutex<Vec<TransportEvent>>>,
}

impl TestSink {
    fn take(&self) -> Vec<JobEvent> {
        self.events
            .lock()
            .unwrap()
            .drain(..)
            .map(|event| event.event)
            .collect()
    }
}

impl EventSink for TestSink {
    fn emit(&self, event: TransportEvent) {
        self.events.lock().unwrap().push(event);
    }
}

fn body(events: &[JobEvent]) -> Vec<u8> {
    events
        .iter()
        .filter_map(|event| match event {
            JobEvent::Data(bytes) => Some(bytes.clone()),
            _ => None,
        })
        .flatten()
        .collect()
}

#[tokio::test]
async fn fetcher_streams_the_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/doc"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("<html>ok</html>", "text/html; charset=utf-8"),
        )
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(FetchSettings::default());
    let sink = TestSink::default();
    let url = format!("{}/doc", server.uri());

    let metadata = fetcher.fetch(1, &url, false, &sink).await.expect("fetch ok");
    assert_eq!(metadata.original_url, url);
    assert_eq!(metadata.final_url, url);
    assert_eq!(metadata.redirect_count, 0);
    assert_eq!(metadata.byte_len, 15);
    assert!(metadata.content_type.unwrap().starts_with("text/html"));

    let events = sink.take();
    assert!(events.iter().all(|event| matches!(event, JobEvent::Data(_))));
    assert_eq!(body(&events), b"<html>ok</html>".to_vec());
}

#[tokio::test]
async fn redirects_are_reported_before_data() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("Location", format!("{}/new", server.uri())),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(ResponseTemplate::new(200).set_body_string("moved"))
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(FetchSettings::default());
    let sink = TestSink::default();
    let url = format!("{}/old", server.uri());

    let metadata = fetcher.fetch(2, &url, false, &sink).await.expect("fetch ok");
    let events = sink.take();

    assert_eq!(metadata.redirect_count, 1);
    assert_eq!(metadata.final_url, format!("{}/new", server.uri()));
    assert_eq!(
        events.first(),
        Some(&JobEvent::Redirected(format!("{}/new", server.uri())))
    );
    assert_eq!(body(&events), b"moved".to_vec());
}

#[tokio::test]
async fn redirect_limit_is_enforced() {
    let server = MockServer::start().await;
    for (from, to) in [("/a", "/b"), ("/b", "/c"), ("/c", "/d")] {
        Mock::given(method("GET"))
            .and(path(from))
            .respond_with(
                ResponseTemplate::new(302).insert_header("Location", format!("{}{to}", server.uri())),
            )
            .mount(&server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/d"))
        .respond_with(ResponseTemplate::new(200).set_body_string("end"))
        .mount(&server)
        .await;

    let settings = FetchSettings {
        redirect_limit: 2,
        ..FetchSettings::default()
    };
    let fetcher = ReqwestFetcher::new(settings);
    let sink = TestSink::default();
    let url = format!("{}/a", server.uri());

    let err = fetcher.fetch(3, &url, false, &sink).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::RedirectLimitExceeded);

    let generous = ReqwestFetcher::new(FetchSettings::default());
    let metadata = generous.fetch(4, &url, false, &sink).await.expect("fetch ok");
    assert_eq!(metadata.redirect_count, 3);
}

#[tokio::test]
async fn reload_bypasses_caches() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fresh"))
        .and(header("cache-control", "no-cache"))
        .respond_with(ResponseTemplate::new(200).set_body_string("fresh"))
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(FetchSettings::default());
    let sink = TestSink::default();
    let url = format!("{}/fresh", server.uri());

    fetcher.fetch(4, &url, true, &sink).await.expect("reload ok");
    assert_eq!(body(&sink.take()), b"fresh".to_vec());

    // Without the reload flag the header is absent and nothing matches.
    let err = fetcher.fetch(5, &url, false, &sink).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(404));
}

#[tokio::test]
async fn fetcher_fails_on_http_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(FetchSettings::default());
    let sink = TestSink::default();
    let url = format!("{}/missing", server.uri());

    let err = fetcher.fetch(7, &url, false, &sink).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(404));
    assert_eq!(err.kind.code(), 404);
    assert!(sink.take().is_empty());
}

#[tokio::test]
async fn fetcher_times_out_on_slow_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_string("slow"),
        )
        .mount(&server)
        .await;

    let settings = FetchSettings {
        request_timeout: Duration::from_millis(50),
        ..FetchSettings::default()
    };
    let fetcher = ReqwestFetcher::new(settings);
    let sink = TestSink::default();
    let url = format!("{}/slow", server.uri());

    let err = fetcher.fetch(2, &url, false, &sink).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn fetcher_rejects_too_large_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/large"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "text/html")
                .set_body_string("01234567890"),
        )
        .mount(&server)
        .await;

    let settings = FetchSettings {
        max_bytes: 10,
        ..FetchSettings::default()
    };
    let fetcher = ReqwestFetcher::new(settings);
    let sink = TestSink::default();
    let url = format!("{}/large", server.uri());

    let err = fetcher.fetch(3, &url, false, &sink).await.unwrap_err();
    assert_eq!(
        err.kind,
        FailureKind::TooLarge {
            max_bytes: 10,
            actual: Some(11)
        }
    );
}

#[tokio::test]
async fn invalid_url_fails_without_a_request() {
    let fetcher = ReqwestFetcher::new(FetchSettings::default());
    let sink = TestSink::default();

    let err = fetcher.fetch(9, "not a url", false, &sink).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidUrl);
}
