//! Integration tests for the tracking entry points
//!
//! A recording transport checks what would be sent. A throwaway TCP stub
//! stands in for the analytics endpoint to exercise real HTTP failures.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing_subscriber::fmt::MakeWriter;

use bento_telemetry::payload::{KEY_BENTO_VERSION, KEY_PLATFORM_INFO, KEY_PY_VERSION};
use bento_telemetry::{
    ArtifactKind, BuildInfo, Delivery, Endpoint, EventProperties, HandlerKind, ModelService,
    ServiceApi, ServiceArtifact, ServiceEnv, SessionId, TelemetryError, Tracker, Transport,
};

const TEST_API_KEY: &str = "test-key";

// =============================================================================
// Fixtures
// =============================================================================

struct IrisClassifier {
    artifacts: Vec<ServiceArtifact>,
    apis: Vec<ServiceApi>,
    env: ServiceEnv,
}

impl IrisClassifier {
    fn new() -> Self {
        Self {
            artifacts: vec![
                ServiceArtifact {
                    name: "model".into(),
                    kind: ArtifactKind::Sklearn,
                },
                ServiceArtifact {
                    name: "labels".into(),
                    kind: ArtifactKind::TextFile,
                },
            ],
            apis: vec![ServiceApi {
                name: "predict".into(),
                handler: HandlerKind::DataFrame,
            }],
            env: ServiceEnv {
                pip_dependencies: vec!["scikit-learn".into()],
                ..Default::default()
            },
        }
    }
}

impl ModelService for IrisClassifier {
    fn artifacts(&self) -> &[ServiceArtifact] {
        &self.artifacts
    }

    fn apis(&self) -> &[ServiceApi] {
        &self.apis
    }

    fn env(&self) -> &ServiceEnv {
        &self.env
    }
}

/// Records every POST and answers with a fixed outcome.
#[derive(Default)]
struct RecordingTransport {
    events: Mutex<Vec<Value>>,
    fail: bool,
}

impl RecordingTransport {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    fn events(&self) -> Vec<Value> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn post_form(
        &self,
        _url: &str,
        fields: &[(&str, &str)],
        _timeout: Duration,
    ) -> Result<Delivery, TelemetryError> {
        let event = fields
            .iter()
            .find(|(k, _)| *k == "event")
            .map(|(_, v)| serde_json::from_str::<Value>(v).unwrap())
            .unwrap();
        self.events.lock().unwrap().push(event);

        if self.fail {
            Err(TelemetryError::Network("connection reset".into()))
        } else {
            Ok(Delivery { status: 200 })
        }
    }
}

fn dev_build() -> BuildInfo {
    BuildInfo {
        installed: false,
        version: "0+untagged.1.gdeadbee".into(),
        dirty: true,
    }
}

fn tracker_with(transport: Arc<RecordingTransport>, enabled: bool) -> Tracker {
    Tracker::builder()
        .gate(enabled)
        .build_info(dev_build())
        .session(SessionId::from_string("session-1"))
        .api_key(Some(TEST_API_KEY.into()))
        .transport(transport)
        .build()
}

fn http_tracker(url: String, timeout: Duration) -> Tracker {
    Tracker::builder()
        .build_info(dev_build())
        .api_key(Some(TEST_API_KEY.into()))
        .endpoint(Endpoint { url, timeout })
        .build()
}

/// Collects formatted log output for assertions.
#[derive(Clone, Default)]
struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn capture_logs() -> (LogCapture, tracing::subscriber::DefaultGuard) {
    let capture = LogCapture::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(capture.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::INFO)
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (capture, guard)
}

/// How the stub endpoint answers a request
#[derive(Clone, Copy)]
enum StubReply {
    Respond(&'static str),
    Hang,
}

/// Start a one-shot-per-connection HTTP stub. Returns its URL and the raw
/// requests it received.
async fn stub_endpoint(reply: StubReply) -> (String, Arc<Mutex<Vec<String>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let seen = requests.clone();

    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            let request = read_request(&mut stream).await;
            seen.lock().unwrap().push(request);
            match reply {
                StubReply::Respond(raw) => {
                    let _ = stream.write_all(raw.as_bytes()).await;
                    let _ = stream.shutdown().await;
                }
                StubReply::Hang => {
                    tokio::time::sleep(Duration::from_secs(10)).await;
                }
            }
        }
    });

    (format!("http://{}/httpapi", addr), requests)
}

async fn read_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => n,
        };
        buf.extend_from_slice(&chunk[..n]);

        if let Some(header_end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let headers = String::from_utf8_lossy(&buf[..header_end]).to_ascii_lowercase();
            let body_len = headers
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|len| len.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= header_end + 4 + body_len {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

// =============================================================================
// Gate
// =============================================================================

#[tokio::test]
async fn test_disabled_tracking_sends_nothing() {
    let transport = Arc::new(RecordingTransport::default());
    let tracker = tracker_with(transport.clone(), false);
    let service = IrisClassifier::new();

    assert!(tracker.track_save(&service).await.is_none());
    assert!(tracker.track_load(&service).await.is_none());
    assert!(tracker.track_cli("deploy", Some("aws-lambda")).await.is_none());

    assert!(transport.events().is_empty());
}

#[tokio::test]
async fn test_gate_is_checked_on_every_call() {
    let transport = Arc::new(RecordingTransport::default());
    let flag = Arc::new(AtomicBool::new(true));
    let tracker = Tracker::builder()
        .gate(flag.clone())
        .build_info(dev_build())
        .api_key(Some(TEST_API_KEY.into()))
        .transport(transport.clone())
        .build();

    assert!(tracker.track_cli("build", None).await.is_some());
    flag.store(false, Ordering::Relaxed);
    assert!(tracker.track_cli("build", None).await.is_none());

    assert_eq!(transport.events().len(), 1);
}

// =============================================================================
// Payload
// =============================================================================

#[tokio::test]
async fn test_save_event_payload() {
    let transport = Arc::new(RecordingTransport::default());
    let tracker = tracker_with(transport.clone(), true);

    let delivery = tracker.track_save(&IrisClassifier::new()).await;
    assert_eq!(delivery, Some(Delivery { status: 200 }));

    let events = transport.events();
    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(event.as_array().unwrap().len(), 1);
    assert_eq!(event[0]["event_type"], json!("save"));
    assert_eq!(event[0]["user_id"], json!("session-1"));

    let properties = &event[0]["event_properties"];
    assert_eq!(
        properties["artifact_types"],
        json!(["SklearnModelArtifact", "TextFileArtifact"])
    );
    assert_eq!(properties["handler_types"], json!(["DataframeHandler"]));
    assert_eq!(
        properties["env"]["pip_dependencies"],
        json!(["scikit-learn"])
    );
}

#[tokio::test]
async fn test_load_event_type() {
    let transport = Arc::new(RecordingTransport::default());
    let tracker = tracker_with(transport.clone(), true);

    tracker.track_load(&IrisClassifier::new()).await;
    assert_eq!(transport.events()[0][0]["event_type"], json!("load"));
}

#[tokio::test]
async fn test_cli_event_with_and_without_platform() {
    let transport = Arc::new(RecordingTransport::default());
    let tracker = tracker_with(transport.clone(), true);

    tracker.track_cli("deploy", Some("aws-lambda")).await;
    tracker.track_cli("serve", None).await;

    let events = transport.events();
    assert_eq!(events[0][0]["event_type"], json!("cli-deploy"));
    assert_eq!(
        events[0][0]["event_properties"]["platform"],
        json!("aws-lambda")
    );
    assert_eq!(events[1][0]["event_type"], json!("cli-serve"));
    assert!(events[1][0]["event_properties"].get("platform").is_none());
}

#[tokio::test]
async fn test_every_event_carries_universal_fields() {
    let transport = Arc::new(RecordingTransport::default());
    let tracker = tracker_with(transport.clone(), true);
    let service = IrisClassifier::new();

    tracker.track_save(&service).await;
    tracker.track_load(&service).await;
    tracker.track_cli("build", None).await;
    let mut custom = EventProperties::new();
    custom.insert("model_count".into(), json!(3));
    tracker.track("custom", &mut custom).await;

    for event in transport.events() {
        let properties = &event[0]["event_properties"];
        for key in [KEY_PY_VERSION, KEY_BENTO_VERSION, KEY_PLATFORM_INFO] {
            assert!(properties.get(key).is_some(), "missing {} in {}", key, event);
        }
    }
}

#[tokio::test]
async fn test_track_mutates_properties_in_place() {
    let transport = Arc::new(RecordingTransport::default());
    let tracker = tracker_with(transport, true);

    let mut properties = EventProperties::new();
    properties.insert("model_count".into(), json!(3));
    tracker.track("custom", &mut properties).await;

    assert_eq!(properties["model_count"], json!(3));
    assert!(properties.contains_key(KEY_PY_VERSION));
    assert!(properties.contains_key(KEY_BENTO_VERSION));
    assert!(properties.contains_key(KEY_PLATFORM_INFO));
}

#[tokio::test]
async fn test_events_share_session_id() {
    let transport = Arc::new(RecordingTransport::default());
    let tracker = Tracker::builder()
        .build_info(dev_build())
        .api_key(Some(TEST_API_KEY.into()))
        .transport(transport.clone())
        .build();

    tracker.track_cli("build", None).await;
    tracker.clone().track_cli("serve", None).await;

    let events = transport.events();
    assert_eq!(events[0][0]["user_id"], events[1][0]["user_id"]);
    assert_eq!(
        events[0][0]["user_id"],
        json!(tracker.session().as_str())
    );
}

// =============================================================================
// Failure suppression
// =============================================================================

#[tokio::test]
async fn test_transport_failure_is_logged_and_swallowed() {
    let (logs, _guard) = capture_logs();
    let transport = Arc::new(RecordingTransport::failing());
    let tracker = tracker_with(transport.clone(), true);

    assert!(tracker.track_save(&IrisClassifier::new()).await.is_none());
    assert_eq!(transport.events().len(), 1);

    let output = logs.contents();
    assert!(output.contains("INFO"), "log output: {}", output);
    assert!(output.contains("connection reset"), "log output: {}", output);
}

#[tokio::test]
async fn test_http_success_posts_form_body() {
    let (url, requests) =
        stub_endpoint(StubReply::Respond("HTTP/1.1 200 OK\r\ncontent-length: 7\r\n\r\nsuccess")).await;
    let tracker = http_tracker(url, Duration::from_secs(1));

    let delivery = tracker.track_cli("deploy", Some("aws-lambda")).await;
    assert_eq!(delivery, Some(Delivery { status: 200 }));

    let requests = requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert!(request.starts_with("POST /httpapi"));
    assert!(
        request
            .to_ascii_lowercase()
            .contains("content-type: application/x-www-form-urlencoded")
    );
    assert!(request.contains("api_key=test-key"));
    assert!(request.contains("event=%5B%7B"));
}

#[tokio::test]
async fn test_http_500_is_swallowed() {
    let (logs, _guard) = capture_logs();
    let (url, requests) = stub_endpoint(StubReply::Respond(
        "HTTP/1.1 500 Internal Server Error\r\ncontent-length: 0\r\n\r\n",
    ))
    .await;
    let tracker = http_tracker(url, Duration::from_secs(1));

    assert!(tracker.track_cli("build", None).await.is_none());
    assert_eq!(requests.lock().unwrap().len(), 1);
    assert!(logs.contents().contains("HTTP 500"));
}

#[tokio::test]
async fn test_http_timeout_is_bounded_and_swallowed() {
    let (logs, _guard) = capture_logs();
    let (url, _requests) = stub_endpoint(StubReply::Hang).await;
    let tracker = http_tracker(url, Duration::from_millis(200));

    let started = Instant::now();
    assert!(tracker.track_load(&IrisClassifier::new()).await.is_none());
    assert!(started.elapsed() < Duration::from_secs(5));
    assert!(logs.contents().contains("Failed to send usage event"));
}

#[tokio::test]
async fn test_malformed_response_is_swallowed() {
    let (logs, _guard) = capture_logs();
    let (url, _requests) = stub_endpoint(StubReply::Respond("definitely not http\r\n\r\n")).await;
    let tracker = http_tracker(url, Duration::from_secs(1));

    assert!(tracker.track_save(&IrisClassifier::new()).await.is_none());
    assert!(logs.contents().contains("Failed to send usage event"));
}

#[tokio::test]
async fn test_connection_refused_is_swallowed() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let tracker = http_tracker(format!("http://{}/httpapi", addr), Duration::from_secs(1));
    assert!(tracker.track_cli("serve", None).await.is_none());
}
