//! Test utilities for triage HTTP integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response};
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use triage::classify::{Category, ClassificationResult, Classifier, Subtype};
use triage::config::Settings;
use triage::error::{Result, TriageError};
use triage::pipeline::{ClassificationLogger, ClassificationOrchestrator, MemorySink};
use triage::web::{create_router, state::AppState};

pub const BOUNDARY: &str = "triage-test-boundary";

/// Classifier with scripted behaviour that counts its calls
pub struct StubClassifier {
    behaviour: Behaviour,
    calls: AtomicUsize,
}

enum Behaviour {
    Succeed,
    Stall(Duration),
    Fail,
}

impl StubClassifier {
    pub fn succeeding() -> Arc<Self> {
        Self::with(Behaviour::Succeed)
    }

    pub fn stalling(delay: Duration) -> Arc<Self> {
        Self::with(Behaviour::Stall(delay))
    }

    pub fn failing() -> Arc<Self> {
        Self::with(Behaviour::Fail)
    }

    fn with(behaviour: Behaviour) -> Arc<Self> {
        Arc::new(Self {
            behaviour,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

pub fn sample_result() -> ClassificationResult {
    ClassificationResult {
        category: Category::Productive,
        subtype: Subtype::Status,
        confidence: 0.92,
        summary: "Status request for ticket 12345".into(),
        reasons: vec!["Explicit update request".into()],
        suggested_reply: "We are on it and will update you today.".into(),
    }
}

#[async_trait]
impl Classifier for StubClassifier {
    async fn classify(&self, _text: &str) -> Result<ClassificationResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.behaviour {
            Behaviour::Succeed => Ok(sample_result()),
            Behaviour::Stall(delay) => {
                tokio::time::sleep(delay).await;
                Ok(sample_result())
            }
            Behaviour::Fail => Err(TriageError::ClassificationProvider("HTTP 500".into())),
        }
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

/// Small limits so size and budget edges are cheap to reach
pub fn test_settings() -> Settings {
    let mut settings = Settings::new("test-key");
    settings.max_upload_mb = 1;
    settings.max_chars = 50;
    settings
}

/// Router wired to `classifier`, with classification records captured in memory
pub fn test_app(settings: Settings, classifier: Arc<dyn Classifier>) -> (Router, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::default());
    let orchestrator = ClassificationOrchestrator::from_settings(&settings, classifier)
        .with_logger(ClassificationLogger::new(sink.clone()));
    let state = AppState::new(Arc::new(settings), orchestrator);
    (create_router(state), sink)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// POST /classify-text with a urlencoded `text` field (letters, digits and spaces only)
pub fn text_request(text: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/classify-text")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(format!("text={}", text.replace(' ', "+"))))
        .unwrap()
}

/// POST /classify-text with `text` sent as a multipart field
pub fn text_multipart_request(text: &str) -> Request<Body> {
    let body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"text\"\r\n\r\n{text}\r\n--{BOUNDARY}--\r\n"
    );
    Request::builder()
        .method("POST")
        .uri("/classify-text")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

/// POST /classify-file with a single part named `field`
pub fn file_request_with_field(
    field: &str,
    filename: &str,
    content_type: &str,
    bytes: &[u8],
) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/classify-file")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

pub fn file_request(filename: &str, content_type: &str, bytes: &[u8]) -> Request<Body> {
    file_request_with_field("file", filename, content_type, bytes)
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn records(sink: &MemorySink) -> Vec<Value> {
    sink.lines()
        .iter()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

/// PDF whose only page has an empty content stream
pub fn blank_pdf() -> Vec<u8> {
    use lopdf::dictionary;
    use lopdf::{Document, Object, Stream};

    let mut doc = Document::with_version("1.4");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let content_id = doc.add_object(Stream::new(dictionary! {}, Vec::new()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        "Contents" => content_id,
        "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
    });
    let kids: Vec<Object> = vec![page_id.into()];
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}
