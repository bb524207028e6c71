use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use sitedb_core::config::Settings;
use sitedb_core::traits::{Embedder, GenerationRequest, Generator};
use sitedb_core::types::{CollectionKind, Document};
use sitedb_embed::FakeEmbedder;
use sitedb_hybrid::{Agent, Outcome, RetrievalEngine};
use sitedb_vector::EmbeddingStore;
use tempfile::{tempdir, TempDir};

struct Recording {
    fail: bool,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl Recording {
    fn new(fail: bool) -> Arc<Self> { Arc::new(Self { fail, requests: Mutex::new(Vec::new()) }) }
    fn requests(&self) -> Vec<GenerationRequest> { self.requests.lock().unwrap().clone() }
}

#[async_trait]
impl Generator for Recording {
    async fn generate(&self, request: &GenerationRequest) -> anyhow::Result<String> {
        self.requests.lock().unwrap().push(request.clone());
        if self.fail { anyhow::bail!("service unavailable") }
        Ok("Sundt built the San Antonio River Bridge.".into())
    }
}

/// Accepts the request and never answers.
struct Hanging;

#[async_trait]
impl Generator for Hanging {
    async fn generate(&self, _request: &GenerationRequest) -> anyhow::Result<String> {
        std::future::pending::<anyhow::Result<String>>().await
    }
}

fn settings() -> Settings {
    let mut settings = Settings::default();
    settings.generation.max_retries = 0;
    settings
}

fn engine(projects: Vec<Document>, cache: Option<&str>) -> (TempDir, Arc<RetrievalEngine>) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("local_embeddings.json");
    if let Some(contents) = cache { std::fs::write(&path, contents).unwrap(); }
    let embedder: Arc<dyn Embedder> = Arc::new(FakeEmbedder::new(384));
    let engine = RetrievalEngine::new(projects, Vec::new(), Some(embedder), EmbeddingStore::new(path), &settings());
    (dir, Arc::new(engine))
}

fn projects() -> Vec<Document> {
    let mut bridge = Document::titled("San Antonio River Bridge");
    bridge.location = Some("San Antonio, TX".into());
    bridge.description = Some("Pedestrian bridge over the San Antonio River.".into());
    let mut clinic = Document::titled("Clinic");
    clinic.location = Some("Tucson, AZ".into());
    vec![bridge, clinic]
}

#[tokio::test]
async fn answers_with_assembled_context() {
    let (_dir, engine) = engine(projects(), None);
    let generator = Recording::new(false);
    let agent = Agent::new(CollectionKind::Projects, engine, generator.clone(), &settings());
    let response = agent.run("bridge projects in San Antonio").await;

    assert_eq!(response.outcome, Outcome::Answered);
    assert!(response.success);
    assert_eq!(response.response, "Sundt built the San Antonio River Bridge.");
    assert_eq!(response.records[0].document.title, "San Antonio River Bridge");
    let requests = generator.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].kind, CollectionKind::Projects);
    assert!(requests[0].context.starts_with("PROJECT 1:\nTitle: San Antonio River Bridge"));
}

#[tokio::test]
async fn no_matches_is_not_a_failure() {
    let (_dir, engine) = engine(projects(), None);
    let generator = Recording::new(false);
    let agent = Agent::new(CollectionKind::Projects, engine, generator.clone(), &settings());
    let response = agent.run("zebra xylophone").await;

    assert_eq!(response.outcome, Outcome::NoMatches);
    assert!(!response.success);
    assert!(response.response.starts_with("I couldn't find any Sundt Construction projects"));
    assert!(generator.requests().is_empty());
}

#[tokio::test]
async fn generation_failure_is_reported() {
    let (_dir, engine) = engine(projects(), None);
    let generator = Recording::new(true);
    let agent = Agent::new(CollectionKind::Projects, engine, generator.clone(), &settings());
    let response = agent.run("bridge projects in San Antonio").await;

    match &response.outcome {
        Outcome::Failed { reason } => assert!(reason.contains("service unavailable"), "{reason}"),
        other => panic!("unexpected outcome {other:?}"),
    }
    assert!(!response.records.is_empty());
    assert_eq!(generator.requests().len(), 1);
    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["outcome"]["status"], "failed");
}

#[tokio::test]
async fn retrieval_error_is_distinct_from_no_matches() {
    let (_dir, engine) = engine(projects(), Some(r#"{"projects": [[1.0]], "awards": []}"#));
    let generator = Recording::new(false);
    let agent = Agent::new(CollectionKind::Projects, engine, generator.clone(), &settings());
    let response = agent.run("bridge").await;

    assert!(matches!(response.outcome, Outcome::Failed { .. }));
    assert!(response.response.starts_with("I encountered an error"));
    assert!(generator.requests().is_empty());
}

#[tokio::test]
async fn hanging_generation_stops_at_request_deadline() {
    let (_dir, engine) = engine(projects(), None);
    let mut settings = settings();
    settings.retrieval.deadline_secs = 1;
    settings.generation.max_retries = 2;
    settings.generation.attempt_timeout_secs = 60;
    let agent = Agent::new(CollectionKind::Projects, engine, Arc::new(Hanging), &settings);

    let start = Instant::now();
    let response = agent.run("bridge projects in San Antonio").await;
    let elapsed = start.elapsed();

    assert!(elapsed >= Duration::from_secs(1), "{elapsed:?}");
    assert!(elapsed < Duration::from_secs(10), "{elapsed:?}");
    match &response.outcome {
        Outcome::Failed { reason } => assert!(reason.starts_with("Timed out"), "{reason}"),
        other => panic!("unexpected outcome {other:?}"),
    }
    assert!(!response.records.is_empty());
    assert!(response.response.starts_with("I encountered an error"));
}
