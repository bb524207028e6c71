use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{info, warn};

use sitedb_core::config::Settings;
use sitedb_core::error::Error;
use sitedb_core::traits::{GenerationRequest, Generator};
use sitedb_core::types::{CollectionKind, ScoredResult};
use sitedb_generate::{invoke_with_retry, RetryPolicy};

use crate::context::ContextAssembler;
use crate::engine::RetrievalEngine;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Answered,
    /// Retrieval worked but nothing matched.
    NoMatches,
    Failed { reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentResponse {
    pub query: String,
    pub response: String,
    pub records: Vec<ScoredResult>,
    pub outcome: Outcome,
    pub success: bool,
    /// Seconds.
    pub execution_time: f64,
}

/// Answers questions about one collection: retrieve, assemble context,
/// generate. Queries must already be sanitized.
pub struct Agent {
    kind: CollectionKind,
    engine: Arc<RetrievalEngine>,
    generator: Arc<dyn Generator>,
    policy: RetryPolicy,
    assembler: ContextAssembler,
    company: String,
    limit: usize,
    deadline: Duration,
}

impl Agent {
    pub fn new(kind: CollectionKind, engine: Arc<RetrievalEngine>, generator: Arc<dyn Generator>, settings: &Settings) -> Self {
        Self {
            kind,
            engine,
            generator,
            policy: RetryPolicy::from_settings(&settings.generation),
            assembler: ContextAssembler::from_settings(&settings.context),
            company: settings.generation.company.clone(),
            limit: settings.retrieval.result_limit,
            deadline: settings.retrieval.deadline(),
        }
    }

    pub fn kind(&self) -> CollectionKind { self.kind }

    /// Retrieval and generation share one deadline; whatever is still
    /// running when it passes is abandoned and the run fails with a timeout.
    pub async fn run(&self, query: &str) -> AgentResponse {
        let start = Instant::now();
        let deadline_at = tokio::time::Instant::now() + self.deadline;
        let (response, records, outcome) = match self.retrieve(query, deadline_at).await {
            Err(e) => {
                warn!(kind = %self.kind, error = %e, "retrieval failed");
                (self.error_message(), Vec::new(), Outcome::Failed { reason: e.to_string() })
            }
            Ok(records) if records.is_empty() => {
                info!(kind = %self.kind, query, "no matching records");
                (self.no_match_message(), records, Outcome::NoMatches)
            }
            Ok(records) => {
                let request = GenerationRequest { kind: self.kind, query: query.to_string(), context: self.assembler.assemble(&records) };
                let generation = invoke_with_retry(self.generator.as_ref(), &request, &self.policy);
                match tokio::time::timeout_at(deadline_at, generation).await {
                    Ok(Ok(text)) => (text, records, Outcome::Answered),
                    Ok(Err(e)) => (self.error_message(), records, Outcome::Failed { reason: e.to_string() }),
                    Err(_) => {
                        warn!(kind = %self.kind, deadline = ?self.deadline, "generation ran past the request deadline");
                        (self.error_message(), records, Outcome::Failed { reason: Error::Timeout(self.deadline).to_string() })
                    }
                }
            }
        };
        let success = outcome == Outcome::Answered;
        let execution_time = start.elapsed().as_secs_f64();
        info!(kind = %self.kind, success, records = records.len(), execution_time, "agent run finished");
        AgentResponse { query: query.to_string(), response, records, outcome, success, execution_time }
    }

    async fn retrieve(&self, query: &str, deadline_at: tokio::time::Instant) -> Result<Vec<ScoredResult>, Error> {
        let engine = Arc::clone(&self.engine);
        let (kind, limit, owned) = (self.kind, self.limit, query.to_string());
        let task = tokio::task::spawn_blocking(move || engine.search(kind, &owned, limit));
        match tokio::time::timeout_at(deadline_at, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join)) => Err(Error::Operation(format!("retrieval task failed: {join}"))),
            Err(_) => Err(Error::Timeout(self.deadline)),
        }
    }

    fn no_match_message(&self) -> String {
        format!(
            "I couldn't find any {} {} matching your query. Would you like to try a different search term?",
            self.company, self.kind
        )
    }

    fn error_message(&self) -> String {
        format!("I encountered an error while processing your request about {} {}. Please try again.", self.company, self.kind)
    }
}
