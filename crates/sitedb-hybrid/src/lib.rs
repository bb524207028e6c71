//! sitedb-hybrid
//!
//! Query pipeline over the project and award collections: vector
//! candidates, keyword boost with frequency dampening, pattern-aware
//! re-ranking, token-budgeted context assembly and the per-collection
//! agents that hand that context to the generation capability.

pub mod agent;
pub mod collection;
pub mod context;
pub mod engine;
pub mod fields;
pub mod hybrid;
pub mod rerank;

pub use agent::{Agent, AgentResponse, Outcome};
pub use collection::Collection;
pub use context::ContextAssembler;
pub use engine::{EngineState, RetrievalEngine, SearchResponse, SearchScope};
