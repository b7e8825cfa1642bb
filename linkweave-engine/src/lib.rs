pub mod analysis;
pub mod anchors;
pub mod config;
pub mod error;
pub mod graph;
pub mod keywords;
pub mod model;
pub mod rank;
pub mod recommend;
pub mod scoring;
pub mod service;
pub mod snippet;
pub mod store;

pub use anchors::AnchorReport;
pub use config::{EngineConfig, MAX_PAGES_CEILING};
pub use error::{EngineError, Result, StoreError};
pub use graph::{GraphBuilder, LinkGraph};
pub use model::*;
pub use rank::RankOutcome;
pub use recommend::Recommender;
pub use scoring::{MatchSignals, RelevanceScorer, WeightedScorer};
pub use service::{
    anchor_report, export_graph, graph_stats, recommendations, recommendations_with_scorer,
};
pub use store::{MemoryStore, PageQuery, PageSelection, PageStore};
