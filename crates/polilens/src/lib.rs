//! polilens: Privacy policy analysis service
//!
//! Scrapes or accepts privacy policy text, segments it into classifiable
//! chunks, runs a multi-label ONNX classifier over the OPP-115 practice
//! taxonomy, aggregates per-chunk scores into a document-level risk
//! picture, and serves plain-language explanations, summaries, and
//! policy-grounded chat over HTTP.

pub mod chatbot;
pub mod classify;
pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod pipeline;
pub mod server;
pub mod taxonomy;
pub mod types;

pub use config::PolilensConfig;
pub use error::{Error, Result};
pub use pipeline::{PipelineResponse, PolicyPipeline, Route};
pub use types::{AnalysisResponse, PipelineRequest};
