//! Request and response envelope types

mod request;
mod response;

pub use request::{AnalyzeTextRequest, AnalyzeUrlRequest, ChatMessageRequest, PipelineRequest};
pub use response::{AnalysisResponse, ModelsResponse};
