//! Conversational layer: intent routing, handlers, response envelope

mod guardrail;
mod instruction;
mod intent;
mod rag;
mod response;

pub use guardrail::handle_off_topic;
pub use instruction::handle_instruction_query;
pub use intent::{detect_intent, keyword_intent, normalize_intent, Intent};
pub use rag::{handle_rag_query, NO_CONTEXT_MESSAGE};
pub use response::{build_response, ChatResponse, ResponseType};
