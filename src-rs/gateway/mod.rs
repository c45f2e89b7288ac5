pub mod compat;
pub mod native;
pub mod normalize;
pub mod rotation;
pub mod sse;
pub mod types;

pub use rotation::KeyRotator;
pub use sse::SseTextStream;
pub use types::{
    ChatMessage, ChatRequest, Completion, ContentPart, MessageContent, ModelEntry, Role,
};
