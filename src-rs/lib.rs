pub mod config;
pub mod error;
pub mod gateway;
pub mod helpers;
pub mod pipe;

pub use config::{ApiFormat, PipeConfig, ReasoningLevel};
pub use error::PipeError;
pub use gateway::{
    ChatMessage, ChatRequest, Completion, ContentPart, KeyRotator, MessageContent, ModelEntry,
    Role, SseTextStream,
};
pub use pipe::Pipe;
