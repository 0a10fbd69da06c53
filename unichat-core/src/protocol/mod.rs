//! Core protocol types shared by all backend variants

pub mod types;

pub use types::{
    Attachment, AttachmentData, ChatModel, FunctionDefinition, Message, Response, Role,
    ToolDefinition,
};
