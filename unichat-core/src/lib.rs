//! Unichat Core Library
//!
//! This crate unifies heterogeneous LLM backends behind one conversational
//! interface: obtain a [`Provider`] by backend key, create a [`ChatSession`]
//! for a model, append [`Message`]s, then stream [`Response`] fragments or
//! extract a schema-constrained typed value.
//!
//! ```no_run
//! use unichat_core::{get_provider, ProviderExt};
//!
//! # async fn run() -> unichat_core::ProviderResult<()> {
//! let provider = get_provider("Anthropic", std::env::var("ANTHROPIC_API_KEY").unwrap())?;
//! let mut session = provider.create_chat_session("claude-sonnet-4-5");
//! session.add_system_prompt("You are terse.");
//! session.add_user_message("Why is the sky blue?");
//! let reply = session.get_response().await?;
//! println!("{}", reply.content());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod protocol;
pub mod providers;
pub mod session;
pub mod structured;

pub use config::{ConfigError, SecretString, Settings};
pub use error::{ProviderError, ProviderResult};
pub use protocol::{
    Attachment, AttachmentData, ChatModel, FunctionDefinition, Message, Response, Role,
    ToolDefinition,
};
pub use providers::{
    get_provider, get_provider_with, Provider, ProviderExt, ProviderInit, ProviderRegistry,
    ResponseStream,
};
pub use session::{ChatSession, DEFAULT_SHORT_TERM_MEMORY_LENGTH};

/// Returns the version of the Unichat Core library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
