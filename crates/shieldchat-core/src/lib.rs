//! # ShieldChat Core
//!
//! Shared building blocks for the ShieldChat workspace: configuration,
//! the error type, the corpus data model, and the traits that connect
//! retrieval to the completion service.

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use config::ShieldChatConfig;
pub use error::{Result, ShieldChatError};
