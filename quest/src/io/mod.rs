//! Side-effecting helpers: configuration, the model endpoint, prompts, export.

pub mod brief;
pub mod completion;
pub mod config;
pub mod export;
pub mod init;
pub mod prompt;
pub mod schema;
pub mod validator;
