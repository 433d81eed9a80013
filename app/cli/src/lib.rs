//! ragchat CLI application: runs the gateway, chats with it from the
//! terminal and drives the ingestion backend.

pub use cmd::{Cli, Command};

pub mod cmd;
pub mod config;
pub mod repl;
