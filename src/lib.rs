//! # Dispatch
//!
//! A plain-text HTTP request runner. Requests live in a `.http` document:
//!
//! ```text
//! ### Create user
//! POST https://api.example.com/users
//! Accept: application/json
//!
//! {"name": "test"}
//! ```
//!
//! ## Architecture
//! Two independent pieces, composed only through data:
//! - Parser - document text to an ordered list of `RequestBlock`s
//! - Executor - one request to an `ExecutionResult`, over an injected `Transport`
//!
//! Storage, config, update checks and terminal output are glue around them.

pub mod cli;
pub mod config;
pub mod constants;
pub mod messages;
pub mod models;
pub mod network;
pub mod parser;
pub mod report;
pub mod storage;
pub mod update;

// Re-export commonly used types
pub use config::Config;
pub use messages::{ExecutionReport, ExecutorCommand};
pub use models::{ExecutionResult, Header, Headers, HttpMethod, RequestBlock};
pub use network::{Executor, ExecutorActor, ReqwestTransport, Transport};
pub use parser::{find_block_at_line, parse};
pub use storage::Storage;
pub use update::{check_for_update, is_newer, UpdateInfo};
