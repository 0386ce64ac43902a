//! Document parser - splits a `.http` document into request blocks
//!
//! The format is line oriented and forgiving:
//! - `###` starts a new block
//! - `VERB url` (or a bare `http(s)://` URL for GET) is the method line
//! - `Name: value` lines up to the first blank line are headers
//! - everything after that blank line is the body
//! - `#` and `//` lines are comments in the header region
//!
//! Parsing is pure; fragments that never reach a method line are dropped.

pub mod blocks;
pub mod lines;

pub use blocks::{find_block_at_line, parse};
pub use lines::{classify, LineKind};
