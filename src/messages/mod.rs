//! Message types exchanged with the executor actor.

pub mod network;

pub use network::{ExecutionReport, ExecutorCommand};
