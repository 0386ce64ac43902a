//! Executor messages - communication between a caller and the executor actor

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::models::{ExecutionResult, RequestBlock};

/// Commands sent to the executor actor
#[derive(Debug, Clone)]
pub enum ExecutorCommand {
    /// Execute a parsed block; `id` is echoed back in the report
    Execute { id: u64, block: RequestBlock },
    /// Stop accepting commands; in-flight executions still report
    Shutdown,
}

/// Outcome of one `Execute` command
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionReport {
    pub id: u64,
    pub block: RequestBlock,
    pub result: ExecutionResult,
    pub completed_at: DateTime<Local>,
}

impl ExecutionReport {
    pub fn new(id: u64, block: RequestBlock, result: ExecutionResult) -> Self {
        ExecutionReport {
            id,
            block,
            result,
            completed_at: Local::now(),
        }
    }
}
