//! Terminal presentation of parsed blocks and execution results

use crate::messages::ExecutionReport;
use crate::models::{ExecutionResult, RequestBlock};

/// Status band used when displaying a result
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusClass {
    Informational,
    Success,
    Redirect,
    ClientError,
    ServerError,
    Unknown,
}

impl StatusClass {
    pub fn from_status(code: u16) -> StatusClass {
        match code {
            100..=199 => StatusClass::Informational,
            200..=299 => StatusClass::Success,
            300..=399 => StatusClass::Redirect,
            400..=499 => StatusClass::ClientError,
            500..=599 => StatusClass::ServerError,
            _ => StatusClass::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StatusClass::Informational => "info",
            StatusClass::Success => "ok",
            StatusClass::Redirect => "redirect",
            StatusClass::ClientError => "client error",
            StatusClass::ServerError => "server error",
            StatusClass::Unknown => "unknown",
        }
    }
}

/// Pretty-print JSON bodies; anything else is returned verbatim
pub fn pretty_body(body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(json) => serde_json::to_string_pretty(&json).unwrap_or_else(|_| body.to_string()),
        Err(_) => body.to_string(),
    }
}

/// One listing line, with 1-based line numbers
pub fn format_block_line(index: usize, block: &RequestBlock) -> String {
    let mut line = format!(
        "{:>3}  L{}-{}  {:<7} {}",
        index + 1,
        block.start_line + 1,
        block.end_line + 1,
        block.method.as_str(),
        block.url
    );
    if !block.headers.is_empty() {
        line.push_str(&format!("  [{} header(s)]", block.headers.len()));
    }
    if !block.body.is_empty() {
        line.push_str("  [body]");
    }
    line
}

/// Status line plus headers and body
pub fn format_result(result: &ExecutionResult, show_headers: bool) -> String {
    if let Some(error) = &result.error {
        return format!("ERROR  {}  ({} ms)", error, result.duration_millis);
    }

    let mut out = format!(
        "{} {}  ({} ms)\n",
        result.status,
        StatusClass::from_status(result.status).label(),
        result.duration_millis
    );
    if show_headers {
        for (name, value) in &result.headers {
            out.push_str(&format!("{}: {}\n", name, value));
        }
    }
    if !result.body.is_empty() {
        out.push('\n');
        out.push_str(&pretty_body(&result.body));
        out.push('\n');
    }
    out
}

/// Header line identifying which block a report belongs to
pub fn format_report_heading(report: &ExecutionReport) -> String {
    format!(
        "[{}] {} {}  (line {})",
        report.completed_at.format("%H:%M:%S"),
        report.block.method.as_str(),
        report.block.url,
        report.block.method_line + 1
    )
}
