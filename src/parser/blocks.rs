//! Block assembly - turns classified lines into `RequestBlock`s
//!
//! Two passes: collect line ranges anchored on separators and method lines,
//! then slice each range into method/headers/body.

use crate::models::{Headers, RequestBlock};
use crate::parser::lines::{classify, LineKind};

/// A candidate block span; `method_line` is `None` for a separator that
/// has not (yet) been followed by a method line.
#[derive(Debug, Clone, Copy)]
struct Region {
    start: usize,
    method_line: Option<usize>,
    end: usize,
}

/// Parse a whole document into request blocks, ordered by `start_line`.
pub fn parse(document: &str) -> Vec<RequestBlock> {
    let lines: Vec<&str> = document.lines().collect();
    let kinds: Vec<LineKind<'_>> = lines.iter().copied().map(classify).collect();

    let blocks: Vec<RequestBlock> = collect_regions(&kinds)
        .into_iter()
        .filter_map(|region| assemble(&lines, &kinds, region))
        .collect();

    tracing::debug!(lines = lines.len(), blocks = blocks.len(), "Parsed document");
    blocks
}

/// First block whose `[start_line, end_line]` range covers `line`.
pub fn find_block_at_line(blocks: &[RequestBlock], line: usize) -> Option<&RequestBlock> {
    blocks.iter().find(|block| block.contains_line(line))
}

fn collect_regions(kinds: &[LineKind<'_>]) -> Vec<Region> {
    let mut regions = Vec::new();
    let mut open: Option<Region> = None;

    for (idx, kind) in kinds.iter().enumerate() {
        match kind {
            LineKind::Separator => {
                close_region(&mut regions, open.take(), idx);
                open = Some(Region {
                    start: idx,
                    method_line: None,
                    end: idx,
                });
            }
            LineKind::Method { .. } => match open.as_mut() {
                // Separator region waiting for its method line
                Some(region) if region.method_line.is_none() => region.method_line = Some(idx),
                _ => {
                    close_region(&mut regions, open.take(), idx);
                    open = Some(Region {
                        start: idx,
                        method_line: Some(idx),
                        end: idx,
                    });
                }
            },
            _ => {}
        }
    }

    close_region(&mut regions, open, kinds.len());
    regions
}

/// Close `region` on the line before `next_start`.
fn close_region(regions: &mut Vec<Region>, region: Option<Region>, next_start: usize) {
    if let Some(mut region) = region {
        region.end = next_start - 1;
        regions.push(region);
    }
}

fn assemble(lines: &[&str], kinds: &[LineKind<'_>], region: Region) -> Option<RequestBlock> {
    let method_line = region.method_line?;
    let LineKind::Method { method, url } = kinds[method_line] else {
        return None;
    };

    // Trailing blank lines never belong to a block
    let end = (method_line..=region.end)
        .rev()
        .find(|&idx| kinds[idx] != LineKind::Blank)
        .unwrap_or(method_line);

    let mut headers = Headers::new();
    let mut body_start = None;
    for idx in method_line + 1..=end {
        match kinds[idx] {
            LineKind::Blank => {
                body_start = Some(idx + 1);
                break;
            }
            LineKind::Header { name, value } => headers.insert(name, value),
            _ => {}
        }
    }

    let body = match body_start {
        Some(start) if start <= end => lines[start..=end].join("\n"),
        _ => String::new(),
    };

    Some(RequestBlock {
        method,
        url: url.to_string(),
        headers,
        body,
        start_line: region.start,
        end_line: end,
        method_line,
    })
}
