//! Per-line classification for `.http` documents
//!
//! Each physical line is tagged independently of its neighbours; the block
//! assembler decides what a tag means based on where the line sits.

use regex::Regex;
use std::sync::OnceLock;

use crate::models::HttpMethod;

/// What a single line looks like in isolation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// `###` marker, always opens a new block region
    Separator,
    /// `VERB url` or a bare `http(s)://` URL
    Method { method: HttpMethod, url: &'a str },
    /// `# ...` or `// ...`
    Comment,
    /// Empty or whitespace-only
    Blank,
    /// `name: value` with a non-empty name
    Header { name: &'a str, value: &'a str },
    /// Anything else
    Text,
}

fn url_shape() -> &'static Regex {
    static URL_SHAPE: OnceLock<Regex> = OnceLock::new();
    // http(s) URL, absolute path, {{placeholder}}, or host.tld
    URL_SHAPE.get_or_init(|| {
        Regex::new(r"^(?:https?://|/|\{\{|[\w-]+\.[\w-])").expect("URL shape pattern is valid")
    })
}

fn bare_url() -> &'static Regex {
    static BARE_URL: OnceLock<Regex> = OnceLock::new();
    BARE_URL.get_or_init(|| Regex::new(r"^https?://\S+$").expect("bare URL pattern is valid"))
}

/// Classify one line.
///
/// Precedence: blank, separator, method line, comment, header, text.
pub fn classify(line: &str) -> LineKind<'_> {
    let trimmed = line.trim();

    if trimmed.is_empty() {
        return LineKind::Blank;
    }
    if trimmed.starts_with("###") {
        return LineKind::Separator;
    }
    if let Some(method_line) = parse_method_line(line.trim_end()) {
        return method_line;
    }
    if trimmed.starts_with('#') || trimmed.starts_with("//") {
        return LineKind::Comment;
    }
    match trimmed.find(':') {
        Some(idx) if idx > 0 => LineKind::Header {
            name: trimmed[..idx].trim(),
            value: trimmed[idx + 1..].trim(),
        },
        _ => LineKind::Text,
    }
}

/// Method lines must start at column 0.
fn parse_method_line(line: &str) -> Option<LineKind<'_>> {
    if let Some((verb, rest)) = line.split_once(' ') {
        if let Some(method) = HttpMethod::from_verb(verb) {
            let url = rest.trim();
            if url_shape().is_match(url) {
                return Some(LineKind::Method { method, url });
            }
        }
    }

    if bare_url().is_match(line) {
        return Some(LineKind::Method {
            method: HttpMethod::GET,
            url: line,
        });
    }

    None
}
