//! Hook self-description parsing.
//!
//! Hooks describe themselves in one of three ways, first non-empty wins:
//!
//! 1. comment header lines in scripts (`.py/.sh/.js/.ts`):
//!    `# hawk-hook: events=stop,notification`
//! 2. YAML frontmatter with a top-level `hawk-hook:` mapping in
//!    markdown/text/`.stdout.*` files
//! 3. legacy fallback: the immediate parent directory is named after a
//!    known event
//!
//! The parser is advisory and total: malformed YAML, unreadable files and
//! binary content all yield empty metadata, never an error. A hook whose
//! events remain empty is inert and appears in no runner.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::event::HookEvent;

/// Parsed hook metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HookMeta {
    /// Canonical events, declared order, duplicates removed.
    pub events: Vec<HookEvent>,
    pub description: Option<String>,
    pub deps: Vec<String>,
    /// `KEY=DEFAULT` environment hints.
    pub env: Vec<String>,
    /// Advisory timeout in seconds, enforced by the host tool.
    pub timeout: Option<u64>,
}

impl HookMeta {
    /// True when the hook subscribes to no events.
    pub fn is_inert(&self) -> bool {
        self.events.is_empty()
    }

    /// `env` hints split into `(KEY, DEFAULT)` pairs. A hint without `=`
    /// becomes a key with an empty default.
    pub fn env_pairs(&self) -> Vec<(String, String)> {
        self.env
            .iter()
            .map(|hint| match hint.split_once('=') {
                Some((key, default)) => (key.trim().to_string(), default.to_string()),
                None => (hint.trim().to_string(), String::new()),
            })
            .collect()
    }
}

/// Script extensions that carry comment headers.
const SCRIPT_EXTENSIONS: [&str; 4] = ["py", "sh", "js", "ts"];

/// Parse the metadata of a hook file. Never fails.
pub fn parse(path: &Path) -> HookMeta {
    let mut meta = match read_text(path) {
        Some(text) => {
            if has_script_extension(path) {
                parse_comment_header(&text)
            } else if text.starts_with("---\n") || text.starts_with("---\r\n") {
                parse_frontmatter(&text)
            } else {
                HookMeta::default()
            }
        }
        None => HookMeta::default(),
    };

    // Legacy layout: hooks grouped in directories named after their event.
    if meta.events.is_empty() {
        if let Some(event) = parent_dir_event(path) {
            meta.events.push(event);
        }
    }

    meta
}

fn has_script_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| SCRIPT_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

fn read_text(path: &Path) -> Option<String> {
    let bytes = std::fs::read(path).ok()?;
    String::from_utf8(bytes).ok()
}

fn parent_dir_event(path: &Path) -> Option<HookEvent> {
    let parent = path.parent()?.file_name()?.to_str()?;
    HookEvent::from_token(parent)
}

fn header_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*(?:#|//)\s*hawk-hook:\s*(.*)$").unwrap())
}

fn comment_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*(?:#|//)").unwrap())
}

/// Scan the contiguous comment block at the top of a script, after an
/// optional shebang, and extract `hawk-hook: key=value` lines.
fn parse_comment_header(text: &str) -> HookMeta {
    let mut meta = HookMeta::default();
    let mut lines = text.lines().peekable();

    if lines.peek().is_some_and(|l| l.starts_with("#!")) {
        lines.next();
    }

    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        if !comment_regex().is_match(line) {
            break;
        }
        if let Some(caps) = header_regex().captures(line) {
            if let Some((key, value)) = caps[1].split_once('=') {
                apply_pair(&mut meta, key.trim(), value.trim());
            }
        }
    }

    meta
}

fn apply_pair(meta: &mut HookMeta, key: &str, value: &str) {
    match key {
        "events" => set_events(meta, value.split(',')),
        "description" => meta.description = Some(value.to_string()),
        "deps" => {
            meta.deps = value
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }
        // Multiple env lines accumulate.
        "env" => meta.env.push(value.to_string()),
        "timeout" => meta.timeout = value.parse().ok(),
        other => debug!(key = other, "ignoring unknown hawk-hook key"),
    }
}

/// Normalize declared tokens to canonical events, dropping unknown ones
/// and duplicates while preserving first occurrence.
fn set_events<'a>(meta: &mut HookMeta, tokens: impl Iterator<Item = &'a str>) {
    meta.events.clear();
    for token in tokens {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        match HookEvent::from_token(token) {
            Some(event) => {
                if !meta.events.contains(&event) {
                    meta.events.push(event);
                }
            }
            None => debug!(token, "dropping unknown hook event token"),
        }
    }
}

/// Parse the delimited YAML frontmatter block and read the `hawk-hook`
/// submapping. Any malformation yields empty metadata.
fn parse_frontmatter(text: &str) -> HookMeta {
    let Some(block) = frontmatter_block(text) else {
        return HookMeta::default();
    };
    let Ok(value) = serde_yaml::from_str::<serde_yaml::Value>(block) else {
        return HookMeta::default();
    };
    let Some(section) = value.get("hawk-hook") else {
        return HookMeta::default();
    };

    let mut meta = HookMeta::default();

    match section.get("events") {
        Some(serde_yaml::Value::Sequence(seq)) => {
            let tokens: Vec<String> = seq
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect();
            set_events(&mut meta, tokens.iter().map(String::as_str));
        }
        Some(serde_yaml::Value::String(s)) => set_events(&mut meta, s.split(',')),
        _ => {}
    }

    if let Some(desc) = section.get("description").and_then(|v| v.as_str()) {
        meta.description = Some(desc.to_string());
    }

    match section.get("deps") {
        Some(serde_yaml::Value::Sequence(seq)) => {
            meta.deps = seq
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect();
        }
        Some(serde_yaml::Value::String(s)) => {
            meta.deps = s
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect();
        }
        _ => {}
    }

    match section.get("env") {
        Some(serde_yaml::Value::Sequence(seq)) => {
            meta.env = seq
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect();
        }
        Some(serde_yaml::Value::String(s)) => meta.env = vec![s.to_string()],
        _ => {}
    }

    meta.timeout = section.get("timeout").and_then(|v| v.as_u64());

    meta
}

/// Return the YAML between the opening `---` and a closing `---` line,
/// or `None` when the block is unterminated.
fn frontmatter_block(text: &str) -> Option<&str> {
    let rest = text
        .strip_prefix("---\r\n")
        .or_else(|| text.strip_prefix("---\n"))?;
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            return Some(&rest[..offset]);
        }
        offset += line.len();
    }
    None
}

#[cfg(test)]
#[path = "meta_tests.rs"]
mod tests;
