use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use anyhow::{Context, Result};
use regex::Regex;

const DELIMITER: &str = "---";

/// Flat `key: value` header parsed from the top of a markdown file.
///
/// Only single-line scalar entries are kept, keyed by name; a repeated key
/// keeps its last value. Nested YAML, block scalars and multi-line lists are
/// outside what the event files use and are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frontmatter {
    entries: BTreeMap<String, String>,
}

impl Frontmatter {
    /// Value for `key`, or `None` when the key is absent or blank.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.trim().is_empty())
    }

    /// Value for `key` decoded with [`parse_list_value`]; empty when absent.
    pub fn list(&self, key: &str) -> Vec<String> {
        self.get(key).map(parse_list_value).unwrap_or_default()
    }
}

/// Extracts the `---` delimited header at the very start of `text`.
///
/// Returns `None` when the file has no header block; callers treat that as
/// "skip this file".
pub fn parse_frontmatter(text: &str) -> Option<Frontmatter> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut lines = text.lines().map(|line| line.trim_end_matches('\r'));

    if lines.next()?.trim_end() != DELIMITER {
        return None;
    }

    let mut entries = BTreeMap::new();
    let mut closed = false;
    for line in lines {
        if line.trim_end() == DELIMITER {
            closed = true;
            break;
        }
        if let Some((key, value)) = parse_entry(line) {
            entries.insert(key, value);
        }
    }

    closed.then_some(Frontmatter { entries })
}

/// Reads `path` and parses its header. I/O failures are errors; a missing
/// header is `Ok(None)`.
pub fn read_frontmatter(path: &Path) -> Result<Option<Frontmatter>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read markdown file {}", path.display()))?;
    Ok(parse_frontmatter(&contents))
}

/// Decodes `[a, b, "c"]` or `a, b, c` into an ordered list.
pub fn parse_list_value(raw: &str) -> Vec<String> {
    let stripped = raw
        .chars()
        .filter(|ch| !matches!(ch, '[' | ']' | '"' | '\''))
        .collect::<String>();
    stripped
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_owned)
        .collect()
}

fn parse_entry(line: &str) -> Option<(String, String)> {
    static ENTRY_RE: OnceLock<Regex> = OnceLock::new();
    let re = ENTRY_RE.get_or_init(|| {
        Regex::new(r"^([A-Za-z0-9_][A-Za-z0-9_-]*)\s*:\s*(.+)$")
            .expect("frontmatter entry regex should compile")
    });
    let capture = re.captures(line)?;
    let key = capture.get(1)?.as_str().to_owned();
    let value = strip_matching_quotes(capture.get(2)?.as_str().trim());
    Some((key, value.to_owned()))
}

fn strip_matching_quotes(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::{parse_frontmatter, parse_list_value, read_frontmatter};

    const EVENT: &str = r#"---
title: "Lecture 5 - GPU Memory Coalescing"
date: 2026-02-27
time: '2:00 PM - 4:00 PM'
eventType: "in-person"
tags: ["CUDA", "Performance"]
resources: []
  indented: ignored
not a pair
---

Body text with key: value that must not be read.
"#;

    #[test]
    fn header_entries_are_parsed_and_unquoted() {
        let fm = parse_frontmatter(EVENT).expect("frontmatter should parse");
        assert_eq!(fm.get("title"), Some("Lecture 5 - GPU Memory Coalescing"));
        assert_eq!(fm.get("date"), Some("2026-02-27"));
        assert_eq!(fm.get("time"), Some("2:00 PM - 4:00 PM"));
        assert_eq!(fm.get("eventType"), Some("in-person"));
        assert_eq!(fm.list("tags"), vec!["CUDA", "Performance"]);
        assert!(fm.get("indented").is_none());
        assert!(fm.get("Body text with key").is_none());
    }

    #[test]
    fn empty_list_value_decodes_to_nothing() {
        let fm = parse_frontmatter(EVENT).expect("frontmatter should parse");
        assert!(fm.list("resources").is_empty());
        assert!(fm.list("missing").is_empty());
    }

    #[test]
    fn missing_header_is_none() {
        assert!(parse_frontmatter("# Just a heading\n\ntext").is_none());
        assert!(parse_frontmatter("").is_none());
        assert!(parse_frontmatter("\n---\ntitle: late\n---\n").is_none());
    }

    #[test]
    fn unterminated_header_is_none() {
        assert!(parse_frontmatter("---\ntitle: open\nbody").is_none());
    }

    #[test]
    fn crlf_and_bom_are_tolerated() {
        let fm = parse_frontmatter("\u{feff}---\r\ntitle: 'Sesión 3'\r\n---\r\n")
            .expect("frontmatter should parse");
        assert_eq!(fm.get("title"), Some("Sesión 3"));
    }

    #[test]
    fn repeated_key_keeps_last_value() {
        let fm = parse_frontmatter("---\ntitle: Draft\ntitle: Final\n---\n")
            .expect("frontmatter should parse");
        assert_eq!(fm.get("title"), Some("Final"));
    }

    #[test]
    fn blank_values_read_as_absent() {
        let fm = parse_frontmatter("---\nlocation: \"\"\nroom: \n---\n")
            .expect("frontmatter should parse");
        assert!(fm.get("location").is_none());
        assert!(fm.get("room").is_none());
    }

    #[test]
    fn list_decoder_handles_both_syntaxes() {
        assert_eq!(
            parse_list_value(r#"[a, b, "c"]"#),
            vec!["a".to_owned(), "b".to_owned(), "c".to_owned()]
        );
        assert_eq!(parse_list_value("AI, Research"), vec!["AI", "Research"]);
        assert_eq!(parse_list_value("[ , 'x',, ]"), vec!["x"]);
    }

    #[test]
    fn read_frontmatter_reports_missing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let error = read_frontmatter(&dir.path().join("nope.md")).expect_err("missing file");
        assert!(format!("{error:#}").contains("failed to read markdown file"));
    }
}
