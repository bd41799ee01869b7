//! Title layout for the event card: lecture/session badge extraction and a
//! greedy word wrap measured in characters.
//!
//! Widths are counted in `char`s rather than bytes so accented Spanish titles
//! wrap at the same visual width as English ones. Words are never split; a
//! word longer than the budget gets a line of its own.

use std::mem;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

pub const MAX_CHARS_PER_LINE: usize = 32;
pub const MAX_TITLE_LINES: usize = 3;

const SUBTITLE_SEPARATOR: &str = " - ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeKind {
    Lecture,
    Session,
}

impl BadgeKind {
    fn label(self) -> &'static str {
        match self {
            Self::Lecture => "LECTURE",
            Self::Session => "SESIÓN",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LectureBadge {
    pub number: u32,
    pub kind: BadgeKind,
}

impl LectureBadge {
    /// `LECTURE 5` / `SESIÓN 5`.
    pub fn label(&self) -> String {
        format!("{} {}", self.kind.label(), self.number)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedTitle {
    pub lecture: Option<LectureBadge>,
    pub lines: Vec<String>,
}

pub fn parse_title(title: &str) -> ParsedTitle {
    parse_title_with_budget(title, MAX_CHARS_PER_LINE)
}

pub fn parse_title_with_budget(title: &str, max_chars: usize) -> ParsedTitle {
    let (lecture, rest) = extract_lecture_prefix(title);
    // A bare "Lecture 5" keeps its text as the title instead of a badge.
    if lecture.is_some() && rest.trim().is_empty() {
        return ParsedTitle {
            lecture: None,
            lines: wrap_title(title, max_chars),
        };
    }
    ParsedTitle {
        lecture,
        lines: wrap_title(rest, max_chars),
    }
}

/// Splits a leading `Lecture N` / `Sesión N` (and any separator after it)
/// off the title. Returns the badge and the remaining text.
pub fn extract_lecture_prefix(title: &str) -> (Option<LectureBadge>, &str) {
    static PREFIX_RE: OnceLock<Regex> = OnceLock::new();
    let re = PREFIX_RE.get_or_init(|| {
        Regex::new(r"(?i)^\s*(lecture|sesi[oó]n)\s+(\d+)\s*(?:[-–—:|]\s*)?")
            .expect("lecture prefix regex should compile")
    });

    let Some(capture) = re.captures(title) else {
        return (None, title);
    };
    let (Some(whole), Some(keyword), Some(digits)) =
        (capture.get(0), capture.get(1), capture.get(2))
    else {
        return (None, title);
    };
    let Ok(number) = digits.as_str().parse::<u32>() else {
        return (None, title);
    };
    let kind = if keyword.as_str().to_lowercase().starts_with("lecture") {
        BadgeKind::Lecture
    } else {
        BadgeKind::Session
    };

    (Some(LectureBadge { number, kind }), &title[whole.end()..])
}

/// Wraps each ` - ` separated segment on its own, then keeps the first
/// [`MAX_TITLE_LINES`] lines.
pub fn wrap_title(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = text
        .split(SUBTITLE_SEPARATOR)
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .flat_map(|segment| wrap_words(segment, max_chars))
        .collect::<Vec<_>>();
    lines.truncate(MAX_TITLE_LINES);
    lines
}

/// Greedy word wrap without a line cap.
pub fn wrap_words(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if current.is_empty() {
            current.push_str(word);
            current_len = word_len;
        } else if current_len + 1 + word_len > max_chars {
            lines.push(mem::take(&mut current));
            current.push_str(word);
            current_len = word_len;
        } else {
            current.push(' ');
            current.push_str(word);
            current_len += 1 + word_len;
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
