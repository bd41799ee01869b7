//! Shared SVG building blocks: the SIMG palette, escaping, and text fitting.

pub const CANVAS_WIDTH: u32 = 1280;
pub const CANVAS_HEIGHT: u32 = 720;

pub const YELLOW: &str = "#F4C542";
pub const BLUE: &str = "#2E6DB4";
pub const GREEN: &str = "#5FA36A";
pub const PURPLE: &str = "#8E6CC8";
pub const DARK_BG: &str = "#0C1A26";
pub const DEEP_BG: &str = "#142238";
pub const PANEL_BG: &str = "#0F2233";
pub const PANEL_BORDER: &str = "#24415E";
pub const LIGHT_TEXT: &str = "#E6E9EF";
pub const MUTED_TEXT: &str = "#8FA3B8";

pub const FONT_SANS: &str = "Arial, Helvetica, sans-serif";
pub const FONT_MONO: &str = "'JetBrains Mono', 'Fira Code', Consolas, monospace";

/// Escapes text for use in element content and attribute values.
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Cuts `text` to at most `max_chars` characters, ending with `…` when cut.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_owned();
    }
    if max_chars == 0 {
        return String::new();
    }
    let mut out = text
        .chars()
        .take(max_chars - 1)
        .collect::<String>()
        .trim_end()
        .to_owned();
    out.push('…');
    out
}

/// Fixed one-decimal formatting for computed coordinates.
pub fn coord(value: f64) -> String {
    format!("{value:.1}")
}

#[cfg(test)]
mod tests {
    use super::{coord, escape_xml, truncate_chars};

    #[test]
    fn markup_characters_are_escaped() {
        assert_eq!(
            escape_xml(r#"<Q&A> "Tom's" talk"#),
            "&lt;Q&amp;A&gt; &quot;Tom&apos;s&quot; talk"
        );
        assert_eq!(escape_xml("Introducción"), "Introducción");
    }

    #[test]
    fn truncation_counts_characters() {
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("Edificio 404 Yu Takeuchi", 10), "Edificio…");
        assert_eq!(truncate_chars("ñandú ñandú", 7), "ñandú…");
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[test]
    fn coordinates_use_one_decimal() {
        assert_eq!(coord(12.0), "12.0");
        assert_eq!(coord(83.333_333), "83.3");
    }
}
