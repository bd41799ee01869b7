/// Fallback used when a title has no ASCII alphanumerics at all.
pub const EMPTY_SLUG: &str = "untitled-event";

/// Lower-cases `title`, collapses every run of characters outside `[a-z0-9]`
/// into a single `-`, and trims dashes from both ends.
///
/// Non-ASCII letters are separators, so `"Sesión 2"` becomes `sesi-n-2`;
/// this keeps file names identical to the ones the site already links to.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for ch in title.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch);
        } else {
            pending_dash = true;
        }
    }

    if slug.is_empty() {
        EMPTY_SLUG.to_owned()
    } else {
        slug
    }
}
