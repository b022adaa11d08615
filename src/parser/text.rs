use std::sync::LazyLock;

use regex::Regex;

static SYNOPSIS_HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*Synopsis[ \t]*\r?\n").unwrap());
static ORIGINAL_TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*Original Title:[^\n]*(\n|$)").unwrap());
static NEWLINE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\r\n]+").unwrap());
static PART_OF_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*Part of .*$").unwrap());

/// Clean the raw text of a film's details block into a one-paragraph synopsis.
///
/// The substitutions run in a fixed order: the "Original Title" and
/// "Part of" patterns rely on line structure that only exists before
/// newlines are collapsed, and on the heading already being gone.
pub fn clean_synopsis(raw: &str) -> String {
    let text = raw.replace('\u{a0}', " ");
    let text = SYNOPSIS_HEADING_RE.replace(&text, "");
    let text = ORIGINAL_TITLE_RE.replace_all(&text, "");
    let text = NEWLINE_RE.replace_all(&text, "");
    let text = PART_OF_RE.replace(&text, "");
    text.trim().to_string()
}

/// First whitespace-separated token after `prefix`, if `item` starts with it.
pub fn value_after<'a>(item: &'a str, prefix: &str) -> Option<&'a str> {
    item.trim().strip_prefix(prefix)?.split_whitespace().next()
}

#[cfg(test)]
mod tests {
    use super::*;

    const RAW: &str = "Synopsis\nOriginal Title: Foo\nBar baz.\u{a0}Qux\n\nPart of Strand X";

    #[test]
    fn synopsis_cleanup() {
        assert_eq!(clean_synopsis(RAW), "Bar baz. Qux");
    }

    #[test]
    fn synopsis_cleanup_is_idempotent() {
        let once = clean_synopsis(RAW);
        assert_eq!(clean_synopsis(&once), once);
    }

    #[test]
    fn synopsis_without_markers_is_untouched() {
        assert_eq!(
            clean_synopsis("A quiet drama about two friends."),
            "A quiet drama about two friends."
        );
    }

    #[test]
    fn synopsis_heading_only_stripped_at_start() {
        let cleaned = clean_synopsis("Synopsis\nThe Synopsis of a life.");
        assert_eq!(cleaned, "The Synopsis of a life.");
    }

    #[test]
    fn synopsis_with_html_indentation() {
        let raw = "\n    Synopsis\n    Original Title: Jeon Saeng\n    Two childhood friends reunite.\n    Part of Love Stories\n  ";
        assert_eq!(clean_synopsis(raw), "Two childhood friends reunite.");
    }

    #[test]
    fn value_after_prefix() {
        assert_eq!(value_after("Run time: 106 mins", "Run time: "), Some("106"));
        assert_eq!(value_after("  Release year: 2023 ", "Release year: "), Some("2023"));
        assert_eq!(value_after("Country: France", "Run time: "), None);
        assert_eq!(value_after("Run time: ", "Run time: "), None);
    }
}
