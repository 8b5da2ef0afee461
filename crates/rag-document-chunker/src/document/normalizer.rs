use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

// "Introducere ........ 4"
static TOC_LEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.{4,}\s*\d+").expect("valid regex"));

/// Collapse whitespace runs and strip table-of-contents dot leaders.
pub fn normalize_text(text: &str) -> String {
    let collapsed = WHITESPACE.replace_all(text, " ");
    let collapsed = collapsed.trim();

    TOC_LEADER.replace_all(collapsed, "").trim().to_string()
}
