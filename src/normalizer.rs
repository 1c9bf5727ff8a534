//! Turns the raw selector fragments recorded by plugin registrations into
//! completion-ready class names.

use indexmap::IndexSet;
use regex::Regex;
use std::sync::OnceLock;

/// At-rule blocks that plugins register alongside their utilities
fn at_rule() -> &'static Regex {
    static AT_RULE: OnceLock<Regex> = OnceLock::new();
    AT_RULE.get_or_init(|| Regex::new(r"@(media|font-face|keyframes|supports)").expect("at-rule pattern"))
}

/// Separators between compound selectors
fn selector_separator() -> &'static Regex {
    static SEPARATOR: OnceLock<Regex> = OnceLock::new();
    SEPARATOR.get_or_init(|| Regex::new(r",| \.|\.").expect("selector separator pattern"))
}

/// Normalize raw class fragments.
///
/// Compound selectors are split into individual class names, arbitrary-value
/// brackets, variant suffixes and stray combinator artifacts are cut off, and
/// duplicates are dropped keeping the first occurrence.
pub fn normalize_classes<I, S>(fragments: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut classes: IndexSet<String> = IndexSet::new();

    for fragment in fragments {
        let fragment = fragment.as_ref();

        if is_at_rule(fragment) {
            continue;
        }

        for candidate in split_selectors(fragment) {
            if let Some(class) = clean_candidate(candidate) {
                if !classes.contains(class) {
                    classes.insert(class.to_string());
                }
            }
        }
    }

    classes.into_iter().collect()
}

fn is_at_rule(fragment: &str) -> bool {
    at_rule().is_match(fragment)
}

/// Split on every separator, dropping empty pieces
fn split_selectors(fragment: &str) -> impl Iterator<Item = &str> {
    selector_separator()
        .split(fragment)
        .filter(|piece| !piece.is_empty())
}

/// Reduce one selector candidate to its static class name
fn clean_candidate(candidate: &str) -> Option<&str> {
    let mut class = candidate.trim();

    if class.starts_with('[') && class.ends_with(']') {
        return None;
    }

    if let Some(bracket) = class.find('[') {
        // the first `[` is kept only when it opens the first `-[` (an
        // arbitrary-value utility such as `w-[]`), or when it leads a
        // candidate with no `-[` at all
        let arbitrary = class.find("-[").map_or(0, |dash| dash + 1);
        if bracket != arbitrary {
            class = &class[..bracket];
        }
    }

    if let Some(colon) = class.find(':') {
        class = &class[..colon];
    }

    if let Some(space) = class.find(char::is_whitespace) {
        class = &class[..space];
    }

    let class = class.strip_suffix(')').unwrap_or(class);

    if class.is_empty() {
        None
    } else {
        Some(class)
    }
}
