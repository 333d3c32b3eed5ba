//! Guards that veto conversion before any grammar is tried.
//!
//! Everything here errs on the side of leaving text alone: a false negative
//! costs one unconverted date, a false positive corrupts user-visible text.

use std::sync::OnceLock;

use regex::Regex;

fn relative_phrase_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)^\s*(\d+\s+(seconds?|minutes?|hours?|days?|weeks?|months?|years?)\s+(ago|from\s+now)|yesterday|today|tomorrow|just\s+now|last\s+(week|month|year)|next\s+(week|month|year))\s*$",
        )
        .expect("invalid relative phrase pattern")
    })
}

fn relative_suffix_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)^\s*((seconds?|minutes?|hours?|days?|weeks?|months?|years?)\s+)?(ago|from\s+now)\b",
        )
        .expect("invalid relative suffix pattern")
    })
}

fn jalali_canonical_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // 1278 is the converter's output floor (Gregorian 1900).
        Regex::new(r"\b(?:12[78]\d|1[34]\d{2})/\d{2}/\d{2}\b")
            .expect("invalid canonical shape pattern")
    })
}

fn gregorian_shape_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b(19|20)\d{2}[-/]\d{1,2}[-/]\d{1,2}\b|\b\d{1,2}[-/.]\d{1,2}[-/.](19|20)\d{2}\b")
            .expect("invalid gregorian shape pattern")
    })
}

fn date_shape_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(
            r"\d{{1,4}}[-/.]\d{{1,2}}[-/.]\d{{2,4}}|(?i)\b({})\b",
            crate::detect::months::MONTH_NAME_PATTERN
        ))
        .expect("invalid date shape pattern")
    })
}

/// A text unit that is nothing but a relative-time phrase ("3 hours ago",
/// "yesterday", "just now") is never a date to convert.
pub fn is_relative_time_phrase(text: &str) -> bool {
    relative_phrase_regex().is_match(text)
}

/// Idempotence guard: the unit already holds canonical Jalali output
/// (`YYYY/MM/DD` with a year in 1278..=1499) and no Gregorian-shaped date
/// sits next to it, so a second pass has nothing to do.
pub fn is_already_converted(text: &str) -> bool {
    jalali_canonical_regex().is_match(text) && !gregorian_shape_regex().is_match(text)
}

/// Per-match veto: the trailing context shows the span is a fragment of a
/// relative-time phrase ("Jan 5" followed by "hours ago") rather than a
/// date of its own.
pub fn is_relative_time_fragment(after: &str) -> bool {
    relative_suffix_regex().is_match(after)
}

/// Cheap pre-check used by the change monitor: does this text contain
/// anything date-shaped at all?
pub fn has_date_shaped_content(text: &str) -> bool {
    date_shape_regex().is_match(text)
}
