//! Date format detection.
//!
//! Classifies date-shaped substrings against the ordered grammar table,
//! extracts validated fields, and resolves the slash/dash day-vs-month
//! ambiguity. The detector never converts anything itself; it hands a
//! [`DateMatch`] to the rewriter.

pub mod grammar;
pub mod months;

use std::ops::Range;

use regex::Captures;

use crate::calendar::{GregorianDate, TimeOfDay};
pub use grammar::{DateGrammar, FieldLayout, GrammarDescriptor, grammar_table};

/// How many characters around a candidate span count as its "immediate
/// vicinity" when checking for an adjacent 4-digit year.
const YEAR_VICINITY: usize = 6;

/// The result of matching one date grammar against a substring.
#[derive(Debug, Clone, PartialEq)]
pub struct DateMatch {
    pub grammar: DateGrammar,
    pub date: GregorianDate,
    /// The literal separator that appeared in the source.
    pub separator: char,
    /// Byte range of the matched span within the searched text.
    pub range: Range<usize>,
    /// The matched span verbatim.
    pub raw: String,
}

/// Find the highest-priority grammar matching anywhere in `text`.
///
/// Grammars are tried in the fixed table order; the first structural match
/// wins. A span that matches a grammar's shape but carries implausible
/// fields yields `None` — the caller leaves the text unchanged.
///
/// `assumed_year` fills in the year for textual dates that do not carry one
/// (the same-year approximation; no "last year" inference is attempted).
pub fn detect(text: &str, assumed_year: i32) -> Option<DateMatch> {
    for descriptor in grammar_table() {
        if let Some(caps) = descriptor.regex().captures(text) {
            return from_captures(descriptor, &caps, text, assumed_year);
        }
    }
    None
}

/// Build a [`DateMatch`] from a grammar's captures, applying the
/// disambiguation and vicinity rules. Shared with the scanner, which runs
/// its own per-grammar search-and-replace loop.
pub(crate) fn from_captures(
    descriptor: &GrammarDescriptor,
    caps: &Captures<'_>,
    full_text: &str,
    assumed_year: i32,
) -> Option<DateMatch> {
    let whole = caps.get(0)?;
    let raw = whole.as_str();
    let mut grammar = descriptor.grammar;

    let (year, month, day, separator) = match descriptor.layout {
        FieldLayout::YearMonthDay => {
            let year = int_group(caps, 1)?;
            let separator = char_group(caps, 2)?;
            (year, group(caps, 3)?, group(caps, 4)?, separator)
        }
        FieldLayout::MonthDayYear => {
            let first = group(caps, 1)?;
            let separator = char_group(caps, 2)?;
            let second = group(caps, 3)?;
            let year = int_group(caps, 4)?;
            // A leading field of 13..=31 cannot be a month: treat the span
            // as day-first instead of rejecting it outright.
            let (month, day) = if descriptor.needs_disambiguation && (13..=31).contains(&first) {
                if !descriptor.has_time {
                    grammar = DateGrammar::DayFirstSlash;
                }
                (second, first)
            } else {
                (first, second)
            };
            (year, month, day, separator)
        }
        FieldLayout::DayMonthYear => {
            let day = group(caps, 1)?;
            let month = group(caps, 2)?;
            (int_group(caps, 3)?, month, day, '.')
        }
        FieldLayout::NameDayYear => {
            let month = months::month_number(caps.get(1)?.as_str())?;
            let day = group(caps, 2)?;
            (int_group(caps, 3)?, month, day, '/')
        }
        FieldLayout::NameDay => {
            if year_in_vicinity(full_text, whole.range()) {
                return None;
            }
            let month = months::month_number(caps.get(1)?.as_str())?;
            (assumed_year, month, group(caps, 2)?, '/')
        }
        FieldLayout::DayName => {
            if year_in_vicinity(full_text, whole.range()) {
                return None;
            }
            let day = group(caps, 1)?;
            let month = months::month_number(caps.get(2)?.as_str())?;
            (assumed_year, month, day, '/')
        }
    };

    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        log::warn!("rejecting date-shaped span with implausible fields: {raw:?}");
        return None;
    }

    let time = if descriptor.has_time {
        let hour = group(caps, 5)?;
        let minute = group(caps, 6)?;
        let second = caps.get(7).and_then(|m| m.as_str().parse::<u32>().ok());
        if hour > 23 || minute > 59 || second.is_some_and(|s| s > 59) {
            log::warn!("rejecting date span with implausible time suffix: {raw:?}");
            return None;
        }
        Some(TimeOfDay {
            hour,
            minute,
            second,
        })
    } else {
        None
    };

    let date = GregorianDate {
        year,
        month,
        day,
        time,
    };
    Some(DateMatch {
        grammar,
        date,
        separator,
        range: whole.range(),
        raw: raw.to_string(),
    })
}

/// True when a 4-digit number sits right next to the span; the no-year
/// textual grammars must not fire there (a higher-priority grammar owns
/// that text, or the span is a fragment of something larger).
fn year_in_vicinity(text: &str, span: Range<usize>) -> bool {
    let after_end = ceil_boundary(text, (span.end + YEAR_VICINITY).min(text.len()));
    let after = &text[span.end..after_end];
    let mut after_digits = 0usize;
    for c in after.chars() {
        if c.is_ascii_digit() {
            after_digits += 1;
        } else if after_digits > 0 {
            break;
        } else if !c.is_whitespace() && c != ',' {
            break;
        }
    }

    let before_start = floor_boundary(text, span.start.saturating_sub(YEAR_VICINITY));
    let before = &text[before_start..span.start];
    let mut before_digits = 0usize;
    for c in before.chars().rev() {
        if c.is_ascii_digit() {
            before_digits += 1;
        } else if before_digits > 0 {
            break;
        } else if !c.is_whitespace() && c != ',' {
            break;
        }
    }

    after_digits >= 4 || before_digits >= 4
}

fn floor_boundary(text: &str, mut index: usize) -> usize {
    while index > 0 && !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

fn ceil_boundary(text: &str, mut index: usize) -> usize {
    while index < text.len() && !text.is_char_boundary(index) {
        index += 1;
    }
    index
}

fn group(caps: &Captures<'_>, index: usize) -> Option<u32> {
    caps.get(index)?.as_str().parse().ok()
}

fn int_group(caps: &Captures<'_>, index: usize) -> Option<i32> {
    caps.get(index)?.as_str().parse().ok()
}

fn char_group(caps: &Captures<'_>, index: usize) -> Option<char> {
    caps.get(index)?.as_str().chars().next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    const YEAR: i32 = 2024;

    fn detect_str(text: &str) -> Option<DateMatch> {
        detect(text, YEAR)
    }

    #[rstest]
    #[case("2024-12-31", DateGrammar::YearFirst, 2024, 12, 31, '-')]
    #[case("2024/12/31", DateGrammar::YearFirst, 2024, 12, 31, '/')]
    #[case("12/31/2024", DateGrammar::MonthFirst, 2024, 12, 31, '/')]
    #[case("12-31-2024", DateGrammar::MonthFirst, 2024, 12, 31, '-')]
    #[case("31.12.2024", DateGrammar::DayFirstDot, 2024, 12, 31, '.')]
    fn classifies_numeric_grammars(
        #[case] text: &str,
        #[case] grammar: DateGrammar,
        #[case] year: i32,
        #[case] month: u32,
        #[case] day: u32,
        #[case] separator: char,
    ) {
        let m = detect_str(text).unwrap();
        assert_eq!(m.grammar, grammar);
        assert_eq!((m.date.year, m.date.month, m.date.day), (year, month, day));
        assert_eq!(m.separator, separator);
        assert_eq!(m.raw, text);
    }

    #[test]
    fn first_field_above_twelve_reclassifies_as_day_first() {
        // 13 cannot be a month, so the span is re-read day-first.
        let m = detect_str("13/05/2024").unwrap();
        assert_eq!(m.grammar, DateGrammar::DayFirstSlash);
        assert_eq!((m.date.month, m.date.day), (5, 13));
    }

    #[test]
    fn second_field_above_twelve_reads_as_the_day() {
        let m = detect_str("05/13/2024").unwrap();
        assert_eq!(m.grammar, DateGrammar::MonthFirst);
        assert_eq!((m.date.month, m.date.day), (5, 13));
    }

    #[test]
    fn both_fields_plausible_defaults_to_month_first() {
        let m = detect_str("05/06/2024").unwrap();
        assert_eq!((m.date.month, m.date.day), (5, 6));
    }

    #[test]
    fn time_suffix_is_captured_not_truncated() {
        let m = detect_str("2024-12-31 14:30:45").unwrap();
        assert_eq!(m.grammar, DateGrammar::YearFirstWithTime);
        let time = m.date.time.unwrap();
        assert_eq!((time.hour, time.minute, time.second), (14, 30, Some(45)));
        assert_eq!(m.raw, "2024-12-31 14:30:45");
    }

    #[test]
    fn time_without_seconds_keeps_second_field_empty() {
        let m = detect_str("12/31/2024 09:05").unwrap();
        assert_eq!(m.grammar, DateGrammar::MonthFirstWithTime);
        let time = m.date.time.unwrap();
        assert_eq!((time.hour, time.minute, time.second), (9, 5, None));
    }

    #[test]
    fn implausible_time_rejects_whole_span() {
        assert_eq!(detect_str("2024-12-31 25:70"), None);
    }

    #[rstest]
    #[case("March 5, 2024", 2024, 3, 5)]
    #[case("march 5 2024", 2024, 3, 5)]
    #[case("Jan 1, 2000", 2000, 1, 1)]
    #[case("October 3rd, 1999", 1999, 10, 3)]
    fn textual_dates_with_year(
        #[case] text: &str,
        #[case] year: i32,
        #[case] month: u32,
        #[case] day: u32,
    ) {
        let m = detect_str(text).unwrap();
        assert_eq!(m.grammar, DateGrammar::MonthNameDayYear);
        assert_eq!((m.date.year, m.date.month, m.date.day), (year, month, day));
    }

    #[test]
    fn textual_date_without_year_assumes_anchor_year() {
        let m = detect_str("March 5").unwrap();
        assert_eq!(m.grammar, DateGrammar::MonthNameDay);
        assert_eq!((m.date.year, m.date.month, m.date.day), (YEAR, 3, 5));

        let m = detect_str("5 March").unwrap();
        assert_eq!(m.grammar, DateGrammar::DayMonthName);
        assert_eq!((m.date.year, m.date.month, m.date.day), (YEAR, 3, 5));
    }

    #[test]
    fn day_month_with_trailing_year_is_left_alone() {
        // "5 March 2020" must not become a DayMonthName match for "5 March"
        // with the 2020 silently dropped.
        assert_eq!(detect_str("5 March 2020"), None);
    }

    #[test]
    fn numeric_grammars_win_over_textual_ones() {
        let m = detect_str("meeting March 5 at 2024-01-02").unwrap();
        assert_eq!(m.grammar, DateGrammar::YearFirst);
        assert_eq!(m.raw, "2024-01-02");
    }

    #[test]
    fn out_of_range_year_still_detects() {
        // Range validation is the converter's job; the detector only checks
        // field plausibility, so the rewrite boundary can log the warning.
        let m = detect_str("1850-05-06").unwrap();
        assert_eq!(m.date.year, 1850);
    }

    #[rstest]
    #[case("no dates here")]
    #[case("version 1.2.3")]
    #[case("45/60/2024")]
    #[case("")]
    fn non_dates_do_not_match(#[case] text: &str) {
        assert_eq!(detect_str(text), None);
    }
}
