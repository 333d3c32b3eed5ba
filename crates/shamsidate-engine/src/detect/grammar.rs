//! The ordered table of recognized date grammars.
//!
//! Grammar precedence is an explicit data structure: [`grammar_table`]
//! returns descriptors sorted by priority, and every consumer iterates that
//! table rather than hard-coding pattern order. Grammars that anchor on a
//! time-of-day or a 4-digit year come first so a `2024-12-31 14:30` span is
//! never mis-captured as a bare `2024-12-31` with trailing garbage.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use super::months::MONTH_NAME_PATTERN;

/// One recognized textual layout for expressing a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DateGrammar {
    /// `YYYY-MM-DD HH:MM[:SS]`, slash or dash separated.
    YearFirstWithTime,
    /// `MM-DD-YYYY HH:MM[:SS]`, slash or dash separated.
    MonthFirstWithTime,
    /// `YYYY-MM-DD`, slash or dash separated.
    YearFirst,
    /// `MM-DD-YYYY`, slash or dash separated; swaps to day-first when the
    /// leading field cannot be a month.
    MonthFirst,
    /// `DD-MM-YYYY`, slash or dash separated. Never matched directly:
    /// reported when the swap rule reclassifies a [`MonthFirst`] span.
    ///
    /// [`MonthFirst`]: DateGrammar::MonthFirst
    DayFirstSlash,
    /// `DD.MM.YYYY`, the dot-separated European layout.
    DayFirstDot,
    /// `March 5, 2024` (also without the comma).
    MonthNameDayYear,
    /// `March 5` with no year in the vicinity.
    MonthNameDay,
    /// `5 March` with no year in the vicinity.
    DayMonthName,
}

impl DateGrammar {
    /// Tie-break priority; lower wins.
    pub fn priority(self) -> u8 {
        match self {
            Self::YearFirstWithTime => 0,
            Self::MonthFirstWithTime => 1,
            Self::YearFirst => 2,
            Self::MonthFirst => 3,
            Self::DayFirstSlash => 4,
            Self::DayFirstDot => 5,
            Self::MonthNameDayYear => 6,
            Self::MonthNameDay => 7,
            Self::DayMonthName => 8,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::YearFirstWithTime => "YYYY-MM-DD HH:mm",
            Self::MonthFirstWithTime => "MM-DD-YYYY HH:mm",
            Self::YearFirst => "YYYY-MM-DD",
            Self::MonthFirst => "MM-DD-YYYY",
            Self::DayFirstSlash => "DD-MM-YYYY",
            Self::DayFirstDot => "DD.MM.YYYY",
            Self::MonthNameDayYear => "Month D, YYYY",
            Self::MonthNameDay => "Month D",
            Self::DayMonthName => "D Month",
        }
    }
}

/// How the capture groups of a grammar's pattern map onto date fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldLayout {
    /// Groups: year, separator, month, day, then optional time groups.
    YearMonthDay,
    /// Groups: month, separator, day, year, then optional time groups.
    MonthDayYear,
    /// Groups: day, month, year (dot separated, no time suffix).
    DayMonthYear,
    /// Groups: month name, day, year.
    NameDayYear,
    /// Groups: month name, day. Year assumed.
    NameDay,
    /// Groups: day, month name. Year assumed.
    DayName,
}

/// A single entry in the grammar precedence table.
#[derive(Debug)]
pub struct GrammarDescriptor {
    pub grammar: DateGrammar,
    pub layout: FieldLayout,
    /// Whether the slash/dash day-vs-month swap rule applies.
    pub needs_disambiguation: bool,
    /// Whether the pattern carries `HH:MM[:SS]` capture groups.
    pub has_time: bool,
    regex: Regex,
}

impl GrammarDescriptor {
    fn new(
        grammar: DateGrammar,
        layout: FieldLayout,
        needs_disambiguation: bool,
        has_time: bool,
        pattern: &str,
    ) -> Self {
        Self {
            grammar,
            layout,
            needs_disambiguation,
            has_time,
            regex: Regex::new(pattern).expect("invalid date grammar pattern"),
        }
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }
}

const TIME_SUFFIX: &str = r"\s+(\d{1,2}):(\d{2})(?::(\d{2}))?";

/// The grammar table in priority order.
pub fn grammar_table() -> &'static [GrammarDescriptor] {
    static TABLE: OnceLock<Vec<GrammarDescriptor>> = OnceLock::new();
    TABLE.get_or_init(|| {
        let months = MONTH_NAME_PATTERN;
        vec![
            GrammarDescriptor::new(
                DateGrammar::YearFirstWithTime,
                FieldLayout::YearMonthDay,
                false,
                true,
                &format!(r"\b(\d{{4}})([-/])(\d{{1,2}})[-/](\d{{1,2}}){TIME_SUFFIX}\b"),
            ),
            GrammarDescriptor::new(
                DateGrammar::MonthFirstWithTime,
                FieldLayout::MonthDayYear,
                true,
                true,
                &format!(r"\b(\d{{1,2}})([-/])(\d{{1,2}})[-/](\d{{4}}){TIME_SUFFIX}\b"),
            ),
            GrammarDescriptor::new(
                DateGrammar::YearFirst,
                FieldLayout::YearMonthDay,
                false,
                false,
                r"\b(\d{4})([-/])(\d{1,2})[-/](\d{1,2})\b",
            ),
            GrammarDescriptor::new(
                DateGrammar::MonthFirst,
                FieldLayout::MonthDayYear,
                true,
                false,
                r"\b(\d{1,2})([-/])(\d{1,2})[-/](\d{4})\b",
            ),
            GrammarDescriptor::new(
                DateGrammar::DayFirstDot,
                FieldLayout::DayMonthYear,
                false,
                false,
                r"\b(\d{1,2})\.(\d{1,2})\.(\d{4})\b",
            ),
            GrammarDescriptor::new(
                DateGrammar::MonthNameDayYear,
                FieldLayout::NameDayYear,
                false,
                false,
                &format!(r"\b(?i)({months})\.?\s+(\d{{1,2}})(?:st|nd|rd|th)?,?\s+(\d{{4}})\b"),
            ),
            GrammarDescriptor::new(
                DateGrammar::MonthNameDay,
                FieldLayout::NameDay,
                false,
                false,
                &format!(r"\b(?i)({months})\.?\s+(\d{{1,2}})(?:st|nd|rd|th)?\b"),
            ),
            GrammarDescriptor::new(
                DateGrammar::DayMonthName,
                FieldLayout::DayName,
                false,
                false,
                &format!(r"\b(\d{{1,2}})(?:st|nd|rd|th)?\s+(?i)({months})\b"),
            ),
        ]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_sorted_by_priority() {
        let table = grammar_table();
        for pair in table.windows(2) {
            assert!(
                pair[0].grammar.priority() < pair[1].grammar.priority(),
                "{:?} must come before {:?}",
                pair[0].grammar,
                pair[1].grammar
            );
        }
    }

    #[test]
    fn time_anchored_grammars_come_before_their_date_only_twins() {
        let table = grammar_table();
        let position = |g: DateGrammar| table.iter().position(|d| d.grammar == g).unwrap();
        assert!(position(DateGrammar::YearFirstWithTime) < position(DateGrammar::YearFirst));
        assert!(position(DateGrammar::MonthFirstWithTime) < position(DateGrammar::MonthFirst));
    }

    #[test]
    fn numeric_grammars_outrank_textual_grammars() {
        let table = grammar_table();
        let first_textual = table
            .iter()
            .position(|d| {
                matches!(
                    d.layout,
                    FieldLayout::NameDayYear | FieldLayout::NameDay | FieldLayout::DayName
                )
            })
            .unwrap();
        for descriptor in &table[..first_textual] {
            assert!(!matches!(descriptor.layout, FieldLayout::NameDayYear));
        }
    }
}
