//! Page format profiling.
//!
//! Samples a bounded prefix of the document's text and counts hits per date
//! grammar to estimate the dominant incoming format. Statistics only: the
//! profile feeds logging and diagnostics, never the conversion itself.

use serde::Serialize;

use crate::detect::{DateGrammar, grammar_table};
use crate::scan::Tree;

/// How much document text (in bytes, rounded to a char boundary) the
/// profiler inspects.
pub const SAMPLE_BUDGET: usize = 4096;

/// Write-once summary of the formats seen in one sampling pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageFormatProfile {
    pub dominant: DateGrammar,
    pub observations: usize,
}

/// Estimate the dominant date grammar in the document.
///
/// Returns `None` when the sample contains no date-shaped text at all.
/// Ties break toward the higher-priority grammar, matching detection order.
pub fn profile(tree: &Tree) -> Option<PageFormatProfile> {
    let text = tree.document_text();
    let sample = sample_prefix(&text, SAMPLE_BUDGET);

    let mut dominant: Option<(DateGrammar, usize)> = None;
    let mut total = 0usize;
    for descriptor in grammar_table() {
        let count = descriptor.regex().find_iter(sample).count();
        total += count;
        if count > 0 && dominant.is_none_or(|(_, best)| count > best) {
            dominant = Some((descriptor.grammar, count));
        }
    }

    let (grammar, _) = dominant?;
    let result = PageFormatProfile {
        dominant: grammar,
        observations: total,
    };
    log::info!(
        "dominant date format: {} ({} observation(s) in sample)",
        grammar.label(),
        total
    );
    Some(result)
}

fn sample_prefix(text: &str, budget: usize) -> &str {
    if text.len() <= budget {
        return text;
    }
    let mut end = budget;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
