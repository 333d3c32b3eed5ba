//! In-place document scanning.
//!
//! [`ContentScanner`] walks a [`Tree`] with an explicit work stack, applies
//! every grammar in the precedence table to each text unit and to a bounded
//! whitelist of attributes, and rewrites matched spans to the canonical
//! Jalali shape. A guard sequence runs before any grammar is tried so that
//! relative-time phrases and already-converted output are never touched,
//! which is what makes a second pass over an unchanged tree a no-op.

pub mod guards;
pub mod tree;

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::detect::{self, grammar_table, months, GrammarDescriptor};
use crate::rewrite;
pub use tree::{Node, NodeId, NodeKind, Tree};

/// Tags whose subtrees are never scanned: non-text-bearing controls,
/// user-editable form state, and elements that render time themselves.
const SKIPPED_TAGS: [&str; 6] = ["script", "style", "input", "textarea", "select", "time"];

/// The only attributes rewritten. Free-form `value`/`placeholder` stay
/// untouched so live form state is never corrupted.
const SCANNED_ATTRIBUTES: [&str; 3] = ["title", "data-date", "datetime"];

fn bare_month_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(r"\b(?i)({})\b", months::MONTH_NAME_PATTERN))
            .expect("invalid month name pattern")
    })
}

/// Knobs for one scanner instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOptions {
    /// Year assumed for textual dates that carry none.
    pub assumed_year: i32,
    /// Annotate bare month names with their approximate Persian name.
    pub annotate_bare_months: bool,
    /// Characters of trailing context inspected after a match when
    /// checking for relative-time fragments.
    pub context_window: usize,
}

impl ScanOptions {
    pub fn new(assumed_year: i32) -> Self {
        Self {
            assumed_year,
            annotate_bare_months: true,
            context_window: 20,
        }
    }
}

/// Counters reported by one scan pass. Diagnostic only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub nodes_visited: usize,
    pub text_units_scanned: usize,
    pub conversions: usize,
    pub attribute_conversions: usize,
    pub annotations: usize,
    pub units_guarded: usize,
    pub warnings: usize,
}

impl ScanStats {
    pub fn merge(&mut self, other: ScanStats) {
        self.nodes_visited += other.nodes_visited;
        self.text_units_scanned += other.text_units_scanned;
        self.conversions += other.conversions;
        self.attribute_conversions += other.attribute_conversions;
        self.annotations += other.annotations;
        self.units_guarded += other.units_guarded;
        self.warnings += other.warnings;
    }

    pub fn changed_anything(&self) -> bool {
        self.conversions + self.attribute_conversions + self.annotations > 0
    }
}

/// Outcome of rewriting one string.
#[derive(Debug, Default)]
struct UnitOutcome {
    conversions: usize,
    annotations: usize,
    warnings: usize,
}

/// Walks the tree and rewrites dates in place.
pub struct ContentScanner {
    options: ScanOptions,
    /// Nodes already rewritten this engine lifetime. Ids are plain indices,
    /// so this side-table never keeps nodes alive.
    processed: HashSet<NodeId>,
}

impl ContentScanner {
    pub fn new(options: ScanOptions) -> Self {
        Self {
            options,
            processed: HashSet::new(),
        }
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Scan the whole document.
    pub fn scan(&mut self, tree: &mut Tree) -> ScanStats {
        self.scan_subtree(tree, tree.root())
    }

    /// Scan one subtree, pre-order, with an explicit work stack.
    ///
    /// A fault on an individual node is contained to that node: it is
    /// logged and the walk continues with its siblings.
    pub fn scan_subtree(&mut self, tree: &mut Tree, root: NodeId) -> ScanStats {
        let mut stats = ScanStats::default();
        if !tree.contains(root) {
            log::error!("scan requested for detached node {}", root.index());
            stats.warnings += 1;
            return stats;
        }

        enum Step {
            Element(Vec<NodeId>),
            Text,
            Skip,
        }

        let mut work = vec![root];
        while let Some(id) = work.pop() {
            stats.nodes_visited += 1;
            let step = match tree.node(id) {
                Some(node) => match &node.kind {
                    NodeKind::Element { tag, attrs } => {
                        if self.should_skip_element(tag, attrs.contains_key("data-relative")) {
                            Step::Skip
                        } else {
                            Step::Element(node.children.clone())
                        }
                    }
                    NodeKind::Text { .. } => Step::Text,
                },
                None => {
                    log::error!("node {} vanished during scan", id.index());
                    stats.warnings += 1;
                    continue;
                }
            };

            match step {
                Step::Element(children) => {
                    for &child in children.iter().rev() {
                        work.push(child);
                    }
                    self.process_attributes(tree, id, &mut stats);
                }
                Step::Text => self.process_text_node(tree, id, &mut stats),
                Step::Skip => {}
            }
        }
        stats
    }

    /// Forget processing marks, e.g. when the host replaces the tree.
    pub fn reset_marks(&mut self) {
        self.processed.clear();
    }

    fn should_skip_element(&self, tag: &str, marked_relative: bool) -> bool {
        marked_relative || SKIPPED_TAGS.iter().any(|s| tag.eq_ignore_ascii_case(s))
    }

    fn process_text_node(&mut self, tree: &mut Tree, id: NodeId, stats: &mut ScanStats) {
        if self.processed.contains(&id) {
            return;
        }
        let Some(text) = tree.text(id) else {
            return;
        };
        if text.trim().is_empty() {
            return;
        }
        stats.text_units_scanned += 1;

        if guards::is_relative_time_phrase(text) || guards::is_already_converted(text) {
            stats.units_guarded += 1;
            return;
        }

        let mut outcome = UnitOutcome::default();
        let rewritten = self.rewrite_unit(text, &mut outcome);
        stats.conversions += outcome.conversions;
        stats.annotations += outcome.annotations;
        stats.warnings += outcome.warnings;

        if let Some(new_text) = rewritten {
            tree.set_text(id, &new_text);
            self.processed.insert(id);
        }
    }

    fn process_attributes(&mut self, tree: &mut Tree, id: NodeId, stats: &mut ScanStats) {
        for name in SCANNED_ATTRIBUTES {
            let Some(value) = tree.attr(id, name) else {
                continue;
            };
            if guards::is_relative_time_phrase(value) || guards::is_already_converted(value) {
                continue;
            }
            let mut outcome = UnitOutcome::default();
            // Attributes get the conversion passes but never annotation;
            // a parenthetical Persian name inside `datetime` would break
            // machine consumers of that attribute.
            let rewritten = self.apply_grammar_passes(value, &mut outcome);
            stats.warnings += outcome.warnings;
            if let Some(new_value) = rewritten {
                stats.attribute_conversions += outcome.conversions;
                tree.set_attr(id, name, &new_value);
            }
        }
    }

    /// Rewrite one text unit: every grammar pass, then the optional
    /// bare-month annotation pass. Returns `None` when nothing changed.
    fn rewrite_unit(&self, text: &str, outcome: &mut UnitOutcome) -> Option<String> {
        let converted = self.apply_grammar_passes(text, outcome);
        let base = converted.as_deref().unwrap_or(text);

        let annotated = if self.options.annotate_bare_months {
            self.annotate_bare_months(base, outcome)
        } else {
            None
        };

        match (converted, annotated) {
            (_, Some(a)) => Some(a),
            (Some(c), None) => Some(c),
            (None, None) => None,
        }
    }

    fn apply_grammar_passes(&self, text: &str, outcome: &mut UnitOutcome) -> Option<String> {
        let mut current = text.to_string();
        let mut changed = false;
        for descriptor in grammar_table() {
            if let Some(next) = self.apply_grammar(descriptor, &current, outcome) {
                current = next;
                changed = true;
            }
        }
        changed.then_some(current)
    }

    /// Global search-and-replace of one grammar across a unit.
    fn apply_grammar(
        &self,
        descriptor: &GrammarDescriptor,
        text: &str,
        outcome: &mut UnitOutcome,
    ) -> Option<String> {
        let mut result = String::with_capacity(text.len());
        let mut last = 0;
        let mut changed = false;

        for caps in descriptor.regex().captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            result.push_str(&text[last..whole.start()]);
            last = whole.end();

            match self.convert_match(descriptor, &caps, text, whole.range(), outcome) {
                Some(replacement) => {
                    log::debug!("converted {:?} -> {replacement:?}", whole.as_str());
                    result.push_str(&replacement);
                    outcome.conversions += 1;
                    changed = true;
                }
                None => result.push_str(whole.as_str()),
            }
        }

        if !changed {
            return None;
        }
        result.push_str(&text[last..]);
        Some(result)
    }

    fn convert_match(
        &self,
        descriptor: &GrammarDescriptor,
        caps: &regex::Captures<'_>,
        text: &str,
        span: std::ops::Range<usize>,
        outcome: &mut UnitOutcome,
    ) -> Option<String> {
        let after = self.context_after(text, &span);
        if guards::is_relative_time_fragment(after) {
            return None;
        }

        let matched = detect::from_captures(descriptor, caps, text, self.options.assumed_year)?;

        // Output of an earlier pass over mixed content: a canonical-shaped
        // span with a Jalali-plausible year is skipped without a warning.
        // The band starts at the converter's output floor, not 1300.
        if matched.separator == '/' && (1278..=1499).contains(&matched.date.year) {
            return None;
        }

        match rewrite::rewrite(&matched) {
            Ok(replacement) => Some(replacement),
            Err(err) => {
                log::warn!("cannot convert {:?}: {err}", matched.raw);
                outcome.warnings += 1;
                None
            }
        }
    }

    fn context_after<'t>(&self, text: &'t str, span: &std::ops::Range<usize>) -> &'t str {
        let end = ceil_boundary(text, (span.end + self.options.context_window).min(text.len()));
        &text[span.end..end]
    }

    /// Annotate bare month names: `Nov` becomes `Nov (آبان)`. Names that
    /// are part of a date span, already annotated, or adjacent to digits
    /// are left alone, so the pass is idempotent.
    fn annotate_bare_months(&self, text: &str, outcome: &mut UnitOutcome) -> Option<String> {
        let mut result = String::with_capacity(text.len());
        let mut last = 0;
        let mut changed = false;

        for m in bare_month_regex().find_iter(text) {
            result.push_str(&text[last..m.start()]);
            last = m.end();
            result.push_str(m.as_str());

            // Lowercase hits are prose, not month references ("we may go",
            // "they march on"); only a capitalized name is annotated.
            if !m.as_str().starts_with(|c: char| c.is_ascii_uppercase()) {
                continue;
            }
            let after = &text[m.end()..];
            let before = &text[..m.start()];
            if Self::skip_annotation(before, after) {
                continue;
            }
            let Some(persian) = months::month_number(m.as_str())
                .and_then(months::approximate_jalali_name)
            else {
                continue;
            };
            result.push_str(" (");
            result.push_str(persian);
            result.push(')');
            outcome.annotations += 1;
            changed = true;
        }

        if !changed {
            return None;
        }
        result.push_str(&text[last..]);
        Some(result)
    }

    fn skip_annotation(before: &str, after: &str) -> bool {
        // Adjacent digits mean the name is part of a larger date expression
        // that an earlier pass either converted or deliberately left alone.
        let after_trimmed = after.trim_start();
        if after_trimmed
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_digit() || c == '(')
        {
            return true;
        }
        let before_trimmed = before.trim_end();
        before_trimmed
            .chars()
            .last()
            .is_some_and(|c| c.is_ascii_digit())
    }
}

fn ceil_boundary(text: &str, mut index: usize) -> usize {
    while index < text.len() && !text.is_char_boundary(index) {
        index += 1;
    }
    index
}
