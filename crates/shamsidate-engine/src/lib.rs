//! Core engine for in-place Gregorian→Jalali date rewriting.
//!
//! The host hands over a tree of text-bearing nodes and a channel of change
//! events; the engine finds date expressions under several ambiguous
//! grammars, converts them through a pure day-count calendar conversion,
//! and rewrites them to one canonical shape — idempotently, as the
//! document keeps mutating.

pub mod calendar;
pub mod detect;
pub mod monitor;
pub mod profile;
pub mod rewrite;
pub mod scan;

// Re-export key types for easier usage
pub use calendar::{ConversionError, GregorianDate, JalaliDate, TimeOfDay, gregorian_to_jalali};
pub use detect::{DateGrammar, DateMatch, detect};
pub use monitor::{ChangeMonitor, Engine, MonitorOptions, TreeEvent};
pub use profile::PageFormatProfile;
pub use scan::{ContentScanner, Node, NodeId, NodeKind, ScanOptions, ScanStats, Tree};
