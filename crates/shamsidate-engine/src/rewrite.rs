//! Producing replacement text for a detected date.
//!
//! Every grammar converges on the single canonical shape
//! `YYYY/MM/DD[ HH:MM[:SS]]` — the input's field order and separator are
//! deliberately discarded (conversion is lossy and normalizing). A captured
//! time suffix is re-attached verbatim in precision: seconds appear only if
//! the source had them.

use crate::calendar::{ConversionError, gregorian_to_jalali};
use crate::detect::DateMatch;

/// Render the canonical replacement for a matched date.
///
/// # Errors
///
/// Propagates [`ConversionError`] for dates outside the converter's domain;
/// the caller leaves the original span unchanged.
pub fn rewrite(matched: &DateMatch) -> Result<String, ConversionError> {
    let jalali = gregorian_to_jalali(&matched.date)?;
    let mut out = jalali.to_string();
    if let Some(time) = matched.date.time {
        out.push(' ');
        out.push_str(&format!("{:02}:{:02}", time.hour, time.minute));
        if let Some(second) = time.second {
            out.push_str(&format!(":{second:02}"));
        }
    }
    Ok(out)
}
