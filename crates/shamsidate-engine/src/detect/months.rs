//! English and Persian month name tables.

/// Regex alternation for English month names, longest spellings first so the
/// abbreviation never shadows the full name.
pub(crate) const MONTH_NAME_PATTERN: &str = "January|February|March|April|May|June|July|August|September|October|November|December|Jan|Feb|Mar|Apr|Jun|Jul|Aug|Sept|Sep|Oct|Nov|Dec";

/// Persian month names, Farvardin first.
pub const JALALI_MONTH_NAMES: [&str; 12] = [
    "فروردین",
    "اردیبهشت",
    "خرداد",
    "تیر",
    "مرداد",
    "شهریور",
    "مهر",
    "آبان",
    "آذر",
    "دی",
    "بهمن",
    "اسفند",
];

/// Resolve an English month name (full or three-letter, any case) to 1..=12.
pub fn month_number(name: &str) -> Option<u32> {
    let lower = name.to_ascii_lowercase();
    let prefix = lower.get(..3)?;
    let number = match prefix {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(number)
}

/// The Persian month name a Gregorian month *roughly* corresponds to.
///
/// A true correspondence depends on the day of the month (each Gregorian
/// month straddles two Jalali months); this fixed table is a display
/// approximation for annotating bare month names only.
pub fn approximate_jalali_name(gregorian_month: u32) -> Option<&'static str> {
    if !(1..=12).contains(&gregorian_month) {
        return None;
    }
    // January mostly overlaps Dey, the 10th Jalali month.
    let index = ((gregorian_month + 8) % 12) as usize;
    Some(JALALI_MONTH_NAMES[index])
}
