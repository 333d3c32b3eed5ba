//! Gregorian to Jalali calendar conversion.
//!
//! The conversion is a pure day-count computation: the Gregorian date is
//! turned into a count of days since the Jalali civil epoch, and that count
//! is decomposed back into a Jalali year/month/day using the 33-year and
//! 4-year leap cycles. No system clock access, no mutation of inputs —
//! callers that need a "today" anchor supply it themselves.

use thiserror::Error;

/// Earliest Gregorian year the converter accepts.
pub const MIN_YEAR: i32 = 1900;
/// Latest Gregorian year the converter accepts.
pub const MAX_YEAR: i32 = 2100;

/// Cumulative days before each Gregorian month in a non-leap year.
const DAYS_BEFORE_MONTH: [i64; 12] = [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];

/// An optional time-of-day captured alongside a date.
///
/// Seconds are `Option` so that output can preserve exactly the precision
/// the source text had.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeOfDay {
    pub hour: u32,
    pub minute: u32,
    pub second: Option<u32>,
}

/// A Gregorian calendar date, constructed only from validated text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GregorianDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub time: Option<TimeOfDay>,
}

impl GregorianDate {
    pub fn new(year: i32, month: u32, day: u32) -> Self {
        Self {
            year,
            month,
            day,
            time: None,
        }
    }

    pub fn with_time(year: i32, month: u32, day: u32, time: TimeOfDay) -> Self {
        Self {
            year,
            month,
            day,
            time: Some(time),
        }
    }
}

/// A Jalali (Persian solar) calendar date.
///
/// Only ever produced by [`gregorian_to_jalali`]; immutable once created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct JalaliDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl std::fmt::Display for JalaliDate {
    /// Formats as the canonical `YYYY/MM/DD` shape with zero-padded fields.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}/{:02}/{:02}", self.year, self.month, self.day)
    }
}

/// A date that cannot be converted. This is a validation boundary, not a
/// fatal condition: callers leave the original text unchanged and move on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConversionError {
    #[error("year {0} outside supported range {MIN_YEAR}..={MAX_YEAR}")]
    YearOutOfRange(i32),
    #[error("month {0} outside 1..=12")]
    MonthOutOfRange(u32),
    #[error("day {0} outside 1..=31")]
    DayOutOfRange(u32),
}

/// Convert a Gregorian date to the Jalali calendar.
///
/// # Errors
///
/// Returns [`ConversionError`] if the year falls outside
/// [`MIN_YEAR`]`..=`[`MAX_YEAR`] or the month/day fields are not plausible
/// calendar fields. Never panics.
pub fn gregorian_to_jalali(date: &GregorianDate) -> Result<JalaliDate, ConversionError> {
    if !(MIN_YEAR..=MAX_YEAR).contains(&date.year) {
        return Err(ConversionError::YearOutOfRange(date.year));
    }
    if !(1..=12).contains(&date.month) {
        return Err(ConversionError::MonthOutOfRange(date.month));
    }
    if !(1..=31).contains(&date.day) {
        return Err(ConversionError::DayOutOfRange(date.day));
    }

    // All supported years fall after 1600, so the 979 epoch offset applies.
    let gy = i64::from(date.year) - 1600;
    let mut jy: i64 = 979;

    // Day count since the epoch, with the 4/100/400 Gregorian leap rule.
    // Months after February include the current year's own leap day.
    let gy2 = if date.month > 2 { gy + 1 } else { gy };
    let mut days = 365 * gy + (gy2 + 3) / 4 - (gy2 + 99) / 100 + (gy2 + 399) / 400 - 80
        + i64::from(date.day)
        + DAYS_BEFORE_MONTH[(date.month - 1) as usize];

    // 33-year blocks of 12053 days, then 4-year blocks of 1461 days.
    jy += 33 * (days / 12053);
    days %= 12053;
    jy += 4 * (days / 1461);
    days %= 1461;
    if days > 365 {
        jy += (days - 1) / 365;
        days = (days - 1) % 365;
    }

    // First six Jalali months have 31 days, the rest 30 (Esfand 29/30).
    let (jm, jd) = if days < 186 {
        (1 + days / 31, 1 + days % 31)
    } else {
        (7 + (days - 186) / 30, 1 + (days - 186) % 30)
    };

    Ok(JalaliDate {
        year: jy as i32,
        month: jm as u32,
        day: jd as u32,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn jalali(year: i32, month: u32, day: u32) -> JalaliDate {
        JalaliDate { year, month, day }
    }

    #[rstest]
    #[case(1979, 11, 4, jalali(1358, 8, 13))]
    #[case(2024, 3, 20, jalali(1403, 1, 1))] // Nowruz
    #[case(2000, 1, 1, jalali(1378, 10, 11))]
    #[case(2024, 3, 19, jalali(1402, 12, 29))] // day before Nowruz
    #[case(1900, 1, 1, jalali(1278, 10, 11))]
    fn converts_reference_dates(
        #[case] gy: i32,
        #[case] gm: u32,
        #[case] gd: u32,
        #[case] expected: JalaliDate,
    ) {
        let result = gregorian_to_jalali(&GregorianDate::new(gy, gm, gd)).unwrap();
        assert_eq!(result, expected);
    }

    #[rstest]
    #[case(1850, 5, 6, ConversionError::YearOutOfRange(1850))]
    #[case(2200, 1, 1, ConversionError::YearOutOfRange(2200))]
    #[case(2024, 13, 1, ConversionError::MonthOutOfRange(13))]
    #[case(2024, 0, 1, ConversionError::MonthOutOfRange(0))]
    #[case(2024, 1, 32, ConversionError::DayOutOfRange(32))]
    #[case(2024, 1, 0, ConversionError::DayOutOfRange(0))]
    fn rejects_out_of_domain_input(
        #[case] gy: i32,
        #[case] gm: u32,
        #[case] gd: u32,
        #[case] expected: ConversionError,
    ) {
        let result = gregorian_to_jalali(&GregorianDate::new(gy, gm, gd));
        assert_eq!(result, Err(expected));
    }

    #[test]
    fn output_fields_stay_in_range() {
        for year in [1900, 1979, 2000, 2024, 2099, 2100] {
            for month in 1..=12 {
                for day in [1, 15, 28] {
                    let j = gregorian_to_jalali(&GregorianDate::new(year, month, day)).unwrap();
                    assert!((1..=12).contains(&j.month), "month out of range for {j}");
                    assert!((1..=31).contains(&j.day), "day out of range for {j}");
                }
            }
        }
    }

    #[test]
    fn mapping_is_strictly_monotonic() {
        fn is_gregorian_leap(year: i32) -> bool {
            (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
        }
        fn days_in_month(year: i32, month: u32) -> u32 {
            match month {
                1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
                4 | 6 | 9 | 11 => 30,
                2 if is_gregorian_leap(year) => 29,
                2 => 28,
                _ => unreachable!(),
            }
        }

        let mut previous: Option<JalaliDate> = None;
        for year in MIN_YEAR..=MAX_YEAR {
            for month in 1..=12 {
                for day in 1..=days_in_month(year, month) {
                    let j = gregorian_to_jalali(&GregorianDate::new(year, month, day)).unwrap();
                    if let Some(prev) = previous {
                        assert!(
                            j > prev,
                            "expected {j} after {prev} for {year}-{month:02}-{day:02}"
                        );
                    }
                    previous = Some(j);
                }
            }
        }
    }

    #[test]
    fn display_is_zero_padded() {
        assert_eq!(jalali(1403, 1, 1).to_string(), "1403/01/01");
        assert_eq!(jalali(1358, 8, 13).to_string(), "1358/08/13");
    }
}
