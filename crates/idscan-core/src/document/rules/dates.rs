//! Day-month-year date parsing.

use chrono::NaiveDate;

use super::FieldExtractor;
use super::patterns::DATE_DMY;

/// Output format of every parsed date.
pub const DATE_FORMAT: &str = "%d/%m/%Y";

const MIN_YEAR: i32 = 1900;
const MAX_YEAR: i32 = 9999;

/// Date field extractor.
///
/// Only the first day-month-year group in the text is considered. OCR
/// confusions of the letter `o`/`O` for zero are repaired first.
pub struct DateExtractor;

impl DateExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DateExtractor {
    type Output = NaiveDate;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        let repaired = text.replace(['o', 'O'], "0");
        let caps = DATE_DMY.captures(&repaired)?;

        let day: u32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let year: i32 = caps[3].parse().ok()?;

        if !is_valid_date(day, month, year) {
            return None;
        }
        NaiveDate::from_ymd_opt(year, month, day)
    }
}

/// Extract a date and render it as zero-padded `DD/MM/YYYY`.
pub fn extract_date(text: &str) -> Option<String> {
    DateExtractor::new()
        .extract(text)
        .map(|date| date.format(DATE_FORMAT).to_string())
}

/// Gregorian leap year rule.
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in `month` of `year`, or `None` for an invalid month.
pub fn days_in_month(month: u32, year: i32) -> Option<u32> {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => Some(31),
        4 | 6 | 9 | 11 => Some(30),
        2 if is_leap_year(year) => Some(29),
        2 => Some(28),
        _ => None,
    }
}

/// Calendar validity with the year restricted to 1900..=9999.
pub fn is_valid_date(day: u32, month: u32, year: i32) -> bool {
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return false;
    }
    match days_in_month(month, year) {
        Some(max_day) => (1..=max_day).contains(&day),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_extract_date_formats() {
        assert_eq!(extract_date("01/01/1990"), Some("01/01/1990".into()));
        assert_eq!(extract_date("1/2/1990"), Some("01/02/1990".into()));
        assert_eq!(extract_date("15.08.2021"), Some("15/08/2021".into()));
        assert_eq!(extract_date("15-08-2021"), Some("15/08/2021".into()));
        assert_eq!(extract_date("15 | 08 | 2021"), Some("15/08/2021".into()));
        assert_eq!(
            extract_date("Ngày sinh 07 11 1985"),
            Some("07/11/1985".into())
        );
    }

    #[test]
    fn test_extract_date_without_separators() {
        assert_eq!(extract_date("01011990"), Some("01/01/1990".into()));
        assert_eq!(
            extract_date("Ngày sinh 15082021"),
            Some("15/08/2021".into())
        );
        assert_eq!(extract_date("31042020"), None);
    }

    #[test]
    fn test_extract_date_repairs_letter_o() {
        assert_eq!(extract_date("O1/1O/2OO5"), Some("01/10/2005".into()));
        assert_eq!(extract_date("o3/o4/1999"), Some("03/04/1999".into()));
    }

    #[test]
    fn test_extract_date_calendar_rules() {
        assert_eq!(extract_date("29/02/2020"), Some("29/02/2020".into()));
        assert_eq!(extract_date("29/02/2000"), Some("29/02/2000".into()));
        assert_eq!(extract_date("29/02/2021"), None);
        assert_eq!(extract_date("29/02/1900"), None);
        assert_eq!(extract_date("31/04/2020"), None);
        assert_eq!(extract_date("00/01/2020"), None);
        assert_eq!(extract_date("10/13/2020"), None);
    }

    #[test]
    fn test_extract_date_year_range() {
        assert_eq!(extract_date("01/01/1899"), None);
        assert_eq!(extract_date("01/01/1900"), Some("01/01/1900".into()));
        assert_eq!(extract_date("31/12/9999"), Some("31/12/9999".into()));
    }

    #[test]
    fn test_extract_date_uses_first_match_only() {
        // The first group is invalid; a later valid group is not consulted.
        assert_eq!(extract_date("31/04/2020 01/05/2020"), None);
        assert_eq!(
            extract_date("01/05/2020 - 01/05/2030"),
            Some("01/05/2020".into())
        );
    }

    #[test]
    fn test_extract_date_rejects_non_dates() {
        assert_eq!(extract_date(""), None);
        assert_eq!(extract_date("NGUYEN VAN A"), None);
        assert_eq!(extract_date("01/01/90"), None);
    }

    #[test]
    fn test_every_valid_date_round_trips() {
        for year in [1900, 1999, 2000, 2020, 2021, 2100, 2400, 9999] {
            for month in 1..=12 {
                let last = days_in_month(month, year).unwrap();
                for day in 1..=last {
                    let expected = format!("{:02}/{:02}/{}", day, month, year);
                    let unpadded = format!("{}/{}/{}", day, month, year);
                    assert_eq!(extract_date(&unpadded), Some(expected.clone()));
                    assert_eq!(extract_date(&expected), Some(expected.clone()));
                }
                let overflow = format!("{}/{}/{}", last + 1, month, year);
                assert_eq!(extract_date(&overflow), None);
            }
        }
    }

    #[test]
    fn test_leap_years() {
        assert!(is_leap_year(2000));
        assert!(is_leap_year(2024));
        assert!(!is_leap_year(1900));
        assert!(!is_leap_year(2023));
        assert_eq!(days_in_month(2, 2024), Some(29));
        assert_eq!(days_in_month(13, 2024), None);
    }
}
