//! Date and reference-number formatting.

use chrono::{Datelike, NaiveDate};

/// Ordinal suffix for a day of month: 1st, 2nd, 3rd, 4th ... 11th-13th
/// are always "th".
fn ordinal_suffix(day: u32) -> &'static str {
    match day % 100 {
        11..=13 => "th",
        _ => match day % 10 {
            1 => "st",
            2 => "nd",
            3 => "rd",
            _ => "th",
        },
    }
}

/// Display form of an invoice date: "21st July 2025".
pub fn ordinal_date(date: NaiveDate) -> String {
    let day = date.day();
    format!(
        "{}{} {}",
        day,
        ordinal_suffix(day),
        date.format("%B %Y")
    )
}

/// Default rent period descriptor: "Rent for the month of July '25".
pub fn rent_period(date: NaiveDate) -> String {
    format!(
        "Rent for the month of {} '{:02}",
        date.format("%B"),
        date.year() % 100
    )
}

/// Indian fiscal year span (April through March): July 2025 falls in
/// "25-26", February 2025 in "24-25".
pub fn fiscal_year_span(date: NaiveDate) -> String {
    let (start, end) = if date.month() >= 4 {
        (date.year() % 100, (date.year() + 1) % 100)
    } else {
        ((date.year() - 1) % 100, date.year() % 100)
    };
    format!("{:02}-{:02}", start, end)
}

/// Reference number: company prefix, fiscal year, zero-padded sequence.
/// An empty prefix falls back to "INV".
pub fn ref_number(prefix: &str, date: NaiveDate, seq: u64) -> String {
    let prefix = prefix.trim();
    let prefix = if prefix.is_empty() { "INV" } else { prefix };
    format!("{}/{}/{:03}", prefix, fiscal_year_span(date), seq)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_ordinal_suffixes() {
        assert_eq!(ordinal_date(date(2025, 7, 1)), "1st July 2025");
        assert_eq!(ordinal_date(date(2025, 7, 2)), "2nd July 2025");
        assert_eq!(ordinal_date(date(2025, 7, 3)), "3rd July 2025");
        assert_eq!(ordinal_date(date(2025, 7, 4)), "4th July 2025");
        assert_eq!(ordinal_date(date(2025, 7, 11)), "11th July 2025");
        assert_eq!(ordinal_date(date(2025, 7, 12)), "12th July 2025");
        assert_eq!(ordinal_date(date(2025, 7, 13)), "13th July 2025");
        assert_eq!(ordinal_date(date(2025, 7, 21)), "21st July 2025");
        assert_eq!(ordinal_date(date(2025, 7, 22)), "22nd July 2025");
        assert_eq!(ordinal_date(date(2025, 7, 31)), "31st July 2025");
    }

    #[test]
    fn test_rent_period() {
        assert_eq!(rent_period(date(2025, 7, 21)), "Rent for the month of July '25");
        assert_eq!(rent_period(date(2024, 12, 1)), "Rent for the month of December '24");
        assert_eq!(rent_period(date(2009, 1, 5)), "Rent for the month of January '09");
    }

    #[test]
    fn test_fiscal_year_span() {
        assert_eq!(fiscal_year_span(date(2025, 7, 21)), "25-26");
        assert_eq!(fiscal_year_span(date(2025, 4, 1)), "25-26");
        assert_eq!(fiscal_year_span(date(2025, 3, 31)), "24-25");
        assert_eq!(fiscal_year_span(date(2025, 2, 10)), "24-25");
    }

    #[test]
    fn test_ref_number() {
        assert_eq!(ref_number("SAGT", date(2025, 7, 21), 7), "SAGT/25-26/007");
        assert_eq!(ref_number("", date(2025, 7, 21), 12), "INV/25-26/012");
        assert_eq!(ref_number("  ", date(2025, 1, 2), 128), "INV/24-25/128");
    }
}
