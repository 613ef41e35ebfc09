//! Date helper functions

use chrono::NaiveDate;

/// Format a date using Moment.js-compatible format string
///
/// # Examples
/// ```ignore
/// format_date(&date, "YYYY-MM-DD") // -> "2024-01-15"
/// ```
pub fn format_date(date: &NaiveDate, format: &str) -> String {
    let chrono_format = moment_to_chrono_format(format);
    date.format(&chrono_format).to_string()
}

/// Format a date in ISO 8601 form
pub fn date_xml(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Relative day count from `today` (like "3 days ago")
pub fn relative_date(date: &NaiveDate, today: &NaiveDate) -> String {
    let days = today.signed_duration_since(*date).num_days();

    if days < 0 {
        "in the future".to_string()
    } else if days == 0 {
        "today".to_string()
    } else if days == 1 {
        "yesterday".to_string()
    } else if days < 30 {
        format!("{} days ago", days)
    } else if days < 365 {
        let months = days / 30;
        if months == 1 {
            "a month ago".to_string()
        } else {
            format!("{} months ago", months)
        }
    } else {
        let years = days / 365;
        if years == 1 {
            "a year ago".to_string()
        } else {
            format!("{} years ago", years)
        }
    }
}

/// Convert Moment.js format to chrono format
fn moment_to_chrono_format(format: &str) -> String {
    // Longest tokens first within each unit
    let replacements = [
        ("YYYY", "%Y"),
        ("YY", "%y"),
        ("MMMM", "%B"),
        ("MMM", "%b"),
        ("MM", "%m"),
        ("DDDD", "%j"),
        ("DD", "%d"),
        ("dddd", "%A"),
        ("ddd", "%a"),
    ];

    let mut result = format.to_string();
    for (from, to) in replacements {
        result = result.replace(from, to);
    }

    // Single-letter tokens, only where not already converted
    let mut out = String::with_capacity(result.len());
    let mut chars = result.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '%' => {
                out.push(c);
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            }
            'M' => out.push_str("%-m"),
            'D' => out.push_str("%-d"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_format_date() {
        let d = date(2024, 1, 5);
        assert_eq!(format_date(&d, "YYYY-MM-DD"), "2024-01-05");
        assert_eq!(format_date(&d, "YYYY/MM/DD"), "2024/01/05");
        assert_eq!(format_date(&d, "MMMM D, YYYY"), "January 5, 2024");
        assert_eq!(format_date(&d, "D MMM"), "5 Jan");
    }

    #[test]
    fn test_date_xml() {
        assert_eq!(date_xml(&date(2024, 3, 2)), "2024-03-02");
    }

    #[test]
    fn test_relative_date() {
        let today = date(2024, 6, 1);
        assert_eq!(relative_date(&today, &today), "today");
        assert_eq!(relative_date(&date(2024, 5, 31), &today), "yesterday");
        assert_eq!(relative_date(&date(2024, 5, 20), &today), "12 days ago");
        assert_eq!(relative_date(&date(2024, 3, 1), &today), "3 months ago");
        assert_eq!(relative_date(&date(2022, 6, 1), &today), "2 years ago");
        assert_eq!(relative_date(&date(2024, 6, 2), &today), "in the future");
    }

    #[test]
    fn test_moment_to_chrono() {
        assert_eq!(moment_to_chrono_format("YYYY-MM-DD"), "%Y-%m-%d");
        assert_eq!(moment_to_chrono_format("MMMM D, YYYY"), "%B %-d, %Y");
    }
}
