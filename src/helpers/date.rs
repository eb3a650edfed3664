//! Date helper functions

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone};

use crate::i18n::I18n;

const FULL_MONTH: char = '\u{1}';
const SHORT_MONTH: char = '\u{2}';

/// Parse a timestamp as returned by the content API
///
/// Accepts `2021-03-15T19:25:28+0000`, RFC 3339 and bare `2021-03-15` dates
/// (taken as midnight UTC).
pub fn parse_timestamp(value: &str) -> Option<DateTime<FixedOffset>> {
    let value = value.trim();
    DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%z")
        .or_else(|_| DateTime::parse_from_rfc3339(value))
        .ok()
        .or_else(|| {
            let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()?;
            let utc = FixedOffset::east_opt(0)?;
            utc.from_local_datetime(&date.and_hms_opt(0, 0, 0)?).single()
        })
}

/// Format an API timestamp with a Moment.js-style pattern in the site language
///
/// Without a time zone the timestamp keeps the offset it was received with.
/// Values that cannot be parsed are returned unchanged.
///
/// # Examples
/// ```ignore
/// format_date_locale("2021-03-15T19:25:28+0000", "DD MMM YYYY", &i18n, None) // -> "15 mar 2021"
/// ```
pub fn format_date_locale(
    value: &str,
    format: &str,
    i18n: &I18n,
    tz: Option<chrono_tz::Tz>,
) -> String {
    let Some(date) = parse_timestamp(value) else {
        return value.to_string();
    };

    match tz {
        Some(tz) => format_localized(&date.with_timezone(&tz), format, i18n),
        None => format_localized(&date, format, i18n),
    }
}

/// Format a date, substituting localized month names for `MMMM` and `MMM`
pub fn format_localized<Tz: TimeZone>(date: &DateTime<Tz>, format: &str, i18n: &I18n) -> String
where
    Tz::Offset: std::fmt::Display,
{
    use chrono::Datelike;

    let format = format
        .replace("MMMM", &FULL_MONTH.to_string())
        .replace("MMM", &SHORT_MONTH.to_string());
    let formatted = format_date(date, &format);

    let month = date.month();
    formatted
        .replace(FULL_MONTH, &i18n.month(month))
        .replace(SHORT_MONTH, &i18n.month_short(month))
}

/// Format a date using Moment.js-compatible format string
///
/// # Examples
/// ```ignore
/// format_date(&date, "YYYY-MM-DD") // -> "2024-01-15"
/// ```
pub fn format_date<Tz: TimeZone>(date: &DateTime<Tz>, format: &str) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let chrono_format = moment_to_chrono_format(format);
    date.format(&chrono_format).to_string()
}

/// Convert Moment.js format to chrono format
fn moment_to_chrono_format(format: &str) -> String {
    let replacements = [
        // Year
        ("YYYY", "%Y"),
        ("YY", "%y"),
        // Month (uppercase M)
        ("MM", "%m"),
        // Day of month (uppercase D)
        ("DDDD", "%j"),
        ("DD", "%d"),
        // Hour 24h (uppercase H)
        ("HH", "%H"),
        // Hour 12h (lowercase h)
        ("hh", "%I"),
        // Minute (lowercase m after we've processed MM)
        ("mm", "%M"),
        // Second (lowercase s)
        ("ss", "%S"),
        // Timezone
        ("ZZ", "%z"),
    ];

    let mut result = format.to_string();

    for (from, to) in replacements {
        result = result.replace(from, to);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp_formats() {
        let date = parse_timestamp("2021-03-15T19:25:28+0000").unwrap();
        assert_eq!(format_date(&date, "YYYY-MM-DD HH:mm:ss ZZ"), "2021-03-15 19:25:28 +0000");

        let date = parse_timestamp("2021-03-15T19:25:28-03:00").unwrap();
        assert_eq!(format_date(&date, "YYYY-MM-DD HH:mm ZZ"), "2021-03-15 19:25 -0300");

        let date = parse_timestamp("2021-01-01").unwrap();
        assert_eq!(format_date(&date, "YYYY-MM-DD HH:mm:ss"), "2021-01-01 00:00:00");

        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_format_date_locale_pt_br() {
        let i18n = I18n::new("pt-BR");
        assert_eq!(
            format_date_locale("2021-03-15T19:25:28+0000", "DD MMM YYYY", &i18n, None),
            "15 mar 2021"
        );
        assert_eq!(
            format_date_locale("2021-04-01T12:00:00+0000", "DD [de] MMMM", &i18n, None),
            "01 [de] abril"
        );
    }

    #[test]
    fn test_format_date_locale_with_timezone() {
        let i18n = I18n::new("pt-BR");
        assert_eq!(
            format_date_locale(
                "2021-03-16T01:00:00+0000",
                "DD MMM YYYY",
                &i18n,
                Some(chrono_tz::America::Sao_Paulo)
            ),
            "15 mar 2021"
        );
    }

    #[test]
    fn test_unparseable_date_is_kept() {
        let i18n = I18n::new("en");
        assert_eq!(format_date_locale("soon", "DD MMM YYYY", &i18n, None), "soon");
    }

    #[test]
    fn test_moment_to_chrono() {
        assert_eq!(moment_to_chrono_format("YYYY-MM-DD"), "%Y-%m-%d");
        assert_eq!(moment_to_chrono_format("HH:mm:ss"), "%H:%M:%S");
    }
}
