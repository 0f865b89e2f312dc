//! Locale date handling: `2024年1月5日` and `2024/1/5` both parse under the
//! default `%Y/%m/%d` format once the unit markers are rewritten.

use chrono::NaiveDate;

/// Replace the year and month markers with `/` and drop the day marker.
pub fn rewrite_locale_date(raw: &str) -> String {
    raw.trim()
        .replace('年', "/")
        .replace('月', "/")
        .replace('日', "")
}

pub fn parse_ledger_date(raw: &str, format: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&rewrite_locale_date(raw), format).ok()
}

pub fn month_key(date: NaiveDate, month_format: &str) -> String {
    date.format(month_format).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rewrite_markers() {
        assert_eq!(rewrite_locale_date("2024年1月5日"), "2024/1/5");
        assert_eq!(rewrite_locale_date(" 2024/01/05 "), "2024/01/05");
    }

    #[test]
    fn test_parse_both_styles() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(parse_ledger_date("2024年1月5日", "%Y/%m/%d"), Some(expected));
        assert_eq!(parse_ledger_date("2024/01/05", "%Y/%m/%d"), Some(expected));
        assert_eq!(parse_ledger_date("2024年13月5日", "%Y/%m/%d"), None);
        assert_eq!(parse_ledger_date("yesterday", "%Y/%m/%d"), None);
    }

    #[test]
    fn test_month_key_is_deterministic() {
        let d = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(month_key(d, "%Y-%m"), "2024-02");
        assert_eq!(month_key(d, "%Y-%m"), month_key(d, "%Y-%m"));
    }
}
