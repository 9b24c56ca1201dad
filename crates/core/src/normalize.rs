use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Parse a currency string into a signed decimal amount.
///
/// Strips everything except digits, `.`, `-` and parentheses, then treats a
/// fully parenthesized value as an accounting negative. Unparsable input
/// yields zero — zero-amount rows are filtered out downstream, so a garbage
/// amount simply drops the row rather than aborting the parse.
pub fn parse_amount(s: &str) -> Decimal {
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '(' | ')'))
        .collect();
    if cleaned.is_empty() {
        return Decimal::ZERO;
    }
    if cleaned.starts_with('(') && cleaned.ends_with(')') {
        return Decimal::from_str(&cleaned[1..cleaned.len() - 1])
            .map(|d| -d)
            .unwrap_or(Decimal::ZERO);
    }
    // Stray parentheses that don't wrap the whole value are noise.
    let cleaned = cleaned.replace(['(', ')'], "");
    Decimal::from_str(&cleaned).unwrap_or(Decimal::ZERO)
}

/// Parse a date string from the formats bank exports actually use.
///
/// ISO and month-name forms are tried first; failing those, the string is
/// split on `/`, `-` or `.` into three numbers and read as MM/DD/YYYY when
/// the first part can be a month, else DD/MM/YYYY. Two-digit years are
/// assumed to be 2000+. Returns None rather than erroring — callers keep the
/// original string for display.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    for fmt in ["%Y-%m-%d", "%Y/%m/%d", "%b %d, %Y", "%B %d, %Y", "%d %b %Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }

    let parts: Vec<&str> = s.split(['/', '-', '.']).collect();
    if parts.len() != 3 {
        return None;
    }
    let a: u32 = parts[0].trim().parse().ok()?;
    let b: u32 = parts[1].trim().parse().ok()?;
    let c: i32 = parts[2].trim().parse().ok()?;
    let year = expand_year(c);

    if a <= 12 && b <= 31 {
        if let Some(d) = NaiveDate::from_ymd_opt(year, a, b) {
            return Some(d);
        }
    }
    if b <= 12 && a <= 31 {
        if let Some(d) = NaiveDate::from_ymd_opt(year, b, a) {
            return Some(d);
        }
    }
    None
}

/// Render a date the way the dashboard displays it: "Jan 15, 2025".
pub fn format_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

fn expand_year(y: i32) -> i32 {
    if y < 100 {
        2000 + y
    } else {
        y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    // ── parse_amount ──────────────────────────────────────────────────────────

    #[test]
    fn amount_plain_and_signed() {
        assert_eq!(parse_amount("123.45"), dec("123.45"));
        assert_eq!(parse_amount("-50.00"), dec("-50.00"));
    }

    #[test]
    fn amount_strips_currency_symbols() {
        assert_eq!(parse_amount("$1,234.56"), dec("1234.56"));
        assert_eq!(parse_amount("USD 99.99"), dec("99.99"));
    }

    #[test]
    fn amount_parenthetical_negative() {
        assert_eq!(parse_amount("(100.00)"), dec("-100.00"));
        assert_eq!(parse_amount("($75.25)"), dec("-75.25"));
    }

    #[test]
    fn amount_unparsable_is_zero() {
        assert_eq!(parse_amount(""), Decimal::ZERO);
        assert_eq!(parse_amount("n/a"), Decimal::ZERO);
        assert_eq!(parse_amount("--"), Decimal::ZERO);
    }

    // ── parse_date ────────────────────────────────────────────────────────────

    #[test]
    fn date_iso() {
        assert_eq!(parse_date("2025-01-15"), NaiveDate::from_ymd_opt(2025, 1, 15));
    }

    #[test]
    fn date_us_slash() {
        assert_eq!(parse_date("1/15/2025"), NaiveDate::from_ymd_opt(2025, 1, 15));
    }

    #[test]
    fn date_day_first_when_month_part_too_large() {
        // 25 cannot be a month, so this reads as DD/MM/YYYY.
        assert_eq!(parse_date("25/03/2024"), NaiveDate::from_ymd_opt(2024, 3, 25));
    }

    #[test]
    fn date_two_digit_year_is_2000_plus() {
        assert_eq!(parse_date("1/15/25"), NaiveDate::from_ymd_opt(2025, 1, 15));
    }

    #[test]
    fn date_month_name() {
        assert_eq!(parse_date("Jan 15, 2025"), NaiveDate::from_ymd_opt(2025, 1, 15));
        assert_eq!(parse_date("March 3, 2024"), NaiveDate::from_ymd_opt(2024, 3, 3));
    }

    #[test]
    fn date_garbage_is_none() {
        assert_eq!(parse_date("not-a-date"), None);
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("13/32/2024"), None);
    }

    #[test]
    fn format_date_medium_style() {
        let d = NaiveDate::from_ymd_opt(2025, 1, 5).unwrap();
        assert_eq!(format_date(d), "Jan 5, 2025");
    }
}
