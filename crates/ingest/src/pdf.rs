use std::sync::OnceLock;

use regex::Regex;
use rust_decimal::Decimal;
use thiserror::Error;

use spendlens_core::{format_date, parse_amount, parse_date, Transaction};

use crate::institution::detect_institution;

// ── Compiled regex cache ─────────────────────────────────────────────────────

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("invalid regex"))
        }
    };
}

re!(re_line_date, r"(\d{1,2}[/\-.]\d{1,2}[/\-.]\d{2,4})");
// Strict two-decimal money token: optional $, accounting parens or minus,
// optional thousands separators. The two-decimal requirement is what keeps
// bare day numbers and reference codes out.
re!(re_money, r"\$?\s*[-(]?\s*\d{1,3}(?:,\d{3})*\.\d{2}\)?");

/// Ceiling on plausible single-transaction magnitude; larger tokens are
/// treated as account numbers or reference noise.
const MAX_PLAUSIBLE_AMOUNT: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);
/// Floor: a statement line never charges less than one cent.
const MIN_PLAUSIBLE_AMOUNT: Decimal = Decimal::from_parts(1, 0, 0, false, 2);
const VENDOR_MAX_CHARS: usize = 60;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("PDF text extraction failed: {0}")]
    Extraction(String),
}

/// Parse a PDF bank statement into normalized transactions.
///
/// Text extraction (including the collapse of positioned runs into reading-
/// order lines) is delegated to `pdf-extract`; failure there is fatal for
/// this ingestion path. Everything after that — institution detection, line
/// scanning, amount recovery — is pure text processing and never fails:
/// lines that don't look like transactions are simply skipped.
pub fn parse(bytes: &[u8]) -> Result<Vec<Transaction>, PdfError> {
    let text = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| PdfError::Extraction(e.to_string()))?;
    Ok(parse_text(&text))
}

/// Recover transactions from already-extracted statement text.
pub fn parse_text(text: &str) -> Vec<Transaction> {
    let lines: Vec<&str> = text.lines().collect();

    let institution =
        detect_institution(lines.iter().copied()).unwrap_or_else(|| "Unknown".to_string());

    let mut transactions = Vec::new();
    for line in &lines {
        if let Some(txn) = parse_line(line, &institution) {
            transactions.push(txn);
        }
    }
    tracing::debug!(
        count = transactions.len(),
        institution = %institution,
        "recovered transactions from PDF text"
    );
    transactions
}

/// A line is a transaction candidate only if it carries a date and at least
/// one plausible money token. Statement lines often end with a running
/// balance in the same two-decimal format as the amount, so the *last*
/// matching token is taken as the transaction amount — a documented
/// heuristic, not a guarantee.
fn parse_line(line: &str, institution: &str) -> Option<Transaction> {
    let text = line.trim();
    if text.len() < 5 {
        return None;
    }

    let date_match = re_line_date().find(text)?;

    let mut amounts = Vec::new();
    let mut first_amount_start = None;
    for m in re_money().find_iter(text) {
        let value = parse_amount(m.as_str());
        if plausible(value) {
            amounts.push(value);
            first_amount_start.get_or_insert(m.start());
        }
    }
    let amount = *amounts.last()?;

    let vendor_end = first_amount_start.unwrap_or(text.len()).max(date_match.end());
    let vendor: String = text[date_match.end()..vendor_end]
        .trim()
        .trim_start_matches(['-', '*', '#', ' '])
        .trim()
        .chars()
        .take(VENDOR_MAX_CHARS)
        .collect();
    let vendor = if vendor.is_empty() { "Unknown Transaction".to_string() } else { vendor };

    let date_str = date_match.as_str();
    let date = parse_date(date_str);

    Some(Transaction {
        date,
        date_str: date.map(format_date).unwrap_or_else(|| date_str.to_string()),
        vendor: vendor.clone(),
        amount,
        category: None,
        source_category: String::new(),
        currency: "USD".to_string(),
        description: vendor,
        institution: institution.to_string(),
        raw: text.to_string(),
    })
}

fn plausible(value: Decimal) -> bool {
    let abs = value.abs();
    abs > MIN_PLAUSIBLE_AMOUNT && abs < MAX_PLAUSIBLE_AMOUNT
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn plain_statement_line() {
        let txns = parse_text("Chase Bank\n01/15/2025  WHOLE FOODS MARKET  -45.20\n");
        assert_eq!(txns.len(), 1);
        let t = &txns[0];
        assert_eq!(t.date, NaiveDate::from_ymd_opt(2025, 1, 15));
        assert_eq!(t.vendor, "WHOLE FOODS MARKET");
        assert_eq!(t.amount, dec("-45.20"));
        assert_eq!(t.institution, "Chase Bank");
    }

    #[test]
    fn last_money_token_wins_over_running_balance() {
        // Amount column followed by a balance column: the balance-style
        // heuristic takes the last token.
        let txns = parse_text("01/15/2025 COFFEE SHOP 5.75 1,234.56\n");
        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].amount, dec("1234.56"));
        // Vendor still ends at the first money token.
        assert_eq!(txns[0].vendor, "COFFEE SHOP");
    }

    #[test]
    fn parenthesized_amount_is_negative() {
        let txns = parse_text("01/20/2025 SERVICE FEE (12.00)\n");
        assert_eq!(txns[0].amount, dec("-12.00"));
    }

    #[test]
    fn lines_without_date_or_amount_skipped() {
        let txns = parse_text(
            "Statement of Account\n\
             Opening balance 500.00\n\
             01/15/2025 no money token here\n\
             Totals\n",
        );
        assert!(txns.is_empty());
    }

    #[test]
    fn institution_falls_back_to_unknown() {
        let txns = parse_text("01/15/2025 STORE 9.99\n");
        assert_eq!(txns[0].institution, "Unknown");
    }

    #[test]
    fn vendor_trimmed_of_leading_punctuation_and_truncated() {
        let long_vendor = "X".repeat(80);
        let text = format!("01/15/2025  -* {long_vendor} 9.99\n");
        let txns = parse_text(&text);
        assert_eq!(txns[0].vendor.chars().count(), 60);
        assert!(txns[0].vendor.starts_with('X'));
    }

    #[test]
    fn empty_vendor_defaults() {
        let txns = parse_text("01/15/2025 9.99\n");
        assert_eq!(txns[0].vendor, "Unknown Transaction");
    }

    #[test]
    fn implausible_magnitudes_ignored() {
        // 0.00 doesn't count as an amount, so the line has none and is
        // skipped entirely.
        let txns = parse_text("01/15/2025 ACCT 0.00\n");
        assert!(txns.is_empty());
    }

    #[test]
    fn dollar_prefixed_amounts() {
        let txns = parse_text("01/15/2025 GROCERY $1,234.56\n");
        assert_eq!(txns[0].amount, dec("1234.56"));
    }
}
