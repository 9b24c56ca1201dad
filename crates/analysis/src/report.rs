use std::fmt::Write;

use rust_decimal::Decimal;

use spendlens_core::Category;

use crate::analyzer::Analysis;

/// Serialize a full analysis snapshot as pretty-printed JSON. The snapshot
/// is passed in explicitly; exporting never recomputes or caches anything.
pub fn to_json(analysis: &Analysis) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(analysis)
}

/// Render a plain-text summary of an analysis, suitable for a terminal.
pub fn to_text(analysis: &Analysis) -> String {
    let mut out = String::new();
    // write! to a String cannot fail.
    let _ = writeln!(out, "Transactions: {}", analysis.transaction_count);
    let _ = writeln!(out, "Total spend:  {}", money(analysis.total_spend));
    let _ = writeln!(out, "Total income: {}", money(analysis.total_income));
    let _ = writeln!(out, "Net flow:     {}", signed_money(analysis.net_flow));

    if !analysis.categories.is_empty() {
        let _ = writeln!(out, "\nBy category:");
        for c in &analysis.categories {
            let _ = writeln!(
                out,
                "  {:<16} {:>12}  ({} txns)",
                c.category.name(),
                money(c.abs_total),
                c.count
            );
        }
    }

    if !analysis.institutions.is_empty() {
        let _ = writeln!(out, "\nBy institution:");
        for i in &analysis.institutions {
            let _ = writeln!(
                out,
                "  {:<24} spend {:>12}  income {:>12}",
                i.name,
                money(i.spend),
                money(i.income)
            );
        }
    }

    if !analysis.top_merchants.is_empty() {
        let _ = writeln!(out, "\nTop merchants:");
        for m in &analysis.top_merchants {
            let _ = writeln!(out, "  {:<24} {:>12}  ({} txns)", m.name, money(m.total), m.count);
        }
    }

    out
}

/// Format a non-negative magnitude as `$1234.56`.
pub fn money(value: Decimal) -> String {
    format!("${:.2}", value.abs())
}

/// Format a signed value, keeping the minus sign outside the `$`.
pub fn signed_money(value: Decimal) -> String {
    if value < Decimal::ZERO {
        format!("-${:.2}", value.abs())
    } else {
        format!("${:.2}", value)
    }
}

/// `categories` must be the analysis ordering (descending by magnitude);
/// the top *spending* category is the first entry that is not Income.
pub fn top_spending_category(analysis: &Analysis) -> Option<&crate::analyzer::CategoryRollup> {
    analysis.categories.iter().find(|c| c.category != Category::Income)
}
