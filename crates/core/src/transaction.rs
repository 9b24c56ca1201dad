use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::category::Category;

/// A single dated, signed monetary movement — the central entity every other
/// component consumes. Negative amounts are outflows, positive are inflows.
///
/// Both ingestion paths guarantee a non-zero `amount`; `date` may be absent
/// (the row is kept, date-keyed aggregations skip it) with the original
/// source string preserved in `date_str` for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: Option<NaiveDate>,
    /// Rendering-ready date string; falls back to the raw source text when
    /// the date could not be parsed.
    pub date_str: String,
    /// Merchant/payee label. Never empty — "Unknown" when the source has
    /// nothing usable.
    pub vendor: String,
    pub amount: Decimal,
    /// Assigned by the categorizer; None only before classification.
    pub category: Option<Category>,
    /// Free-text category label carried from the source row, if any. The
    /// categorizer tries to map this onto the taxonomy before falling back
    /// to keyword matching.
    pub source_category: String,
    pub currency: String,
    pub description: String,
    /// Logical account/bank label — the sole account-grouping key.
    pub institution: String,
    /// Opaque pass-through of the original source row or line, kept for
    /// auditability. Never interpreted.
    pub raw: String,
}

impl Transaction {
    pub fn is_expense(&self) -> bool {
        self.amount < Decimal::ZERO
    }

    pub fn is_income(&self) -> bool {
        self.amount > Decimal::ZERO
    }

    /// The assigned category, treating unclassified rows as Uncategorized.
    pub fn category_or_default(&self) -> Category {
        self.category.unwrap_or(Category::Uncategorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn txn(amount: &str) -> Transaction {
        Transaction {
            date: NaiveDate::from_ymd_opt(2025, 1, 15),
            date_str: "Jan 15, 2025".to_string(),
            vendor: "Test".to_string(),
            amount: Decimal::from_str(amount).unwrap(),
            category: None,
            source_category: String::new(),
            currency: "USD".to_string(),
            description: String::new(),
            institution: "Unknown".to_string(),
            raw: String::new(),
        }
    }

    #[test]
    fn sign_convention() {
        assert!(txn("-45.20").is_expense());
        assert!(!txn("-45.20").is_income());
        assert!(txn("600").is_income());
    }

    #[test]
    fn unclassified_defaults_to_uncategorized() {
        assert_eq!(txn("10").category_or_default(), Category::Uncategorized);
        let mut t = txn("10");
        t.category = Some(Category::Income);
        assert_eq!(t.category_or_default(), Category::Income);
    }
}
