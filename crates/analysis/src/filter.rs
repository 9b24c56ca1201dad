use serde::{Deserialize, Serialize};

use spendlens_core::{Category, Transaction};

/// A view-level selection over the full transaction set. An empty list for
/// either dimension means that dimension is unrestricted; the two dimensions
/// combine with AND.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSelection {
    /// Institution names, matched exactly against `Transaction::institution`.
    #[serde(default)]
    pub accounts: Vec<String>,
    #[serde(default)]
    pub categories: Vec<Category>,
}

impl FilterSelection {
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty() && self.categories.is_empty()
    }

    fn matches(&self, txn: &Transaction) -> bool {
        if !self.accounts.is_empty() && !self.accounts.iter().any(|a| *a == txn.institution) {
            return false;
        }
        if !self.categories.is_empty() && !self.categories.contains(&txn.category_or_default()) {
            return false;
        }
        true
    }
}

/// Filtering never mutates the underlying set; analyses over a filtered view
/// are computed from the returned subset.
pub fn apply_filters<'a>(
    transactions: &'a [Transaction],
    selection: &FilterSelection,
) -> Vec<&'a Transaction> {
    transactions.iter().filter(|t| selection.matches(t)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn txn(vendor: &str, amount: &str, category: Category, inst: &str) -> Transaction {
        Transaction {
            date: None,
            date_str: String::new(),
            vendor: vendor.to_string(),
            amount: Decimal::from_str(amount).unwrap(),
            category: Some(category),
            source_category: String::new(),
            currency: "USD".to_string(),
            description: String::new(),
            institution: inst.to_string(),
            raw: String::new(),
        }
    }

    fn sample() -> Vec<Transaction> {
        vec![
            txn("Whole Foods", "-50.00", Category::FoodDining, "Chase Checking"),
            txn("Landlord", "-1500.00", Category::Housing, "Chase Checking"),
            txn("Starbucks", "-6.00", Category::FoodDining, "Amex Card"),
        ]
    }

    #[test]
    fn empty_selection_keeps_everything() {
        let txns = sample();
        let out = apply_filters(&txns, &FilterSelection::default());
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn account_filter_is_exact_match() {
        let txns = sample();
        let sel = FilterSelection {
            accounts: vec!["Amex Card".to_string()],
            categories: vec![],
        };
        let out = apply_filters(&txns, &sel);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].vendor, "Starbucks");
    }

    #[test]
    fn dimensions_combine_with_and() {
        let txns = sample();
        let sel = FilterSelection {
            accounts: vec!["Chase Checking".to_string()],
            categories: vec![Category::FoodDining],
        };
        let out = apply_filters(&txns, &sel);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].vendor, "Whole Foods");
    }

    #[test]
    fn multiple_values_within_a_dimension_are_or() {
        let txns = sample();
        let sel = FilterSelection {
            accounts: vec![],
            categories: vec![Category::FoodDining, Category::Housing],
        };
        assert_eq!(apply_filters(&txns, &sel).len(), 3);
    }

    #[test]
    fn source_set_is_untouched() {
        let txns = sample();
        let sel = FilterSelection {
            accounts: vec!["Amex Card".to_string()],
            categories: vec![],
        };
        let _ = apply_filters(&txns, &sel);
        assert_eq!(txns.len(), 3);
    }
}
