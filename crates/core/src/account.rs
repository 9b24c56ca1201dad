use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::transaction::Transaction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountKind {
    CreditCard,
    Savings,
    Investment,
    Checking,
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountKind::CreditCard => write!(f, "Credit Card"),
            AccountKind::Savings => write!(f, "Savings"),
            AccountKind::Investment => write!(f, "Investment"),
            AccountKind::Checking => write!(f, "Checking"),
        }
    }
}

impl AccountKind {
    /// Infer the account type from its institution name. Buckets are checked
    /// in order, first hit wins; anything unrecognized is Checking.
    pub fn infer(name: &str) -> Self {
        let lower = name.to_lowercase();
        const CREDIT: &[&str] = &["credit", "card", "visa", "mastercard", "amex"];
        if CREDIT.iter().any(|k| lower.contains(k)) {
            AccountKind::CreditCard
        } else if lower.contains("saving") {
            AccountKind::Savings
        } else if lower.contains("invest") || lower.contains("brokerage") {
            AccountKind::Investment
        } else {
            AccountKind::Checking
        }
    }
}

/// A logical account derived from the transaction set, keyed by institution
/// name. Recomputed wholesale on every ingestion event — there is no
/// persisted identity across imports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub name: String,
    pub kind: AccountKind,
    pub txn_count: usize,
    pub total_spend: Decimal,
    pub total_income: Decimal,
}

/// One account per distinct institution value, sorted descending by
/// transaction count (most active institution first).
pub fn extract_accounts(transactions: &[Transaction]) -> Vec<Account> {
    let mut by_name: BTreeMap<&str, Account> = BTreeMap::new();

    for t in transactions {
        let name = if t.institution.is_empty() { "Unknown" } else { &t.institution };
        let acct = by_name.entry(name).or_insert_with(|| Account {
            name: name.to_string(),
            kind: AccountKind::infer(name),
            txn_count: 0,
            total_spend: Decimal::ZERO,
            total_income: Decimal::ZERO,
        });
        acct.txn_count += 1;
        if t.amount < Decimal::ZERO {
            acct.total_spend += t.amount.abs();
        } else {
            acct.total_income += t.amount;
        }
    }

    let mut accounts: Vec<Account> = by_name.into_values().collect();
    accounts.sort_by(|a, b| b.txn_count.cmp(&a.txn_count));
    accounts
}

/// Session-scoped account state: the current derived set plus a designated
/// default account name that survives recomputation until explicitly
/// changed or cleared.
#[derive(Debug, Default, Clone)]
pub struct AccountBook {
    accounts: Vec<Account>,
    default_account: Option<String>,
}

impl AccountBook {
    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn recompute(&mut self, transactions: &[Transaction]) -> &[Account] {
        self.accounts = extract_accounts(transactions);
        &self.accounts
    }

    pub fn default_account(&self) -> Option<&str> {
        self.default_account.as_deref()
    }

    pub fn set_default_account(&mut self, name: impl Into<String>) {
        self.default_account = Some(name.into());
    }

    pub fn clear_default_account(&mut self) {
        self.default_account = None;
    }
}

/// Institution color palette, cycled by position in the account list.
pub const INSTITUTION_COLORS: &[&str] = &[
    "#6366f1", "#ec4899", "#10b981", "#f59e0b", "#3b82f6",
    "#f97316", "#06b6d4", "#a78bfa", "#ef4444", "#64748b",
];

pub fn institution_color(index: usize) -> &'static str {
    INSTITUTION_COLORS[index % INSTITUTION_COLORS.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn txn(institution: &str, amount: &str) -> Transaction {
        Transaction {
            date: NaiveDate::from_ymd_opt(2025, 1, 15),
            date_str: "Jan 15, 2025".to_string(),
            vendor: "Vendor".to_string(),
            amount: Decimal::from_str(amount).unwrap(),
            category: None,
            source_category: String::new(),
            currency: "USD".to_string(),
            description: String::new(),
            institution: institution.to_string(),
            raw: String::new(),
        }
    }

    #[test]
    fn kind_inference_buckets() {
        assert_eq!(AccountKind::infer("Amex Platinum Card"), AccountKind::CreditCard);
        assert_eq!(AccountKind::infer("Ally Savings"), AccountKind::Savings);
        assert_eq!(AccountKind::infer("Fidelity Brokerage"), AccountKind::Investment);
        assert_eq!(AccountKind::infer("Chase Checking"), AccountKind::Checking);
        assert_eq!(AccountKind::infer("Some Bank"), AccountKind::Checking);
    }

    #[test]
    fn credit_bucket_wins_over_savings() {
        // "card" is checked before "saving".
        assert_eq!(AccountKind::infer("Savings Card"), AccountKind::CreditCard);
    }

    #[test]
    fn extraction_aggregates_flows_per_institution() {
        let txns = vec![
            txn("Chase Checking", "-45.20"),
            txn("Chase Checking", "-10.00"),
            txn("Chase Checking", "2000.00"),
            txn("Amex Card", "-99.99"),
        ];
        let accounts = extract_accounts(&txns);
        assert_eq!(accounts.len(), 2);
        // Most active first.
        assert_eq!(accounts[0].name, "Chase Checking");
        assert_eq!(accounts[0].txn_count, 3);
        assert_eq!(accounts[0].total_spend, Decimal::from_str("55.20").unwrap());
        assert_eq!(accounts[0].total_income, Decimal::from_str("2000.00").unwrap());
        assert_eq!(accounts[1].kind, AccountKind::CreditCard);
    }

    #[test]
    fn default_account_survives_recompute() {
        let mut book = AccountBook::default();
        book.recompute(&[txn("Chase Checking", "-5.00")]);
        book.set_default_account("Chase Checking");
        book.recompute(&[txn("Ally Savings", "100.00")]);
        assert_eq!(book.default_account(), Some("Chase Checking"));
        book.clear_default_account();
        assert_eq!(book.default_account(), None);
    }

    #[test]
    fn institution_palette_cycles() {
        assert_eq!(institution_color(0), institution_color(INSTITUTION_COLORS.len()));
    }
}
