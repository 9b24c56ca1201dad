use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use spendlens_core::{Category, Transaction};

/// Aggregates over everything older than the current period boundary. Built
/// once at training time; the engine compares the live analysis against it.
#[derive(Debug, Clone, Default)]
pub struct Baseline {
    pub count: usize,
    pub total_spend: Decimal,
    pub total_income: Decimal,
    pub categories: BTreeMap<Category, CategoryBaseline>,
    pub institutions: BTreeMap<String, InstitutionBaseline>,
    pub avg_daily_spend: Decimal,
}

#[derive(Debug, Clone, Default)]
pub struct CategoryBaseline {
    /// Absolute amount sum.
    pub total: Decimal,
    pub count: usize,
}

#[derive(Debug, Clone, Default)]
pub struct InstitutionBaseline {
    pub spend: Decimal,
    pub income: Decimal,
    pub count: usize,
}

impl Baseline {
    pub fn has_data(&self) -> bool {
        self.count > 0
    }

    /// Aggregate the rows dated strictly before `boundary`. Undated rows
    /// belong to neither period and are ignored here.
    pub fn build<'a, I>(historical: I) -> Self
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        let mut baseline = Baseline::default();
        let mut min_date: Option<NaiveDate> = None;
        let mut max_date: Option<NaiveDate> = None;

        for t in historical {
            baseline.count += 1;
            if t.amount < Decimal::ZERO {
                baseline.total_spend += t.amount.abs();
            } else {
                baseline.total_income += t.amount;
            }

            let cat = baseline.categories.entry(t.category_or_default()).or_default();
            cat.total += t.amount.abs();
            cat.count += 1;

            let name = if t.institution.is_empty() { "Unknown" } else { &t.institution };
            let inst = baseline.institutions.entry(name.to_string()).or_default();
            if t.amount < Decimal::ZERO {
                inst.spend += t.amount.abs();
            } else {
                inst.income += t.amount;
            }
            inst.count += 1;

            if let Some(date) = t.date {
                min_date = Some(min_date.map_or(date, |d| d.min(date)));
                max_date = Some(max_date.map_or(date, |d| d.max(date)));
            }
        }

        if let (Some(min), Some(max)) = (min_date, max_date) {
            let span_days = (max - min).num_days().max(1);
            baseline.avg_daily_spend = baseline.total_spend / Decimal::from(span_days);
        }

        baseline
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn txn(date: &str, amount: &str, category: Category, inst: &str) -> Transaction {
        Transaction {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").ok(),
            date_str: date.to_string(),
            vendor: "Vendor".to_string(),
            amount: dec(amount),
            category: Some(category),
            source_category: String::new(),
            currency: "USD".to_string(),
            description: String::new(),
            institution: inst.to_string(),
            raw: String::new(),
        }
    }

    #[test]
    fn empty_baseline_has_no_data() {
        let txns: Vec<Transaction> = Vec::new();
        let b = Baseline::build(&txns);
        assert!(!b.has_data());
        assert_eq!(b.avg_daily_spend, Decimal::ZERO);
    }

    #[test]
    fn splits_spend_and_income() {
        let txns = vec![
            txn("2024-11-01", "-300.00", Category::Housing, "Chase"),
            txn("2024-11-05", "1000.00", Category::Income, "Chase"),
            txn("2024-11-11", "-100.00", Category::Shopping, "Amex"),
        ];
        let b = Baseline::build(&txns);
        assert!(b.has_data());
        assert_eq!(b.count, 3);
        assert_eq!(b.total_spend, dec("400.00"));
        assert_eq!(b.total_income, dec("1000.00"));
        assert_eq!(b.categories[&Category::Housing].total, dec("300.00"));
        assert_eq!(b.institutions["Amex"].spend, dec("100.00"));
        assert_eq!(b.institutions["Chase"].income, dec("1000.00"));
        // 10-day span, 400 spent.
        assert_eq!(b.avg_daily_spend, dec("40"));
    }

    #[test]
    fn single_day_span_clamps_to_one() {
        let txns = vec![txn("2024-11-01", "-50.00", Category::Shopping, "Chase")];
        let b = Baseline::build(&txns);
        assert_eq!(b.avg_daily_spend, dec("50.00"));
    }
}
