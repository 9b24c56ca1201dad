use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use spendlens_core::{Category, Transaction};

pub const TOP_MERCHANT_LIMIT: usize = 5;

/// The derived aggregate snapshot over one transaction set. Treated as
/// immutable once produced: every rendering surface and the assistant read
/// from this object and never re-derive figures from raw transactions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    /// Sum of absolute values of all negative amounts.
    pub total_spend: Decimal,
    /// Sum of all positive amounts.
    pub total_income: Decimal,
    /// total_income − total_spend.
    pub net_flow: Decimal,
    pub transaction_count: usize,
    /// Sorted descending by abs_total; "top category" is the first
    /// non-Income entry of this list.
    pub categories: Vec<CategoryRollup>,
    /// Sorted descending by spend.
    pub institutions: Vec<InstitutionRollup>,
    /// Sorted ascending by ISO date string; null-dated rows are skipped.
    pub daily_trend: Vec<DailyFlow>,
    /// Expense merchants only, descending by absolute total, top 5.
    pub top_merchants: Vec<MerchantRollup>,
    /// institution × category matrix of absolute amount sums.
    pub cross_tab: BTreeMap<String, BTreeMap<Category, Decimal>>,
    /// The analyzed set itself, for drill-down views.
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryRollup {
    pub category: Category,
    /// Display color and icon, denormalized for rendering surfaces.
    pub color: &'static str,
    pub icon: &'static str,
    /// Signed sum — negative for expense categories.
    pub total: Decimal,
    pub abs_total: Decimal,
    pub count: usize,
    /// Signed total / count; negative for expense categories, consistent
    /// with the signed-amount convention.
    pub avg: Decimal,
    pub transactions: Vec<Transaction>,
    /// Top merchants scoped to this category's transactions.
    pub merchants: Vec<MerchantRollup>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstitutionRollup {
    pub name: String,
    /// Signed sum across the institution.
    pub total: Decimal,
    /// Sum of absolute values of negative amounts.
    pub spend: Decimal,
    /// Sum of positive amounts.
    pub income: Decimal,
    pub count: usize,
    /// Per-category absolute amount breakdown.
    pub categories: BTreeMap<Category, Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyFlow {
    /// ISO `YYYY-MM-DD`; lexicographic order is chronological order.
    pub date: String,
    pub spend: Decimal,
    pub income: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MerchantRollup {
    pub name: String,
    /// Sum of absolute amounts.
    pub total: Decimal,
    pub count: usize,
}

/// Compute the full Analysis for a transaction set. Pure and deterministic:
/// the same input always produces a structurally identical result, and the
/// caller owns the returned value (nothing is cached here).
pub fn analyze(transactions: &[Transaction]) -> Analysis {
    let total_spend: Decimal = transactions
        .iter()
        .filter(|t| t.amount < Decimal::ZERO)
        .map(|t| t.amount.abs())
        .sum();
    let total_income: Decimal = transactions
        .iter()
        .filter(|t| t.amount > Decimal::ZERO)
        .map(|t| t.amount)
        .sum();

    let expenses: Vec<&Transaction> =
        transactions.iter().filter(|t| t.amount < Decimal::ZERO).collect();

    Analysis {
        total_spend,
        total_income,
        net_flow: total_income - total_spend,
        transaction_count: transactions.len(),
        categories: by_category(transactions),
        institutions: by_institution(transactions),
        daily_trend: daily_trend(transactions),
        top_merchants: top_merchants(expenses.iter().copied(), TOP_MERCHANT_LIMIT),
        cross_tab: cross_tab(transactions),
        transactions: transactions.to_vec(),
    }
}

fn by_category(transactions: &[Transaction]) -> Vec<CategoryRollup> {
    let mut groups: BTreeMap<Category, Vec<&Transaction>> = BTreeMap::new();
    for t in transactions {
        groups.entry(t.category_or_default()).or_default().push(t);
    }

    let mut rollups: Vec<CategoryRollup> = groups
        .into_iter()
        .map(|(category, members)| {
            let total: Decimal = members.iter().map(|t| t.amount).sum();
            let count = members.len();
            CategoryRollup {
                category,
                color: category.color(),
                icon: category.icon(),
                total,
                abs_total: total.abs(),
                count,
                avg: total / Decimal::from(count as i64),
                merchants: top_merchants(members.iter().copied(), TOP_MERCHANT_LIMIT),
                transactions: members.into_iter().cloned().collect(),
            }
        })
        .collect();
    // Largest magnitude first; this ordering is load-bearing for "top
    // category" consumers.
    rollups.sort_by(|a, b| b.abs_total.cmp(&a.abs_total));
    rollups
}

fn by_institution(transactions: &[Transaction]) -> Vec<InstitutionRollup> {
    let mut groups: BTreeMap<&str, Vec<&Transaction>> = BTreeMap::new();
    for t in transactions {
        let name = if t.institution.is_empty() { "Unknown" } else { &t.institution };
        groups.entry(name).or_default().push(t);
    }

    let mut rollups: Vec<InstitutionRollup> = groups
        .into_iter()
        .map(|(name, members)| {
            let mut spend = Decimal::ZERO;
            let mut income = Decimal::ZERO;
            let mut categories: BTreeMap<Category, Decimal> = BTreeMap::new();
            for t in &members {
                if t.amount < Decimal::ZERO {
                    spend += t.amount.abs();
                } else {
                    income += t.amount;
                }
                *categories.entry(t.category_or_default()).or_insert(Decimal::ZERO) +=
                    t.amount.abs();
            }
            InstitutionRollup {
                name: name.to_string(),
                total: members.iter().map(|t| t.amount).sum(),
                spend,
                income,
                count: members.len(),
                categories,
            }
        })
        .collect();
    rollups.sort_by(|a, b| b.spend.cmp(&a.spend));
    rollups
}

fn daily_trend(transactions: &[Transaction]) -> Vec<DailyFlow> {
    let mut days: BTreeMap<String, (Decimal, Decimal)> = BTreeMap::new();
    for t in transactions {
        // Null-dated rows are retained in the set but skipped here.
        let Some(date) = t.date else { continue };
        let entry = days.entry(date.format("%Y-%m-%d").to_string()).or_default();
        if t.amount < Decimal::ZERO {
            entry.0 += t.amount.abs();
        } else {
            entry.1 += t.amount;
        }
    }
    // BTreeMap iteration is ascending by date string, which is
    // chronological for ISO dates.
    days.into_iter()
        .map(|(date, (spend, income))| DailyFlow { date, spend, income })
        .collect()
}

/// Rank merchants by absolute amount within any transaction subset.
pub fn top_merchants<'a, I>(transactions: I, limit: usize) -> Vec<MerchantRollup>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut merchants: BTreeMap<&str, (Decimal, usize)> = BTreeMap::new();
    for t in transactions {
        let name = if t.vendor.is_empty() { "Unknown" } else { &t.vendor };
        let entry = merchants.entry(name).or_default();
        entry.0 += t.amount.abs();
        entry.1 += 1;
    }
    let mut rollups: Vec<MerchantRollup> = merchants
        .into_iter()
        .map(|(name, (total, count))| MerchantRollup { name: name.to_string(), total, count })
        .collect();
    rollups.sort_by(|a, b| b.total.cmp(&a.total));
    rollups.truncate(limit);
    rollups
}

fn cross_tab(transactions: &[Transaction]) -> BTreeMap<String, BTreeMap<Category, Decimal>> {
    let mut tab: BTreeMap<String, BTreeMap<Category, Decimal>> = BTreeMap::new();
    for t in transactions {
        let name = if t.institution.is_empty() { "Unknown" } else { &t.institution };
        *tab.entry(name.to_string())
            .or_default()
            .entry(t.category_or_default())
            .or_insert(Decimal::ZERO) += t.amount.abs();
    }
    tab
}
