use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use spendlens_core::{category::ALL_CATEGORIES, Category, Transaction};

/// Keyword list for one category. Declaration order of these entries is the
/// tie-break: classification scans them front to back and the first
/// containment hit wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryKeywords {
    pub category: Category,
    pub keywords: Vec<String>,
}

/// Synonym for mapping source-provided category labels onto the taxonomy
/// ("groceries" → Food & Dining).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Synonym {
    pub term: String,
    pub category: Category,
}

/// Immutable classification tables, injected at construction. The built-in
/// default carries the curated merchant/term lists; a deployment can swap in
/// its own via TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    pub keywords: Vec<CategoryKeywords>,
    pub synonyms: Vec<Synonym>,
    /// Positive amounts above this are classified Income even without a
    /// keyword hit — large unlabeled deposits are more likely payroll than
    /// expense refunds.
    pub income_threshold: Decimal,
}

impl ClassifierConfig {
    pub fn from_toml(toml_content: &str) -> Result<Self, String> {
        toml::from_str(toml_content).map_err(|e| format!("Failed to parse TOML: {e}"))
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        let kw = |category, words: &[&str]| CategoryKeywords {
            category,
            keywords: words.iter().map(|s| s.to_string()).collect(),
        };
        let syn = |term: &str, category| Synonym { term: term.to_string(), category };

        ClassifierConfig {
            keywords: vec![
                kw(Category::Income, &[
                    "payroll", "salary", "direct deposit", "income", "dividend",
                    "interest earned", "refund", "cashback", "reimbursement",
                    "venmo from", "zelle from", "deposit",
                ]),
                kw(Category::Housing, &[
                    "rent", "mortgage", "hoa", "property tax", "home insurance",
                    "landlord", "apartment", "lease", "housing", "real estate", "realty",
                ]),
                kw(Category::FoodDining, &[
                    "restaurant", "cafe", "coffee", "starbucks", "mcdonald", "chipotle",
                    "grubhub", "doordash", "uber eats", "instacart", "whole foods",
                    "trader joe", "kroger", "safeway", "grocery", "food", "pizza",
                    "burger", "sushi", "taco", "diner", "bakery", "dunkin", "panera",
                    "chick-fil-a", "wendy", "subway", "panda express", "domino",
                    "popeye", "five guys", "shake shack", "sweetgreen", "postmates",
                ]),
                kw(Category::Transportation, &[
                    "uber", "lyft", "gas", "shell", "chevron", "exxon", "bp ",
                    "parking", "toll", "transit", "metro", "subway fare", "amtrak",
                    "airline", "delta", "united", "american air", "southwest",
                    "car wash", "auto", "vehicle", "fuel", "speedway", "wawa gas",
                ]),
                kw(Category::Utilities, &[
                    "electric", "water", "gas bill", "internet", "comcast", "verizon",
                    "at&t", "att", "t-mobile", "spectrum", "utility", "power", "sewer",
                    "trash", "waste", "phone bill", "xfinity",
                ]),
                kw(Category::Shopping, &[
                    "amazon", "walmart", "target", "best buy", "costco", "etsy",
                    "ebay", "nordstrom", "macy", "nike", "adidas", "zara", "h&m",
                    "gap", "old navy", "ikea", "home depot", "lowe", "clothing",
                    "apparel", "shop", "store", "retail", "purchase", "apple store",
                ]),
                kw(Category::Healthcare, &[
                    "pharmacy", "cvs", "walgreens", "doctor", "hospital", "medical",
                    "dental", "vision", "health", "insurance premium", "clinic",
                    "urgent care", "lab", "prescription", "therapy", "optometrist",
                ]),
                kw(Category::Entertainment, &[
                    "netflix", "hulu", "disney", "hbo", "movie", "theater", "cinema",
                    "concert", "ticket", "event", "game", "steam", "playstation",
                    "xbox", "twitch", "spotify", "apple music", "youtube premium",
                    "museum", "zoo", "amusement", "bowling", "golf", "gym",
                ]),
                kw(Category::Subscriptions, &[
                    "subscription", "membership", "monthly", "annual fee", "prime",
                    "cloud storage", "dropbox", "google one", "icloud", "adobe",
                    "microsoft 365", "notion", "slack", "zoom", "canva",
                    "linkedin premium", "patreon", "substack",
                ]),
                kw(Category::TransfersFees, &[
                    "transfer", "fee", "atm", "withdrawal", "wire", "overdraft",
                    "service charge", "maintenance fee", "late fee", "interest charge",
                    "finance charge", "venmo to", "zelle to", "paypal", "cash app",
                    "payment to",
                ]),
            ],
            synonyms: vec![
                syn("food", Category::FoodDining),
                syn("dining", Category::FoodDining),
                syn("restaurant", Category::FoodDining),
                syn("groceries", Category::FoodDining),
                syn("travel", Category::Transportation),
                syn("transport", Category::Transportation),
                syn("auto", Category::Transportation),
                syn("gas", Category::Transportation),
                syn("bills", Category::Utilities),
                syn("utility", Category::Utilities),
                syn("health", Category::Healthcare),
                syn("medical", Category::Healthcare),
                syn("fun", Category::Entertainment),
                syn("leisure", Category::Entertainment),
                syn("home", Category::Housing),
                syn("rent", Category::Housing),
                syn("mortgage", Category::Housing),
                syn("personal", Category::Shopping),
                syn("retail", Category::Shopping),
                syn("transfer", Category::TransfersFees),
                syn("fee", Category::TransfersFees),
                syn("bank", Category::TransfersFees),
                syn("income", Category::Income),
                syn("salary", Category::Income),
                syn("paycheck", Category::Income),
            ],
            income_threshold: Decimal::from(500),
        }
    }
}

/// Deterministic, total classifier: every transaction gets exactly one
/// category from the closed taxonomy.
#[derive(Debug, Clone, Default)]
pub struct Categorizer {
    config: ClassifierConfig,
}

impl Categorizer {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    /// Assign a category to every transaction in the set.
    pub fn categorize(&self, transactions: Vec<Transaction>) -> Vec<Transaction> {
        let categorized: Vec<Transaction> = transactions
            .into_iter()
            .map(|mut t| {
                t.category = Some(self.classify(&t));
                t
            })
            .collect();
        let unmatched = categorized
            .iter()
            .filter(|t| t.category == Some(Category::Uncategorized))
            .count();
        tracing::debug!(total = categorized.len(), unmatched, "categorized transactions");
        categorized
    }

    /// Classify one transaction. Precedence: source-provided label mapping,
    /// then Income keywords / magnitude for positive amounts, then the
    /// non-Income keyword lists in declaration order, then Uncategorized.
    pub fn classify(&self, txn: &Transaction) -> Category {
        if !txn.source_category.is_empty() {
            if let Some(mapped) = self.map_existing_label(&txn.source_category) {
                return mapped;
            }
        }

        let search = format!("{} {}", txn.vendor, txn.description).to_lowercase();

        if txn.amount > Decimal::ZERO {
            if let Some(income) = self.keyword_list(Category::Income) {
                if income.iter().any(|kw| search.contains(kw.as_str())) {
                    return Category::Income;
                }
            }
            if txn.amount > self.config.income_threshold {
                return Category::Income;
            }
        }

        for entry in &self.config.keywords {
            if entry.category == Category::Income {
                continue;
            }
            if entry.keywords.iter().any(|kw| search.contains(kw.as_str())) {
                return entry.category;
            }
        }

        Category::Uncategorized
    }

    /// Map an arbitrary source category label onto the taxonomy: exact
    /// canonical name, containment of the canonical name's primary word,
    /// then the synonym table. First hit wins.
    fn map_existing_label(&self, label: &str) -> Option<Category> {
        let lower = label.trim().to_lowercase();
        if lower.is_empty() {
            return None;
        }
        for &cat in ALL_CATEGORIES {
            if lower == cat.name().to_lowercase() || lower.contains(cat.primary_word()) {
                return Some(cat);
            }
        }
        self.config
            .synonyms
            .iter()
            .find(|s| lower.contains(s.term.as_str()))
            .map(|s| s.category)
    }

    fn keyword_list(&self, category: Category) -> Option<&Vec<String>> {
        self.config
            .keywords
            .iter()
            .find(|e| e.category == category)
            .map(|e| &e.keywords)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn txn(vendor: &str, amount: &str, source_category: &str) -> Transaction {
        Transaction {
            date: NaiveDate::from_ymd_opt(2025, 1, 15),
            date_str: "Jan 15, 2025".to_string(),
            vendor: vendor.to_string(),
            amount: Decimal::from_str(amount).unwrap(),
            category: None,
            source_category: source_category.to_string(),
            currency: "USD".to_string(),
            description: String::new(),
            institution: "Unknown".to_string(),
            raw: String::new(),
        }
    }

    fn classifier() -> Categorizer {
        Categorizer::default()
    }

    #[test]
    fn source_label_exact_match_short_circuits() {
        // Vendor keywords would say Shopping; the label wins.
        let t = txn("Amazon", "-20.00", "Entertainment");
        assert_eq!(classifier().classify(&t), Category::Entertainment);
    }

    #[test]
    fn source_label_synonym_mapping() {
        assert_eq!(classifier().classify(&txn("X", "-5.00", "groceries")), Category::FoodDining);
        assert_eq!(classifier().classify(&txn("X", "100.00", "paycheck")), Category::Income);
        assert_eq!(classifier().classify(&txn("X", "-5.00", "monthly bills")), Category::Utilities);
    }

    #[test]
    fn unknown_source_label_falls_through_to_keywords() {
        let t = txn("Starbucks", "-4.50", "misc stuff");
        assert_eq!(classifier().classify(&t), Category::FoodDining);
    }

    #[test]
    fn income_keywords_checked_first_for_positive_amounts() {
        let t = txn("ACME Payroll", "250.00", "");
        assert_eq!(classifier().classify(&t), Category::Income);
    }

    #[test]
    fn large_deposit_heuristic() {
        // No keyword match either way; only the magnitude differs.
        assert_eq!(classifier().classify(&txn("Xyzzy", "600.00", "")), Category::Income);
        assert_ne!(classifier().classify(&txn("Xyzzy", "400.00", "")), Category::Income);
    }

    #[test]
    fn positive_amount_can_still_match_expense_keywords() {
        // A small refund-looking credit at a merchant maps to the merchant's
        // category, not Income.
        let t = txn("Target", "25.00", "");
        assert_eq!(classifier().classify(&t), Category::Shopping);
    }

    #[test]
    fn declaration_order_breaks_keyword_ties() {
        // "gas" appears in Transportation before Utilities' "gas bill" can
        // ever be reached.
        let t = txn("Shell Gas Station", "-40.00", "");
        assert_eq!(classifier().classify(&t), Category::Transportation);
    }

    #[test]
    fn no_match_is_uncategorized_and_total() {
        let t = txn("Zzyzx Holdings", "-13.37", "");
        assert_eq!(classifier().classify(&t), Category::Uncategorized);
    }

    #[test]
    fn classification_is_deterministic() {
        let t = txn("Netflix", "-15.49", "");
        let c = classifier();
        assert_eq!(c.classify(&t), c.classify(&t));
        assert_eq!(c.classify(&t), Category::Entertainment);
    }

    #[test]
    fn categorize_sets_category_on_every_row() {
        let txns = vec![txn("Uber", "-12.00", ""), txn("Mystery", "-1.00", "")];
        let out = classifier().categorize(txns);
        assert!(out.iter().all(|t| t.category.is_some()));
        assert_eq!(out[0].category, Some(Category::Transportation));
        assert_eq!(out[1].category, Some(Category::Uncategorized));
    }

    #[test]
    fn config_round_trips_through_toml() {
        let toml_src = r#"
            income_threshold = "250"

            [[keywords]]
            category = "Food & Dining"
            keywords = ["ramen"]

            [[synonyms]]
            term = "eats"
            category = "Food & Dining"
        "#;
        let config = ClassifierConfig::from_toml(toml_src).unwrap();
        let c = Categorizer::new(config);
        assert_eq!(c.classify(&txn("Ichiran Ramen", "-18.00", "")), Category::FoodDining);
        assert_eq!(c.classify(&txn("X", "300.00", "")), Category::Income);
        assert_eq!(c.classify(&txn("X", "-5.00", "eats out")), Category::FoodDining);
    }

    #[test]
    fn bad_toml_is_an_error() {
        assert!(ClassifierConfig::from_toml("not valid [").is_err());
    }
}
