use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed spending taxonomy. Every transaction ends up in exactly one of
/// these; colors and icons are display metadata only and carry no weight in
/// aggregation beyond grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Income")]
    Income,
    #[serde(rename = "Housing")]
    Housing,
    #[serde(rename = "Food & Dining")]
    FoodDining,
    #[serde(rename = "Transportation")]
    Transportation,
    #[serde(rename = "Utilities")]
    Utilities,
    #[serde(rename = "Shopping")]
    Shopping,
    #[serde(rename = "Healthcare")]
    Healthcare,
    #[serde(rename = "Entertainment")]
    Entertainment,
    #[serde(rename = "Subscriptions")]
    Subscriptions,
    #[serde(rename = "Transfers/Fees")]
    TransfersFees,
    #[serde(rename = "Uncategorized")]
    Uncategorized,
}

/// Declaration order matters: keyword classification and existing-label
/// mapping both iterate this list front to back, first match wins.
pub const ALL_CATEGORIES: &[Category] = &[
    Category::Income,
    Category::Housing,
    Category::FoodDining,
    Category::Transportation,
    Category::Utilities,
    Category::Shopping,
    Category::Healthcare,
    Category::Entertainment,
    Category::Subscriptions,
    Category::TransfersFees,
    Category::Uncategorized,
];

impl Category {
    pub fn name(self) -> &'static str {
        match self {
            Category::Income => "Income",
            Category::Housing => "Housing",
            Category::FoodDining => "Food & Dining",
            Category::Transportation => "Transportation",
            Category::Utilities => "Utilities",
            Category::Shopping => "Shopping",
            Category::Healthcare => "Healthcare",
            Category::Entertainment => "Entertainment",
            Category::Subscriptions => "Subscriptions",
            Category::TransfersFees => "Transfers/Fees",
            Category::Uncategorized => "Uncategorized",
        }
    }

    /// The leading word of the canonical name, lowercased — the text before
    /// any `/` or `&`. Used for containment matching of source-provided
    /// category labels ("food stuff" → Food & Dining).
    pub fn primary_word(self) -> &'static str {
        match self {
            Category::Income => "income",
            Category::Housing => "housing",
            Category::FoodDining => "food",
            Category::Transportation => "transportation",
            Category::Utilities => "utilities",
            Category::Shopping => "shopping",
            Category::Healthcare => "healthcare",
            Category::Entertainment => "entertainment",
            Category::Subscriptions => "subscriptions",
            Category::TransfersFees => "transfers",
            Category::Uncategorized => "uncategorized",
        }
    }

    /// Display color (hex), for charts and chips.
    pub fn color(self) -> &'static str {
        match self {
            Category::Income => "#10b981",
            Category::Housing => "#6366f1",
            Category::FoodDining => "#f59e0b",
            Category::Transportation => "#3b82f6",
            Category::Utilities => "#06b6d4",
            Category::Shopping => "#ec4899",
            Category::Healthcare => "#ef4444",
            Category::Entertainment => "#a78bfa",
            Category::Subscriptions => "#f97316",
            Category::TransfersFees => "#64748b",
            Category::Uncategorized => "#475569",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Category::Income => "💰",
            Category::Housing => "🏠",
            Category::FoodDining => "🍽️",
            Category::Transportation => "🚗",
            Category::Utilities => "⚡",
            Category::Shopping => "🛍️",
            Category::Healthcare => "🏥",
            Category::Entertainment => "🎬",
            Category::Subscriptions => "📱",
            Category::TransfersFees => "🔄",
            Category::Uncategorized => "📋",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    /// Case-insensitive canonical-name lookup. Fuzzy mapping of arbitrary
    /// source labels lives in the categorizer, not here.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        ALL_CATEGORIES
            .iter()
            .copied()
            .find(|c| c.name().to_lowercase() == lower)
            .ok_or_else(|| format!("Unknown category: '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn display_matches_canonical_names() {
        assert_eq!(Category::FoodDining.to_string(), "Food & Dining");
        assert_eq!(Category::TransfersFees.to_string(), "Transfers/Fees");
    }

    #[test]
    fn from_str_is_case_insensitive() {
        assert_eq!(Category::from_str("food & dining").unwrap(), Category::FoodDining);
        assert_eq!(Category::from_str("INCOME").unwrap(), Category::Income);
        assert!(Category::from_str("vacation").is_err());
    }

    #[test]
    fn primary_word_stops_at_separator() {
        assert_eq!(Category::FoodDining.primary_word(), "food");
        assert_eq!(Category::TransfersFees.primary_word(), "transfers");
    }

    #[test]
    fn every_category_has_style_metadata() {
        for c in ALL_CATEGORIES {
            assert!(c.color().starts_with('#'));
            assert!(!c.icon().is_empty());
        }
    }
}
