pub mod analyzer;
pub mod categorizer;
pub mod filter;
pub mod report;

pub use analyzer::{analyze, Analysis, CategoryRollup, DailyFlow, InstitutionRollup, MerchantRollup};
pub use categorizer::{Categorizer, ClassifierConfig};
pub use filter::{apply_filters, FilterSelection};
