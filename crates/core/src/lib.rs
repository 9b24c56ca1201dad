pub mod account;
pub mod category;
pub mod normalize;
pub mod transaction;

pub use account::{extract_accounts, Account, AccountBook, AccountKind};
pub use category::Category;
pub use normalize::{format_date, parse_amount, parse_date};
pub use transaction::Transaction;
