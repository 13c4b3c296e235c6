pub mod account;
pub mod trade;

pub use account::Account;
pub use trade::{GradeImporter, ImporterSummary, TradeFields, TradeRecord};
