//! ledgerlift-core: shared types for statement table extraction.

pub mod config;
pub mod date;
pub mod geometry;
pub mod money;
pub mod page;
pub mod transaction;

pub use config::ExtractorConfig;
pub use date::{first_inline_date, is_date_token, parse_statement_date};
pub use geometry::{reading_order, BBox, Word};
pub use money::{format_money, is_currency_shaped, numeric_value, parse_money};
pub use page::{Document, PageWords, TextLine};
pub use transaction::{ExtractionEnvelope, ExtractionStatus, LayoutVariant, TransactionRow};
