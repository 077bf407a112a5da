pub mod catalog;
mod error;
pub mod shorthand;
pub mod suggestion;
pub mod tooth;

pub use catalog::{Catalog, CatalogEntry, CatalogSummary, Category, normalize_code};
pub use error::CatalogError;
pub use rust_decimal::Decimal;
pub use suggestion::{
    Confidence, EnrichedSuggestion, RawSuggestion, ValidatedSuggestion, dedup_key,
};
