mod aggregator;
mod cache;
mod error;
mod fetcher;
mod groups;
pub mod tle;
mod types;

pub use aggregator::{Aggregator, CatalogSnapshot};
pub use cache::CacheStore;
pub use error::CatalogError;
pub use fetcher::GroupFetcher;
pub use groups::Group;
pub use types::{classify, CacheEnvelope, CatalogStatus, Category, Satellite};
