//! Normalization, filtering and aggregation over an in-memory title catalog.
//!
//! Build a [`CatalogStore`] once from raw rows, wrap it in an [`AnalyticsEngine`], then issue
//! any number of [`AnalyticsEngine::query`] calls. Nothing in this crate mutates a record after
//! the store is built, so a single engine can be shared across threads behind an `Arc`.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod expand;
pub mod normalize;
pub mod query;
pub mod settings;
pub mod store;

pub use config::{load_engine, CatalogConfig};
pub use error::{CriteriaIssue, QueryError, RecordRejected};
pub use expand::{expand, MultiValueField};
pub use normalize::{normalize, parse_date_added, parse_duration, try_normalize, ParsedDuration};
pub use query::{key_metrics, AnalyticsEngine};
pub use settings::AnalyticsSettings;
pub use store::{CatalogStore, LoadReport};

pub const CRATE_NAME: &str = "catalog-engine";
