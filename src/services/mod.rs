//! Services for fetching, parsing, and aggregating usage reports

pub mod aggregator;
pub mod config;
pub mod data_loader;
pub mod feed;
pub mod fetcher;

pub use aggregator::{Aggregator, LanguageRollup};
pub use config::{ApiConfig, Scope};
pub use data_loader::{DataLoaderService, UsageSource};
pub use feed::parse_ndjson;
pub use fetcher::{build_report_url, ReportFetcher, ReportFilter, ReportPath};
