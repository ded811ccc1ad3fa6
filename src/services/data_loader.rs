//! Data loading: fetch or read the users report, then aggregate

use std::fs;
use std::path::PathBuf;

use super::aggregator::Aggregator;
use super::feed::parse_ndjson;
use super::fetcher::{ReportFetcher, ReportFilter};
use crate::types::{Result, UsageSeries};

/// Where usage records come from
pub enum UsageSource {
    /// Latest rolling-period report from the metrics API
    Remote {
        fetcher: ReportFetcher,
        filter: ReportFilter,
    },
    /// A previously downloaded NDJSON report
    File(PathBuf),
}

/// Loads per-user usage series from a single source.
/// Every call rebuilds the series from scratch.
pub struct DataLoaderService {
    source: UsageSource,
}

impl DataLoaderService {
    pub fn new(source: UsageSource) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &UsageSource {
        &self.source
    }

    /// Short description of the source for display
    pub fn describe(&self) -> String {
        match &self.source {
            UsageSource::Remote { fetcher, filter } => format!(
                "{} {} (latest 28 days)",
                fetcher.config().scope.label(),
                fetcher.entity_name(filter)
            ),
            UsageSource::File(path) => path.display().to_string(),
        }
    }

    pub fn load(&self) -> Result<UsageSeries> {
        match &self.source {
            UsageSource::Remote { fetcher, filter } => Ok(fetcher.usage_series(filter)?),
            UsageSource::File(path) => {
                let text = fs::read_to_string(path)?;
                let records = parse_ndjson(&text);
                tracing::debug!(path = %path.display(), records = records.len(), "read local report");
                Ok(UsageSeries {
                    series: Aggregator::per_user(&records),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UsageError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{"day":"2024-01-02","user_login":"alice","user_initiated_interaction_count":3}}"#
        )
        .unwrap();
        writeln!(file, "garbage").unwrap();
        writeln!(
            file,
            r#"{{"day":"2024-01-01","user_login":"alice","user_initiated_interaction_count":5}}"#
        )
        .unwrap();
        writeln!(
            file,
            r#"{{"day":"2024-01-01","user_login":"bob","user_initiated_interaction_count":9}}"#
        )
        .unwrap();

        let loader = DataLoaderService::new(UsageSource::File(file.path().to_path_buf()));
        let result = loader.load().unwrap();

        assert_eq!(result.series.len(), 2);
        assert_eq!(result.series[0].user_login, "bob");
        assert_eq!(result.series[1].total_interactions, 8);
        assert_eq!(result.series[1].daily[0].day, "2024-01-01");
    }

    #[test]
    fn test_load_from_empty_file() {
        let file = NamedTempFile::new().unwrap();
        let loader = DataLoaderService::new(UsageSource::File(file.path().to_path_buf()));
        assert!(loader.load().unwrap().series.is_empty());
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let loader = DataLoaderService::new(UsageSource::File(PathBuf::from(
            "tests/fixtures/nonexistent.ndjson",
        )));
        assert!(matches!(loader.load(), Err(UsageError::Io(_))));
    }

    #[test]
    fn test_describe_file_source() {
        let loader = DataLoaderService::new(UsageSource::File(PathBuf::from("report.ndjson")));
        assert_eq!(loader.describe(), "report.ndjson");
    }
}
