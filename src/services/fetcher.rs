//! Report fetcher for the per-user Copilot usage metrics API
//!
//! Builds report URLs for the enterprise or organization scope, performs
//! authenticated requests, and turns the latest rolling-period report into
//! aggregated per-user series. Each request is made once; failures are
//! returned to the caller as [`ReportError`] without retrying.

use chrono::{NaiveDate, Utc};
use reqwest::blocking::{Client, Response};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::Url;
use serde::de::DeserializeOwned;

use super::aggregator::Aggregator;
use super::config::{ApiConfig, Scope};
use super::feed::parse_ndjson;
use crate::types::{DailyReportLinks, PeriodReportLinks, ReportError, UsageSeries};

/// GitHub REST media type
const GITHUB_JSON: &str = "application/vnd.github+json";

/// Header carrying the REST API version
const API_VERSION_HEADER: &str = "X-GitHub-Api-Version";

const USER_AGENT: &str = concat!("copilot-usage/", env!("CARGO_PKG_VERSION"));

/// Users report endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportPath {
    /// Single-day report, parameterized by `day`
    UsersOneDay,
    /// Latest 28-day rolling report
    UsersLatestPeriod,
}

impl ReportPath {
    fn segments(self) -> &'static [&'static str] {
        match self {
            Self::UsersOneDay => &["users-1-day"],
            Self::UsersLatestPeriod => &["users-28-day", "latest"],
        }
    }
}

/// Request parameters; empty identifiers fall back to the configured ones
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportFilter {
    pub day: Option<NaiveDate>,
    pub enterprise: String,
    pub organization: String,
}

/// Build the URL of a users report
///
/// `{base}/enterprises/{enterprise}/copilot/metrics/reports/{path}` or
/// `{base}/orgs/{organization}/copilot/metrics/reports/{path}`, with
/// `?day=YYYY-MM-DD` appended for the single-day report.
pub fn build_report_url(
    base: &str,
    scope: Scope,
    path: ReportPath,
    enterprise: &str,
    organization: &str,
    day: Option<NaiveDate>,
) -> Result<Url, ReportError> {
    let mut url = Url::parse(base)
        .map_err(|e| ReportError::Transport(format!("invalid API base URL '{}': {}", base, e)))?;

    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| ReportError::Transport(format!("API base URL '{}' cannot have a path", base)))?;
        segments.pop_if_empty();
        match scope {
            Scope::Enterprise => segments.extend(["enterprises", enterprise]),
            Scope::Organization => segments.extend(["orgs", organization]),
        };
        segments.extend(["copilot", "metrics", "reports"]);
        segments.extend(path.segments());
    }

    if let (ReportPath::UsersOneDay, Some(day)) = (path, day) {
        url.query_pairs_mut()
            .append_pair("day", &day.format("%Y-%m-%d").to_string());
    }

    Ok(url)
}

/// Fetches users reports from the metrics API
pub struct ReportFetcher {
    config: ApiConfig,
    client: Client,
}

impl ReportFetcher {
    /// Create a fetcher with a blocking HTTP client honoring the configured timeout
    pub fn new(config: ApiConfig) -> Result<Self, ReportError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ReportError::Transport(format!("HTTP client error: {}", e)))?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Enterprise and organization after applying configured defaults
    fn effective_ids<'a>(&'a self, filter: &'a ReportFilter) -> (&'a str, &'a str) {
        let enterprise = if filter.enterprise.is_empty() {
            self.config.enterprise.as_str()
        } else {
            filter.enterprise.as_str()
        };
        let organization = if filter.organization.is_empty() {
            self.config.organization.as_str()
        } else {
            filter.organization.as_str()
        };
        (enterprise, organization)
    }

    /// Name of the account a request targets, used in error messages
    pub fn entity_name(&self, filter: &ReportFilter) -> String {
        let (enterprise, organization) = self.effective_ids(filter);
        match self.config.scope {
            Scope::Enterprise => enterprise.to_string(),
            Scope::Organization => organization.to_string(),
        }
    }

    /// Download links for one day's users report. Defaults to today (UTC).
    pub fn daily_report_links(&self, filter: &ReportFilter) -> Result<DailyReportLinks, ReportError> {
        let day = filter.day.unwrap_or_else(|| Utc::now().date_naive());
        let (enterprise, organization) = self.effective_ids(filter);
        let url = build_report_url(
            &self.config.base_url,
            self.config.scope,
            ReportPath::UsersOneDay,
            enterprise,
            organization,
            Some(day),
        )?;
        self.get_json(url, &self.entity_name(filter))
    }

    /// Download links for the latest rolling-period users report
    pub fn latest_report_links(&self, filter: &ReportFilter) -> Result<PeriodReportLinks, ReportError> {
        let (enterprise, organization) = self.effective_ids(filter);
        let url = build_report_url(
            &self.config.base_url,
            self.config.scope,
            ReportPath::UsersLatestPeriod,
            enterprise,
            organization,
            None,
        )?;
        self.get_json(url, &self.entity_name(filter))
    }

    /// Per-user series for the latest rolling period
    ///
    /// A report without download links is an empty result, not an error.
    /// Only the first download link is read. A failed download names the
    /// entity of the configured scope, the same one the links request
    /// reports, so enterprise-scoped failures name the enterprise.
    pub fn usage_series(&self, filter: &ReportFilter) -> Result<UsageSeries, ReportError> {
        let links = self.latest_report_links(filter)?;

        let Some(link) = links.download_links.first() else {
            tracing::debug!("latest report has no download links");
            return Ok(UsageSeries::default());
        };

        let text = self.download(link, &self.entity_name(filter))?;
        let records = parse_ndjson(&text);
        Ok(UsageSeries {
            series: Aggregator::per_user(&records),
        })
    }

    /// Authenticated GET returning decoded JSON
    fn get_json<T: DeserializeOwned>(&self, url: Url, entity: &str) -> Result<T, ReportError> {
        tracing::debug!(%url, "requesting report metadata");

        let response = self
            .client
            .get(url)
            .header(ACCEPT, GITHUB_JSON)
            .header(AUTHORIZATION, format!("Bearer {}", self.config.token))
            .header(API_VERSION_HEADER, &self.config.version)
            .send()
            .map_err(|e| ReportError::Transport(format!("HTTP request failed: {}", e)))?;

        let response = ensure_success(response, entity)?;
        response
            .json()
            .map_err(|e| ReportError::Transport(format!("JSON parse error: {}", e)))
    }

    /// Plain GET of a pre-signed report download link
    fn download(&self, link: &str, entity: &str) -> Result<String, ReportError> {
        tracing::debug!(link, "downloading users report");

        let response = self
            .client
            .get(link)
            .send()
            .map_err(|e| ReportError::Transport(format!("HTTP request failed: {}", e)))?;

        ensure_success(response, entity)?
            .text()
            .map_err(|e| ReportError::Transport(format!("failed to read report body: {}", e)))
    }
}

fn ensure_success(response: Response, entity: &str) -> Result<Response, ReportError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    tracing::warn!(entity, status = status.as_u16(), "metrics request failed");
    Err(ReportError::Http {
        entity: entity.to_string(),
        status: status.as_u16(),
        reason: status.canonical_reason().map(str::to_string),
    })
}
