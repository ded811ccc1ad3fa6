//! `copilot-usage links` subcommand

use chrono::NaiveDate;
use clap::Args;
use super::{print_envelope, ApiArgs};
use crate::services::ReportFilter;
use crate::types::{DailyReportLinks, Envelope, PeriodReportLinks};

/// Print report download links
#[derive(Args, Debug)]
pub struct LinksArgs {
    /// Report day (YYYY-MM-DD); defaults to today (UTC)
    #[arg(long, value_name = "YYYY-MM-DD", conflicts_with = "latest")]
    pub day: Option<NaiveDate>,

    /// Latest 28-day report instead of a single day
    #[arg(long)]
    pub latest: bool,

    /// Output the result envelope as JSON
    #[arg(long)]
    pub json: bool,
}

impl LinksArgs {
    pub fn run(self, api: &ApiArgs) -> anyhow::Result<()> {
        let fetcher = match api.fetcher() {
            Ok(fetcher) => fetcher,
            Err(e) if self.json => return print_envelope(&Envelope::<()>::from(e)),
            Err(e) => return Err(e.into()),
        };
        let filter = ReportFilter {
            day: self.day,
            ..Default::default()
        };

        if self.latest {
            let result = fetcher.latest_report_links(&filter);
            if self.json {
                return print_envelope(&Envelope::from(result));
            }
            print!("{}", format_period_links(&result?));
        } else {
            let result = fetcher.daily_report_links(&filter);
            if self.json {
                return print_envelope(&Envelope::from(result));
            }
            print!("{}", format_daily_links(&result?));
        }
        Ok(())
    }
}

fn format_link_list(out: &mut String, links: &[String]) {
    if links.is_empty() {
        out.push_str("No download links available\n");
    }
    for link in links {
        out.push_str(link);
        out.push('\n');
    }
}

pub fn format_daily_links(links: &DailyReportLinks) -> String {
    let mut out = format!(
        "Report day: {}\n",
        links.report_day.as_deref().unwrap_or("unknown")
    );
    format_link_list(&mut out, &links.download_links);
    out
}

pub fn format_period_links(links: &PeriodReportLinks) -> String {
    let mut out = format!(
        "Report period: {} to {}\n",
        links.report_start_day.as_deref().unwrap_or("unknown"),
        links.report_end_day.as_deref().unwrap_or("unknown")
    );
    format_link_list(&mut out, &links.download_links);
    out
}
