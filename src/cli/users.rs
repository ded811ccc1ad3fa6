//! `copilot-usage users` subcommand

use std::path::PathBuf;

use clap::Args;

use super::{print_envelope, ApiArgs};
use crate::tui::widgets::users::{format_number, truncate_label};
use crate::types::{Envelope, PerUserSeries, UsageSeries};

/// Print per-user totals
#[derive(Args, Debug)]
pub struct UsersArgs {
    /// Output the result envelope as JSON
    #[arg(long)]
    pub json: bool,

    /// Read a downloaded NDJSON report instead of calling the API
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,
}

impl UsersArgs {
    pub fn run(self, api: &ApiArgs) -> anyhow::Result<()> {
        let result = api.loader(self.file).and_then(|loader| {
            tracing::debug!(source = %loader.describe(), "loading usage");
            loader.load()
        });

        if self.json {
            let envelope: Envelope<UsageSeries> = match result {
                Ok(series) => Envelope::Ok { response: series },
                Err(e) => e.into(),
            };
            return print_envelope(&envelope);
        }

        let usage = result?;
        print!("{}", format_users_table(&usage.series));
        Ok(())
    }
}

/// Render the per-user totals as a plain-text table
pub fn format_users_table(series: &[PerUserSeries]) -> String {
    if series.is_empty() {
        return "No Copilot usage reported for this period\n".to_string();
    }

    let mut out = format!(
        "{:<24} {:>13} {:>12} {:>12} {:>11} {:>12}\n",
        "User", "Interactions", "Generations", "Acceptances", "LOC added", "LOC deleted"
    );
    for s in series {
        out.push_str(&format!(
            "{:<24} {:>13} {:>12} {:>12} {:>11} {:>12}\n",
            truncate_label(&s.user_login, 24),
            format_number(s.total_interactions),
            format_number(s.total_generations),
            format_number(s.total_acceptances),
            format_number(s.total_loc_added),
            format_number(s.total_loc_deleted),
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_users_table_rows_in_order() {
        let series = vec![
            PerUserSeries {
                user_login: "octocat".to_string(),
                total_interactions: 12_000,
                total_generations: 5,
                total_acceptances: 4,
                total_loc_added: 10,
                total_loc_deleted: 1,
                ..Default::default()
            },
            PerUserSeries {
                user_login: "monalisa".to_string(),
                total_interactions: 8,
                ..Default::default()
            },
        ];

        let table = format_users_table(&series);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("User"));
        assert!(lines[1].starts_with("octocat"));
        assert!(lines[1].contains("12,000"));
        assert!(lines[2].starts_with("monalisa"));
    }

    #[test]
    fn test_format_users_table_empty() {
        assert_eq!(
            format_users_table(&[]),
            "No Copilot usage reported for this period\n"
        );
    }
}
