//! copilot-usage - per-user GitHub Copilot usage from the metrics reports API

pub mod cli;
pub mod services;
pub mod tui;
pub mod types;
