//! Lenient NDJSON parsing for the per-user report feed
//!
//! Each line is parsed on its own. Lines that are not JSON objects, or that
//! lack a user login or day, are dropped without failing the whole feed.
//! Counters, labels and breakdown lists with unexpected types are coerced
//! rather than rejected.

use rayon::prelude::*;

use crate::types::UsageRecord;

/// Parse a single feed line. Returns `None` for anything unusable.
fn parse_line(line: &str) -> Option<UsageRecord> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }

    // simd-json parses in place
    let mut bytes = trimmed.as_bytes().to_vec();
    let record: UsageRecord = simd_json::from_slice(&mut bytes).ok()?;

    record.is_complete().then_some(record)
}

/// Parse newline-delimited usage records, preserving input order
pub fn parse_ndjson(text: &str) -> Vec<UsageRecord> {
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let records: Vec<UsageRecord> = lines.par_iter().filter_map(|l| parse_line(l)).collect();

    let dropped = lines.len() - records.len();
    if dropped > 0 {
        tracing::debug!(dropped, kept = records.len(), "skipped unusable feed lines");
    }

    records
}
