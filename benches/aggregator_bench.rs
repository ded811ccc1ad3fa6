//! Criterion benchmarks for report parsing and per-user aggregation

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;

use copilot_usage::services::{parse_ndjson, Aggregator};

const IDES: [&str; 3] = ["vscode", "jetbrains", "neovim"];
const FEATURES: [&str; 3] = ["code_completion", "chat_panel", "agent_edit"];
const LANGUAGES: [&str; 4] = ["rust", "python", "typescript", "go"];

/// Build a 28-day report for `users` users, one record per user per day
fn synthetic_report(users: usize) -> String {
    let mut out = String::new();
    for u in 0..users {
        for d in 1..=28 {
            let ide = IDES[(u + d) % IDES.len()];
            let feature = FEATURES[d % FEATURES.len()];
            let language = LANGUAGES[u % LANGUAGES.len()];
            out.push_str(&format!(
                concat!(
                    r#"{{"day":"2025-02-{:02}","user_login":"user-{}","#,
                    r#""user_initiated_interaction_count":{},"code_generation_activity_count":{},"#,
                    r#""code_acceptance_activity_count":{},"loc_added_sum":{},"#,
                    r#""totals_by_ide":[{{"ide":"{}","user_initiated_interaction_count":{}}}],"#,
                    r#""totals_by_feature":[{{"feature":"{}","code_generation_activity_count":{}}}],"#,
                    r#""totals_by_language_feature":[{{"language":"{}","feature":"{}","code_generation_activity_count":{}}}],"#,
                    r#""totals_by_model_feature":[{{"model":"gpt-4o","feature":"{}","code_acceptance_activity_count":{}}}]}}"#,
                    "\n"
                ),
                d, u, u + d, d, d / 2, d * 3,
                ide, u + d,
                feature, d,
                language, feature, d,
                feature, d / 2,
            ));
        }
    }
    out
}

fn bench_parse_ndjson(c: &mut Criterion) {
    let mut group = c.benchmark_group("feed");

    for users in [100, 1_000] {
        let report = synthetic_report(users);
        group.throughput(Throughput::Bytes(report.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("parse_ndjson", format!("{} users", users)),
            &report,
            |b, text| {
                b.iter(|| parse_ndjson(black_box(text)));
            },
        );
    }

    group.finish();
}

fn bench_per_user(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregator");

    for users in [100, 1_000] {
        let records = parse_ndjson(&synthetic_report(users));
        group.throughput(Throughput::Elements(records.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("per_user", format!("{} users", users)),
            &records,
            |b, records| {
                b.iter(|| Aggregator::per_user(black_box(records)));
            },
        );
    }

    group.finish();
}

fn bench_load_pipeline(c: &mut Criterion) {
    let report = synthetic_report(1_000);

    let mut group = c.benchmark_group("pipeline");
    group.sample_size(20);
    group.throughput(Throughput::Bytes(report.len() as u64));

    group.bench_function("parse_and_aggregate", |b| {
        b.iter(|| {
            let records = parse_ndjson(black_box(&report));
            Aggregator::per_user(&records)
        });
    });

    group.finish();
}

criterion_group!(benches, bench_parse_ndjson, bench_per_user, bench_load_pipeline);
criterion_main!(benches);
