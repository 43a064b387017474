use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use std::path::Path;

use mailtriage::ingest::{self, InputFormat, LoadOptions};
use mailtriage::model::email::RawEmail;
use mailtriage::triage::{enrich_batch, enrich_batch_with, TriageOptions};

fn synthetic_batch(n: usize) -> Vec<RawEmail> {
    (0..n)
        .map(|i| {
            let body = match i % 4 {
                0 => "Our checkout is down in production, please help immediately. Call +1 555-010-0199.",
                1 => "Thanks for the great support! I need a copy of my invoice. Order: INV-2041",
                2 => "I cannot access the dashboard and I am frustrated. Reach me at ops@example.com.",
                _ => "Quick question about the Starter plan upgrade, can you help?",
            };
            RawEmail::new(
                format!("user.{i}@example.com"),
                "Support request",
                body,
                Some(format!("2024-01-{:02} 10:00", i % 28 + 1)),
            )
        })
        .collect()
}

fn bench_enrich_batch(c: &mut Criterion) {
    let batch = synthetic_batch(1_000);

    c.bench_function("enrich_batch_1000", |b| {
        b.iter(|| enrich_batch(black_box(&batch)))
    });

    let sequential = TriageOptions {
        parallel_threshold: usize::MAX,
        ..TriageOptions::default()
    };
    c.bench_function("enrich_batch_1000_sequential", |b| {
        b.iter(|| enrich_batch_with(black_box(&batch), &sequential))
    });
}

fn bench_load_mbox(c: &mut Criterion) {
    let fixture_path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("support.mbox");

    c.bench_function("load_support_mbox", |b| {
        b.iter(|| {
            ingest::load(&fixture_path, InputFormat::Mbox, &LoadOptions::default()).unwrap()
        })
    });
}

criterion_group!(benches, bench_enrich_batch, bench_load_mbox);
criterion_main!(benches);
