use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use fco_pipeline::gold_stats::build_gold;
use fco_pipeline::goal_time;
use fco_pipeline::meta::{MetaKind, MetaTables};
use fco_pipeline::raw::{RawMatch, parse_raw_match};
use fco_pipeline::silver::{self, NormalizedMatch};
use fco_pipeline::zone;

fn sample_meta() -> MetaTables {
    MetaTables::default()
        .with_entries(
            MetaKind::Player,
            [(241206517, "Player X"), (241100001, "Helper"), (300200001, "Rival Star")],
        )
        .with_entries(MetaKind::Season, [(241, "24TOTY"), (300, "ICON")])
        .with_entries(MetaKind::MatchType, [(50, "공식경기")])
        .with_entries(MetaKind::Position, [(14, "CM"), (25, "ST")])
}

fn sample_batch(n: usize) -> Vec<RawMatch> {
    let base = parse_raw_match(MATCH_JSON).unwrap();
    (0..n)
        .map(|i| RawMatch {
            match_id: format!("m{i:05}"),
            ..base.clone()
        })
        .collect()
}

fn bench_goal_time_decode(c: &mut Criterion) {
    let raws: Vec<i64> = (0..5)
        .flat_map(|p| {
            (0..3000)
                .step_by(37)
                .map(move |s| p * goal_time::PERIOD_BASE + s)
        })
        .collect();
    c.bench_function("goal_time_decode", |b| {
        b.iter(|| {
            for &raw in &raws {
                black_box(goal_time::decode(black_box(raw)));
            }
        })
    });
}

fn bench_zone_classify(c: &mut Criterion) {
    let points: Vec<(f64, f64)> = (0..=40)
        .flat_map(|i| (0..=40).map(move |j| (i as f64 / 40.0, j as f64 / 40.0)))
        .collect();
    c.bench_function("zone_classify", |b| {
        b.iter(|| {
            for &(x, y) in &points {
                black_box(zone::classify(black_box(x), black_box(y)));
            }
        })
    });
}

fn bench_transform_match(c: &mut Criterion) {
    let meta = sample_meta();
    let raw = parse_raw_match(MATCH_JSON).unwrap();
    c.bench_function("transform_match", |b| {
        b.iter(|| {
            let m = silver::transform_match(black_box(&raw), &meta, "ouid-me");
            black_box(m.players.len());
        })
    });
}

fn bench_transform_batch(c: &mut Criterion) {
    let meta = sample_meta();
    let batch = sample_batch(500);
    c.bench_function("transform_matches_500", |b| {
        b.iter(|| {
            let out = silver::transform_matches(black_box(&batch), &meta, "ouid-me");
            black_box(out.len());
        })
    });
}

fn bench_build_gold(c: &mut Criterion) {
    let meta = sample_meta();
    let matches: Vec<NormalizedMatch> =
        silver::transform_matches(&sample_batch(500), &meta, "ouid-me");
    c.bench_function("build_gold_500", |b| {
        b.iter(|| {
            let report = build_gold(black_box(&matches));
            black_box(report.summaries.len());
        })
    });
}

criterion_group!(
    perf,
    bench_goal_time_decode,
    bench_zone_classify,
    bench_transform_match,
    bench_transform_batch,
    bench_build_gold
);
criterion_main!(perf);

static MATCH_JSON: &str = include_str!("../tests/fixtures/match_detail.json");
