//! Process mining benchmarks over synthetic event logs.

use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use pepper_mining::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const ACTIVITIES: [&str; 8] = [
    "register request",
    "examine casually",
    "examine thoroughly",
    "check ticket",
    "decide",
    "reinitiate request",
    "pay compensation",
    "reject request",
];

const USERS: [&str; 5] = ["Pete", "Mike", "Ellen", "Sue", "Sara"];

/// Synthetic log: each case walks the activity list, skipping or repeating steps.
fn generate_view(cases: usize, seed: u64) -> SharedView {
    let mut rng = StdRng::seed_from_u64(seed);
    let base = NaiveDate::from_ymd_opt(2022, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();

    let mut events = Vec::new();
    for case in 0..cases {
        let mut time = base + Duration::minutes(case as i64 * 7);
        for activity in ACTIVITIES {
            if rng.gen_bool(0.25) {
                continue;
            }
            let repeats = if rng.gen_bool(0.1) { 2 } else { 1 };
            for _ in 0..repeats {
                time += Duration::minutes(rng.gen_range(1..240));
                let user = USERS[rng.gen_range(0..USERS.len())];
                events.push(Event::new(case.to_string(), activity, time).with_user(user));
            }
        }
    }

    let mut data = ProcessData::new();
    data.set_event_log(EventLog::new(events).unwrap()).unwrap();
    data.into_shared()
}

fn bench_variant_discovery(c: &mut Criterion) {
    let mut group = c.benchmark_group("Variant Discovery");

    for cases in [1_000, 10_000] {
        let view = generate_view(cases, 42);
        group.throughput(Throughput::Elements(view.event_log().len() as u64));
        group.bench_function(format!("cases_{}", cases), |b| {
            b.iter(|| black_box(VariantSet::discover(black_box(view.event_log()))))
        });
    }

    group.finish();
}

fn bench_filter_chain(c: &mut Criterion) {
    let view = generate_view(10_000, 7);
    let mut group = c.benchmark_group("Filter Chain");
    group.throughput(Throughput::Elements(view.event_log().len() as u64));

    group.bench_function("size_then_end_activity", |b| {
        b.iter(|| {
            let sized = CaseSizeFilter::new(view.clone(), 4, 12).unwrap().into_shared();
            let ended =
                CaseEndActivityFilter::new(sized, ["reject request"], FilterMode::NotContain)
                    .unwrap();
            black_box(ended.cases().len())
        })
    });

    group.finish();
}

fn bench_kpis(c: &mut Criterion) {
    let view = generate_view(10_000, 11);
    let mut group = c.benchmark_group("KPIs");
    group.throughput(Throughput::Elements(view.event_log().len() as u64));

    group.bench_function("summary", |b| {
        b.iter(|| {
            black_box(
                view.summary(&["NumberOfEvents", "NumberOfCases", "ThroughputTime", "Rework"])
                    .unwrap(),
            )
        })
    });
    group.bench_function("cases_with_kpis", |b| {
        b.iter(|| black_box(view.cases_with_kpis(&["NumberOfEvents", "ThroughputTime"]).unwrap()))
    });

    group.finish();
}

fn bench_conformance(c: &mut Criterion) {
    let view = generate_view(5_000, 3);
    let model = ProcessModel::from_activities([
        "register request",
        "examine casually",
        "check ticket",
        "decide",
        "pay compensation",
    ])
    .unwrap();

    let mut group = c.benchmark_group("Conformance");
    group.throughput(Throughput::Elements(view.cases().len() as u64));

    group.bench_function("checker", |b| {
        b.iter(|| black_box(ConformanceChecker::new(view.clone(), [&model]).unwrap()))
    });
    group.bench_function("run_by_same_user", |b| {
        b.iter(|| {
            black_box(RunBySameUser::new(view.clone(), ["check ticket", "decide"]).unwrap())
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_variant_discovery,
    bench_filter_chain,
    bench_kpis,
    bench_conformance
);
criterion_main!(benches);
