use criterion::{criterion_group, criterion_main, Criterion};
use sim_core::{default_roster, enhancement_catalogue, SimulationParameters, SimulationSettings};
use sim_runtime::{build_snapshot, crew_from_factory, factory_plan, seeded_rng, SnapshotOptions};

fn bench_snapshot(c: &mut Criterion) {
    let table = SimulationSettings::default().price_table().unwrap();
    let roster = default_roster();
    let ids: Vec<String> = roster.iter().map(|w| w.id.clone()).collect();
    let plan = factory_plan(&roster, &ids, false).unwrap();
    let crew = crew_from_factory(&plan, &roster).unwrap();
    let options = SnapshotOptions {
        enhancements: enhancement_catalogue(),
        ..Default::default()
    };
    let params = SimulationParameters::default();
    let mut rng = seeded_rng(42);
    c.bench_function("build_snapshot_4500_units_6_workers", |b| {
        b.iter(|| {
            let _ = build_snapshot(&params, &table, &crew, &options, &mut rng);
        })
    });
}

criterion_group!(benches, bench_snapshot);
criterion_main!(benches);
