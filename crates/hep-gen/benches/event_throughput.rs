use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use hep_core::RngHandle;
use hep_gen::{standard_registry, EventGenerator, GeneratorConfig};
use hep_hist::HistogramSet;

fn bench_events(c: &mut Criterion) {
    let registry = standard_registry().unwrap();
    let mut group = c.benchmark_group("event_throughput");
    for target in [10usize, 100] {
        let config = GeneratorConfig {
            particles_per_event: target,
            ..GeneratorConfig::default()
        };
        group.bench_with_input(BenchmarkId::from_parameter(target), &config, |b, config| {
            let mut generator = EventGenerator::new(&registry, config).unwrap();
            let mut set = HistogramSet::from_specs(&config.distributions).unwrap();
            let mut rng = RngHandle::from_seed(17);
            b.iter(|| {
                generator.generate_event(&mut rng, &mut set).unwrap();
                generator.process_pairs(&mut set).unwrap()
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_events);
criterion_main!(benches);
