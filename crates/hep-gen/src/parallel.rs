use hep_core::errors::{ErrorInfo, HepError};
use hep_core::RngHandle;
use hep_hist::HistogramSet;
use hep_kin::ParticleRegistry;
use rayon::prelude::*;

use crate::config::GeneratorConfig;
use crate::generator::{generate_sequential, EventGenerator, GenerationOutput, RunSummary};

/// Splits `events` into `workers` contiguous shares, larger shares first.
pub fn partition_events(events: u64, workers: usize) -> Vec<u64> {
    let workers = workers.max(1) as u64;
    let base = events / workers;
    let remainder = events % workers;
    (0..workers)
        .map(|k| base + u64::from(k < remainder))
        .collect()
}

/// Threads for a pool serving `workers` shares, capped at the available cores.
pub fn pool_threads(workers: usize) -> usize {
    let cores = std::thread::available_parallelism().map_or(1, |n| n.get());
    workers.clamp(1, cores)
}

/// Generates events on a rayon pool, one RNG substream and histogram set per worker.
///
/// Worker `k` is seeded with `derive_substream_seed(master_seed, k)`; results are
/// merged in worker order by per-bin summation, so a run is reproducible for a
/// fixed worker count.
pub fn generate_partitioned(
    registry: &ParticleRegistry,
    config: &GeneratorConfig,
) -> Result<GenerationOutput, HepError> {
    config.validate()?;
    let master = config.seed_policy.master_seed;
    let shares = partition_events(config.events, config.workers);
    tracing::info!(workers = shares.len(), events = config.events, "partitioned generation");

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(pool_threads(shares.len()))
        .build()
        .map_err(|err| HepError::Config(ErrorInfo::new("thread-pool", err.to_string())))?;

    let results: Result<Vec<_>, HepError> = pool.install(|| {
        shares
            .par_iter()
            .enumerate()
            .map(|(worker, &events)| -> Result<(usize, HistogramSet, RunSummary), HepError> {
                let mut generator = EventGenerator::new(registry, config)?;
                let mut distributions = HistogramSet::from_specs(&config.distributions)?;
                let mut rng = RngHandle::substream(master, worker as u64);
                let summary = generator.run(events, &mut rng, &mut distributions)?;
                Ok((worker, distributions, summary))
            })
            .collect()
    });

    let mut ordered = results?;
    ordered.sort_by_key(|(worker, _, _)| *worker);

    let mut merged = HistogramSet::from_specs(&config.distributions)?;
    let mut summary = RunSummary::default();
    for (_, distributions, partial) in &ordered {
        merged.merge(distributions)?;
        summary.absorb(partial);
    }
    Ok(GenerationOutput {
        distributions: merged,
        summary,
        seed: master,
        workers: shares.len(),
    })
}

/// Runs the sequential reference loop for one worker, the partitioned mode otherwise.
pub fn generate(
    registry: &ParticleRegistry,
    config: &GeneratorConfig,
) -> Result<GenerationOutput, HepError> {
    if config.workers <= 1 {
        generate_sequential(registry, config)
    } else {
        generate_partitioned(registry, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shares_cover_all_events() {
        assert_eq!(partition_events(10, 3), vec![4, 3, 3]);
        assert_eq!(partition_events(2, 4), vec![1, 1, 0, 0]);
        assert_eq!(partition_events(9, 1), vec![9]);
        assert_eq!(partition_events(1001, 4).iter().sum::<u64>(), 1001);
    }

    #[test]
    fn pool_never_exceeds_available_cores() {
        let cores = std::thread::available_parallelism().map_or(1, |n| n.get());
        assert_eq!(pool_threads(1), 1);
        assert_eq!(pool_threads(0), 1);
        assert_eq!(pool_threads(100_000), cores);
    }

    #[test]
    fn more_workers_than_threads_stays_reproducible() {
        let registry = crate::catalog::standard_registry().unwrap();
        let config = GeneratorConfig {
            events: 64,
            particles_per_event: 5,
            workers: 64,
            ..GeneratorConfig::default()
        };
        let first = generate_partitioned(&registry, &config).unwrap();
        let second = generate_partitioned(&registry, &config).unwrap();
        assert_eq!(first.workers, 64);
        assert_eq!(first.summary.events, 64);
        assert_eq!(first, second);
    }
}
