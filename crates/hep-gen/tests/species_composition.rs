use std::collections::BTreeMap;

use hep_core::RngHandle;
use hep_gen::{standard_registry, GeneratorConfig, SpeciesTable};

#[test]
fn million_draws_match_configured_fractions() {
    let registry = standard_registry().unwrap();
    let config = GeneratorConfig::default();
    let table = SpeciesTable::new(&registry, &config.species).unwrap();
    let mut rng = RngHandle::from_seed(0xC0FFEE);

    let draws = 1_000_000u64;
    let mut counts = BTreeMap::new();
    for _ in 0..draws {
        *counts.entry(table.sample(&mut rng)).or_insert(0u64) += 1;
    }

    for row in &config.species {
        let index = registry.find_type(&row.name).unwrap();
        let observed = *counts.get(&index).unwrap_or(&0) as f64 / draws as f64;
        let delta_pp = (observed - row.probability).abs() * 100.0;
        assert!(
            delta_pp <= 0.5,
            "{}: observed {observed:.5}, expected {}",
            row.name,
            row.probability
        );
    }
}
