use hep_kin::{boost, invariant_mass, total_energy, Momentum};
use proptest::prelude::*;

fn momentum() -> impl Strategy<Value = Momentum> {
    (-20.0f64..20.0, -20.0f64..20.0, -20.0f64..20.0).prop_map(|(x, y, z)| Momentum::new(x, y, z))
}

proptest! {
    #[test]
    fn energy_satisfies_mass_shell(mass in 0.01f64..5.0, p in momentum()) {
        let energy = total_energy(mass, &p);
        let shell = energy * energy - p.norm_squared();
        prop_assert!((shell - mass * mass).abs() <= 1e-9 * energy * energy);
    }

    #[test]
    fn invariant_mass_is_symmetric(
        mass_a in 0.01f64..2.0,
        mass_b in 0.01f64..2.0,
        p_a in momentum(),
        p_b in momentum(),
    ) {
        prop_assert_eq!(
            invariant_mass(mass_a, &p_a, mass_b, &p_b),
            invariant_mass(mass_b, &p_b, mass_a, &p_a)
        );
    }

    #[test]
    fn invariant_mass_is_at_least_mass_sum(
        mass_a in 0.01f64..2.0,
        mass_b in 0.01f64..2.0,
        p_a in momentum(),
        p_b in momentum(),
    ) {
        let m = invariant_mass(mass_a, &p_a, mass_b, &p_b);
        prop_assert!(m >= (mass_a + mass_b) * (1.0 - 1e-6));
    }

    #[test]
    fn boost_preserves_invariant_mass(
        mass in 0.01f64..2.0,
        p in momentum(),
        bx in -0.5f64..0.5,
        by in -0.5f64..0.5,
        bz in -0.5f64..0.5,
    ) {
        let beta = Momentum::new(bx, by, bz);
        let energy = total_energy(mass, &p);
        let (boosted, boosted_energy) = boost(&p, energy, &beta).unwrap();
        let shell = boosted_energy * boosted_energy - boosted.norm_squared();
        prop_assert!((shell - mass * mass).abs() <= 1e-9 * boosted_energy * boosted_energy);
    }
}
