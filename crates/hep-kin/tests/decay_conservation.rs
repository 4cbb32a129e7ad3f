use hep_core::{HepError, RngHandle};
use hep_kin::{invariant_mass, two_body_decay, Momentum, Particle, ParticleRegistry};
use rand::Rng;

const PION: f64 = 0.13957;
const KAON: f64 = 0.49367;
const KSTAR: f64 = 0.89166;

#[test]
fn daughters_sum_to_parent_momentum() {
    let mut rng = RngHandle::from_seed(2024);
    for _ in 0..1000 {
        let parent = Momentum::new(
            rng.gen_range(-5.0..5.0),
            rng.gen_range(-5.0..5.0),
            rng.gen_range(-5.0..5.0),
        );
        let (p1, p2) = two_body_decay(KSTAR, &parent, PION, KAON, 0.05, &mut rng).unwrap();
        let residual = p1 + p2 - parent;
        assert!(residual.amax() < 1e-6, "residual {residual:?}");
    }
}

#[test]
fn unsmeared_daughters_rebuild_parent_mass() {
    let mut rng = RngHandle::from_seed(77);
    for _ in 0..200 {
        let parent = Momentum::new(rng.gen_range(-3.0..3.0), 0.0, rng.gen_range(-3.0..3.0));
        let (p1, p2) = two_body_decay(KSTAR, &parent, PION, KAON, 0.0, &mut rng).unwrap();
        assert!((invariant_mass(PION, &p1, KAON, &p2) - KSTAR).abs() < 1e-9);
    }
}

#[test]
fn below_threshold_parent_is_forbidden() {
    let mut rng = RngHandle::from_seed(3);
    let err = two_body_decay(0.3, &Momentum::zeros(), KAON, PION, 0.0, &mut rng).unwrap_err();
    assert!(matches!(err, HepError::KinematicallyForbidden(_)));
}

#[test]
fn smeared_masses_follow_the_width() {
    let mut registry = ParticleRegistry::new();
    let pion = registry.add_type("pion+", PION, 1, 0.0).unwrap();
    let kaon = registry.add_type("kaon-", KAON, -1, 0.0).unwrap();
    registry.add_type("k*", KSTAR, 0, 0.05).unwrap();
    let parent = Particle::named(&registry, "k*", Momentum::new(0.2, 0.4, 1.0)).unwrap();

    let mut rng = RngHandle::from_seed(99);
    let masses: Vec<f64> = (0..20_000)
        .filter_map(|_| parent.decay(&registry, pion, kaon, &mut rng).ok())
        .map(|(a, b)| a.invariant_mass(&b, &registry).unwrap())
        .collect();
    let n = masses.len() as f64;
    let mean = masses.iter().sum::<f64>() / n;
    let sigma = (masses.iter().map(|m| (m - mean).powi(2)).sum::<f64>() / n).sqrt();
    assert!((mean - KSTAR).abs() < 0.002, "mean {mean}");
    assert!((sigma - 0.05).abs() < 0.002, "sigma {sigma}");
}
