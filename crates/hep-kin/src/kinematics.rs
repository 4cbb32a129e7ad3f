use std::f64::consts::FRAC_PI_2;

use hep_core::errors::{ErrorInfo, HepError};
use nalgebra::Vector3;
use rand::Rng;

use crate::sampling;

/// Three-momentum in GeV.
pub type Momentum = Vector3<f64>;

/// Total energy `sqrt(m² + |p|²)`.
pub fn total_energy(mass: f64, p: &Momentum) -> f64 {
    (mass * mass + p.norm_squared()).sqrt()
}

/// Invariant mass of a two-particle system.
///
/// Each energy is recomputed from its own mass and momentum. Rounding can make
/// the radicand slightly negative for collinear massless-like pairs; it is
/// clamped to zero.
pub fn invariant_mass(mass_a: f64, p_a: &Momentum, mass_b: f64, p_b: &Momentum) -> f64 {
    let energy = total_energy(mass_a, p_a) + total_energy(mass_b, p_b);
    let momentum = p_a + p_b;
    (energy * energy - momentum.norm_squared()).max(0.0).sqrt()
}

/// Lorentz-boosts a four-momentum `(E, p)` by velocity `beta`.
pub fn boost(p: &Momentum, energy: f64, beta: &Momentum) -> Result<(Momentum, f64), HepError> {
    let beta2 = beta.norm_squared();
    if !beta2.is_finite() || beta2 >= 1.0 {
        return Err(HepError::KinematicallyForbidden(
            ErrorInfo::new("superluminal-boost", "boost velocity must satisfy |beta| < 1")
                .with_context("beta", beta2.sqrt().to_string()),
        ));
    }
    let gamma = 1.0 / (1.0 - beta2).sqrt();
    let gamma2 = if beta2 > 0.0 {
        (gamma - 1.0) / beta2
    } else {
        0.0
    };
    let bp = p.dot(beta);
    let boosted = p + beta * (gamma2 * bp + gamma * energy);
    Ok((boosted, gamma * (energy + bp)))
}

/// Samples the daughters of a two-body decay in the lab frame.
///
/// With `width > 0` the parent mass is first smeared by a Gaussian of that
/// width. The decay is isotropic in azimuth; the polar angle is drawn on
/// `[−π/2, π/2)` so the first daughter always points into the forward
/// rest-frame hemisphere and the second one back-to-back. Both daughters are
/// boosted with the velocity of a parent carrying the smeared mass, so their
/// momenta sum to `parent_p`.
pub fn two_body_decay<R: Rng + ?Sized>(
    parent_mass: f64,
    parent_p: &Momentum,
    mass_1: f64,
    mass_2: f64,
    width: f64,
    rng: &mut R,
) -> Result<(Momentum, Momentum), HepError> {
    let mut mass = parent_mass;
    if width > 0.0 {
        mass += width * sampling::standard_normal(rng);
    }
    let threshold = mass_1 + mass_2;
    if mass.is_nan() || mass < threshold || mass <= 0.0 {
        return Err(HepError::KinematicallyForbidden(
            ErrorInfo::new("below-threshold", "parent mass below the sum of daughter masses")
                .with_context("parent_mass", mass.to_string())
                .with_context("threshold", threshold.to_string()),
        ));
    }

    let diff = mass_1 - mass_2;
    let radicand = (mass * mass - threshold * threshold) * (mass * mass - diff * diff);
    let p_out = radicand.max(0.0).sqrt() / (2.0 * mass);

    let phi = sampling::azimuth(rng);
    let theta = sampling::uniform(rng, -FRAC_PI_2, FRAC_PI_2);
    let direction = Momentum::new(
        theta.sin() * phi.cos(),
        theta.sin() * phi.sin(),
        theta.cos(),
    );
    let rest_1 = direction * p_out;
    let rest_2 = -rest_1;

    let parent_energy = total_energy(mass, parent_p);
    let beta = parent_p / parent_energy;
    let (lab_1, _) = boost(&rest_1, total_energy(mass_1, &rest_1), &beta)?;
    let (lab_2, _) = boost(&rest_2, total_energy(mass_2, &rest_2), &beta)?;
    Ok((lab_1, lab_2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hep_core::RngHandle;

    #[test]
    fn energy_at_rest_is_mass() {
        assert_eq!(total_energy(0.93827, &Momentum::zeros()), 0.93827);
    }

    #[test]
    fn zero_boost_is_identity() {
        let p = Momentum::new(0.3, -0.2, 1.1);
        let (boosted, energy) = boost(&p, 2.0, &Momentum::zeros()).unwrap();
        assert_eq!(boosted, p);
        assert_eq!(energy, 2.0);
    }

    #[test]
    fn boost_preserves_mass_shell() {
        let mass = 0.49367;
        let p = Momentum::new(0.4, 0.1, -0.7);
        let energy = total_energy(mass, &p);
        let beta = Momentum::new(0.2, -0.5, 0.3);
        let (boosted, boosted_energy) = boost(&p, energy, &beta).unwrap();
        let shell = boosted_energy.powi(2) - boosted.norm_squared();
        assert!((shell - mass * mass).abs() < 1e-12);
    }

    #[test]
    fn superluminal_boost_is_rejected() {
        let err = boost(&Momentum::zeros(), 1.0, &Momentum::new(0.9, 0.9, 0.0)).unwrap_err();
        assert!(matches!(err, HepError::KinematicallyForbidden(_)));
    }

    #[test]
    fn decay_at_rest_is_back_to_back() {
        let mut rng = RngHandle::from_seed(9);
        let (p1, p2) =
            two_body_decay(0.89166, &Momentum::zeros(), 0.13957, 0.49367, 0.0, &mut rng).unwrap();
        assert!((p1 + p2).norm() < 1e-12);
        assert!(p1.z >= 0.0);
        let reconstructed = invariant_mass(0.13957, &p1, 0.49367, &p2);
        assert!((reconstructed - 0.89166).abs() < 1e-9);
    }

    #[test]
    fn forbidden_decay_fails() {
        let mut rng = RngHandle::from_seed(1);
        let err =
            two_body_decay(0.3, &Momentum::zeros(), 0.49367, 0.13957, 0.0, &mut rng).unwrap_err();
        assert_eq!(err.info().code, "below-threshold");
    }
}
