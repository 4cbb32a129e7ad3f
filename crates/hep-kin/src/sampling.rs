use std::f64::consts::{PI, TAU};

use rand::Rng;

/// Uniform draw on `(0, 1]`, safe to pass to `ln`.
fn open_unit<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    1.0 - rng.gen::<f64>()
}

/// Standard normal deviate from the Box–Muller transform.
pub fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    let u1 = open_unit(rng);
    let u2 = rng.gen::<f64>();
    (-2.0 * u1.ln()).sqrt() * (TAU * u2).cos()
}

/// Exponential deviate with mean `mean`.
pub fn exponential<R: Rng + ?Sized>(rng: &mut R, mean: f64) -> f64 {
    -mean * open_unit(rng).ln()
}

/// Uniform draw on `[low, high)`.
pub fn uniform<R: Rng + ?Sized>(rng: &mut R, low: f64, high: f64) -> f64 {
    low + (high - low) * rng.gen::<f64>()
}

/// Azimuth on `[0, 2π)`.
pub fn azimuth<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    uniform(rng, 0.0, TAU)
}

/// Zenith on `[0, π)`.
pub fn zenith<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    uniform(rng, 0.0, PI)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hep_core::RngHandle;

    #[test]
    fn normal_moments_are_standard() {
        let mut rng = RngHandle::from_seed(11);
        let n = 200_000;
        let draws: Vec<f64> = (0..n).map(|_| standard_normal(&mut rng)).collect();
        let mean = draws.iter().sum::<f64>() / n as f64;
        let var = draws.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n as f64;
        assert!(mean.abs() < 0.01, "mean {mean}");
        assert!((var - 1.0).abs() < 0.02, "var {var}");
    }

    #[test]
    fn exponential_mean_and_support() {
        let mut rng = RngHandle::from_seed(5);
        let n = 200_000;
        let mut sum = 0.0;
        for _ in 0..n {
            let x = exponential(&mut rng, 1.0);
            assert!(x >= 0.0 && x.is_finite());
            sum += x;
        }
        assert!((sum / n as f64 - 1.0).abs() < 0.01);
    }

    #[test]
    fn angles_stay_in_range() {
        let mut rng = RngHandle::from_seed(3);
        for _ in 0..10_000 {
            let phi = azimuth(&mut rng);
            let theta = zenith(&mut rng);
            assert!((0.0..TAU).contains(&phi));
            assert!((0.0..PI).contains(&theta));
        }
    }
}
