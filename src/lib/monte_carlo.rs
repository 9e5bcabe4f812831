use anyhow::{anyhow, bail, Result};
use itertools::{Itertools, MinMaxResult};
use log::{debug, info};
use rand::distributions::{Distribution, Uniform};
use rand::Rng;

/// Repeated Monte Carlo estimates of one definite integral.
#[derive(Clone, Debug)]
pub struct IntegralEstimate {
    pub lower: f64,
    pub upper: f64,
    pub estimates: Vec<f64>,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

impl IntegralEstimate {
    fn from_estimates(lower: f64, upper: f64, estimates: Vec<f64>) -> Result<Self> {
        let (min, max) = match estimates.iter().copied().minmax() {
            MinMaxResult::NoElements => bail!("No repetitions to summarise"),
            MinMaxResult::OneElement(x) => (x, x),
            MinMaxResult::MinMax(lo, hi) => (lo, hi),
        };
        let mean = estimates.iter().sum::<f64>() / estimates.len() as f64;
        Ok(Self {
            lower,
            upper,
            estimates,
            mean,
            min,
            max,
        })
    }

    /// Distances from the mean to the smallest and largest repetition.
    ///
    /// This is the spread of the repetitions, not a confidence interval.
    pub fn error_bar(&self) -> (f64, f64) {
        (self.mean - self.min, self.max - self.mean)
    }

    pub fn repetitions(&self) -> usize {
        self.estimates.len()
    }
}

/// `(b - a) * mean(f(x))` for `samples` uniform draws on `[a, b)`, repeated
/// `repeat` times. Each repetition draws its samples as one batch.
pub fn estimate<F, R>(
    f: F,
    lower: f64,
    upper: f64,
    samples: usize,
    repeat: usize,
    rng: &mut R,
) -> Result<IntegralEstimate>
where
    F: Fn(f64) -> f64,
    R: Rng + ?Sized,
{
    if !(lower < upper) || !lower.is_finite() || !upper.is_finite() {
        bail!("Invalid integration interval [{}, {}]", lower, upper);
    }
    if samples == 0 {
        bail!("Sample count must be positive");
    }
    if repeat == 0 {
        bail!("Repetition count must be positive");
    }
    let width = upper - lower;
    let dist = Uniform::new(lower, upper);
    let mut estimates = Vec::with_capacity(repeat);
    for _ in 0..repeat {
        let mut total = 0.0;
        for _ in 0..samples {
            total += f(dist.sample(&mut *rng));
        }
        estimates.push(width * total / samples as f64);
    }
    IntegralEstimate::from_estimates(lower, upper, estimates)
}

/// `10^k` for each `k` in `min_exponent..=max_exponent`.
pub fn geometric_bounds(min_exponent: i32, max_exponent: i32) -> Result<Vec<f64>> {
    if min_exponent > max_exponent {
        bail!(
            "Minimum exponent {} is larger than maximum exponent {}",
            min_exponent,
            max_exponent
        );
    }
    let mut bounds: Vec<f64> = (min_exponent..=max_exponent)
        .map(|k| 10f64.powi(k))
        .collect();
    bounds.sort_by(|a, b| a.total_cmp(b));
    Ok(bounds)
}

/// Exact value of the integral of `e^(-x)` over `[a, b]`.
pub fn exp_neg_integral(lower: f64, upper: f64) -> f64 {
    (-lower).exp() - (-upper).exp()
}

/// One independent estimate of the integral of `e^(-x)` per upper bound,
/// drawn in order from the same generator.
pub fn sweep<R: Rng + ?Sized>(
    lower: f64,
    bounds: &[f64],
    samples: usize,
    repeat: usize,
    rng: &mut R,
) -> Result<Vec<IntegralEstimate>> {
    if bounds.is_empty() {
        return Err(anyhow!("No upper bounds to sweep"));
    }
    info!(
        "Reference value e^-{} = {:.6}",
        lower,
        (-lower).exp()
    );
    let mut results = Vec::with_capacity(bounds.len());
    for &upper in bounds {
        let result = estimate(|x| (-x).exp(), lower, upper, samples, repeat, rng)?;
        let (below, above) = result.error_bar();
        info!(
            "b = {:e}: mean {:.6} (exact {:.6}), span -{:.3e}/+{:.3e}",
            upper,
            result.mean,
            exp_neg_integral(lower, upper),
            below,
            above
        );
        debug!("{} repetitions of {} samples", result.repetitions(), samples);
        results.push(result);
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_course_scenario_converges_to_reference() {
        let mut rng = StdRng::seed_from_u64(123456789);
        let result = estimate(|x| (-x).exp(), 2.0, 10.0, 10_000, 1000, &mut rng).unwrap();
        let reference = (-2.0f64).exp();
        assert!(((result.mean - reference) / reference).abs() < 0.02);
        assert!(result.min <= result.mean && result.mean <= result.max);
        assert_eq!(result.repetitions(), 1000);
    }

    #[test]
    fn test_polynomial() {
        let mut rng = StdRng::seed_from_u64(3);
        let result = estimate(|x| x * x, 0.0, 3.0, 20_000, 20, &mut rng).unwrap();
        assert!((result.mean - 9.0).abs() < 0.1);
    }

    #[test]
    fn test_error_bar_is_min_max_span() {
        let result = IntegralEstimate::from_estimates(0.0, 1.0, vec![1.0, 2.0, 6.0]).unwrap();
        assert_eq!(result.mean, 3.0);
        assert_eq!(result.error_bar(), (2.0, 3.0));
        let single = IntegralEstimate::from_estimates(0.0, 1.0, vec![4.0]).unwrap();
        assert_eq!(single.error_bar(), (0.0, 0.0));
        assert!(IntegralEstimate::from_estimates(0.0, 1.0, vec![]).is_err());
    }

    #[test]
    fn test_geometric_bounds() {
        assert_eq!(
            geometric_bounds(1, 6).unwrap(),
            vec![1e1, 1e2, 1e3, 1e4, 1e5, 1e6]
        );
        assert!(geometric_bounds(3, 1).is_err());
    }

    #[test]
    fn test_exact_integral_approaches_limit() {
        let limit = (-2.0f64).exp();
        let bounds = geometric_bounds(1, 6).unwrap();
        let errors: Vec<f64> = bounds
            .iter()
            .map(|&b| (limit - exp_neg_integral(2.0, b)).abs())
            .collect();
        assert!(errors.windows(2).all(|w| w[1] <= w[0]));
        assert!(errors[0] < 1e-4);
    }

    #[test]
    fn test_sweep_small_bounds() {
        let mut rng = StdRng::seed_from_u64(123456789);
        let results = sweep(2.0, &[10.0, 100.0], 10_000, 100, &mut rng).unwrap();
        assert_eq!(results.len(), 2);
        for result in &results {
            let exact = exp_neg_integral(2.0, result.upper);
            assert!(((result.mean - exact) / exact).abs() < 0.03, "b={} mean={}", result.upper, result.mean);
        }
    }

    #[test]
    fn test_invalid_arguments() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(estimate(|x| x, 1.0, 1.0, 10, 10, &mut rng).is_err());
        assert!(estimate(|x| x, 0.0, 1.0, 0, 10, &mut rng).is_err());
        assert!(estimate(|x| x, 0.0, 1.0, 10, 0, &mut rng).is_err());
        assert!(sweep(0.0, &[], 10, 10, &mut rng).is_err());
    }
}
