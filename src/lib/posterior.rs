use crate::grid::BiasGrid;
use crate::integrate::Integrator;
use anyhow::{anyhow, bail, Result};
use log::{debug, warn};
use statrs::distribution::{Continuous, Normal};
use statrs::function::factorial::binomial;
use strum_macros::Display;

/// Which form of the binomial likelihood a density evaluation used.
#[derive(Debug, Clone, Copy, PartialEq, Display)]
pub enum Likelihood {
    /// `C(N, y) v^y (1 - v)^(N - y)` with a finite coefficient.
    #[strum(to_string = "binomial")]
    Exact { coefficient: f64 },
    /// De Moivre-Laplace: Gaussian density at `y` with mean `N v`, variance `N v (1 - v)`.
    #[strum(to_string = "normal_approx")]
    NormalApprox,
}

impl Likelihood {
    /// Exact while `C(trials, successes)` is representable as a finite f64.
    pub fn select(trials: u64, successes: u64) -> Self {
        let coefficient = binomial(trials, successes);
        if coefficient.is_finite() {
            Likelihood::Exact { coefficient }
        } else {
            Likelihood::NormalApprox
        }
    }

    pub fn is_approximate(&self) -> bool {
        matches!(self, Likelihood::NormalApprox)
    }

    pub fn density(&self, bias: f64, trials: u64, successes: u64) -> Result<f64> {
        check_counts(trials, successes)?;
        match self {
            Likelihood::Exact { coefficient } => Ok(coefficient
                * bias.powf(successes as f64)
                * (1.0 - bias).powf((trials - successes) as f64)),
            Likelihood::NormalApprox => normal_approx_pdf(bias, trials, successes),
        }
    }
}

fn check_counts(trials: u64, successes: u64) -> Result<()> {
    if successes > trials {
        bail!("Success count {} exceeds trial count {}", successes, trials);
    }
    Ok(())
}

pub fn binomial_pmf(bias: f64, trials: u64, successes: u64) -> Result<f64> {
    check_counts(trials, successes)?;
    Ok(binomial(trials, successes)
        * bias.powf(successes as f64)
        * (1.0 - bias).powf((trials - successes) as f64))
}

pub fn normal_approx_pdf(bias: f64, trials: u64, successes: u64) -> Result<f64> {
    check_counts(trials, successes)?;
    let n = trials as f64;
    let std_dev = (n * bias * (1.0 - bias)).sqrt();
    let normal = Normal::new(n * bias, std_dev)
        .map_err(|e| anyhow!("No normal approximation for N={} at v={}: {}", trials, bias, e))?;
    Ok(normal.pdf(successes as f64))
}

/// Density over a bias grid for one `(N, y)` observation.
#[derive(Clone, Debug)]
pub struct PosteriorCurve {
    pub trials: u64,
    pub successes: u64,
    pub likelihood: Likelihood,
    pub bias: Vec<f64>,
    pub density: Vec<f64>,
    pub normalized: bool,
}

impl PosteriorCurve {
    /// Unnormalized posterior under a uniform prior. Falls back to the normal
    /// approximation, with a warning, when the binomial coefficient overflows.
    pub fn evaluate(grid: &BiasGrid, trials: u64, successes: u64) -> Result<Self> {
        check_counts(trials, successes)?;
        let likelihood = Likelihood::select(trials, successes);
        if likelihood.is_approximate() {
            warn!(
                "Posterior for {} flips computed with the normal approximation to the binomial",
                trials
            );
        }
        let density = grid
            .points()
            .iter()
            .map(|&v| likelihood.density(v, trials, successes))
            .collect::<Result<Vec<f64>>>()?;
        debug!(
            "Evaluated {} likelihood for N={}, y={} over {} points",
            likelihood,
            trials,
            successes,
            density.len()
        );
        Ok(Self {
            trials,
            successes,
            likelihood,
            bias: grid.points().to_vec(),
            density,
            normalized: false,
        })
    }

    /// Divides the density by its integral over the grid and returns that integral.
    pub fn normalize(&mut self, integrator: &dyn Integrator) -> Result<f64> {
        let norm = integrator.integrate(&self.density, &self.bias)?;
        if !norm.is_finite() || norm <= 0.0 {
            bail!(
                "Cannot normalize posterior for N={}, y={}: integral is {}",
                self.trials,
                self.successes,
                norm
            );
        }
        self.density.iter_mut().for_each(|p| *p /= norm);
        self.normalized = true;
        Ok(norm)
    }

    pub fn mean(&self, integrator: &dyn Integrator) -> Result<f64> {
        self.ensure_normalized()?;
        let weighted: Vec<f64> = self
            .bias
            .iter()
            .zip(&self.density)
            .map(|(v, p)| v * p)
            .collect();
        integrator.integrate(&weighted, &self.bias)
    }

    pub fn variance(&self, integrator: &dyn Integrator) -> Result<f64> {
        let mean = self.mean(integrator)?;
        let weighted: Vec<f64> = self
            .bias
            .iter()
            .zip(&self.density)
            .map(|(v, p)| (v - mean).powi(2) * p)
            .collect();
        integrator.integrate(&weighted, &self.bias)
    }

    /// Largest density value, or 0.0 for an empty curve.
    pub fn peak(&self) -> f64 {
        self.density.iter().cloned().fold(0.0, f64::max)
    }

    fn ensure_normalized(&self) -> Result<()> {
        if !self.normalized {
            bail!(
                "Posterior for N={}, y={} has not been normalized",
                self.trials,
                self.successes
            );
        }
        Ok(())
    }
}
