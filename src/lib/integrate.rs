use anyhow::{bail, Result};
use strum_macros::{Display, EnumIter, EnumString};

/// Numerical integration of sampled values over their abscissae.
pub trait Integrator {
    fn integrate(&self, values: &[f64], grid: &[f64]) -> Result<f64>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum IntegrationRule {
    Simpson,
    Trapezoid,
}

impl IntegrationRule {
    pub fn integrator(&self) -> Box<dyn Integrator> {
        match self {
            IntegrationRule::Simpson => Box::new(Simpson),
            IntegrationRule::Trapezoid => Box::new(Trapezoid),
        }
    }
}

fn check_samples(values: &[f64], grid: &[f64]) -> Result<()> {
    if values.len() != grid.len() {
        bail!(
            "Cannot integrate {} values over {} grid points",
            values.len(),
            grid.len()
        );
    }
    if grid.len() < 2 {
        bail!("Need at least 2 points to integrate, got {}", grid.len());
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Trapezoid;

impl Trapezoid {
    fn span(values: &[f64], grid: &[f64]) -> f64 {
        values
            .windows(2)
            .zip(grid.windows(2))
            .map(|(y, x)| 0.5 * (x[1] - x[0]) * (y[0] + y[1]))
            .sum()
    }
}

impl Integrator for Trapezoid {
    fn integrate(&self, values: &[f64], grid: &[f64]) -> Result<f64> {
        check_samples(values, grid)?;
        Ok(Self::span(values, grid))
    }
}

/// Composite Simpson's rule.
///
/// Each pair of intervals is integrated by the parabola through its three
/// points, so spacing may vary between and within pairs. With an odd number of intervals the last (or first) interval is covered by
/// the trapezoid rule, and the result is the average of both placements.
#[derive(Debug, Clone, Copy, Default)]
pub struct Simpson;

impl Simpson {
    // Requires an even number of intervals.
    fn even_span(values: &[f64], grid: &[f64]) -> f64 {
        let mut total = 0.0;
        let mut i = 0;
        while i + 2 < grid.len() {
            let h0 = grid[i + 1] - grid[i];
            let h1 = grid[i + 2] - grid[i + 1];
            let width = h0 + h1;
            total += width / 6.0
                * ((2.0 - h1 / h0) * values[i]
                    + width * width / (h0 * h1) * values[i + 1]
                    + (2.0 - h0 / h1) * values[i + 2]);
            i += 2;
        }
        total
    }
}

impl Integrator for Simpson {
    fn integrate(&self, values: &[f64], grid: &[f64]) -> Result<f64> {
        check_samples(values, grid)?;
        let n = grid.len();
        if n == 2 {
            return Ok(Trapezoid::span(values, grid));
        }
        if (n - 1) % 2 == 0 {
            return Ok(Self::even_span(values, grid));
        }
        let tail_trapezoid = Self::even_span(&values[..n - 1], &grid[..n - 1])
            + Trapezoid::span(&values[n - 2..], &grid[n - 2..]);
        let head_trapezoid = Trapezoid::span(&values[..2], &grid[..2])
            + Self::even_span(&values[1..], &grid[1..]);
        Ok(0.5 * (tail_trapezoid + head_trapezoid))
    }
}
