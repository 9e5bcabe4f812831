use anyhow::{bail, Result};
use statrs::function::gamma::ln_gamma;

/// Closed-form posterior of a coin's bias under a uniform prior.
///
/// After `heads` heads and `tails` tails the bias follows
/// `Beta(heads + 1, tails + 1)`. The numerically integrated curves in
/// [`crate::posterior`] approximate exactly this distribution, which makes it
/// the yardstick for them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CoinBeta {
    pub heads: u64,
    pub tails: u64,
}

impl CoinBeta {
    /// No flips observed yet: the flat prior on `(0, 1)`.
    pub fn uniform() -> Self {
        Self::default()
    }

    pub fn from_flips(trials: u64, heads: u64) -> Result<Self> {
        if heads > trials {
            bail!("{} heads cannot come from {} flips", heads, trials);
        }
        Ok(Self {
            heads,
            tails: trials - heads,
        })
    }

    pub fn observe(&mut self, heads: u64, tails: u64) {
        self.heads += heads;
        self.tails += tails;
    }

    pub fn flips(&self) -> u64 {
        self.heads + self.tails
    }

    fn shape(&self) -> (f64, f64) {
        (self.heads as f64 + 1.0, self.tails as f64 + 1.0)
    }

    /// Laplace's rule of succession, `(y + 1) / (N + 2)`.
    pub fn mean(&self) -> f64 {
        let (alpha, beta) = self.shape();
        alpha / (alpha + beta)
    }

    pub fn variance(&self) -> f64 {
        let mean = self.mean();
        mean * (1.0 - mean) / (self.flips() as f64 + 3.0)
    }

    pub fn standard_deviation(&self) -> f64 {
        self.variance().sqrt()
    }

    // ln((N + 1)! / (y! (N - y)!)), the log of the constant that makes
    // v^y (1 - v)^(N - y) integrate to one.
    fn ln_normalizer(&self) -> f64 {
        let (alpha, beta) = self.shape();
        ln_gamma(alpha + beta) - ln_gamma(alpha) - ln_gamma(beta)
    }

    /// Log density at `bias`; `-inf` outside `[0, 1]`.
    pub fn ln_density(&self, bias: f64) -> f64 {
        if !(0.0..=1.0).contains(&bias) {
            return f64::NEG_INFINITY;
        }
        let mut ln = self.ln_normalizer();
        // 0 * ln(0) terms drop out so the endpoints stay finite.
        if self.heads > 0 {
            ln += self.heads as f64 * bias.ln();
        }
        if self.tails > 0 {
            ln += self.tails as f64 * (1.0 - bias).ln();
        }
        ln
    }

    pub fn density(&self, bias: f64) -> f64 {
        self.ln_density(bias).exp()
    }
}
