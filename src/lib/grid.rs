use anyhow::{bail, Result};

/// Candidate bias values, strictly inside (0, 1) and strictly increasing.
#[derive(Clone, Debug, PartialEq)]
pub struct BiasGrid {
    points: Vec<f64>,
}

impl BiasGrid {
    pub fn new(points: Vec<f64>) -> Result<Self> {
        if points.len() < 2 {
            bail!("Bias grid needs at least 2 points, got {}", points.len());
        }
        for (i, &v) in points.iter().enumerate() {
            if !(v > 0.0 && v < 1.0) {
                bail!("Bias grid point {} at index {} is not inside (0, 1)", v, i);
            }
        }
        if points.windows(2).any(|w| w[1] <= w[0]) {
            bail!("Bias grid points must be strictly increasing");
        }
        Ok(Self { points })
    }

    /// `resolution` evenly spaced points over [0, 1] with both ends dropped.
    pub fn linspace_interior(resolution: usize) -> Result<Self> {
        if resolution < 4 {
            bail!("Grid resolution must be at least 4, got {}", resolution);
        }
        let step = 1.0 / (resolution - 1) as f64;
        let points = (1..resolution - 1).map(|i| i as f64 * step).collect();
        Self::new(points)
    }

    pub fn points(&self) -> &[f64] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
