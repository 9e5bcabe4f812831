use crate::monte_carlo::{exp_neg_integral, IntegralEstimate};
use crate::posterior::PosteriorCurve;
use crate::simulation::CurveSink;
use anyhow::Result;
use csv::{Writer, WriterBuilder};
use log::debug;
use serde::Serialize;
use std::fs::File;
use std::path::Path;

/// Tab-separated `flips, heads, likelihood, bias, density` rows, one per grid point.
pub struct CurveWriter {
    file: File,
    writer: Writer<File>,
}

impl CurveWriter {
    pub fn new(file_path: &Path) -> Result<Self> {
        let file = File::create(file_path)?;
        let writer = WriterBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .from_writer(file.try_clone()?);
        let mut curve_writer = Self { file, writer };
        curve_writer.write_header()?;
        Ok(curve_writer)
    }

    fn write_header(&mut self) -> Result<()> {
        self.writer
            .write_record(["flips", "heads", "likelihood", "bias", "density"])?;
        Ok(())
    }

    pub fn write_curve(&mut self, curve: &PosteriorCurve) -> Result<()> {
        let flips = curve.trials.to_string();
        let heads = curve.successes.to_string();
        let likelihood = curve.likelihood.to_string();
        for (bias, density) in curve.bias.iter().zip(&curve.density) {
            let bias = bias.to_string();
            let density = density.to_string();
            self.writer.write_record([
                flips.as_str(),
                heads.as_str(),
                likelihood.as_str(),
                bias.as_str(),
                density.as_str(),
            ])?;
        }
        debug!("Wrote {} rows for N={}", curve.bias.len(), curve.trials);
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        self.file.sync_all()?;
        Ok(())
    }
}

impl CurveSink for CurveWriter {
    fn emit(&mut self, curve: PosteriorCurve) -> Result<()> {
        self.write_curve(&curve)
    }
}

#[derive(Debug, Serialize)]
struct EstimateRow {
    lower: f64,
    upper: f64,
    mean: f64,
    min: f64,
    max: f64,
    exact: f64,
}

/// Tab-separated summary of a Monte Carlo sweep, one row per upper bound.
pub struct EstimateWriter {
    file: File,
    writer: Writer<File>,
}

impl EstimateWriter {
    pub fn new(file_path: &Path) -> Result<Self> {
        let file = File::create(file_path)?;
        let writer = WriterBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .from_writer(file.try_clone()?);
        Ok(Self { file, writer })
    }

    pub fn write_estimate(&mut self, estimate: &IntegralEstimate) -> Result<()> {
        self.writer.serialize(EstimateRow {
            lower: estimate.lower,
            upper: estimate.upper,
            mean: estimate.mean,
            min: estimate.min,
            max: estimate.max,
            exact: exp_neg_integral(estimate.lower, estimate.upper),
        })?;
        Ok(())
    }

    pub fn write_estimates_iter<'a, I>(&mut self, estimates: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a IntegralEstimate>,
    {
        for estimate in estimates {
            self.write_estimate(estimate)?;
        }
        self.flush()?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        self.file.sync_all()?;
        Ok(())
    }
}
