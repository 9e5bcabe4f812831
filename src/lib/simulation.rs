use crate::grid::BiasGrid;
use crate::integrate::Integrator;
use crate::posterior::PosteriorCurve;
use anyhow::{bail, Result};
use log::{debug, info};
use rand::Rng;

/// Receives each normalized posterior as the simulation reaches a checkpoint.
pub trait CurveSink {
    fn emit(&mut self, curve: PosteriorCurve) -> Result<()>;
}

impl CurveSink for Vec<PosteriorCurve> {
    fn emit(&mut self, curve: PosteriorCurve) -> Result<()> {
        self.push(curve);
        Ok(())
    }
}

/// Forwards every curve to two sinks.
pub struct Tee<'a, A: CurveSink, B: CurveSink> {
    pub first: &'a mut A,
    pub second: &'a mut B,
}

impl<A: CurveSink, B: CurveSink> CurveSink for Tee<'_, A, B> {
    fn emit(&mut self, curve: PosteriorCurve) -> Result<()> {
        self.second.emit(curve.clone())?;
        self.first.emit(curve)
    }
}

/// Running tally of coin flips.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FlipState {
    pub trials: u64,
    pub heads: u64,
}

impl FlipState {
    pub fn new() -> Self {
        Self::default()
    }

    /// One fair flip: a draw of 0 from {0, 1} counts as heads.
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let draw: u8 = rng.gen_range(0..2);
        self.heads += u64::from(1 - draw);
        self.trials += 1;
    }
}

pub struct CoinFlipSimulator<'a> {
    grid: &'a BiasGrid,
    checkpoints: Vec<u64>,
    integrator: &'a dyn Integrator,
    state: FlipState,
}

impl<'a> CoinFlipSimulator<'a> {
    pub fn new(
        grid: &'a BiasGrid,
        checkpoints: Vec<u64>,
        integrator: &'a dyn Integrator,
    ) -> Result<Self> {
        if checkpoints.is_empty() {
            bail!("At least one checkpoint is required");
        }
        if checkpoints.windows(2).any(|w| w[1] <= w[0]) {
            bail!("Checkpoints must be strictly increasing: {:?}", checkpoints);
        }
        Ok(Self {
            grid,
            checkpoints,
            integrator,
            state: FlipState::new(),
        })
    }

    pub fn state(&self) -> &FlipState {
        &self.state
    }

    pub fn checkpoints(&self) -> &[u64] {
        &self.checkpoints
    }

    /// Flips until the last checkpoint, emitting the normalized posterior
    /// before the flip that follows each checkpoint. The flip after the last
    /// checkpoint is still drawn so the generator advances once per trial.
    pub fn run<R: Rng + ?Sized>(&mut self, rng: &mut R, sink: &mut dyn CurveSink) -> Result<()> {
        let last = match self.checkpoints.last() {
            Some(&last) => last,
            None => bail!("At least one checkpoint is required"),
        };
        let mut pending = self.checkpoints.iter().copied().peekable();
        for n in 0..=last {
            if pending.peek() == Some(&n) {
                pending.next();
                let curve = self.checkpoint()?;
                sink.emit(curve)?;
            }
            self.state.step(rng);
        }
        info!(
            "Simulated {} flips, {} heads",
            self.state.trials, self.state.heads
        );
        Ok(())
    }

    fn checkpoint(&self) -> Result<PosteriorCurve> {
        let mut curve = PosteriorCurve::evaluate(self.grid, self.state.trials, self.state.heads)?;
        let norm = curve.normalize(self.integrator)?;
        debug!(
            "Checkpoint N={} y={}: normalization constant {:e}",
            curve.trials, curve.successes, norm
        );
        Ok(curve)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrate::Simpson;
    use log::{Level, LevelFilter, Log, Metadata, Record};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Mutex;
    use std::thread::{self, ThreadId};

    // Tests run on parallel threads, so each one only reads its own records.
    static RECORDS: Mutex<Vec<(ThreadId, Level, String)>> = Mutex::new(Vec::new());

    struct CaptureLogger;

    impl Log for CaptureLogger {
        fn enabled(&self, metadata: &Metadata) -> bool {
            metadata.level() <= Level::Warn
        }

        fn log(&self, record: &Record) {
            if self.enabled(record.metadata()) {
                RECORDS.lock().unwrap().push((
                    thread::current().id(),
                    record.level(),
                    record.args().to_string(),
                ));
            }
        }

        fn flush(&self) {}
    }

    static LOGGER: CaptureLogger = CaptureLogger;

    fn warnings_during<F: FnOnce()>(f: F) -> Vec<String> {
        let _ = log::set_logger(&LOGGER);
        log::set_max_level(LevelFilter::Warn);
        let me = thread::current().id();
        RECORDS.lock().unwrap().retain(|(id, _, _)| *id != me);
        f();
        RECORDS
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, level, _)| *id == me && *level == Level::Warn)
            .map(|(_, _, message)| message.clone())
            .collect()
    }

    const DEFAULT_CHECKPOINTS: [u64; 12] = [0, 1, 2, 5, 10, 20, 50, 100, 200, 500, 1000, 2000];

    #[test]
    fn test_step_counts() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut state = FlipState::new();
        for _ in 0..500 {
            state.step(&mut rng);
        }
        assert_eq!(state.trials, 500);
        assert!(state.heads <= 500);
        assert!(state.heads > 200 && state.heads < 300);
    }

    #[test]
    fn test_run_emits_each_checkpoint() {
        let grid = BiasGrid::linspace_interior(1000).unwrap();
        let mut rng = StdRng::seed_from_u64(123456789);
        let mut simulator =
            CoinFlipSimulator::new(&grid, DEFAULT_CHECKPOINTS.to_vec(), &Simpson).unwrap();
        let mut curves: Vec<PosteriorCurve> = Vec::new();
        simulator.run(&mut rng, &mut curves).unwrap();

        let trials: Vec<u64> = curves.iter().map(|c| c.trials).collect();
        assert_eq!(trials, DEFAULT_CHECKPOINTS.to_vec());
        assert_eq!(simulator.state().trials, 2001);
        assert_eq!(curves[0].successes, 0);
        for pair in curves.windows(2) {
            assert!(pair[1].successes >= pair[0].successes);
            assert!(pair[1].successes - pair[0].successes <= pair[1].trials - pair[0].trials);
        }
        for curve in &curves {
            assert!(curve.normalized);
            let area = Simpson.integrate(&curve.density, &curve.bias).unwrap();
            assert!((area - 1.0).abs() < 1e-6, "N={} area={}", curve.trials, area);
        }
    }

    #[test]
    fn test_only_largest_checkpoint_is_approximated() {
        let grid = BiasGrid::linspace_interior(1000).unwrap();
        let mut rng = StdRng::seed_from_u64(123456789);
        let mut simulator =
            CoinFlipSimulator::new(&grid, DEFAULT_CHECKPOINTS.to_vec(), &Simpson).unwrap();
        let mut curves: Vec<PosteriorCurve> = Vec::new();
        simulator.run(&mut rng, &mut curves).unwrap();

        let approximated: Vec<u64> = curves
            .iter()
            .filter(|c| c.likelihood.is_approximate())
            .map(|c| c.trials)
            .collect();
        assert_eq!(approximated, vec![2000]);
    }

    #[test]
    fn test_one_warning_per_approximated_checkpoint() {
        let grid = BiasGrid::linspace_interior(1000).unwrap();
        let warnings = warnings_during(|| {
            let mut rng = StdRng::seed_from_u64(123456789);
            let mut simulator =
                CoinFlipSimulator::new(&grid, DEFAULT_CHECKPOINTS.to_vec(), &Simpson).unwrap();
            let mut curves: Vec<PosteriorCurve> = Vec::new();
            simulator.run(&mut rng, &mut curves).unwrap();
        });
        assert_eq!(warnings.len(), 1, "{:?}", warnings);
        assert!(warnings[0].contains("2000 flips"), "{}", warnings[0]);

        let warnings = warnings_during(|| {
            let mut rng = StdRng::seed_from_u64(5);
            let mut simulator = CoinFlipSimulator::new(&grid, vec![10, 1100, 2000], &Simpson).unwrap();
            let mut curves: Vec<PosteriorCurve> = Vec::new();
            simulator.run(&mut rng, &mut curves).unwrap();
        });
        assert_eq!(warnings.len(), 2, "{:?}", warnings);
        assert!(warnings[0].contains("1100 flips"));
        assert!(warnings[1].contains("2000 flips"));
    }

    #[test]
    fn test_same_seed_same_curves() {
        let grid = BiasGrid::linspace_interior(100).unwrap();
        let checkpoints = vec![0, 10, 50];
        let mut first: Vec<PosteriorCurve> = Vec::new();
        let mut second: Vec<PosteriorCurve> = Vec::new();
        for sink in [&mut first, &mut second] {
            let mut rng = StdRng::seed_from_u64(42);
            let mut simulator = CoinFlipSimulator::new(&grid, checkpoints.clone(), &Simpson).unwrap();
            simulator.run(&mut rng, sink).unwrap();
        }
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.successes, b.successes);
            assert_eq!(a.density, b.density);
        }
    }

    #[test]
    fn test_tee_forwards_to_both() {
        let grid = BiasGrid::linspace_interior(100).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let mut simulator = CoinFlipSimulator::new(&grid, vec![3, 9], &Simpson).unwrap();
        let mut left: Vec<PosteriorCurve> = Vec::new();
        let mut right: Vec<PosteriorCurve> = Vec::new();
        let mut tee = Tee {
            first: &mut left,
            second: &mut right,
        };
        simulator.run(&mut rng, &mut tee).unwrap();
        assert_eq!(left.len(), 2);
        assert_eq!(right.len(), 2);
        assert_eq!(left[1].successes, right[1].successes);
    }

    #[test]
    fn test_invalid_checkpoints() {
        let grid = BiasGrid::linspace_interior(10).unwrap();
        assert!(CoinFlipSimulator::new(&grid, vec![], &Simpson).is_err());
        assert!(CoinFlipSimulator::new(&grid, vec![5, 2], &Simpson).is_err());
        assert!(CoinFlipSimulator::new(&grid, vec![1, 1], &Simpson).is_err());
    }
}
