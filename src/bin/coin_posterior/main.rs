use anyhow::Result;
use clap::Parser;
use coinstats_utils::conjugate::CoinBeta;
use coinstats_utils::grid::BiasGrid;
use coinstats_utils::io::CurveWriter;
use coinstats_utils::plot;
use coinstats_utils::posterior::PosteriorCurve;
use coinstats_utils::simulation::{CoinFlipSimulator, Tee};
use env_logger::Env;
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::Path;
use std::time::Instant;

mod cli;

fn main() -> Result<()> {
    let args = cli::Cli::parse();
    // Set up logging level
    match args.verbosity {
        cli::LogLevel::silent => {
            env_logger::Builder::from_env(Env::default().default_filter_or("off")).init();
        }
        cli::LogLevel::normal => {
            env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
        }
        cli::LogLevel::verbose => {
            env_logger::Builder::from_env(Env::default().default_filter_or("debug")).init();
        }
    }

    info!("Running coin bias posterior");
    coin_posterior(&args)?;
    info!("Finished coin bias posterior");
    Ok(())
}

fn coin_posterior(args: &cli::Cli) -> Result<()> {
    let global_timer = Instant::now();
    let grid = BiasGrid::linspace_interior(args.resolution)?;
    let integrator = args.integration.integrator();
    info!(
        "Bias grid of {} points, {} integration, seed {}",
        grid.len(),
        args.integration,
        args.seed
    );

    let mut rng = StdRng::seed_from_u64(args.seed);
    let mut simulator = CoinFlipSimulator::new(&grid, args.checkpoints.clone(), integrator.as_ref())?;
    let mut curves: Vec<PosteriorCurve> = Vec::with_capacity(args.checkpoints.len());
    match &args.table {
        Some(table) => {
            let mut writer = CurveWriter::new(Path::new(table))?;
            let mut tee = Tee {
                first: &mut curves,
                second: &mut writer,
            };
            simulator.run(&mut rng, &mut tee)?;
            writer.flush()?;
            info!("Wrote posterior table to {}", table);
        }
        None => simulator.run(&mut rng, &mut curves)?,
    }

    for curve in &curves {
        let reference = CoinBeta::from_flips(curve.trials, curve.successes)?;
        info!(
            "{} flips, {} heads ({}): mean {:.4} sd {:.4}, closed form mean {:.4} sd {:.4}",
            curve.trials,
            curve.successes,
            curve.likelihood,
            curve.mean(integrator.as_ref())?,
            curve.variance(integrator.as_ref())?.sqrt(),
            reference.mean(),
            reference.standard_deviation()
        );
    }

    plot::render_posterior_grid(Path::new(&args.out), &curves, args.columns)?;
    info!("Finished in {:?}", global_timer.elapsed());
    Ok(())
}
