use anyhow::Result;
use clap::Parser;
use coinstats_utils::io::EstimateWriter;
use coinstats_utils::monte_carlo;
use coinstats_utils::plot;
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

    info!("Running Monte Carlo integral of e^-x");
    exp_integral(&args)?;
    info!("Finished Monte Carlo integral");
    Ok(())
}

fn exp_integral(args: &cli::Cli) -> Result<()> {
    let global_timer = Instant::now();
    let bounds = monte_carlo::geometric_bounds(args.min_exponent, args.max_exponent)?;
    info!(
        "{} upper bounds, {} samples x {} repetitions each, seed {}",
        bounds.len(),
        args.samples,
        args.repeat,
        args.seed
    );

    let mut rng = StdRng::seed_from_u64(args.seed);
    let estimates = monte_carlo::sweep(args.lower, &bounds, args.samples, args.repeat, &mut rng)?;

    if let Some(table) = &args.table {
        let mut writer = EstimateWriter::new(Path::new(table))?;
        writer.write_estimates_iter(&estimates)?;
        info!("Wrote estimates to {}", table);
    }

    let reference = (-args.lower).exp();
    plot::render_integral_sweep(Path::new(&args.out), &estimates, reference)?;
    info!("Finished in {:?}", global_timer.elapsed());
    Ok(())
}
