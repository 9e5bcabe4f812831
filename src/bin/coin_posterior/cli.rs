use clap::{Parser, ValueEnum};
use coinstats_utils::integrate::IntegrationRule;
/// Posterior of a coin's bias after a growing number of simulated flips.
#[derive(Parser, Debug)]
#[command(name = "coin_posterior", version, about = "Bayesian posterior of a coin's bias")]
pub struct Cli {
    #[arg(
        long,
        short,
        default_value = "coin_bias_posterior.png",
        value_name = "OUT",
        help = "Output figure path (.png or .svg)"
    )]
    pub out: String,

    #[arg(
        long,
        value_name = "TABLE",
        help = "Optional tab-separated file with every normalized curve"
    )]
    pub table: Option<String>,

    #[arg(long, default_value = "123456789", help = "Seed for the coin flips")]
    pub seed: u64,

    #[arg(
        long,
        default_value = "1000",
        help = "Points spanning [0, 1]; both ends are dropped from the bias grid"
    )]
    pub resolution: usize,

    #[arg(
        long,
        value_delimiter = ',',
        default_value = "0,1,2,5,10,20,50,100,200,500,1000,2000",
        help = "Flip counts at which the posterior is plotted"
    )]
    pub checkpoints: Vec<u64>,

    #[arg(
        long,
        default_value = "simpson",
        value_name = "RULE",
        help = "Integration rule used to normalize the posterior (simpson, trapezoid)"
    )]
    pub integration: IntegrationRule,

    #[arg(long, default_value = "3", help = "Panels per row in the figure")]
    pub columns: usize,

    #[arg(
        value_enum,
        long,
        default_value = "normal",
        value_name = "VERBOSITY",
        help = "Verbosity level"
    )]
    pub verbosity: LogLevel,
}

#[derive(ValueEnum, Clone, Debug)]
pub enum LogLevel {
    verbose,
    normal,
    silent,
}
