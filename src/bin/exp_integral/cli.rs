use clap::{Parser, ValueEnum};
/// Monte Carlo estimate of the integral of e^-x over [a, b] for growing b.
#[derive(Parser, Debug)]
#[command(name = "exp_integral", version, about = "Monte Carlo integral of e^-x")]
pub struct Cli {
    #[arg(
        long,
        short,
        default_value = "exp_integral.png",
        value_name = "OUT",
        help = "Output figure path (.png or .svg)"
    )]
    pub out: String,

    #[arg(
        long,
        value_name = "TABLE",
        help = "Optional tab-separated file with one row per upper bound"
    )]
    pub table: Option<String>,

    #[arg(long, default_value = "123456789", help = "Seed for the uniform samples")]
    pub seed: u64,

    #[arg(long, default_value = "2", help = "Lower integration bound a")]
    pub lower: f64,

    #[arg(long, default_value = "1", help = "Smallest upper bound is 10^min_exponent")]
    pub min_exponent: i32,

    #[arg(long, default_value = "6", help = "Largest upper bound is 10^max_exponent")]
    pub max_exponent: i32,

    #[arg(long, short = 'n', default_value = "10000", help = "Uniform samples per estimate")]
    pub samples: usize,

    #[arg(long, short, default_value = "1000", help = "Estimates per upper bound")]
    pub repeat: usize,

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
