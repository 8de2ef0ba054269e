//! CLI for randcheck: bounded-integer sequence generation and randomness testing.

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "randcheck")]
#[command(about = "randcheck: generate bounded-integer sequences and test their randomness")]
#[command(version = randcheck_core::VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List distribution families and their range-derived defaults
    Distributions {
        /// Range N used to show concrete default parameters
        #[arg(long, default_value = "100")]
        range: u32,
    },

    /// Generate a sequence and print or save it
    Generate {
        /// Distribution family (simple, uniform, normal, exponential, poisson, chi_square, mixed)
        #[arg(long, default_value = "uniform")]
        distribution: String,

        /// Exclusive upper bound N of the value range
        #[arg(long, default_value = "100")]
        range: u32,

        /// Number of values to generate
        #[arg(long, default_value = "10000")]
        count: usize,

        /// Seed for reproducible output (default: fresh entropy)
        #[arg(long)]
        seed: Option<u64>,

        #[command(flatten)]
        params: ParamArgs,

        /// Output format
        #[arg(long, default_value = "text", value_parser = ["text", "raw", "json"])]
        format: String,

        /// Write to this file instead of stdout
        #[arg(long)]
        output: Option<String>,
    },

    /// Generate, test and write per-distribution reports and tables
    Report {
        /// Distribution family, or "all"
        #[arg(long, default_value = "all")]
        distribution: String,

        /// Exclusive upper bound N of the value range
        #[arg(long, default_value = "100")]
        range: u32,

        /// Number of values per distribution
        #[arg(long, default_value = "10000")]
        count: usize,

        /// Seed for reproducible output (default: fresh entropy)
        #[arg(long)]
        seed: Option<u64>,

        #[command(flatten)]
        params: ParamArgs,

        /// Output directory
        #[arg(long, default_value = "output")]
        output: String,

        /// Write test results as JSON instead of markdown
        #[arg(long)]
        json: bool,
    },

    /// Run the test battery on an existing sequence
    Test {
        /// Path to the sequence file
        #[arg(long)]
        input: String,

        /// Exclusive upper bound N of the value range
        #[arg(long)]
        range: u32,

        /// Input format: whitespace/comma separated integers, or one byte per value
        #[arg(long, default_value = "text", value_parser = ["text", "raw"])]
        format: String,

        /// Print the full battery report as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Distribution parameter overrides; unset values use the range-derived defaults.
#[derive(clap::Args)]
struct ParamArgs {
    /// Normal mean (default N/2)
    #[arg(long)]
    mean: Option<f64>,

    /// Normal standard deviation (default N/6)
    #[arg(long)]
    std_dev: Option<f64>,

    /// Exponential scale (default N/4)
    #[arg(long)]
    scale: Option<f64>,

    /// Poisson rate (default N/2)
    #[arg(long)]
    rate: Option<f64>,

    /// Chi-square degrees of freedom (default floor(N/2))
    #[arg(long)]
    df: Option<f64>,

    /// Mixed weights as five comma-separated numbers
    /// (uniform, normal, exponential, poisson, chi_square)
    #[arg(long)]
    weights: Option<String>,
}

impl ParamArgs {
    fn overrides(&self) -> commands::ParamOverrides<'_> {
        commands::ParamOverrides {
            mean: self.mean,
            std_dev: self.std_dev,
            scale: self.scale,
            rate: self.rate,
            degrees_of_freedom: self.df,
            weights: self.weights.as_deref(),
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Distributions { range } => commands::distributions::run(range),
        Commands::Generate {
            distribution,
            range,
            count,
            seed,
            params,
            format,
            output,
        } => commands::generate::run(commands::generate::GenerateCommandConfig {
            distribution: &distribution,
            range,
            count,
            seed,
            overrides: params.overrides(),
            format: &format,
            output_path: output.as_deref(),
        }),
        Commands::Report {
            distribution,
            range,
            count,
            seed,
            params,
            output,
            json,
        } => commands::report::run(commands::report::ReportCommandConfig {
            distribution: &distribution,
            range,
            count,
            seed,
            overrides: params.overrides(),
            output_dir: &output,
            json,
        }),
        Commands::Test {
            input,
            range,
            format,
            json,
        } => commands::test::run(&input, range, &format, json),
    }
}
