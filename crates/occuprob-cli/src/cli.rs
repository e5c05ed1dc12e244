use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Luis Gálvez",
    version,
    about = "OccuProb CLI - Occupation probabilities and heat capacity of isomer ensembles in the superposition approximation.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output
    #[arg(long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for parallel computation.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute occupation probabilities and heat capacity over a temperature range.
    Run(RunArgs),
    /// Print the resolved properties of every isomer in an input file.
    Inspect(InspectArgs),
}

/// Arguments for the `run` subcommand.
#[derive(Args, Debug)]
pub struct RunArgs {
    // --- Core Arguments ---
    /// Path to the isomer file in TOML format.
    #[arg(required = true, value_name = "INPUT")]
    pub input: PathBuf,

    /// Output filename prefix; `_p.dat` and `_c.dat` are appended.
    /// Defaults to the input path without its extension.
    #[arg(short, long, value_name = "PREFIX")]
    pub output: Option<PathBuf>,

    /// Path to a run configuration file in TOML format.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    // --- Degrees of Freedom ---
    #[command(flatten)]
    pub electronic: ElectronicFlags,

    #[command(flatten)]
    pub vibrational: VibrationalFlags,

    /// Include the rigid-rotor rotational partition function.
    #[arg(short, long)]
    pub rotational: bool,

    // --- Temperature Range ---
    /// Minimum temperature in K (default: 0).
    #[arg(long, value_name = "KELVIN")]
    pub min_temp: Option<f64>,

    /// Maximum temperature in K (default: 500).
    #[arg(long, value_name = "KELVIN")]
    pub max_temp: Option<f64>,

    /// Temperature step in K (default: 1).
    #[arg(long, value_name = "KELVIN")]
    pub step: Option<f64>,

    /// Distance tolerance in Å used when determining symmetry orders from atoms.
    #[arg(long, value_name = "ANGSTROM")]
    pub symmetry_tolerance: Option<f64>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S temperature.max=1000
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Mutually exclusive electronic partition function flags.
#[derive(Args, Debug, Clone, Copy, Default)]
#[group(required = false, multiple = false)]
pub struct ElectronicFlags {
    /// Electronic partition function (every isomer non-degenerate).
    #[arg(short = 'e', long)]
    pub electronic: bool,
    /// Electronic partition function weighted by spin multiplicity.
    #[arg(short = 's', long)]
    pub spin: bool,
}

/// Mutually exclusive vibrational partition function flags.
#[derive(Args, Debug, Clone, Copy, Default)]
#[group(required = false, multiple = false)]
pub struct VibrationalFlags {
    /// Classical harmonic vibrational partition function.
    #[arg(short = 'c', long)]
    pub classical: bool,
    /// Quantum harmonic vibrational partition function.
    #[arg(short = 'Q', long)]
    pub quantum: bool,
}

/// Arguments for the `inspect` subcommand.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Path to the isomer file in TOML format.
    #[arg(required = true, value_name = "INPUT")]
    pub input: PathBuf,

    /// Distance tolerance in Å used when determining symmetry orders from atoms.
    #[arg(long, value_name = "ANGSTROM")]
    pub symmetry_tolerance: Option<f64>,
}
