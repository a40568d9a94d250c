use clap::{Args, Parser, Subcommand, ValueEnum};
use nrfpairs::core::physics::doppler::DopplerModel;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "nrfpairs - find NRF gamma lines that are hard to tell apart in a two-layer (warhead and foil) measurement, and rank them by expected counts.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Rank branched and neighbouring line pairs for a material configuration.
    Analyze(AnalyzeArgs),
    /// List the accepted lines with their physics quantities and normalized counts.
    Lines(LinesArgs),
}

/// Input files and energy windows shared by all subcommands.
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Material list: `Z A n_warhead n_foil t_warhead t_foil` per line.
    #[arg(short, long, value_name = "PATH")]
    pub materials: Option<PathBuf>,

    /// NRF line database. Defaults to `standalone.dat`.
    #[arg(short, long, value_name = "PATH")]
    pub database: Option<PathBuf>,

    /// Non-resonant attenuation table. Defaults to `nonResonantAttenuation.txt`.
    #[arg(short, long, value_name = "PATH")]
    pub attenuation: Option<PathBuf>,

    /// Optional configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    // --- Energy windows ---
    /// Lowest accepted gamma energy (MeV).
    #[arg(long = "detector-min", value_name = "MEV", allow_negative_numbers = true)]
    pub detector_min: Option<f64>,

    /// Upper bound of accepted gamma energies (MeV, exclusive).
    #[arg(long = "detector-max", value_name = "MEV", allow_negative_numbers = true)]
    pub detector_max: Option<f64>,

    /// Lowest accepted level energy (MeV), i.e. the low end of the source spectrum.
    #[arg(long = "source-min", alias = "brems-min", value_name = "MEV", allow_negative_numbers = true)]
    pub source_min: Option<f64>,

    /// Upper bound of accepted level energies (MeV, exclusive).
    #[arg(long = "source-max", alias = "brems-max", value_name = "MEV", allow_negative_numbers = true)]
    pub source_max: Option<f64>,

    /// Temperature model for Doppler broadening.
    #[arg(long, value_enum, value_name = "MODEL")]
    pub doppler: Option<DopplerArg>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S search.top-branched=10
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `analyze` subcommand.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub inputs: InputArgs,

    /// Largest level-energy separation (MeV) at which two lines count as neighbours.
    #[arg(short = 'n', long, value_name = "MEV")]
    pub neighbour_threshold: Option<f64>,

    /// Number of branched pairs to report (all when omitted).
    #[arg(short = 'b', long, value_name = "INT")]
    pub top_branched: Option<usize>,

    /// Number of neighbouring pairs to report (all when omitted).
    #[arg(short = 'N', long, value_name = "INT")]
    pub top_neighbouring: Option<usize>,

    /// Write every reported pair to a CSV file.
    #[arg(long, value_name = "PATH")]
    pub pairs_csv: Option<PathBuf>,

    /// Request plots of the ranked pairs (not supported by this tool).
    #[arg(long)]
    pub plot: bool,
}

/// Arguments for the `lines` subcommand.
#[derive(Args, Debug)]
pub struct LinesArgs {
    #[command(flatten)]
    pub inputs: InputArgs,

    /// Write the accepted lines to a CSV file.
    #[arg(long, value_name = "PATH")]
    pub csv: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DopplerArg {
    /// Fixed 300 K.
    Room,
    /// Effective temperature of a Debye solid at 300 K.
    Effective,
}

impl From<DopplerArg> for DopplerModel {
    fn from(arg: DopplerArg) -> Self {
        match arg {
            DopplerArg::Room => DopplerModel::RoomTemperature,
            DopplerArg::Effective => DopplerModel::EffectiveTemperature,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analyze_parses_search_options() {
        let cli = Cli::parse_from([
            "nrfpairs",
            "analyze",
            "-m",
            "mats.txt",
            "-n",
            "0.002",
            "-b",
            "5",
            "--brems-max",
            "9.5",
            "--doppler",
            "effective",
        ]);
        let Commands::Analyze(args) = cli.command else {
            panic!("Expected 'analyze' subcommand");
        };
        assert_eq!(args.inputs.materials, Some(PathBuf::from("mats.txt")));
        assert_eq!(args.neighbour_threshold, Some(0.002));
        assert_eq!(args.top_branched, Some(5));
        assert_eq!(args.top_neighbouring, None);
        assert_eq!(args.inputs.source_max, Some(9.5));
        assert_eq!(args.inputs.doppler, Some(DopplerArg::Effective));
        assert!(!args.plot);
    }

    #[test]
    fn global_flags_work_after_subcommand() {
        let cli = Cli::parse_from(["nrfpairs", "lines", "-m", "mats.txt", "-vv"]);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Lines(_)));
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        let result = Cli::try_parse_from(["nrfpairs", "-q", "-v", "lines"]);
        assert!(result.is_err());
    }

    #[test]
    fn doppler_arg_maps_to_model() {
        assert_eq!(DopplerModel::from(DopplerArg::Room), DopplerModel::RoomTemperature);
        assert_eq!(
            DopplerModel::from(DopplerArg::Effective),
            DopplerModel::EffectiveTemperature
        );
    }
}
