use crate::cli::InputArgs;
use crate::error::{CliError, Result};
use nrfpairs::core::physics::doppler::DopplerModel;
use nrfpairs::engine::config::{
    AnalysisConfig, AnalysisConfigBuilder, DEFAULT_NEIGHBOUR_THRESHOLD_MEV, DEFAULT_WINDOW_MAX_MEV,
    DEFAULT_WINDOW_MIN_MEV, EnergyWindow,
};
use serde::Deserialize;
use serde::de::IntoDeserializer;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

pub const DEFAULT_DATABASE: &str = "standalone.dat";
pub const DEFAULT_ATTENUATION: &str = "nonResonantAttenuation.txt";

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialInputs {
    materials: Option<PathBuf>,
    database: Option<PathBuf>,
    attenuation: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialWindows {
    #[serde(rename = "detector-min")]
    detector_min: Option<f64>,
    #[serde(rename = "detector-max")]
    detector_max: Option<f64>,
    #[serde(rename = "source-min")]
    source_min: Option<f64>,
    #[serde(rename = "source-max")]
    source_max: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialSearch {
    #[serde(rename = "neighbour-threshold")]
    neighbour_threshold: Option<f64>,
    #[serde(rename = "top-branched")]
    top_branched: Option<usize>,
    #[serde(rename = "top-neighbouring")]
    top_neighbouring: Option<usize>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialPhysics {
    #[serde(rename = "doppler-model")]
    doppler_model: Option<DopplerModel>,
}

/// Configuration file contents; every key is optional.
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialAnalysisConfig {
    inputs: Option<PartialInputs>,
    windows: Option<PartialWindows>,
    search: Option<PartialSearch>,
    physics: Option<PartialPhysics>,
}

/// Search settings given as command-line flags.
#[derive(Debug, Default, Clone, Copy)]
pub struct SearchOverrides {
    pub neighbour_threshold: Option<f64>,
    pub top_branched: Option<usize>,
    pub top_neighbouring: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InputPaths {
    pub materials: PathBuf,
    pub database: PathBuf,
    pub attenuation: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub inputs: InputPaths,
    pub analysis: AnalysisConfig,
}

impl PartialAnalysisConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Reads the config file when one is given, otherwise starts empty.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Resolves the final settings. Precedence: CLI flag, then `--set`, then file,
    /// then built-in default.
    pub fn merge_with_cli(
        mut self,
        args: &InputArgs,
        search: SearchOverrides,
    ) -> Result<ResolvedConfig> {
        self.apply_set_values(&args.set_values)?;

        let inputs = self.inputs.take().unwrap_or_default();
        let windows = self.windows.take().unwrap_or_default();
        let file_search = self.search.take().unwrap_or_default();
        let physics = self.physics.take().unwrap_or_default();

        let materials = args
            .materials
            .clone()
            .or(inputs.materials)
            .ok_or_else(|| {
                CliError::Config(
                    "A material list is required either as `inputs.materials` in the config file or via --materials."
                        .to_string(),
                )
            })?;
        let database = args
            .database
            .clone()
            .or(inputs.database)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE));
        let attenuation = args
            .attenuation
            .clone()
            .or(inputs.attenuation)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ATTENUATION));

        let detector_window = EnergyWindow::new(
            args.detector_min
                .or(windows.detector_min)
                .unwrap_or(DEFAULT_WINDOW_MIN_MEV),
            args.detector_max
                .or(windows.detector_max)
                .unwrap_or(DEFAULT_WINDOW_MAX_MEV),
        );
        let source_window = EnergyWindow::new(
            args.source_min
                .or(windows.source_min)
                .unwrap_or(DEFAULT_WINDOW_MIN_MEV),
            args.source_max
                .or(windows.source_max)
                .unwrap_or(DEFAULT_WINDOW_MAX_MEV),
        );

        let doppler_model = args
            .doppler
            .map(DopplerModel::from)
            .or(physics.doppler_model)
            .unwrap_or_default();

        let analysis = AnalysisConfigBuilder::new()
            .neighbour_threshold(
                search
                    .neighbour_threshold
                    .or(file_search.neighbour_threshold)
                    .unwrap_or(DEFAULT_NEIGHBOUR_THRESHOLD_MEV),
            )
            .detector_window(detector_window)
            .source_window(source_window)
            .top_branched(search.top_branched.or(file_search.top_branched))
            .top_neighbouring(search.top_neighbouring.or(file_search.top_neighbouring))
            .doppler_model(doppler_model)
            .build()
            .map_err(|e| CliError::Config(e.to_string()))?;

        Ok(ResolvedConfig {
            inputs: InputPaths {
                materials,
                database,
                attenuation,
            },
            analysis,
        })
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let (key, value_str) = kv_pair.split_once('=').ok_or_else(|| {
                CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                ))
            })?;

            match key {
                "inputs.materials" => {
                    self.inputs.get_or_insert_with(Default::default).materials =
                        Some(PathBuf::from(value_str));
                }
                "inputs.database" => {
                    self.inputs.get_or_insert_with(Default::default).database =
                        Some(PathBuf::from(value_str));
                }
                "inputs.attenuation" => {
                    self.inputs.get_or_insert_with(Default::default).attenuation =
                        Some(PathBuf::from(value_str));
                }
                "windows.detector-min" => {
                    self.windows.get_or_insert_with(Default::default).detector_min =
                        Some(parse_value(key, value_str, "float")?);
                }
                "windows.detector-max" => {
                    self.windows.get_or_insert_with(Default::default).detector_max =
                        Some(parse_value(key, value_str, "float")?);
                }
                "windows.source-min" => {
                    self.windows.get_or_insert_with(Default::default).source_min =
                        Some(parse_value(key, value_str, "float")?);
                }
                "windows.source-max" => {
                    self.windows.get_or_insert_with(Default::default).source_max =
                        Some(parse_value(key, value_str, "float")?);
                }
                "search.neighbour-threshold" => {
                    self.search
                        .get_or_insert_with(Default::default)
                        .neighbour_threshold = Some(parse_value(key, value_str, "float")?);
                }
                "search.top-branched" => {
                    self.search.get_or_insert_with(Default::default).top_branched =
                        Some(parse_value(key, value_str, "integer")?);
                }
                "search.top-neighbouring" => {
                    self.search
                        .get_or_insert_with(Default::default)
                        .top_neighbouring = Some(parse_value(key, value_str, "integer")?);
                }
                "physics.doppler-model" => {
                    self.physics.get_or_insert_with(Default::default).doppler_model =
                        Some(parse_doppler_model(value_str)?);
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}

fn parse_value<T: FromStr>(key: &str, value_str: &str, kind: &str) -> Result<T> {
    value_str.trim().parse().map_err(|_| {
        CliError::Config(format!("Invalid {} value for {}: {}", kind, key, value_str))
    })
}

fn parse_doppler_model(value_str: &str) -> Result<DopplerModel> {
    let deserializer: serde::de::value::StrDeserializer<'_, serde::de::value::Error> =
        value_str.trim().into_deserializer();
    DopplerModel::deserialize(deserializer).map_err(|e| {
        CliError::Config(format!(
            "Invalid value for physics.doppler-model: {} ({})",
            value_str, e
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use once_cell::sync::Lazy;
    use std::fs;
    use tempfile::{TempDir, tempdir};

    static TEST_DIR: Lazy<TempDir> = Lazy::new(|| tempdir().expect("Failed to create temp dir"));

    fn write_config_file(name: &str, content: &str) -> PathBuf {
        let file_path = TEST_DIR.path().join(name);
        fs::write(&file_path, content).unwrap();
        file_path
    }

    fn resolve(args: &[&str]) -> Result<ResolvedConfig> {
        let mut argv = vec!["nrfpairs", "analyze"];
        argv.extend_from_slice(args);
        let Commands::Analyze(args) = Cli::parse_from(argv).command else {
            panic!("Expected 'analyze' subcommand");
        };
        let search = SearchOverrides {
            neighbour_threshold: args.neighbour_threshold,
            top_branched: args.top_branched,
            top_neighbouring: args.top_neighbouring,
        };
        PartialAnalysisConfig::load(args.inputs.config.as_deref())?
            .merge_with_cli(&args.inputs, search)
    }

    #[test]
    fn defaults_fill_everything_but_materials() {
        let resolved = resolve(&["-m", "mats.txt"]).unwrap();

        assert_eq!(resolved.inputs.materials, PathBuf::from("mats.txt"));
        assert_eq!(resolved.inputs.database, PathBuf::from("standalone.dat"));
        assert_eq!(
            resolved.inputs.attenuation,
            PathBuf::from("nonResonantAttenuation.txt")
        );
        assert_eq!(resolved.analysis, AnalysisConfig::default());
    }

    #[test]
    fn missing_materials_is_config_error() {
        let result = resolve(&[]);
        assert!(matches!(result, Err(CliError::Config(msg)) if msg.contains("material")));
    }

    #[test]
    fn file_values_are_used_when_no_flag_is_given() {
        let config_path = write_config_file(
            "config_file_values.toml",
            r#"
            [inputs]
            materials = "warhead.txt"
            database = "lines.dat"

            [windows]
            detector-min = 1.0
            detector-max = 2.5
            source-max = 9.0

            [search]
            neighbour-threshold = 0.002
            top-branched = 5

            [physics]
            doppler-model = "effective-temperature"
            "#,
        );
        let resolved = resolve(&["-c", config_path.to_str().unwrap()]).unwrap();

        assert_eq!(resolved.inputs.materials, PathBuf::from("warhead.txt"));
        assert_eq!(resolved.inputs.database, PathBuf::from("lines.dat"));
        assert_eq!(
            resolved.analysis.detector_window,
            EnergyWindow::new(1.0, 2.5)
        );
        assert_eq!(resolved.analysis.source_window, EnergyWindow::new(0.0, 9.0));
        assert_eq!(resolved.analysis.neighbour_threshold, 0.002);
        assert_eq!(resolved.analysis.top_branched, Some(5));
        assert_eq!(resolved.analysis.top_neighbouring, None);
        assert_eq!(
            resolved.analysis.doppler_model,
            DopplerModel::EffectiveTemperature
        );
    }

    #[test]
    fn cli_args_override_set_values_and_file() {
        let config_path = write_config_file(
            "config_precedence.toml",
            r#"
            [inputs]
            materials = "warhead.txt"

            [search]
            top-branched = 5 # Overridden by --set and then by -b
            top-neighbouring = 4 # Overridden by --set
            neighbour-threshold = 0.01 # Kept
            "#,
        );
        let resolved = resolve(&[
            "-c",
            config_path.to_str().unwrap(),
            "-S",
            "search.top-branched=7",
            "-S",
            "search.top-neighbouring=8",
            "-b",
            "9",
        ])
        .unwrap();

        assert_eq!(resolved.analysis.top_branched, Some(9));
        assert_eq!(resolved.analysis.top_neighbouring, Some(8));
        assert_eq!(resolved.analysis.neighbour_threshold, 0.01);
    }

    #[test]
    fn set_value_accepts_doppler_model_name() {
        let resolved = resolve(&[
            "-m",
            "mats.txt",
            "-S",
            "physics.doppler-model=effective-temperature",
        ])
        .unwrap();
        assert_eq!(
            resolved.analysis.doppler_model,
            DopplerModel::EffectiveTemperature
        );

        let result = resolve(&["-m", "mats.txt", "-S", "physics.doppler-model=hot"]);
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn malformed_or_unknown_set_values_are_rejected() {
        let result = resolve(&["-m", "mats.txt", "-S", "search.top-branched"]);
        assert!(matches!(result, Err(CliError::Config(msg)) if msg.contains("KEY=VALUE")));

        let result = resolve(&["-m", "mats.txt", "-S", "search.top-branched=many"]);
        assert!(matches!(result, Err(CliError::Config(msg)) if msg.contains("integer")));

        let result = resolve(&["-m", "mats.txt", "-S", "optimization.num-solutions=3"]);
        assert!(matches!(result, Err(CliError::Config(msg)) if msg.contains("Unsupported")));
    }

    #[test]
    fn unknown_file_key_is_parse_error() {
        let config_path = write_config_file(
            "config_unknown.toml",
            r#"
            [search]
            top-branch = 5
            "#,
        );
        let result = resolve(&["-m", "mats.txt", "-c", config_path.to_str().unwrap()]);
        assert!(matches!(result, Err(CliError::FileParsing { .. })));
    }

    #[test]
    fn invalid_window_is_reported_as_config_error() {
        let result = resolve(&["-m", "mats.txt", "--detector-min", "5", "--detector-max", "2"]);
        assert!(matches!(result, Err(CliError::Config(msg)) if msg.contains("Detector")));
    }
}
