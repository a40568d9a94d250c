pub mod analyze;
pub mod lines;

use crate::cli::InputArgs;
use crate::config::{InputPaths, PartialAnalysisConfig, ResolvedConfig, SearchOverrides};
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use nrfpairs::core::io::attenuation::{AttenuationTable, AttenuationTableFile};
use nrfpairs::core::io::database::LineDatabaseFile;
use nrfpairs::core::io::materials::MaterialListFile;
use nrfpairs::core::io::traits::DataFile;
use nrfpairs::core::models::line::NuclearLine;
use nrfpairs::core::models::material::MaterialEntry;
use std::path::Path;
use tracing::info;

/// Parsed contents of the three input files.
pub struct Inputs {
    pub materials: Vec<MaterialEntry>,
    pub database: Vec<NuclearLine>,
    pub attenuation: AttenuationTable,
}

pub fn resolve_config(args: &InputArgs, search: SearchOverrides) -> Result<ResolvedConfig> {
    let partial = PartialAnalysisConfig::load(args.config.as_deref())?;
    info!("Merging configuration from file and CLI arguments...");
    partial.merge_with_cli(args, search)
}

fn read_input<F: DataFile>(path: &Path, what: &str) -> Result<F::Output> {
    info!("Loading {} from {:?}", what, path);
    F::read_from_path(path).map_err(|e| CliError::FileParsing {
        path: path.to_path_buf(),
        source: e.into(),
    })
}

pub fn load_inputs(paths: &InputPaths) -> Result<Inputs> {
    let materials = read_input::<MaterialListFile>(&paths.materials, "material list")?;
    let database = read_input::<LineDatabaseFile>(&paths.database, "line database")?;
    let attenuation = read_input::<AttenuationTableFile>(&paths.attenuation, "attenuation table")?;
    info!(
        isotopes = materials.len(),
        records = database.len(),
        grid_points = attenuation.energies().len(),
        "Inputs loaded."
    );
    Ok(Inputs {
        materials,
        database,
        attenuation,
    })
}

pub fn progress_handler(quiet: bool) -> CliProgressHandler {
    if quiet {
        CliProgressHandler::hidden()
    } else {
        CliProgressHandler::new()
    }
}
