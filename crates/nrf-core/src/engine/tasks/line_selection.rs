use crate::core::io::attenuation::AttenuationTable;
use crate::core::models::isotope::IsotopeKey;
use crate::core::models::layers::Layers;
use crate::core::models::line::{LineEnvironment, NrfLine, NuclearLine};
use crate::core::models::material::{MaterialContext, MaterialEntry};
use crate::engine::config::AnalysisConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, instrument, trace, warn};

const PROGRESS_BATCH: usize = 1024;

/// Why a database record was not turned into a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rejection {
    InvalidWidth,
    NonPositiveBranch,
    UnlistedIsotope,
    OutsideDetectorWindow,
    OutsideSourceWindow,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSummary {
    pub scanned: usize,
    pub accepted: usize,
    pub invalid_width: usize,
    pub non_positive_branch: usize,
    pub unlisted_isotope: usize,
    pub outside_detector_window: usize,
    pub outside_source_window: usize,
    /// Accepted lines whose physics model came out degenerate.
    pub degenerate: usize,
}

impl SelectionSummary {
    fn record(&mut self, rejection: Rejection) {
        match rejection {
            Rejection::InvalidWidth => self.invalid_width += 1,
            Rejection::NonPositiveBranch => self.non_positive_branch += 1,
            Rejection::UnlistedIsotope => self.unlisted_isotope += 1,
            Rejection::OutsideDetectorWindow => self.outside_detector_window += 1,
            Rejection::OutsideSourceWindow => self.outside_source_window += 1,
        }
    }

    pub fn rejected(&self) -> usize {
        self.scanned - self.accepted
    }
}

#[derive(Debug, Clone)]
pub struct LineSelection {
    /// Accepted lines; each line's index equals its position.
    pub lines: Vec<NrfLine>,
    pub summary: SelectionSummary,
}

/// Decides whether a database record enters the analysis.
///
/// The level energy, not the gamma energy, is bounded by the source window.
pub fn screen(
    record: &NuclearLine,
    materials: &MaterialContext,
    config: &AnalysisConfig,
) -> Result<(), Rejection> {
    if !(record.level_width.is_finite() && record.level_width > 0.0) {
        return Err(Rejection::InvalidWidth);
    }
    if record.branch_to_final.is_nan() || record.branch_to_final <= 0.0 {
        return Err(Rejection::NonPositiveBranch);
    }
    if !materials.contains(&record.isotope) {
        return Err(Rejection::UnlistedIsotope);
    }
    if !config.detector_window.contains(record.gamma_energy) {
        return Err(Rejection::OutsideDetectorWindow);
    }
    if !config.source_window.contains(record.level_energy) {
        return Err(Rejection::OutsideSourceWindow);
    }
    Ok(())
}

/// Checks that every isotope of the material list has a column in the attenuation table.
pub fn check_attenuation_coverage(
    materials: &MaterialContext,
    attenuation: &AttenuationTable,
) -> Result<(), EngineError> {
    match materials.isotopes().find(|iso| !attenuation.covers(iso.z)) {
        Some(iso) => Err(EngineError::MaterialMismatch(format!(
            "isotope {} has no column in the attenuation table (covers Z = 1..={})",
            iso,
            attenuation.max_z()
        ))),
        None => Ok(()),
    }
}

/// Non-resonant cross sections of the whole material mix, per layer, at one grid energy.
struct MixtureAttenuation<'a> {
    materials: &'a MaterialContext,
    table: &'a AttenuationTable,
    cache: HashMap<usize, Layers<f64>>,
}

impl<'a> MixtureAttenuation<'a> {
    fn new(materials: &'a MaterialContext, table: &'a AttenuationTable) -> Self {
        Self {
            materials,
            table,
            cache: HashMap::new(),
        }
    }

    fn at_energy(&mut self, energy: f64) -> Result<Layers<f64>, EngineError> {
        let index = self.table.nearest_index(energy).ok_or_else(|| {
            EngineError::NumericDegeneracy(format!(
                "no attenuation grid point near {} MeV",
                energy
            ))
        })?;

        if let Some(sum) = self.cache.get(&index) {
            return Ok(*sum);
        }

        let mut sum = Layers::splat(0.0);
        for entry in self.materials.entries() {
            let sigma = self.element_cross_section(index, entry)?;
            sum.warhead += sigma * entry.number_density.warhead;
            sum.foil += sigma * entry.number_density.foil;
        }
        self.cache.insert(index, sum);
        Ok(sum)
    }

    fn element_cross_section(
        &self,
        index: usize,
        entry: &MaterialEntry,
    ) -> Result<f64, EngineError> {
        self.table.cross_section(index, entry.isotope.z).ok_or_else(|| {
            EngineError::MaterialMismatch(format!(
                "isotope {} has no attenuation data",
                entry.isotope
            ))
        })
    }
}

#[instrument(skip_all, name = "line_selection_task")]
pub fn run(
    database: &[NuclearLine],
    materials: &MaterialContext,
    attenuation: &AttenuationTable,
    config: &AnalysisConfig,
    reporter: &ProgressReporter,
) -> Result<LineSelection, EngineError> {
    info!(
        records = database.len(),
        isotopes = materials.len(),
        "Selecting NRF lines from database."
    );
    check_attenuation_coverage(materials, attenuation)?;

    reporter.report(Progress::TaskStart {
        total_steps: database.len() as u64,
    });

    let mut mixture = MixtureAttenuation::new(materials, attenuation);
    let mut summary = SelectionSummary::default();
    let mut lines = Vec::new();

    for (record_num, record) in database.iter().enumerate() {
        summary.scanned += 1;
        if (record_num + 1) % PROGRESS_BATCH == 0 {
            reporter.report(Progress::TaskAdvance {
                steps: PROGRESS_BATCH as u64,
            });
        }

        if let Err(rejection) = screen(record, materials, config) {
            trace!(record = record_num, ?rejection, "Record rejected.");
            summary.record(rejection);
            continue;
        }

        let Some(material) = materials.get(&record.isotope) else {
            summary.record(Rejection::UnlistedIsotope);
            continue;
        };

        let environment = LineEnvironment {
            number_density: material.number_density,
            thickness: material.thickness,
            non_resonant_level: mixture.at_energy(record.level_energy)?,
            non_resonant_gamma: mixture.at_energy(record.gamma_energy)?,
        };

        let line = NrfLine::new(lines.len(), *record, environment, config.doppler_model);
        if let Some(reason) = line.degeneracy() {
            warn!(
                index = line.index(),
                isotope = %line.isotope(),
                level_energy = line.level_energy(),
                %reason,
                "Line is numerically degenerate and will be excluded from ranking."
            );
            summary.degenerate += 1;
        }
        lines.push(line);
        summary.accepted += 1;
    }

    reporter.report(Progress::TaskAdvance {
        steps: (database.len() % PROGRESS_BATCH) as u64,
    });
    reporter.report(Progress::TaskFinish);

    warn_unused_isotopes(materials, &lines);

    info!(
        accepted = summary.accepted,
        rejected = summary.rejected(),
        degenerate = summary.degenerate,
        "Line selection complete."
    );
    debug!(?summary, "Rejection breakdown.");

    Ok(LineSelection { lines, summary })
}

fn warn_unused_isotopes(materials: &MaterialContext, lines: &[NrfLine]) {
    let used: HashSet<IsotopeKey> = lines.iter().map(|l| l.isotope()).collect();
    for isotope in materials.isotopes().filter(|iso| !used.contains(iso)) {
        warn!(%isotope, "No lines accepted for isotope in material list.");
    }
}
