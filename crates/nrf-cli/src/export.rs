use crate::error::{CliError, Result};
use nrfpairs::core::models::line::NrfLine;
use nrfpairs::engine::tasks::pair_search::PairKind;
use nrfpairs::workflows::analyze::{AnalysisResult, LineSet};
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// One ranked pair, flattened for CSV.
#[derive(Debug, Serialize)]
pub struct PairRecord {
    pub kind: PairKind,
    pub rank: usize,
    pub line_a: usize,
    pub line_b: usize,
    pub z_a: u32,
    pub a_a: u32,
    pub z_b: u32,
    pub a_b: u32,
    pub level_energy_a: f64,
    pub level_energy_b: f64,
    pub gamma_energy_a: f64,
    pub gamma_energy_b: f64,
    pub alpha_foil_a: f64,
    pub alpha_foil_b: f64,
    pub alpha_ratio: f64,
    /// `sigma_min` for branched pairs, `strength_min` for neighbouring pairs.
    pub cross_section_metric: f64,
    pub count_min: f64,
}

impl PairRecord {
    fn new(
        kind: PairKind,
        rank: usize,
        a: &NrfLine,
        b: &NrfLine,
        alpha_ratio: f64,
        cross_section_metric: f64,
        count_min: f64,
    ) -> Self {
        Self {
            kind,
            rank,
            line_a: a.index(),
            line_b: b.index(),
            z_a: a.isotope().z,
            a_a: a.isotope().a,
            z_b: b.isotope().z,
            a_b: b.isotope().a,
            level_energy_a: a.level_energy(),
            level_energy_b: b.level_energy(),
            gamma_energy_a: a.gamma_energy(),
            gamma_energy_b: b.gamma_energy(),
            alpha_foil_a: a.alpha_foil(),
            alpha_foil_b: b.alpha_foil(),
            alpha_ratio,
            cross_section_metric,
            count_min,
        }
    }
}

/// One accepted line, flattened for CSV.
#[derive(Debug, Serialize)]
pub struct LineRecord {
    pub index: usize,
    pub z: u32,
    pub a: u32,
    pub level_energy: f64,
    pub gamma_energy: f64,
    pub level_width: f64,
    pub branch_to_final: f64,
    pub branch_to_ground: f64,
    pub sigma_int_warhead: f64,
    pub sigma_int_foil: f64,
    pub doppler_width: f64,
    pub alpha_warhead: f64,
    pub alpha_foil: f64,
    pub counts: f64,
    pub status: String,
}

impl From<&NrfLine> for LineRecord {
    fn from(line: &NrfLine) -> Self {
        let params = line.params();
        let q = line.quantities();
        Self {
            index: line.index(),
            z: params.isotope.z,
            a: params.isotope.a,
            level_energy: params.level_energy,
            gamma_energy: params.gamma_energy,
            level_width: params.level_width,
            branch_to_final: params.branch_to_final,
            branch_to_ground: params.branch_to_ground,
            sigma_int_warhead: q.integrated_cross_section.warhead,
            sigma_int_foil: q.integrated_cross_section.foil,
            doppler_width: q.doppler_width,
            alpha_warhead: q.alpha.warhead,
            alpha_foil: q.alpha.foil,
            counts: line.counts(),
            status: line
                .degeneracy()
                .map_or_else(|| "ok".to_string(), |d| d.to_string()),
        }
    }
}

/// Branched pairs first, then neighbouring, each in rank order.
pub fn pair_records(result: &AnalysisResult) -> Vec<PairRecord> {
    let set = &result.lines;

    let branched = result
        .branched
        .entries()
        .iter()
        .enumerate()
        .filter_map(|(rank, p)| {
            let (a, b) = set.pair(p)?;
            Some(PairRecord::new(
                PairKind::Branched,
                rank + 1,
                a,
                b,
                p.alpha_ratio,
                p.sigma_min,
                p.count_min,
            ))
        });
    let neighbouring = result
        .neighbouring
        .entries()
        .iter()
        .enumerate()
        .filter_map(|(rank, p)| {
            let (a, b) = set.pair(p)?;
            Some(PairRecord::new(
                PairKind::Neighbouring,
                rank + 1,
                a,
                b,
                p.alpha_ratio,
                p.strength_min,
                p.count_min,
            ))
        });
    branched.chain(neighbouring).collect()
}

pub fn line_records(set: &LineSet) -> Vec<LineRecord> {
    set.lines.iter().map(LineRecord::from).collect()
}

pub fn write_csv<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    let export_error = |e: csv::Error| CliError::Export {
        path: path.to_path_buf(),
        source: e.into(),
    };

    let mut writer = csv::Writer::from_path(path).map_err(export_error)?;
    for record in records {
        writer.serialize(record).map_err(export_error)?;
    }
    writer.flush()?;

    info!(rows = records.len(), path = %path.display(), "CSV written.");
    Ok(())
}
