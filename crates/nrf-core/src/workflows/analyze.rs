use crate::core::io::attenuation::AttenuationTable;
use crate::core::models::isotope::IsotopeKey;
use crate::core::models::line::{NrfLine, NuclearLine};
use crate::core::models::material::{MaterialContext, MaterialEntry};
use crate::engine::config::AnalysisConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::{ProgressReporter, Stage};
use crate::engine::ranking::{RankedPair, RankedPairs, rank};
use crate::engine::tasks::line_selection::{self, SelectionSummary};
use crate::engine::tasks::normalization;
use crate::engine::tasks::pair_search::{self, BranchedPair, NeighbouringPair};
use tracing::{info, instrument, warn};

/// Accepted lines of one run, normalized when at least one line is usable.
#[derive(Debug, Clone)]
pub struct LineSet {
    /// Every accepted line, degenerate ones included; `lines[i].index() == i`.
    pub lines: Vec<NrfLine>,
    pub selection: SelectionSummary,
    /// `None` when no usable line survived selection.
    pub source_strength: Option<f64>,
    pub reference_isotope: Option<IsotopeKey>,
}

impl LineSet {
    pub fn line(&self, index: usize) -> Option<&NrfLine> {
        self.lines.get(index)
    }

    /// The two lines a ranked pair refers to.
    pub fn pair<P: RankedPair>(&self, pair: &P) -> Option<(&NrfLine, &NrfLine)> {
        let [a, b] = pair.lines();
        Some((self.line(a)?, self.line(b)?))
    }

    pub fn degenerate_count(&self) -> usize {
        self.selection.degenerate
    }

    pub fn is_normalized(&self) -> bool {
        self.source_strength.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub lines: LineSet,
    pub branched: RankedPairs<BranchedPair>,
    pub neighbouring: RankedPairs<NeighbouringPair>,
}

/// Selects, models, and normalizes the lines of one material configuration.
#[instrument(skip_all, name = "line_set_workflow")]
pub fn prepare_lines(
    materials: Vec<MaterialEntry>,
    database: &[NuclearLine],
    attenuation: &AttenuationTable,
    config: &AnalysisConfig,
    reporter: &ProgressReporter,
) -> Result<LineSet, EngineError> {
    config.validate()?;

    let context = reporter.stage(Stage::Materials, || {
        let context = MaterialContext::new(materials)?;
        line_selection::check_attenuation_coverage(&context, attenuation)?;
        info!(isotopes = context.len(), "Material list validated.");
        Ok::<_, EngineError>(context)
    })?;

    let selection = reporter.stage(Stage::LineSelection, || {
        line_selection::run(database, &context, attenuation, config, reporter)
    })?;

    if !selection.lines.iter().any(NrfLine::is_valid) {
        let reason = if selection.lines.is_empty() {
            "no line passed the selection filters"
        } else {
            "every accepted line is numerically degenerate"
        };
        warn!(
            scanned = selection.summary.scanned,
            accepted = selection.summary.accepted,
            "{}; returning an empty result.",
            reason
        );
        reporter.message(format!("Empty result: {}", reason));
        return Ok(LineSet {
            lines: selection.lines,
            selection: selection.summary,
            source_strength: None,
            reference_isotope: None,
        });
    }

    let normalized = reporter.stage(Stage::Normalization, || {
        normalization::run(selection.lines)
    })?;

    Ok(LineSet {
        lines: normalized.lines,
        selection: selection.summary,
        source_strength: Some(normalized.source_strength),
        reference_isotope: Some(normalized.reference_isotope),
    })
}

/// Runs the whole analysis for one material configuration.
#[instrument(skip_all, name = "analysis_workflow")]
pub fn run(
    materials: Vec<MaterialEntry>,
    database: &[NuclearLine],
    attenuation: &AttenuationTable,
    config: &AnalysisConfig,
    reporter: &ProgressReporter,
) -> Result<AnalysisResult, EngineError> {
    let lines = prepare_lines(materials, database, attenuation, config, reporter)?;

    let buckets = reporter.stage(Stage::PairSearch, || {
        pair_search::run(&lines.lines, config.neighbour_threshold, reporter)
    });

    let (branched, neighbouring) = reporter.stage(Stage::Ranking, || {
        (
            rank(buckets.branched, config.top_branched),
            rank(buckets.neighbouring, config.top_neighbouring),
        )
    });

    info!(
        lines = lines.lines.len(),
        degenerate = lines.degenerate_count(),
        branched = branched.len(),
        neighbouring = neighbouring.len(),
        "Analysis complete."
    );

    Ok(AnalysisResult {
        lines,
        branched,
        neighbouring,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::layers::Layers;
    use crate::core::models::line::tests::uranium_line;
    use crate::engine::config::{AnalysisConfigBuilder, EnergyWindow};
    use crate::engine::progress::Progress;
    use crate::engine::progress::tests::recording_reporter;

    fn materials() -> Vec<MaterialEntry> {
        vec![MaterialEntry::new(
            IsotopeKey::new(92, 238),
            Layers::new(0.048, 0.024),
            Layers::new(2.0, 0.3),
        )]
    }

    fn table() -> AttenuationTable {
        let energies = vec![0.5, 1.0, 2.0, 4.0];
        let rows = energies
            .iter()
            .map(|&e| (1..=100).map(|z| z as f64 / e).collect())
            .collect();
        AttenuationTable::new(energies, rows).unwrap()
    }

    fn database() -> Vec<NuclearLine> {
        let mut branch = uranium_line(1.000, 0.3);
        branch.gamma_energy = 0.955;
        vec![
            uranium_line(1.000, 0.5),
            branch,
            uranium_line(2.000, 0.4),
            uranium_line(2.0005, 0.2),
            uranium_line(3.000, 0.6),
        ]
    }

    #[test]
    fn full_pipeline_fills_both_buckets() {
        let reporter = ProgressReporter::new();
        let result = run(
            materials(),
            &database(),
            &table(),
            &AnalysisConfig::default(),
            &reporter,
        )
        .unwrap();

        assert_eq!(result.lines.lines.len(), 5);
        assert!(result.lines.is_normalized());
        assert_eq!(result.lines.reference_isotope, Some(IsotopeKey::new(92, 238)));

        assert_eq!(result.branched.len(), 1);
        assert_eq!(result.branched.entries()[0].lines, [0, 1]);
        assert_eq!(result.neighbouring.len(), 1);
        assert_eq!(result.neighbouring.entries()[0].lines, [2, 3]);

        let max = result
            .lines
            .lines
            .iter()
            .map(|l| l.counts())
            .fold(f64::MIN, f64::max);
        assert!((max - 10_000.0).abs() < 1e-6);
    }

    #[test]
    fn pair_indices_resolve_to_lines() {
        let result = run(
            materials(),
            &database(),
            &table(),
            &AnalysisConfig::default(),
            &ProgressReporter::new(),
        )
        .unwrap();

        let pair = &result.branched.entries()[0];
        let (a, b) = result.lines.pair(pair).unwrap();
        assert_eq!((a.index(), b.index()), (0, 1));
        assert_eq!(pair.count_min, a.counts().min(b.counts()));

        let neighbours = &result.neighbouring.entries()[0];
        let (c, d) = result.lines.pair(neighbours).unwrap();
        assert_eq!([c.index(), d.index()], neighbours.lines);
    }

    #[test]
    fn top_k_is_applied_per_bucket() {
        let config = AnalysisConfigBuilder::new()
            .top_branched(Some(3))
            .top_neighbouring(Some(0))
            .build()
            .unwrap();
        let result = run(
            materials(),
            &database(),
            &table(),
            &config,
            &ProgressReporter::new(),
        )
        .unwrap();

        assert_eq!(result.branched.len(), 1);
        assert!(result.branched.is_partial());
        assert!(result.neighbouring.is_empty());
        assert!(!result.neighbouring.is_partial());
    }

    #[test]
    fn nothing_selected_gives_empty_result() {
        let config = AnalysisConfigBuilder::new()
            .detector_window(EnergyWindow::new(10.0, 20.0))
            .build()
            .unwrap();
        let result = run(
            materials(),
            &database(),
            &table(),
            &config,
            &ProgressReporter::new(),
        )
        .unwrap();

        assert!(result.lines.lines.is_empty());
        assert_eq!(result.lines.source_strength, None);
        assert!(result.branched.is_empty());
        assert!(result.neighbouring.is_empty());
        assert_eq!(result.lines.selection.outside_detector_window, 5);
    }

    #[test]
    fn invalid_config_fails_before_any_stage() {
        let config = AnalysisConfig {
            neighbour_threshold: -1.0,
            ..AnalysisConfig::default()
        };
        let (reporter, events) = recording_reporter();
        let result = run(materials(), &database(), &table(), &config, &reporter);

        assert!(matches!(result, Err(EngineError::Configuration(_))));
        assert!(events.lock().unwrap().is_empty());
    }

    #[test]
    fn duplicate_isotope_is_material_mismatch() {
        let mut entries = materials();
        entries.push(entries[0]);
        let result = run(
            entries,
            &database(),
            &table(),
            &AnalysisConfig::default(),
            &ProgressReporter::new(),
        );
        assert!(matches!(result, Err(EngineError::MaterialMismatch(_))));
    }

    #[test]
    fn stages_are_reported_in_pipeline_order() {
        let (reporter, events) = recording_reporter();
        run(
            materials(),
            &database(),
            &table(),
            &AnalysisConfig::default(),
            &reporter,
        )
        .unwrap();

        let stages: Vec<Stage> = events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| match e {
                Progress::StageStart(stage) => Some(*stage),
                _ => None,
            })
            .collect();
        assert_eq!(
            stages,
            vec![
                Stage::Materials,
                Stage::LineSelection,
                Stage::Normalization,
                Stage::PairSearch,
                Stage::Ranking,
            ]
        );
    }

    #[test]
    fn zero_thickness_isotope_is_isolated_from_the_run() {
        let mut entries = materials();
        entries.push(MaterialEntry::new(
            IsotopeKey::new(92, 235),
            Layers::new(0.001, 0.0005),
            Layers::new(2.0, 0.0),
        ));
        let mut database = database();
        let mut u235 = uranium_line(1.5, 0.4);
        u235.isotope = IsotopeKey::new(92, 235);
        database.push(u235);

        let result = run(
            entries,
            &database,
            &table(),
            &AnalysisConfig::default(),
            &ProgressReporter::new(),
        )
        .unwrap();

        assert_eq!(result.lines.degenerate_count(), 1);
        assert_eq!(result.lines.reference_isotope, Some(IsotopeKey::new(92, 238)));
        assert_eq!(result.branched.entries()[0].lines, [0, 1]);
        assert!(
            result
                .branched
                .entries()
                .iter()
                .all(|p| !p.lines.contains(&5))
        );
        assert!(result.neighbouring.entries().iter().all(|p| !p.lines.contains(&5)));
    }

    #[test]
    fn prepare_lines_skips_pair_search() {
        let (reporter, events) = recording_reporter();
        let set = prepare_lines(
            materials(),
            &database(),
            &table(),
            &AnalysisConfig::default(),
            &reporter,
        )
        .unwrap();

        assert_eq!(set.lines.len(), 5);
        assert!(set.is_normalized());
        assert!(
            !events
                .lock()
                .unwrap()
                .contains(&Progress::StageStart(Stage::PairSearch))
        );
    }
}
