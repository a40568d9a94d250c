use crate::core::models::isotope::IsotopeKey;
use crate::core::models::line::NrfLine;
use crate::engine::error::EngineError;
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

/// Counts assigned to the strongest line of the weakest isotope.
pub const REFERENCE_COUNTS: f64 = 10_000.0;

/// Lines after normalization, together with the scale that was applied.
#[derive(Debug, Clone)]
pub struct NormalizedLines {
    pub lines: Vec<NrfLine>,
    pub source_strength: f64,
    /// Isotope whose strongest line was scaled to [`REFERENCE_COUNTS`].
    pub reference_isotope: IsotopeKey,
}

/// Largest count per isotope.
pub fn isotope_maxima<I>(counts: I) -> BTreeMap<IsotopeKey, f64>
where
    I: IntoIterator<Item = (IsotopeKey, f64)>,
{
    let mut maxima = BTreeMap::new();
    for (isotope, value) in counts {
        maxima
            .entry(isotope)
            .and_modify(|max: &mut f64| *max = max.max(value))
            .or_insert(value);
    }
    maxima
}

/// Scale that brings the smallest per-isotope maximum to [`REFERENCE_COUNTS`].
///
/// Returns the scale and the isotope that set it.
pub fn source_strength(
    maxima: &BTreeMap<IsotopeKey, f64>,
) -> Result<(f64, IsotopeKey), EngineError> {
    let (isotope, weakest) = maxima
        .iter()
        .min_by(|a, b| a.1.total_cmp(b.1))
        .map(|(iso, max)| (*iso, *max))
        .ok_or_else(|| EngineError::EmptyInput("no lines to normalize".to_string()))?;

    if !(weakest.is_finite() && weakest > 0.0) {
        return Err(EngineError::NumericDegeneracy(format!(
            "strongest line of isotope {} has {} counts; cannot normalize",
            isotope, weakest
        )));
    }

    let scale = REFERENCE_COUNTS / weakest;
    if !scale.is_finite() {
        return Err(EngineError::NumericDegeneracy(format!(
            "source strength overflows for isotope {} (maximum {} counts)",
            isotope, weakest
        )));
    }
    Ok((scale, isotope))
}

/// Rescales every line's counts by one common source strength.
///
/// Degenerate lines are left out of the maxima but are rescaled with the rest.
#[instrument(skip_all, name = "normalization_task")]
pub fn run(mut lines: Vec<NrfLine>) -> Result<NormalizedLines, EngineError> {
    let maxima = isotope_maxima(
        lines
            .iter()
            .filter(|line| line.is_valid())
            .map(|line| (line.isotope(), line.counts())),
    );
    for (isotope, max) in &maxima {
        debug!(%isotope, max_counts = max, "Per-isotope maximum.");
    }

    let (source_strength, reference_isotope) = source_strength(&maxima)?;

    for line in &mut lines {
        line.rescale_counts(source_strength);
    }

    info!(
        source_strength,
        reference = %reference_isotope,
        isotopes = maxima.len(),
        "Counts normalized."
    );

    Ok(NormalizedLines {
        lines,
        source_strength,
        reference_isotope,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::layers::Layers;
    use crate::core::models::line::tests::{slab_environment, uranium_line};
    use crate::core::physics::doppler::DopplerModel;

    fn u238() -> IsotopeKey {
        IsotopeKey::new(92, 238)
    }

    fn u235() -> IsotopeKey {
        IsotopeKey::new(92, 235)
    }

    #[test]
    fn weakest_isotope_maximum_sets_the_scale() {
        let maxima = isotope_maxima([(u238(), 50.0), (u238(), 10.0), (u235(), 200.0), (u235(), 80.0)]);
        assert_eq!(maxima[&u238()], 50.0);
        assert_eq!(maxima[&u235()], 200.0);

        let (scale, reference) = source_strength(&maxima).unwrap();
        assert_eq!(scale, 200.0);
        assert_eq!(reference, u238());
        assert_eq!(maxima[&u238()] * scale, 10_000.0);
    }

    #[test]
    fn empty_maxima_is_empty_input() {
        let result = source_strength(&BTreeMap::new());
        assert!(matches!(result, Err(EngineError::EmptyInput(_))));
    }

    #[test]
    fn zero_maximum_is_numeric_degeneracy() {
        let maxima = isotope_maxima([(u238(), 0.0)]);
        assert!(matches!(
            source_strength(&maxima),
            Err(EngineError::NumericDegeneracy(_))
        ));
    }

    #[test]
    fn run_scales_strongest_line_of_single_isotope_to_reference() {
        let lines = vec![
            NrfLine::new(0, uranium_line(2.0, 0.4), slab_environment(), DopplerModel::default()),
            NrfLine::new(1, uranium_line(2.2, 0.1), slab_environment(), DopplerModel::default()),
        ];
        let raw: Vec<f64> = lines.iter().map(|l| l.counts()).collect();

        let normalized = run(lines).unwrap();
        let max = normalized
            .lines
            .iter()
            .map(|l| l.counts())
            .fold(f64::MIN, f64::max);
        assert!((max - REFERENCE_COUNTS).abs() < 1e-6);

        for (line, raw) in normalized.lines.iter().zip(raw) {
            let expected = raw * normalized.source_strength;
            assert!((line.counts() - expected).abs() <= 1e-9 * expected);
        }
    }

    #[test]
    fn run_scales_weaker_isotope_to_reference_and_others_by_same_factor() {
        let mut thin_foil = slab_environment();
        thin_foil.thickness.foil = 0.003;
        let u235_line = |level: f64, branch: f64| {
            let mut params = uranium_line(level, branch);
            params.isotope = u235();
            params
        };

        let lines = vec![
            NrfLine::new(0, uranium_line(2.0, 0.4), slab_environment(), DopplerModel::default()),
            NrfLine::new(1, u235_line(1.7, 0.5), thin_foil, DopplerModel::default()),
            NrfLine::new(2, uranium_line(2.2, 0.1), slab_environment(), DopplerModel::default()),
            NrfLine::new(3, u235_line(1.9, 0.05), thin_foil, DopplerModel::default()),
        ];
        let raw: Vec<f64> = lines.iter().map(|l| l.counts()).collect();
        assert!(raw[1] < raw[0]);

        let normalized = run(lines).unwrap();
        assert_eq!(normalized.reference_isotope, u235());
        assert_eq!(normalized.source_strength, REFERENCE_COUNTS / raw[1]);

        let top_u235 = normalized.lines[1].counts();
        assert!((top_u235 - REFERENCE_COUNTS).abs() <= 1e-9 * REFERENCE_COUNTS);
        for (line, raw) in normalized.lines.iter().zip(&raw) {
            assert_eq!(line.counts(), raw * normalized.source_strength);
        }
        assert!(normalized.lines[0].counts() > REFERENCE_COUNTS);
    }

    #[test]
    fn zero_count_isotope_does_not_block_normalization() {
        let mut empty_foil = slab_environment();
        empty_foil.thickness.foil = 0.0;
        let mut params = uranium_line(1.5, 0.4);
        params.isotope = u235();

        let lines = vec![
            NrfLine::new(0, uranium_line(2.0, 0.4), slab_environment(), DopplerModel::default()),
            NrfLine::new(1, params, empty_foil, DopplerModel::default()),
        ];
        let normalized = run(lines).unwrap();
        assert_eq!(normalized.reference_isotope, u238());
        assert!(!normalized.lines[1].is_valid());
        assert!((normalized.lines[0].counts() - REFERENCE_COUNTS).abs() < 1e-6);
    }

    #[test]
    fn degenerate_lines_do_not_set_the_scale() {
        let mut dead_foil = slab_environment();
        dead_foil.number_density = Layers::new(0.048, 0.0);
        let mut bad = uranium_line(2.0, 0.4);
        bad.isotope = u235();

        let lines = vec![
            NrfLine::new(0, uranium_line(2.0, 0.4), slab_environment(), DopplerModel::default()),
            NrfLine::new(1, bad, dead_foil, DopplerModel::default()),
        ];
        let normalized = run(lines).unwrap();
        assert_eq!(normalized.reference_isotope, u238());
        assert!((normalized.lines[0].counts() - REFERENCE_COUNTS).abs() < 1e-6);
    }

    #[test]
    fn empty_line_set_is_empty_input() {
        assert!(matches!(run(Vec::new()), Err(EngineError::EmptyInput(_))));
    }
}
