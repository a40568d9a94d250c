use crate::core::models::line::NrfLine;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::ranking::RankedPair;
use serde::Serialize;
use tracing::{debug, info, instrument};

#[cfg(not(feature = "parallel"))]
use itertools::Itertools;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PairKind {
    /// Two transitions out of the same level of the same isotope.
    Branched,
    /// Two distinct levels whose energies lie within the neighbour threshold.
    Neighbouring,
}

/// Classifies an unordered pair of lines.
///
/// The neighbouring test runs first; it requires distinct level energies, so the
/// two kinds never overlap.
pub fn classify(a: &NrfLine, b: &NrfLine, neighbour_threshold: f64) -> Option<PairKind> {
    let (ea, eb) = (a.level_energy(), b.level_energy());
    if ea != eb && (ea - eb).abs() <= neighbour_threshold {
        Some(PairKind::Neighbouring)
    } else if ea == eb && a.isotope() == b.isotope() {
        Some(PairKind::Branched)
    } else {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NeighbouringPair {
    pub lines: [usize; 2],
    pub alpha_min: f64,
    pub alpha_ratio: f64,
    pub level_median: f64,
    pub strength_median: f64,
    pub strength_min: f64,
    pub count_min: f64,
}

impl NeighbouringPair {
    pub fn new(a: &NrfLine, b: &NrfLine) -> Self {
        let (sa, sb) = (a.interference_strength(), b.interference_strength());
        Self {
            lines: [a.index(), b.index()],
            alpha_min: a.alpha_foil().min(b.alpha_foil()),
            alpha_ratio: a.alpha_foil() / b.alpha_foil(),
            level_median: midpoint(a.level_energy(), b.level_energy()),
            strength_median: midpoint(sa, sb),
            strength_min: sa.min(sb),
            count_min: a.counts().min(b.counts()),
        }
    }
}

impl RankedPair for NeighbouringPair {
    fn lines(&self) -> [usize; 2] {
        self.lines
    }
    fn count_min(&self) -> f64 {
        self.count_min
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BranchedPair {
    pub lines: [usize; 2],
    pub alpha_max: f64,
    pub alpha_ratio: f64,
    pub level_energy: f64,
    pub gamma_energies: [f64; 2],
    pub sigma_min: f64,
    pub count_min: f64,
}

impl BranchedPair {
    pub fn new(a: &NrfLine, b: &NrfLine) -> Self {
        Self {
            lines: [a.index(), b.index()],
            alpha_max: a.alpha_foil().max(b.alpha_foil()),
            alpha_ratio: a.alpha_foil() / b.alpha_foil(),
            level_energy: a.level_energy(),
            gamma_energies: [a.gamma_energy(), b.gamma_energy()],
            sigma_min: a.integrated_foil().min(b.integrated_foil()),
            count_min: a.counts().min(b.counts()),
        }
    }
}

impl RankedPair for BranchedPair {
    fn lines(&self) -> [usize; 2] {
        self.lines
    }
    fn count_min(&self) -> f64 {
        self.count_min
    }
}

// Median of two values.
#[inline]
fn midpoint(a: f64, b: f64) -> f64 {
    0.5 * (a + b)
}

/// Both buckets in enumeration order, before ranking.
#[derive(Debug, Clone, Default)]
pub struct PairBuckets {
    pub branched: Vec<BranchedPair>,
    pub neighbouring: Vec<NeighbouringPair>,
}

enum Classified {
    Branched(BranchedPair),
    Neighbouring(NeighbouringPair),
}

fn evaluate(a: &NrfLine, b: &NrfLine, neighbour_threshold: f64) -> Option<Classified> {
    match classify(a, b, neighbour_threshold)? {
        PairKind::Branched => Some(Classified::Branched(BranchedPair::new(a, b))),
        PairKind::Neighbouring => Some(Classified::Neighbouring(NeighbouringPair::new(a, b))),
    }
}

/// Classifies every unordered pair of valid lines.
///
/// Pairs are visited as `(a, b)` with `a` accepted before `b`; degenerate lines
/// take no part.
#[instrument(skip_all, name = "pair_search_task")]
pub fn run(
    lines: &[NrfLine],
    neighbour_threshold: f64,
    reporter: &ProgressReporter,
) -> PairBuckets {
    let valid: Vec<&NrfLine> = lines.iter().filter(|line| line.is_valid()).collect();
    let n = valid.len();
    let total_pairs = n * n.saturating_sub(1) / 2;
    info!(
        lines = n,
        pairs = total_pairs,
        threshold = neighbour_threshold,
        "Enumerating line pairs."
    );

    reporter.report(Progress::TaskStart {
        total_steps: n as u64,
    });

    #[cfg(not(feature = "parallel"))]
    let classified: Vec<Classified> = valid
        .iter()
        .tuple_combinations()
        .filter_map(|(a, b)| evaluate(a, b, neighbour_threshold))
        .collect();

    #[cfg(feature = "parallel")]
    let classified: Vec<Classified> = (0..n)
        .into_par_iter()
        .flat_map_iter(|i| {
            let a = valid[i];
            valid[i + 1..]
                .iter()
                .filter_map(move |b| evaluate(a, b, neighbour_threshold))
        })
        .collect();

    reporter.report(Progress::TaskAdvance { steps: n as u64 });
    reporter.report(Progress::TaskFinish);

    let mut buckets = PairBuckets::default();
    for pair in classified {
        match pair {
            Classified::Branched(p) => buckets.branched.push(p),
            Classified::Neighbouring(p) => buckets.neighbouring.push(p),
        }
    }

    debug!(
        ignored = total_pairs - buckets.branched.len() - buckets.neighbouring.len(),
        "Pairs in neither bucket."
    );
    info!(
        branched = buckets.branched.len(),
        neighbouring = buckets.neighbouring.len(),
        "Pair classification complete."
    );
    buckets
}
