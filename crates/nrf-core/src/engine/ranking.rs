use std::cmp::Ordering;
use tracing::warn;

/// A classified pair that can be ranked by its weaker member's counts.
pub trait RankedPair {
    /// Indices of the two lines, in enumeration order.
    fn lines(&self) -> [usize; 2];

    /// Smaller normalized count of the two lines; the ranking key.
    fn count_min(&self) -> f64;
}

/// The top of one pair bucket, ordered by descending `count_min`.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedPairs<T> {
    entries: Vec<T>,
    available: usize,
    requested: Option<usize>,
}

impl<T> RankedPairs<T> {
    pub fn entries(&self) -> &[T] {
        &self.entries
    }

    /// Number of pairs the bucket held before truncation.
    pub fn available(&self) -> usize {
        self.available
    }

    pub fn requested(&self) -> Option<usize> {
        self.requested
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `true` when more pairs were requested than the bucket holds.
    pub fn is_partial(&self) -> bool {
        matches!(self.requested, Some(k) if k > self.available)
    }
}

/// Orders `pairs` by descending `count_min` and keeps the first `top` of them.
///
/// The sort is stable, so equal keys keep enumeration order. NaN keys sort last.
pub fn rank<T: RankedPair>(mut pairs: Vec<T>, top: Option<usize>) -> RankedPairs<T> {
    let available = pairs.len();
    pairs.sort_by(|a, b| descending(a.count_min(), b.count_min()));

    if let Some(k) = top {
        if k > available {
            warn!(
                requested = k,
                available, "Fewer pairs than requested; returning all of them."
            );
        }
        pairs.truncate(k);
    }

    RankedPairs {
        entries: pairs,
        available,
        requested: top,
    }
}

fn descending(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}
