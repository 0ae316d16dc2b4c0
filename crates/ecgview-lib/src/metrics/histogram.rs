use crate::signal::RRSeries;
use serde::{Deserialize, Serialize};

/// Bin count of the RR-interval distribution in the detailed lead view.
pub const RR_HISTOGRAM_BINS: usize = 20;

/// Equal-width histogram over the observed RR span.
///
/// `edges` has one more entry than `counts`. Every bin is half-open except the
/// last, which also takes values equal to the upper edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RrHistogram {
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl RrHistogram {
    pub fn new(rr: &RRSeries, bins: usize) -> Self {
        let bins = bins.max(1);
        let (lo, hi) = histogram_range(&rr.rr);
        let width = (hi - lo) / bins as f64;
        let mut edges: Vec<f64> = (0..=bins).map(|i| lo + width * i as f64).collect();
        edges[bins] = hi;
        let mut counts = vec![0usize; bins];
        for &value in rr.rr.iter().filter(|v| v.is_finite()) {
            counts[bin_index(&edges, value, lo, width)] += 1;
        }
        Self { edges, counts }
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    pub fn bins(&self) -> usize {
        self.counts.len()
    }

    pub fn range(&self) -> (f64, f64) {
        let lo = self.edges.first().copied().unwrap_or(0.0);
        let hi = self.edges.last().copied().unwrap_or(1.0);
        (lo, hi)
    }

    pub fn max_count(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    /// `(left edge, right edge, count)` per bin.
    pub fn bars(&self) -> impl Iterator<Item = (f64, f64, usize)> + '_ {
        self.edges
            .windows(2)
            .zip(self.counts.iter())
            .map(|(edge, &count)| (edge[0], edge[1], count))
    }
}

pub fn rr_histogram(rr: &RRSeries) -> RrHistogram {
    RrHistogram::new(rr, RR_HISTOGRAM_BINS)
}

/// Bin of `value`, settled against `edges` so a value on an inner edge
/// belongs to the bin that edge opens.
fn bin_index(edges: &[f64], value: f64, lo: f64, width: f64) -> usize {
    let bins = edges.len() - 1;
    let mut idx = (((value - lo) / width).floor().max(0.0) as usize).min(bins - 1);
    if idx > 0 && value < edges[idx] {
        idx -= 1;
    } else if idx + 1 < bins && value >= edges[idx + 1] {
        idx += 1;
    }
    idx
}

fn histogram_range(values: &[f64]) -> (f64, f64) {
    let finite = values.iter().copied().filter(|v| v.is_finite());
    let lo = finite.clone().fold(f64::INFINITY, f64::min);
    let hi = finite.fold(f64::NEG_INFINITY, f64::max);
    if lo > hi {
        return (0.0, 1.0);
    }
    if hi - lo < f64::EPSILON {
        return (lo - 0.5, hi + 0.5);
    }
    (lo, hi)
}
