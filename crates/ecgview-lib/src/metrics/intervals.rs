use crate::signal::RRSeries;
use serde::{Deserialize, Serialize};

/// Successive differences above this many seconds count towards pNN50.
const NN50_THRESHOLD_S: f64 = 0.050;

/// Beat-interval statistics over an RR series (seconds).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct IntervalStats {
    pub n: usize,
    pub mean_rr: f64,
    pub min_rr: f64,
    pub max_rr: f64,
    pub sdnn: f64,
    pub rmssd: f64,
    pub pnn50: f64,
}

pub fn interval_stats(rr: &RRSeries) -> IntervalStats {
    let n = rr.rr.len();
    let Some(mean_rr) = rr.mean() else {
        return IntervalStats::default();
    };
    let min_rr = rr.rr.iter().copied().fold(f64::INFINITY, f64::min);
    let max_rr = rr.rr.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if n < 2 {
        return IntervalStats {
            n,
            mean_rr,
            min_rr,
            max_rr,
            ..IntervalStats::default()
        };
    }

    let sdnn = (rr.rr.iter().map(|x| (x - mean_rr).powi(2)).sum::<f64>() / (n as f64 - 1.0)).sqrt();
    let successive: Vec<f64> = rr.rr.windows(2).map(|w| w[1] - w[0]).collect();
    let rmssd = (successive.iter().map(|d| d * d).sum::<f64>() / successive.len() as f64).sqrt();
    let nn50 = successive
        .iter()
        .filter(|d| d.abs() > NN50_THRESHOLD_S)
        .count();
    let pnn50 = nn50 as f64 / successive.len() as f64;

    IntervalStats {
        n,
        mean_rr,
        min_rr,
        max_rr,
        sdnn,
        rmssd,
        pnn50,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64, tol: f64) {
        assert!((a - b).abs() <= tol, "{} vs {}", a, b);
    }

    #[test]
    fn empty_series_is_all_zero() {
        assert_eq!(interval_stats(&RRSeries::default()), IntervalStats::default());
    }

    #[test]
    fn single_interval_has_no_spread() {
        let stats = interval_stats(&RRSeries { rr: vec![0.9] });
        assert_eq!(stats.n, 1);
        assert_eq!(stats.mean_rr, 0.9);
        assert_eq!(stats.min_rr, 0.9);
        assert_eq!(stats.max_rr, 0.9);
        assert_eq!(stats.sdnn, 0.0);
        assert_eq!(stats.rmssd, 0.0);
    }

    #[test]
    fn spread_metrics() {
        let stats = interval_stats(&RRSeries {
            rr: vec![0.8, 0.8, 0.9, 1.0],
        });
        assert_eq!(stats.n, 4);
        assert_close(stats.mean_rr, 0.875, 1e-12);
        assert_eq!(stats.min_rr, 0.8);
        assert_eq!(stats.max_rr, 1.0);
        // deviations: -0.075, -0.075, 0.025, 0.125
        assert_close(stats.sdnn, (0.0275_f64 / 3.0).sqrt(), 1e-12);
        // successive: 0.0, 0.1, 0.1
        assert_close(stats.rmssd, (0.02_f64 / 3.0).sqrt(), 1e-12);
        assert_close(stats.pnn50, 2.0 / 3.0, 1e-12);
    }
}
