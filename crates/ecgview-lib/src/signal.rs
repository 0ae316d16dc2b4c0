use crate::error::{check_sampling_rate, EcgResult};
use serde::{Deserialize, Serialize};

/// Basic typed time series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSeries {
    /// Uniform sampling frequency in Hz
    pub fs: f64,
    /// Samples
    pub data: Vec<f64>,
}

impl TimeSeries {
    /// Build a series, rejecting non-positive sampling rates.
    pub fn new(fs: f64, data: Vec<f64>) -> EcgResult<Self> {
        check_sampling_rate(fs)?;
        Ok(Self { fs, data })
    }
    pub fn len(&self) -> usize {
        self.data.len()
    }
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
    pub fn duration(&self) -> f64 {
        self.data.len() as f64 / self.fs
    }
}

/// Point events on a timeline (e.g., R-peaks indices)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Events {
    pub indices: Vec<usize>,
}

impl Events {
    pub fn from_indices(indices: Vec<usize>) -> Self {
        Self { indices }
    }
    pub fn len(&self) -> usize {
        self.indices.len()
    }
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
    pub fn is_strictly_increasing(&self) -> bool {
        self.indices.windows(2).all(|w| w[0] < w[1])
    }
}

/// RR intervals (seconds)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RRSeries {
    pub rr: Vec<f64>,
}

impl RRSeries {
    pub fn from_events(events: &Events, fs: f64) -> Self {
        let rr = events
            .indices
            .windows(2)
            .map(|w| (w[1] as f64 - w[0] as f64) / fs)
            .collect();
        Self { rr }
    }
    pub fn len(&self) -> usize {
        self.rr.len()
    }
    pub fn is_empty(&self) -> bool {
        self.rr.is_empty()
    }
    pub fn mean(&self) -> Option<f64> {
        if self.rr.is_empty() {
            return None;
        }
        Some(self.rr.iter().sum::<f64>() / self.rr.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rr_from_consecutive_beats() {
        let events = Events::from_indices(vec![0, 250, 500, 800]);
        let rr = RRSeries::from_events(&events, 250.0);
        assert_eq!(rr.rr, vec![1.0, 1.0, 1.2]);
    }

    #[test]
    fn rr_empty_for_single_beat() {
        let rr = RRSeries::from_events(&Events::from_indices(vec![42]), 250.0);
        assert!(rr.is_empty());
        assert_eq!(rr.mean(), None);
    }

    #[test]
    fn rejects_non_positive_fs() {
        assert!(TimeSeries::new(0.0, vec![1.0]).is_err());
        assert!(TimeSeries::new(f64::NAN, vec![1.0]).is_err());
        assert!(TimeSeries::new(500.0, vec![1.0]).is_ok());
    }

    #[test]
    fn detects_non_monotonic_events() {
        assert!(Events::from_indices(vec![1, 5, 9]).is_strictly_increasing());
        assert!(!Events::from_indices(vec![1, 5, 5]).is_strictly_increasing());
    }
}
