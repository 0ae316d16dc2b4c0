use crate::detectors::PeakDetector;
use crate::error::{check_sampling_rate, EcgError, EcgResult};
use crate::signal::{Events, RRSeries, TimeSeries};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lowest heart rate (bpm) still classified as normal.
pub const BRADYCARDIA_BELOW_BPM: f64 = 60.0;
/// Highest heart rate (bpm) still classified as normal.
pub const TACHYCARDIA_ABOVE_BPM: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RateStatus {
    Normal,
    Bradycardia,
    Tachycardia,
}

impl RateStatus {
    /// Thresholds are inclusive on the normal side; a rate of zero (no beats)
    /// reports as bradycardia.
    pub fn classify(heart_rate: f64) -> Self {
        if heart_rate < BRADYCARDIA_BELOW_BPM {
            RateStatus::Bradycardia
        } else if heart_rate > TACHYCARDIA_ABOVE_BPM {
            RateStatus::Tachycardia
        } else {
            RateStatus::Normal
        }
    }
}

impl fmt::Display for RateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RateStatus::Normal => "normal heart rate (60-100 bpm)",
            RateStatus::Bradycardia => "bradycardia (< 60 bpm)",
            RateStatus::Tachycardia => "tachycardia (> 100 bpm)",
        };
        f.write_str(label)
    }
}

/// Beats, RR intervals and mean heart rate of one lead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub peaks: Events,
    pub rr: RRSeries,
    /// Beats per minute; zero when fewer than two beats were found.
    pub heart_rate: f64,
}

impl AnalysisResult {
    pub fn from_peaks(peaks: Events, fs: f64) -> Self {
        let rr = RRSeries::from_events(&peaks, fs);
        let heart_rate = heart_rate(&rr);
        Self {
            peaks,
            rr,
            heart_rate,
        }
    }

    pub fn status(&self) -> RateStatus {
        RateStatus::classify(self.heart_rate)
    }

    pub fn mean_rr(&self) -> Option<f64> {
        self.rr.mean()
    }
}

/// `60 / mean(rr)`, or zero for an empty series.
pub fn heart_rate(rr: &RRSeries) -> f64 {
    match rr.mean() {
        Some(mean) if mean > 0.0 => 60.0 / mean,
        _ => 0.0,
    }
}

/// Runs a [`PeakDetector`] over one lead and derives rate statistics.
#[derive(Debug, Clone, Default)]
pub struct RateAnalyzer<D> {
    detector: D,
}

impl<D: PeakDetector> RateAnalyzer<D> {
    pub fn new(detector: D) -> Self {
        Self { detector }
    }

    pub fn analyze(&self, signal: &[f64], fs: f64) -> EcgResult<AnalysisResult> {
        check_sampling_rate(fs)?;
        if signal.is_empty() {
            return Err(EcgError::EmptySignal);
        }
        let ts = TimeSeries {
            fs,
            data: signal.to_vec(),
        };
        self.analyze_series(&ts)
    }

    pub fn analyze_series(&self, ts: &TimeSeries) -> EcgResult<AnalysisResult> {
        check_sampling_rate(ts.fs)?;
        if ts.is_empty() {
            return Err(EcgError::EmptySignal);
        }
        let cleaned = self.detector.clean(ts)?;
        let peaks = self.detector.detect(&cleaned)?;
        check_peaks(&peaks, ts.len())?;
        let result = AnalysisResult::from_peaks(peaks, ts.fs);
        debug!(
            "{} beats over {:.1}s, heart rate {:.1} bpm ({:?})",
            result.peaks.len(),
            ts.duration(),
            result.heart_rate,
            result.status()
        );
        Ok(result)
    }
}

fn check_peaks(peaks: &Events, len: usize) -> EcgResult<()> {
    if !peaks.is_strictly_increasing() {
        return Err(EcgError::DetectionFailed(
            "detector returned beats out of order".into(),
        ));
    }
    if let Some(&last) = peaks.indices.last() {
        if last >= len {
            return Err(EcgError::DetectionFailed(format!(
                "detector returned beat {last} past the end of a {len}-sample lead"
            )));
        }
    }
    Ok(())
}
