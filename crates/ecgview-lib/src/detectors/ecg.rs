use super::PeakDetector;
use crate::error::{EcgError, EcgResult};
use crate::signal::{Events, TimeSeries};
use serde::{Deserialize, Serialize};

/// Shortest signal the envelope and fallback pickers can work on.
const MIN_SAMPLES: usize = 3;

/// Configurable parameters for the ECG beat detection pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EcgPipelineConfig {
    /// Lower cutoff for the single-pole high-pass filter (Hz).
    pub lowcut_hz: f64,
    /// Upper cutoff for the single-pole low-pass filter (Hz).
    pub highcut_hz: f64,
    /// Moving window integration length (seconds).
    pub integration_window_s: f64,
    /// Minimum physiological RR distance / refractory period (seconds).
    pub min_rr_s: f64,
    /// Scale between noise and signal envelopes for the adaptive threshold.
    pub threshold_scale: f64,
    /// How far back to search (seconds) for the precise R-peak after a detection.
    pub search_back_s: f64,
}

impl Default for EcgPipelineConfig {
    fn default() -> Self {
        Self {
            lowcut_hz: 5.0,
            highcut_hz: 15.0,
            integration_window_s: 0.150,
            min_rr_s: 0.120,
            threshold_scale: 0.6,
            search_back_s: 0.150,
        }
    }
}

/// Pan–Tompkins-inspired R-peak detector.
///
/// `clean` band-limits the lead; `detect` builds the squared-derivative
/// envelope of the cleaned lead and runs an adaptive threshold over it.
#[derive(Debug, Clone, Copy, Default)]
pub struct PanTompkinsDetector {
    pub cfg: EcgPipelineConfig,
}

impl PanTompkinsDetector {
    pub fn new(cfg: EcgPipelineConfig) -> Self {
        Self { cfg }
    }
}

impl PeakDetector for PanTompkinsDetector {
    fn clean(&self, ts: &TimeSeries) -> EcgResult<TimeSeries> {
        validate_input(ts)?;
        let data = bandpass(&ts.data, ts.fs, self.cfg.lowcut_hz, self.cfg.highcut_hz);
        Ok(TimeSeries { fs: ts.fs, data })
    }

    fn detect(&self, cleaned: &TimeSeries) -> EcgResult<Events> {
        validate_input(cleaned)?;
        let integrated = envelope(cleaned, &self.cfg);
        let mut peaks = pick_peaks(&cleaned.data, &integrated, cleaned.fs, &self.cfg);
        if peaks.len() < 2 {
            // The adaptive threshold underperforms on short or low-amplitude leads.
            peaks = fallback_peak_picker(cleaned, &self.cfg);
        }
        Ok(Events::from_indices(peaks))
    }
}

fn validate_input(ts: &TimeSeries) -> EcgResult<()> {
    if ts.len() < MIN_SAMPLES {
        return Err(EcgError::DetectionFailed(format!(
            "signal too short: {} samples, need at least {}",
            ts.len(),
            MIN_SAMPLES
        )));
    }
    if let Some(idx) = ts.data.iter().position(|x| !x.is_finite()) {
        return Err(EcgError::DetectionFailed(format!(
            "non-finite sample at index {idx}"
        )));
    }
    Ok(())
}

fn envelope(ts: &TimeSeries, cfg: &EcgPipelineConfig) -> Vec<f64> {
    let win = seconds_to_samples(cfg.integration_window_s, ts.fs.max(1.0));
    let slope_energy: Vec<f64> = first_difference(&ts.data).map(|d| d * d).collect();
    moving_average(&slope_energy, win)
}

fn seconds_to_samples(seconds: f64, fs: f64) -> usize {
    (seconds * fs).round().max(1.0) as usize
}

/// First-order high-pass then low-pass. A stage with a non-positive cutoff is
/// skipped, as is a low-pass at or above Nyquist.
fn bandpass(data: &[f64], fs: f64, low: f64, high: f64) -> Vec<f64> {
    let mut out = data.to_vec();
    if low > 0.0 {
        highpass_in_place(&mut out, fs, low);
    }
    if high > 0.0 && high < fs * 0.5 {
        lowpass_in_place(&mut out, fs, high);
    }
    out
}

/// `(rc, dt)` of an RC section with the given cutoff.
fn rc_section(fs: f64, cutoff: f64) -> (f64, f64) {
    (1.0 / (std::f64::consts::TAU * cutoff.max(0.01)), 1.0 / fs)
}

fn highpass_in_place(data: &mut [f64], fs: f64, cutoff: f64) {
    let Some(&first) = data.first() else {
        return;
    };
    let (rc, dt) = rc_section(fs, cutoff);
    let alpha = rc / (rc + dt);
    let (mut last_in, mut last_out) = (first, first);
    for sample in data.iter_mut() {
        last_out = alpha * (last_out + *sample - last_in);
        last_in = *sample;
        *sample = last_out;
    }
}

fn lowpass_in_place(data: &mut [f64], fs: f64, cutoff: f64) {
    let Some(&first) = data.first() else {
        return;
    };
    let (rc, dt) = rc_section(fs, cutoff);
    let alpha = dt / (rc + dt);
    data.iter_mut().fold(first, |state, sample: &mut f64| {
        *sample = state + alpha * (*sample - state);
        *sample
    });
}

/// Sample-to-sample slope, zero at the first sample.
fn first_difference(data: &[f64]) -> impl Iterator<Item = f64> + '_ {
    data.first()
        .map(|_| 0.0)
        .into_iter()
        .chain(data.windows(2).map(|pair| pair[1] - pair[0]))
}

/// Trailing mean over `win` samples. Outputs before the window fills are
/// still divided by `win`.
fn moving_average(data: &[f64], win: usize) -> Vec<f64> {
    if win <= 1 {
        return data.to_vec();
    }
    let leaving = std::iter::repeat(0.0).take(win).chain(data.iter().copied());
    data.iter()
        .zip(leaving)
        .scan(0.0, |sum, (&entering, leaving)| {
            *sum += entering - leaving;
            Some(*sum / win as f64)
        })
        .collect()
}

/// Signal and noise levels of the integrated envelope, each an exponential
/// average with weight 1/8 on the newest sample.
struct AdaptiveThreshold {
    signal: f64,
    noise: f64,
    scale: f64,
}

impl AdaptiveThreshold {
    /// Both levels start from the mean of the first second of envelope.
    fn seeded(envelope: &[f64], fs: f64, scale: f64) -> Self {
        let n = envelope.len().min((fs as usize).max(1));
        let mean = envelope[..n].iter().sum::<f64>() / n as f64;
        Self {
            signal: mean,
            noise: 0.5 * mean,
            scale,
        }
    }

    fn level(&self) -> f64 {
        self.noise + self.scale * (self.signal - self.noise).max(0.0)
    }

    fn learn_signal(&mut self, value: f64) {
        self.signal = 0.125 * value + 0.875 * self.signal;
    }

    fn learn_noise(&mut self, value: f64) {
        self.noise = 0.125 * value + 0.875 * self.noise;
    }
}

fn pick_peaks(cleaned: &[f64], envelope: &[f64], fs: f64, cfg: &EcgPipelineConfig) -> Vec<usize> {
    if cleaned.is_empty() || envelope.is_empty() {
        return Vec::new();
    }
    let refractory = seconds_to_samples(cfg.min_rr_s, fs);
    let search = seconds_to_samples(cfg.search_back_s, fs);
    let mut threshold = AdaptiveThreshold::seeded(envelope, fs, cfg.threshold_scale);
    let mut last_trigger: Option<usize> = None;
    let mut peaks = Vec::new();

    for (i, &value) in envelope.iter().enumerate() {
        let rested = last_trigger.map_or(true, |last| i - last >= refractory);
        // A flat envelope sits exactly on a zero threshold.
        if rested && value > 0.0 && value >= threshold.level() {
            peaks.push(search_back(cleaned, i.saturating_sub(search), i));
            last_trigger = Some(i);
            threshold.learn_signal(value);
        } else {
            threshold.learn_noise(value);
        }
    }

    peaks.sort_unstable();
    peaks.dedup();
    peaks
}

/// Index of the largest cleaned sample in `start..=end`, earliest on ties.
fn search_back(cleaned: &[f64], start: usize, end: usize) -> usize {
    let end = end.min(cleaned.len() - 1);
    cleaned
        .get(start..=end)
        .unwrap_or_default()
        .iter()
        .enumerate()
        .fold((start, f64::MIN), |best, (offset, &value)| {
            if value > best.1 {
                (start + offset, value)
            } else {
                best
            }
        })
        .0
}

/// Positive crests of the lead above its 150 ms trailing mean, at least
/// `min_rr_s` apart.
fn fallback_peak_picker(ts: &TimeSeries, cfg: &EcgPipelineConfig) -> Vec<usize> {
    let data = &ts.data;
    if data.len() < MIN_SAMPLES {
        return Vec::new();
    }
    let min_gap = (cfg.min_rr_s * ts.fs).max(1.0) as usize;
    let baseline = moving_average(data, ((0.150 * ts.fs) as usize).max(1));
    let detrended: Vec<f64> = data.iter().zip(&baseline).map(|(x, b)| x - b).collect();

    let mut peaks: Vec<usize> = Vec::new();
    for (offset, around) in detrended.windows(3).enumerate() {
        let i = offset + 1;
        let crest = around[1] > 0.0 && around[1] > around[0] && around[1] > around[2];
        if crest && peaks.last().map_or(true, |&last| i - last >= min_gap) {
            peaks.push(i);
        }
    }
    peaks
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn synthetic_timeseries(fs: f64, rr: &[f64]) -> TimeSeries {
        use std::f64::consts::PI;
        let mut beats = Vec::with_capacity(rr.len() + 1);
        let mut t = 0.5;
        beats.push(t);
        for &interval in rr {
            t += interval;
            beats.push(t);
        }
        let duration = beats.last().copied().unwrap_or(1.0) + 1.0;
        let samples = (duration * fs) as usize;
        let mut data = Vec::with_capacity(samples);
        for i in 0..samples {
            let time = i as f64 / fs;
            let mut v = 0.05 * (2.0 * PI * 1.0 * time).sin();
            for &bt in &beats {
                let width = 0.02;
                let amp = (-0.5 * ((time - bt) / width).powi(2)).exp();
                v += 1.2 * amp;
            }
            data.push(v);
        }
        TimeSeries { fs, data }
    }

    fn run(detector: &PanTompkinsDetector, ts: &TimeSeries) -> EcgResult<Events> {
        let cleaned = detector.clean(ts)?;
        detector.detect(&cleaned)
    }

    #[test]
    fn detects_regular_beats() {
        let fs = 250.0;
        let rr = [0.82, 0.78, 0.8, 0.79, 0.81, 0.77, 0.84, 0.88];
        let ts = synthetic_timeseries(fs, &rr);
        let events = run(&PanTompkinsDetector::default(), &ts).unwrap();
        assert_eq!(events.len(), rr.len() + 1);
        assert!(events.is_strictly_increasing());
    }

    #[test]
    fn cleaning_preserves_length_and_rate() {
        let ts = synthetic_timeseries(360.0, &[0.9, 0.85]);
        let cleaned = PanTompkinsDetector::default().clean(&ts).unwrap();
        assert_eq!(cleaned.len(), ts.len());
        assert_eq!(cleaned.fs, ts.fs);
    }

    #[test]
    fn flat_lead_yields_no_beats() {
        let ts = TimeSeries {
            fs: 250.0,
            data: vec![0.0; 2500],
        };
        let events = run(&PanTompkinsDetector::default(), &ts).unwrap();
        assert!(events.len() < 2);
    }

    #[test]
    fn moving_average_divides_partial_window_by_full_width() {
        let out = moving_average(&[3.0, 3.0, 3.0, 6.0], 3);
        assert_eq!(out, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn first_difference_starts_at_zero() {
        let slope: Vec<f64> = first_difference(&[1.0, 3.0, 2.0]).collect();
        assert_eq!(slope, vec![0.0, 2.0, -1.0]);
        assert_eq!(first_difference(&[]).count(), 0);
    }

    #[test]
    fn search_back_prefers_earliest_maximum() {
        let cleaned = [0.0, 0.9, 0.2, 0.9, 0.1];
        assert_eq!(search_back(&cleaned, 0, 4), 1);
        assert_eq!(search_back(&cleaned, 2, 10), 3);
    }

    #[test]
    fn threshold_tracks_signal_and_noise() {
        let mut threshold = AdaptiveThreshold::seeded(&[2.0; 10], 4.0, 0.5);
        assert_eq!(threshold.level(), 1.0 + 0.5 * 1.0);
        threshold.learn_signal(10.0);
        assert_eq!(threshold.signal, 3.0);
        threshold.learn_noise(9.0);
        assert_eq!(threshold.noise, 2.0);
        assert_eq!(threshold.level(), 2.5);
    }

    #[test]
    fn rejects_too_short_signal() {
        let ts = TimeSeries {
            fs: 250.0,
            data: vec![0.1, 0.2],
        };
        let err = PanTompkinsDetector::default().clean(&ts).unwrap_err();
        assert!(matches!(err, EcgError::DetectionFailed(_)));
    }

    #[test]
    fn rejects_non_finite_samples() {
        let ts = TimeSeries {
            fs: 250.0,
            data: vec![0.1, f64::NAN, 0.2, 0.3],
        };
        let err = PanTompkinsDetector::default().clean(&ts).unwrap_err();
        assert_eq!(
            err,
            EcgError::DetectionFailed("non-finite sample at index 1".into())
        );
    }
}
