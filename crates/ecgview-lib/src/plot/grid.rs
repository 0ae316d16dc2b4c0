//! Strip-chart geometry on standard ECG paper (25 mm/s, 10 mm/mV).

use crate::error::{check_sampling_rate, EcgError, EcgResult};
use serde::{Deserialize, Serialize};

/// Seconds per large square at 25 mm/s.
pub const MAJOR_TIME_STEP_S: f64 = 0.2;
/// Seconds per small square at 25 mm/s.
pub const MINOR_TIME_STEP_S: f64 = 0.04;
/// Millivolts per large square at 10 mm/mV.
pub const MAJOR_AMPLITUDE_STEP_MV: f64 = 0.5;
/// Millivolts per small square at 10 mm/mV.
pub const MINOR_AMPLITUDE_STEP_MV: f64 = 0.1;
/// Headroom above the largest absolute sample in the window.
pub const AMPLITUDE_HEADROOM: f64 = 1.5;
/// Half-span used when the window is flat, one large square.
pub const MIN_AMPLITUDE_RANGE_MV: f64 = MAJOR_AMPLITUDE_STEP_MV;
/// Default strip length in seconds.
pub const DEFAULT_DURATION_S: f64 = 10.0;

/// Slack, in steps, absorbed when deciding whether the bound is reached.
const TICK_SLACK: f64 = 1e-9;

/// Tick positions `start, start + step, ...` until `end` is covered.
///
/// Positions are computed as `start + k * step` rather than accumulated, and
/// the last tick may fall up to one step past `end`; the drawing surface clips
/// it. Covering the bound never depends on exact float equality.
pub fn ticks(start: f64, end: f64, step: f64) -> Vec<f64> {
    if !(step > 0.0) || !start.is_finite() || !end.is_finite() || end < start {
        return vec![start];
    }
    let steps = ((end - start) / step - TICK_SLACK).ceil().max(0.0) as usize;
    (0..=steps).map(|k| start + k as f64 * step).collect()
}

/// Number of samples drawn for a strip: the requested duration, capped at
/// what the lead actually holds.
pub fn window_len(len: usize, fs: f64, duration_sec: f64) -> usize {
    let requested = (duration_sec * fs).floor();
    if requested >= len as f64 {
        len
    } else {
        requested.max(0.0) as usize
    }
}

/// `1.5 × max(|max|, |min|)` over the window, widened to
/// [`MIN_AMPLITUDE_RANGE_MV`] when the window is flat.
pub fn amplitude_range(window: &[f64]) -> f64 {
    let peak = window
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(0.0_f64, |acc, v| acc.max(v.abs()));
    let range = peak * AMPLITUDE_HEADROOM;
    if range > 0.0 && range.is_finite() {
        range
    } else {
        MIN_AMPLITUDE_RANGE_MV
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisTicks {
    pub major: Vec<f64>,
    pub minor: Vec<f64>,
}

/// Everything needed to draw one lead strip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridGeometry {
    pub title: String,
    pub fs: f64,
    pub duration_sec: f64,
    pub n_samples: usize,
    /// Symmetric half-span of the amplitude axis (mV), always positive.
    pub amplitude_range: f64,
    pub x_ticks: AxisTicks,
    pub y_ticks: AxisTicks,
    /// `[t, amplitude]` for each sample in the window.
    pub trace: Vec<[f64; 2]>,
    /// `[t, amplitude]` for each supplied beat inside the window.
    pub peak_markers: Vec<[f64; 2]>,
}

impl GridGeometry {
    pub fn x_range(&self) -> (f64, f64) {
        (0.0, self.duration_sec)
    }

    pub fn y_range(&self) -> (f64, f64) {
        (-self.amplitude_range, self.amplitude_range)
    }
}

/// Lay out one lead on clinical paper.
pub fn grid_geometry(
    signal: &[f64],
    fs: f64,
    title: &str,
    peaks: Option<&[usize]>,
    duration_sec: f64,
) -> EcgResult<GridGeometry> {
    check_sampling_rate(fs)?;
    if !(duration_sec.is_finite() && duration_sec > 0.0) {
        return Err(EcgError::InvalidDuration(duration_sec));
    }
    if signal.is_empty() {
        return Err(EcgError::EmptySignal);
    }

    let n_samples = window_len(signal.len(), fs, duration_sec);
    let window = &signal[..n_samples];
    let amplitude_range = amplitude_range(window);

    let trace = window
        .iter()
        .enumerate()
        .map(|(k, &v)| [k as f64 / fs, v])
        .collect();
    let peak_markers = peaks
        .unwrap_or_default()
        .iter()
        .copied()
        .filter(|&p| p < n_samples)
        .map(|p| [p as f64 / fs, signal[p]])
        .collect();

    Ok(GridGeometry {
        title: title.to_string(),
        fs,
        duration_sec,
        n_samples,
        amplitude_range,
        x_ticks: AxisTicks {
            major: ticks(0.0, duration_sec, MAJOR_TIME_STEP_S),
            minor: ticks(0.0, duration_sec, MINOR_TIME_STEP_S),
        },
        y_ticks: AxisTicks {
            major: ticks(-amplitude_range, amplitude_range, MAJOR_AMPLITUDE_STEP_MV),
            minor: ticks(-amplitude_range, amplitude_range, MINOR_AMPLITUDE_STEP_MV),
        },
        trace,
        peak_markers,
    })
}
