//! Beat detection behind a two-stage `clean` / `detect` contract.

pub mod annotations;
pub mod ecg;

use crate::error::EcgResult;
use crate::signal::{Events, TimeSeries};

pub use annotations::AnnotationDetector;
pub use ecg::{EcgPipelineConfig, PanTompkinsDetector};

/// A beat detection algorithm.
///
/// `clean` returns a series of the same length and sampling rate; `detect`
/// returns strictly increasing sample indices into that series, possibly none.
/// Failures on malformed input are reported as [`crate::EcgError::DetectionFailed`].
pub trait PeakDetector {
    fn clean(&self, ts: &TimeSeries) -> EcgResult<TimeSeries>;
    fn detect(&self, cleaned: &TimeSeries) -> EcgResult<Events>;
}

impl<D: PeakDetector + ?Sized> PeakDetector for &D {
    fn clean(&self, ts: &TimeSeries) -> EcgResult<TimeSeries> {
        (**self).clean(ts)
    }
    fn detect(&self, cleaned: &TimeSeries) -> EcgResult<Events> {
        (**self).detect(cleaned)
    }
}

impl<D: PeakDetector + ?Sized> PeakDetector for Box<D> {
    fn clean(&self, ts: &TimeSeries) -> EcgResult<TimeSeries> {
        (**self).clean(ts)
    }
    fn detect(&self, cleaned: &TimeSeries) -> EcgResult<Events> {
        (**self).detect(cleaned)
    }
}
