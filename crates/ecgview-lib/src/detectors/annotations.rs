use super::PeakDetector;
use crate::error::EcgResult;
use crate::signal::{Events, TimeSeries};

/// Replays reference beat annotations instead of detecting beats.
#[derive(Debug, Clone)]
pub struct AnnotationDetector {
    beats: Events,
}

impl AnnotationDetector {
    pub fn new(mut beats: Events) -> Self {
        beats.indices.sort_unstable();
        beats.indices.dedup();
        Self { beats }
    }
}

impl PeakDetector for AnnotationDetector {
    fn clean(&self, ts: &TimeSeries) -> EcgResult<TimeSeries> {
        Ok(ts.clone())
    }

    fn detect(&self, cleaned: &TimeSeries) -> EcgResult<Events> {
        let indices = self
            .beats
            .indices
            .iter()
            .copied()
            .take_while(|&idx| idx < cleaned.len())
            .collect();
        Ok(Events::from_indices(indices))
    }
}
