use crate::detectors::PeakDetector;
use crate::error::{EcgError, EcgResult};
use crate::io::store::LoadReport;
use crate::metrics::{
    histogram::{rr_histogram, RrHistogram},
    rate::{AnalysisResult, RateAnalyzer, RateStatus},
};
use crate::plot::{grid_geometry, twelve_lead_overview, GridGeometry, PanelPlacement};
use crate::record::Record;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Records available to the viewer. Loading replaces the whole set.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    records: Arc<BTreeMap<String, Record>>,
}

/// Everything shown for one selected lead.
#[derive(Debug, Clone, Serialize)]
pub struct LeadView {
    pub record_id: String,
    pub lead: String,
    pub analysis: AnalysisResult,
    pub status: RateStatus,
    pub detail: GridGeometry,
    pub histogram: RrHistogram,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: BTreeMap<String, Record>) -> Self {
        Self {
            records: Arc::new(records),
        }
    }

    pub fn from_report(report: LoadReport) -> Self {
        Self::from_records(report.records)
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn record_ids(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    pub fn record(&self, id: &str) -> EcgResult<&Record> {
        self.records
            .get(id)
            .ok_or_else(|| EcgError::RecordNotFound(id.to_string()))
    }

    /// Analyse one lead (the record's default lead when `lead` is `None`) and
    /// lay it out with its beats marked.
    pub fn lead_view<D: PeakDetector>(
        &self,
        record_id: &str,
        lead: Option<&str>,
        duration_sec: f64,
        analyzer: &RateAnalyzer<D>,
    ) -> EcgResult<LeadView> {
        let record = self.record(record_id)?;
        let lead = lead.unwrap_or_else(|| record.default_lead());
        let ts = record.lead(lead).ok_or_else(|| EcgError::LeadNotFound {
            record: record_id.to_string(),
            lead: lead.to_string(),
        })?;
        let analysis = analyzer.analyze_series(&ts)?;
        let detail = grid_geometry(
            &ts.data,
            ts.fs,
            lead,
            Some(&analysis.peaks.indices),
            duration_sec,
        )?;
        let histogram = rr_histogram(&analysis.rr);
        Ok(LeadView {
            record_id: record_id.to_string(),
            lead: lead.to_string(),
            status: analysis.status(),
            analysis,
            detail,
            histogram,
        })
    }

    pub fn overview(&self, record_id: &str, duration_sec: f64) -> EcgResult<Vec<PanelPlacement>> {
        twelve_lead_overview(self.record(record_id)?, duration_sec)
    }
}
