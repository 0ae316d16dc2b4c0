use crate::error::{check_sampling_rate, EcgError, EcgResult};
use crate::signal::TimeSeries;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

/// Lead shown first when a record is selected, if the record carries it.
pub const PREFERRED_LEAD: &str = "II";

const NO_COMMENTS: &str = "No comments";

/// A multi-lead recording. Samples are stored row-major by time:
/// `signals[t * n_leads + lead]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: String,
    signals: Vec<f64>,
    lead_names: Vec<String>,
    fs: f64,
    comments: Vec<String>,
}

impl Record {
    pub fn new(
        id: impl Into<String>,
        signals: Vec<f64>,
        lead_names: Vec<String>,
        fs: f64,
        comments: Vec<String>,
    ) -> EcgResult<Self> {
        let id = id.into();
        check_sampling_rate(fs)?;
        if lead_names.is_empty() {
            return Err(EcgError::InvalidRecord(format!("record '{id}' has no leads")));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = lead_names.iter().find(|name| !seen.insert(name.as_str())) {
            return Err(EcgError::InvalidRecord(format!(
                "record '{id}' repeats lead '{dup}'"
            )));
        }
        if signals.len() % lead_names.len() != 0 {
            return Err(EcgError::InvalidRecord(format!(
                "record '{id}' has {} values, not a multiple of {} leads",
                signals.len(),
                lead_names.len()
            )));
        }
        Ok(Self {
            id,
            signals,
            lead_names,
            fs,
            comments,
        })
    }

    /// Assemble a record from per-lead columns of equal length.
    pub fn from_leads(
        id: impl Into<String>,
        leads: Vec<(String, Vec<f64>)>,
        fs: f64,
        comments: Vec<String>,
    ) -> EcgResult<Self> {
        let id = id.into();
        let n_samples = leads.first().map(|(_, data)| data.len()).unwrap_or(0);
        if let Some((name, data)) = leads.iter().find(|(_, data)| data.len() != n_samples) {
            return Err(EcgError::InvalidRecord(format!(
                "lead '{name}' has {} samples, expected {n_samples}",
                data.len()
            )));
        }
        let mut signals = Vec::with_capacity(n_samples * leads.len());
        for t in 0..n_samples {
            signals.extend(leads.iter().map(|(_, data)| data[t]));
        }
        let names = leads.into_iter().map(|(name, _)| name).collect();
        Self::new(id, signals, names, fs, comments)
    }

    pub fn fs(&self) -> f64 {
        self.fs
    }

    pub fn lead_names(&self) -> &[String] {
        &self.lead_names
    }

    pub fn n_leads(&self) -> usize {
        self.lead_names.len()
    }

    pub fn n_samples(&self) -> usize {
        self.signals.len() / self.n_leads()
    }

    pub fn duration_secs(&self) -> f64 {
        self.n_samples() as f64 / self.fs
    }

    /// First free-text annotation, which carries the diagnosis in PhysioNet headers.
    pub fn diagnosis(&self) -> &str {
        self.comments
            .first()
            .map(String::as_str)
            .unwrap_or(NO_COMMENTS)
    }

    pub fn lead_index(&self, name: &str) -> Option<usize> {
        self.lead_names.iter().position(|lead| lead == name)
    }

    /// Copy one column out of the sample matrix.
    pub fn lead_at(&self, idx: usize) -> Option<TimeSeries> {
        if idx >= self.n_leads() {
            return None;
        }
        let data = self
            .signals
            .iter()
            .skip(idx)
            .step_by(self.n_leads())
            .copied()
            .collect();
        Some(TimeSeries { fs: self.fs, data })
    }

    pub fn lead(&self, name: &str) -> Option<TimeSeries> {
        self.lead_index(name).and_then(|idx| self.lead_at(idx))
    }

    pub fn default_lead(&self) -> &str {
        self.lead_names
            .iter()
            .find(|name| name.as_str() == PREFERRED_LEAD)
            .or_else(|| self.lead_names.first())
            .map(String::as_str)
            .unwrap_or(PREFERRED_LEAD)
    }

    pub fn metadata(&self, file_path: Option<PathBuf>) -> RecordMetadata {
        RecordMetadata {
            id: self.id.clone(),
            fs: self.fs,
            n_leads: self.n_leads(),
            length_seconds: self.duration_secs(),
            diagnosis: self.diagnosis().to_string(),
            lead_names: self.lead_names.clone(),
            file_path,
        }
    }
}

/// Summary shown next to a record in listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordMetadata {
    pub id: String,
    pub fs: f64,
    pub n_leads: usize,
    pub length_seconds: f64,
    pub diagnosis: String,
    pub lead_names: Vec<String>,
    pub file_path: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn extracts_columns_from_row_major_matrix() {
        let signals = vec![1.0, 10.0, 2.0, 20.0, 3.0, 30.0];
        let record = Record::new("r1", signals, names(&["I", "II"]), 500.0, vec![]).unwrap();
        assert_eq!(record.n_samples(), 3);
        assert_eq!(record.lead("I").unwrap().data, vec![1.0, 2.0, 3.0]);
        assert_eq!(record.lead("II").unwrap().data, vec![10.0, 20.0, 30.0]);
        assert!(record.lead("V1").is_none());
        assert!(record.lead_at(2).is_none());
    }

    #[test]
    fn from_leads_round_trips_columns() {
        let record = Record::from_leads(
            "r2",
            vec![("V1".into(), vec![0.1, 0.2]), ("V2".into(), vec![0.3, 0.4])],
            250.0,
            vec![],
        )
        .unwrap();
        assert_eq!(record.lead("V2").unwrap().data, vec![0.3, 0.4]);
        assert_eq!(record.duration_secs(), 2.0 / 250.0);
    }

    #[test]
    fn rejects_duplicate_lead_names() {
        let err = Record::new("dup", vec![0.0, 0.0], names(&["I", "I"]), 500.0, vec![])
            .unwrap_err();
        assert!(matches!(err, EcgError::InvalidRecord(_)));
    }

    #[test]
    fn rejects_ragged_matrix_and_bad_fs() {
        assert!(Record::new("x", vec![0.0; 3], names(&["I", "II"]), 500.0, vec![]).is_err());
        assert_eq!(
            Record::new("x", vec![0.0; 2], names(&["I"]), 0.0, vec![]).unwrap_err(),
            EcgError::InvalidSamplingRate(0.0)
        );
    }

    #[test]
    fn prefers_lead_two_then_first() {
        let with_ii = Record::new("a", vec![0.0; 2], names(&["I", "II"]), 500.0, vec![]).unwrap();
        assert_eq!(with_ii.default_lead(), "II");
        let without = Record::new("b", vec![0.0; 2], names(&["V1", "V2"]), 500.0, vec![]).unwrap();
        assert_eq!(without.default_lead(), "V1");
    }

    #[test]
    fn diagnosis_falls_back_when_uncommented() {
        let record = Record::new("c", vec![0.0], names(&["I"]), 500.0, vec![]).unwrap();
        assert_eq!(record.diagnosis(), "No comments");
        let record = Record::new(
            "d",
            vec![0.0],
            names(&["I"]),
            500.0,
            vec!["Dx: sinus bradycardia".into(), "Age: 60".into()],
        )
        .unwrap();
        assert_eq!(record.diagnosis(), "Dx: sinus bradycardia");
        assert_eq!(record.metadata(None).n_leads, 1);
    }
}
