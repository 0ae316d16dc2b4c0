use crate::record::Record;
use crate::signal::Events;
use anyhow::{anyhow, bail, Context, Result};
use std::fs;
use std::panic;
use std::path::Path;

/// ADC units per millivolt when a header leaves the gain unset or zero.
const DEFAULT_ADC_GAIN: f64 = 200.0;

/// Simple WFDB annotation entry.
#[derive(Debug, Clone)]
pub struct WfdbAnnotation {
    pub sample: usize,
    pub code: u8,
}

impl WfdbAnnotation {
    pub fn is_beat(&self) -> bool {
        self.code > 0 && self.code < 59
    }
}

/// The parts of a `.hea` header the binary parser does not expose.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderInfo {
    pub record_name: String,
    pub n_signals: usize,
    pub fs: Option<f64>,
    pub lead_names: Vec<String>,
    pub comments: Vec<String>,
}

/// Parse record line, signal descriptions and `#` comments of a header.
pub fn parse_header_text(text: &str) -> Result<HeaderInfo> {
    let mut comments = Vec::new();
    let mut lines = Vec::new();
    for line in text.lines() {
        let trimmed = line.trim();
        if let Some(comment) = trimmed.strip_prefix('#') {
            let comment = comment.trim();
            if !comment.is_empty() {
                comments.push(comment.to_string());
            }
        } else if !trimmed.is_empty() {
            lines.push(trimmed);
        }
    }

    let record_line = lines.first().ok_or_else(|| anyhow!("header has no record line"))?;
    let mut fields = record_line.split_whitespace();
    let record_name = fields
        .next()
        .map(|name| name.split('/').next().unwrap_or(name).to_string())
        .ok_or_else(|| anyhow!("record line is empty"))?;
    let n_signals: usize = fields
        .next()
        .ok_or_else(|| anyhow!("record line lacks a signal count"))?
        .parse()
        .context("signal count is not an integer")?;
    let fs = fields.next().map(parse_frequency).transpose()?;

    if lines.len() < n_signals + 1 {
        bail!(
            "header declares {} signals but describes {}",
            n_signals,
            lines.len() - 1
        );
    }
    let lead_names = lines[1..=n_signals]
        .iter()
        .enumerate()
        .map(|(idx, line)| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() > 8 {
                fields[8..].join(" ")
            } else {
                format!("signal {}", idx)
            }
        })
        .collect();

    Ok(HeaderInfo {
        record_name,
        n_signals,
        fs,
        lead_names,
        comments,
    })
}

/// Sampling frequency field, e.g. `360`, `500/1.0` or `250(0)`.
fn parse_frequency(field: &str) -> Result<f64> {
    let number = field
        .split(|c| c == '/' || c == '(')
        .next()
        .unwrap_or(field);
    number
        .parse::<f64>()
        .with_context(|| format!("sampling frequency '{}' is not a number", field))
}

/// Load every lead of a WFDB record, converting ADC units to millivolts.
pub fn load_wfdb_record(header_path: &Path) -> Result<Record> {
    let text = fs::read_to_string(header_path)
        .with_context(|| format!("failed to read {}", header_path.display()))?;
    let info = parse_header_text(&text)
        .with_context(|| format!("malformed header {}", header_path.display()))?;
    if info.n_signals == 0 {
        bail!("record {} has no signals", info.record_name);
    }

    // wfdb-rust panics on missing or truncated signal files.
    let (header, signals) = panic::catch_unwind(|| wfdb_rust::parse_wfdb(header_path))
        .map_err(|_| anyhow!("unreadable signal data for {}", header_path.display()))?;

    if signals.len() != info.n_signals {
        bail!(
            "header lists {} signals but {} were decoded",
            info.n_signals,
            signals.len()
        );
    }
    if signals.iter().any(|lead| lead.is_empty()) {
        bail!("record {} has a lead without samples", info.record_name);
    }
    let fs = header
        .record
        .sampling_frequency
        .map(|f| f as f64)
        .or(info.fs)
        .ok_or_else(|| anyhow!("record {} has no sampling frequency", info.record_name))?;

    let mut leads = Vec::with_capacity(signals.len());
    for (idx, (raw, name)) in signals.iter().zip(info.lead_names.iter()).enumerate() {
        let spec = header
            .signal_specs
            .get(idx)
            .ok_or_else(|| anyhow!("missing signal specification {}", idx))?;
        let gain = spec
            .adc_gain
            .map(|g| g as f64)
            .filter(|g| *g != 0.0)
            .unwrap_or(DEFAULT_ADC_GAIN);
        let baseline = spec.baseline.or(spec.adc_zero).unwrap_or(0) as f64;
        let data = raw
            .iter()
            .map(|&sample| (sample as f64 - baseline) / gain)
            .collect();
        leads.push((name.clone(), data));
    }

    let id = header_path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_string)
        .unwrap_or(info.record_name);
    Record::from_leads(id, leads, fs, info.comments).map_err(anyhow::Error::from)
}

/// Parse MIT annotation binary stream into samples & codes.
pub fn parse_wfdb_annotations(buf: &[u8]) -> Vec<WfdbAnnotation> {
    let mut out = Vec::new();
    let mut idx = 0;
    let mut sample: usize = 0;
    while idx + 2 <= buf.len() {
        let word = u16::from_le_bytes([buf[idx], buf[idx + 1]]);
        idx += 2;
        let code = (word >> 10) as u8;
        let diff = (word & 0x03FF) as usize;
        if code == 0 && diff == 0 {
            break;
        }
        match code {
            59 => {
                if idx + 4 > buf.len() {
                    break;
                }
                let high = u16::from_le_bytes([buf[idx], buf[idx + 1]]) as u32;
                let low = u16::from_le_bytes([buf[idx + 2], buf[idx + 3]]) as u32;
                idx += 4;
                let skip = (high << 16) | low;
                sample = sample.wrapping_add(skip as usize);
            }
            60..=62 => {
                // NUM/SUB/CHN carry no sample
                sample = sample.wrapping_add(diff);
            }
            63 => {
                idx += diff;
                if diff % 2 != 0 && idx < buf.len() {
                    idx += 1;
                }
            }
            _ => {
                sample = sample.wrapping_add(diff);
                out.push(WfdbAnnotation { sample, code });
            }
        }
    }
    out
}

/// Read WFDB annotation file (ATR) and convert to beat events.
pub fn load_wfdb_events(path: &Path) -> Result<Events> {
    let buf = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let beat_samples: Vec<usize> = parse_wfdb_annotations(&buf)
        .into_iter()
        .filter(WfdbAnnotation::is_beat)
        .map(|ann| ann.sample)
        .collect();
    Ok(Events::from_indices(beat_samples))
}
