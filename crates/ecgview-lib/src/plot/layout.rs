use super::grid::{grid_geometry, GridGeometry};
use crate::error::EcgResult;
use crate::record::Record;
use log::warn;
use serde::{Deserialize, Serialize};

pub const OVERVIEW_ROWS: usize = 3;
pub const OVERVIEW_COLS: usize = 4;

/// One lead strip placed in the overview grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelPlacement {
    pub row: usize,
    pub col: usize,
    pub lead: String,
    pub geometry: GridGeometry,
}

/// Place every lead of `record`, in record order, row by row on a 3 × 4 grid.
pub fn twelve_lead_overview(record: &Record, duration_sec: f64) -> EcgResult<Vec<PanelPlacement>> {
    let cells = OVERVIEW_ROWS * OVERVIEW_COLS;
    if record.n_leads() > cells {
        warn!(
            "record {} has {} leads; only the first {} fit the overview",
            record.id,
            record.n_leads(),
            cells
        );
    }
    let mut panels = Vec::with_capacity(record.n_leads().min(cells));
    for (idx, lead) in record.lead_names().iter().take(cells).enumerate() {
        let Some(ts) = record.lead_at(idx) else {
            continue;
        };
        let geometry = grid_geometry(&ts.data, ts.fs, lead, None, duration_sec)?;
        panels.push(PanelPlacement {
            row: idx / OVERVIEW_COLS,
            col: idx % OVERVIEW_COLS,
            lead: lead.clone(),
            geometry,
        });
    }
    Ok(panels)
}
