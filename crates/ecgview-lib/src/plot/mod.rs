pub mod grid;
pub mod layout;

pub use grid::{grid_geometry, AxisTicks, GridGeometry, DEFAULT_DURATION_S};
pub use layout::{twelve_lead_overview, PanelPlacement, OVERVIEW_COLS, OVERVIEW_ROWS};

use crate::metrics::histogram::RrHistogram;

/// A drawing surface for strip charts and RR distributions.
pub trait PlotBackend {
    fn draw_strip(&mut self, geometry: &GridGeometry) -> anyhow::Result<()>;
    fn draw_histogram(&mut self, histogram: &RrHistogram, title: &str) -> anyhow::Result<()>;
}

/// Compute the clinical grid for one lead and draw it on `surface`.
pub fn render<B: PlotBackend + ?Sized>(
    surface: &mut B,
    signal: &[f64],
    fs: f64,
    title: &str,
    peaks: Option<&[usize]>,
    duration_sec: f64,
) -> anyhow::Result<GridGeometry> {
    let geometry = grid_geometry(signal, fs, title, peaks, duration_sec)?;
    surface.draw_strip(&geometry)?;
    Ok(geometry)
}
