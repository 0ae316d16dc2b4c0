use anyhow::Result;
use ecgview_lib::{
    metrics::histogram::RrHistogram,
    plot::{GridGeometry, PanelPlacement, PlotBackend, OVERVIEW_COLS, OVERVIEW_ROWS},
};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::Path;

const MAJOR_GRID: RGBColor = RGBColor(255, 0, 0);
const MINOR_GRID: RGBColor = RGBColor(255, 192, 203);
const HISTOGRAM_FILL: RGBColor = RGBColor(31, 119, 180);

/// Draws onto one region of a bitmap.
pub struct BitmapSurface<'a, 'b> {
    area: &'a DrawingArea<BitMapBackend<'b>, Shift>,
}

impl<'a, 'b> BitmapSurface<'a, 'b> {
    pub fn new(area: &'a DrawingArea<BitMapBackend<'b>, Shift>) -> Self {
        Self { area }
    }
}

fn within(value: f64, (lo, hi): (f64, f64)) -> bool {
    value >= lo && value <= hi
}

impl PlotBackend for BitmapSurface<'_, '_> {
    fn draw_strip(&mut self, geometry: &GridGeometry) -> Result<()> {
        let x_range = geometry.x_range();
        let y_range = geometry.y_range();
        let mut chart = ChartBuilder::on(self.area)
            .margin(8)
            .caption(&geometry.title, ("sans-serif", 18))
            .x_label_area_size(28)
            .y_label_area_size(44)
            .build_cartesian_2d(x_range.0..x_range.1, y_range.0..y_range.1)?;
        chart
            .configure_mesh()
            .disable_mesh()
            .x_desc("Time (s)")
            .y_desc("Amplitude (mV)")
            .draw()?;

        let grid = [
            (&geometry.x_ticks.minor, &geometry.y_ticks.minor, MINOR_GRID.mix(0.4).stroke_width(1)),
            (&geometry.x_ticks.major, &geometry.y_ticks.major, MAJOR_GRID.mix(0.7).stroke_width(1)),
        ];
        // Ticks may overshoot the axis bound by one step; clip them here.
        for (xs, ys, style) in grid {
            chart.draw_series(xs.iter().copied().filter(|&x| within(x, x_range)).map(|x| {
                PathElement::new(vec![(x, y_range.0), (x, y_range.1)], style)
            }))?;
            chart.draw_series(ys.iter().copied().filter(|&y| within(y, y_range)).map(|y| {
                PathElement::new(vec![(x_range.0, y), (x_range.1, y)], style)
            }))?;
        }

        chart.draw_series(LineSeries::new(
            geometry.trace.iter().map(|p| (p[0], p[1])),
            BLACK.stroke_width(1),
        ))?;
        chart.draw_series(
            geometry
                .peak_markers
                .iter()
                .map(|p| Circle::new((p[0], p[1]), 4, RED.filled())),
        )?;
        Ok(())
    }

    fn draw_histogram(&mut self, histogram: &RrHistogram, title: &str) -> Result<()> {
        let (lo, hi) = histogram.range();
        let top = (histogram.max_count() + 1) as f64;
        let mut chart = ChartBuilder::on(self.area)
            .margin(10)
            .caption(title, ("sans-serif", 22))
            .x_label_area_size(32)
            .y_label_area_size(44)
            .build_cartesian_2d(lo..hi, 0.0..top)?;
        chart
            .configure_mesh()
            .light_line_style(BLACK.mix(0.05))
            .bold_line_style(BLACK.mix(0.3))
            .x_desc("RR interval (s)")
            .y_desc("Count")
            .draw()?;
        chart.draw_series(histogram.bars().filter(|bar| bar.2 > 0).map(|(left, right, count)| {
            Rectangle::new([(left, 0.0), (right, count as f64)], HISTOGRAM_FILL.mix(0.7).filled())
        }))?;
        Ok(())
    }
}

/// Render `draw` onto a fresh white bitmap at `path`.
pub fn with_bitmap<F>(path: &Path, size: (u32, u32), draw: F) -> Result<()>
where
    F: FnOnce(&DrawingArea<BitMapBackend<'_>, Shift>) -> Result<()>,
{
    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;
    draw(&root)?;
    root.present()?;
    Ok(())
}

/// Twelve strips on one bitmap, three rows of four.
pub fn draw_overview(path: &Path, size: (u32, u32), panels: &[PanelPlacement]) -> Result<()> {
    with_bitmap(path, size, |root| {
        let cells = root.split_evenly((OVERVIEW_ROWS, OVERVIEW_COLS));
        for panel in panels {
            let cell = &cells[panel.row * OVERVIEW_COLS + panel.col];
            BitmapSurface::new(cell).draw_strip(&panel.geometry)?;
        }
        Ok(())
    })
}
