//! Forecast chart: declarative description, pixel layout, rendering and
//! post-render decorations.

pub mod annotate;
pub mod layout;
pub mod spec;
pub mod svg;

pub use annotate::{annotate, AnnotationReport, PathSegment, Renderer, Stroke, SymbolIcon};
pub use layout::ChartLayout;
pub use spec::{build, ChartOptions, ChartSpec};

use crate::weather::ForecastSeries;

/// Builds the chart description for `series` and lays it out.
pub fn prepare(series: &ForecastSeries, options: &ChartOptions) -> (ChartSpec, ChartLayout) {
    let spec = build(series, options);
    let layout = ChartLayout::compute(&spec, series);
    (spec, layout)
}
