//! Pixel geometry of a rendered chart: plot area and value to pixel mapping.

use chrono::{DateTime, Utc};
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::Ranged;

use crate::chart::spec::{ChartSpec, HOUR_MS};
use crate::weather::ForecastSeries;

/// A value range mapped onto a pixel span, with the same rounding plotters
/// applies inside a cartesian chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearAxis {
    pub min: f64,
    pub max: f64,
    /// Pixel positions of `min` and `max`.
    pub pixels: (i32, i32),
}

impl LinearAxis {
    pub fn to_pixels(&self, value: f64) -> f64 {
        if self.max == self.min {
            return self.pixels.0 as f64;
        }
        RangedCoordf64::from(self.min..self.max).map(&value, self.pixels) as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotPoint {
    /// Relative to the plot area's left edge.
    pub plot_x: f64,
    /// Relative to the plot area's top edge.
    pub plot_y: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartLayout {
    pub width: f64,
    pub height: f64,
    pub plot_left: f64,
    pub plot_top: f64,
    pub plot_width: f64,
    pub plot_height: f64,
    pub plot_border_color: String,
    /// Millisecond timestamps.
    pub x_axis: LinearAxis,
    pub temperature_axis: LinearAxis,
    pub precipitation_axis: LinearAxis,
    pub pressure_axis: LinearAxis,
}

fn extent(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

/// Widens `(min, max)` symmetrically so it spans at least `min_range`.
fn ensure_range(min: f64, max: f64, min_range: f64) -> (f64, f64) {
    let range = max - min;
    if range >= min_range {
        return (min, max);
    }
    let pad = (min_range - range) / 2.0;
    (min - pad, max + pad)
}

impl ChartLayout {
    /// Lays out `series` inside the frame described by `spec`.
    pub fn compute(spec: &ChartSpec, series: &ForecastSeries) -> Self {
        let frame = &spec.chart;
        let width = frame.width as f64;
        let height = frame.height as f64;
        let plot_left = frame.margin_left;
        let plot_top = frame.margin_top;
        let plot_width = (width - frame.margin_left - frame.margin_right).max(1.0);
        let plot_height = (height - frame.margin_top - frame.margin_bottom).max(1.0);

        let (x_min, x_max) = series
            .time_range()
            .map(|(first, last)| (first.timestamp_millis() as f64, last.timestamp_millis() as f64))
            .filter(|(first, last)| last > first)
            .unwrap_or_else(|| {
                let first = series.time_range().map_or(0, |(first, _)| first.timestamp_millis());
                (first as f64, (first + HOUR_MS) as f64)
            });

        let (t_min, t_max) =
            extent(series.temperatures.iter().map(|p| p.y)).unwrap_or((0.0, 0.0));
        let (t_min, t_max) = ensure_range(t_min, t_max, 8.0);
        let t_max = t_max + (t_max - t_min) * 0.3;

        let p_max = extent(
            series
                .precipitations
                .iter()
                .map(|p| p.y)
                .chain(series.precipitations_error.iter().map(|p| p.maxvalue)),
        )
        .map(|(_, hi)| hi)
        .unwrap_or(0.0)
        .max(10.0);

        let (a_min, a_max) = extent(series.pressures.iter().map(|p| p.y))
            .map(|(lo, hi)| ensure_range(lo.floor(), hi.ceil(), 2.0))
            .unwrap_or((1000.0, 1020.0));

        // plotters draws value axes from the last pixel row above the bottom edge
        let bottom = (plot_top + plot_height) as i32;
        let y_pixels = (bottom - 1, plot_top as i32 - 1);
        Self {
            width,
            height,
            plot_left,
            plot_top,
            plot_width,
            plot_height,
            plot_border_color: frame.plot_border_color.clone(),
            x_axis: LinearAxis {
                min: x_min,
                max: x_max,
                pixels: (plot_left as i32, (plot_left + plot_width) as i32),
            },
            temperature_axis: LinearAxis {
                min: t_min.floor(),
                max: t_max.ceil(),
                pixels: y_pixels,
            },
            precipitation_axis: LinearAxis {
                min: 0.0,
                max: p_max,
                pixels: y_pixels,
            },
            pressure_axis: LinearAxis {
                min: a_min,
                max: a_max,
                pixels: y_pixels,
            },
        }
    }

    pub fn time_to_pixels(&self, time: DateTime<Utc>) -> f64 {
        self.x_axis.to_pixels(time.timestamp_millis() as f64)
    }

    /// Position of a sample relative to the plot area.
    pub fn plot_point(&self, time: DateTime<Utc>, axis: &LinearAxis, value: f64) -> PlotPoint {
        PlotPoint {
            plot_x: self.time_to_pixels(time) - self.plot_left,
            plot_y: axis.to_pixels(value) - self.plot_top,
        }
    }

    pub fn plot_bottom(&self) -> f64 {
        self.plot_top + self.plot_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::spec::{build, ChartOptions};
    use crate::series::testing::{node, payload};
    use crate::series::transform;

    fn layout_for(temps: &[f64]) -> (ChartLayout, ForecastSeries) {
        let nodes = temps
            .iter()
            .enumerate()
            .map(|(h, t)| node(h as i64, false, "fair_day", *t))
            .collect();
        let series = transform(&serde_json::from_value(payload(nodes)).unwrap()).unwrap();
        let spec = build(&series, &ChartOptions::default());
        (ChartLayout::compute(&spec, &series), series)
    }

    #[test]
    fn test_plot_area() {
        let (layout, _) = layout_for(&[1.0, 2.0]);
        assert_eq!(layout.plot_left, 40.0);
        assert_eq!(layout.plot_top, 50.0);
        assert_eq!(layout.plot_width, 720.0);
        assert_eq!(layout.plot_height, 190.0);
        assert_eq!(layout.plot_bottom(), 240.0);
    }

    #[test]
    fn test_x_axis_spans_samples() {
        let (layout, series) = layout_for(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let first = series.temperatures[0].x;
        let last = series.temperatures[4].x;
        assert_eq!(layout.time_to_pixels(first), layout.plot_left);
        assert_eq!(layout.time_to_pixels(last), layout.plot_left + layout.plot_width);
    }

    #[test]
    fn test_temperature_axis_min_range_and_padding() {
        let (layout, _) = layout_for(&[10.0, 11.0]);
        let axis = layout.temperature_axis;
        assert!(axis.max - axis.min >= 8.0);
        assert!(axis.min <= 10.0 && axis.max >= 11.0);
        // higher values sit higher on screen
        assert!(axis.to_pixels(11.0) < axis.to_pixels(10.0));
    }

    #[test]
    fn test_degenerate_axis() {
        let axis = LinearAxis {
            min: 5.0,
            max: 5.0,
            pixels: (12, 112),
        };
        assert_eq!(axis.to_pixels(5.0), 12.0);
        assert_eq!(axis.to_pixels(9.0), 12.0);
    }

    #[test]
    fn test_axis_rounding() {
        let axis = LinearAxis {
            min: 0.0,
            max: 4.0,
            pixels: (40, 760),
        };
        assert_eq!(axis.to_pixels(0.0), 40.0);
        assert_eq!(axis.to_pixels(1.0), 220.0);
        assert_eq!(axis.to_pixels(4.0), 760.0);
        // past the range keeps the same scale
        assert_eq!(axis.to_pixels(5.0), 940.0);

        let upwards = LinearAxis {
            min: 0.0,
            max: 10.0,
            pixels: (239, 49),
        };
        assert_eq!(upwards.to_pixels(0.0), 239.0);
        assert_eq!(upwards.to_pixels(10.0), 49.0);
        assert!(upwards.to_pixels(5.0) < 239.0 && upwards.to_pixels(5.0) > 49.0);
    }

    #[test]
    fn test_single_sample_has_an_hour_wide_axis() {
        let (layout, series) = layout_for(&[3.0]);
        assert_eq!(layout.time_to_pixels(series.temperatures[0].x), layout.plot_left);
        assert_eq!(layout.x_axis.max - layout.x_axis.min, HOUR_MS as f64);
    }

    #[test]
    fn test_plot_point_is_relative() {
        let (layout, series) = layout_for(&[0.0, 4.0]);
        let p = &series.temperatures[0];
        let point = layout.plot_point(p.x, &layout.temperature_axis, p.y);
        assert_eq!(point.plot_x, 0.0);
        assert!(point.plot_y > 0.0 && point.plot_y <= layout.plot_height);
    }
}
