//! SVG rendering of a forecast chart through plotters.

use chrono::{DateTime, TimeZone, Utc};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::chart::annotate::{annotate, PathSegment, Renderer, Stroke, SymbolIcon};
use crate::chart::layout::{ChartLayout, LinearAxis};
use crate::chart::spec::{ChartSpec, SeriesData, HOUR_MS, WINDBARBS_ID};
use crate::error::RenderError;
use crate::units::direction;
use crate::weather::{SeriesPoint, WindSample};

const FONT: &str = "sans-serif";
const WIND_ROW_OFFSET: f64 = 16.0;
/// Moves the hour labels below the wind row.
const HOUR_LABEL_OFFSET: i32 = 36;

fn backend_error<E: std::error::Error + Send + Sync>(e: DrawingAreaErrorKind<E>) -> RenderError {
    RenderError::Backend(e.to_string())
}

/// `#rrggbb` as a plotters color.
fn hex_color(hex: &str) -> Option<RGBColor> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some(RGBColor(channel(0)?, channel(2)?, channel(4)?))
}

fn centered(size: f64, color: &RGBColor) -> TextStyle<'static> {
    (FONT, size)
        .into_font()
        .color(color)
        .pos(Pos::new(HPos::Center, VPos::Center))
}

fn hour_label(ms: &f64) -> String {
    Utc.timestamp_millis_opt(*ms as i64)
        .single()
        .map(|t| t.format("%H").to_string())
        .unwrap_or_default()
}

fn degree_label(value: &f64) -> String {
    format!("{value:.0}°")
}

fn pressure_label(value: &f64) -> String {
    format!("{value:.0}")
}

fn millis(time: DateTime<Utc>) -> f64 {
    time.timestamp_millis() as f64
}

/// Draws onto a plotters drawing area in chart pixels.
///
/// Wind arrows are held back until [`ChartCanvas::finish`], so a
/// `translate_group` on the wind barbs still moves them.
pub struct ChartCanvas<'a, DB: DrawingBackend> {
    area: &'a DrawingArea<DB, Shift>,
    winds: Vec<(f64, f64, &'static str)>,
    wind_dx: f64,
}

impl<'a, DB: DrawingBackend> ChartCanvas<'a, DB> {
    pub fn new(area: &'a DrawingArea<DB, Shift>) -> Self {
        Self {
            area,
            winds: vec![],
            wind_dx: 0.0,
        }
    }

    /// Draws the base chart: title, axes, precipitation, temperature and
    /// pressure. Wind barbs are queued.
    pub fn draw_chart(&mut self, spec: &ChartSpec, layout: &ChartLayout) -> Result<(), RenderError> {
        let area = self.area;
        area.fill(&WHITE).map_err(backend_error)?;
        area.draw(&Text::new(
            spec.title.text.clone(),
            ((layout.width / 2.0) as i32, 20),
            centered(16.0, &BLACK),
        ))
        .map_err(backend_error)?;

        let x = &layout.x_axis;
        let temperature = &layout.temperature_axis;
        let pressure = &layout.pressure_axis;
        let border = hex_color(&layout.plot_border_color).unwrap_or(BLACK);
        let ticks: Vec<f64> = (0..)
            .map(|i| x.min + (i * 2 * HOUR_MS) as f64)
            .take_while(|t| *t <= x.max)
            .collect();

        let mut chart = ChartBuilder::on(area)
            .margin_top(layout.plot_top as u32)
            .y_label_area_size(layout.plot_left as u32)
            .right_y_label_area_size((layout.width - layout.plot_left - layout.plot_width).max(0.0) as u32)
            .x_label_area_size((layout.height - layout.plot_bottom()).max(0.0) as u32)
            .build_cartesian_2d(
                (x.min..x.max).with_key_points(ticks.clone()),
                temperature.min..temperature.max,
            )
            .map_err(backend_error)?
            .set_secondary_coord(x.min..x.max, pressure.min..pressure.max);

        chart
            .configure_mesh()
            .x_labels(ticks.len())
            .x_label_formatter(&hour_label)
            .y_label_formatter(&degree_label)
            .set_tick_mark_size(LabelAreaPosition::Bottom, HOUR_LABEL_OFFSET)
            .light_line_style(TRANSPARENT)
            .bold_line_style(border.mix(0.4))
            .axis_style(border)
            .draw()
            .map_err(backend_error)?;
        chart
            .configure_secondary_axes()
            .y_label_formatter(&pressure_label)
            .axis_style(border)
            .draw()
            .map_err(backend_error)?;

        for series in &spec.series {
            let color = hex_color(&series.color).unwrap_or(BLACK);
            match &series.data {
                SeriesData::Ranges(ranges) => {
                    // error bars only get an outline, the hatch lives in the chart description
                    let outline = hex_color(crate::chart::spec::PRECIPITATION_COLOR)
                        .unwrap_or(BLACK)
                        .stroke_width(1);
                    let bars = ranges.iter().map(|r| (r.x, r.to, r.maxvalue));
                    self.columns(layout, &layout.precipitation_axis, bars, outline, false)?;
                }
                SeriesData::Points(points) if series.kind == "column" => {
                    let bars = points.iter().map(|p| (p.x, p.to, p.y));
                    self.columns(layout, &layout.precipitation_axis, bars, color.filled(), true)?;
                }
                SeriesData::Points(points) if series.y_axis == 2 => {
                    let line: Vec<(f64, f64)> = points.iter().map(|p| (millis(p.x), p.y)).collect();
                    chart
                        .draw_secondary_series(DashedLineSeries::new(line, 2_i32, 4_i32, color.stroke_width(1)))
                        .map_err(backend_error)?;
                }
                SeriesData::Points(points) => {
                    let negative = series.negative_color.as_deref().and_then(hex_color);
                    for pair in points.windows(2) {
                        let below_zero = (pair[0].y + pair[1].y) / 2.0 < 0.0;
                        let segment_color = match negative {
                            Some(negative) if below_zero => negative,
                            _ => color,
                        };
                        chart
                            .draw_series(LineSeries::new(
                                pair.iter().map(|p: &SeriesPoint<f64>| (millis(p.x), p.y)),
                                segment_color.stroke_width(2),
                            ))
                            .map_err(backend_error)?;
                    }
                }
                SeriesData::Winds(winds) => self.queue_winds(layout, winds),
            }
        }
        Ok(())
    }

    /// Bars from the zero line, clipped to the plot area's right edge.
    fn columns(
        &self,
        layout: &ChartLayout,
        axis: &LinearAxis,
        bars: impl Iterator<Item = (DateTime<Utc>, DateTime<Utc>, f64)>,
        style: ShapeStyle,
        labelled: bool,
    ) -> Result<(), RenderError> {
        let right = (layout.plot_left + layout.plot_width) as i32;
        let base = axis.to_pixels(0.0) as i32;
        for (from, to, value) in bars.filter(|(_, _, value)| *value > 0.0) {
            let x0 = layout.time_to_pixels(from) as i32;
            let x1 = (layout.time_to_pixels(to) as i32).min(right).max(x0 + 1);
            let top = axis.to_pixels(value) as i32;
            self.area
                .draw(&Rectangle::new([(x0, top), (x1 - 1, base)], style))
                .map_err(backend_error)?;
            if labelled {
                self.area
                    .draw(&Text::new(
                        format!("{value:.1}"),
                        ((x0 + x1) / 2, top - 6),
                        centered(9.0, &BLACK),
                    ))
                    .map_err(backend_error)?;
            }
        }
        Ok(())
    }

    fn queue_winds(&mut self, layout: &ChartLayout, winds: &[WindSample]) {
        let y = layout.plot_bottom() + WIND_ROW_OFFSET;
        self.winds.extend(winds.iter().map(|w| {
            (
                layout.time_to_pixels(w.x),
                y,
                direction::degree_to_arrow(w.direction),
            )
        }));
    }

    /// Draws the queued wind arrows at their final position.
    pub fn finish(self) -> Result<(), RenderError> {
        let style = centered(14.0, &hex_color(crate::chart::spec::WIND_COLOR).unwrap_or(BLACK));
        for (x, y, arrow) in &self.winds {
            let at = ((x + self.wind_dx).round() as i32, y.round() as i32);
            self.area
                .draw(&Text::new(*arrow, at, style.clone()))
                .map_err(backend_error)?;
        }
        Ok(())
    }
}

impl<DB: DrawingBackend> Renderer for ChartCanvas<'_, DB> {
    /// Plain SVG output has no access to the icon files, the symbol's glyph
    /// stands in for the image.
    fn image(
        &mut self,
        icon: &SymbolIcon,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Result<(), RenderError> {
        if !x.is_finite() || !y.is_finite() {
            return Err(RenderError::Image(icon.url.clone()));
        }
        let center = ((x + width / 2.0).round() as i32, (y + height / 2.0).round() as i32);
        self.area
            .draw(&Text::new(icon.glyph, center, centered(height * 0.6, &BLACK)))
            .map_err(|e| RenderError::Image(format!("{}: {}", icon.id, e)))
    }

    fn path(&mut self, segments: &[PathSegment], stroke: &Stroke) -> Result<(), RenderError> {
        let mut points: Vec<(i32, i32)> = Vec::with_capacity(segments.len() + 1);
        let mut start = None;
        for segment in segments {
            match *segment {
                PathSegment::MoveTo(x, y) | PathSegment::LineTo(x, y)
                    if !x.is_finite() || !y.is_finite() =>
                {
                    return Err(RenderError::Path(format!("non-finite point {x},{y}")))
                }
                PathSegment::MoveTo(x, y) => {
                    let point = (x.round() as i32, y.round() as i32);
                    start = Some(point);
                    points.push(point);
                }
                PathSegment::LineTo(x, y) => points.push((x.round() as i32, y.round() as i32)),
                PathSegment::Close => points.extend(start),
            }
        }
        let color = hex_color(&stroke.color).unwrap_or(BLACK);
        let width = stroke.width.max(1.0).round() as u32;
        self.area
            .draw(&PathElement::new(points, color.stroke_width(width)))
            .map_err(|e| RenderError::Path(e.to_string()))
    }

    fn translate_group(&mut self, group: &str, dx: f64) -> Result<(), RenderError> {
        if group != WINDBARBS_ID {
            return Err(RenderError::UnknownGroup(group.to_string()));
        }
        self.wind_dx += dx;
        Ok(())
    }
}

/// Renders and decorates a chart as an SVG document.
pub fn render_chart(
    spec: &ChartSpec,
    layout: &ChartLayout,
    series: &crate::weather::ForecastSeries,
) -> Result<String, RenderError> {
    let mut svg = String::new();
    {
        let size = (layout.width as u32, layout.height as u32);
        let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
        let mut canvas = ChartCanvas::new(&root);
        canvas.draw_chart(spec, layout)?;
        let report = annotate(&mut canvas, layout, series);
        if report.failed > 0 {
            tracing::warn!("{} chart annotations failed", report.failed);
        }
        canvas.finish()?;
        root.present().map_err(backend_error)?;
    }
    Ok(svg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::spec::{build, ChartOptions};
    use crate::series::testing::{met_like_payload, node, payload};
    use crate::series::transform;
    use crate::weather::ForecastSeries;

    fn chart_for(value: serde_json::Value, title: Option<&str>) -> (ChartSpec, ChartLayout, ForecastSeries) {
        let series = transform(&serde_json::from_value(value).unwrap()).unwrap();
        let spec = build(
            &series,
            &ChartOptions {
                title: title.map(str::to_string),
                ..Default::default()
            },
        );
        let layout = ChartLayout::compute(&spec, &series);
        (spec, layout, series)
    }

    #[test]
    fn test_hex_color() {
        assert_eq!(hex_color("#FF3333"), Some(RGBColor(255, 51, 51)));
        assert_eq!(hex_color("#cccccc"), Some(RGBColor(204, 204, 204)));
        assert_eq!(hex_color("url(#precipitation-error)"), None);
        assert_eq!(hex_color("#fff"), None);
    }

    #[test]
    fn test_render_chart() {
        let (spec, layout, series) = chart_for(met_like_payload(12, 30), Some("Oslo, Norway"));
        let svg = render_chart(&spec, &layout, &series).unwrap();

        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains("Oslo, Norway"));
        // wind from the south, arrows point north
        assert!(svg.contains('↑'));
        // hour labels and the divider row
        assert!(svg.contains(">02<"));
        assert!(svg.contains("<polyline"));
    }

    #[test]
    fn test_negative_temperatures_use_negative_color() {
        let nodes = vec![
            node(0, false, "snow", -4.0),
            node(1, false, "snow", -3.0),
            node(2, false, "snow", 2.0),
            node(3, false, "snow", 3.0),
        ];
        let (spec, layout, series) = chart_for(payload(nodes), None);
        let svg = render_chart(&spec, &layout, &series).unwrap().to_uppercase();
        assert!(svg.contains("#48AFE8"));
        assert!(svg.contains("#FF3333"));
        assert!(svg.contains("WEATHER FORECAST"));
    }

    #[test]
    fn test_wind_group_is_shifted() {
        let (_, layout, series) = chart_for(met_like_payload(4, 4), None);
        let mut svg = String::new();
        let root = SVGBackend::with_string(&mut svg, (800, 310)).into_drawing_area();
        let mut canvas = ChartCanvas::new(&root);
        canvas.queue_winds(&layout, &series.winds);
        assert_eq!(canvas.winds.len(), 2);
        assert_eq!(canvas.winds[0].0, layout.plot_left);

        canvas.translate_group(WINDBARBS_ID, 8.0).unwrap();
        assert_eq!(canvas.wind_dx, 8.0);
        assert_eq!(
            canvas.translate_group("nope", 1.0),
            Err(RenderError::UnknownGroup("nope".to_string()))
        );
        assert!(canvas.finish().is_ok());
    }

    #[test]
    fn test_non_finite_path_rejected() {
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, (100, 100)).into_drawing_area();
            let mut canvas = ChartCanvas::new(&root);
            let stroke = Stroke {
                color: "#000000".to_string(),
                width: 1.0,
            };
            assert!(canvas
                .path(&[PathSegment::MoveTo(f64::NAN, 0.0)], &stroke)
                .is_err());
            assert!(canvas
                .path(
                    &[
                        PathSegment::MoveTo(10.0, 0.0),
                        PathSegment::LineTo(10.0, 50.0),
                        PathSegment::Close
                    ],
                    &stroke
                )
                .is_ok());
            root.present().unwrap();
        }
        assert!(svg.contains("<polyline"));
    }
}
