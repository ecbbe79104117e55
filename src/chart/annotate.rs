//! Decorations drawn on top of a rendered chart: weather symbols above the
//! temperature curve and the tick row framing the wind barbs.

use crate::chart::layout::ChartLayout;
use crate::chart::spec::{HOUR_MS, WINDBARBS_ID};
use crate::error::RenderError;
use crate::icons::{icon_url, ConditionCode};
use crate::weather::ForecastSeries;

pub const SYMBOL_SIZE: f64 = 30.0;
pub const SYMBOL_OFFSET: (f64, f64) = (-8.0, -30.0);
pub const WINDBARB_SHIFT: f64 = 8.0;

const SHORT_TICK_START: f64 = 28.0;
const TICK_END: f64 = 32.0;

#[derive(Debug, Clone, PartialEq)]
pub struct SymbolIcon {
    /// yr.no symbol id with its day phase suffix, e.g. "01d".
    pub id: String,
    pub url: String,
    /// Short stand-in for renderers that can't show images.
    pub glyph: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSegment {
    MoveTo(f64, f64),
    LineTo(f64, f64),
    Close,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    pub color: String,
    pub width: f64,
}

/// Drawing primitives a chart backend exposes to the annotator.
pub trait Renderer {
    fn image(
        &mut self,
        icon: &SymbolIcon,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Result<(), RenderError>;

    fn path(&mut self, segments: &[PathSegment], stroke: &Stroke) -> Result<(), RenderError>;

    /// Moves every element of a named group horizontally by `dx`.
    fn translate_group(&mut self, group: &str, dx: f64) -> Result<(), RenderError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnnotationReport {
    pub drawn: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl AnnotationReport {
    fn record(&mut self, result: Result<(), RenderError>) {
        match result {
            Ok(()) => self.drawn += 1,
            Err(e) => {
                tracing::warn!("annotation draw failed: {}", e);
                self.failed += 1;
            }
        }
    }

    pub fn merge(self, other: Self) -> Self {
        Self {
            drawn: self.drawn + other.drawn,
            skipped: self.skipped + other.skipped,
            failed: self.failed + other.failed,
        }
    }
}

/// Draws a symbol above every other temperature point.
pub fn draw_weather_symbols<R: Renderer>(
    renderer: &mut R,
    layout: &ChartLayout,
    series: &ForecastSeries,
) -> AnnotationReport {
    let mut report = AnnotationReport::default();

    for (i, point) in series.temperatures.iter().enumerate().step_by(2) {
        let Some(code) = series.symbols.get(i) else {
            report.skipped += 1;
            continue;
        };
        let condition = ConditionCode::parse(code);
        let (Some(entry), Some(id)) = (condition.entry(), condition.icon_id()) else {
            tracing::debug!("no weather symbol for {}", condition.stem);
            report.skipped += 1;
            continue;
        };

        let position = layout.plot_point(point.x, &layout.temperature_axis, point.y);
        let icon = SymbolIcon {
            url: icon_url(&id),
            id,
            glyph: entry.glyph(),
        };
        report.record(renderer.image(
            &icon,
            position.plot_x + layout.plot_left + SYMBOL_OFFSET.0,
            position.plot_y + layout.plot_top + SYMBOL_OFFSET.1,
            SYMBOL_SIZE,
            SYMBOL_SIZE,
        ));
    }
    report
}

/// Draws hourly dividers below the plot area, long ones every second hour,
/// then nudges the wind barbs into the middle of their cells.
pub fn draw_blocks_for_wind_arrows<R: Renderer>(
    renderer: &mut R,
    layout: &ChartLayout,
) -> AnnotationReport {
    let mut report = AnnotationReport::default();
    let stroke = Stroke {
        color: layout.plot_border_color.clone(),
        width: 1.0,
    };
    let step = HOUR_MS as f64;
    let end = layout.x_axis.max + step;
    let bottom = layout.plot_bottom();

    let mut pos = layout.x_axis.min;
    let mut i = 0usize;
    while pos <= end {
        let is_last = pos == end;
        let x = layout.x_axis.to_pixels(pos).round() + if is_last { 0.5 } else { -0.5 };
        let is_long = i % 2 == 0;
        let top = bottom + if is_long { 0.0 } else { SHORT_TICK_START };

        report.record(renderer.path(
            &[
                PathSegment::MoveTo(x, top),
                PathSegment::LineTo(x, bottom + TICK_END),
                PathSegment::Close,
            ],
            &stroke,
        ));

        pos += step;
        i += 1;
    }

    report.record(renderer.translate_group(WINDBARBS_ID, WINDBARB_SHIFT));
    report
}

/// Runs both decoration passes.
pub fn annotate<R: Renderer>(
    renderer: &mut R,
    layout: &ChartLayout,
    series: &ForecastSeries,
) -> AnnotationReport {
    let symbols = draw_weather_symbols(renderer, layout, series);
    let blocks = draw_blocks_for_wind_arrows(renderer, layout);
    let report = symbols.merge(blocks);
    tracing::debug!(
        drawn = report.drawn,
        skipped = report.skipped,
        failed = report.failed,
        "annotated chart"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::spec::{build, ChartOptions};
    use crate::series::testing::{node, payload};
    use crate::series::transform;

    #[derive(Default)]
    struct Recorder {
        images: Vec<(String, f64, f64, f64, f64)>,
        paths: Vec<Vec<PathSegment>>,
        translations: Vec<(String, f64)>,
        fail_image: Option<String>,
        fail_every_path: bool,
    }

    impl Renderer for Recorder {
        fn image(
            &mut self,
            icon: &SymbolIcon,
            x: f64,
            y: f64,
            width: f64,
            height: f64,
        ) -> Result<(), RenderError> {
            if self.fail_image.as_deref() == Some(icon.id.as_str()) {
                return Err(RenderError::Image(icon.url.clone()));
            }
            self.images.push((icon.id.clone(), x, y, width, height));
            Ok(())
        }

        fn path(&mut self, segments: &[PathSegment], _stroke: &Stroke) -> Result<(), RenderError> {
            if self.fail_every_path {
                return Err(RenderError::Path("broken".to_string()));
            }
            self.paths.push(segments.to_vec());
            Ok(())
        }

        fn translate_group(&mut self, group: &str, dx: f64) -> Result<(), RenderError> {
            self.translations.push((group.to_string(), dx));
            Ok(())
        }
    }

    fn fixture(symbols: &[&str]) -> (ChartLayout, ForecastSeries) {
        let nodes = symbols
            .iter()
            .enumerate()
            .map(|(h, s)| node(h as i64, false, s, h as f64))
            .collect();
        let series = transform(&serde_json::from_value(payload(nodes)).unwrap()).unwrap();
        let spec = build(&series, &ChartOptions::default());
        (ChartLayout::compute(&spec, &series), series)
    }

    #[test]
    fn test_symbols_on_even_points() {
        let (layout, series) = fixture(&["clearsky_day", "fair_day", "rain_night", "fog", "cloudy"]);
        let mut recorder = Recorder::default();
        let report = draw_weather_symbols(&mut recorder, &layout, &series);

        let ids: Vec<_> = recorder.images.iter().map(|i| i.0.as_str()).collect();
        assert_eq!(ids, vec!["01d", "09n", "04"]);
        assert_eq!(report, AnnotationReport { drawn: 3, skipped: 0, failed: 0 });

        let (_, x, y, w, h) = recorder.images[0];
        let p = &series.temperatures[0];
        let expected = layout.plot_point(p.x, &layout.temperature_axis, p.y);
        assert_eq!(x, expected.plot_x + layout.plot_left - 8.0);
        assert_eq!(y, expected.plot_y + layout.plot_top - 30.0);
        assert_eq!((w, h), (30.0, 30.0));
    }

    #[test]
    fn test_unknown_symbol_skipped() {
        let (layout, series) = fixture(&["xyz_night", "fair_day", "snow_day"]);
        let mut recorder = Recorder::default();
        let report = draw_weather_symbols(&mut recorder, &layout, &series);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.drawn, 1);
        assert_eq!(recorder.images[0].0, "13d");
    }

    #[test]
    fn test_failed_image_does_not_stop_pass() {
        let (layout, series) = fixture(&["fog", "fog", "fog", "fog", "rain_day"]);
        let mut recorder = Recorder {
            fail_image: Some("15".to_string()),
            ..Default::default()
        };
        let report = draw_weather_symbols(&mut recorder, &layout, &series);
        assert_eq!(report.failed, 2);
        assert_eq!(report.drawn, 1);
        assert_eq!(recorder.images[0].0, "09d");
    }

    #[test]
    fn test_wind_dividers() {
        // 4 hourly samples: axis spans 3 hours, ticks at 0..=4 hours
        let (layout, series) = fixture(&["fog"; 4]);
        let mut recorder = Recorder::default();
        let report = draw_blocks_for_wind_arrows(&mut recorder, &layout);

        assert_eq!(recorder.paths.len(), 5);
        assert_eq!(report.drawn, 6);
        assert_eq!(recorder.translations, vec![("windbarbs".to_string(), 8.0)]);

        let bottom = layout.plot_bottom();
        for (i, path) in recorder.paths.iter().enumerate() {
            let PathSegment::MoveTo(x, top) = path[0] else {
                panic!("path must start with a move");
            };
            let expected_top = if i % 2 == 0 { bottom } else { bottom + 28.0 };
            assert_eq!(top, expected_top);
            assert_eq!(path[1], PathSegment::LineTo(x, bottom + 32.0));
            assert_eq!(path[2], PathSegment::Close);
        }

        let first_x = match recorder.paths[0][0] {
            PathSegment::MoveTo(x, _) => x,
            _ => unreachable!(),
        };
        let first_time = series.temperatures[0].x;
        assert_eq!(first_x, layout.time_to_pixels(first_time).round() - 0.5);

        let last_x = match recorder.paths[4][0] {
            PathSegment::MoveTo(x, _) => x,
            _ => unreachable!(),
        };
        assert_eq!(last_x.fract(), 0.5);
        assert!(last_x > layout.plot_left + layout.plot_width);
    }

    #[test]
    fn test_failed_paths_are_counted() {
        let (layout, series) = fixture(&["fog"; 3]);
        let mut recorder = Recorder {
            fail_every_path: true,
            ..Default::default()
        };
        let report = annotate(&mut recorder, &layout, &series);
        assert_eq!(report.failed, 4);
        // symbols and the barb translation still happen
        assert_eq!(recorder.images.len(), 2);
        assert_eq!(recorder.translations.len(), 1);
    }
}
