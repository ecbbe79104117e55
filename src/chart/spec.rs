//! Declarative chart description, serialized as Highcharts options.

use serde::Serialize;
use serde_json::{json, Value};

use crate::weather::{ForecastSeries, RangePoint, SeriesPoint, WindSample};

pub const HOUR_MS: i64 = 3_600_000;

pub const TEMPERATURE_COLOR: &str = "#FF3333";
pub const NEGATIVE_TEMPERATURE_COLOR: &str = "#48AFE8";
pub const PRECIPITATION_COLOR: &str = "#68CFE8";
pub const WIND_COLOR: &str = "#434348";
pub const PRESSURE_COLOR: &str = "#90ed7d";
pub const PLOT_BORDER_COLOR: &str = "#cccccc";
pub const GRID_COLOR: &str = "rgba(128, 128, 128, 0.1)";

pub const PRECIPITATION_ERROR_PATTERN: &str = "precipitation-error";
pub const WINDBARBS_ID: &str = "windbarbs";

const DEFAULT_TITLE: &str = "Weather forecast";

/// Inputs to [`build`] that don't come from the forecast itself.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartOptions {
    pub title: Option<String>,
    pub width: u32,
    pub height: u32,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            title: None,
            width: 800,
            height: 310,
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChartSpec {
    pub chart: ChartFrame,
    pub defs: Defs,
    pub title: Title,
    pub tooltip: Tooltip,
    pub x_axis: Vec<Axis>,
    pub y_axis: Vec<Axis>,
    pub legend: Toggle,
    pub plot_options: Value,
    pub series: Vec<Series>,
}

impl ChartSpec {
    pub fn series_by_id(&self, id: &str) -> Option<&Series> {
        self.series.iter().find(|s| s.id.as_deref() == Some(id))
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChartFrame {
    pub width: u32,
    pub height: u32,
    pub margin_top: f64,
    pub margin_right: f64,
    pub margin_bottom: f64,
    /// Not a Highcharts option: fixed room for the temperature labels.
    #[serde(skip)]
    pub margin_left: f64,
    pub plot_border_width: f64,
    pub plot_border_color: String,
    pub align_ticks: bool,
    pub scrollable_plot_area: Value,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Defs {
    pub patterns: Vec<Pattern>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Pattern {
    pub id: String,
    pub path: PatternPath,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PatternPath {
    pub d: String,
    pub stroke: String,
    pub stroke_width: f64,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Title {
    pub text: String,
    pub align: String,
    pub style: Value,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Tooltip {
    pub shared: bool,
    #[serde(rename = "useHTML")]
    pub use_html: bool,
    pub header_format: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Toggle {
    pub enabled: bool,
}

/// An x or y axis. Options Highcharts leaves at their defaults are omitted.
#[derive(Serialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Axis {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linked_to: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tick_interval: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minor_tick_interval: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tick_length: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid_line_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid_line_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opposite: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_range: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_padding: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_padding: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_decimals: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_last_label: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crosshair: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plot_lines: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_on_tick: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_on_tick: Option<bool>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum SeriesData {
    Points(Vec<SeriesPoint<f64>>),
    Ranges(Vec<RangePoint>),
    Winds(Vec<WindSample>),
}

impl SeriesData {
    pub fn len(&self) -> usize {
        match self {
            SeriesData::Points(p) => p.len(),
            SeriesData::Ranges(r) => r.len(),
            SeriesData::Winds(w) => w.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Series {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub data: SeriesData,
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negative_color: Option<String>,
    pub y_axis: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dash_style: Option<String>,
    pub z_index: i32,
    /// Remaining per-series options passed through as-is.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

fn extra(value: Value) -> serde_json::Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => serde_json::Map::new(),
    }
}

/// Diagonal hatch used to fill the uncertain part of precipitation columns.
fn hatch_path() -> String {
    [
        (3.3, -6.7),
        (6.7, -3.3),
        (10.0, 0.0),
        (13.3, 3.3),
        (16.7, 6.7),
    ]
    .iter()
    .map(|(top, bottom)| format!("M {top} 0 L {bottom} 10"))
    .collect::<Vec<_>>()
    .join(" ")
}

fn x_axes() -> Vec<Axis> {
    let hourly = Axis {
        kind: Some("datetime".to_string()),
        tick_interval: Some((2 * HOUR_MS) as f64),
        minor_tick_interval: Some(HOUR_MS as f64),
        tick_length: Some(0.0),
        grid_line_width: Some(1.0),
        grid_line_color: Some(GRID_COLOR.to_string()),
        start_on_tick: Some(false),
        end_on_tick: Some(false),
        min_padding: Some(0.0),
        max_padding: Some(0.0),
        offset: Some(30.0),
        show_last_label: Some(true),
        labels: Some(json!({"format": "{value:%H}"})),
        crosshair: Some(true),
        ..Default::default()
    };
    let daily = Axis {
        kind: Some("datetime".to_string()),
        linked_to: Some(0),
        tick_interval: Some((24 * HOUR_MS) as f64),
        labels: Some(json!({
            "format": "{value:<span style=\"font-size: 12px; font-weight: bold\">%a</span> %b %e}",
            "align": "left",
            "x": 3,
            "y": 8
        })),
        opposite: Some(true),
        tick_length: Some(20.0),
        grid_line_width: Some(1.0),
        ..Default::default()
    };
    vec![hourly, daily]
}

fn y_axes() -> Vec<Axis> {
    let temperature = Axis {
        title: Some(json!({"text": null})),
        labels: Some(json!({"format": "{value}°", "style": {"fontSize": "10px"}, "x": -3})),
        plot_lines: Some(json!([{"value": 0, "color": "#BBBBBB", "width": 1, "zIndex": 2}])),
        max_padding: Some(0.3),
        min_range: Some(8.0),
        tick_interval: Some(1.0),
        grid_line_color: Some(GRID_COLOR.to_string()),
        ..Default::default()
    };
    let precipitation = Axis {
        title: Some(json!({"text": null})),
        labels: Some(json!({"enabled": false})),
        grid_line_width: Some(0.0),
        tick_length: Some(0.0),
        min_range: Some(10.0),
        min: Some(0.0),
        ..Default::default()
    };
    let pressure = Axis {
        allow_decimals: Some(false),
        title: Some(json!({
            "text": "hPa",
            "offset": 0,
            "align": "high",
            "rotation": 0,
            "style": {"fontSize": "10px", "color": PRESSURE_COLOR},
            "textAlign": "left",
            "x": 3
        })),
        labels: Some(json!({
            "style": {"fontSize": "8px", "color": PRESSURE_COLOR},
            "y": 2,
            "x": 3
        })),
        grid_line_width: Some(0.0),
        opposite: Some(true),
        show_last_label: Some(false),
        ..Default::default()
    };
    vec![temperature, precipitation, pressure]
}

fn point_format(unit_value: &str) -> String {
    format!("<span style=\"color:{{point.color}}\">\u{25CF}</span> {{series.name}}: <b>{unit_value}</b><br/>")
}

fn series(data: &ForecastSeries) -> Vec<Series> {
    let temperature = Series {
        name: "Temperature".to_string(),
        kind: "spline".to_string(),
        id: None,
        data: SeriesData::Points(data.temperatures.clone()),
        color: TEMPERATURE_COLOR.to_string(),
        negative_color: Some(NEGATIVE_TEMPERATURE_COLOR.to_string()),
        y_axis: 0,
        dash_style: None,
        z_index: 1,
        extra: extra(json!({
            "marker": {"enabled": false, "states": {"hover": {"enabled": true}}},
            "tooltip": {"pointFormat": point_format("{point.y}°C")}
        })),
    };
    let precipitation_error = Series {
        name: "Precipitation".to_string(),
        kind: "column".to_string(),
        id: None,
        data: SeriesData::Ranges(data.precipitations_error.clone()),
        color: format!("url(#{PRECIPITATION_ERROR_PATTERN})"),
        negative_color: None,
        y_axis: 1,
        dash_style: None,
        z_index: 0,
        extra: extra(json!({
            "groupPadding": 0,
            "pointPadding": 0,
            "grouping": false,
            "tooltip": {
                "valueSuffix": " mm",
                "pointFormat": point_format("{point.minvalue} mm - {point.maxvalue} mm")
            },
            "dataLabels": {
                "enabled": false,
                "filter": {"operator": ">", "property": "maxValue", "value": 0},
                "style": {"fontSize": "8px", "color": "gray"}
            }
        })),
    };
    let precipitation = Series {
        name: "Precipitation".to_string(),
        kind: "column".to_string(),
        id: None,
        data: SeriesData::Points(data.precipitations.clone()),
        color: PRECIPITATION_COLOR.to_string(),
        negative_color: None,
        y_axis: 1,
        dash_style: None,
        z_index: 0,
        extra: extra(json!({
            "groupPadding": 0,
            "pointPadding": 0,
            "grouping": false,
            "dataLabels": {
                "enabled": true,
                "filter": {"operator": ">", "property": "y", "value": 0},
                "style": {"fontSize": "8px", "color": "#666"}
            },
            "tooltip": {"valueSuffix": " mm"}
        })),
    };
    let pressure = Series {
        name: "Air pressure".to_string(),
        kind: "line".to_string(),
        id: None,
        data: SeriesData::Points(data.pressures.clone()),
        color: PRESSURE_COLOR.to_string(),
        negative_color: None,
        y_axis: 2,
        dash_style: Some("shortdot".to_string()),
        z_index: 0,
        extra: extra(json!({
            "marker": {"enabled": false},
            "shadow": false,
            "tooltip": {"valueSuffix": " hPa"}
        })),
    };
    let wind = Series {
        name: "Wind".to_string(),
        kind: "windbarb".to_string(),
        id: Some(WINDBARBS_ID.to_string()),
        data: SeriesData::Winds(data.winds.clone()),
        color: WIND_COLOR.to_string(),
        negative_color: None,
        y_axis: 0,
        dash_style: None,
        z_index: 0,
        extra: extra(json!({
            "lineWidth": 1.5,
            "vectorLength": 18,
            "yOffset": -15,
            "tooltip": {"valueSuffix": " m/s"}
        })),
    };
    vec![temperature, precipitation_error, precipitation, pressure, wind]
}

/// Builds the chart description for `data`. Pure, same input gives the same spec.
pub fn build(data: &ForecastSeries, options: &ChartOptions) -> ChartSpec {
    let title = options
        .title
        .clone()
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());

    ChartSpec {
        chart: ChartFrame {
            width: options.width,
            height: options.height,
            margin_top: 50.0,
            margin_right: 40.0,
            margin_bottom: 70.0,
            margin_left: 40.0,
            plot_border_width: 1.0,
            plot_border_color: PLOT_BORDER_COLOR.to_string(),
            align_ticks: false,
            scrollable_plot_area: json!({"minWidth": 720}),
        },
        defs: Defs {
            patterns: vec![Pattern {
                id: PRECIPITATION_ERROR_PATTERN.to_string(),
                path: PatternPath {
                    d: hatch_path(),
                    stroke: PRECIPITATION_COLOR.to_string(),
                    stroke_width: 1.0,
                },
            }],
        },
        title: Title {
            text: title,
            align: "left".to_string(),
            style: json!({"whiteSpace": "nowrap", "textOverflow": "ellipsis"}),
        },
        tooltip: Tooltip {
            shared: true,
            use_html: true,
            header_format: concat!(
                "<small>{point.x:%A, %b %e, %H:%M} - {point.point.to:%H:%M}</small><br>",
                "<b>{point.point.symbolName}</b><br>"
            )
            .to_string(),
        },
        x_axis: x_axes(),
        y_axis: y_axes(),
        legend: Toggle { enabled: false },
        plot_options: json!({"series": {"pointPlacement": "between"}}),
        series: series(data),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::testing::{met_like_payload, payload};
    use crate::series::transform;

    fn sample() -> ForecastSeries {
        let payload = serde_json::from_value(met_like_payload(10, 20)).unwrap();
        transform(&payload).unwrap()
    }

    #[test]
    fn test_series_layout() {
        let data = sample();
        let spec = build(&data, &ChartOptions::default());

        let kinds: Vec<_> = spec.series.iter().map(|s| s.kind.as_str()).collect();
        assert_eq!(kinds, vec!["spline", "column", "column", "line", "windbarb"]);
        let axes: Vec<_> = spec.series.iter().map(|s| s.y_axis).collect();
        assert_eq!(axes, vec![0, 1, 1, 2, 0]);

        assert_eq!(spec.series[0].data.len(), data.temperatures.len());
        assert_eq!(spec.series[2].data.len(), data.precipitations.len());
        assert_eq!(spec.series[3].data.len(), data.pressures.len());
        assert_eq!(
            spec.series_by_id(WINDBARBS_ID).map(|s| s.data.len()),
            Some(data.winds.len())
        );
        assert_eq!(spec.series[1].color, "url(#precipitation-error)");
        assert_eq!(
            spec.series[0].negative_color.as_deref(),
            Some(NEGATIVE_TEMPERATURE_COLOR)
        );
        assert_eq!(spec.series[3].dash_style.as_deref(), Some("shortdot"));
    }

    #[test]
    fn test_axes() {
        let spec = build(&sample(), &ChartOptions::default());
        assert_eq!(spec.x_axis.len(), 2);
        assert_eq!(spec.x_axis[1].linked_to, Some(0));
        assert_eq!(spec.y_axis.len(), 3);
        assert_eq!(spec.y_axis[1].min, Some(0.0));
        assert_eq!(spec.y_axis[2].opposite, Some(true));
    }

    #[test]
    fn test_deterministic_json() {
        let data = sample();
        let options = ChartOptions {
            title: Some("London".to_string()),
            ..Default::default()
        };
        let a = serde_json::to_string(&build(&data, &options)).unwrap();
        let b = serde_json::to_string(&build(&data, &options)).unwrap();
        assert_eq!(a, b);

        let json: Value = serde_json::from_str(&a).unwrap();
        assert_eq!(json["title"]["text"], "London");
        assert_eq!(json["tooltip"]["useHTML"], true);
        assert_eq!(json["xAxis"][0]["type"], "datetime");
        assert_eq!(json["series"][4]["id"], "windbarbs");
        assert_eq!(json["series"][4]["vectorLength"], 18);
        assert_eq!(json["series"][0]["data"][0]["symbolName"], "Partly cloudy");
        assert!(json["chart"].get("marginLeft").is_none());
    }

    #[test]
    fn test_empty_series_and_default_title() {
        let data = transform(&serde_json::from_value(payload(vec![])).unwrap()).unwrap();
        let spec = build(
            &data,
            &ChartOptions {
                title: Some("  ".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(spec.title.text, "Weather forecast");
        assert!(spec.series.iter().all(|s| s.data.is_empty()));
    }

    #[test]
    fn test_hatch_pattern() {
        let spec = build(&sample(), &ChartOptions::default());
        let pattern = &spec.defs.patterns[0];
        assert_eq!(pattern.id, "precipitation-error");
        assert!(pattern.path.d.starts_with("M 3.3 0 L -6.7 10"));
        assert_eq!(pattern.path.d.matches('M').count(), 5);
    }
}
