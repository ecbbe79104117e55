//! Shapes a forecast payload into the parallel series drawn by the chart.

use chrono::{DateTime, TimeDelta, Utc};

use crate::error::TransformError;
use crate::icons::ConditionCode;
use crate::weather::{ForecastPayload, ForecastPoint, RangePoint, SeriesPoint, WindSample};

pub use crate::weather::ForecastSeries;

/// Samples ending later than this after the first sample's midpoint are dropped.
pub const HORIZON: TimeDelta = TimeDelta::hours(48);

/// Builds fresh series from `payload`.
///
/// Accumulation stops at the first sample whose window ends past
/// [`HORIZON`]; everything before it is kept in input order.
pub fn transform(payload: &ForecastPayload) -> Result<ForecastSeries, TransformError> {
    let nodes = payload.timeseries()?;
    let mut series = ForecastSeries::default();
    let mut window_start: Option<DateTime<Utc>> = None;

    for (i, node) in nodes.iter().enumerate() {
        let limit = window_start.map(|start| start + HORIZON);
        if limit.is_some_and(|limit| node.time >= limit) {
            break;
        }

        let point = ForecastPoint::from_node(i, node)?;
        let to = point.to();
        if limit.is_some_and(|limit| to > limit) {
            break;
        }
        if window_start.is_none() {
            window_start = Some(point.time + (to - point.time) / 2);
        }

        push_point(&mut series, i, &point);
    }

    tracing::debug!(
        samples = series.len(),
        nodes = nodes.len(),
        "transformed forecast payload"
    );
    Ok(series)
}

fn push_point(series: &mut ForecastSeries, i: usize, point: &ForecastPoint) {
    let x = point.time;
    let to = point.to();
    let symbol_name = ConditionCode::parse(&point.condition_code)
        .entry()
        .map(|entry| entry.text.to_string());

    series.symbols.push(point.condition_code.clone());
    series.temperatures.push(SeriesPoint {
        x,
        y: point.air_temperature,
        to,
        symbol_name,
    });
    series.precipitations.push(SeriesPoint {
        x,
        y: point.precipitation_amount,
        to,
        symbol_name: None,
    });
    if let Some((min, max)) = point.precipitation_range {
        series.precipitations_error.push(RangePoint {
            x,
            y: max,
            to,
            minvalue: min,
            maxvalue: max,
        });
    }
    if i % 2 == 0 {
        series.winds.push(WindSample {
            x,
            value: point.wind_speed,
            direction: point.wind_direction,
        });
    }
    series.pressures.push(SeriesPoint {
        x,
        y: point.air_pressure,
        to,
        symbol_name: None,
    });
}

#[cfg(test)]
pub(crate) mod testing {
    use chrono::{DateTime, TimeDelta, Utc};
    use serde_json::{json, Value};

    pub const T0: &str = "2026-10-19T00:00:00Z";

    pub fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(T0).unwrap().with_timezone(&Utc)
    }

    /// A timeseries node `hours` after T0, with a one or six hour summary block.
    pub fn node(hours: i64, six_hour: bool, symbol: &str, temp: f64) -> Value {
        let time = t0() + TimeDelta::hours(hours);
        let next = json!({
            "summary": {"symbol_code": symbol},
            "details": {"precipitation_amount": 0.4}
        });
        let mut data = json!({
            "instant": {"details": {
                "air_temperature": temp,
                "air_pressure_at_sea_level": 1010.0 + hours as f64,
                "wind_speed": 3.0,
                "wind_from_direction": 180.0
            }}
        });
        let key = if six_hour { "next_6_hours" } else { "next_1_hours" };
        data[key] = next;
        json!({"time": time.to_rfc3339(), "data": data})
    }

    pub fn payload(nodes: Vec<Value>) -> Value {
        json!({"type": "Feature", "properties": {"timeseries": nodes}})
    }

    /// Hourly nodes for `hourly` hours, then six-hourly nodes up to `total_hours`.
    pub fn met_like_payload(hourly: i64, total_hours: i64) -> Value {
        let mut nodes = vec![];
        let mut h = 0;
        while h < total_hours {
            if h < hourly {
                nodes.push(node(h, false, "partlycloudy_day", 10.0 - h as f64 * 0.3));
                h += 1;
            } else {
                nodes.push(node(h, true, "rain", 5.0));
                h += 6;
            }
        }
        payload(nodes)
    }
}
