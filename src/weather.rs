//! Forecast payload as served by MET Norway's locationforecast 2.0 and the
//! flattened per-sample view used by the series transformer.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TransformError;

#[derive(Deserialize, Debug, Default, Clone)]
pub struct ForecastPayload {
    pub properties: Option<Properties>,
}

impl ForecastPayload {
    pub fn from_json(json: &str) -> Result<Self, TransformError> {
        Ok(serde_json::from_str(json)?)
    }

    /// The timeseries nodes, or `NoData` when the payload carries none.
    pub fn timeseries(&self) -> Result<&[TimeseriesNode], TransformError> {
        self.properties
            .as_ref()
            .and_then(|p| p.timeseries.as_deref())
            .ok_or(TransformError::NoData)
    }
}

#[derive(Deserialize, Debug, Default, Clone)]
pub struct Properties {
    pub timeseries: Option<Vec<TimeseriesNode>>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct TimeseriesNode {
    pub time: DateTime<Utc>,
    pub data: NodeData,
}

#[derive(Deserialize, Debug, Clone)]
pub struct NodeData {
    pub instant: Instant,
    pub next_1_hours: Option<NextHours>,
    pub next_6_hours: Option<NextHours>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Instant {
    pub details: InstantDetails,
}

#[derive(Deserialize, Debug, Clone)]
pub struct InstantDetails {
    pub air_temperature: f64,

    pub air_pressure_at_sea_level: f64,

    pub wind_speed: f64,

    pub wind_from_direction: f64,
}

#[derive(Deserialize, Debug, Clone)]
pub struct NextHours {
    pub summary: Summary,

    #[serde(default)]
    pub details: NextHoursDetails,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Summary {
    pub symbol_code: String,
}

#[derive(Deserialize, Debug, Default, Clone)]
pub struct NextHoursDetails {
    #[serde(default)]
    pub precipitation_amount: f64,

    pub precipitation_amount_min: Option<f64>,

    pub precipitation_amount_max: Option<f64>,
}

/// Which summary block a sample's symbol and precipitation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    OneHour,
    SixHours,
}

impl Granularity {
    pub fn span(&self) -> TimeDelta {
        match self {
            Granularity::OneHour => TimeDelta::hours(1),
            Granularity::SixHours => TimeDelta::hours(6),
        }
    }
}

/// One timeseries node flattened into the values the chart needs.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastPoint {
    pub time: DateTime<Utc>,
    pub granularity: Granularity,
    pub condition_code: String,
    pub air_temperature: f64,
    pub precipitation_amount: f64,
    pub precipitation_range: Option<(f64, f64)>,
    pub wind_speed: f64,
    pub wind_direction: f64,
    pub air_pressure: f64,
}

impl ForecastPoint {
    /// Flattens a node, preferring the one hour summary over the six hour one.
    /// `index` is only used to report a node without either block.
    pub fn from_node(index: usize, node: &TimeseriesNode) -> Result<Self, TransformError> {
        let (next_hours, granularity) = match (&node.data.next_1_hours, &node.data.next_6_hours) {
            (Some(next), _) => (next, Granularity::OneHour),
            (None, Some(next)) => (next, Granularity::SixHours),
            (None, None) => {
                return Err(TransformError::MissingSummary {
                    index,
                    time: node.time,
                })
            }
        };
        let details = &node.data.instant.details;
        let range = match (
            next_hours.details.precipitation_amount_min,
            next_hours.details.precipitation_amount_max,
        ) {
            (Some(min), Some(max)) => Some((min, max)),
            _ => None,
        };

        Ok(Self {
            time: node.time,
            granularity,
            condition_code: next_hours.summary.symbol_code.clone(),
            air_temperature: details.air_temperature,
            precipitation_amount: next_hours.details.precipitation_amount,
            precipitation_range: range,
            wind_speed: details.wind_speed,
            wind_direction: details.wind_from_direction,
            air_pressure: details.air_pressure_at_sea_level,
        })
    }

    /// End of the period this sample is valid for.
    pub fn to(&self) -> DateTime<Utc> {
        self.time + self.granularity.span()
    }
}

/// A chart sample, `to` marks the end of its validity window.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint<T> {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub x: DateTime<Utc>,

    pub y: T,

    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub to: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol_name: Option<String>,
}

/// Precipitation uncertainty, drawn as a hatched column up to `maxvalue`.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct RangePoint {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub x: DateTime<Utc>,

    pub y: f64,

    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub to: DateTime<Utc>,

    pub minvalue: f64,

    pub maxvalue: f64,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct WindSample {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub x: DateTime<Utc>,

    pub value: f64,

    pub direction: f64,
}

/// Parallel chart series built from one forecast payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForecastSeries {
    pub symbols: Vec<String>,
    pub temperatures: Vec<SeriesPoint<f64>>,
    pub precipitations: Vec<SeriesPoint<f64>>,
    pub precipitations_error: Vec<RangePoint>,
    pub winds: Vec<WindSample>,
    pub pressures: Vec<SeriesPoint<f64>>,
}

impl ForecastSeries {
    pub fn is_empty(&self) -> bool {
        self.temperatures.is_empty()
    }

    pub fn len(&self) -> usize {
        self.temperatures.len()
    }

    /// First sample time and last sample time.
    pub fn time_range(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        match (self.temperatures.first(), self.temperatures.last()) {
            (Some(first), Some(last)) => Some((first.x, last.x)),
            _ => None,
        }
    }
}
