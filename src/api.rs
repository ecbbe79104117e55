//! Blocking clients for the geocoding, weather history and forecast services.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::de::DeserializeOwned;

use crate::config::HttpConfig;
use crate::error::ApiError;

/// Shared HTTP client carrying the timeout and User-Agent for every service.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new(config: &HttpConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client })
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        service: &'static str,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let response = self.client.get(url).query(query).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                service,
                status: status.as_u16(),
            });
        }
        let body = response.text()?;
        serde_json::from_str(&body).map_err(|e| ApiError::Decode {
            service,
            message: e.to_string(),
        })
    }
}

pub mod geocoding {
    use serde::{Deserialize, Deserializer, Serialize};

    use super::*;
    use crate::config::GeoNamesConfig;

    const SERVICE: &str = "geonames";

    /// Queries this short are not sent to the geocoder.
    pub const MIN_QUERY_LEN: usize = 3;

    const SRTM3_NO_DATA: i32 = -32768;

    #[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
    #[serde(rename_all = "camelCase")]
    pub struct Place {
        pub toponym_name: String,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub country_name: Option<String>,

        #[serde(deserialize_with = "coordinate")]
        pub lat: f64,

        #[serde(deserialize_with = "coordinate")]
        pub lng: f64,

        pub geoname_id: u64,

        /// Surveyed elevation in metres, only sent with `style=FULL`.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub elevation: Option<i32>,

        /// SRTM3 model elevation in metres, `-32768` over the sea.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub srtm3: Option<i32>,
    }

    impl Place {
        /// Ground height for the forecast, preferring the surveyed value.
        pub fn altitude(&self) -> Option<i32> {
            self.elevation
                .or(self.srtm3)
                .filter(|metres| *metres > SRTM3_NO_DATA)
        }

        pub fn label(&self) -> String {
            match &self.country_name {
                Some(country) if !country.is_empty() => {
                    format!("{}, {}", self.toponym_name, country)
                }
                _ => self.toponym_name.clone(),
            }
        }
    }

    /// GeoNames sends coordinates as strings.
    fn coordinate<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Coordinate {
            Number(f64),
            Text(String),
        }

        match Coordinate::deserialize(deserializer)? {
            Coordinate::Number(n) => Ok(n),
            Coordinate::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
        }
    }

    #[derive(Deserialize, Debug)]
    struct SearchResponse {
        #[serde(default)]
        geonames: Vec<Place>,

        status: Option<Status>,
    }

    #[derive(Deserialize, Debug)]
    struct Status {
        message: String,
    }

    #[derive(Debug, Clone)]
    pub struct GeoNames {
        http: HttpClient,
        config: GeoNamesConfig,
    }

    impl GeoNames {
        pub fn new(http: HttpClient, config: GeoNamesConfig) -> Self {
            Self { http, config }
        }

        /// Place suggestions for `query`, empty for queries under [`MIN_QUERY_LEN`].
        pub fn search(&self, query: &str) -> Result<Vec<Place>, ApiError> {
            let query = query.trim();
            if query.chars().count() < MIN_QUERY_LEN {
                return Ok(vec![]);
            }
            if self.config.username.is_empty() {
                return Err(ApiError::MissingCredential("geonames.username"));
            }

            let url = format!("{}/searchJSON", self.config.base_url.trim_end_matches('/'));
            let response: SearchResponse = self.http.get_json(
                SERVICE,
                &url,
                &[
                    ("q", query.to_string()),
                    ("maxRows", self.config.max_rows.to_string()),
                    ("username", self.config.username.clone()),
                    ("style", "FULL".to_string()),
                ],
            )?;
            // errors come back as 200 with a status object
            if let Some(status) = response.status {
                return Err(ApiError::Rejected {
                    service: SERVICE,
                    message: status.message,
                });
            }
            tracing::debug!("{} suggestions for {:?}", response.geonames.len(), query);
            Ok(response.geonames)
        }
    }
}

pub mod history {
    use chrono::NaiveDate;
    use serde::Deserialize;

    use super::*;
    use crate::config::WeatherbitConfig;

    const SERVICE: &str = "weatherbit";

    #[derive(Deserialize, Debug, Default, Clone)]
    pub struct History {
        pub city_name: Option<String>,

        pub timezone: Option<String>,

        #[serde(default)]
        pub data: Vec<HourlyObservation>,
    }

    #[derive(Deserialize, Debug, Default, Clone)]
    pub struct HourlyObservation {
        pub timestamp_local: Option<String>,

        pub temp: Option<f64>,

        pub precip: Option<f64>,

        pub wind_spd: Option<f64>,

        pub wind_dir: Option<f64>,

        pub pres: Option<f64>,

        pub weather: Option<Conditions>,
    }

    #[derive(Deserialize, Debug, Default, Clone)]
    pub struct Conditions {
        pub description: Option<String>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct HistorySummary {
        pub hours: usize,
        pub min_temp: Option<f64>,
        pub max_temp: Option<f64>,
        pub total_precip: f64,
        pub mean_pressure: Option<f64>,
        pub description: Option<String>,
    }

    impl History {
        pub fn summary(&self) -> HistorySummary {
            let temps: Vec<f64> = self.data.iter().filter_map(|o| o.temp).collect();
            let pressures: Vec<f64> = self.data.iter().filter_map(|o| o.pres).collect();
            let mean_pressure = if pressures.is_empty() {
                None
            } else {
                Some(pressures.iter().sum::<f64>() / pressures.len() as f64)
            };

            // most frequent description, first seen wins a tie
            let mut counts: Vec<(&str, usize)> = vec![];
            for description in self
                .data
                .iter()
                .filter_map(|o| o.weather.as_ref()?.description.as_deref())
            {
                match counts.iter_mut().find(|(d, _)| *d == description) {
                    Some((_, n)) => *n += 1,
                    None => counts.push((description, 1)),
                }
            }
            let description = counts
                .iter()
                .fold(None::<(&str, usize)>, |best, &(d, n)| match best {
                    Some((_, m)) if m >= n => best,
                    _ => Some((d, n)),
                })
                .map(|(d, _)| d.to_string());

            HistorySummary {
                hours: self.data.len(),
                min_temp: temps.iter().copied().reduce(f64::min),
                max_temp: temps.iter().copied().reduce(f64::max),
                total_precip: self.data.iter().filter_map(|o| o.precip).sum(),
                mean_pressure,
                description,
            }
        }
    }

    #[derive(Debug, Clone)]
    pub struct Weatherbit {
        http: HttpClient,
        config: WeatherbitConfig,
    }

    impl Weatherbit {
        pub fn new(http: HttpClient, config: WeatherbitConfig) -> Self {
            Self { http, config }
        }

        /// Hourly observations for the whole of `date`.
        pub fn hourly(&self, lat: f64, lon: f64, date: NaiveDate) -> Result<History, ApiError> {
            if self.config.api_key.is_empty() {
                return Err(ApiError::MissingCredential("weatherbit.api_key"));
            }
            let day = date.format("%Y-%m-%d");
            let url = format!(
                "{}/history/hourly",
                self.config.base_url.trim_end_matches('/')
            );
            self.http.get_json(
                SERVICE,
                &url,
                &[
                    ("lat", lat.to_string()),
                    ("lon", lon.to_string()),
                    ("start_date", format!("{day}:00")),
                    ("end_date", format!("{day}:24")),
                    ("key", self.config.api_key.clone()),
                ],
            )
        }
    }
}

pub mod forecast {
    use super::*;
    use crate::config::MetNoConfig;
    use crate::weather::ForecastPayload;

    const SERVICE: &str = "met.no";

    #[derive(Debug, Clone)]
    pub struct MetNo {
        http: HttpClient,
        config: MetNoConfig,
    }

    impl MetNo {
        pub fn new(http: HttpClient, config: MetNoConfig) -> Self {
            Self { http, config }
        }

        /// Point forecast. MET Norway asks for at most four decimals.
        pub fn compact(
            &self,
            lat: f64,
            lon: f64,
            altitude: Option<i32>,
        ) -> Result<ForecastPayload, ApiError> {
            let url = format!("{}/compact", self.config.base_url.trim_end_matches('/'));
            let mut query = vec![("lat", format!("{lat:.4}")), ("lon", format!("{lon:.4}"))];
            if let Some(altitude) = altitude {
                query.push(("altitude", altitude.to_string()));
            }
            self.http.get_json(SERVICE, &url, &query)
        }
    }
}
