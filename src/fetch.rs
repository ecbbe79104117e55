//! Background fetching for the UI.
//!
//! Requests run one at a time on a worker thread. Every request gets an id
//! from a per-kind [`RequestTracker`]; only the response to the most recent
//! request of a kind is handed back, older ones are dropped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use chrono::NaiveDate;

use crate::api::forecast::MetNo;
use crate::api::geocoding::{GeoNames, Place};
use crate::api::history::{History, Weatherbit};
use crate::api::HttpClient;
use crate::config::Config;
use crate::error::ApiError;
use crate::weather::ForecastPayload;

/// Hands out increasing ids and remembers the newest one.
#[derive(Debug, Clone, Default)]
pub struct RequestTracker {
    latest: Arc<AtomicU64>,
}

impl RequestTracker {
    pub fn next(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn is_latest(&self, id: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == id
    }
}

/// The combined selection that drives a weather fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherInput {
    pub place: Place,
    pub date: NaiveDate,
}

/// The remote calls the UI needs.
pub trait WeatherServices: Send + 'static {
    fn search(&self, query: &str) -> Result<Vec<Place>, ApiError>;

    fn forecast(&self, place: &Place) -> Result<ForecastPayload, ApiError>;

    fn history(&self, place: &Place, date: NaiveDate) -> Result<History, ApiError>;
}

pub struct Services {
    pub geonames: GeoNames,
    pub weatherbit: Weatherbit,
    pub metno: MetNo,
}

impl Services {
    /// All three clients over one shared HTTP client.
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let http = HttpClient::new(&config.http)?;
        Ok(Self {
            geonames: GeoNames::new(http.clone(), config.geonames.clone()),
            weatherbit: Weatherbit::new(http.clone(), config.weatherbit.clone()),
            metno: MetNo::new(http, config.metno.clone()),
        })
    }
}

impl WeatherServices for Services {
    fn search(&self, query: &str) -> Result<Vec<Place>, ApiError> {
        self.geonames.search(query)
    }

    fn forecast(&self, place: &Place) -> Result<ForecastPayload, ApiError> {
        self.metno.compact(place.lat, place.lng, place.altitude())
    }

    fn history(&self, place: &Place, date: NaiveDate) -> Result<History, ApiError> {
        self.weatherbit.hourly(place.lat, place.lng, date)
    }
}

#[derive(Debug)]
enum Request {
    Suggest { id: u64, query: String },
    Weather { id: u64, input: WeatherInput },
}

#[derive(Debug)]
pub enum Response {
    Suggestions {
        id: u64,
        places: Result<Vec<Place>, ApiError>,
    },
    Weather {
        id: u64,
        input: WeatherInput,
        forecast: Result<ForecastPayload, ApiError>,
        history: Result<History, ApiError>,
    },
}

pub struct Fetcher {
    requests: Sender<Request>,
    responses: Receiver<Response>,
    suggestions: RequestTracker,
    weather: RequestTracker,
}

impl Fetcher {
    pub fn spawn<S: WeatherServices>(services: S) -> Self {
        let (request_tx, request_rx) = mpsc::channel();
        let (response_tx, response_rx) = mpsc::channel();
        let suggestions = RequestTracker::default();
        let weather = RequestTracker::default();

        let worker_suggestions = suggestions.clone();
        let worker_weather = weather.clone();
        thread::spawn(move || {
            worker(
                services,
                request_rx,
                response_tx,
                worker_suggestions,
                worker_weather,
            )
        });

        Self {
            requests: request_tx,
            responses: response_rx,
            suggestions,
            weather,
        }
    }

    pub fn suggest(&self, query: &str) -> u64 {
        let id = self.suggestions.next();
        self.send(Request::Suggest {
            id,
            query: query.to_string(),
        });
        id
    }

    pub fn weather(&self, input: WeatherInput) -> u64 {
        let id = self.weather.next();
        self.send(Request::Weather { id, input });
        id
    }

    fn send(&self, request: Request) {
        if self.requests.send(request).is_err() {
            tracing::error!("fetch worker is gone");
        }
    }

    fn is_current(&self, response: &Response) -> bool {
        match response {
            Response::Suggestions { id, .. } => self.suggestions.is_latest(*id),
            Response::Weather { id, .. } => self.weather.is_latest(*id),
        }
    }

    /// Responses that arrived since the last call, without blocking.
    pub fn poll(&self) -> Vec<Response> {
        self.responses
            .try_iter()
            .filter(|response| {
                let current = self.is_current(response);
                if !current {
                    tracing::debug!("dropping stale response {:?}", response_id(response));
                }
                current
            })
            .collect()
    }

    /// Waits up to `timeout` for the next current response.
    pub fn wait(&self, timeout: Duration) -> Option<Response> {
        let deadline = std::time::Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(std::time::Instant::now());
            match self.responses.recv_timeout(remaining) {
                Ok(response) if self.is_current(&response) => return Some(response),
                Ok(response) => {
                    tracing::debug!("dropping stale response {:?}", response_id(&response))
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                    return None
                }
            }
        }
    }
}

fn response_id(response: &Response) -> u64 {
    match response {
        Response::Suggestions { id, .. } | Response::Weather { id, .. } => *id,
    }
}

fn log_failure<T>(what: &str, result: &Result<T, ApiError>) {
    if let Err(e) = result {
        tracing::warn!("{} failed: {}", what, e);
    }
}

fn worker<S: WeatherServices>(
    services: S,
    requests: Receiver<Request>,
    responses: Sender<Response>,
    suggestions: RequestTracker,
    weather: RequestTracker,
) {
    for request in requests {
        let response = match request {
            Request::Suggest { id, .. } if !suggestions.is_latest(id) => continue,
            Request::Weather { id, .. } if !weather.is_latest(id) => continue,
            Request::Suggest { id, query } => {
                let places = services.search(&query);
                log_failure("location search", &places);
                Response::Suggestions { id, places }
            }
            Request::Weather { id, input } => {
                tracing::info!(
                    "fetching weather for {} on {}",
                    input.place.label(),
                    input.date
                );
                let forecast = services.forecast(&input.place);
                log_failure("forecast", &forecast);
                let history = services.history(&input.place, input.date);
                log_failure("weather history", &history);
                Response::Weather {
                    id,
                    input,
                    forecast,
                    history,
                }
            }
        };
        if responses.send(response).is_err() {
            break;
        }
    }
    tracing::debug!("fetch worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Fake {
        delay: Duration,
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl WeatherServices for Fake {
        fn search(&self, query: &str) -> Result<Vec<Place>, ApiError> {
            thread::sleep(self.delay);
            self.calls.lock().unwrap().push(query.to_string());
            if query == "fail" {
                return Err(ApiError::Timeout);
            }
            Ok(vec![place(query)])
        }

        fn forecast(&self, _place: &Place) -> Result<ForecastPayload, ApiError> {
            Ok(ForecastPayload::default())
        }

        fn history(&self, _place: &Place, _date: NaiveDate) -> Result<History, ApiError> {
            Err(ApiError::MissingCredential("weatherbit.api_key"))
        }
    }

    fn place(name: &str) -> Place {
        Place {
            toponym_name: name.to_string(),
            country_name: None,
            lat: 1.0,
            lng: 2.0,
            geoname_id: 1,
            elevation: None,
            srtm3: None,
        }
    }

    fn fake(delay_ms: u64) -> (Fake, Arc<Mutex<Vec<String>>>) {
        let calls = Arc::new(Mutex::new(vec![]));
        (
            Fake {
                delay: Duration::from_millis(delay_ms),
                calls: calls.clone(),
            },
            calls,
        )
    }

    #[test]
    fn test_tracker() {
        let tracker = RequestTracker::default();
        let a = tracker.next();
        let b = tracker.next();
        assert!(b > a);
        assert!(!tracker.is_latest(a));
        assert!(tracker.is_latest(b));
    }

    #[test]
    fn test_only_latest_suggestion_is_delivered() {
        let (services, _) = fake(20);
        let fetcher = Fetcher::spawn(services);
        fetcher.suggest("lon");
        fetcher.suggest("lond");
        let last = fetcher.suggest("london");

        match fetcher.wait(Duration::from_secs(5)) {
            Some(Response::Suggestions { id, places }) => {
                assert_eq!(id, last);
                assert_eq!(places.unwrap()[0].toponym_name, "london");
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(fetcher.wait(Duration::from_millis(100)).is_none());
    }

    #[test]
    fn test_superseded_response_is_dropped() {
        let (services, calls) = fake(50);
        let fetcher = Fetcher::spawn(services);
        fetcher.suggest("paris");
        // let the worker pick up the first request before superseding it
        thread::sleep(Duration::from_millis(10));
        let last = fetcher.suggest("berlin");

        let response = fetcher.wait(Duration::from_secs(5));
        assert!(matches!(response, Some(Response::Suggestions { id, .. }) if id == last));
        assert!(calls.lock().unwrap().contains(&"berlin".to_string()));
    }

    #[test]
    fn test_weather_and_failures() {
        let (services, _) = fake(0);
        let fetcher = Fetcher::spawn(services);
        let input = WeatherInput {
            place: place("Oslo"),
            date: NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
        };
        let id = fetcher.weather(input.clone());

        match fetcher.wait(Duration::from_secs(5)) {
            Some(Response::Weather {
                id: got,
                input: got_input,
                forecast,
                history,
            }) => {
                assert_eq!(got, id);
                assert_eq!(got_input, input);
                assert!(forecast.is_ok());
                assert!(matches!(history, Err(ApiError::MissingCredential(_))));
            }
            other => panic!("unexpected {:?}", other),
        }

        fetcher.suggest("fail");
        assert!(matches!(
            fetcher.wait(Duration::from_secs(5)),
            Some(Response::Suggestions { places: Err(ApiError::Timeout), .. })
        ));
    }
}
