//! Headless mode: chart files written straight from the command line.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::api::geocoding::Place;
use crate::chart::{self, svg::render_chart, ChartOptions};
use crate::cli::Args;
use crate::config::{self, Config};
use crate::error::Error;
use crate::fetch::Services;
use crate::series::transform;

/// Chart options from the `[chart]` section, titled with the place.
pub fn chart_options(config: &Config, place: Option<&Place>) -> ChartOptions {
    ChartOptions {
        title: place.map(Place::label),
        width: config.chart.width,
        height: config.chart.height,
    }
}

#[derive(Debug)]
pub struct Written {
    pub place: Place,
    pub files: Vec<PathBuf>,
}

/// The place named on the command line, saved for later runs, or the saved one.
fn locate(args: &Args, services: &Services, state: &Path) -> Result<Place, Error> {
    match &args.location {
        Some(query) => {
            let place = services
                .geonames
                .search(query)?
                .into_iter()
                .next()
                .ok_or_else(|| Error::LocationNotFound(query.clone()))?;
            config::save_location(state, &place)?;
            Ok(place)
        }
        None => config::load_location(state)
            .ok_or_else(|| Error::LocationNotFound("(no saved location)".to_string())),
    }
}

/// Fetches the current forecast and writes the files asked for by `--spec`
/// and `--svg`.
pub fn write_charts(
    args: &Args,
    config: &Config,
    services: &Services,
    state: &Path,
) -> Result<Written, Error> {
    let place = locate(args, services, state)?;
    tracing::info!("charting {}", place.label());

    let payload = services
        .metno
        .compact(place.lat, place.lng, place.altitude())?;
    let series = transform(&payload)?;
    let (spec, layout) = chart::prepare(&series, &chart_options(config, Some(&place)));

    let mut files = vec![];
    if let Some(path) = &args.spec {
        let json = serde_json::to_string_pretty(&spec).map_err(io::Error::from)?;
        fs::write(path, json)?;
        files.push(path.clone());
    }
    if let Some(path) = &args.svg {
        fs::write(path, render_chart(&spec, &layout, &series)?)?;
        files.push(path.clone());
    }
    Ok(Written { place, files })
}
