use std::path::PathBuf;

use chrono::NaiveDate;
use clap::builder::{styling::AnsiColor, Styles};
use clap::Parser;

const ABOUT: &str = "Weather forecast charts in the terminal";

const LONG_ABOUT: &str = "
Look up a place, pick a date and get a 48 hour forecast chart with weather symbols, precipitation,
air pressure and wind, plus the observed weather for the chosen date.

Forecasts come from MET Norway, place search from GeoNames and observations from Weatherbit. The
GeoNames username and Weatherbit key are read from the config file or from the
UMBRELLA_GEONAMES_USERNAME and UMBRELLA_WEATHERBIT_KEY environment variables.

The selected location is saved, so subsequent runs of `umbrella` will use the last location unless
otherwise specified.
";

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default())
    .usage(AnsiColor::Green.on_default())
    .literal(AnsiColor::Green.on_default())
    .placeholder(AnsiColor::Green.on_default());

#[derive(Parser, Debug)]
#[command(version, styles=STYLES, about=ABOUT, long_about = LONG_ABOUT)]
pub struct Args {
    #[arg(help = "Place to look up (e.g. London, Tromsø, etc.)")]
    pub location: Option<String>,

    #[arg(
        short,
        long,
        conflicts_with_all = ["svg", "spec"],
        help = "Date for observed weather, YYYY-MM-DD (default: today)"
    )]
    pub date: Option<NaiveDate>,

    #[arg(short, long, help = "Configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, value_name = "FILE", help = "Write the annotated chart as SVG and exit")]
    pub svg: Option<PathBuf>,

    #[arg(long, value_name = "FILE", help = "Write the chart description as JSON and exit")]
    pub spec: Option<PathBuf>,

    #[arg(long, value_name = "FILE", help = "Log file (default: umbrella.log in the config directory)")]
    pub log_file: Option<PathBuf>,
}

impl Args {
    pub fn headless(&self) -> bool {
        self.svg.is_some() || self.spec.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let args = Args::parse_from(["umbrella", "London", "--date", "2026-10-19"]);
        assert_eq!(args.location.as_deref(), Some("London"));
        assert_eq!(args.date, NaiveDate::from_ymd_opt(2026, 10, 19));
        assert!(!args.headless());

        let args = Args::parse_from(["umbrella", "London", "--svg", "out.svg"]);
        assert!(args.headless());
        assert!(args.date.is_none());
    }

    #[test]
    fn test_date_only_for_the_terminal_ui() {
        // headless output is always the current forecast
        let res = Args::try_parse_from(["umbrella", "Oslo", "--date", "2026-10-19", "--svg", "out.svg"]);
        assert_eq!(res.unwrap_err().kind(), clap::error::ErrorKind::ArgumentConflict);
        assert!(Args::try_parse_from(["umbrella", "-d", "2026-10-19", "--spec", "out.json"]).is_err());
    }

    #[test]
    fn test_bad_date() {
        assert!(Args::try_parse_from(["umbrella", "--date", "19/10/2026"]).is_err());
    }

    #[test]
    fn test_verify() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
