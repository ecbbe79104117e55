use std::fs::{self, File};
use std::io;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Mutex;

use chrono::Local;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use umbrella::app::{run_app, App};
use umbrella::cli::Args;
use umbrella::config::{self, Config, Paths};
use umbrella::fetch::{Fetcher, Services};
use umbrella::report::{chart_options, write_charts};
use umbrella::Error;

/// The terminal belongs to the UI, so logs go to a file.
fn init_logging(path: &Path) -> Result<(), Error> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = File::options().create(true).append(true).open(path)?;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .init();
    Ok(())
}

fn interactive(args: &Args, config: &Config, services: Services, dir: &Path) -> io::Result<()> {
    let date = args.date.unwrap_or_else(|| Local::now().date_naive());
    let app = App::new(
        Fetcher::spawn(services),
        dir.to_path_buf(),
        chart_options(config, None),
        date,
    );
    let mut app = match (&args.location, config::load_location(dir)) {
        (Some(query), _) => app.with_query(query),
        (None, Some(place)) => app.with_place(place),
        (None, None) => app,
    };

    // setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    // restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res
}

fn run(args: Args) -> Result<(), Error> {
    let paths = Paths::resolve(args.config.clone(), args.log_file.clone())?;
    init_logging(&paths.log)?;

    let config = Config::load(&paths.config)?;
    let services = Services::new(&config)?;

    if args.headless() {
        let written = write_charts(&args, &config, &services, &paths.state)?;
        for path in &written.files {
            println!("Wrote chart for {} to {}", written.place.label(), path.display());
        }
        Ok(())
    } else {
        interactive(&args, &config, services, &paths.state).map_err(Error::from)
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
