use std::io;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Local, NaiveDate, Utc};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::canvas::{Canvas, Context, Line as CanvasLine, Rectangle},
    widgets::{Block, BorderType, Borders, Cell, List, ListItem, Paragraph, Row, Table},
    Frame, Terminal,
};

use crate::api::geocoding::{Place, MIN_QUERY_LEN};
use crate::api::history::HistorySummary;
use crate::chart::annotate::{annotate, PathSegment, Renderer, Stroke, SymbolIcon};
use crate::chart::spec::{ChartOptions, WINDBARBS_ID};
use crate::chart::{prepare, ChartLayout};
use crate::config;
use crate::error::{Error, RenderError};
use crate::fetch::{Fetcher, Response, WeatherInput};
use crate::series::transform;
use crate::units::{direction, speed};
use crate::weather::ForecastSeries;

const MISSING: &str = "--";
const TICK: Duration = Duration::from_millis(100);
const LOADING: &str = "Loading data from external source";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Location,
    Date,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

pub struct ForecastView {
    pub series: ForecastSeries,
    pub layout: ChartLayout,
}

pub enum View {
    Idle,
    Loading,
    Failed(String),
    Ready(Box<ForecastView>),
}

pub struct App {
    fetcher: Fetcher,
    config_dir: PathBuf,
    chart_options: ChartOptions,
    pub focus: Focus,
    pub location_input: String,
    pub date_input: String,
    pub suggestions: Vec<Place>,
    pub highlighted: usize,
    /// The place picked last, kept while the date is being fixed.
    pub selected: Option<Place>,
    /// The selection weather was last requested for.
    pub input: Option<WeatherInput>,
    pub view: View,
    pub history: Option<HistorySummary>,
    pub status: Option<String>,
}

impl App {
    pub fn new(
        fetcher: Fetcher,
        config_dir: PathBuf,
        chart_options: ChartOptions,
        date: NaiveDate,
    ) -> Self {
        Self {
            fetcher,
            config_dir,
            chart_options,
            focus: Focus::Location,
            location_input: String::new(),
            date_input: date.format("%Y-%m-%d").to_string(),
            suggestions: vec![],
            highlighted: 0,
            selected: None,
            input: None,
            view: View::Idle,
            history: None,
            status: None,
        }
    }

    /// Pre-fills the location box and asks for suggestions.
    pub fn with_query(mut self, query: &str) -> Self {
        self.location_input = query.to_string();
        self.query_changed();
        self
    }

    /// Starts with a known place and fetches its weather right away.
    pub fn with_place(mut self, place: Place) -> Self {
        self.location_input = place.toponym_name.clone();
        self.select(place, false);
        self
    }

    fn date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.date_input.trim(), "%Y-%m-%d").ok()
    }

    fn query_changed(&mut self) {
        if self.location_input.trim().chars().count() >= MIN_QUERY_LEN {
            self.fetcher.suggest(&self.location_input);
        } else {
            // drop any reply still on its way
            self.fetcher.suggest("");
            self.suggestions.clear();
        }
        self.highlighted = 0;
    }

    fn select(&mut self, place: Place, remember: bool) {
        if remember {
            if let Err(e) = config::save_location(&self.config_dir, &place) {
                tracing::warn!("could not remember location: {}", e);
            }
        }
        self.location_input = place.toponym_name.clone();
        self.suggestions.clear();
        self.highlighted = 0;
        self.selected = Some(place);
        self.selection_changed();
    }

    /// Requests weather once both a place and a valid date are set, unless
    /// that pair was already requested.
    fn selection_changed(&mut self) {
        let Some(date) = self.date() else {
            self.status = Some(format!("\"{}\" is not a YYYY-MM-DD date", self.date_input));
            return;
        };
        let Some(place) = self.selected.clone() else {
            self.status = Some("Pick a location".to_string());
            return;
        };
        let input = WeatherInput { place, date };
        if self.input.as_ref() == Some(&input) {
            return;
        }
        self.fetcher.weather(input.clone());
        self.input = Some(input);
        self.view = View::Loading;
        self.status = None;
    }

    pub fn on_key(&mut self, key: KeyEvent) -> Control {
        if key.kind != KeyEventKind::Press {
            return Control::Continue;
        }
        match key.code {
            KeyCode::Esc => return Control::Quit,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return Control::Quit
            }
            KeyCode::Tab | KeyCode::BackTab => {
                self.focus = match self.focus {
                    Focus::Location => Focus::Date,
                    Focus::Date => Focus::Location,
                };
            }
            KeyCode::Up => self.highlighted = self.highlighted.saturating_sub(1),
            KeyCode::Down => {
                if self.highlighted + 1 < self.suggestions.len() {
                    self.highlighted += 1;
                }
            }
            KeyCode::Enter => match self.focus {
                Focus::Location => {
                    if let Some(place) = self.suggestions.get(self.highlighted).cloned() {
                        self.select(place, true);
                    }
                }
                Focus::Date => self.selection_changed(),
            },
            KeyCode::Backspace => match self.focus {
                Focus::Location => {
                    self.location_input.pop();
                    self.query_changed();
                }
                Focus::Date => {
                    self.date_input.pop();
                }
            },
            KeyCode::Char(c) => match self.focus {
                Focus::Location => {
                    self.location_input.push(c);
                    self.query_changed();
                }
                Focus::Date => self.date_input.push(c),
            },
            _ => {}
        }
        Control::Continue
    }

    pub fn on_tick(&mut self) {
        for response in self.fetcher.poll() {
            self.apply(response);
        }
    }

    pub(crate) fn apply(&mut self, response: Response) {
        match response {
            Response::Suggestions { places, .. } => {
                // failures were logged by the worker
                self.suggestions = places.unwrap_or_default();
                self.highlighted = 0;
            }
            Response::Weather {
                input,
                forecast,
                history,
                ..
            } => {
                self.history = history.ok().map(|h| h.summary());
                let options = ChartOptions {
                    title: Some(input.place.label()),
                    ..self.chart_options.clone()
                };
                let series = forecast
                    .map_err(Error::from)
                    .and_then(|payload| transform(&payload).map_err(Error::from));
                self.view = match series {
                    Ok(series) => {
                        let (_, layout) = prepare(&series, &options);
                        View::Ready(Box::new(ForecastView { series, layout }))
                    }
                    Err(e) => {
                        tracing::warn!("no chart for {}: {}", input.place.label(), e);
                        View::Failed(e.user_message().to_string())
                    }
                };
            }
        }
    }
}

pub fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if event::poll(TICK)? {
            if let Event::Key(key) = event::read()? {
                if app.on_key(key) == Control::Quit {
                    return Ok(());
                }
            }
        }
        app.on_tick();
    }
}

/// Renderer drawing into a ratatui canvas whose bounds are the chart's pixel size.
struct TerminalCanvas<'a, 'b> {
    ctx: &'a mut Context<'b>,
    height: f64,
    winds: Vec<(f64, f64, &'static str)>,
    wind_dx: f64,
}

impl<'a, 'b> TerminalCanvas<'a, 'b> {
    fn new(ctx: &'a mut Context<'b>, height: f64) -> Self {
        Self {
            ctx,
            height,
            winds: vec![],
            wind_dx: 0.0,
        }
    }

    /// Canvas y grows upwards, chart pixels grow downwards.
    fn flip(&self, y: f64) -> f64 {
        self.height - y
    }

    fn line(&mut self, (x1, y1): (f64, f64), (x2, y2): (f64, f64), color: Color) {
        let (y1, y2) = (self.flip(y1), self.flip(y2));
        self.ctx.draw(&CanvasLine {
            x1,
            y1,
            x2,
            y2,
            color,
        });
    }

    fn draw_series(&mut self, view: &ForecastView) {
        let layout = &view.layout;
        let series = &view.series;

        for p in series.precipitations.iter().filter(|p| p.y > 0.0) {
            let x0 = layout.time_to_pixels(p.x);
            let x1 = layout
                .time_to_pixels(p.to)
                .min(layout.plot_left + layout.plot_width);
            let top = layout.precipitation_axis.to_pixels(p.y);
            let bottom = layout.plot_bottom();
            self.ctx.draw(&Rectangle {
                x: x0,
                y: self.flip(bottom),
                width: (x1 - x0).max(1.0),
                height: bottom - top,
                color: Color::Cyan,
            });
        }

        for pair in series.pressures.windows(2) {
            let a = layout.plot_point(pair[0].x, &layout.pressure_axis, pair[0].y);
            let b = layout.plot_point(pair[1].x, &layout.pressure_axis, pair[1].y);
            self.line(
                (a.plot_x + layout.plot_left, a.plot_y + layout.plot_top),
                (b.plot_x + layout.plot_left, b.plot_y + layout.plot_top),
                Color::Green,
            );
        }

        for pair in series.temperatures.windows(2) {
            let a = layout.plot_point(pair[0].x, &layout.temperature_axis, pair[0].y);
            let b = layout.plot_point(pair[1].x, &layout.temperature_axis, pair[1].y);
            let color = if (pair[0].y + pair[1].y) / 2.0 < 0.0 {
                Color::LightBlue
            } else {
                Color::LightRed
            };
            self.line(
                (a.plot_x + layout.plot_left, a.plot_y + layout.plot_top),
                (b.plot_x + layout.plot_left, b.plot_y + layout.plot_top),
                color,
            );
        }

        let row = layout.plot_bottom() + 16.0;
        for w in &series.winds {
            self.winds.push((
                layout.time_to_pixels(w.x),
                row,
                direction::degree_to_arrow(w.direction),
            ));
        }
    }

    /// Prints the wind arrows once any group translation is known.
    fn finish(mut self) {
        for (x, y, arrow) in std::mem::take(&mut self.winds) {
            let y = self.flip(y);
            self.ctx.print(
                x + self.wind_dx,
                y,
                Span::styled(arrow, Style::default().fg(Color::Gray)),
            );
        }
    }
}

impl Renderer for TerminalCanvas<'_, '_> {
    fn image(
        &mut self,
        icon: &SymbolIcon,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Result<(), RenderError> {
        if !x.is_finite() || !y.is_finite() {
            return Err(RenderError::Image(icon.id.clone()));
        }
        let y = self.flip(y + height / 2.0);
        self.ctx.print(
            x + width / 2.0,
            y,
            Span::styled(icon.glyph, Style::default().fg(Color::Yellow)),
        );
        Ok(())
    }

    /// Strokes are all drawn in one muted color, terminals have few to spare.
    fn path(&mut self, segments: &[PathSegment], _stroke: &Stroke) -> Result<(), RenderError> {
        let color = Color::DarkGray;
        let mut start = None;
        let mut current = None;
        for segment in segments {
            match *segment {
                PathSegment::MoveTo(x, y) | PathSegment::LineTo(x, y)
                    if !x.is_finite() || !y.is_finite() =>
                {
                    return Err(RenderError::Path(format!("non-finite point {x},{y}")))
                }
                PathSegment::MoveTo(x, y) => {
                    start = Some((x, y));
                    current = Some((x, y));
                }
                PathSegment::LineTo(x, y) => {
                    if let Some(from) = current {
                        self.line(from, (x, y), color);
                    }
                    current = Some((x, y));
                }
                PathSegment::Close => {
                    if let (Some(from), Some(to)) = (current, start) {
                        self.line(from, to, color);
                    }
                    current = start;
                }
            }
        }
        Ok(())
    }

    fn translate_group(&mut self, group: &str, dx: f64) -> Result<(), RenderError> {
        if group != WINDBARBS_ID {
            return Err(RenderError::UnknownGroup(group.to_string()));
        }
        self.wind_dx += dx;
        Ok(())
    }
}

fn bordered<'a>(title: &'a str) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(title, Style::default().fg(Color::Yellow)))
        .title_alignment(Alignment::Left)
        .border_style(Style::default().fg(Color::Cyan))
        .border_type(BorderType::Rounded)
}

fn display_inputs(app: &App) -> Paragraph<'_> {
    let field = |label: &'static str, value: &str, focused: bool| {
        let style = if focused {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Green)
        };
        let cursor = if focused { "_" } else { "" };
        Line::from(vec![
            Span::raw(format!(" {label:10}")),
            Span::styled(format!("{value}{cursor}"), style),
        ])
    };
    Paragraph::new(vec![
        field("Location", &app.location_input, app.focus == Focus::Location),
        field("Date", &app.date_input, app.focus == Focus::Date),
    ])
    .block(bordered(" Umbrella "))
}

fn display_suggestions(app: &App) -> List<'_> {
    let items: Vec<ListItem> = app
        .suggestions
        .iter()
        .enumerate()
        .map(|(i, place)| {
            let style = if i == app.highlighted {
                Style::default().fg(Color::Black).bg(Color::Cyan)
            } else {
                Style::default()
            };
            ListItem::new(Line::from(Span::styled(format!(" {}", place.label()), style)))
        })
        .collect();
    List::new(items).block(bordered(" Suggestions "))
}

fn local_time(time: DateTime<Utc>) -> String {
    DateTime::<Local>::from(time).format("%a %H:%M").to_string()
}

fn display_hourly(view: &ForecastView) -> Table<'_> {
    let series = &view.series;
    let rows: Vec<Row> = series
        .temperatures
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let text = t.symbol_name.clone().unwrap_or_else(|| MISSING.to_string());
            let precip = series
                .precipitations
                .get(i)
                .map(|p| format!("{:.1} mm", p.y))
                .unwrap_or_else(|| MISSING.to_string());
            let wind = series
                .winds
                .iter()
                .find(|w| w.x == t.x)
                .map(|w| {
                    format!(
                        "{} {:.0} km/h {}",
                        direction::degree_to_arrow(w.direction),
                        speed::ms2kph(w.value),
                        direction::degree_to_compass(w.direction)
                    )
                })
                .unwrap_or_default();
            let temp_style = if t.y < 0.0 {
                Style::default().fg(Color::LightBlue)
            } else {
                Style::default().fg(Color::LightRed)
            };
            Row::new(vec![
                Cell::from(format!(" {}", local_time(t.x))),
                Cell::from(format!("{:.1}°C", t.y)).style(temp_style),
                Cell::from(precip).style(Style::default().fg(Color::Cyan)),
                Cell::from(wind),
                Cell::from(text).style(Style::default().fg(Color::Green)),
            ])
        })
        .collect();

    Table::new(
        rows,
        [
            Constraint::Length(11),
            Constraint::Length(8),
            Constraint::Length(8),
            Constraint::Length(16),
            Constraint::Min(10),
        ],
    )
    .block(bordered(" Forecast "))
}

fn display_history(summary: Option<&HistorySummary>) -> Table<'static> {
    let fmt = |value: Option<f64>, unit: &str| match value {
        Some(v) => format!("{v:.1} {unit}"),
        None => MISSING.to_string(),
    };
    let row = |label: &'static str, value: String| {
        Row::new(vec![
            Cell::from(format!(" {label}")),
            Cell::from(value).style(Style::default().fg(Color::Green)),
        ])
    };

    let rows = match summary {
        Some(s) if s.hours > 0 => vec![
            row("Low", fmt(s.min_temp, "C")),
            row("High", fmt(s.max_temp, "C")),
            row("Precip", format!("{:.1} mm", s.total_precip)),
            row("Pressure", fmt(s.mean_pressure, "hPa")),
            row(
                "Conditions",
                s.description.clone().unwrap_or_else(|| MISSING.to_string()),
            ),
        ],
        _ => vec![row("", MISSING.to_string())],
    };
    Table::new(rows, [Constraint::Length(12), Constraint::Min(10)]).block(bordered(" Observed "))
}

fn display_chart(view: &ForecastView) -> Canvas<'_, impl Fn(&mut Context) + '_> {
    let layout = &view.layout;
    Canvas::default()
        .block(bordered(" 48 hours "))
        .marker(Marker::Braille)
        .x_bounds([0.0, layout.width])
        .y_bounds([0.0, layout.height])
        .paint(move |ctx| {
            let mut canvas = TerminalCanvas::new(ctx, layout.height);
            canvas.draw_series(view);
            annotate(&mut canvas, layout, &view.series);
            canvas.finish();
        })
}

fn display_message(text: &str, color: Color) -> Paragraph<'_> {
    Paragraph::new(Line::from(Span::styled(text, Style::default().fg(color))))
        .alignment(Alignment::Center)
        .block(bordered(" 48 hours "))
}

pub fn ui(f: &mut Frame, app: &App) {
    let vert_layout = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(12),
            Constraint::Length(10),
            Constraint::Length(1),
        ])
        .split(f.area());

    f.render_widget(display_inputs(app), vert_layout[0]);

    match &app.view {
        View::Ready(view) => f.render_widget(display_chart(view), vert_layout[1]),
        View::Loading => f.render_widget(display_message(LOADING, Color::Gray), vert_layout[1]),
        View::Failed(message) => {
            f.render_widget(display_message(message, Color::Red), vert_layout[1])
        }
        View::Idle => f.render_widget(
            display_message("Type a location and press Enter", Color::Gray),
            vert_layout[1],
        ),
    }

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(vert_layout[2]);
    match &app.view {
        View::Ready(view) => f.render_widget(display_hourly(view), chunks[0]),
        _ => f.render_widget(bordered(" Forecast "), chunks[0]),
    }
    f.render_widget(display_history(app.history.as_ref()), chunks[1]);

    let status = app.status.as_deref().unwrap_or(
        "Tab: switch field  Up/Down: pick suggestion  Enter: select  Esc: quit",
    );
    f.render_widget(
        Paragraph::new(Span::styled(status, Style::default().fg(Color::DarkGray))),
        vert_layout[3],
    );

    // the suggestion list floats over the chart, below the inputs
    if !app.suggestions.is_empty() && app.focus == Focus::Location {
        let area = vert_layout[1];
        let height = (app.suggestions.len() as u16 + 2).min(area.height);
        let popup = Rect {
            x: area.x + 11,
            y: area.y,
            width: area.width.saturating_sub(11).min(50),
            height,
        };
        f.render_widget(ratatui::widgets::Clear, popup);
        f.render_widget(display_suggestions(app), popup);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::history::History;
    use crate::error::ApiError;
    use crate::fetch::WeatherServices;
    use crate::series::testing::met_like_payload;
    use crate::weather::ForecastPayload;
    use ratatui::backend::TestBackend;

    struct Offline;

    impl WeatherServices for Offline {
        fn search(&self, _query: &str) -> Result<Vec<Place>, ApiError> {
            Ok(vec![])
        }

        fn forecast(&self, _place: &Place) -> Result<ForecastPayload, ApiError> {
            Err(ApiError::Timeout)
        }

        fn history(&self, _place: &Place, _date: NaiveDate) -> Result<History, ApiError> {
            Ok(History::default())
        }
    }

    fn app(dir: &tempfile::TempDir) -> App {
        App::new(
            Fetcher::spawn(Offline),
            dir.path().to_path_buf(),
            ChartOptions::default(),
            NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
        )
    }

    fn oslo() -> Place {
        Place {
            toponym_name: "Oslo".to_string(),
            country_name: Some("Norway".to_string()),
            lat: 59.91,
            lng: 10.75,
            geoname_id: 3143244,
            elevation: None,
            srtm3: Some(26),
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn weather_response(app: &App, forecast: Result<ForecastPayload, ApiError>) -> Response {
        Response::Weather {
            id: 0,
            input: app.input.clone().unwrap(),
            forecast,
            history: Ok(History::default()),
        }
    }

    #[test]
    fn test_typing_and_selecting() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir);
        for c in "Osl".chars() {
            assert_eq!(app.on_key(key(KeyCode::Char(c))), Control::Continue);
        }
        assert_eq!(app.location_input, "Osl");

        app.apply(Response::Suggestions {
            id: 0,
            places: Ok(vec![oslo(), oslo()]),
        });
        app.on_key(key(KeyCode::Down));
        app.on_key(key(KeyCode::Down));
        assert_eq!(app.highlighted, 1);

        app.on_key(key(KeyCode::Enter));
        assert!(app.suggestions.is_empty());
        assert_eq!(app.location_input, "Oslo");
        assert!(matches!(app.view, View::Loading));
        assert_eq!(
            app.input.as_ref().map(|i| i.date),
            NaiveDate::from_ymd_opt(2026, 10, 19)
        );
        assert_eq!(config::load_location(dir.path()), Some(oslo()));
    }

    #[test]
    fn test_failed_suggestions_are_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir);
        app.apply(Response::Suggestions {
            id: 0,
            places: Err(ApiError::Timeout),
        });
        assert!(app.suggestions.is_empty());
    }

    #[test]
    fn test_date_change_refetches() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir).with_place(oslo());
        app.on_key(key(KeyCode::Tab));
        assert_eq!(app.focus, Focus::Date);
        app.on_key(key(KeyCode::Backspace));
        app.on_key(key(KeyCode::Char('8')));
        app.view = View::Idle;
        app.on_key(key(KeyCode::Enter));
        assert!(matches!(app.view, View::Loading));
        assert_eq!(
            app.input.as_ref().map(|i| i.date),
            NaiveDate::from_ymd_opt(2026, 10, 18)
        );

        app.on_key(key(KeyCode::Char('x')));
        app.on_key(key(KeyCode::Enter));
        assert!(app.status.as_deref().unwrap_or("").contains("not a YYYY-MM-DD"));
    }

    #[test]
    fn test_same_selection_is_not_refetched() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir).with_place(oslo());
        app.view = View::Idle;
        app.on_key(key(KeyCode::Tab));
        app.on_key(key(KeyCode::Enter));
        assert!(matches!(app.view, View::Idle));
    }

    #[test]
    fn test_place_kept_while_date_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir);
        app.on_key(key(KeyCode::Tab));
        app.on_key(key(KeyCode::Backspace));
        app.on_key(key(KeyCode::Tab));

        app.apply(Response::Suggestions {
            id: 0,
            places: Ok(vec![oslo()]),
        });
        app.on_key(key(KeyCode::Enter));
        assert_eq!(app.selected, Some(oslo()));
        assert!(app.input.is_none());
        assert!(matches!(app.view, View::Idle));
        assert!(app.status.as_deref().unwrap_or("").contains("not a YYYY-MM-DD"));

        app.on_key(key(KeyCode::Tab));
        app.on_key(key(KeyCode::Char('8')));
        app.on_key(key(KeyCode::Enter));
        assert!(matches!(app.view, View::Loading));
        assert!(app.status.is_none());

        match app.fetcher.wait(Duration::from_secs(5)) {
            Some(Response::Weather { input, .. }) => {
                assert_eq!(input.place, oslo());
                assert_eq!(input.date, NaiveDate::from_ymd_opt(2026, 10, 18).unwrap());
            }
            other => panic!("expected a weather response, got {:?}", other),
        }
    }

    #[test]
    fn test_weather_response_builds_chart() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir).with_place(oslo());
        let payload: ForecastPayload = serde_json::from_value(met_like_payload(12, 24)).unwrap();
        app.apply(weather_response(&app, Ok(payload)));
        match &app.view {
            View::Ready(view) => assert_eq!(view.series.len(), 14),
            _ => panic!("expected a chart"),
        }
        assert_eq!(app.history.as_ref().map(|h| h.hours), Some(0));
    }

    #[test]
    fn test_failed_forecast_shows_message() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir).with_place(oslo());
        app.apply(weather_response(&app, Ok(ForecastPayload::default())));
        match &app.view {
            View::Failed(message) => {
                assert_eq!(message, "Failed loading data, please try again later")
            }
            _ => panic!("expected a failure"),
        }
    }

    #[test]
    fn test_render() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir).with_place(oslo());
        let payload: ForecastPayload = serde_json::from_value(met_like_payload(30, 60)).unwrap();
        app.apply(weather_response(&app, Ok(payload)));

        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|f| ui(f, &app)).unwrap();
        let content: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(content.contains("Umbrella"));
        assert!(content.contains("Oslo"));
        assert!(content.contains("Forecast"));
    }

    #[test]
    fn test_quit() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir);
        assert_eq!(app.on_key(key(KeyCode::Esc)), Control::Quit);
        assert_eq!(
            app.on_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Control::Quit
        );
    }
}
