use crate::dashboard::{
    engagement_row, job_row, profile_row, section_rows, ENGAGEMENT_HEADERS, JOB_HEADERS,
    PROFILE_HEADERS,
};
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use portal_engine::{Chart, ChartRegistry, Dashboard, Section};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::{BarChart, Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Terminal,
};
use std::io::stdout;
use std::time::Duration;

pub async fn launch(dashboard: Dashboard, charts: ChartRegistry) -> Result<()> {
    tokio::task::spawn_blocking(move || run_ui(dashboard, charts)).await??;
    Ok(())
}

fn run_ui(dashboard: Dashboard, charts: ChartRegistry) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let mut app = ViewState::new(dashboard, charts);

    loop {
        terminal.draw(|f| draw(f, &mut app))?;

        if event::poll(Duration::from_millis(250))? {
            if let Event::Key(key) = event::read()? {
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => break,
                    KeyCode::Down => app.next(),
                    KeyCode::Up => app.previous(),
                    _ => {}
                }
            }
        }
    }

    cleanup_terminal(&mut terminal)?;
    Ok(())
}

fn cleanup_terminal(terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    Ok(())
}

enum Pane {
    Overview,
    Chart(usize),
    Premium,
    Engagements,
    Profiles,
    Jobs,
}

struct ViewState {
    dashboard: Dashboard,
    charts: Vec<Chart>,
    panes: Vec<(String, Pane)>,
    list_state: ListState,
}

impl ViewState {
    fn new(dashboard: Dashboard, registry: ChartRegistry) -> Self {
        let charts: Vec<Chart> = registry.iter().map(|(_, chart)| chart.clone()).collect();
        let mut panes = vec![("Overview".to_string(), Pane::Overview)];
        panes.extend(
            charts
                .iter()
                .enumerate()
                .map(|(idx, chart)| (chart.title.clone(), Pane::Chart(idx))),
        );
        panes.extend([
            ("Premium suggestions".to_string(), Pane::Premium),
            ("Engagements".to_string(), Pane::Engagements),
            ("Profiles".to_string(), Pane::Profiles),
            ("Index jobs".to_string(), Pane::Jobs),
        ]);
        let mut list_state = ListState::default();
        list_state.select(Some(0));
        Self {
            dashboard,
            charts,
            panes,
            list_state,
        }
    }

    fn next(&mut self) {
        let next = match self.list_state.selected() {
            Some(i) if i + 1 >= self.panes.len() => 0,
            Some(i) => i + 1,
            None => 0,
        };
        self.list_state.select(Some(next));
    }

    fn previous(&mut self) {
        let prev = match self.list_state.selected() {
            Some(0) | None => self.panes.len().saturating_sub(1),
            Some(i) => i - 1,
        };
        self.list_state.select(Some(prev));
    }

    fn selected(&self) -> Option<&Pane> {
        self.list_state
            .selected()
            .and_then(|idx| self.panes.get(idx))
            .map(|(_, pane)| pane)
    }
}

fn table_text<T>(
    section: &Section<Vec<T>>,
    headers: &[&str],
    row: fn(&T) -> Vec<String>,
) -> String {
    if let Some(message) = section.message() {
        return message.to_string();
    }
    let mut lines = vec![headers.join(" | ")];
    lines.extend(section_rows(section, row).into_iter().map(|cells| cells.join(" | ")));
    lines.join("\n")
}

fn overview_text(dashboard: &Dashboard) -> String {
    let mut lines = Vec::new();
    if let Some(banner) = &dashboard.banner {
        lines.push(format!("! {}", banner));
    }
    match dashboard.stat_cards {
        Some(cards) => lines.extend([
            format!("Total users:       {}", cards.total_users),
            format!("Total engagements: {}", cards.total_engagements),
            format!("Total orders:      {}", cards.total_orders),
            format!("AI searches:       {}", cards.ai_searches),
        ]),
        None => lines.push("Analytics unavailable".to_string()),
    }
    lines.join("\n")
}

fn draw(f: &mut ratatui::Frame, app: &mut ViewState) {
    let layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
        .split(f.size());

    let items: Vec<ListItem> = app
        .panes
        .iter()
        .map(|(title, _)| ListItem::new(title.clone()))
        .collect();
    let panes = List::new(items)
        .block(Block::default().title("Dashboard (q to quit)").borders(Borders::ALL))
        .highlight_style(Style::default().fg(Color::Cyan));
    f.render_stateful_widget(panes, layout[0], &mut app.list_state);

    if let Some(Pane::Chart(idx)) = app.selected() {
        if let Some(chart) = app.charts.get(*idx) {
            let bars: Vec<(&str, u64)> = chart
                .series
                .iter()
                .map(|(label, value)| (label.as_str(), value.max(0.0).round() as u64))
                .collect();
            let widget = BarChart::default()
                .block(Block::default().title(chart.title.as_str()).borders(Borders::ALL))
                .data(bars.as_slice())
                .bar_width(7)
                .bar_gap(1)
                .bar_style(Style::default().fg(Color::Cyan));
            f.render_widget(widget, layout[1]);
            return;
        }
    }

    let dashboard = &app.dashboard;
    let (title, body) = match app.selected() {
        Some(Pane::Premium) => (
            "Premium suggestions",
            match &dashboard.premium {
                Section::Loaded(items) => items
                    .iter()
                    .map(|s| format!("{}: {} ({} clicks)", s.user_label(), s.question, s.count))
                    .collect::<Vec<_>>()
                    .join("\n"),
                other => other.message().unwrap_or_default().to_string(),
            },
        ),
        Some(Pane::Engagements) => (
            "Engagements",
            table_text(&dashboard.engagements, ENGAGEMENT_HEADERS, engagement_row),
        ),
        Some(Pane::Profiles) => (
            "Profiles",
            table_text(&dashboard.profiles, PROFILE_HEADERS, profile_row),
        ),
        Some(Pane::Jobs) => ("Index jobs", table_text(&dashboard.jobs, JOB_HEADERS, job_row)),
        _ => ("Overview", overview_text(dashboard)),
    };
    let detail = Paragraph::new(body)
        .wrap(Wrap { trim: false })
        .block(Block::default().title(title).borders(Borders::ALL));
    f.render_widget(detail, layout[1]);
}
