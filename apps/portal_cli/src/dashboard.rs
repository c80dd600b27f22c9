use crate::auth::{admin_client, AdminArgs};
use crate::output::{self, chart_lines, Format};
use crate::settings::Settings;
use crate::tui;
use anyhow::{bail, Result};
use clap::{Args, ValueEnum};
use portal_engine::{
    ChartRegistry, Dashboard, DashboardLoader, DashboardOptions, DashboardView, Section,
};
use portal_model::{Engagement, IndexJobSummary, Timeframe, UserProfile};
use std::sync::Arc;

pub const SESSION_EXPIRED: &str = "Session expired. Please log in again.";

#[derive(Args)]
pub struct DashboardCmd {
    #[arg(long, value_enum, default_value_t = Format::Text)]
    pub format: Format,
    /// Table written when `--format csv` is used
    #[arg(long, value_enum, default_value_t = CsvSection::Engagements)]
    pub section: CsvSection,
    /// Window for the engagement list (today, week, month, year, all)
    #[arg(long, default_value_t = Timeframe::All)]
    pub timeframe: Timeframe,
    /// Window for the profile list
    #[arg(long, default_value_t = Timeframe::All)]
    pub profiles_timeframe: Timeframe,
    #[arg(long, default_value_t = portal_engine::dashboard::DEFAULT_LIST_LIMIT)]
    pub limit: u32,
    #[arg(long, default_value_t = portal_engine::dashboard::DEFAULT_JOBS_LIMIT)]
    pub jobs_limit: u32,
    /// Browse the dashboard in the terminal UI
    #[arg(long, default_value_t = false)]
    pub tui: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CsvSection {
    Engagements,
    Profiles,
    Jobs,
}

pub async fn run(settings: &Settings, admin: &AdminArgs, cmd: DashboardCmd) -> Result<()> {
    let client = admin_client(settings, admin).await?;
    let loader = DashboardLoader::new(Arc::new(client)).with_options(DashboardOptions {
        engagement_timeframe: cmd.timeframe,
        profile_timeframe: cmd.profiles_timeframe,
        limit: cmd.limit,
        jobs_limit: cmd.jobs_limit,
    });
    let mut charts = ChartRegistry::default();
    let view = loader.load(&mut charts).await;
    let DashboardView::Ready(dashboard) = view else {
        bail!(SESSION_EXPIRED);
    };

    if cmd.tui {
        return tui::launch(*dashboard, charts).await;
    }
    match cmd.format {
        Format::Json => output::print_json(&dashboard),
        Format::Csv => {
            let (headers, rows) = match cmd.section {
                CsvSection::Engagements => (
                    ENGAGEMENT_HEADERS,
                    section_rows(&dashboard.engagements, engagement_row),
                ),
                CsvSection::Profiles => {
                    (PROFILE_HEADERS, section_rows(&dashboard.profiles, profile_row))
                }
                CsvSection::Jobs => (JOB_HEADERS, section_rows(&dashboard.jobs, job_row)),
            };
            output::print_csv(headers, &rows)
        }
        Format::Text => {
            print_text(&dashboard, &charts);
            Ok(())
        }
    }
}

pub const ENGAGEMENT_HEADERS: &[&str] =
    &["user", "age", "job", "source", "question", "service", "when"];
pub const PROFILE_HEADERS: &[&str] =
    &["id", "name", "age", "job", "email", "phone", "desires", "created"];
pub const JOB_HEADERS: &[&str] = &["job_id", "status", "created", "finished", "result"];

pub fn engagement_row(e: &Engagement) -> Vec<String> {
    vec![
        e.user_label().to_string(),
        e.age.clone().unwrap_or_default(),
        e.job.clone().unwrap_or_default(),
        e.source.clone().unwrap_or_default(),
        e.question_label().to_string(),
        e.service.clone().unwrap_or_default(),
        output::timestamp(e.timestamp.as_deref()),
    ]
}

pub fn profile_row(p: &UserProfile) -> Vec<String> {
    vec![
        p.id_label().to_string(),
        p.name().to_string(),
        p.age().to_string(),
        p.job().to_string(),
        p.email.clone().unwrap_or_default(),
        p.phone.clone().unwrap_or_default(),
        p.desires(),
        output::timestamp(p.created.as_deref()),
    ]
}

pub fn job_row(j: &IndexJobSummary) -> Vec<String> {
    vec![
        j.job_id.clone(),
        j.status.to_string(),
        output::timestamp(j.created_at.as_deref()),
        output::timestamp(j.finished_at.as_deref()),
        j.result_summary(),
    ]
}

pub fn section_rows<T>(
    section: &Section<Vec<T>>,
    row: fn(&T) -> Vec<String>,
) -> Vec<Vec<String>> {
    section
        .loaded()
        .map(|items| items.iter().map(row).collect())
        .unwrap_or_default()
}

fn print_section<T>(
    title: &str,
    section: &Section<Vec<T>>,
    headers: &[&str],
    row: fn(&T) -> Vec<String>,
) {
    println!("\n== {} ==", title);
    match section.message() {
        Some(message) => println!("{}", message),
        None => output::print_table(headers, &section_rows(section, row)),
    }
}

fn print_text(dashboard: &Dashboard, charts: &ChartRegistry) {
    if let Some(banner) = &dashboard.banner {
        println!("! {}", banner);
    }
    if let Some(cards) = dashboard.stat_cards {
        println!(
            "Users: {}  Engagements: {}  Orders: {}  AI searches: {}",
            cards.total_users, cards.total_engagements, cards.total_orders, cards.ai_searches
        );
    }
    for (_, chart) in charts.iter() {
        println!("\n== {} ==", chart.title);
        for line in chart_lines(chart) {
            println!("{}", line);
        }
    }

    println!("\n== Premium suggestions ==");
    match &dashboard.premium {
        Section::Loaded(items) => {
            for item in items {
                println!(
                    "{}: {} ({} clicks)",
                    item.user_label(),
                    item.question,
                    item.count
                );
            }
        }
        other => println!("{}", other.message().unwrap_or_default()),
    }
    print_section("Engagements", &dashboard.engagements, ENGAGEMENT_HEADERS, engagement_row);
    print_section("Profiles", &dashboard.profiles, PROFILE_HEADERS, profile_row);
    print_section("Index jobs", &dashboard.jobs, JOB_HEADERS, job_row);
}
