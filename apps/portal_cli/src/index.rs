use crate::auth::{admin_client, AdminArgs};
use crate::dashboard::{job_row, JOB_HEADERS};
use crate::output::{self, Format};
use crate::settings::Settings;
use anyhow::{anyhow, bail, Result};
use clap::{Args, Subcommand};
use portal_client::PortalClient;
use portal_engine::{JobPoller, PollSettings};
use portal_model::IndexJob;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Args, Debug, Clone, Copy)]
pub struct PollArgs {
    /// Delay between status checks (defaults to PORTAL_POLL_INTERVAL_MS)
    #[arg(long)]
    pub interval_ms: Option<u64>,
    /// Give up after this many seconds (defaults to PORTAL_POLL_TIMEOUT_SECS)
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

impl PollArgs {
    fn settings(self) -> PollSettings {
        let defaults = PollSettings::default();
        PollSettings::new(
            self.interval_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.interval),
            self.timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
        )
    }
}

#[derive(Subcommand)]
pub enum IndexAction {
    /// Start a background rebuild of the AI search index
    Build {
        /// Ask the server for a short simulated job
        #[arg(long, default_value_t = false)]
        simulate: bool,
        /// Print the job id and return without waiting
        #[arg(long, default_value_t = false)]
        no_wait: bool,
        #[command(flatten)]
        poll: PollArgs,
    },
    /// Wait for an existing job to finish
    Wait {
        job_id: String,
        #[command(flatten)]
        poll: PollArgs,
    },
    /// Index files and in-memory job table
    Status,
    /// Recent jobs from the job history
    Jobs {
        #[arg(long, default_value_t = 20)]
        limit: u32,
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Stored details and log of one job
    Job { job_id: String },
}

pub async fn run(settings: &Settings, admin: &AdminArgs, action: IndexAction) -> Result<()> {
    let client = admin_client(settings, admin).await?;
    match action {
        IndexAction::Build {
            simulate,
            no_wait,
            poll,
        } => {
            let started = client.build_index_async(simulate).await?;
            println!("Index build started (job {})", started.job_id);
            if no_wait {
                return Ok(());
            }
            wait(client, started.job_id, poll.settings()).await
        }
        IndexAction::Wait { job_id, poll } => wait(client, job_id, poll.settings()).await,
        IndexAction::Status => status(&client).await,
        IndexAction::Jobs { limit, format } => {
            let jobs = client.index_jobs(limit).await?;
            if jobs.is_empty() && format == Format::Text {
                println!("{}", portal_engine::dashboard::NO_JOBS);
                return Ok(());
            }
            let rows: Vec<Vec<String>> = jobs.iter().map(job_row).collect();
            output::emit(format, JOB_HEADERS, &rows)
        }
        IndexAction::Job { job_id } => {
            let Some(job) = client.index_job(&job_id).await? else {
                bail!("Job {} not found", job_id);
            };
            println!("Job:      {}", job.job_id.as_deref().unwrap_or(&job_id));
            println!("Status:   {}", job.status);
            println!("Created:  {}", output::timestamp(job.created_at.as_deref()));
            println!("Started:  {}", output::timestamp(job.started_at.as_deref()));
            println!("Finished: {}", output::timestamp(job.finished_at.as_deref()));
            if let Some(result) = &job.result {
                println!("Result:   {}", result);
            }
            for line in &job.logs {
                println!("  [{}] {}", output::timestamp(Some(&line.ts)), line.msg);
            }
            Ok(())
        }
    }
}

/// Polls until the job settles; Ctrl-C stops polling but not the job.
async fn wait(client: PortalClient, job_id: String, settings: PollSettings) -> Result<()> {
    let poller = JobPoller::new(Arc::new(client)).with_settings(settings);
    let handle = poller.spawn(job_id.clone())?;
    info!("waiting for job {} every {:?}", job_id, settings.interval);

    let outcome = tokio::select! {
        outcome = handle.wait() => outcome,
        _ = tokio::signal::ctrl_c() => {
            bail!("Stopped waiting for job {}; it keeps running on the server", job_id);
        }
    };
    match outcome {
        Ok(job) => {
            println!("AI Index build completed successfully");
            print_result(&job);
            Ok(())
        }
        Err(err) => Err(anyhow!("AI Index build failed or timed out: {}", err)),
    }
}

fn print_result(job: &IndexJob) {
    match &job.result {
        Some(result) => match result.get("count") {
            Some(count) => println!("Documents indexed: {}", count),
            None => println!("Result: {}", result),
        },
        None => println!("Status: {}", job.status),
    }
}

async fn status(client: &PortalClient) -> Result<()> {
    let snapshot = client.index_status().await?;
    println!("FAISS available: {}", yes_no(snapshot.faiss_available));
    println!("Index file:      {}", yes_no(snapshot.index_exists));
    println!("Metadata file:   {}", yes_no(snapshot.meta_exists));
    println!("Documents:       {}", snapshot.documents);
    let mut jobs: Vec<_> = snapshot.jobs.iter().collect();
    jobs.sort_by(|a, b| a.0.cmp(b.0));
    for (job_id, job) in jobs {
        match &job.error {
            Some(error) => println!("  {}  {}  {}", job_id, job.status, error),
            None => println!("  {}  {}", job_id, job.status),
        }
    }
    Ok(())
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}
