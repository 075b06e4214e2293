//! fbjobs CLI — operator interface to the feedback batch jobs.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use feedback_jobs::api::HttpFeedbackApi;
use feedback_jobs::config::Config;
use feedback_jobs::jobs::{
    GenerateSummariesJob, GenerateTransactionsJob, JobScheduler, ProcessEmailsJob,
    SyncAccountsJob,
};
use feedback_jobs::model::JobReport;
use feedback_jobs::telemetry::{TelemetryConfig, init_telemetry};
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "fbjobs", about = "Employer feedback batch jobs")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the job scheduler daemon
    Serve,
    /// Run a single job once and print its report
    Run {
        /// Which job to run
        #[arg(value_enum)]
        job: JobName,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum JobName {
    SyncAccounts,
    GenerateTransactions,
    ProcessEmails,
    GenerateSummaries,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = Config::from_env()?;
    let _guard = init_telemetry(TelemetryConfig {
        endpoint: config.otel_endpoint.clone(),
        service_name: "feedback-jobs".to_string(),
    })?;

    let api = Arc::new(HttpFeedbackApi::new(&config)?);

    match cli.command {
        Command::Serve => cmd_serve(api, &config).await,
        Command::Run { job } => cmd_run(api, &config, job).await,
    }
}

async fn cmd_serve(api: Arc<HttpFeedbackApi>, config: &Config) -> anyhow::Result<()> {
    let scheduler = JobScheduler::new(api, config)?;
    let cancel = CancellationToken::new();

    let shutdown = scheduler.shutdown_handle();
    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        ctrl_c_cancel.cancel();
        shutdown.notify_one();
    });

    scheduler.run(cancel).await?;
    Ok(())
}

async fn cmd_run(api: Arc<HttpFeedbackApi>, config: &Config, job: JobName) -> anyhow::Result<()> {
    let cancel = CancellationToken::new();
    let started_at = Utc::now();
    let started = Instant::now();

    let (name, totals) = match job {
        JobName::SyncAccounts => {
            SyncAccountsJob::new(api).run(&cancel).await?;
            (SyncAccountsJob::<HttpFeedbackApi>::NAME, None)
        }
        JobName::GenerateTransactions => {
            let totals = GenerateTransactionsJob::new(api, config).run(&cancel).await?;
            (GenerateTransactionsJob::<HttpFeedbackApi>::NAME, Some(totals))
        }
        JobName::ProcessEmails => {
            let totals = ProcessEmailsJob::new(api, config)?.run(&cancel).await?;
            (ProcessEmailsJob::<HttpFeedbackApi>::NAME, Some(totals))
        }
        JobName::GenerateSummaries => {
            GenerateSummariesJob::new(api).run(&cancel).await?;
            (GenerateSummariesJob::<HttpFeedbackApi>::NAME, None)
        }
    };

    let report = JobReport {
        job: name,
        started_at,
        duration_ms: started.elapsed().as_millis() as u64,
        totals,
    };

    println!("Job:       {}", report.job);
    println!("Started:   {}", report.started_at.format("%Y-%m-%d %H:%M:%S"));
    println!("Duration:  {}ms", report.duration_ms);
    if let Some(totals) = report.totals {
        println!("Processed: {}", totals.processed);
        println!("Failed:    {}", totals.failed);
    }

    Ok(())
}
