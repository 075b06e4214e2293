//! Typed configuration from environment variables.
//!
//! Loads once at startup, fails fast if required vars are missing.
//! Sensitive values wrapped in secrecy::SecretString to prevent log leaks.
//! Notification templates live in a TOML file referenced by
//! `NOTIFICATION_TEMPLATES_PATH`.

pub mod secrets;

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::model::NotificationTemplate;

#[derive(Debug)]
pub struct Config {
    pub outer_api_base_url: String,
    pub outer_api_key: SecretString,
    pub employer_accounts_base_url: String,
    pub employer_feedback_base_url: String,
    pub notification_templates: Vec<NotificationTemplate>,

    pub generate_transactions_batch_size: usize,
    pub generate_transactions_max_parallelism: usize,
    pub process_emails_batch_size: usize,
    pub process_emails_per_second_cap: usize,
    pub process_emails_wave_delay: Duration,

    pub sync_accounts_interval: Duration,
    pub generate_transactions_interval: Duration,
    pub process_emails_interval: Duration,
    pub generate_summaries_interval: Duration,

    pub otel_endpoint: Option<String>,
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// In local dev, call `dotenvy::dotenv().ok()` before this.
    /// In production, systemd EnvironmentFile provides the vars.
    pub fn from_env() -> Result<Self> {
        let notification_templates = match std::env::var("NOTIFICATION_TEMPLATES_PATH") {
            Ok(path) => load_templates(Path::new(&path))?,
            Err(_) => Vec::new(),
        };

        Ok(Self {
            outer_api_base_url: required_var("FEEDBACK_OUTER_API_BASE_URL")?,
            outer_api_key: SecretString::from(required_var("FEEDBACK_OUTER_API_KEY")?),
            employer_accounts_base_url: required_var("EMPLOYER_ACCOUNTS_BASE_URL")?,
            employer_feedback_base_url: required_var("EMPLOYER_FEEDBACK_BASE_URL")?,
            notification_templates,

            generate_transactions_batch_size: parsed_var("GENERATE_TRANSACTIONS_BATCH_SIZE", 500)?,
            generate_transactions_max_parallelism: parsed_var(
                "GENERATE_TRANSACTIONS_MAX_PARALLELISM",
                10,
            )?,
            process_emails_batch_size: parsed_var("PROCESS_EMAILS_BATCH_SIZE", 250)?,
            process_emails_per_second_cap: parsed_var("PROCESS_EMAILS_PER_SECOND_CAP", 55)?,
            process_emails_wave_delay: Duration::from_millis(parsed_var(
                "PROCESS_EMAILS_WAVE_DELAY_MS",
                1000,
            )?),

            sync_accounts_interval: Duration::from_secs(parsed_var(
                "SYNC_ACCOUNTS_INTERVAL_SECS",
                21_600,
            )?),
            generate_transactions_interval: Duration::from_secs(parsed_var(
                "GENERATE_TRANSACTIONS_INTERVAL_SECS",
                3_600,
            )?),
            process_emails_interval: Duration::from_secs(parsed_var(
                "PROCESS_EMAILS_INTERVAL_SECS",
                1_800,
            )?),
            generate_summaries_interval: Duration::from_secs(parsed_var(
                "GENERATE_SUMMARIES_INTERVAL_SECS",
                86_400,
            )?),

            otel_endpoint: std::env::var("OTEL_ENDPOINT").ok(),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn required_var(name: &str) -> Result<String> {
    std::env::var(name)
        .map_err(|_| Error::Config(format!("required environment variable {name} is not set")))
}

fn parsed_var<T: FromStr + Copy>(name: &str, default: T) -> Result<T> {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| Error::Config(format!("cannot parse {name}: {raw:?}"))),
        Err(_) => Ok(default),
    }
}

/// Top-level TOML wrapper for the templates file.
#[derive(Debug, Deserialize)]
struct TemplatesFile {
    #[serde(default)]
    templates: Vec<NotificationTemplate>,
}

/// Load notification templates from a `[[templates]]` TOML file.
pub fn load_templates(path: &Path) -> Result<Vec<NotificationTemplate>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("cannot read templates file {}: {e}", path.display()))
    })?;
    let file: TemplatesFile = toml::from_str(&content).map_err(|e| {
        Error::Config(format!("bad templates file {}: {e}", path.display()))
    })?;
    Ok(file.templates)
}
