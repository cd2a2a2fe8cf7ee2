//! Profile Wizard CLI
//!
//! Drives the wizard from the command line. Every command opens the wizard
//! against the configured store, performs one operation and prints the
//! outcome as JSON on stdout. Logs go to stderr.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use mockable::DefaultClock;
use serde::Serialize;
use tokio::io::AsyncReadExt;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use pw_contracts::SectionContracts;
use pw_core::config::{AppConfig, LoggingConfig};
use pw_models::{Section, SectionValues, UserId};
use pw_services::{FormSnapshot, ServiceResult, Wizard};
use pw_store::Stores;

#[derive(Debug, Parser)]
#[command(name = "profile-wizard", about = "Multi-step user profile wizard", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show the current step, draft values and resume hint
    Status,
    /// Submit the values of one section (JSON object, `-` reads stdin)
    Submit { section: Section, payload: PathBuf },
    /// Retry committing a complete draft
    Finalize,
    /// Throw the current draft away
    Discard,
    /// List finalized users
    List,
    /// Show one user and make it the selected user
    Show { id: UserId },
    /// Change one section of a finalized user
    Edit {
        id: UserId,
        section: Section,
        payload: PathBuf,
    },
    /// Delete a finalized user
    Delete { id: UserId },
}

/// JSON document printed for every command
#[derive(Debug, Serialize)]
struct Report<T: Serialize> {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<T>,
    errors: Vec<String>,
    snapshot: FormSnapshot,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    let loaded = AppConfig::from_env();
    let config = loaded.as_ref().cloned().unwrap_or_default();

    init_tracing(&config.logging);
    if let Err(e) = &loaded {
        warn!("Failed to load config from env: {}, using defaults", e);
    }

    let cli = Cli::parse();
    let stores = Stores::open(&config.storage);
    let contracts = SectionContracts::new(&config);
    let mut wizard = Wizard::open(stores, contracts, Arc::new(DefaultClock)).await;
    info!(command = ?cli.command, "Running command");

    let ok = run(&mut wizard, cli.command).await?;
    Ok(if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn run(wizard: &mut Wizard, command: Command) -> anyhow::Result<bool> {
    match command {
        Command::Status => {
            let hint = wizard.resume_hint().await;
            print_report(wizard, hint)
        }
        Command::Submit { section, payload } => {
            let values = read_section(section, &payload).await?;
            if wizard.state().is_drafting() && wizard.state().section() != Some(section) {
                let moved = wizard.navigate_to(section);
                if moved.is_failure() {
                    return print_report(wizard, moved);
                }
            }
            let result = wizard.submit(values).await;
            print_report(wizard, result)
        }
        Command::Finalize => {
            let result = wizard.retry_finalize().await;
            print_report(wizard, result)
        }
        Command::Discard => {
            let result = wizard.discard_draft().await;
            print_report(wizard, result)
        }
        Command::List => {
            let result = wizard.users().await;
            print_report(wizard, result)
        }
        Command::Show { id } => {
            let result = wizard.select_user(id).await;
            print_report(wizard, result)
        }
        Command::Edit {
            id,
            section,
            payload,
        } => {
            let values = read_section(section, &payload).await?;
            let opened = wizard.begin_edit(id, section).await;
            if opened.is_failure() {
                return print_report(wizard, opened);
            }
            let result = wizard.submit(values).await;
            wizard.finish_edit().await;
            print_report(wizard, result)
        }
        Command::Delete { id } => {
            let result = wizard.delete_user(id).await;
            print_report(wizard, result)
        }
    }
}

fn print_report<T: Serialize>(wizard: &Wizard, result: ServiceResult<T>) -> anyhow::Result<bool> {
    let report = build_report(wizard.snapshot(), result);
    let ok = report.ok;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(ok)
}

fn build_report<T: Serialize>(snapshot: FormSnapshot, result: ServiceResult<T>) -> Report<T> {
    let ok = result.is_success();
    let code = result.code();
    let errors = result.errors().full_messages();
    Report {
        ok,
        code,
        value: result.into_inner(),
        errors,
        snapshot,
    }
}

/// Read a section payload from a file, or from stdin when the path is `-`
async fn read_section(section: Section, path: &Path) -> anyhow::Result<SectionValues> {
    let raw = if path == Path::new("-") {
        let mut buf = String::new();
        tokio::io::stdin().read_to_string(&mut buf).await?;
        buf
    } else {
        tokio::fs::read_to_string(path).await?
    };
    parse_section(section, &raw)
}

fn parse_section(section: Section, raw: &str) -> anyhow::Result<SectionValues> {
    let fields: serde_json::Value = serde_json::from_str(raw)?;
    SectionValues::from_fields(section, fields)
        .map_err(|e| anyhow::anyhow!("invalid {} payload: {}", section, e))
}

/// Initialize tracing on stderr. `RUST_LOG` overrides the configured filter.
fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.filter));

    let json = logging.json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_writer(std::io::stderr)
    });
    let plain = (!logging.json).then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_writer(std::io::stderr)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(plain)
        .init();
}
