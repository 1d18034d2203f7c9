//! AppShip CLI
//!
//! The `appship` command turns a mobile CI build's artifacts into shippable
//! app versions.
//!
//! ## Commands
//!
//! - `select`: release slugs of an artifact dump
//! - `versions`: Android app version descriptors of an artifact dump
//! - `share`: publish and share state of a version, offline or stored
//! - `fetch`: every artifact of a build, following pagination
//! - `ingest`: store the app versions of a finished build
//! - `history`: stored app versions of an app, newest first

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use tracing::{info, Level};
use uuid::Uuid;

use appship_core::{
    telemetry::init_tracing, AppVersion, ArtifactRecord, ArtifactSelector, BuildSpan,
    SettingsError, ShipError,
};
use appship_ingest::{AppSettings, BuildEvent, BuildIngest, IngestError, IngestReport};
use appship_provider::{
    fetch_all_artifacts, ArtifactPage, ArtifactProvider, HttpArtifactProvider, ProviderConfig,
};
use appship_state::{AppVersionStore, FsAppVersionStore};

/// Exit status for a missing module setting.
const SETTINGS_EXIT_CODE: u8 = 2;

#[derive(Parser)]
#[command(name = "appship")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Release artifact selection for mobile CI builds", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct ProviderArgs {
    /// Provider API token
    #[arg(long, env = "APPSHIP_AUTH_TOKEN", hide_env_values = true)]
    token: String,
}

#[derive(clap::Args)]
struct StoreArgs {
    /// App version store directory
    #[arg(long, env = "APPSHIP_STORE_DIR", default_value = ".appship")]
    store_dir: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the slugs of the release deliverables, one per line
    Select {
        /// Artifact listing (JSON array or listing page)
        #[arg(short, long)]
        artifacts: PathBuf,

        /// Module to select when the build produced several
        #[arg(short, long, env = "APPSHIP_MODULE", default_value = "")]
        module: String,
    },

    /// Print one Android app version per product flavour as JSON
    Versions {
        /// Artifact listing (JSON array or listing page)
        #[arg(short, long)]
        artifacts: PathBuf,

        #[arg(long)]
        build_slug: String,

        #[arg(long)]
        build_number: String,

        #[arg(long, default_value = "")]
        commit_message: String,

        /// Module to record when the build produced several
        #[arg(short, long, env = "APPSHIP_MODULE", default_value = "")]
        module: String,
    },

    /// Print publish and share state of an app version as JSON
    ///
    /// Either evaluate a version file against an artifact dump, or a stored
    /// version against its build's current artifacts.
    Share {
        /// Artifact listing (JSON array or listing page)
        #[arg(short, long, requires = "version", conflicts_with = "id")]
        artifacts: Option<PathBuf>,

        /// App version file (JSON)
        #[arg(long, requires = "artifacts", conflicts_with = "id")]
        version: Option<PathBuf>,

        /// Stored app version id
        #[arg(long, required_unless_present = "version")]
        id: Option<Uuid>,

        #[command(flatten)]
        store: StoreArgs,

        /// Provider API token, needed with --id
        #[arg(long, env = "APPSHIP_AUTH_TOKEN", hide_env_values = true)]
        token: Option<String>,
    },

    /// Print every artifact of a build as JSON
    Fetch {
        #[arg(long)]
        app: String,

        #[arg(long)]
        build: String,

        #[command(flatten)]
        provider: ProviderArgs,
    },

    /// Store the app versions of a finished build
    Ingest {
        #[arg(long)]
        app: String,

        #[arg(long)]
        build: String,

        #[arg(long, default_value = "")]
        build_number: String,

        #[arg(long, default_value = "")]
        commit_message: String,

        /// Workflow that triggered the build
        #[arg(long)]
        workflow: Option<String>,

        /// Android workflow whitelist: `all` or comma-separated names
        #[arg(long, default_value = "all")]
        android_workflow: String,

        /// Module to ship when the build produced several
        #[arg(short, long, env = "APPSHIP_MODULE", default_value = "")]
        module: String,

        #[command(flatten)]
        provider: ProviderArgs,

        #[command(flatten)]
        store: StoreArgs,
    },

    /// List stored app versions of an app, newest first
    History {
        #[arg(long)]
        app: String,

        #[command(flatten)]
        store: StoreArgs,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    init_tracing(cli.json, level);

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => match settings_error(&err) {
            Some(settings) => {
                eprintln!("error: {settings}: configure a module with --module or APPSHIP_MODULE");
                ExitCode::from(SETTINGS_EXIT_CODE)
            }
            None => {
                eprintln!("error: {err:#}");
                ExitCode::FAILURE
            }
        },
    }
}

async fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Select { artifacts, module } => cmd_select(&artifacts, &module),
        Commands::Versions {
            artifacts,
            build_slug,
            build_number,
            commit_message,
            module,
        } => cmd_versions(
            &artifacts,
            &build_slug,
            &build_number,
            &commit_message,
            &module,
        ),
        Commands::Share {
            artifacts,
            version,
            id,
            store,
            token,
        } => match (artifacts, version, id) {
            (Some(artifacts), Some(version), _) => cmd_share_file(&artifacts, &version),
            (_, _, Some(id)) => {
                let token = token.context("--token or APPSHIP_AUTH_TOKEN is required with --id")?;
                cmd_share_stored(&token, &store.store_dir, id).await
            }
            _ => anyhow::bail!("pass --artifacts with --version, or --id"),
        },
        Commands::Fetch {
            app,
            build,
            provider,
        } => cmd_fetch(&provider.token, &app, &build).await,
        Commands::Ingest {
            app,
            build,
            build_number,
            commit_message,
            workflow,
            android_workflow,
            module,
            provider,
            store,
        } => {
            let settings = AppSettings {
                android_workflow,
                module,
                ..Default::default()
            };
            let event = BuildEvent {
                app_slug: app,
                build_slug: build,
                build_number,
                commit_message,
                triggered_workflow: workflow,
            };
            cmd_ingest(&provider.token, &store.store_dir, &settings, &event).await
        }
        Commands::History { app, store } => cmd_history(&store.store_dir, &app).await,
    }
}

/// The settings error behind `err`, if the failure is user-fixable.
fn settings_error(err: &anyhow::Error) -> Option<&SettingsError> {
    err.chain().find_map(|cause| {
        if let Some(e) = cause.downcast_ref::<SettingsError>() {
            return Some(e);
        }
        if let Some(e) = cause.downcast_ref::<ShipError>() {
            return e.as_settings();
        }
        cause
            .downcast_ref::<IngestError>()
            .and_then(IngestError::as_settings)
    })
}

/// Artifact dumps are either a bare array or a saved listing page.
#[derive(Deserialize)]
#[serde(untagged)]
enum ArtifactDump {
    List(Vec<ArtifactRecord>),
    Page(ArtifactPage),
}

fn parse_artifacts(content: &str) -> Result<Vec<ArtifactRecord>> {
    let dump: ArtifactDump =
        serde_json::from_str(content).context("Failed to parse artifact listing")?;
    Ok(match dump {
        ArtifactDump::List(records) => records,
        ArtifactDump::Page(page) => page.data,
    })
}

fn read_artifacts(path: &Path) -> Result<Vec<ArtifactRecord>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read artifact listing: {}", path.display()))?;
    parse_artifacts(&content)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn http_provider(token: &str) -> Result<Arc<dyn ArtifactProvider>> {
    let provider = HttpArtifactProvider::new(ProviderConfig::from_env(token))
        .context("Failed to create provider client")?;
    Ok(Arc::new(provider))
}

fn open_store(dir: &Path) -> Result<Arc<dyn AppVersionStore>> {
    let store = FsAppVersionStore::new(dir)
        .with_context(|| format!("Failed to open app version store: {}", dir.display()))?;
    Ok(Arc::new(store))
}

fn cmd_select(artifacts_path: &Path, module: &str) -> Result<()> {
    let artifacts = read_artifacts(artifacts_path)?;
    let slugs = ArtifactSelector::new(&artifacts).select(module).into_result()?;
    for slug in slugs {
        println!("{slug}");
    }
    Ok(())
}

fn cmd_versions(
    artifacts_path: &Path,
    build_slug: &str,
    build_number: &str,
    commit_message: &str,
    module: &str,
) -> Result<()> {
    let _span = BuildSpan::enter(build_slug);
    let artifacts = read_artifacts(artifacts_path)?;
    let versions = ArtifactSelector::new(&artifacts)
        .prepare_android_app_versions(build_slug, build_number, commit_message, module)
        .into_result()?;
    print_json(&versions)
}

fn cmd_share_file(artifacts_path: &Path, version_path: &Path) -> Result<()> {
    let artifacts = read_artifacts(artifacts_path)?;
    let content = std::fs::read_to_string(version_path)
        .with_context(|| format!("Failed to read app version: {}", version_path.display()))?;
    let version: AppVersion =
        serde_json::from_str(&content).context("Failed to parse app version as JSON")?;

    let _span = BuildSpan::enter(&version.build_slug);
    let share = ArtifactSelector::new(&artifacts)
        .publish_and_share_info(&version)
        .into_result()?;
    print_json(&share)
}

async fn cmd_share_stored(token: &str, store_dir: &Path, id: Uuid) -> Result<()> {
    let shared = BuildIngest::share_info(http_provider(token)?, open_store(store_dir)?, id).await?;
    print_json(&shared)
}

async fn cmd_fetch(token: &str, app: &str, build: &str) -> Result<()> {
    let provider = http_provider(token)?;
    let artifacts = fetch_all_artifacts(provider.as_ref(), app, build)
        .await
        .with_context(|| format!("Failed to list artifacts of build {build}"))?;
    print_json(&artifacts)
}

async fn cmd_ingest(
    token: &str,
    store_dir: &Path,
    settings: &AppSettings,
    event: &BuildEvent,
) -> Result<()> {
    let report =
        BuildIngest::run(http_provider(token)?, open_store(store_dir)?, settings, event).await?;
    match report {
        IngestReport::Skipped { workflow } => {
            println!(
                "Skipped: workflow {} is not whitelisted",
                workflow.as_deref().unwrap_or("<unknown>")
            );
            Ok(())
        }
        IngestReport::NeedsConfiguration(e) => Err(e.into()),
        IngestReport::Stored(records) => {
            info!(stored = records.len(), "ingest finished");
            print_json(&records)
        }
    }
}

async fn cmd_history(store_dir: &Path, app: &str) -> Result<()> {
    let records = open_store(store_dir)?.list_for_app(app).await?;
    print_json(&records)
}
