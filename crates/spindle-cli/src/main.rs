//! `spindle` — command-line driver for the Spindle versioned record store.
//!
//! Sequential pipeline scripting against a local SQLite store:
//!
//! ```
//! spindle ingest chapter1
//! spindle save chapter1 --stage human_edited --text-file edited.txt
//! spindle save chapter1 --stage reviewed --final < approved.txt
//! spindle final chapter1
//! spindle serve
//! ```

use std::{io::Read as _, path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use serde::Deserialize;
use spindle_api::{ApiState, api_router};
use spindle_core::{
  artifact::DirArtifacts,
  record::{Stage, StageDraft},
  store::{RecordQuery, RecordStore as _},
  versioning,
};
use spindle_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
  name = "spindle",
  about = "Versioned record store for the content pipeline"
)]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// SQLite store path (overrides config file and environment).
  #[arg(long)]
  store_path: Option<PathBuf>,

  /// Directory holding pipeline artifact files (overrides config file and
  /// environment).
  #[arg(long)]
  artifact_dir: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Bootstrap the og/spun/reviewed records for a freshly scraped document.
  Ingest { doc_id: String },

  /// Record one stage at the next version; text from --text-file or stdin.
  Save {
    doc_id: String,

    /// Provenance stage token (og, spun, reviewed, human_edited, respun,
    /// rereviewed, or any custom token).
    #[arg(long)]
    stage: Stage,

    /// Read the text from this file instead of stdin.
    #[arg(long)]
    text_file: Option<PathBuf>,

    /// Mark the record as the approved final for its document.
    #[arg(long = "final")]
    is_final: bool,
  },

  /// Print the version the next record for a document would get.
  NextVersion { doc_id: String },

  /// Print the text of the highest-versioned final record.
  Final { doc_id: String },

  /// List every record of a document.
  Versions { doc_id: String },

  /// List known doc_ids.
  Docs,

  /// Serve the JSON HTTP API.
  Serve {
    /// Bind host (overrides config file and environment).
    #[arg(long)]
    host: Option<String>,

    /// Bind port (overrides config file and environment).
    #[arg(long)]
    port: Option<u16>,
  },
}

// ─── Settings ─────────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file; also fed by `SPINDLE_*` env vars.
#[derive(Debug, Deserialize)]
struct Settings {
  #[serde(default = "default_store_path")]
  store_path:   PathBuf,
  #[serde(default = "default_artifact_dir")]
  artifact_dir: PathBuf,
  #[serde(default = "default_host")]
  host:         String,
  #[serde(default = "default_port")]
  port:         u16,
}

fn default_store_path() -> PathBuf { PathBuf::from("spindle.db") }
fn default_artifact_dir() -> PathBuf { PathBuf::from("output") }
fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 5460 }

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration: file, then SPINDLE_* environment on top.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config.clone()).required(false))
    .add_source(config::Environment::with_prefix("SPINDLE"))
    .build()
    .context("failed to read configuration")?;

  let mut settings: Settings = settings
    .try_deserialize()
    .context("failed to deserialise settings")?;

  // CLI flags override config file and environment.
  if let Some(path) = cli.store_path {
    settings.store_path = path;
  }
  if let Some(dir) = cli.artifact_dir {
    settings.artifact_dir = dir;
  }

  // One store handle per process; every operation below borrows it.
  let store = SqliteStore::open(&settings.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", settings.store_path))?;
  let artifacts = DirArtifacts::new(&settings.artifact_dir);

  match cli.command {
    Command::Ingest { doc_id } => {
      let records = versioning::save_initial_versions(&store, &artifacts, &doc_id)
        .await
        .with_context(|| format!("ingesting {doc_id}"))?;
      for record in &records {
        tracing::info!(id = %record.id, "recorded");
      }
      println!("Initial versions for {doc_id} saved.");
    }

    Command::Save {
      doc_id,
      stage,
      text_file,
      is_final,
    } => {
      let text = match text_file {
        Some(path) => std::fs::read_to_string(&path)
          .with_context(|| format!("reading {}", path.display()))?,
        None => {
          let mut buf = String::new();
          std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading stdin")?;
          buf
        }
      };

      let version = versioning::next_version(&store, &doc_id).await?;
      let mut draft = StageDraft::new(&doc_id, version, stage, text);
      if is_final {
        draft = draft.finalized();
      }
      let record = versioning::save_stage(&store, draft).await?;
      tracing::info!(version = record.version, is_final, "stage recorded");
      println!("{}", record.id);
    }

    Command::NextVersion { doc_id } => {
      let next = versioning::next_version(&store, &doc_id).await?;
      println!("{next}");
    }

    Command::Final { doc_id } => match versioning::get_final(&store, &doc_id).await? {
      Some(record) => {
        tracing::info!(
          version = record.version,
          timestamp = %record.timestamp,
          "final record"
        );
        println!("{}", record.text);
      }
      None => {
        // An absent final is a normal outcome; the exit code is how
        // scripts branch on it.
        eprintln!("no final record for {doc_id}");
        std::process::exit(1);
      }
    },

    Command::Versions { doc_id } => {
      let records = store.query(&RecordQuery::for_doc(&doc_id)).await?;
      for r in &records {
        println!(
          "v{}\t{}\t{}\t{}{}",
          r.version,
          r.stage,
          r.timestamp.to_rfc3339(),
          r.id,
          if r.is_final { "\t[final]" } else { "" },
        );
      }
    }

    Command::Docs => {
      for doc in store.list_docs().await? {
        println!("{doc}");
      }
    }

    Command::Serve { host, port } => {
      let host = host.unwrap_or(settings.host);
      let port = port.unwrap_or(settings.port);

      let state = ApiState {
        store:     Arc::new(store),
        artifacts: Arc::new(artifacts),
      };
      let app = api_router(state).layer(TraceLayer::new_for_http());

      let address = format!("{host}:{port}");
      tracing::info!("Listening on http://{address}");
      let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;
      axum::serve(listener, app).await.context("server error")?;
    }
  }

  Ok(())
}
