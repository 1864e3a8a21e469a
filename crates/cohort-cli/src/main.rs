//! `cohort` command-line tool.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens an
//! in-process SQLite store, and exposes participant signup, survey
//! submission, chain history, and display export as subcommands.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use cohort_core::{
  history::{history_for, history_from},
  participant::{NewOrganization, NewParticipant},
  record::{NewDemographicRecord, SurveyFields},
  store::DemographicStore,
};
use cohort_report::{project, project_strict};
use cohort_store_sqlite::SqliteStore;
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

// ─── Configuration ───────────────────────────────────────────────────────────

fn default_store_path() -> PathBuf {
  PathBuf::from("cohort.db")
}

#[derive(Debug, Clone, Deserialize)]
struct CliConfig {
  #[serde(default = "default_store_path")]
  store_path: PathBuf,
}

// ─── Arguments ───────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(author, version, about = "Cohort participant and record tool")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Override the store path from the configuration.
  #[arg(long)]
  store: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Create an organization.
  AddOrg {
    #[arg(long)]
    name: String,
    #[arg(long)]
    url:  String,
  },

  /// Create a participant account.
  Signup {
    /// Login email address.
    #[arg(long)]
    username:     String,
    #[arg(long)]
    given_name:   String,
    #[arg(long, default_value = "")]
    middle_name:  String,
    #[arg(long)]
    family_name:  String,
    /// Organization UUID, if the account belongs to one.
    #[arg(long)]
    organization: Option<Uuid>,
  },

  /// List participant accounts.
  Participants,

  /// Submit a demographic survey for a participant.
  ///
  /// Unless `--previous` or `--no-chain` is given, the new record chains
  /// onto the participant's current latest record.
  Submit {
    #[arg(long)]
    participant: Uuid,
    /// Path to a JSON file with the survey fields.
    #[arg(long)]
    input:       PathBuf,
    /// Chain onto this record instead of the latest one.
    #[arg(long, conflicts_with = "no_chain")]
    previous:    Option<Uuid>,
    /// Start a fresh chain.
    #[arg(long)]
    no_chain:    bool,
  },

  /// Show a participant's latest record.
  Latest {
    #[arg(long)]
    participant: Uuid,
  },

  /// Walk a record chain, newest to oldest.
  History {
    /// Start at this participant's latest record.
    #[arg(long, conflicts_with = "record")]
    participant: Option<Uuid>,
    /// Start at an explicit record (e.g. a fork tip).
    #[arg(long)]
    record:      Option<Uuid>,
  },

  /// Project a record into its display form.
  Export {
    /// Export this participant's latest record.
    #[arg(long, conflicts_with = "record")]
    participant: Option<Uuid>,
    /// Export an explicit record.
    #[arg(long)]
    record:      Option<Uuid>,
    /// Fail on stale catalog codes instead of passing them through.
    #[arg(long)]
    strict:      bool,
  },
}

// ─── Entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config.clone()).required(false))
    .add_source(config::Environment::with_prefix("COHORT"))
    .build()
    .context("failed to read config file")?;

  let cli_cfg: CliConfig = settings
    .try_deserialize()
    .context("failed to deserialise CliConfig")?;

  let store_path =
    expand_tilde(cli.store.as_deref().unwrap_or(&cli_cfg.store_path));

  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  run(&store, cli.command).await
}

async fn run(store: &SqliteStore, command: Command) -> anyhow::Result<()> {
  match command {
    Command::AddOrg { name, url } => {
      let org = store.add_organization(NewOrganization { name, url }).await?;
      tracing::info!(id = %org.organization_id, "created organization");
      print_json(&org)
    }

    Command::Signup {
      username,
      given_name,
      middle_name,
      family_name,
      organization,
    } => {
      let participant = store
        .add_participant(NewParticipant {
          username,
          given_name,
          middle_name,
          family_name,
          organization_id: organization,
        })
        .await?;
      tracing::info!(id = %participant.participant_id, "created participant");
      print_json(&participant)
    }

    Command::Participants => {
      let all = store.list_participants().await?;
      print_json(&all)
    }

    Command::Submit {
      participant,
      input,
      previous,
      no_chain,
    } => {
      let raw = std::fs::read_to_string(&input)
        .with_context(|| format!("failed to read {input:?}"))?;
      let fields: SurveyFields =
        serde_json::from_str(&raw).context("failed to parse survey fields")?;

      let previous = if no_chain {
        None
      } else if previous.is_some() {
        previous
      } else {
        store.latest_for(participant).await?.map(|r| r.record_id)
      };

      let mut new_record = NewDemographicRecord::new(participant, fields);
      new_record.previous = previous;

      let record = store.create_record(new_record).await?;
      tracing::info!(
        id = %record.record_id,
        previous = ?record.previous,
        "created record"
      );
      print_json(&record)
    }

    Command::Latest { participant } => {
      let latest = store
        .latest_for(participant)
        .await?
        .with_context(|| format!("participant {participant} has no records"))?;
      print_json(&latest)
    }

    Command::History {
      participant,
      record,
    } => {
      let history = match (participant, record) {
        (Some(participant), None) => history_for(store, participant).await?,
        (None, Some(record)) => history_from(store, record).await?,
        _ => anyhow::bail!("pass exactly one of --participant or --record"),
      };
      let records = history.collect().await?;
      print_json(&records)
    }

    Command::Export {
      participant,
      record,
      strict,
    } => {
      let record = match (participant, record) {
        (Some(participant), None) => store
          .latest_for(participant)
          .await?
          .with_context(|| format!("participant {participant} has no records"))?,
        (None, Some(record)) => store.get_record(record).await?,
        _ => anyhow::bail!("pass exactly one of --participant or --record"),
      };

      if strict {
        return print_json(&project_strict(&record)?);
      }

      let projection = project(&record);
      for stale in &projection.unresolved {
        tracing::warn!(
          field = %stale.field,
          code = %stale.code,
          "stale catalog code; exporting raw code"
        );
      }
      print_json(&projection.display)
    }
  }
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  println!("{}", serde_json::to_string_pretty(value)?);
  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
