pub mod cli;
mod config;
mod infrastructure;

use anyhow::{Context, Result, anyhow, bail};
use folio_config::{CONFIG_BACKEND, TomlConfigBackend};
use folio_core::domain::{MasterId, Owner};
use folio_core::services::AggregationService;
use folio_discogs::{DiscogsClient, DiscogsConfig};
use folio_storage::SqliteAggregateStore;
use folio_storage::config::StorageConfig;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::{Cli, Command};
use crate::config::{AggregationSettings, OwnerSettings};
use infrastructure::reporter::ConsoleReporter;

/// Type alias to simplify the generic signature of the Service.
type ConcreteAggregationService = AggregationService<DiscogsClient, SqliteAggregateStore, ConsoleReporter>;

/// Servicio cableado más el usuario configurado.
struct App {
  aggregation: ConcreteAggregationService,
  owner: Option<Owner>,
}

impl App {
  fn from_config() -> Result<Self> {
    // --- Dependency Injection Phase ---

    // 1. Persistence Adapter (SQLite)
    // Abre el pool y aplica las migraciones pendientes.
    let storage_cfg = StorageConfig::load().context("loading [storage] config")?;
    let store = SqliteAggregateStore::open(&storage_cfg)
      .with_context(|| format!("opening database {}", storage_cfg.db_path.display()))?;

    // 2. Catalog Adapter (Discogs HTTP)
    let discogs_cfg = DiscogsConfig::load().context("loading [discogs] config")?;
    let source = DiscogsClient::new(&discogs_cfg).context("building Discogs client")?;
    if !source.is_authenticated() {
      warn!("no Discogs credentials configured, requests will use the anonymous rate limit");
    }

    // 3. Output Port Adapter (console)
    let reporter = ConsoleReporter::new();

    // 4. Service Wiring
    let pipeline = AggregationSettings::load().context("loading [aggregation] config")?.to_pipeline();
    let aggregation = AggregationService::new(source, store, reporter, pipeline);

    let owner = OwnerSettings::load().context("loading [owner] config")?.owner();
    Ok(Self { aggregation, owner })
  }
}

/// Inicializa `tracing` hacia stderr. Sin `--verbose` manda `RUST_LOG` (por defecto `info`).
pub fn init_tracing(verbose: bool) {
  let filter = if verbose {
    EnvFilter::new("debug,hyper=info,hyper_util=info,reqwest=info")
  } else {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
  };

  tracing_subscriber::registry().with(filter).with(fmt::layer().with_writer(std::io::stderr)).init();
}

pub async fn run(cli: Cli) -> Result<()> {
  match cli.command {
    Command::Config => print_config(),
    Command::Save { master_ids } => save(&App::from_config()?, &master_ids).await,
    Command::Show { master_id } => {
      let app = App::from_config()?;
      let aggregate = app
        .aggregation
        .find_aggregate(MasterId(master_id), app.owner.as_ref())
        .await?
        .ok_or_else(|| anyhow!("no aggregate stored for master {master_id}"))?;
      println!("{}", serde_json::to_string_pretty(&aggregate)?);
      Ok(())
    }
    Command::List => {
      let app = App::from_config()?;
      for aggregate in app.aggregation.list_aggregates(app.owner.as_ref()).await? {
        let year = aggregate.year.map(|y| y.to_string()).unwrap_or_else(|| "----".into());
        println!(
          "{}\t{}\t{}\t{} tracks\t{} credits\t{} versions",
          aggregate.master_id,
          year,
          aggregate.title,
          aggregate.tracklist.len(),
          aggregate.extraartists.len(),
          aggregate.releases_ids().len()
        );
      }
      Ok(())
    }
    Command::Delete { master_id } => {
      let app = App::from_config()?;
      let id = app.aggregation.delete_aggregate(MasterId(master_id), app.owner.as_ref()).await?;
      println!("deleted aggregate {id} (master {master_id})");
      Ok(())
    }
  }
}

async fn save(app: &App, master_ids: &[u64]) -> Result<()> {
  let cancel = CancellationToken::new();
  let on_signal = cancel.clone();
  tokio::spawn(async move {
    if tokio::signal::ctrl_c().await.is_ok() {
      warn!("interrupt received, cancelling");
      on_signal.cancel();
    }
  });

  let ids: Vec<MasterId> = master_ids.iter().copied().map(MasterId).collect();
  let results = app.aggregation.run_batch(&ids, app.owner.as_ref(), &cancel).await;

  let mut failures = 0;
  for (master_id, result) in &results {
    match result {
      Ok(outcome) => {
        let verb = if outcome.created { "created" } else { "updated" };
        println!(
          "master {master_id}: {verb} aggregate {} ({} versions merged, {} failed)",
          outcome.aggregate_id,
          outcome.merged.len(),
          outcome.failed.len()
        );
        for (release_id, reason) in &outcome.failed {
          println!("  release {release_id}: {reason}");
        }
      }
      Err(err) => {
        failures += 1;
        println!("master {master_id}: {err}");
      }
    }
  }

  info!(total = results.len(), failures, "save finished");
  if failures > 0 {
    bail!("{failures} of {} masters failed", results.len());
  }
  Ok(())
}

/// Configuración efectiva, con las credenciales ocultas.
#[derive(Serialize)]
struct EffectiveConfig {
  config_file: String,
  storage: StorageConfig,
  discogs: DiscogsConfig,
  aggregation: AggregationSettings,
  owner: OwnerSettings,
}

fn redact(value: Option<String>) -> Option<String> {
  value.map(|_| "********".to_string())
}

fn print_config() -> Result<()> {
  let storage = StorageConfig::load()?;
  let effective = effective_config(&CONFIG_BACKEND, storage)?;
  println!("{}", serde_json::to_string_pretty(&effective)?);
  Ok(())
}

fn effective_config(backend: &TomlConfigBackend, storage: StorageConfig) -> Result<EffectiveConfig> {
  let mut discogs = DiscogsConfig::load_from(backend)?;
  discogs.consumer_key = redact(discogs.consumer_key);
  discogs.consumer_secret = redact(discogs.consumer_secret);
  discogs.token = redact(discogs.token);

  Ok(EffectiveConfig {
    config_file: backend.paths().config_file().display().to_string(),
    storage,
    discogs,
    aggregation: AggregationSettings::load_from(backend)?,
    owner: OwnerSettings::load_from(backend)?,
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  use folio_config::FolioPaths;
  use tempfile::tempdir;

  #[test]
  fn effective_config_redacts_discogs_secrets() {
    let tmp = tempdir().unwrap();
    let backend = TomlConfigBackend::new(FolioPaths::under(tmp.path()).unwrap());
    std::fs::write(
      backend.paths().config_file(),
      "[discogs]\nconsumer_key = \"k-123\"\nconsumer_secret = \"s-456\"\n\n[owner]\nid = \"u-1\"\n",
    )
    .unwrap();
    let storage = StorageConfig { db_path: tmp.path().join("folio.db"), pool_size: 2, journal_mode: None };

    let effective = effective_config(&backend, storage).unwrap();

    assert_eq!(effective.discogs.consumer_key.as_deref(), Some("********"));
    assert_eq!(effective.discogs.consumer_secret.as_deref(), Some("********"));
    assert_eq!(effective.owner.id.as_deref(), Some("u-1"));
    assert_eq!(effective.aggregation, AggregationSettings::default());

    let rendered = serde_json::to_string(&effective).unwrap();
    assert!(!rendered.contains("k-123") && !rendered.contains("s-456"));
    // El fichero conserva las credenciales tal cual; solo la salida las oculta.
    let written = std::fs::read_to_string(backend.paths().config_file()).unwrap();
    assert!(written.contains("k-123"));
  }

  #[test]
  fn redact_hides_only_present_secrets() {
    assert_eq!(redact(Some("secret".into())).as_deref(), Some("********"));
    assert_eq!(redact(None), None);
  }
}
