use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::domain::{AggregateId, MasterAggregate, MasterId, Owner, Release, ReleaseId, ReleaseVersionRef};
use crate::errors::CoreError;
use crate::ports::{AggregateStore, CatalogSource, ProgressReporter};
use crate::services::credit_aggregator::CreditAggregator;
use crate::services::passthrough::absorb_blobs;
use crate::services::run_state::{LogLevel, RunPhase, RunState, milestones};
use crate::services::track_merger::{MatchStrategy, TrackMerger};

/// Parámetros de una ejecución del pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
  /// Pausa entre dos versiones consecutivas (y antes de cada página extra de versiones).
  pub version_delay: Duration,
  /// Límite de cada llamada al catálogo o al store. `None` = sin límite.
  ///
  /// Al vencer solo se abandona la espera: una escritura del store que ya
  /// estaba en curso puede terminar igualmente y dejar la fila guardada
  /// aunque la ejecución acabe en `Failed`.
  pub call_timeout: Option<Duration>,
  pub versions_per_page: u32,
  pub max_version_pages: u32,
  pub match_strategy: MatchStrategy,
  /// Guarda el esqueleto en cuanto se crea, antes de listar versiones.
  pub persist_skeleton: bool,
}

impl Default for PipelineConfig {
  fn default() -> Self {
    Self {
      version_delay: Duration::from_millis(600),
      call_timeout: Some(Duration::from_secs(60)),
      versions_per_page: 10,
      max_version_pages: 1,
      match_strategy: MatchStrategy::TitleOrPosition,
      persist_skeleton: true,
    }
  }
}

/// Resultado de una ejecución que terminó en `Done`.
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
  pub aggregate_id: AggregateId,
  pub master_id: MasterId,
  /// `true` si el agregado no existía y se creó en esta ejecución.
  pub created: bool,
  /// Versiones incorporadas, en orden de proceso.
  pub merged: Vec<ReleaseId>,
  /// Versiones que no se pudieron descargar, con el motivo.
  pub failed: Vec<(ReleaseId, String)>,
  pub state: RunState,
}

/// Construye o actualiza el agregado canónico de un master.
///
/// Flujo de una ejecución:
/// - carga el agregado del store (o crea el esqueleto a partir del master)
/// - lista las versiones del master
/// - descarga y fusiona cada versión, una a una, con una pausa entre ellas
/// - guarda el agregado final
///
/// Dos ejecuciones sobre el mismo master nunca se solapan.
pub struct AggregationService<S, R, P>
where
  S: CatalogSource,
  R: AggregateStore,
  P: ProgressReporter,
{
  source: S,
  store: R,
  reporter: P,
  config: PipelineConfig,
  merger: TrackMerger,
  locks: Mutex<HashMap<MasterId, Arc<tokio::sync::Mutex<()>>>>,
}

impl<S, R, P> AggregationService<S, R, P>
where
  S: CatalogSource,
  R: AggregateStore,
  P: ProgressReporter,
{
  pub fn new(source: S, store: R, reporter: P, config: PipelineConfig) -> Self {
    let merger = TrackMerger::new(config.match_strategy);
    Self { source, store, reporter, config, merger, locks: Mutex::new(HashMap::new()) }
  }

  pub fn config(&self) -> &PipelineConfig {
    &self.config
  }

  pub fn source(&self) -> &S {
    &self.source
  }

  pub fn store(&self) -> &R {
    &self.store
  }

  /// Ejecuta el pipeline completo para `master_id`.
  ///
  /// Los errores de precondición se devuelven antes de tocar el catálogo o el
  /// store. Cualquier otro error fatal llega como [`CoreError::PhaseFailed`].
  pub async fn run(
    &self,
    master_id: MasterId,
    owner: Option<&Owner>,
    cancel: &CancellationToken,
  ) -> Result<RunOutcome, CoreError> {
    let owner = authorize(master_id, owner)?;

    let lock = self.master_lock(master_id);
    let _guard = tokio::select! {
      biased;
      _ = cancel.cancelled() => return Err(CoreError::Cancelled),
      guard = lock.lock() => guard,
    };

    let mut run = Run { master_id, started: Instant::now(), state: RunState::default(), reporter: &self.reporter };
    self.reporter.start(master_id).await;
    info!(%master_id, owner = %owner.id, "aggregation run started");

    match self.drive(&mut run, owner, cancel).await {
      Ok(mut outcome) => {
        run.set(RunPhase::Done, milestones::DONE).await;
        run.log(LogLevel::Info, "aggregate saved").await;
        self.reporter.finish(master_id, &run.state).await;
        info!(
          %master_id,
          aggregate_id = %outcome.aggregate_id,
          merged = outcome.merged.len(),
          failed = outcome.failed.len(),
          "aggregation run finished"
        );
        outcome.state = run.state;
        Ok(outcome)
      }
      Err(err) => {
        let phase = run.state.phase;
        warn!(%master_id, %phase, error = %err, "aggregation run failed");
        run.log(LogLevel::Error, format!("{phase} failed: {err}")).await;
        let percent = run.state.percent;
        run.set(RunPhase::Failed, percent).await;
        self.reporter.finish(master_id, &run.state).await;
        Err(err.in_phase(phase))
      }
    }
  }

  /// Ejecuta el pipeline para varios masters, uno detrás de otro.
  ///
  /// Un master fallido no detiene el lote; una cancelación sí, y los masters
  /// restantes se devuelven como cancelados.
  pub async fn run_batch(
    &self,
    master_ids: &[MasterId],
    owner: Option<&Owner>,
    cancel: &CancellationToken,
  ) -> Vec<(MasterId, Result<RunOutcome, CoreError>)> {
    let mut results = Vec::with_capacity(master_ids.len());

    for &master_id in master_ids {
      if cancel.is_cancelled() {
        results.push((master_id, Err(CoreError::Cancelled)));
        continue;
      }
      let result = self.run(master_id, owner, cancel).await;
      if let Err(err) = &result {
        warn!(%master_id, error = %err, "batch entry failed, continuing");
      }
      results.push((master_id, result));
    }

    results
  }

  pub async fn find_aggregate(
    &self,
    master_id: MasterId,
    owner: Option<&Owner>,
  ) -> Result<Option<MasterAggregate>, CoreError> {
    let owner = authorize(master_id, owner)?;
    Ok(self.store.find_by_master_id(owner, master_id).await?)
  }

  pub async fn list_aggregates(&self, owner: Option<&Owner>) -> Result<Vec<MasterAggregate>, CoreError> {
    let owner = owner.filter(|o| !o.id.trim().is_empty()).ok_or(CoreError::Unauthenticated)?;
    Ok(self.store.list(owner).await?)
  }

  /// Borra el agregado guardado para `master_id`. Devuelve su id canónico.
  pub async fn delete_aggregate(&self, master_id: MasterId, owner: Option<&Owner>) -> Result<AggregateId, CoreError> {
    let owner = authorize(master_id, owner)?;

    let lock = self.master_lock(master_id);
    let _guard = lock.lock().await;

    let aggregate = self.store.find_by_master_id(owner, master_id).await?.ok_or(CoreError::NotFound)?;
    self.store.delete(owner, aggregate.id).await?;
    info!(%master_id, aggregate_id = %aggregate.id, "aggregate deleted");
    Ok(aggregate.id)
  }

  async fn drive(&self, run: &mut Run<'_, P>, owner: &Owner, cancel: &CancellationToken) -> Result<RunOutcome, CoreError> {
    let master_id = run.master_id;

    // 1) Cargar o crear
    run.set(RunPhase::LoadingAggregate, 0.0).await;
    let (mut aggregate, created) = self.load_or_create(run, owner, cancel).await?;

    // 2) Listar versiones
    run.set(RunPhase::ListingVersions, run.state.percent).await;
    let versions = self.list_versions(master_id, cancel).await?;
    run.log(LogLevel::Info, format!("{} versions to merge", versions.len())).await;
    run.set(RunPhase::ListingVersions, milestones::LISTED).await;

    // 3) Fusionar versión a versión
    let total = versions.len();
    let step = if total == 0 { 0.0 } else { milestones::VERSIONS_SPAN / total as f32 };
    let mut merged = Vec::with_capacity(total);
    let mut failed = Vec::new();

    for (i, version) in versions.iter().enumerate() {
      if i > 0 {
        self.pause(cancel).await?;
      }
      run.set(RunPhase::MergingVersion { index: i + 1, total }, run.state.percent).await;

      match self.call(cancel, "get_release", self.source.get_release(version.id)).await {
        Ok(Ok(release)) => {
          self.fold(&mut aggregate, &release);
          debug!(
            %master_id,
            release_id = %release.id,
            tracks = aggregate.tracklist.len(),
            credits = aggregate.extraartists.len(),
            "version folded"
          );
          run.log(LogLevel::Info, format!("merged release {} ({})", version.id, version.title)).await;
          merged.push(version.id);
        }
        Err(err) if err.is_cancelled() => return Err(err),
        Ok(Err(err)) => self.skip_version(run, &mut failed, version, err.into()).await,
        Err(err) => self.skip_version(run, &mut failed, version, err).await,
      }

      run.set(RunPhase::MergingVersion { index: i + 1, total }, milestones::LISTED + step * (i + 1) as f32).await;
    }
    let phase = run.state.phase;
    run.set(phase, milestones::MERGED).await;

    // 4) Guardar
    run.set(RunPhase::Saving, run.state.percent).await;
    self.call(cancel, "upsert", self.store.upsert(owner, &aggregate)).await??;
    run.set(RunPhase::Saving, milestones::SAVED).await;

    Ok(RunOutcome {
      aggregate_id: aggregate.id,
      master_id,
      created,
      merged,
      failed,
      state: RunState::default(),
    })
  }

  async fn load_or_create(
    &self,
    run: &mut Run<'_, P>,
    owner: &Owner,
    cancel: &CancellationToken,
  ) -> Result<(MasterAggregate, bool), CoreError> {
    let master_id = run.master_id;

    if let Some(existing) = self.call(cancel, "find_by_master_id", self.store.find_by_master_id(owner, master_id)).await??
    {
      run.log(LogLevel::Info, format!("loaded aggregate {} ({})", existing.id, existing.title)).await;
      run.set(RunPhase::LoadingAggregate, milestones::LOADED).await;
      return Ok((existing, false));
    }

    let master = self.call(cancel, "get_master", self.source.get_master(master_id)).await??;
    let skeleton = MasterAggregate::skeleton(&master, owner);
    run.log(LogLevel::Info, format!("created skeleton for \"{}\"", skeleton.title)).await;
    run.set(RunPhase::LoadingAggregate, milestones::LOADED).await;

    if self.config.persist_skeleton {
      self.call(cancel, "upsert", self.store.upsert(owner, &skeleton)).await??;
      debug!(%master_id, aggregate_id = %skeleton.id, "skeleton persisted");
      run.set(RunPhase::LoadingAggregate, milestones::SKELETON_SAVED).await;
    }

    Ok((skeleton, true))
  }

  async fn list_versions(
    &self,
    master_id: MasterId,
    cancel: &CancellationToken,
  ) -> Result<Vec<ReleaseVersionRef>, CoreError> {
    let per_page = self.config.versions_per_page.max(1);
    let mut seen = HashSet::new();
    let mut versions = Vec::new();

    for page in 1..=self.config.max_version_pages.max(1) {
      if page > 1 {
        self.pause(cancel).await?;
      }
      let batch = self.call(cancel, "list_versions", self.source.list_versions(master_id, page, per_page)).await??;
      let full = batch.len() >= per_page as usize;
      debug!(%master_id, page, count = batch.len(), "versions page fetched");

      versions.extend(batch.into_iter().filter(|v| v.id.is_set() && seen.insert(v.id)));
      if !full {
        break;
      }
    }

    Ok(versions)
  }

  fn fold(&self, aggregate: &mut MasterAggregate, release: &Release) {
    aggregate.record_release(release.id);
    aggregate.tracklist = self.merger.merge(&aggregate.tracklist, &release.tracklist);
    aggregate.extraartists = CreditAggregator.aggregate(aggregate, std::slice::from_ref(release));
    absorb_blobs(aggregate, release);
  }

  async fn skip_version(
    &self,
    run: &mut Run<'_, P>,
    failed: &mut Vec<(ReleaseId, String)>,
    version: &ReleaseVersionRef,
    err: CoreError,
  ) {
    warn!(master_id = %run.master_id, release_id = %version.id, error = %err, "version skipped");
    run.log(LogLevel::Warn, format!("release {} skipped: {err}", version.id)).await;
    failed.push((version.id, err.to_string()));
  }

  async fn pause(&self, cancel: &CancellationToken) -> Result<(), CoreError> {
    tokio::select! {
      biased;
      _ = cancel.cancelled() => Err(CoreError::Cancelled),
      _ = tokio::time::sleep(self.config.version_delay) => Ok(()),
    }
  }

  /// Espera `fut` respetando la cancelación y el límite de tiempo configurado.
  async fn call<T>(
    &self,
    cancel: &CancellationToken,
    what: &'static str,
    fut: impl Future<Output = T>,
  ) -> Result<T, CoreError> {
    let bounded = async {
      match self.config.call_timeout {
        Some(limit) => tokio::time::timeout(limit, fut).await.map_err(|_| CoreError::TimedOut(what.to_owned())),
        None => Ok(fut.await),
      }
    };

    tokio::select! {
      biased;
      _ = cancel.cancelled() => Err(CoreError::Cancelled),
      result = bounded => result,
    }
  }

  fn master_lock(&self, master_id: MasterId) -> Arc<tokio::sync::Mutex<()>> {
    let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
    locks.retain(|_, lock| Arc::strong_count(lock) > 1);
    locks.entry(master_id).or_default().clone()
  }
}

fn authorize(master_id: MasterId, owner: Option<&Owner>) -> Result<&Owner, CoreError> {
  if !master_id.is_set() {
    return Err(CoreError::Precondition("master id is required".into()));
  }
  owner.filter(|o| !o.id.trim().is_empty()).ok_or(CoreError::Unauthenticated)
}

/// Estado en curso de una ejecución y su canal hacia el reporter.
struct Run<'a, P: ProgressReporter> {
  master_id: MasterId,
  started: Instant,
  state: RunState,
  reporter: &'a P,
}

impl<P: ProgressReporter> Run<'_, P> {
  async fn set(&mut self, phase: RunPhase, percent: f32) {
    self.state.advance(phase, percent);
    self.reporter.on_phase(self.master_id, self.state.phase, self.state.percent).await;
  }

  async fn log(&mut self, level: LogLevel, message: impl Into<String>) {
    let entry = self.state.push_log(self.started.elapsed(), level, message);
    self.reporter.on_log(self.master_id, entry).await;
  }
}
