pub mod config;
pub mod models;
pub mod schema;

use std::path::Path;

use async_trait::async_trait;
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool, PooledConnection};
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info};

use folio_core::domain::{AggregateId, MasterAggregate, MasterId, Owner};
use folio_core::ports::{AggregateStore, RepoError};

use crate::config::StorageConfig;
use crate::models::{AggregateRow, NewAggregateRow, to_column_id};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;
type DbConn = PooledConnection<ConnectionManager<SqliteConnection>>;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
  #[error("connection pool: {0}")]
  Pool(#[from] diesel::r2d2::PoolError),
  #[error("query: {0}")]
  Query(#[from] diesel::result::Error),
  #[error("migrations: {0}")]
  Migration(String),
  #[error("io: {0}")]
  Io(#[from] std::io::Error),
  #[error("corrupt row: {0}")]
  Decode(String),
  #[error("blocking task failed: {0}")]
  Join(String),
  #[error("record belongs to another owner")]
  Forbidden,
  #[error("record not found")]
  NotFound,
}

impl From<StorageError> for RepoError {
  fn from(e: StorageError) -> Self {
    match e {
      StorageError::Forbidden => RepoError::Forbidden,
      StorageError::NotFound => RepoError::NotFound,
      other => RepoError::Storage(other.to_string()),
    }
  }
}

#[derive(Debug)]
struct SqlitePragmas {
  journal_mode: Option<String>,
}

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for SqlitePragmas {
  fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
    conn.batch_execute("PRAGMA busy_timeout = 5000; PRAGMA foreign_keys = ON;").map_err(diesel::r2d2::Error::QueryError)?;
    if let Some(mode) = &self.journal_mode {
      conn.batch_execute(&format!("PRAGMA journal_mode = {mode};")).map_err(diesel::r2d2::Error::QueryError)?;
    }
    Ok(())
  }
}

/// Store de agregados sobre SQLite.
///
/// Cada agregado es una fila de `master_aggregates`; las colecciones y los
/// blobs del catálogo van serializados como JSON en columnas `*_json`.
#[derive(Clone)]
pub struct SqliteAggregateStore {
  pool: DbPool,
}

impl SqliteAggregateStore {
  pub fn open(cfg: &StorageConfig) -> Result<Self, StorageError> {
    if let Some(parent) = cfg.db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
      std::fs::create_dir_all(parent)?;
    }
    Self::open_url(&cfg.database_url(), cfg.pool_size, cfg.journal_mode.clone())
  }

  /// Abre (o crea) la base en `database_url` y aplica las migraciones pendientes.
  pub fn open_url(database_url: &str, pool_size: u32, journal_mode: Option<String>) -> Result<Self, StorageError> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    let pool = Pool::builder()
      .max_size(pool_size.max(1))
      .connection_customizer(Box::new(SqlitePragmas { journal_mode }))
      .build(manager)?;

    let mut conn = pool.get()?;
    let applied = conn.run_pending_migrations(MIGRATIONS).map_err(|e| StorageError::Migration(e.to_string()))?;
    info!(db = database_url, migrations = applied.len(), "sqlite store ready");

    Ok(Self { pool })
  }

  pub fn open_path(path: &Path) -> Result<Self, StorageError> {
    Self::open_url(&path.to_string_lossy(), 1, None)
  }

  /// Ejecuta `f` con una conexión del pool en el pool de hilos bloqueantes de tokio.
  async fn with_conn<T, F>(&self, f: F) -> Result<T, StorageError>
  where
    T: Send + 'static,
    F: FnOnce(&mut DbConn) -> Result<T, StorageError> + Send + 'static,
  {
    let pool = self.pool.clone();
    tokio::task::spawn_blocking(move || {
      let mut conn = pool.get()?;
      f(&mut conn)
    })
    .await
    .map_err(|e| StorageError::Join(e.to_string()))?
  }
}

#[async_trait]
impl AggregateStore for SqliteAggregateStore {
  async fn find_by_master_id(&self, owner: &Owner, wanted: MasterId) -> Result<Option<MasterAggregate>, RepoError> {
    let owner_key = owner.id.clone();
    let wanted = to_column_id(wanted.get())?;

    let row = self
      .with_conn(move |conn| {
        use crate::schema::master_aggregates::dsl::*;

        Ok(
          master_aggregates
            .filter(owner_id.eq(&owner_key))
            .filter(master_id.eq(wanted))
            .select(AggregateRow::as_select())
            .first(conn)
            .optional()?,
        )
      })
      .await?;

    Ok(row.map(AggregateRow::into_domain).transpose()?)
  }

  async fn upsert(&self, owner: &Owner, aggregate: &MasterAggregate) -> Result<(), RepoError> {
    if aggregate.owner_id != owner.id {
      return Err(RepoError::Forbidden);
    }
    let row = NewAggregateRow::from_domain(aggregate)?;
    let owner_key = owner.id.clone();
    debug!(aggregate_id = %aggregate.id, master_id = %aggregate.master_id, "upserting aggregate");

    self
      .with_conn(move |conn| {
        use crate::schema::master_aggregates::dsl::*;

        conn.immediate_transaction(|conn| {
          let current_owner: Option<String> =
            master_aggregates.find(&row.id).select(owner_id).first(conn).optional()?;
          if current_owner.is_some_and(|o| o != owner_key) {
            return Err(StorageError::Forbidden);
          }

          diesel::insert_into(master_aggregates).values(&row).on_conflict(id).do_update().set(&row).execute(conn)?;
          Ok(())
        })
      })
      .await?;

    Ok(())
  }

  async fn delete(&self, owner: &Owner, aggregate_id: AggregateId) -> Result<(), RepoError> {
    let owner_key = owner.id.clone();
    let key = aggregate_id.to_string();

    let deleted = self
      .with_conn(move |conn| {
        use crate::schema::master_aggregates::dsl::*;
        Ok(diesel::delete(master_aggregates.filter(id.eq(&key)).filter(owner_id.eq(&owner_key))).execute(conn)?)
      })
      .await?;

    if deleted == 0 {
      return Err(RepoError::NotFound);
    }
    Ok(())
  }

  async fn list(&self, owner: &Owner) -> Result<Vec<MasterAggregate>, RepoError> {
    let owner_key = owner.id.clone();

    let rows = self
      .with_conn(move |conn| {
        use crate::schema::master_aggregates::dsl::*;

        Ok(
          master_aggregates
            .filter(owner_id.eq(&owner_key))
            .order((title.asc(), master_id.asc()))
            .select(AggregateRow::as_select())
            .load(conn)?,
        )
      })
      .await?;

    Ok(rows.into_iter().map(AggregateRow::into_domain).collect::<Result<Vec<_>, _>>()?)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use folio_core::domain::{ArtistCredit, ArtistId, ArtistRef, Master, ReleaseId, RoleDetail, Track};
  use folio_core::domain::ExtraArtistCredit;
  use serde_json::json;
  use tempfile::tempdir;

  fn store() -> (tempfile::TempDir, SqliteAggregateStore) {
    let tmp = tempdir().unwrap();
    let store = SqliteAggregateStore::open_path(&tmp.path().join("folio.db")).unwrap();
    (tmp, store)
  }

  fn owner() -> Owner {
    Owner::new("user-1", "owner@example.com")
  }

  fn aggregate(master: u64, title: &str, owner: &Owner) -> MasterAggregate {
    let master = Master {
      id: MasterId(master),
      title: title.into(),
      year: Some(1967),
      data_quality: Some("Correct".into()),
      artists: vec![ArtistRef { id: ArtistId(31617), name: "Antonio Carlos Jobim".into() }],
      genres: vec!["Jazz".into()],
      styles: vec!["Bossa Nova".into()],
      tracklist: vec![Track::new("A1", "Wave").with_credits(vec![ArtistCredit::new(1, "Claus Ogerman", "Arranged By")])],
      main_release: Some(ReleaseId(1140581)),
      images: json!([{ "type": "primary" }]),
      videos: serde_json::Value::Null,
    };
    MasterAggregate::skeleton(&master, owner)
  }

  #[tokio::test]
  async fn upsert_then_find_round_trips_every_field() {
    let (_tmp, store) = store();
    let me = owner();
    let mut agg = aggregate(65371, "Wave", &me);
    agg.extraartists = vec![ExtraArtistCredit {
      id: ArtistId(1),
      name: "Claus Ogerman".into(),
      anv: None,
      resource_url: None,
      roles: vec![RoleDetail::new("Arranged By", Some("A1"))],
    }];
    agg.companies = json!([{ "name": "A&M Records" }]);

    store.upsert(&me, &agg).await.unwrap();
    let loaded = store.find_by_master_id(&me, MasterId(65371)).await.unwrap().unwrap();

    assert_eq!(loaded, agg);
  }

  #[tokio::test]
  async fn upsert_replaces_all_fields() {
    let (_tmp, store) = store();
    let me = owner();
    let mut agg = aggregate(65371, "Wave", &me);
    store.upsert(&me, &agg).await.unwrap();

    agg.title = "Wave (Remaster)".into();
    agg.year = None;
    agg.tracklist.clear();
    agg.record_release(ReleaseId(42));
    store.upsert(&me, &agg).await.unwrap();

    let loaded = store.find_by_master_id(&me, MasterId(65371)).await.unwrap().unwrap();
    assert_eq!(loaded.title, "Wave (Remaster)");
    assert_eq!(loaded.year, None);
    assert!(loaded.tracklist.is_empty());
    assert_eq!(loaded.releases_ids(), &[ReleaseId(1140581), ReleaseId(42)]);
    assert_eq!(store.list(&me).await.unwrap().len(), 1);
  }

  #[tokio::test]
  async fn records_are_scoped_to_their_owner() {
    let (_tmp, store) = store();
    let me = owner();
    let stranger = Owner::new("user-2", "other@example.com");
    let agg = aggregate(65371, "Wave", &me);
    store.upsert(&me, &agg).await.unwrap();

    assert!(store.find_by_master_id(&stranger, MasterId(65371)).await.unwrap().is_none());
    assert!(store.list(&stranger).await.unwrap().is_empty());
    assert!(matches!(store.delete(&stranger, agg.id).await, Err(RepoError::NotFound)));

    let mut hijacked = agg.clone();
    hijacked.owner_id = stranger.id.clone();
    assert!(matches!(store.upsert(&stranger, &hijacked).await, Err(RepoError::Forbidden)));
    assert!(matches!(store.upsert(&stranger, &agg).await, Err(RepoError::Forbidden)));
  }

  #[tokio::test]
  async fn list_is_ordered_by_title_and_delete_removes() {
    let (_tmp, store) = store();
    let me = owner();
    let wave = aggregate(65371, "Wave", &me);
    let elis = aggregate(96559, "Elis & Tom", &me);
    store.upsert(&me, &wave).await.unwrap();
    store.upsert(&me, &elis).await.unwrap();

    let titles: Vec<_> = store.list(&me).await.unwrap().into_iter().map(|a| a.title).collect();
    assert_eq!(titles, vec!["Elis & Tom", "Wave"]);

    store.delete(&me, wave.id).await.unwrap();
    assert!(store.find_by_master_id(&me, MasterId(65371)).await.unwrap().is_none());
    assert!(matches!(store.delete(&me, wave.id).await, Err(RepoError::NotFound)));
  }
}
