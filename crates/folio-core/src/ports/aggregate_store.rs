use crate::domain::{AggregateId, MasterAggregate, MasterId, Owner};

#[derive(Debug, thiserror::Error)]
pub enum RepoError {
  #[error("entity not found")]
  NotFound,
  #[error("record belongs to another owner")]
  Forbidden,
  #[error("storage error: {0}")]
  Storage(String),
}

/// Port de persistencia de agregados.
///
/// Todas las operaciones van en nombre de un `Owner` autenticado y solo ven
/// los registros de ese owner.
#[async_trait::async_trait]
pub trait AggregateStore: Send + Sync {
  /// Busca por clave natural. `Ok(None)` es "no encontrado", no un error.
  async fn find_by_master_id(&self, owner: &Owner, master_id: MasterId) -> Result<Option<MasterAggregate>, RepoError>;

  /// Inserta o reemplaza todos los campos del registro con `aggregate.id`.
  async fn upsert(&self, owner: &Owner, aggregate: &MasterAggregate) -> Result<(), RepoError>;

  async fn delete(&self, owner: &Owner, id: AggregateId) -> Result<(), RepoError>;

  /// Agregados del owner ordenados por título.
  async fn list(&self, owner: &Owner) -> Result<Vec<MasterAggregate>, RepoError>;
}
