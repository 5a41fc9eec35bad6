use crate::domain::{Master, MasterId, Release, ReleaseId, ReleaseVersionRef};

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("network error: {0}")]
  Network(String),

  #[error("http {0}: {1}")]
  Http(u16, String),

  #[error("rate limited by upstream")]
  RateLimited,

  #[error("malformed payload: {0}")]
  Malformed(String),
}

/// Port del catálogo externo: solo lectura, paginado y con límite de peticiones.
///
/// El pipeline trata cualquier `SourceError` como un único "fetch failed"; la
/// distinción entre variantes solo sirve para los logs.
#[async_trait::async_trait]
pub trait CatalogSource: Send + Sync {
  async fn get_master(&self, id: MasterId) -> Result<Master, SourceError>;

  /// Una página de versiones del master. `page` empieza en 1.
  async fn list_versions(
    &self,
    master_id: MasterId,
    page: u32,
    per_page: u32,
  ) -> Result<Vec<ReleaseVersionRef>, SourceError>;

  async fn get_release(&self, id: ReleaseId) -> Result<Release, SourceError>;
}
