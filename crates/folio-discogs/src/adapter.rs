use async_trait::async_trait;
use tracing::debug;

use folio_core::domain::{Master, MasterId, Release, ReleaseId, ReleaseVersionRef};
use folio_core::ports::catalog::{CatalogSource, SourceError};

use crate::client::{DiscogsClient, DiscogsError};

#[async_trait]
impl CatalogSource for DiscogsClient {
  async fn get_master(&self, id: MasterId) -> Result<Master, SourceError> {
    let master = self.master(id.get()).await.map_err(map_discogs_error)?;
    Ok(master.into())
  }

  async fn list_versions(
    &self,
    master_id: MasterId,
    page: u32,
    per_page: u32,
  ) -> Result<Vec<ReleaseVersionRef>, SourceError> {
    let page = self.master_versions(master_id.get(), page, per_page).await.map_err(map_discogs_error)?;
    debug!(
      %master_id,
      page = page.pagination.page,
      pages = page.pagination.pages,
      items = page.pagination.items,
      "versions page decoded"
    );
    Ok(page.versions.into_iter().map(ReleaseVersionRef::from).collect())
  }

  async fn get_release(&self, id: ReleaseId) -> Result<Release, SourceError> {
    let release = self.release(id.get()).await.map_err(map_discogs_error)?;
    Ok(release.into())
  }
}

fn map_discogs_error(err: DiscogsError) -> SourceError {
  match err {
    DiscogsError::Request(e) => SourceError::Network(e.to_string()),
    DiscogsError::NotFound(what) => SourceError::NotFound(what),
    DiscogsError::RateLimit => SourceError::RateLimited,
    DiscogsError::Status { status, body } => SourceError::Http(status, body),
    DiscogsError::Decode { path, source } => SourceError::Malformed(format!("{path}: {source}")),
  }
}
