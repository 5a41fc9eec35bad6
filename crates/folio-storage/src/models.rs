use crate::StorageError;
use crate::schema::master_aggregates;

use diesel::prelude::*;
use folio_core::domain::{AggregateId, ArtistId, MasterAggregate, MasterId, Owner, ReleaseId};
use serde::Serialize;
use serde::de::DeserializeOwned;

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = master_aggregates)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AggregateRow {
  pub id: String,
  pub master_id: i64,
  pub owner_id: String,
  pub owner_email: String,
  pub title: String,
  pub year_of_release: Option<i32>,
  pub data_quality: Option<String>,
  pub genres_json: String,
  pub styles_json: String,
  pub artists_id_json: String,
  pub artists_name_json: String,
  pub releases_ids_json: String,
  pub tracklist_json: String,
  pub extraartists_json: String,
  pub companies_json: String,
  pub formats_json: String,
  pub identifiers_json: String,
  pub series_json: String,
  pub images_json: String,
  pub videos_json: String,
  pub created_at: String,
  pub updated_at: String,
}

/// Fila completa para insertar o reemplazar; `None` se escribe como NULL.
#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = master_aggregates)]
#[diesel(treat_none_as_null = true)]
pub struct NewAggregateRow {
  pub id: String,
  pub master_id: i64,
  pub owner_id: String,
  pub owner_email: String,
  pub title: String,
  pub year_of_release: Option<i32>,
  pub data_quality: Option<String>,
  pub genres_json: String,
  pub styles_json: String,
  pub artists_id_json: String,
  pub artists_name_json: String,
  pub releases_ids_json: String,
  pub tracklist_json: String,
  pub extraartists_json: String,
  pub companies_json: String,
  pub formats_json: String,
  pub identifiers_json: String,
  pub series_json: String,
  pub images_json: String,
  pub videos_json: String,
}

impl NewAggregateRow {
  pub fn from_domain(aggregate: &MasterAggregate) -> Result<Self, StorageError> {
    Ok(Self {
      id: aggregate.id.to_string(),
      master_id: to_column_id(aggregate.master_id.get())?,
      owner_id: aggregate.owner_id.clone(),
      owner_email: aggregate.owner_email.clone(),
      title: aggregate.title.clone(),
      year_of_release: aggregate.year,
      data_quality: aggregate.data_quality.clone(),
      genres_json: encode("genres", &aggregate.genres)?,
      styles_json: encode("styles", &aggregate.styles)?,
      artists_id_json: encode("artists_id", aggregate.artists_id())?,
      artists_name_json: encode("artists_name", aggregate.artists_name())?,
      releases_ids_json: encode("releases_ids", aggregate.releases_ids())?,
      tracklist_json: encode("tracklist", &aggregate.tracklist)?,
      extraartists_json: encode("extraartists", &aggregate.extraartists)?,
      companies_json: encode("companies", &aggregate.companies)?,
      formats_json: encode("formats", &aggregate.formats)?,
      identifiers_json: encode("identifiers", &aggregate.identifiers)?,
      series_json: encode("series", &aggregate.series)?,
      images_json: encode("images", &aggregate.images)?,
      videos_json: encode("videos", &aggregate.videos)?,
    })
  }
}

impl AggregateRow {
  pub fn into_domain(self) -> Result<MasterAggregate, StorageError> {
    let id = AggregateId::parse(&self.id).map_err(|e| StorageError::Decode(format!("id {:?}: {e}", self.id)))?;
    let master_id = u64::try_from(self.master_id)
      .map_err(|_| StorageError::Decode(format!("negative master_id {}", self.master_id)))?;

    let owner = Owner::new(self.owner_id, self.owner_email);
    let mut aggregate = MasterAggregate::empty(MasterId(master_id), &owner);
    aggregate.id = id;
    aggregate.title = self.title;
    aggregate.year = self.year_of_release;
    aggregate.data_quality = self.data_quality;
    aggregate.genres = decode("genres", &self.genres_json)?;
    aggregate.styles = decode("styles", &self.styles_json)?;

    let artists_id: Vec<ArtistId> = decode("artists_id", &self.artists_id_json)?;
    let artists_name: Vec<String> = decode("artists_name", &self.artists_name_json)?;
    aggregate.set_artist_columns(artists_id, artists_name).map_err(|e| StorageError::Decode(e.to_string()))?;

    let releases_ids: Vec<ReleaseId> = decode("releases_ids", &self.releases_ids_json)?;
    aggregate.set_releases_ids(releases_ids);

    aggregate.tracklist = decode("tracklist", &self.tracklist_json)?;
    aggregate.extraartists = decode("extraartists", &self.extraartists_json)?;
    aggregate.companies = decode("companies", &self.companies_json)?;
    aggregate.formats = decode("formats", &self.formats_json)?;
    aggregate.identifiers = decode("identifiers", &self.identifiers_json)?;
    aggregate.series = decode("series", &self.series_json)?;
    aggregate.images = decode("images", &self.images_json)?;
    aggregate.videos = decode("videos", &self.videos_json)?;

    Ok(aggregate)
  }
}

pub(crate) fn to_column_id(id: u64) -> Result<i64, StorageError> {
  i64::try_from(id).map_err(|_| StorageError::Decode(format!("master id {id} does not fit in a BIGINT")))
}

fn encode<T: Serialize + ?Sized>(column: &str, value: &T) -> Result<String, StorageError> {
  serde_json::to_string(value).map_err(|e| StorageError::Decode(format!("encode {column}: {e}")))
}

fn decode<T: DeserializeOwned>(column: &str, raw: &str) -> Result<T, StorageError> {
  serde_json::from_str(raw).map_err(|e| StorageError::Decode(format!("decode {column}_json: {e}")))
}
