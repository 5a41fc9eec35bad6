use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::catalog::{ArtistRef, Master};
use crate::domain::credit::ExtraArtistCredit;
use crate::domain::ids::{AggregateId, ArtistId, MasterId, ReleaseId};
use crate::domain::track::Track;
use crate::errors::CoreError;

/// Usuario autenticado en cuyo nombre se ejecuta una operación.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
  pub id: String,
  pub email: String,
}

impl Owner {
  pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
    Self { id: id.into(), email: email.into() }
  }
}

/// Registro canónico y persistido de un master del catálogo.
///
/// Fusiona en un solo documento el master y todas las versiones que se han ido
/// incorporando: tracklist deduplicado, créditos agregados y los blobs opacos
/// del catálogo (companies, formats, identifiers, series, images, videos).
///
/// Invariantes:
/// - `artists_id` y `artists_name` tienen la misma longitud y van indexados en paralelo.
/// - `releases_ids` no contiene duplicados.
///
/// Por eso esos tres campos solo se modifican a través de métodos.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasterAggregate {
  pub id: AggregateId,
  pub owner_id: String,
  pub owner_email: String,

  /// Clave natural: id del master en el catálogo.
  pub master_id: MasterId,

  pub title: String,
  pub year: Option<i32>,
  pub data_quality: Option<String>,
  pub genres: Vec<String>,
  pub styles: Vec<String>,

  artists_id: Vec<ArtistId>,
  artists_name: Vec<String>,
  releases_ids: Vec<ReleaseId>,

  pub tracklist: Vec<Track>,
  pub extraartists: Vec<ExtraArtistCredit>,

  // --- Blobs opacos del catálogo ("el JSON más grande gana") ---
  pub companies: Value,
  pub formats: Value,
  pub identifiers: Value,
  pub series: Value,
  pub images: Value,
  pub videos: Value,
}

impl MasterAggregate {
  /// Agregado vacío para un master, con un id canónico nuevo.
  pub fn empty(master_id: MasterId, owner: &Owner) -> Self {
    Self {
      id: AggregateId::new(),
      owner_id: owner.id.clone(),
      owner_email: owner.email.clone(),
      master_id,
      title: String::new(),
      year: None,
      data_quality: None,
      genres: Vec::new(),
      styles: Vec::new(),
      artists_id: Vec::new(),
      artists_name: Vec::new(),
      releases_ids: Vec::new(),
      tracklist: Vec::new(),
      extraartists: Vec::new(),
      companies: Value::Array(Vec::new()),
      formats: Value::Array(Vec::new()),
      identifiers: Value::Array(Vec::new()),
      series: Value::Array(Vec::new()),
      images: Value::Array(Vec::new()),
      videos: Value::Array(Vec::new()),
    }
  }

  /// Esqueleto creado la primera vez que se pide un master que no está en el store.
  ///
  /// Copia los metadatos del master, marca su tracklist como canónico y siembra
  /// `releases_ids` con la edición principal, si la hay.
  pub fn skeleton(master: &Master, owner: &Owner) -> Self {
    let mut aggregate = Self::empty(master.id, owner);

    aggregate.title = master.title.clone();
    aggregate.year = master.year;
    aggregate.data_quality = master.data_quality.clone();
    aggregate.genres = dedup_labels(&master.genres);
    aggregate.styles = dedup_labels(&master.styles);
    aggregate.set_artists(&master.artists);

    if let Some(main) = master.main_release.filter(|id| id.is_set()) {
      aggregate.record_release(main);
    }

    aggregate.tracklist = master.tracklist.clone();
    aggregate.tracklist.iter_mut().for_each(Track::mark_on_master);

    if !master.images.is_null() {
      aggregate.images = master.images.clone();
    }
    if !master.videos.is_null() {
      aggregate.videos = master.videos.clone();
    }

    aggregate
  }

  pub fn artists_id(&self) -> &[ArtistId] {
    &self.artists_id
  }

  pub fn artists_name(&self) -> &[String] {
    &self.artists_name
  }

  /// Artistas principales como pares `(id, nombre)`.
  pub fn artists(&self) -> impl Iterator<Item = (ArtistId, &str)> {
    self.artists_id.iter().copied().zip(self.artists_name.iter().map(String::as_str))
  }

  pub fn set_artists(&mut self, artists: &[ArtistRef]) {
    self.artists_id = artists.iter().map(|a| a.id).collect();
    self.artists_name = artists.iter().map(|a| a.name.clone()).collect();
  }

  /// Restaura las dos columnas paralelas de artistas (p. ej. desde el store).
  pub fn set_artist_columns(&mut self, ids: Vec<ArtistId>, names: Vec<String>) -> Result<(), CoreError> {
    if ids.len() != names.len() {
      return Err(CoreError::Invalid(format!(
        "artists_id has {} entries but artists_name has {}",
        ids.len(),
        names.len()
      )));
    }
    self.artists_id = ids;
    self.artists_name = names;
    Ok(())
  }

  pub fn releases_ids(&self) -> &[ReleaseId] {
    &self.releases_ids
  }

  pub fn contains_release(&self, id: ReleaseId) -> bool {
    self.releases_ids.contains(&id)
  }

  /// Registra una edición como incorporada. Devuelve `false` si ya lo estaba.
  pub fn record_release(&mut self, id: ReleaseId) -> bool {
    if self.contains_release(id) {
      return false;
    }
    self.releases_ids.push(id);
    true
  }

  /// Reemplaza la lista de ediciones, descartando duplicados (gana la primera aparición).
  pub fn set_releases_ids(&mut self, ids: impl IntoIterator<Item = ReleaseId>) {
    self.releases_ids.clear();
    for id in ids {
      self.record_release(id);
    }
  }
}

fn dedup_labels(labels: &[String]) -> Vec<String> {
  let mut out: Vec<String> = Vec::with_capacity(labels.len());
  for label in labels {
    if !out.contains(label) {
      out.push(label.clone());
    }
  }
  out
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn master() -> Master {
    Master {
      id: MasterId(96559),
      title: "Elis & Tom".into(),
      year: Some(1974),
      data_quality: Some("Correct".into()),
      artists: vec![
        ArtistRef { id: ArtistId(30703), name: "Elis Regina".into() },
        ArtistRef { id: ArtistId(31617), name: "Antonio Carlos Jobim".into() },
      ],
      genres: vec!["Jazz".into(), "Latin".into(), "Jazz".into()],
      styles: vec!["Bossa Nova".into()],
      tracklist: vec![Track::new("A1", "Águas De Março"), Track::new("A2", "Pois É")],
      main_release: Some(ReleaseId(1143457)),
      images: json!([{ "type": "primary", "uri": "" }]),
      videos: Value::Null,
    }
  }

  #[test]
  fn skeleton_copies_master_and_marks_tracks() {
    let owner = Owner::new("u-1", "owner@example.com");
    let agg = MasterAggregate::skeleton(&master(), &owner);

    assert_eq!(agg.master_id, MasterId(96559));
    assert_eq!(agg.owner_id, "u-1");
    assert_eq!(agg.genres, vec!["Jazz".to_string(), "Latin".to_string()]);
    assert_eq!(agg.artists_id().len(), agg.artists_name().len());
    assert_eq!(agg.releases_ids(), &[ReleaseId(1143457)]);
    assert!(agg.tracklist.iter().all(|t| t.is_on_master == Some(true) && t.extra_track == Some(false)));
    assert_eq!(agg.images, json!([{ "type": "primary", "uri": "" }]));
    assert_eq!(agg.videos, json!([]));
    assert!(agg.extraartists.is_empty());
  }

  #[test]
  fn skeleton_without_main_release_has_no_release_ids() {
    let mut m = master();
    m.main_release = None;
    let agg = MasterAggregate::skeleton(&m, &Owner::new("u", "e"));
    assert!(agg.releases_ids().is_empty());
  }

  #[test]
  fn record_release_is_idempotent() {
    let mut agg = MasterAggregate::empty(MasterId(1), &Owner::new("u", "e"));
    assert!(agg.record_release(ReleaseId(10)));
    assert!(!agg.record_release(ReleaseId(10)));
    agg.set_releases_ids([ReleaseId(3), ReleaseId(4), ReleaseId(3)]);
    assert_eq!(agg.releases_ids(), &[ReleaseId(3), ReleaseId(4)]);
  }

  #[test]
  fn artist_columns_must_line_up() {
    let mut agg = MasterAggregate::empty(MasterId(1), &Owner::new("u", "e"));
    let err = agg.set_artist_columns(vec![ArtistId(1), ArtistId(2)], vec!["A".into()]);
    assert!(matches!(err, Err(CoreError::Invalid(_))));
    assert!(agg.artists_id().is_empty());
  }
}
