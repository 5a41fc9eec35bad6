//! Objetos tal como los entrega el catálogo externo (la fuente de datos).
//!
//! Son de solo lectura para el núcleo: el pipeline los consume para construir
//! o actualizar un [`MasterAggregate`](crate::domain::aggregate::MasterAggregate).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::credit::ArtistCredit;
use crate::domain::ids::{ArtistId, MasterId, ReleaseId};
use crate::domain::track::Track;

/// Artista principal de un master o release.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistRef {
  pub id: ArtistId,
  pub name: String,
}

/// Representación canónica de una obra en el catálogo, independiente de cualquier edición.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Master {
  pub id: MasterId,
  pub title: String,
  pub year: Option<i32>,
  pub data_quality: Option<String>,
  pub artists: Vec<ArtistRef>,
  pub genres: Vec<String>,
  pub styles: Vec<String>,
  pub tracklist: Vec<Track>,
  /// Edición designada como "principal" por el catálogo.
  pub main_release: Option<ReleaseId>,
  pub images: Value,
  pub videos: Value,
}

/// Una edición concreta (prensaje) de un master, con su propio tracklist y créditos.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Release {
  pub id: ReleaseId,
  pub title: String,
  pub master_id: Option<MasterId>,
  pub artists: Vec<ArtistRef>,
  /// Créditos a nivel de release.
  pub extraartists: Vec<ArtistCredit>,
  pub tracklist: Vec<Track>,
  pub notes: Option<String>,
  pub companies: Value,
  pub formats: Value,
  pub identifiers: Value,
  pub series: Value,
  pub images: Value,
  pub videos: Value,
}

/// Referencia ligera a una versión de un master. Solo vive durante una ejecución
/// del pipeline, para guiar el bucle de descargas.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseVersionRef {
  pub id: ReleaseId,
  pub title: String,
  pub thumb: Option<String>,
  pub format: Option<String>,
  pub label: Option<String>,
  pub country: Option<String>,
  pub released: Option<String>,
}
