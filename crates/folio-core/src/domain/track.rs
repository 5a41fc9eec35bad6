use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::credit::ArtistCredit;

/// Una posición dentro de un tracklist.
///
/// El formato sigue al del catálogo externo (`position`, `title`, `duration`,
/// `type_`, `extraartists`) para que un tracklist recibido del catálogo pueda
/// guardarse tal cual dentro del agregado. Los campos que el motor de merge no
/// interpreta se conservan en `other`.
///
/// Dentro de un tracklist, el par `(position, title)` identifica la pista a
/// efectos de merge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Track {
  /// Clave de orden / agrupación (`"A1"`, `"2-05"`, …). No necesariamente numérica.
  #[serde(default)]
  pub position: String,

  #[serde(default)]
  pub title: String,

  /// Duración tal como la publica el catálogo (`"3:21"`); puede venir vacía.
  #[serde(default)]
  pub duration: String,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub type_: Option<String>,

  /// Créditos de artista asociados directamente a esta pista.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub extraartists: Option<Vec<ArtistCredit>>,

  /// `true` si la pista pertenece al tracklist canónico del master.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub is_on_master: Option<bool>,

  /// `true` si la pista la introdujo una edición y no forma parte de la obra canónica.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub extra_track: Option<bool>,

  #[serde(flatten)]
  pub other: Map<String, Value>,
}

impl Track {
  pub fn new(position: impl Into<String>, title: impl Into<String>) -> Self {
    Self { position: position.into(), title: title.into(), ..Default::default() }
  }

  pub fn with_credits(mut self, credits: Vec<ArtistCredit>) -> Self {
    self.extraartists = Some(credits);
    self
  }

  /// Número de créditos que la pista lleva consigo (0 si no trae ninguno).
  pub fn credit_count(&self) -> usize {
    self.extraartists.as_ref().map_or(0, Vec::len)
  }

  /// Texto que identifica la pista en un crédito: la posición, o el título si no hay posición.
  pub fn scope(&self) -> &str {
    if self.position.is_empty() { &self.title } else { &self.position }
  }

  /// Marca la pista como parte del tracklist canónico del master.
  pub fn mark_on_master(&mut self) {
    self.is_on_master = Some(true);
    self.extra_track = Some(false);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn keeps_unknown_catalog_fields() {
    let raw = r#"{"position":"A1","type_":"track","title":"Dá Sorte","duration":"","sub_tracks":[]}"#;
    let track: Track = serde_json::from_str(raw).unwrap();

    assert_eq!(track.position, "A1");
    assert_eq!(track.type_.as_deref(), Some("track"));
    assert!(track.other.contains_key("sub_tracks"));

    let back = serde_json::to_value(&track).unwrap();
    assert_eq!(back["sub_tracks"], serde_json::json!([]));
    assert!(back.get("extra_track").is_none());
  }

  #[test]
  fn scope_falls_back_to_title() {
    assert_eq!(Track::new("B2", "Lamento").scope(), "B2");
    assert_eq!(Track::new("", "Lamento").scope(), "Lamento");
  }
}
