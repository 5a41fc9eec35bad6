use serde::{Deserialize, Serialize};

use crate::domain::ids::ArtistId;

/// Crédito de un artista tal como lo publica el catálogo, a nivel de release
/// o de pista.
///
/// Es la materia prima de [`ExtraArtistCredit`]: aquí cada entrada lleva un solo
/// rol y puede repetirse para el mismo artista.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistCredit {
  /// Id del artista en el catálogo; `0` significa que no vino informado.
  #[serde(default)]
  pub id: ArtistId,

  #[serde(default)]
  pub name: String,

  /// Variación de nombre usada en este release (ANV).
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub anv: Option<String>,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub join: Option<String>,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub role: Option<String>,

  /// Alcance libre del crédito (`"A1, A2"`); vacío significa todo el release.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub tracks: Option<String>,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub resource_url: Option<String>,
}

impl ArtistCredit {
  pub fn new(id: u64, name: impl Into<String>, role: impl Into<String>) -> Self {
    Self { id: ArtistId(id), name: name.into(), role: Some(role.into()), ..Default::default() }
  }
}

/// Un rol concreto dentro de un [`ExtraArtistCredit`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoleDetail {
  pub role: String,

  /// Pistas a las que aplica el rol. `None` = todo el release.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub tracks: Option<String>,
}

impl RoleDetail {
  pub fn new(role: impl Into<String>, tracks: Option<&str>) -> Self {
    let tracks = tracks.map(str::trim).filter(|t| !t.is_empty()).map(str::to_owned);
    Self { role: role.into(), tracks }
  }

  /// Alcance normalizado: cadena vacía cuando el rol cubre todo el release.
  pub fn scope(&self) -> &str {
    self.tracks.as_deref().map(str::trim).unwrap_or("")
  }

  /// Dos roles son el mismo si coinciden etiqueta y alcance.
  pub fn same_as(&self, other: &RoleDetail) -> bool {
    self.role == other.role && self.scope() == other.scope()
  }
}

/// Participación de un artista en el agregado, con todos sus roles deduplicados.
///
/// Es único por `id` dentro de un `MasterAggregate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraArtistCredit {
  pub id: ArtistId,

  #[serde(default)]
  pub name: String,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub anv: Option<String>,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub resource_url: Option<String>,

  #[serde(default)]
  pub roles: Vec<RoleDetail>,
}

impl ExtraArtistCredit {
  pub fn has_role(&self, detail: &RoleDetail) -> bool {
    self.roles.iter().any(|r| r.same_as(detail))
  }
}
