use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identificador canónico de un agregado (`MasterAggregate`).
///
/// Se genera una sola vez, cuando el master se registra por primera vez,
/// y no depende de ninguna fuente externa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AggregateId(Uuid);

impl AggregateId {
  /// Genera un nuevo identificador único.
  pub fn new() -> Self {
    AggregateId(Uuid::new_v4())
  }

  /// Construye un `AggregateId` a partir de un `Uuid` existente.
  pub fn from_uuid(u: Uuid) -> Self {
    AggregateId(u)
  }

  /// Devuelve el `Uuid` interno.
  pub fn as_uuid(&self) -> Uuid {
    self.0
  }

  pub fn parse(s: &str) -> Result<Self, uuid::Error> {
    Uuid::parse_str(s).map(AggregateId)
  }
}

impl Default for AggregateId {
  fn default() -> Self {
    Self::new()
  }
}

impl From<Uuid> for AggregateId {
  fn from(u: Uuid) -> Self {
    AggregateId(u)
  }
}

impl From<AggregateId> for Uuid {
  fn from(id: AggregateId) -> Self {
    id.0
  }
}

impl fmt::Display for AggregateId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    self.0.fmt(f)
  }
}

/// Generates a newtype around an upstream (catalog-assigned) integer id.
macro_rules! upstream_id {
  ($(#[$meta:meta])* $name:ident) => {
    $(#[$meta])*
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct $name(pub u64);

    impl $name {
      pub fn get(self) -> u64 {
        self.0
      }

      /// The catalog never hands out id 0; it stands for "missing".
      pub fn is_set(self) -> bool {
        self.0 != 0
      }
    }

    impl From<u64> for $name {
      fn from(v: u64) -> Self {
        $name(v)
      }
    }

    impl fmt::Display for $name {
      fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
      }
    }
  };
}

upstream_id!(
  /// Id de un master en el catálogo externo. Clave natural del agregado.
  MasterId
);
upstream_id!(
  /// Id de una edición (release / version) en el catálogo externo.
  ReleaseId
);
upstream_id!(
  /// Id de un artista en el catálogo externo; identidad real de un crédito.
  ArtistId
);

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn aggregate_id_parses_its_own_display() {
    let id = AggregateId::new();
    assert_eq!(AggregateId::parse(&id.to_string()).unwrap(), id);
  }

  #[test]
  fn upstream_ids_serialize_as_plain_integers() {
    let json = serde_json::to_string(&ReleaseId(249504)).unwrap();
    assert_eq!(json, "249504");
    assert!(!ArtistId::default().is_set());
    assert!(MasterId(33).is_set());
  }
}
