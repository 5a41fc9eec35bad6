use serde_json::Value;

use crate::domain::{MasterAggregate, Release};

/// "El JSON más grande gana": devuelve `incoming` si su forma serializada es
/// estrictamente más larga que la de `current`; si no, `current`.
///
/// `null` en `incoming` nunca reemplaza nada; `null` en `current` siempre se reemplaza.
pub fn merge_json_if_larger(current: &Value, incoming: &Value) -> Value {
  if incoming.is_null() {
    return current.clone();
  }
  if current.is_null() {
    return incoming.clone();
  }
  if serialized_len(incoming) > serialized_len(current) { incoming.clone() } else { current.clone() }
}

fn serialized_len(value: &Value) -> usize {
  // `Value: Display` escribe JSON compacto, igual que `to_string`.
  value.to_string().len()
}

/// Aplica [`merge_json_if_larger`] a todos los blobs opacos del agregado.
pub(crate) fn absorb_blobs(aggregate: &mut MasterAggregate, release: &Release) {
  let pairs = [
    (&mut aggregate.companies, &release.companies),
    (&mut aggregate.formats, &release.formats),
    (&mut aggregate.identifiers, &release.identifiers),
    (&mut aggregate.series, &release.series),
    (&mut aggregate.images, &release.images),
    (&mut aggregate.videos, &release.videos),
  ];
  for (slot, incoming) in pairs {
    *slot = merge_json_if_larger(slot, incoming);
  }
}
