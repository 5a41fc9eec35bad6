use std::time::Duration;

use folio_config::{CONFIG_BACKEND, ConfigBackend, ConfigError, TomlConfigBackend};
use folio_core::domain::Owner;
use folio_core::services::{MatchStrategy, PipelineConfig};
use serde::{Deserialize, Serialize};

/// Discogs no sirve páginas de más de 100 elementos.
const MAX_PER_PAGE: u32 = 100;

/// Sección `[aggregation]` de folio.toml.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AggregationSettings {
  pub version_delay_ms: u64,
  /// 0 desactiva el límite.
  pub call_timeout_secs: u64,
  pub versions_per_page: u32,
  pub max_version_pages: u32,
  pub match_strategy: MatchStrategy,
  pub persist_skeleton: bool,
}

impl Default for AggregationSettings {
  fn default() -> Self {
    let pipeline = PipelineConfig::default();
    Self {
      version_delay_ms: pipeline.version_delay.as_millis() as u64,
      call_timeout_secs: pipeline.call_timeout.map_or(0, |t| t.as_secs()),
      versions_per_page: pipeline.versions_per_page,
      max_version_pages: pipeline.max_version_pages,
      match_strategy: pipeline.match_strategy,
      persist_skeleton: pipeline.persist_skeleton,
    }
  }
}

impl AggregationSettings {
  pub fn load() -> Result<Self, ConfigError> {
    Self::load_from(&CONFIG_BACKEND)
  }

  pub fn load_from(backend: &TomlConfigBackend) -> Result<Self, ConfigError> {
    let cfg: Self = backend.load_section_with_default("aggregation")?;
    cfg.validate()?;
    backend.save_section("aggregation", &cfg)?;
    Ok(cfg)
  }

  fn validate(&self) -> Result<(), ConfigError> {
    if !(1..=MAX_PER_PAGE).contains(&self.versions_per_page) {
      return Err(ConfigError::Invalid {
        key: "aggregation.versions_per_page".into(),
        reason: format!("must be between 1 and {MAX_PER_PAGE}"),
      });
    }
    if self.max_version_pages == 0 {
      return Err(ConfigError::Invalid {
        key: "aggregation.max_version_pages".into(),
        reason: "must be at least 1".into(),
      });
    }
    Ok(())
  }

  pub fn to_pipeline(&self) -> PipelineConfig {
    PipelineConfig {
      version_delay: Duration::from_millis(self.version_delay_ms),
      call_timeout: (self.call_timeout_secs > 0).then(|| Duration::from_secs(self.call_timeout_secs)),
      versions_per_page: self.versions_per_page,
      max_version_pages: self.max_version_pages,
      match_strategy: self.match_strategy,
      persist_skeleton: self.persist_skeleton,
    }
  }
}

/// Sección `[owner]`: usuario en cuyo nombre se guardan los agregados.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct OwnerSettings {
  pub id: Option<String>,
  pub email: Option<String>,
}

impl OwnerSettings {
  pub fn load() -> Result<Self, ConfigError> {
    Self::load_from(&CONFIG_BACKEND)
  }

  pub fn load_from(backend: &TomlConfigBackend) -> Result<Self, ConfigError> {
    let cfg: Self = backend.load_section_with_default("owner")?;
    backend.save_section("owner", &cfg)?;
    Ok(cfg)
  }

  /// `None` cuando no hay usuario configurado.
  pub fn owner(&self) -> Option<Owner> {
    let id = self.id.as_deref().map(str::trim).filter(|id| !id.is_empty())?;
    Some(Owner::new(id, self.email.clone().unwrap_or_default()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use folio_config::FolioPaths;
  use tempfile::tempdir;

  fn backend() -> (tempfile::TempDir, TomlConfigBackend) {
    let tmp = tempdir().unwrap();
    let backend = TomlConfigBackend::new(FolioPaths::under(tmp.path()).unwrap());
    (tmp, backend)
  }

  #[test]
  fn defaults_match_the_pipeline_defaults() {
    assert_eq!(AggregationSettings::default().to_pipeline(), PipelineConfig::default());
  }

  #[test]
  fn missing_section_is_written_back_with_defaults() {
    let (_tmp, backend) = backend();

    let cfg = AggregationSettings::load_from(&backend).unwrap();

    assert_eq!(cfg.version_delay_ms, 600);
    let written = std::fs::read_to_string(backend.paths().config_file()).unwrap();
    assert!(written.contains("[aggregation]"));
    assert!(written.contains("match_strategy = \"title_or_position\""));
  }

  #[test]
  fn zero_timeout_disables_the_limit() {
    let (_tmp, backend) = backend();
    std::fs::write(
      backend.paths().config_file(),
      "[aggregation]\ncall_timeout_secs = 0\nmatch_strategy = \"title_only\"\n",
    )
    .unwrap();

    let pipeline = AggregationSettings::load_from(&backend).unwrap().to_pipeline();

    assert_eq!(pipeline.call_timeout, None);
    assert_eq!(pipeline.match_strategy, MatchStrategy::TitleOnly);
    assert_eq!(pipeline.version_delay, Duration::from_millis(600));
  }

  #[test]
  fn rejects_out_of_range_page_size() {
    let (_tmp, backend) = backend();
    std::fs::write(backend.paths().config_file(), "[aggregation]\nversions_per_page = 500\n").unwrap();

    let err = AggregationSettings::load_from(&backend).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { .. }));
  }

  #[test]
  fn owner_requires_an_id() {
    assert_eq!(OwnerSettings::default().owner(), None);
    assert_eq!(OwnerSettings { id: Some("  ".into()), email: None }.owner(), None);

    let owner = OwnerSettings { id: Some("u-1".into()), email: Some("me@example.com".into()) }.owner().unwrap();
    assert_eq!(owner, Owner::new("u-1", "me@example.com"));
  }
}
