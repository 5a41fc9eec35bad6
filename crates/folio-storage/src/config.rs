use folio_config::{CONFIG_BACKEND, ConfigError, PATHS, TomlConfigBackend};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Sección `[storage]` de folio.toml.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
  pub db_path: PathBuf,
  pub pool_size: u32,
  pub journal_mode: Option<String>,
}

impl Default for StorageConfig {
  fn default() -> Self {
    let db_path = PATHS.data_dir.join("folio.db");
    StorageConfig { db_path, pool_size: 4, journal_mode: Some("WAL".to_string()) }
  }
}

impl StorageConfig {
  pub fn load() -> Result<Self, ConfigError> {
    Self::load_from(&CONFIG_BACKEND)
  }

  /// Carga la sección (con valores por defecto) y la reescribe para que el fichero quede documentado.
  pub fn load_from(backend: &TomlConfigBackend) -> Result<Self, ConfigError> {
    use folio_config::ConfigBackend;

    let cfg: Self = backend.load_section_with_default("storage")?;
    if cfg.pool_size == 0 {
      return Err(ConfigError::Invalid { key: "storage.pool_size".into(), reason: "must be at least 1".into() });
    }
    backend.save_section("storage", &cfg)?;
    Ok(cfg)
  }

  pub fn save(&self) -> Result<(), ConfigError> {
    use folio_config::ConfigBackend;
    CONFIG_BACKEND.save_section("storage", self)
  }

  pub fn database_url(&self) -> String {
    self.db_path.to_string_lossy().into_owned()
  }
}
