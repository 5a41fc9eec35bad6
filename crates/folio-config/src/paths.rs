use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const BASE_DIR_ENV: &str = "FOLIO_BASE_DIR";

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
  #[error("toml error: {0}")]
  Toml(#[from] toml::de::Error),
  #[error("directories error: could not determine home directory")]
  Directories,
  #[error("invalid value for {key}: {reason}")]
  Invalid { key: String, reason: String },
  #[error("other: {0}")]
  Other(String),
}

/// Directorios donde Folio guarda configuración, datos y caché.
#[derive(Debug, Clone)]
pub struct FolioPaths {
  pub base_dir: PathBuf,
  pub config_dir: PathBuf,
  pub data_dir: PathBuf,
  pub cache_dir: PathBuf,
}

impl FolioPaths {
  /// `FOLIO_BASE_DIR` si está definida; si no, los directorios de la plataforma.
  pub fn new() -> Result<Self, ConfigError> {
    match std::env::var_os(BASE_DIR_ENV) {
      Some(base) if !base.is_empty() => Self::under(base),
      _ => {
        let proj_dirs = ProjectDirs::from("com", "folio", "folio").ok_or(ConfigError::Directories)?;
        let paths = Self {
          base_dir: proj_dirs.config_dir().to_path_buf(),
          config_dir: proj_dirs.config_dir().to_path_buf(),
          data_dir: proj_dirs.data_dir().to_path_buf(),
          cache_dir: proj_dirs.cache_dir().to_path_buf(),
        };
        paths.create_all()?;
        Ok(paths)
      }
    }
  }

  /// Layout portable: `config/`, `data/` y `cache/` bajo `base`.
  pub fn under(base: impl AsRef<Path>) -> Result<Self, ConfigError> {
    let base = base.as_ref().to_path_buf();
    let paths = Self {
      config_dir: base.join("config"),
      data_dir: base.join("data"),
      cache_dir: base.join("cache"),
      base_dir: base,
    };
    paths.create_all()?;
    Ok(paths)
  }

  pub fn detect() -> Result<Self, ConfigError> {
    Self::new()
  }

  pub fn config_file(&self) -> PathBuf {
    self.config_dir.join("folio.toml")
  }

  fn create_all(&self) -> Result<(), ConfigError> {
    std::fs::create_dir_all(&self.config_dir)?;
    std::fs::create_dir_all(&self.data_dir)?;
    std::fs::create_dir_all(&self.cache_dir)?;
    Ok(())
  }
}
