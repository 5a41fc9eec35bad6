mod backend;
mod io;
mod paths;

pub use backend::{ConfigBackend, TomlConfigBackend};
pub use io::atomic_write_str;
pub use paths::{ConfigError, FolioPaths};

use once_cell::sync::Lazy;

// Singleton de paths (FOLIO_BASE_DIR o directorios de la plataforma)
pub static PATHS: Lazy<FolioPaths> = Lazy::new(|| FolioPaths::detect().expect("failed to init FolioPaths"));

// Singleton del backend de config
pub static CONFIG_BACKEND: Lazy<TomlConfigBackend> = Lazy::new(|| TomlConfigBackend::new(PATHS.clone()));
