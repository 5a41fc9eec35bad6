use folio_config::{CONFIG_BACKEND, ConfigBackend, ConfigError, TomlConfigBackend};
use serde::{Deserialize, Serialize};

pub const CONSUMER_KEY_ENV: &str = "DISCOGS_CONSUMER_KEY";
pub const CONSUMER_SECRET_ENV: &str = "DISCOGS_CONSUMER_SECRET";
pub const TOKEN_ENV: &str = "DISCOGS_TOKEN";

/// Sección `[discogs]` de folio.toml.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct DiscogsConfig {
  pub base_url: String,

  /// Discogs rechaza peticiones sin User-Agent identificable.
  pub user_agent: String,

  pub consumer_key: Option<String>,
  pub consumer_secret: Option<String>,

  /// Token personal; si está, tiene prioridad sobre key/secret.
  pub token: Option<String>,

  pub timeout_secs: u64,

  /// Espera antes del único reintento tras un 429.
  pub rate_limit_retry_secs: u64,
}

impl Default for DiscogsConfig {
  fn default() -> Self {
    Self {
      base_url: "https://api.discogs.com".to_string(),
      user_agent: format!("folio/{} +https://www.discogs.com/developers", env!("CARGO_PKG_VERSION")),
      consumer_key: None,
      consumer_secret: None,
      token: None,
      timeout_secs: 30,
      rate_limit_retry_secs: 30,
    }
  }
}

impl DiscogsConfig {
  pub fn load() -> Result<Self, ConfigError> {
    Self::load_from(&CONFIG_BACKEND)
  }

  /// Carga la sección, la reescribe tal cual y después aplica las variables de
  /// entorno. Las credenciales del entorno nunca se escriben en el fichero.
  pub fn load_from(backend: &TomlConfigBackend) -> Result<Self, ConfigError> {
    let cfg: Self = backend.load_section_with_default("discogs")?;
    backend.save_section("discogs", &cfg)?;
    Ok(cfg.with_env_overrides(|key| std::env::var(key).ok()))
  }

  pub fn save(&self) -> Result<(), ConfigError> {
    CONFIG_BACKEND.save_section("discogs", self)
  }

  pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
    let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
    if let Some(v) = non_empty(CONSUMER_KEY_ENV) {
      self.consumer_key = Some(v);
    }
    if let Some(v) = non_empty(CONSUMER_SECRET_ENV) {
      self.consumer_secret = Some(v);
    }
    if let Some(v) = non_empty(TOKEN_ENV) {
      self.token = Some(v);
    }
    self
  }

  /// Valor de la cabecera `Authorization`, si hay credenciales.
  pub fn authorization(&self) -> Option<String> {
    if let Some(token) = self.token.as_deref().filter(|t| !t.is_empty()) {
      return Some(format!("Discogs token={token}"));
    }
    match (self.consumer_key.as_deref(), self.consumer_secret.as_deref()) {
      (Some(key), Some(secret)) if !key.is_empty() && !secret.is_empty() => {
        Some(format!("Discogs key={key}, secret={secret}"))
      }
      _ => None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn env_overrides_file_values() {
    let cfg = DiscogsConfig { consumer_key: Some("file-key".into()), ..Default::default() };
    let cfg = cfg.with_env_overrides(|key| match key {
      CONSUMER_KEY_ENV => Some("env-key".into()),
      CONSUMER_SECRET_ENV => Some("env-secret".into()),
      TOKEN_ENV => Some("   ".into()),
      _ => None,
    });

    assert_eq!(cfg.consumer_key.as_deref(), Some("env-key"));
    assert_eq!(cfg.consumer_secret.as_deref(), Some("env-secret"));
    assert_eq!(cfg.token, None);
  }

  #[test]
  fn authorization_prefers_token() {
    let mut cfg = DiscogsConfig {
      consumer_key: Some("k".into()),
      consumer_secret: Some("s".into()),
      ..Default::default()
    };
    assert_eq!(cfg.authorization().as_deref(), Some("Discogs key=k, secret=s"));

    cfg.token = Some("t0k".into());
    assert_eq!(cfg.authorization().as_deref(), Some("Discogs token=t0k"));

    let anonymous = DiscogsConfig { consumer_key: Some("k".into()), ..Default::default() };
    assert_eq!(anonymous.authorization(), None);
  }
}
