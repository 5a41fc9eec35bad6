// crates/folio-core/src/errors.rs
use thiserror::Error;

use crate::ports::{RepoError, SourceError};
use crate::services::run_state::RunPhase;

/// Error genérico del núcleo de Folio.
///
/// Las capas superiores (CLI, etc.) deberían mapear este error
/// a mensajes de usuario o logs.
#[derive(Debug, Error)]
pub enum CoreError {
  /// Entrada inválida detectada antes de cualquier I/O.
  #[error("precondition failed: {0}")]
  Precondition(String),

  #[error("caller must be an authenticated owner")]
  Unauthenticated,

  #[error("source error: {0}")]
  Source(String),

  #[error("repository error: {0}")]
  Repository(String),

  #[error("invalid data: {0}")]
  Invalid(String),

  #[error("not found")]
  NotFound,

  #[error("run cancelled")]
  Cancelled,

  #[error("timed out waiting for {0}")]
  TimedOut(String),

  /// Error fatal de una ejecución del pipeline, con la fase en la que ocurrió.
  #[error("{phase} failed: {source}")]
  PhaseFailed {
    phase: RunPhase,
    #[source]
    source: Box<CoreError>,
  },
}

impl CoreError {
  pub fn in_phase(self, phase: RunPhase) -> Self {
    match self {
      CoreError::PhaseFailed { .. } => self,
      other => CoreError::PhaseFailed { phase, source: Box::new(other) },
    }
  }

  /// Fase en la que falló la ejecución, si el error viene del pipeline.
  pub fn phase(&self) -> Option<RunPhase> {
    match self {
      CoreError::PhaseFailed { phase, .. } => Some(*phase),
      _ => None,
    }
  }

  pub fn is_cancelled(&self) -> bool {
    match self {
      CoreError::Cancelled => true,
      CoreError::PhaseFailed { source, .. } => source.is_cancelled(),
      _ => false,
    }
  }
}

impl From<SourceError> for CoreError {
  fn from(e: SourceError) -> Self {
    CoreError::Source(e.to_string())
  }
}

impl From<RepoError> for CoreError {
  fn from(e: RepoError) -> Self {
    match e {
      RepoError::NotFound => CoreError::NotFound,
      other => CoreError::Repository(other.to_string()),
    }
  }
}
