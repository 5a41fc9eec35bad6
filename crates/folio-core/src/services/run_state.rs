use std::fmt;
use std::time::Duration;

use serde::Serialize;

/// Fase en la que se encuentra una ejecución del pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "phase")]
pub enum RunPhase {
  Idle,
  LoadingAggregate,
  ListingVersions,
  /// `index` es 1-based.
  MergingVersion {
    index: usize,
    total: usize,
  },
  Saving,
  Done,
  Failed,
}

impl RunPhase {
  pub fn is_terminal(self) -> bool {
    matches!(self, RunPhase::Done | RunPhase::Failed)
  }
}

impl fmt::Display for RunPhase {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      RunPhase::Idle => f.write_str("idle"),
      RunPhase::LoadingAggregate => f.write_str("loading aggregate"),
      RunPhase::ListingVersions => f.write_str("listing versions"),
      RunPhase::MergingVersion { index, total } => write!(f, "merging version {index}/{total}"),
      RunPhase::Saving => f.write_str("saving"),
      RunPhase::Done => f.write_str("done"),
      RunPhase::Failed => f.write_str("failed"),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
  Info,
  Warn,
  Error,
}

/// Línea del log de una ejecución, con el tiempo transcurrido desde su inicio.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
  pub elapsed: Duration,
  pub level: LogLevel,
  pub message: String,
}

impl fmt::Display for LogEntry {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "+{:.1}s - {}", self.elapsed.as_secs_f32(), self.message)
  }
}

/// Estado observable de una ejecución: fase, porcentaje y log acumulado.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunState {
  pub phase: RunPhase,
  pub percent: f32,
  pub log: Vec<LogEntry>,
}

impl Default for RunState {
  fn default() -> Self {
    Self { phase: RunPhase::Idle, percent: 0.0, log: Vec::new() }
  }
}

impl RunState {
  /// Avanza a `phase` con `percent`. El porcentaje nunca retrocede ni pasa de 100.
  pub(crate) fn advance(&mut self, phase: RunPhase, percent: f32) {
    self.phase = phase;
    self.percent = percent.clamp(self.percent, 100.0);
  }

  pub(crate) fn push_log(&mut self, elapsed: Duration, level: LogLevel, message: impl Into<String>) -> &LogEntry {
    self.log.push(LogEntry { elapsed, level, message: message.into() });
    &self.log[self.log.len() - 1]
  }

  pub fn warnings(&self) -> impl Iterator<Item = &LogEntry> {
    self.log.iter().filter(|e| e.level != LogLevel::Info)
  }
}

/// Puntos fijos de la barra de progreso.
pub(crate) mod milestones {
  pub const LOADED: f32 = 10.0;
  pub const SKELETON_SAVED: f32 = 15.0;
  pub const LISTED: f32 = 20.0;
  pub const VERSIONS_SPAN: f32 = 60.0;
  pub const MERGED: f32 = 80.0;
  pub const SAVED: f32 = 90.0;
  pub const DONE: f32 = 100.0;
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn percent_is_monotonic_and_capped() {
    let mut state = RunState::default();
    state.advance(RunPhase::ListingVersions, 20.0);
    state.advance(RunPhase::Failed, 5.0);
    assert_eq!(state.percent, 20.0);
    state.advance(RunPhase::Done, 140.0);
    assert_eq!(state.percent, 100.0);
    assert!(state.phase.is_terminal());
  }

  #[test]
  fn phase_and_log_render_for_humans() {
    assert_eq!(RunPhase::MergingVersion { index: 2, total: 5 }.to_string(), "merging version 2/5");

    let mut state = RunState::default();
    let entry = state.push_log(Duration::from_millis(1300), LogLevel::Warn, "release 42 skipped").clone();
    assert_eq!(entry.to_string(), "+1.3s - release 42 skipped");
    assert_eq!(state.warnings().count(), 1);
  }
}
