use async_trait::async_trait;
use folio_core::domain::MasterId;
use folio_core::ports::ProgressReporter;
use folio_core::services::{LogEntry, LogLevel, RunPhase, RunState};
use tracing::{debug, info};

/// `ProgressReporter` de la CLI.
///
/// El log de la ejecución va a stdout, línea a línea; las fases y el
/// porcentaje solo aparecen en la traza (`--verbose`).
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleReporter;

impl ConsoleReporter {
  pub fn new() -> Self {
    Self
  }
}

fn render(master_id: MasterId, entry: &LogEntry) -> String {
  let tag = match entry.level {
    LogLevel::Info => "",
    LogLevel::Warn => " [warn]",
    LogLevel::Error => " [error]",
  };
  format!("master {master_id}{tag} {entry}")
}

#[async_trait]
impl ProgressReporter for ConsoleReporter {
  async fn start(&self, master_id: MasterId) {
    println!("master {master_id}: aggregating");
  }

  async fn on_phase(&self, master_id: MasterId, phase: RunPhase, percent: f32) {
    debug!(%master_id, %phase, percent, "phase");
  }

  async fn on_log(&self, master_id: MasterId, entry: &LogEntry) {
    println!("{}", render(master_id, entry));
  }

  async fn finish(&self, master_id: MasterId, state: &RunState) {
    info!(%master_id, phase = %state.phase, percent = state.percent, warnings = state.warnings().count(), "run finished");
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::time::Duration;

  #[test]
  fn renders_elapsed_and_level() {
    let entry = LogEntry { elapsed: Duration::from_millis(2400), level: LogLevel::Warn, message: "release 7 skipped".into() };
    assert_eq!(render(MasterId(96559), &entry), "master 96559 [warn] +2.4s - release 7 skipped");

    let entry = LogEntry { elapsed: Duration::ZERO, level: LogLevel::Info, message: "aggregate saved".into() };
    assert_eq!(render(MasterId(1), &entry), "master 1 +0.0s - aggregate saved");
  }
}
