use async_trait::async_trait;

use crate::domain::MasterId;
use crate::services::run_state::{LogEntry, RunPhase, RunState};

// Salida de eventos de una ejecución del pipeline.
// La capa de presentación (CLI, UI) implementa esto; el núcleo no renderiza nada.
#[async_trait]
pub trait ProgressReporter: Send + Sync {
  async fn start(&self, master_id: MasterId);
  async fn on_phase(&self, master_id: MasterId, phase: RunPhase, percent: f32);
  async fn on_log(&self, master_id: MasterId, entry: &LogEntry);
  async fn finish(&self, master_id: MasterId, state: &RunState);
}

/// Reporter que descarta todos los eventos.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopReporter;

#[async_trait]
impl ProgressReporter for NoopReporter {
  async fn start(&self, _master_id: MasterId) {}
  async fn on_phase(&self, _master_id: MasterId, _phase: RunPhase, _percent: f32) {}
  async fn on_log(&self, _master_id: MasterId, _entry: &LogEntry) {}
  async fn finish(&self, _master_id: MasterId, _state: &RunState) {}
}
