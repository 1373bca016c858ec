//! Controlador del pipeline: ejecuta Steps en orden estricto.
//!
//! Modelo de ejecución totalmente secuencial: cada llamada de red o de base
//! de datos bloquea el pipeline hasta completarse o fallar. No hay
//! cancelación más allá de terminar el proceso.

use log::{error, info};
use thiserror::Error;
use uuid::Uuid;

use crate::context::PipelineContext;
use crate::errors::EtlError;
use crate::step::{EtlStep, FailurePolicy};

/// Reporte por step: éxito y conteo de filas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub step_id: String,
    pub rows: usize,
}

/// Resumen de la corrida completa.
#[derive(Debug)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub reports: Vec<StepReport>,
    /// Fallos registrados de steps con política `ContinueLogged`.
    pub logged_failures: Vec<(String, EtlError)>,
}

/// Corrida detenida: nombra el step que falló y conserva los reportes de
/// los steps ya completados (las cargas ya confirmadas no se revierten).
#[derive(Debug, Error)]
#[error("pipeline halted at step '{step_id}': {source}")]
pub struct PipelineError {
    pub step_id: String,
    pub completed: Vec<StepReport>,
    #[source]
    pub source: EtlError,
}

/// Secuencia finita y estrictamente ordenada de Steps.
pub struct PipelineController {
    steps: Vec<Box<dyn EtlStep>>,
}

impl PipelineController {
    pub fn new(steps: Vec<Box<dyn EtlStep>>) -> Self {
        Self { steps }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Ejecuta cada step en orden de registro sobre el contexto sembrado.
    ///
    /// Un error de step se registra siempre (nombre del step + error) y,
    /// salvo que el step declare `ContinueLogged`, aborta la secuencia
    /// restante. Nunca se traga un fallo en silencio.
    pub fn run(&self, ctx: &mut PipelineContext) -> Result<RunSummary, PipelineError> {
        let run_id = Uuid::new_v4();
        info!("pipeline {} iniciado ({} steps)", run_id, self.steps.len());

        let mut reports: Vec<StepReport> = Vec::with_capacity(self.steps.len());
        let mut logged_failures: Vec<(String, EtlError)> = Vec::new();

        for step in &self.steps {
            info!("step '{}' iniciado", step.id());
            match step.run(ctx) {
                Ok(outcome) => {
                    info!("step '{}' finalizado: {} filas", step.id(), outcome.rows);
                    reports.push(StepReport { step_id: step.id().to_string(),
                                              rows: outcome.rows });
                }
                Err(err) => {
                    error!("step '{}' falló: {}", step.id(), err);
                    match step.failure_policy() {
                        FailurePolicy::Fatal => {
                            error!("pipeline {} detenido en '{}'", run_id, step.id());
                            return Err(PipelineError { step_id: step.id().to_string(),
                                                       completed: reports,
                                                       source: err });
                        }
                        FailurePolicy::ContinueLogged => {
                            logged_failures.push((step.id().to_string(), err));
                        }
                    }
                }
            }
        }

        info!("pipeline {} completado", run_id);
        Ok(RunSummary { run_id, reports, logged_failures })
    }
}
