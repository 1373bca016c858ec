//! Trait que define un Step del pipeline y su política de fallo declarada.

use crate::context::PipelineContext;
use crate::errors::EtlError;

/// Política de fallo declarada por cada Step.
///
/// `Fatal` detiene los steps restantes (por defecto). `ContinueLogged`
/// registra el error y continúa: es el opt-in explícito para artefactos
/// laterales (p. ej. export CSV). El aislamiento por compañía del fan-out
/// es interno al componente y no pasa por esta política.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    Fatal,
    ContinueLogged,
}

/// Resultado de un Step: cuántas filas produjo/insertó, para el reporte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepOutcome {
    pub rows: usize,
}

impl StepOutcome {
    pub fn rows(rows: usize) -> Self {
        Self { rows }
    }

    pub fn none() -> Self {
        Self { rows: 0 }
    }
}

/// Unidad de trabajo sin estado sobre el contexto compartido.
///
/// Un Step sólo puede leer slots que un step anterior garantice haber
/// escrito; leer un slot vacío devuelve `InvalidArgument`.
pub trait EtlStep {
    /// Identificador estable dentro del pipeline.
    fn id(&self) -> &str;

    /// Política de fallo del step. Por defecto, fatal.
    fn failure_policy(&self) -> FailurePolicy {
        FailurePolicy::Fatal
    }

    fn run(&self, ctx: &mut PipelineContext) -> Result<StepOutcome, EtlError>;
}
