//! Taxonomía de errores del pipeline.
//!
//! Política de propagación:
//! - `Extraction` se aísla por compañía dentro del fan-out (cero filas para
//!   esa compañía, la corrida continúa).
//! - Todo lo demás sube hasta el controlador, que registra y detiene los
//!   steps restantes según la política del step.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EtlError {
    /// Grant de credenciales rechazado o 401 repetido tras re-autenticar.
    #[error("authentication rejected: {0}")]
    Auth(String),

    /// Fallo de red/API para una entidad y compañía concretas.
    #[error("extraction failed for '{entity}' (company {company_id}): {reason}")]
    Extraction { entity: String, company_id: String, reason: String },

    /// Argumento requerido ausente; falla rápido, sin llamada de red.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Forma de dataset malformada en una transformación pura.
    #[error("transform failed: {0}")]
    Transform(String),

    /// Fallo a nivel de base de datos; nombra la tabla afectada.
    #[error("load failed for table '{table}': {reason}")]
    Load { table: String, reason: String },

    /// Fallo de IO al escribir un artefacto lateral (CSV).
    #[error("export failed: {0}")]
    Export(String),
}

impl EtlError {
    pub fn extraction(entity: &str, company_id: &str, reason: impl Into<String>) -> Self {
        Self::Extraction { entity: entity.to_string(),
                           company_id: company_id.to_string(),
                           reason: reason.into() }
    }

    pub fn load(table: &str, reason: impl Into<String>) -> Self {
        Self::Load { table: table.to_string(), reason: reason.into() }
    }
}
