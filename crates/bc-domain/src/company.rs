//! Registro de compañía extraído del API multi-tenant.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::DomainError;

/// Compañía del tenant. Inmutable una vez extraída.
///
/// `extra` conserva los atributos passthrough que el API devuelve además de
/// `id` y `name` (displayName, businessProfileId, etc.).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CompanyRecord {
    /// Construye un registro validando que el id no sea vacío.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(DomainError::EmptyCompanyId);
        }
        Ok(Self { id, name: name.into(), extra: Map::new() })
    }

    /// Id utilizable para peticiones: `None` si está en blanco.
    pub fn usable_id(&self) -> Option<&str> {
        let trimmed = self.id.trim();
        if trimmed.is_empty() { None } else { Some(trimmed) }
    }
}
