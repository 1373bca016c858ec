//! bc-domain: objetos de valor del dominio ETL.
//!
//! Tipos inmutables compartidos por el motor y los adaptadores:
//! - `CompanyRecord`: compañía del tenant con atributos passthrough.
//! - `Dataset` / `Row`: secuencia ordenada de registros extraídos.
//! - `TableSchema`: nombre de tabla + clave primaria opcional.
//!
//! Sin IO: toda la lógica aquí es pura y determinista.

pub mod company;
pub mod dataset;
pub mod error;

pub use company::CompanyRecord;
pub use dataset::{Dataset, Row, COMPANY_ID_FIELD};
pub use error::DomainError;

use serde::{Deserialize, Serialize};

/// Esquema declarado de una tabla destino.
///
/// Invariante: la clave primaria se fija en la primera creación de la tabla
/// y no se redefine en corridas posteriores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub table: String,
    pub primary_key: Option<String>,
}

impl TableSchema {
    pub fn new(table: impl Into<String>, primary_key: Option<String>) -> Self {
        Self { table: table.into(), primary_key }
    }
}
