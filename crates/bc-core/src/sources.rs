//! Interfaces de capacidad hacia el API de negocio.
//!
//! Se modelan como traits con implementaciones variantes (respaldada por
//! API en `bc-extract`, dobles de prueba en tests) en lugar de clases
//! concretas: permite sustituir el extractor por un stub sin red.

use bc_domain::{CompanyRecord, Dataset};

use crate::errors::EtlError;

/// Fuente de la lista de compañías del tenant.
pub trait CompanyRepository {
    fn companies(&mut self) -> Result<Vec<CompanyRecord>, EtlError>;
}

/// Extracción paginada de una entidad para una compañía.
///
/// Contrato: `company_id` vacío falla con `InvalidArgument` sin tocar la
/// red; el resultado agrega todas las páginas en orden del servidor.
pub trait EntityExtractor {
    fn extract(&mut self, entity: &str, company_id: &str) -> Result<Dataset, EtlError>;
}
