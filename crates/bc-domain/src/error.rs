//! Errores del dominio (validación de objetos de valor).

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum DomainError {
    #[error("company id must not be empty")] EmptyCompanyId,
}
