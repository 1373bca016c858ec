//! bc-extract: infraestructura HTTP contra la API de negocio.
//!
//! Implementa los traits de capacidad de `bc-core` con IO real:
//! `TokenManager` (grant client-credentials con caché), `BcClient` (GET
//! autenticado con un único reintento tras 401), `PaginatedExtractor`
//! (seguimiento de continuation links) y `BcRepository` (listado de
//! compañías del tenant). Todo bloqueante: sin hilos ni async en esta capa.

pub mod client;
pub mod config;
pub mod extractor;
pub mod repository;
pub mod token;

pub use client::{BcClient, ODataPage, SharedClient};
pub use config::ApiConfig;
pub use extractor::PaginatedExtractor;
pub use repository::BcRepository;
pub use token::TokenManager;
