//! bc-persistence
//!
//! Implementación Postgres (Diesel) del `TableStore` del core, con paridad
//! de contrato frente al backend en memoria. Las tablas destino se crean
//! dinámicamente a partir de los campos observados en cada dataset, por lo
//! que toda la capa usa `sql_query` con identificadores y literales
//! escapados en lugar del DSL estático de Diesel.
//!
//! Módulos:
//! - `pg`: `PgTableStore` y utilidades de conexión (pool r2d2).
//! - `config`: carga de configuración desde .env.
//! - `error`: mapeo de errores Diesel a variantes semánticas.

pub mod config;
pub mod error;
pub mod pg;

pub use config::{init_dotenv, DbConfig};
pub use error::PersistenceError;
pub use pg::{build_pool, build_pool_from_env, ConnectionProvider, PgPool, PgTableStore, PoolProvider};
