//! `TableStore` sobre Postgres (Diesel).
//!
//! Las tablas destino no se conocen en tiempo de compilación: cada dataset
//! define sus columnas al llegar. Todo el DDL/DML se construye con
//! `sql_query`, identificadores entre comillas dobles y literales escapados.
//! Todas las columnas generadas son TEXT; los valores escalares se guardan
//! en su forma textual y los estructurados como JSON compacto.

use std::collections::HashSet;

use bc_core::{EtlError, TableStore};
use bc_domain::{Dataset, Row, TableSchema};
use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager};
use diesel::sql_types::Text;
use log::{debug, info};

use crate::error::PersistenceError;

/// Alias de tipo para el pool r2d2 de conexiones Postgres.
pub type PgPool = r2d2::Pool<ConnectionManager<PgConnection>>;

/// Proveedor abstracto de conexiones.
///
/// Permite inyectar un pool real (producción/tests de integración) o
/// factorear en tests sin acoplar a r2d2. Debe devolver una conexión válida
/// o `PersistenceError::TransientIo` en caso de error.
pub trait ConnectionProvider: Send + Sync + 'static {
    fn connection(&self) -> Result<r2d2::PooledConnection<ConnectionManager<PgConnection>>, PersistenceError>;
}

/// `ConnectionProvider` respaldado por un `PgPool`.
pub struct PoolProvider {
    pub pool: PgPool,
}

impl ConnectionProvider for PoolProvider {
    fn connection(&self) -> Result<r2d2::PooledConnection<ConnectionManager<PgConnection>>, PersistenceError> {
        self.pool
            .get()
            .map_err(|e| PersistenceError::TransientIo(format!("pool error: {e}")))
    }
}

/// Construye un pool r2d2 con límites explícitos.
pub fn build_pool(database_url: &str, min: u32, max: u32) -> Result<PgPool, PersistenceError> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    r2d2::Pool::builder().min_idle(Some(min))
                         .max_size(max)
                         .build(manager)
                         .map_err(|e| PersistenceError::TransientIo(format!("pool build error: {e}")))
}

/// Helper: carga `.env`, lee `DATABASE_URL` y tamaños, y construye el pool.
pub fn build_pool_from_env() -> Result<PgPool, PersistenceError> {
    crate::config::init_dotenv();
    let cfg = crate::config::DbConfig::from_env()?;
    build_pool(&cfg.url, cfg.min_connections, cfg.max_connections)
}

/// Identificador SQL entre comillas dobles, con comillas internas dobladas.
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Literal SQL entre comillas simples, con comillas internas dobladas.
fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

#[derive(QueryableByName)]
struct CountRow {
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    count: i64,
}

#[derive(QueryableByName)]
struct KeyRow {
    #[diesel(sql_type = diesel::sql_types::Nullable<Text>)]
    key: Option<String>,
}

#[derive(QueryableByName)]
struct NameRow {
    #[diesel(sql_type = Text)]
    name: String,
}

#[derive(QueryableByName)]
struct PayloadRow {
    #[diesel(sql_type = Text)]
    payload: String,
}

/// `TableStore` durable sobre Postgres, con paridad de contrato frente a
/// `InMemoryTableStore`: creación única de tabla (la PK nunca se redefine),
/// lote de inserción atómico, claves almacenadas como texto.
pub struct PgTableStore<P: ConnectionProvider> {
    provider: P,
}

impl<P: ConnectionProvider> PgTableStore<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    fn run<T>(&self,
              table: &str,
              op: impl FnOnce(&mut PgConnection) -> Result<T, PersistenceError>)
              -> Result<T, EtlError> {
        let mut conn = self.provider
                           .connection()
                           .map_err(|e| EtlError::load(table, e.to_string()))?;
        op(&mut conn).map_err(|e| EtlError::load(table, e.to_string()))
    }
}

impl<P: ConnectionProvider> TableStore for PgTableStore<P> {
    fn ping(&mut self) -> Result<(), EtlError> {
        self.run("-", |conn| {
                diesel::sql_query("SELECT 1").execute(conn)?;
                Ok(())
            })?;
        debug!("ping al store correcto");
        Ok(())
    }

    fn table_exists(&mut self, table: &str) -> Result<bool, EtlError> {
        self.run(table, |conn| {
            let row: CountRow = diesel::sql_query(
                "SELECT COUNT(*) AS count FROM information_schema.tables \
                 WHERE table_schema = current_schema() AND table_name = $1")
                .bind::<Text, _>(table)
                .get_result(conn)?;
            Ok(row.count > 0)
        })
    }

    fn create_table(&mut self, schema: &TableSchema, fields: &[String]) -> Result<(), EtlError> {
        let columns: Vec<String> = fields.iter()
                                         .map(|f| format!("{} TEXT", quote_ident(f)))
                                         .collect();
        let mut parts = columns;
        if let Some(pk) = &schema.primary_key {
            parts.push(format!("PRIMARY KEY ({})", quote_ident(pk)));
        }
        let ddl = format!("CREATE TABLE {} ({})", quote_ident(&schema.table), parts.join(", "));

        self.run(&schema.table, |conn| {
                debug!("DDL: {ddl}");
                diesel::sql_query(&ddl).execute(conn)?;
                Ok(())
            })?;
        info!("tabla '{}' creada con {} columnas", schema.table, fields.len());
        Ok(())
    }

    fn stored_keys(&mut self, table: &str, primary_key: &str) -> Result<HashSet<String>, EtlError> {
        let sql = format!("SELECT {} AS key FROM {}", quote_ident(primary_key), quote_ident(table));
        self.run(table, |conn| {
            let rows: Vec<KeyRow> = diesel::sql_query(&sql).load(conn)?;
            Ok(rows.into_iter().filter_map(|r| r.key).collect())
        })
    }

    fn insert_rows(&mut self, table: &str, fields: &[String], rows: &[Row]) -> Result<usize, EtlError> {
        if rows.is_empty() {
            return Ok(0);
        }

        let columns = fields.iter().map(|f| quote_ident(f)).collect::<Vec<_>>().join(", ");
        let tuples: Vec<String> = rows.iter()
                                      .map(|row| {
                                          let values = fields.iter()
                                                             .map(|f| sql_value(row, f))
                                                             .collect::<Vec<_>>()
                                                             .join(", ");
                                          format!("({values})")
                                      })
                                      .collect();
        let dml = format!("INSERT INTO {} ({}) VALUES {}",
                          quote_ident(table),
                          columns,
                          tuples.join(", "));

        // Unidad atómica: o entra el lote completo o ninguna fila.
        let inserted = self.run(table, |conn| {
            conn.build_transaction()
                .read_write()
                .run(|tx_conn| {
                    let n = diesel::sql_query(&dml).execute(tx_conn)?;
                    Ok::<usize, PersistenceError>(n)
                })
        })?;
        Ok(inserted)
    }

    fn list_tables(&mut self) -> Result<Vec<String>, EtlError> {
        self.run("-", |conn| {
            let rows: Vec<NameRow> = diesel::sql_query(
                "SELECT table_name AS name FROM information_schema.tables \
                 WHERE table_schema = current_schema() AND table_type = 'BASE TABLE' \
                 ORDER BY table_name")
                .load(conn)?;
            Ok(rows.into_iter().map(|r| r.name).collect())
        })
    }

    fn fetch_rows(&mut self, table: &str) -> Result<Vec<Row>, EtlError> {
        // Las columnas no se conocen en compilación: se leen las filas como
        // JSON via row_to_json y se decodifican en el tipo `Row` del dominio.
        let sql = format!("SELECT row_to_json(t)::text AS payload FROM {} t", quote_ident(table));
        let payloads = self.run(table, |conn| {
            let rows: Vec<PayloadRow> = diesel::sql_query(&sql).load(conn)?;
            Ok(rows)
        })?;
        payloads.into_iter()
                .map(|p| {
                    serde_json::from_str::<Row>(&p.payload)
                        .map_err(|e| EtlError::load(table, format!("row decode error: {e}")))
                })
                .collect()
    }
}

/// Forma SQL del valor de un campo: literal escapado o NULL.
fn sql_value(row: &Row, field: &str) -> String {
    match row.get(field).and_then(Dataset::field_as_text) {
        Some(text) => quote_literal(&text),
        None => "NULL".to_string(),
    }
}
