//! bcflow: punto de entrada del pipeline de extracción/reconciliación.
//!
//! Sin argumentos ejecuta la corrida completa; `bcflow profile` genera el
//! reporte de perfilado por columna de las tablas ya cargadas.
//! Cablea las implementaciones reales (API HTTP + Postgres) en el contexto,
//! registra la secuencia de steps y reporta el resumen de la corrida.
//! Códigos de salida: 0 corrida completa, 1 pipeline o reporte fallido,
//! 2 error de configuración/arranque.

mod config;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use bc_adapters::{write_profile_csv, ExportCsvStep, ExtractCompaniesStep, ExtractEntityStep,
                  PingStoreStep, StoreDatasetStep};
use bc_core::{profile_table, DatasetSlot, EtlStep, PipelineContext, PipelineController, TableStore};
use bc_extract::{ApiConfig, BcClient, BcRepository, PaginatedExtractor, TokenManager};
use bc_persistence::{build_pool_from_env, PgTableStore, PoolProvider};
use log::{error, info};

use crate::config::RunConfig;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    bc_extract::config::init_dotenv();

    let args: Vec<String> = std::env::args().collect();
    let result = if args.len() >= 2 && args[1] == "profile" {
        run_profile(&args[2..])
    } else {
        run()
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(RunError::Pipeline) => ExitCode::from(1),
        Err(RunError::Report(msg)) => {
            error!("reporte fallido: {msg}");
            ExitCode::from(1)
        }
        Err(RunError::Setup(msg)) => {
            error!("arranque fallido: {msg}");
            ExitCode::from(2)
        }
    }
}

enum RunError {
    Setup(String),
    Report(String),
    Pipeline,
}

fn run() -> Result<(), RunError> {
    let run_config = RunConfig::load().map_err(|e| RunError::Setup(e.to_string()))?;
    let api_config = ApiConfig::from_env().map_err(|e| RunError::Setup(e.to_string()))?;

    let http = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .map_err(|e| RunError::Setup(format!("http client: {e}")))?;

    // Un único cliente autenticado: repositorio y extractor comparten la
    // misma caché de token (un solo grant por corrida).
    let client = BcClient::new(http.clone(), TokenManager::new(api_config.clone(), http)).into_shared();
    let repository = BcRepository::new(client.clone(), api_config.base_url());
    let extractor = PaginatedExtractor::new(client, api_config.base_url());

    let pool = build_pool_from_env().map_err(|e| RunError::Setup(e.to_string()))?;
    let store = PgTableStore::new(PoolProvider { pool });

    let mut ctx = PipelineContext::new(Box::new(repository),
                                       Box::new(extractor),
                                       Box::new(store),
                                       run_config.excluded_set());

    let mut steps: Vec<Box<dyn EtlStep>> =
        vec![Box::new(PingStoreStep),
             Box::new(ExtractCompaniesStep),
             Box::new(ExtractEntityStep::new(DatasetSlot::Customers)),
             Box::new(ExtractEntityStep::new(DatasetSlot::Projects)),
             Box::new(StoreDatasetStep::new(DatasetSlot::Customers, "customers_bc", Some("id".into()))),
             Box::new(StoreDatasetStep::new(DatasetSlot::Projects, "projects_bc", Some("id".into())))];
    if let Some(dir) = &run_config.export_dir {
        steps.push(Box::new(ExportCsvStep::new(DatasetSlot::Customers, dir.join("customers.csv"))));
        steps.push(Box::new(ExportCsvStep::new(DatasetSlot::Projects, dir.join("projects.csv"))));
    }

    let controller = PipelineController::new(steps);
    match controller.run(&mut ctx) {
        Ok(summary) => {
            info!("corrida {} completada", summary.run_id);
            for report in &summary.reports {
                info!("  {}: {} filas", report.step_id, report.rows);
            }
            for (step_id, err) in &summary.logged_failures {
                error!("  {step_id}: fallo registrado (no fatal): {err}");
            }
            Ok(())
        }
        Err(halted) => {
            error!("pipeline detenido en '{}': {}", halted.step_id, halted.source);
            for report in &halted.completed {
                info!("  completado antes del fallo {}: {} filas", report.step_id, report.rows);
            }
            Err(RunError::Pipeline)
        }
    }
}

/// `bcflow profile [--table <NOMBRE> | --all] [--out <DIR>]`
///
/// Perfila las tablas ya cargadas en el almacén y escribe un CSV por tabla
/// (`<tabla>_eda.csv`) en el directorio de salida. Sin `--table` se
/// analizan todas las tablas del esquema.
fn run_profile(args: &[String]) -> Result<(), RunError> {
    let mut table: Option<String> = None;
    let mut out = PathBuf::from("reports");
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--table" => {
                i += 1;
                if i < args.len() {
                    table = Some(args[i].clone());
                }
            }
            "--all" => table = None,
            "--out" => {
                i += 1;
                if i < args.len() {
                    out = PathBuf::from(&args[i]);
                }
            }
            other => {
                return Err(RunError::Setup(format!(
                    "unknown profile argument '{other}' (usage: bcflow profile [--table <NAME> | --all] [--out <DIR>])"
                )));
            }
        }
        i += 1;
    }

    let pool = build_pool_from_env().map_err(|e| RunError::Setup(e.to_string()))?;
    let mut store = PgTableStore::new(PoolProvider { pool });

    let tables = match table {
        Some(name) => vec![name],
        None => store.list_tables().map_err(|e| RunError::Report(e.to_string()))?,
    };
    if tables.is_empty() {
        info!("sin tablas en el esquema: nada que perfilar");
        return Ok(());
    }

    std::fs::create_dir_all(&out)
        .map_err(|e| RunError::Setup(format!("output dir '{}': {e}", out.display())))?;

    for tbl in &tables {
        let profiles = profile_table(&mut store, tbl).map_err(|e| RunError::Report(e.to_string()))?;
        let path = out.join(format!("{tbl}_eda.csv"));
        write_profile_csv(&path, &profiles).map_err(|e| RunError::Report(e.to_string()))?;
        info!("tabla '{}': perfil en {}", tbl, path.display());
    }
    Ok(())
}
