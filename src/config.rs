//! Configuración de la corrida: lista de exclusión y exportación opcional.
//!
//! Se lee de un archivo JSON (`bcflow.json` por defecto, sobreescribible con
//! `BCFLOW_CONFIG`). Es un valor explícito construido una vez en `main` y
//! pasado a los componentes que lo necesitan; nunca estado global.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use bc_core::EtlError;
use log::info;
use serde::Deserialize;

pub const DEFAULT_CONFIG_PATH: &str = "bcflow.json";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RunConfig {
    /// Ids de compañía que no se procesan en ningún step.
    #[serde(default)]
    pub excluded_companies: Vec<String>,
    /// Directorio donde dejar snapshots CSV; sin valor, no se exporta.
    #[serde(default)]
    pub export_dir: Option<PathBuf>,
}

impl RunConfig {
    /// Carga el archivo configurado. Un archivo ausente equivale a la
    /// configuración por defecto; un archivo malformado es un error.
    pub fn load() -> Result<Self, EtlError> {
        let path = std::env::var("BCFLOW_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::from_path(Path::new(&path))
    }

    pub fn from_path(path: &Path) -> Result<Self, EtlError> {
        if !path.exists() {
            info!("sin archivo de configuración en {}: valores por defecto", path.display());
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .map_err(|e| EtlError::InvalidArgument(format!("cannot read config '{}': {e}", path.display())))?;
        Self::from_json(&raw)
            .map_err(|e| EtlError::InvalidArgument(format!("malformed config '{}': {e}", path.display())))
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn excluded_set(&self) -> HashSet<String> {
        self.excluded_companies.iter().cloned().collect()
    }
}
