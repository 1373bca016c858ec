//! Reporte CSV del perfilado de tablas.
//!
//! Escribe el perfil por columna que produce `bc_core::profile` en un CSV
//! delimitado por `;` (los valores modales pueden llevar comas), un archivo
//! por tabla analizada.

use std::path::Path;

use bc_core::{ColumnProfile, EtlError};
use log::info;

fn cell_opt_f64(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Vuelca un perfil de tabla a `path`. Crea el archivo, no directorios.
pub fn write_profile_csv(path: &Path, profiles: &[ColumnProfile]) -> Result<(), EtlError> {
    let mut writer = csv::WriterBuilder::new().delimiter(b';')
                                              .from_path(path)
                                              .map_err(|e| {
                                                  EtlError::Export(format!("profile report to '{}' failed: {e}",
                                                                           path.display()))
                                              })?;
    writer.write_record(["column",
                         "data_type",
                         "row_count",
                         "unique_values",
                         "pct_unique",
                         "pct_nulls",
                         "pct_zeros",
                         "is_unique",
                         "most_common_value",
                         "freq_most_common",
                         "mean",
                         "std",
                         "min",
                         "max"])
          .map_err(|e| EtlError::Export(format!("profile header write failed: {e}")))?;
    for p in profiles {
        writer.write_record([p.column.clone(),
                             p.data_type.clone(),
                             p.row_count.to_string(),
                             p.unique_values.to_string(),
                             p.pct_unique.to_string(),
                             p.pct_nulls.to_string(),
                             cell_opt_f64(p.pct_zeros),
                             p.is_unique.to_string(),
                             p.most_common_value.clone().unwrap_or_default(),
                             cell_opt_f64(p.freq_most_common),
                             cell_opt_f64(p.mean),
                             cell_opt_f64(p.std),
                             cell_opt_f64(p.min),
                             cell_opt_f64(p.max)])
              .map_err(|e| EtlError::Export(format!("profile row write failed: {e}")))?;
    }
    writer.flush()
          .map_err(|e| EtlError::Export(format!("profile flush failed: {e}")))?;
    info!("perfil de {} columnas escrito en {}", profiles.len(), path.display());
    Ok(())
}
