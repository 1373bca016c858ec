//! Perfilado exploratorio de tablas persistidas.
//!
//! Lee una tabla completa del `TableStore` y emite métricas por columna:
//! tipo inferido, nulos, cardinalidad, moda y estadísticos descriptivos
//! para columnas numéricas. No toca el API de negocio; es una lectura
//! lateral pensada para invocarse ad hoc desde la CLI.

use bc_domain::{Dataset, Row};
use log::info;
use serde_json::Value;

use crate::errors::EtlError;
use crate::load::TableStore;

/// Métricas de una columna de la tabla analizada.
///
/// Los campos numéricos (`pct_zeros`, `mean`, `std`, `min`, `max`) sólo
/// aplican a columnas cuyos valores no nulos son todos numéricos; en el
/// resto quedan en `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnProfile {
    pub column: String,
    pub data_type: String,
    pub row_count: usize,
    pub unique_values: usize,
    pub pct_unique: f64,
    pub pct_nulls: f64,
    pub pct_zeros: Option<f64>,
    /// `true` si la columna podría tratarse como clave (cardinalidad == filas).
    pub is_unique: bool,
    pub most_common_value: Option<String>,
    pub freq_most_common: Option<f64>,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Perfila una tabla persistida. Tabla inexistente -> `InvalidArgument`.
pub fn profile_table(store: &mut dyn TableStore, table: &str) -> Result<Vec<ColumnProfile>, EtlError> {
    if !store.table_exists(table)? {
        return Err(EtlError::InvalidArgument(format!("table '{table}' not found in store")));
    }
    info!("perfilando tabla '{table}'");
    let rows = store.fetch_rows(table)?;
    let report = profile_dataset(&Dataset::with_rows(table, rows));
    info!("perfil de '{table}' completo: {} columnas", report.len());
    Ok(report)
}

/// Métricas por columna de un dataset en memoria, en orden de primera
/// aparición de los campos.
pub fn profile_dataset(dataset: &Dataset) -> Vec<ColumnProfile> {
    let row_count = dataset.len();
    dataset.field_names()
           .into_iter()
           .map(|column| profile_column(&column, &dataset.rows, row_count))
           .collect()
}

fn profile_column(column: &str, rows: &[Row], row_count: usize) -> ColumnProfile {
    // Forma textual de cada valor no nulo, en orden, para cardinalidad y moda.
    let texts: Vec<String> = rows.iter()
                                 .filter_map(|r| r.get(column).and_then(Dataset::field_as_text))
                                 .collect();
    let nulls = row_count - texts.len();

    let mut seen: Vec<(String, usize)> = Vec::new();
    for t in &texts {
        match seen.iter_mut().find(|(v, _)| v == t) {
            Some((_, n)) => *n += 1,
            None => seen.push((t.clone(), 1)),
        }
    }
    let unique_values = seen.len();
    // moda: valor no nulo más frecuente; empate resuelto por primera aparición
    let mode = seen.iter()
                   .fold(None::<(String, usize)>, |best, cand| match best {
                       Some(b) if b.1 >= cand.1 => Some(b),
                       _ => Some(cand.clone()),
                   });

    let numbers: Vec<f64> = rows.iter()
                                .filter_map(|r| r.get(column))
                                .filter(|v| !v.is_null())
                                .map(numeric_value)
                                .collect::<Option<Vec<f64>>>()
                                .unwrap_or_default();
    let is_numeric = !numbers.is_empty() && numbers.len() == texts.len();

    let ratio = |n: usize| if row_count > 0 { n as f64 / row_count as f64 } else { 0.0 };
    let (pct_zeros, mean, std, min, max) = if is_numeric {
        let sum: f64 = numbers.iter().sum();
        let mean = sum / numbers.len() as f64;
        // desviación poblacional (ddof = 0)
        let var = numbers.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / numbers.len() as f64;
        let zeros = numbers.iter().filter(|x| **x == 0.0).count();
        let min = numbers.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = numbers.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        (Some(ratio(zeros)), Some(mean), Some(var.sqrt()), Some(min), Some(max))
    } else {
        (None, None, None, None, None)
    };

    ColumnProfile { column: column.to_string(),
                    data_type: infer_type(&texts, is_numeric),
                    row_count,
                    unique_values,
                    pct_unique: ratio(unique_values),
                    pct_nulls: ratio(nulls),
                    pct_zeros,
                    is_unique: row_count > 0 && unique_values == row_count,
                    most_common_value: mode.as_ref().map(|(v, _)| v.clone()),
                    freq_most_common: mode.map(|(_, n)| ratio(n)),
                    mean,
                    std,
                    min,
                    max }
}

/// Valor numérico de un campo. Las columnas TEXT del almacén devuelven
/// números en forma de cadena; también se aceptan.
fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn infer_type(texts: &[String], is_numeric: bool) -> String {
    if texts.is_empty() {
        return "empty".to_string();
    }
    if is_numeric {
        return "numeric".to_string();
    }
    if texts.iter().all(|t| t == "true" || t == "false") {
        return "boolean".to_string();
    }
    "text".to_string()
}
