//! Transformaciones puras sobre datasets: sin red, sin base de datos.
//!
//! Todas las funciones devuelven estructuras nuevas; los inputs nunca se
//! mutan. Los fallos se limitan a formas de entrada malformadas y se
//! reportan como `EtlError::Transform`.

use std::collections::HashSet;

use bc_domain::{CompanyRecord, Dataset, Row};
use serde_json::Value;

use crate::errors::EtlError;

/// Elimina las compañías cuyo id está en el conjunto de exclusión.
/// Preserva el orden de las restantes.
pub fn filter_excluded(companies: &[CompanyRecord], excluded: &HashSet<String>) -> Vec<CompanyRecord> {
    companies.iter()
             .filter(|c| !excluded.contains(&c.id))
             .cloned()
             .collect()
}

/// Left-join de dos datasets sobre una clave compartida.
///
/// Cada fila de `left` se enriquece con los campos de la primera fila de
/// `right` con el mismo valor de clave; campos ya presentes en `left` no se
/// sobrescriben. Filas de `left` sin pareja se conservan tal cual.
pub fn merge_on_key(left: &Dataset, right: &Dataset, key: &str) -> Result<Dataset, EtlError> {
    let mut by_key: std::collections::HashMap<String, &Row> = std::collections::HashMap::new();
    for row in &right.rows {
        let k = key_text(row, key, &right.entity)?;
        by_key.entry(k).or_insert(row);
    }

    let mut merged = Vec::with_capacity(left.rows.len());
    for row in &left.rows {
        let k = key_text(row, key, &left.entity)?;
        let mut out = row.clone();
        if let Some(extra) = by_key.get(&k) {
            for (field, value) in extra.iter() {
                out.entry(field.clone()).or_insert_with(|| value.clone());
            }
        }
        merged.push(out);
    }
    Ok(Dataset::with_rows(left.entity.clone(), merged))
}

/// Elimina campos de cada fila; orden de filas intacto.
pub fn drop_fields(dataset: &Dataset, fields: &HashSet<String>) -> Dataset {
    let rows = dataset.rows
                      .iter()
                      .map(|row| {
                          row.iter()
                             .filter(|(k, _)| !fields.contains(*k))
                             .map(|(k, v)| (k.clone(), v.clone()))
                             .collect()
                      })
                      .collect();
    Dataset::with_rows(dataset.entity.clone(), rows)
}

/// Crea un campo nuevo concatenando la forma textual de otros campos.
/// Campos ausentes o nulos contribuyen la cadena vacía.
pub fn concat_fields(dataset: &Dataset, new_field: &str, parts: &[String], separator: &str) -> Dataset {
    let rows = dataset.rows
                      .iter()
                      .map(|row| {
                          let joined = parts.iter()
                                            .map(|p| {
                                                row.get(p)
                                                   .and_then(Dataset::field_as_text)
                                                   .unwrap_or_default()
                                            })
                                            .collect::<Vec<_>>()
                                            .join(separator);
                          let mut out = row.clone();
                          out.insert(new_field.to_string(), Value::String(joined));
                          out
                      })
                      .collect();
    Dataset::with_rows(dataset.entity.clone(), rows)
}

fn key_text(row: &Row, key: &str, entity: &str) -> Result<String, EtlError> {
    let value = row.get(key)
                   .ok_or_else(|| EtlError::Transform(format!("row in '{entity}' lacks merge key '{key}'")))?;
    Dataset::field_as_text(value)
        .ok_or_else(|| EtlError::Transform(format!("merge key '{key}' is null in '{entity}'")))
}
