//! Dataset extraído: secuencia ordenada de filas JSON de una misma entidad.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Fila de datos: mapa campo -> valor tal como lo devuelve el API.
pub type Row = Map<String, Value>;

/// Campo que el fan-out multi-compañía estampa en cada fila.
pub const COMPANY_ID_FIELD: &str = "CompanyId";

/// Secuencia ordenada de filas de una entidad.
///
/// El orden de filas es el orden del servidor (página a página) y se
/// preserva en todas las operaciones. Invariante: todas las filas producto
/// de una extracción llevan el mismo tag de compañía.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub entity: String,
    pub rows: Vec<Row>,
}

impl Dataset {
    pub fn new(entity: impl Into<String>) -> Self {
        Self { entity: entity.into(), rows: Vec::new() }
    }

    pub fn with_rows(entity: impl Into<String>, rows: Vec<Row>) -> Self {
        Self { entity: entity.into(), rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Añade las filas de una página preservando el orden del servidor.
    pub fn append_page(&mut self, rows: Vec<Row>) {
        self.rows.extend(rows);
    }

    /// Estampa `CompanyId` en cada fila. Sobrescribe un tag previo para
    /// garantizar el invariante de consistencia por extracción.
    pub fn tag_company(&mut self, company_id: &str) {
        for row in &mut self.rows {
            row.insert(COMPANY_ID_FIELD.to_string(), Value::String(company_id.to_string()));
        }
    }

    /// Concatena otro dataset al final (orden de iteración de compañías).
    pub fn concat(&mut self, other: Dataset) {
        self.rows.extend(other.rows);
    }

    /// Unión de campos observados en todas las filas, en orden de primera
    /// aparición. Define las columnas al crear la tabla destino.
    pub fn field_names(&self) -> Vec<String> {
        let mut fields: IndexSet<String> = IndexSet::new();
        for row in &self.rows {
            for key in row.keys() {
                fields.insert(key.clone());
            }
        }
        fields.into_iter().collect()
    }

    /// Valor de un campo como texto (forma escalar o JSON compacto).
    pub fn field_as_text(value: &Value) -> Option<String> {
        match value {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Number(n) => Some(n.to_string()),
            other => Some(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(pairs: &[(&str, Value)]) -> Row {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn tag_company_stamps_every_row() {
        let mut ds = Dataset::with_rows("customers", vec![row(&[("id", json!("1"))]),
                                                          row(&[("id", json!("2"))])]);
        ds.tag_company("A");
        assert!(ds.rows.iter().all(|r| r[COMPANY_ID_FIELD] == json!("A")));
    }

    #[test]
    fn tag_company_overwrites_previous_tag() {
        let mut ds = Dataset::with_rows("customers", vec![row(&[("id", json!("1")), (COMPANY_ID_FIELD, json!("old"))])]);
        ds.tag_company("new");
        assert_eq!(ds.rows[0][COMPANY_ID_FIELD], json!("new"));
    }

    #[test]
    fn field_names_union_in_first_seen_order() {
        let ds = Dataset::with_rows("x", vec![row(&[("a", json!(1)), ("b", json!(2))]),
                                              row(&[("b", json!(3)), ("c", json!(4))])]);
        assert_eq!(ds.field_names(), vec!["a", "b", "c"]);
    }

    #[test]
    fn append_page_preserves_order() {
        let mut ds = Dataset::new("x");
        ds.append_page(vec![row(&[("n", json!(1))]), row(&[("n", json!(2))])]);
        ds.append_page(vec![row(&[("n", json!(3))])]);
        let ns: Vec<i64> = ds.rows.iter().map(|r| r["n"].as_i64().unwrap()).collect();
        assert_eq!(ns, vec![1, 2, 3]);
    }

    #[test]
    fn field_as_text_scalar_and_structured() {
        assert_eq!(Dataset::field_as_text(&json!("s")), Some("s".into()));
        assert_eq!(Dataset::field_as_text(&json!(42)), Some("42".into()));
        assert_eq!(Dataset::field_as_text(&json!(true)), Some("true".into()));
        assert_eq!(Dataset::field_as_text(&Value::Null), None);
        assert_eq!(Dataset::field_as_text(&json!({"k":1})), Some("{\"k\":1}".into()));
    }
}
