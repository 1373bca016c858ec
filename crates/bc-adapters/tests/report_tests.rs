//! Escritura del reporte CSV de perfilado.

use bc_adapters::write_profile_csv;
use bc_core::{profile_dataset, EtlError};
use bc_domain::{Dataset, Row};
use serde_json::{json, Value};

fn row(pairs: &[(&str, Value)]) -> Row {
    pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}

fn sample_profiles() -> Vec<bc_core::ColumnProfile> {
    let ds = Dataset::with_rows("customers",
                                vec![row(&[("id", json!("1")), ("name", json!("Pérez, S.A.")), ("balance", json!("0"))]),
                                     row(&[("id", json!("2")), ("name", json!("Beta")), ("balance", json!("4"))])]);
    profile_dataset(&ds)
}

#[test]
fn profile_report_uses_semicolon_delimiter() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("customers_bc_eda.csv");

    write_profile_csv(&path, &sample_profiles()).unwrap();

    let written = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = written.lines().collect();
    assert!(lines[0].starts_with("column;data_type;row_count"));
    // una fila por columna del dataset, tras la cabecera
    assert_eq!(lines.len(), 4);
    // la moda con coma interna no rompe el registro
    let name_line = lines.iter().find(|l| l.starts_with("name;")).unwrap();
    assert!(name_line.contains("Pérez, S.A."));
}

#[test]
fn numeric_stats_appear_and_text_stats_stay_blank() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.csv");

    write_profile_csv(&path, &sample_profiles()).unwrap();

    let written = std::fs::read_to_string(&path).unwrap();
    let balance = written.lines().find(|l| l.starts_with("balance;")).unwrap();
    assert!(balance.contains(";numeric;"));
    assert!(balance.ends_with(";2;2;0;4"), "mean;std;min;max al final: {balance}");
    let name = written.lines().find(|l| l.starts_with("name;")).unwrap();
    assert!(name.ends_with(";;;;"), "columna de texto sin estadísticos: {name}");
}

#[test]
fn unwritable_report_path_is_export_error() {
    let err = write_profile_csv(std::path::Path::new("/nonexistent-dir/r.csv"), &sample_profiles()).unwrap_err();
    assert!(matches!(err, EtlError::Export(_)));
}
