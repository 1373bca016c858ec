//! Exportación de un dataset como artefacto CSV lateral.

use std::path::PathBuf;

use bc_core::{DatasetSlot, EtlError, EtlStep, FailurePolicy, PipelineContext, StepOutcome};
use bc_domain::Dataset;
use log::info;

/// Serializa un slot del contexto a un archivo CSV.
///
/// Artefacto lateral de la corrida: un fallo de escritura se registra y la
/// corrida continúa (`ContinueLogged`); el CSV no condiciona la carga.
pub struct ExportCsvStep {
    slot: DatasetSlot,
    path: PathBuf,
    id: String,
}

impl ExportCsvStep {
    pub fn new(slot: DatasetSlot, path: impl Into<PathBuf>) -> Self {
        Self { id: format!("export_csv_{}", slot.name()), slot, path: path.into() }
    }
}

impl EtlStep for ExportCsvStep {
    fn id(&self) -> &str {
        &self.id
    }

    fn failure_policy(&self) -> FailurePolicy {
        FailurePolicy::ContinueLogged
    }

    fn run(&self, ctx: &mut PipelineContext) -> Result<StepOutcome, EtlError> {
        let dataset = ctx.dataset(self.slot)?;
        let fields = dataset.field_names();

        let mut writer = csv::Writer::from_path(&self.path)
            .map_err(|e| EtlError::Export(format!("csv export to '{}' failed: {e}", self.path.display())))?;
        writer.write_record(&fields)
              .map_err(|e| EtlError::Export(format!("csv header write failed: {e}")))?;
        for row in &dataset.rows {
            let record: Vec<String> = fields.iter()
                                            .map(|f| {
                                                row.get(f)
                                                   .and_then(Dataset::field_as_text)
                                                   .unwrap_or_default()
                                            })
                                            .collect();
            writer.write_record(&record)
                  .map_err(|e| EtlError::Export(format!("csv row write failed: {e}")))?;
        }
        writer.flush()
              .map_err(|e| EtlError::Export(format!("csv flush failed: {e}")))?;

        info!("{} filas exportadas a {}", dataset.len(), self.path.display());
        Ok(StepOutcome::rows(dataset.len()))
    }
}
