//! Steps de carga: verificación de conectividad y carga incremental.

use bc_core::{DatasetSlot, EtlError, EtlStep, IncrementalLoader, PipelineContext, StepOutcome};

/// Verifica la conectividad del almacén antes de cualquier carga. Un store
/// inalcanzable detiene la corrida aquí, no a mitad de una inserción.
pub struct PingStoreStep;

impl EtlStep for PingStoreStep {
    fn id(&self) -> &str {
        "ping_store"
    }

    fn run(&self, ctx: &mut PipelineContext) -> Result<StepOutcome, EtlError> {
        ctx.store.ping()?;
        Ok(StepOutcome::none())
    }
}

/// Carga incremental de un slot del contexto en una tabla destino.
///
/// Con `primary_key = None` la tabla es de volcado: cada corrida añade todas
/// las filas de nuevo. Es un modo explícito que el llamador elige al
/// construir el step.
pub struct StoreDatasetStep {
    slot: DatasetSlot,
    table: String,
    primary_key: Option<String>,
    id: String,
}

impl StoreDatasetStep {
    pub fn new(slot: DatasetSlot, table: impl Into<String>, primary_key: Option<String>) -> Self {
        let table = table.into();
        Self { id: format!("store_{table}"), slot, table, primary_key }
    }
}

impl EtlStep for StoreDatasetStep {
    fn id(&self) -> &str {
        &self.id
    }

    fn run(&self, ctx: &mut PipelineContext) -> Result<StepOutcome, EtlError> {
        let (dataset, store) = ctx.dataset_with_store(self.slot)?;
        let inserted = IncrementalLoader::new(store)
            .incremental_insert(&self.table, dataset, self.primary_key.as_deref())?;
        Ok(StepOutcome::rows(inserted))
    }
}
