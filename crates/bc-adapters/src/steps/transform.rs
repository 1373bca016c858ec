//! Steps de transformación pura sobre slots del contexto.

use std::collections::HashSet;

use bc_core::{transform, DatasetSlot, EtlError, EtlStep, PipelineContext, StepOutcome};

/// Elimina campos de un dataset antes de cargarlo (columnas de auditoría del
/// API que no interesan en destino).
pub struct DropFieldsStep {
    slot: DatasetSlot,
    fields: HashSet<String>,
    id: String,
}

impl DropFieldsStep {
    pub fn new(slot: DatasetSlot, fields: impl IntoIterator<Item = String>) -> Self {
        Self { id: format!("drop_fields_{}", slot.name()),
               slot,
               fields: fields.into_iter().collect() }
    }
}

impl EtlStep for DropFieldsStep {
    fn id(&self) -> &str {
        &self.id
    }

    fn run(&self, ctx: &mut PipelineContext) -> Result<StepOutcome, EtlError> {
        let out = transform::drop_fields(ctx.dataset(self.slot)?, &self.fields);
        let count = out.len();
        ctx.set_dataset(self.slot, out);
        Ok(StepOutcome::rows(count))
    }
}

/// Crea un campo derivado concatenando la forma textual de otros campos.
pub struct ConcatFieldsStep {
    slot: DatasetSlot,
    new_field: String,
    parts: Vec<String>,
    separator: String,
    id: String,
}

impl ConcatFieldsStep {
    pub fn new(slot: DatasetSlot,
               new_field: impl Into<String>,
               parts: Vec<String>,
               separator: impl Into<String>)
               -> Self {
        let new_field = new_field.into();
        Self { id: format!("concat_{}_{new_field}", slot.name()),
               slot,
               new_field,
               parts,
               separator: separator.into() }
    }
}

impl EtlStep for ConcatFieldsStep {
    fn id(&self) -> &str {
        &self.id
    }

    fn run(&self, ctx: &mut PipelineContext) -> Result<StepOutcome, EtlError> {
        let out = transform::concat_fields(ctx.dataset(self.slot)?,
                                           &self.new_field,
                                           &self.parts,
                                           &self.separator);
        let count = out.len();
        ctx.set_dataset(self.slot, out);
        Ok(StepOutcome::rows(count))
    }
}
