//! Steps de extracción: compañías del tenant y fan-out por entidad.

use bc_core::{extract_for_companies, transform, DatasetSlot, EtlError, EtlStep, PipelineContext,
              StepOutcome};
use log::info;

/// Lista las compañías del tenant y aplica el filtro de exclusión antes de
/// dejarlas en el contexto. Las compañías excluidas no generan ninguna
/// petición posterior.
pub struct ExtractCompaniesStep;

impl EtlStep for ExtractCompaniesStep {
    fn id(&self) -> &str {
        "extract_companies"
    }

    fn run(&self, ctx: &mut PipelineContext) -> Result<StepOutcome, EtlError> {
        let all = ctx.repository.companies()?;
        let kept = transform::filter_excluded(&all, &ctx.excluded_companies);
        if kept.len() < all.len() {
            info!("{} compañías excluidas por configuración", all.len() - kept.len());
        }
        let count = kept.len();
        ctx.companies = Some(kept);
        Ok(StepOutcome::rows(count))
    }
}

/// Fan-out de una entidad sobre todas las compañías del contexto; el
/// resultado etiquetado queda en el slot correspondiente.
pub struct ExtractEntityStep {
    slot: DatasetSlot,
    id: String,
}

impl ExtractEntityStep {
    pub fn new(slot: DatasetSlot) -> Self {
        Self { id: format!("extract_{}", slot.name()), slot }
    }
}

impl EtlStep for ExtractEntityStep {
    fn id(&self) -> &str {
        &self.id
    }

    fn run(&self, ctx: &mut PipelineContext) -> Result<StepOutcome, EtlError> {
        let entity = self.slot.name();
        let (companies, extractor) = ctx.companies_with_extractor()?;
        let dataset = extract_for_companies(extractor, companies, entity)?;
        let count = dataset.len();
        ctx.set_dataset(self.slot, dataset);
        Ok(StepOutcome::rows(count))
    }
}
