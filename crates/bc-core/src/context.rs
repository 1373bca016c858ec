//! Contexto tipado de una corrida del pipeline.
//!
//! Sustituye el mapa clave→valor de forma libre por un struct con un campo
//! opcional por dataset: un Step que lee un slot que ningún step anterior
//! garantizó escribir falla de forma explícita, nunca con un panic.

use std::collections::HashSet;

use bc_domain::{CompanyRecord, Dataset};

use crate::errors::EtlError;
use crate::load::TableStore;
use crate::sources::{CompanyRepository, EntityExtractor};

/// Slots de dataset disponibles en el contexto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetSlot {
    Customers,
    Projects,
}

impl DatasetSlot {
    pub fn name(&self) -> &'static str {
        match self {
            DatasetSlot::Customers => "customers",
            DatasetSlot::Projects => "projects",
        }
    }
}

/// Contexto mutable compartido entre Steps. Propiedad exclusiva del
/// controlador durante la corrida; cada Step recibe acceso temporal por
/// referencia. Sin acceso concurrente por diseño.
pub struct PipelineContext {
    // Handles de infraestructura, sembrados antes del primer step.
    pub repository: Box<dyn CompanyRepository>,
    pub extractor: Box<dyn EntityExtractor>,
    pub store: Box<dyn TableStore>,
    /// Ids de compañía excluidos del procesamiento (configuración externa).
    pub excluded_companies: HashSet<String>,

    // Datasets producidos por los steps.
    pub companies: Option<Vec<CompanyRecord>>,
    pub customers: Option<Dataset>,
    pub projects: Option<Dataset>,
}

impl PipelineContext {
    pub fn new(repository: Box<dyn CompanyRepository>,
               extractor: Box<dyn EntityExtractor>,
               store: Box<dyn TableStore>,
               excluded_companies: HashSet<String>)
               -> Self {
        Self { repository,
               extractor,
               store,
               excluded_companies,
               companies: None,
               customers: None,
               projects: None }
    }

    /// Compañías extraídas, o error si ningún step anterior las escribió.
    pub fn companies(&self) -> Result<&[CompanyRecord], EtlError> {
        self.companies
            .as_deref()
            .ok_or_else(|| EtlError::InvalidArgument("no companies in context: run the companies extraction step first".into()))
    }

    /// Dataset de un slot, o error si está sin escribir.
    pub fn dataset(&self, slot: DatasetSlot) -> Result<&Dataset, EtlError> {
        let opt = match slot {
            DatasetSlot::Customers => self.customers.as_ref(),
            DatasetSlot::Projects => self.projects.as_ref(),
        };
        opt.ok_or_else(|| EtlError::InvalidArgument(format!("dataset slot '{}' not written by any earlier step", slot.name())))
    }

    /// Compañías junto con el extractor, en préstamos disjuntos (un step de
    /// fan-out lee las compañías mientras muta el extractor).
    pub fn companies_with_extractor(&mut self)
                                    -> Result<(&[CompanyRecord], &mut dyn EntityExtractor), EtlError> {
        let companies = self.companies
                            .as_deref()
                            .ok_or_else(|| EtlError::InvalidArgument("no companies in context: run the companies extraction step first".into()))?;
        Ok((companies, self.extractor.as_mut()))
    }

    /// Dataset de un slot junto con el store, en préstamos disjuntos (un
    /// step de carga lee el dataset mientras muta el store).
    pub fn dataset_with_store(&mut self, slot: DatasetSlot)
                              -> Result<(&Dataset, &mut dyn TableStore), EtlError> {
        let opt = match slot {
            DatasetSlot::Customers => self.customers.as_ref(),
            DatasetSlot::Projects => self.projects.as_ref(),
        };
        let dataset = opt.ok_or_else(|| EtlError::InvalidArgument(format!("dataset slot '{}' not written by any earlier step", slot.name())))?;
        Ok((dataset, self.store.as_mut()))
    }

    pub fn set_dataset(&mut self, slot: DatasetSlot, dataset: Dataset) {
        match slot {
            DatasetSlot::Customers => self.customers = Some(dataset),
            DatasetSlot::Projects => self.projects = Some(dataset),
        }
    }
}
