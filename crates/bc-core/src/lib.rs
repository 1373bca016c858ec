//! bc-core: motor secuencial de extracción/reconciliación.
//!
//! Contiene el pipeline de Steps sobre contexto tipado, las funciones puras
//! de transformación, el algoritmo de carga incremental sobre el trait
//! `TableStore` y el fan-out multi-compañía sobre el trait
//! `EntityExtractor`. Las implementaciones con IO real (HTTP, Postgres)
//! viven en `bc-extract` y `bc-persistence`.

pub mod context;
pub mod controller;
pub mod errors;
pub mod fanout;
pub mod load;
pub mod profile;
pub mod sources;
pub mod step;
pub mod transform;

pub use context::{DatasetSlot, PipelineContext};
pub use controller::{PipelineController, PipelineError, RunSummary, StepReport};
pub use errors::EtlError;
pub use fanout::extract_for_companies;
pub use load::{InMemoryTableStore, IncrementalLoader, TableStore};
pub use profile::{profile_dataset, profile_table, ColumnProfile};
pub use sources::{CompanyRepository, EntityExtractor};
pub use step::{EtlStep, FailurePolicy, StepOutcome};
