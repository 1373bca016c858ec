//! bc-adapters: implementaciones concretas de `EtlStep`.
//!
//! Cada step lee/escribe slots del `PipelineContext` y delega el trabajo en
//! el motor (`bc-core`): fan-out, transformaciones puras y carga
//! incremental. Los steps no guardan estado entre corridas.

pub mod report;
pub mod steps;

pub use report::write_profile_csv;
pub use steps::export::ExportCsvStep;
pub use steps::extract::{ExtractCompaniesStep, ExtractEntityStep};
pub use steps::load::{PingStoreStep, StoreDatasetStep};
pub use steps::transform::{ConcatFieldsStep, DropFieldsStep};
