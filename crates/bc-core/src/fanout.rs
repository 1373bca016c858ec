//! Fan-out multi-compañía: repite una extracción por cada compañía del
//! tenant, aislando fallos por compañía.

use bc_domain::{CompanyRecord, Dataset};
use log::{error, info, warn};

use crate::errors::EtlError;
use crate::sources::EntityExtractor;

/// Extrae `entity` para cada compañía, en orden de entrada estricto.
///
/// Un `EtlError::Extraction` de una compañía se registra y aporta cero
/// filas; las compañías restantes se procesan igual (aislamiento de fallo
/// parcial, sin abortar). `Auth` e `InvalidArgument` sí propagan: unas
/// credenciales rechazadas no son una condición por-compañía.
///
/// El resultado es la concatenación de los datasets por compañía en orden
/// de iteración, cada fila estampada con su `CompanyId`.
pub fn extract_for_companies(extractor: &mut dyn EntityExtractor,
                             companies: &[CompanyRecord],
                             entity: &str)
                             -> Result<Dataset, EtlError> {
    let mut merged = Dataset::new(entity);
    let mut processed = 0usize;
    let mut failed = 0usize;

    if companies.is_empty() {
        warn!("fan-out '{}': sin compañías que procesar", entity);
        return Ok(merged);
    }

    for company in companies {
        let Some(id) = company.usable_id() else {
            warn!("fan-out '{}': compañía '{}' sin id, omitida", entity, company.name);
            failed += 1;
            continue;
        };

        match extractor.extract(entity, id) {
            Ok(mut dataset) => {
                info!("fan-out '{}': {} filas para '{}'", entity, dataset.len(), id);
                dataset.tag_company(id);
                merged.concat(dataset);
                processed += 1;
            }
            Err(err @ EtlError::Extraction { .. }) => {
                error!("fan-out '{}': fallo aislado para '{}': {}", entity, id, err);
                failed += 1;
            }
            Err(fatal) => return Err(fatal),
        }
    }

    info!("fan-out '{}' completado: {} filas (procesadas={}, fallidas/omitidas={}, total={})",
          entity,
          merged.len(),
          processed,
          failed,
          companies.len());
    Ok(merged)
}
