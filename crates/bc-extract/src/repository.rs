//! Listado de compañías del tenant vía API.

use bc_core::{CompanyRepository, EtlError};
use bc_domain::CompanyRecord;
use log::info;
use serde::Deserialize;

use crate::client::{RequestError, SharedClient};

#[derive(Debug, Deserialize)]
struct CompanyPage {
    #[serde(default)]
    value: Vec<CompanyRecord>,
    #[serde(rename = "@odata.nextLink")]
    next_link: Option<String>,
}

/// `CompanyRepository` respaldado por el API: GET `{base}/companies`,
/// paginado con el mismo sobre OData que las entidades. Comparte el
/// cliente autenticado con el extractor.
pub struct BcRepository {
    client: SharedClient,
    base_url: String,
}

impl BcRepository {
    pub fn new(client: SharedClient, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self { base_url: base_url.trim_end_matches('/').to_string(), client }
    }
}

impl CompanyRepository for BcRepository {
    fn companies(&mut self) -> Result<Vec<CompanyRecord>, EtlError> {
        let mut records: Vec<CompanyRecord> = Vec::new();
        let mut next = Some(format!("{}/companies", self.base_url));

        while let Some(url) = next {
            let page: CompanyPage = self.client.borrow_mut().get_json(&url).map_err(|err| match err {
                RequestError::Auth(msg) => EtlError::Auth(msg),
                RequestError::Request(msg) => EtlError::extraction("companies", "-", msg),
            })?;
            records.extend(page.value);
            next = page.next_link;
        }

        info!("{} compañías en el tenant", records.len());
        Ok(records)
    }
}
