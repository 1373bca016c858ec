//! Cliente HTTP autenticado contra la API de entidades.
//!
//! Política de re-autenticación: un 401 invalida el token cacheado, emite
//! uno nuevo y reintenta la petición exactamente una vez; un segundo 401
//! consecutivo es fatal para la operación y sube como `Auth`.

use std::cell::RefCell;
use std::rc::Rc;

use bc_domain::Row;
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

use crate::token::TokenManager;

/// Cliente compartido entre el repositorio de compañías y el extractor:
/// un único `TokenManager`, una única caché de token por corrida.
pub type SharedClient = Rc<RefCell<BcClient>>;

/// Sobre OData de una página de resultados.
#[derive(Debug, Deserialize)]
pub struct ODataPage {
    #[serde(default)]
    pub value: Vec<Row>,
    #[serde(rename = "@odata.nextLink")]
    pub next_link: Option<String>,
}

/// Fallo de una petición GET, antes de traducirse a la taxonomía del
/// pipeline (el llamador conoce la entidad y compañía afectadas).
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("authentication rejected: {0}")]
    Auth(String),
    #[error("{0}")]
    Request(String),
}

impl From<bc_core::EtlError> for RequestError {
    fn from(err: bc_core::EtlError) -> Self {
        match err {
            bc_core::EtlError::Auth(msg) => RequestError::Auth(msg),
            other => RequestError::Request(other.to_string()),
        }
    }
}

/// GET autenticado con inyección de `Authorization: Bearer`.
pub struct BcClient {
    http: reqwest::blocking::Client,
    tokens: TokenManager,
}

impl BcClient {
    pub fn new(http: reqwest::blocking::Client, tokens: TokenManager) -> Self {
        Self { http, tokens }
    }

    /// Envuelve el cliente para compartirlo entre varios consumidores.
    pub fn into_shared(self) -> SharedClient {
        Rc::new(RefCell::new(self))
    }

    /// GET a `url` deserializando el cuerpo JSON. Aplica la política de
    /// reintento único tras 401.
    pub fn get_json<T: DeserializeOwned>(&mut self, url: &str) -> Result<T, RequestError> {
        let token = self.tokens.token()?;
        match self.send(url, &token)? {
            Response::Ok(body) => parse(body),
            Response::Unauthorized => {
                warn!("401 en {url}: re-autenticando una vez");
                self.tokens.invalidate();
                let fresh = self.tokens.token()?;
                match self.send(url, &fresh)? {
                    Response::Ok(body) => parse(body),
                    Response::Unauthorized => {
                        Err(RequestError::Auth(format!("401 repeated after re-authentication on {url}")))
                    }
                }
            }
        }
    }

    /// Página OData de `url`.
    pub fn get_page(&mut self, url: &str) -> Result<ODataPage, RequestError> {
        self.get_json(url)
    }

    fn send(&self, url: &str, token: &str) -> Result<Response, RequestError> {
        debug!("GET {url}");
        let response = self.http
                           .get(url)
                           .bearer_auth(token)
                           .send()
                           .map_err(|e| RequestError::Request(format!("transport failure: {e}")))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Ok(Response::Unauthorized);
        }
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(RequestError::Request(format!("status {status}: {body}")));
        }
        let body = response.text()
                           .map_err(|e| RequestError::Request(format!("body read failure: {e}")))?;
        Ok(Response::Ok(body))
    }
}

enum Response {
    Ok(String),
    Unauthorized,
}

fn parse<T: DeserializeOwned>(body: String) -> Result<T, RequestError> {
    serde_json::from_str(&body).map_err(|e| RequestError::Request(format!("malformed response body: {e}")))
}
