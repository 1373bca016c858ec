//! Ciclo de vida del token OAuth2 (grant client-credentials).
//!
//! Caché de un único token con margen de seguridad: nunca se devuelve un
//! token a menos de `GRACE` de su expiración. `&mut self` codifica la
//! semántica de escritor único; no hay locks porque no hay concurrencia.

use bc_core::EtlError;
use chrono::{DateTime, Duration, Utc};
use log::{debug, info};
use serde::Deserialize;

use crate::config::ApiConfig;

/// Margen antes de la expiración a partir del cual el token se renueva.
const GRACE_SECONDS: i64 = 60;

/// Respuesta del proveedor de identidad al grant.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

/// Token emitido con su instante de expiración.
#[derive(Debug, Clone)]
struct AccessToken {
    token: String,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    fn is_expired(&self, grace: Duration) -> bool {
        Utc::now() + grace >= self.expires_at
    }
}

/// Adquiere y cachea el token de acceso; renueva en expiración o tras
/// invalidación explícita (401 aguas arriba).
pub struct TokenManager {
    config: ApiConfig,
    http: reqwest::blocking::Client,
    cached: Option<AccessToken>,
}

impl TokenManager {
    pub fn new(config: ApiConfig, http: reqwest::blocking::Client) -> Self {
        Self { config, http, cached: None }
    }

    /// Devuelve un token vigente, emitiendo uno nuevo si hace falta.
    /// Grant rechazado por el proveedor -> `EtlError::Auth`.
    pub fn token(&mut self) -> Result<String, EtlError> {
        let grace = Duration::seconds(GRACE_SECONDS);
        if let Some(cached) = &self.cached {
            if !cached.is_expired(grace) {
                debug!("token cacheado vigente hasta {}", cached.expires_at);
                return Ok(cached.token.clone());
            }
        }

        let fresh = self.acquire()?;
        let token = fresh.token.clone();
        self.cached = Some(fresh);
        Ok(token)
    }

    /// Descarta el token cacheado; la siguiente llamada emite uno nuevo.
    pub fn invalidate(&mut self) {
        debug!("token invalidado");
        self.cached = None;
    }

    fn acquire(&self) -> Result<AccessToken, EtlError> {
        let endpoint = self.config.token_endpoint();
        let params = [("grant_type", "client_credentials"),
                      ("client_id", self.config.client_id.as_str()),
                      ("client_secret", self.config.client_secret.as_str()),
                      ("scope", self.config.scope.as_str())];

        let response = self.http
                           .post(&endpoint)
                           .form(&params)
                           .send()
                           .map_err(|e| EtlError::Auth(format!("token request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(EtlError::Auth(format!("token grant rejected with status {status}: {body}")));
        }

        let parsed: TokenResponse = response.json()
                                            .map_err(|e| EtlError::Auth(format!("malformed token response: {e}")))?;
        let expires_at = Utc::now() + Duration::seconds(parsed.expires_in);
        info!("token emitido, expira {}", expires_at);
        Ok(AccessToken { token: parsed.access_token, expires_at })
    }
}
