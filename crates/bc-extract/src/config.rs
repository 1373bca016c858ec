//! Carga de configuración de la API desde variables de entorno.
//! Convención `BC_*`; el archivo `.env` se carga una sola vez.

use std::env;

use bc_core::EtlError;
use dotenvy::dotenv;
use once_cell::sync::Lazy;

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv(); // ignora error si no existe .env
});

const DEFAULT_LOGIN_URL: &str = "https://login.microsoftonline.com";
const DEFAULT_API_HOST: &str = "https://api.businesscentral.dynamics.com";

/// Credenciales y endpoints del tenant. Valor explícito construido una vez
/// al arrancar y pasado por referencia; nunca estado global ambiente.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
    pub scope: String,
    pub environment: String,
    /// Base del proveedor de identidad; sobreescribible para tests.
    pub login_url: String,
    /// Base de la API de entidades; sobreescribible para tests.
    pub api_url: String,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, EtlError> {
        // asegura que .env se haya cargado
        Lazy::force(&DOTENV_LOADED);
        let tenant_id = required("BC_TENANT_ID")?;
        let environment = required("BC_ENVIRONMENT")?;
        let login_url = env::var("BC_LOGIN_URL").unwrap_or_else(|_| DEFAULT_LOGIN_URL.to_string());
        let api_url = env::var("BC_API_URL").unwrap_or_else(|_| {
            format!("{DEFAULT_API_HOST}/v2.0/{tenant_id}/{environment}/api/v2.0")
        });
        Ok(Self { client_id: required("BC_CLIENT_ID")?,
                  client_secret: required("BC_CLIENT_SECRET")?,
                  scope: required("BC_SCOPE")?,
                  tenant_id,
                  environment,
                  login_url,
                  api_url })
    }

    /// Endpoint del grant client-credentials.
    pub fn token_endpoint(&self) -> String {
        format!("{}/{}/oauth2/v2.0/token", self.login_url, self.tenant_id)
    }

    /// Base de la API de entidades, sin barra final.
    pub fn base_url(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }
}

fn required(name: &str) -> Result<String, EtlError> {
    env::var(name).map_err(|_| EtlError::InvalidArgument(format!("environment variable '{name}' not set")))
}

/// Forzar carga temprana de .env desde aplicaciones externas si se desea.
pub fn init_dotenv() {
    Lazy::force(&DOTENV_LOADED);
}
