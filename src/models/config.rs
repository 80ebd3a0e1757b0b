use serde::Deserialize;

/// Runtime configuration loaded from `config/*.yaml` and `APP__*` variables.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub database_url: String,
    pub address: String,
    pub port: u16,
    /// Session cookie key material and token verification secret.
    pub secret: String,
    /// Where unauthenticated browser requests are sent to sign in.
    pub auth_service_url: String,
    #[serde(default = "default_db_timeout_secs")]
    pub db_timeout_secs: u64,
}

fn default_db_timeout_secs() -> u64 {
    5
}
