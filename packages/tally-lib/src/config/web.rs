use crate::{
    config::{Env, TallyConfigResult},
    defaults,
    utils::derive_socket_addr,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

#[derive(Clone, Deserialize, Serialize, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct WebApiConfig {
    /// Web API host.
    pub host: String,

    /// Web API port.
    pub port: String,

    /// Max body size for web API requests.
    pub max_body_size: usize,
}

impl std::fmt::Display for WebApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl Default for WebApiConfig {
    fn default() -> Self {
        Self {
            host: defaults::WEB_API_HOST.into(),
            port: defaults::WEB_API_PORT.into(),
            max_body_size: defaults::MAX_BODY_SIZE,
        }
    }
}

impl From<WebApiConfig> for SocketAddr {
    fn from(cfg: WebApiConfig) -> SocketAddr {
        derive_socket_addr(&cfg.host, &cfg.port)
    }
}

impl Env for WebApiConfig {
    fn inject_opt_env_vars(&mut self) -> TallyConfigResult<()> {
        Ok(())
    }
}
