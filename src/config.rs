use std::{env, net::SocketAddr, path::PathBuf};

use thiserror::Error;

use crate::docs::DocsFormat;

#[derive(Debug, Clone)]
pub struct Config {
    pub secure_key: Option<String>,
    pub bind_addr: String,
    pub bind_port: u16,
    pub docs_dir: Option<PathBuf>,
    pub docs_format: DocsFormat,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("BIND_PORT must be a valid u16")]
    InvalidPort,
    #[error("API_DOCS_FORMAT must be one of: markdown, md, html")]
    InvalidDocsFormat,
    #[error("invalid bind address or port")]
    InvalidSocket,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let secure_key = non_empty_var("API_SECURE_KEY");

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
        let bind_port = env::var("BIND_PORT")
            .ok()
            .map(|value| value.parse::<u16>().map_err(|_| ConfigError::InvalidPort))
            .transpose()?
            .unwrap_or(8080);
        let docs_dir = non_empty_var("API_DOCS_DIR").map(PathBuf::from);
        let docs_format = non_empty_var("API_DOCS_FORMAT")
            .map(|value| {
                value
                    .parse::<DocsFormat>()
                    .map_err(|_| ConfigError::InvalidDocsFormat)
            })
            .transpose()?
            .unwrap_or(DocsFormat::Html);

        let config = Self {
            secure_key,
            bind_addr,
            bind_port,
            docs_dir,
            docs_format,
        };

        let _ = config.bind_socket()?;
        Ok(config)
    }

    pub fn bind_socket(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.bind_addr, self.bind_port)
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidSocket)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
