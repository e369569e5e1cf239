use crate::error::{Result, WsaaError};
use crate::keys;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

/// Target WSAA deployment.
///
/// Selects both the login endpoint and the `cn=` value embedded in the
/// ticket header's destination field. AFIP operates a production
/// service and a homologation (testing) service with identical
/// protocols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Production,
    Testing,
}

impl Environment {
    /// Deployment name as it appears in the ticket destination DN.
    pub fn name(self) -> &'static str {
        match self {
            Environment::Production => "wsaa",
            Environment::Testing => "wsaahomo",
        }
    }

    /// URL of the `loginCms` service operation for this deployment.
    pub fn login_url(self) -> &'static str {
        match self {
            Environment::Production => "https://wsaa.afip.gov.ar/ws/services/LoginCms",
            Environment::Testing => "https://wsaahomo.afip.gov.ar/ws/services/LoginCms",
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Environment::Testing
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WsaaConfig {
    #[serde(default)]
    pub environment: Environment,
    #[serde(default = "default_key_bits")]
    pub key_bits: u32,
    #[serde(default = "default_identity_path")]
    pub identity_path: PathBuf,
}

impl Default for WsaaConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            key_bits: default_key_bits(),
            identity_path: default_identity_path(),
        }
    }
}

fn default_key_bits() -> u32 {
    keys::DEFAULT_KEY_BITS
}

fn default_identity_path() -> PathBuf {
    PathBuf::from("identity.toml")
}

impl WsaaConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &str) -> Result<Self> {
        let config_str = fs::read_to_string(path).map_err(|e| WsaaError::Storage(Box::new(e)))?;

        let config: WsaaConfig =
            toml::from_str(&config_str).map_err(|e| WsaaError::Storage(Box::new(e)))?;

        Ok(config)
    }

    /// Load configuration with default path (wsaa.toml)
    pub fn load() -> Result<Self> {
        Self::from_file("wsaa.toml")
    }
}
