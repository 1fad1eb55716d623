//! Configuration loading and management

use crate::core::auth::AuthPolicy;
use crate::core::context::HeaderContextBuilder;
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Address the HTTP exposure binds to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl ServerConfig {
    /// `host:port` string accepted by `TcpListener::bind`
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Which store backend holds movies and actors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum StoreBackend {
    /// Process-local ordered sequences
    InMemory,

    /// PostgreSQL (requires the `postgres` feature)
    Postgres { url: String },
}

/// Store section of the configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(flatten)]
    pub backend: StoreBackend,

    /// Load the sample movies and actors into an in-memory store
    #[serde(default = "default_true")]
    pub seed: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::InMemory,
            seed: true,
        }
    }
}

/// Complete configuration for the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub store: StoreConfig,

    /// Request header carrying the already-resolved caller identity
    #[serde(default = "default_identity_header")]
    pub identity_header: String,

    /// Policy gating mutations ("authenticated" or "public")
    #[serde(default = "default_mutation_policy")]
    pub mutation_policy: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            store: StoreConfig::default(),
            identity_header: default_identity_header(),
            mutation_policy: default_mutation_policy(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Mutation policy as configured
    pub fn auth_policy(&self) -> AuthPolicy {
        AuthPolicy::parse_policy(&self.mutation_policy)
    }

    /// Context builder reading the configured identity header
    pub fn context_builder(&self) -> HeaderContextBuilder {
        HeaderContextBuilder::new(&self.identity_header)
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    4000
}

fn default_true() -> bool {
    true
}

fn default_identity_header() -> String {
    HeaderContextBuilder::DEFAULT_HEADER.to_string()
}

fn default_mutation_policy() -> String {
    "authenticated".to_string()
}
