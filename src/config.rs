//! Application configuration
//!
//! Centralized configuration management with environment variable support
//! and sensible defaults.

use std::env;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Database configuration
    pub database: DatabaseConfig,
    /// Retrieval service configuration
    pub retrieval: RetrievalConfig,
    /// Orchestrator limits
    pub orchestrator: OrchestratorConfig,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file
    pub path: String,
}

/// Retrieval service configuration
#[derive(Debug, Clone)]
pub struct RetrievalConfig {
    /// Base URL of the external retrieval service
    pub base_url: String,
    /// HTTP timeout for retrieval calls (in seconds)
    pub timeout_secs: u64,
}

/// Orchestrator limits
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Maximum task length in characters
    pub max_task_length: usize,
    /// Row cap for availability and claim lookups
    pub lookup_limit: u32,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_task_length: 10000, // 10KB
            lookup_limit: 10,
        }
    }
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self {
            database: DatabaseConfig {
                path: env::var("CLINIC_DB_PATH").unwrap_or_else(|_| "clinic.db".to_string()),
            },
            retrieval: RetrievalConfig {
                base_url: env::var("RETRIEVAL_BASE_URL")
                    .unwrap_or_else(|_| "http://localhost:8001".to_string()),
                timeout_secs: env::var("RETRIEVAL_TIMEOUT_SECS")
                    .ok()
                    .and_then(|t| t.parse().ok())
                    .unwrap_or(30),
            },
            orchestrator: OrchestratorConfig {
                max_task_length: env::var("MAX_TASK_LENGTH")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(10000),
                lookup_limit: env::var("LOOKUP_LIMIT")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(10),
            },
        }
    }
}
