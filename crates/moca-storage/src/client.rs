use std::time::Duration;

use serde::{Deserialize, Serialize};
use ureq::Agent;

use crate::error::StorageError;

/// Where the Assessment Store and Media Store live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// API root, e.g. `https://moca.example.org/api/`.
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api/".to_string(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl StoreConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// HTTP client for both remote stores.
///
/// Requests run on the blocking pool so the async flow never stalls on
/// socket I/O.
#[derive(Clone)]
pub struct HttpStore {
    agent: Agent,
    base_url: String,
}

impl HttpStore {
    pub fn new(config: &StoreConfig) -> Result<Self, StorageError> {
        let base = config.base_url.trim();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(StorageError::Config(format!(
                "base_url must be an http(s) URL, got {base:?}"
            )));
        }
        if config.timeout_secs == 0 {
            return Err(StorageError::Config("timeout_secs must be positive".into()));
        }

        let agent_config = Agent::config_builder()
            .timeout_global(Some(config.timeout()))
            .build();

        Ok(Self {
            agent: Agent::new_with_config(agent_config),
            base_url: format!("{}/", base.trim_end_matches('/')),
        })
    }

    /// Resolve a store path against the API root.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }

    pub(crate) fn agent(&self) -> Agent {
        self.agent.clone()
    }
}
