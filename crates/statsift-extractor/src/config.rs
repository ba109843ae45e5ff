//! Configuration for the Extractor

use serde::{Deserialize, Serialize};
use statsift_llm::RetryPolicy;

/// Default round-trip budget (one model turn plus its tool turn)
pub const DEFAULT_MAX_ROUND_TRIPS: usize = 150;

/// Configuration for the Extractor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Maximum model-turn/tool-turn round trips before the run stops with partial results
    pub max_round_trips: usize,

    /// Retry policy for reasoning-service calls
    pub retry: RetryPolicy,

    /// Prefix the task prompt with the statistician persona
    pub include_persona: bool,
}

impl ExtractorConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_round_trips == 0 {
            return Err("max_round_trips must be greater than 0".to_string());
        }
        if self.retry.max_attempts == 0 {
            return Err("retry.max_attempts must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Default for ExtractorConfig {
    /// Long-running settings suited to unattended batch runs
    fn default() -> Self {
        Self {
            max_round_trips: DEFAULT_MAX_ROUND_TRIPS,
            retry: RetryPolicy::default(),
            include_persona: true,
        }
    }
}

impl ExtractorConfig {
    /// Quick preset: small budget and short waits for smoke runs
    pub fn quick() -> Self {
        Self {
            max_round_trips: 10,
            retry: RetryPolicy {
                max_attempts: 3,
                rate_limit_backoff_secs: 1,
                quota_cooldown_secs: 60,
            },
            include_persona: true,
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}
