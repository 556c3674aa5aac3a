//! Engine configuration

use serde::{Deserialize, Serialize};

/// Policy knobs for the clearance engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Shortest accepted customer credential (characters)
    #[serde(default = "default_min_credential_length")]
    pub min_credential_length: usize,

    /// Page size used when a listing does not ask for one
    #[serde(default = "default_per_page")]
    pub default_per_page: u32,

    /// Largest page size a listing may ask for
    #[serde(default = "default_max_per_page")]
    pub max_per_page: u32,
}

fn default_min_credential_length() -> usize {
    8
}

fn default_per_page() -> u32 {
    customs_domain::query::DEFAULT_PER_PAGE
}

fn default_max_per_page() -> u32 {
    100
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_credential_length: default_min_credential_length(),
            default_per_page: default_per_page(),
            max_per_page: default_max_per_page(),
        }
    }
}

impl EngineConfig {
    /// Longer credentials and smaller pages
    pub fn strict() -> Self {
        Self {
            min_credential_length: 12,
            default_per_page: 10,
            max_per_page: 50,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.min_credential_length, 8);
        assert_eq!(config.default_per_page, 10);
        assert_eq!(config.max_per_page, 100);
    }

    #[test]
    fn test_strict_config() {
        let config = EngineConfig::strict();
        assert_eq!(config.min_credential_length, 12);
        assert!(config.max_per_page < EngineConfig::default().max_per_page);
    }
}
