//! Configuration types for stream construction

use serde::{Deserialize, Serialize};

/// How a node resolves its deferred links
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// Cache the first result of a deferred link and reuse it forever
    #[default]
    Memoize,
    /// Invoke the deferred computation on every traversal
    Recompute,
}

/// Construction options shared by every stream node type
///
/// Memoization can hog memory on long traversals; turning it off trades that
/// for recomputation and loses reference-stable traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    pub resolution: Resolution,
}

impl StreamConfig {
    pub fn memoizing() -> Self {
        Self {
            resolution: Resolution::Memoize,
        }
    }

    pub fn recomputing() -> Self {
        Self {
            resolution: Resolution::Recompute,
        }
    }

    pub fn memoizes(&self) -> bool {
        self.resolution == Resolution::Memoize
    }
}

impl From<bool> for StreamConfig {
    fn from(memoize: bool) -> Self {
        if memoize {
            Self::memoizing()
        } else {
            Self::recomputing()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_memoizes() {
        assert!(StreamConfig::default().memoizes());
        assert!(!StreamConfig::recomputing().memoizes());
        assert_eq!(StreamConfig::from(false), StreamConfig::recomputing());
    }

    #[test]
    fn test_config_from_json() {
        let config: StreamConfig = serde_json::from_str(r#"{"resolution":"recompute"}"#).unwrap();
        assert_eq!(config.resolution, Resolution::Recompute);

        // Missing fields fall back to memoization
        let config: StreamConfig = serde_json::from_str("{}").unwrap();
        assert!(config.memoizes());
    }
}
