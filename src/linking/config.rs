//! Record linking configuration.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Configuration for the exact + fuzzy record linker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct LinkConfig {
    /// Minimum name+brand similarity to accept a fuzzy pair (0 - 100)
    pub threshold: f64,
    /// Maximum reference candidates scored per linking pass
    pub max_candidates: usize,
    /// Source record count above which similarity scoring runs in parallel
    pub parallel_threshold: usize,
    /// Skip the fuzzy stage and link on exact codes only
    pub exact_only: bool,
}

impl LinkConfig {
    /// Fewer, surer fuzzy links
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            threshold: 85.0,
            max_candidates: 5_000,
            parallel_threshold: 50,
            exact_only: false,
        }
    }

    /// Default: threshold 75
    #[must_use]
    pub const fn balanced() -> Self {
        Self {
            threshold: 75.0,
            max_candidates: 5_000,
            parallel_threshold: 50,
            exact_only: false,
        }
    }

    /// More recall for sparse, noisy catalogues
    #[must_use]
    pub const fn permissive() -> Self {
        Self {
            threshold: 65.0,
            max_candidates: 20_000,
            parallel_threshold: 50,
            exact_only: false,
        }
    }

    /// Create config from a preset name
    #[must_use]
    pub fn from_preset(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "strict" => Some(Self::strict()),
            "balanced" | "default" => Some(Self::balanced()),
            "permissive" => Some(Self::permissive()),
            _ => None,
        }
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self::balanced()
    }
}
