//! Configuration types for pl-opportunity runs.

use crate::linking::LinkConfig;
use crate::metrics::MetricsConfig;
use crate::model::CategoryLevel;
use crate::normalize::{CategoryMap, PrivateLabelRegistry};
use crate::reports::ReportFormat;
use crate::scoring::{ScoringWeights, SensitivityConfig};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

// ============================================================================
// Unified Application Configuration
// ============================================================================

/// Top-level configuration, loaded from a YAML file and overridden by CLI
/// flags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AppConfig {
    /// Cleaning tables: category map and private-label brands
    pub normalizer: NormalizerConfig,
    /// Record linking thresholds and candidate limits
    pub linking: LinkConfig,
    /// Category grouping and ranking eligibility
    pub metrics: MetricsConfig,
    /// Composite score weights
    pub scoring: ScoringConfig,
    /// Monte-Carlo weight sensitivity
    pub sensitivity: SensitivityConfig,
    /// Output format and destination
    pub output: OutputConfig,
}

impl AppConfig {
    /// Create a new `AppConfig` with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an `AppConfig` builder.
    #[must_use]
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }
}

// ============================================================================
// Builder for AppConfig
// ============================================================================

/// Builder for constructing `AppConfig` with fluent API.
#[derive(Debug, Default)]
#[must_use]
pub struct AppConfigBuilder {
    config: AppConfig,
}

impl AppConfigBuilder {
    /// Start from an existing configuration (e.g. a loaded file).
    pub const fn from_config(config: AppConfig) -> Self {
        Self { config }
    }

    /// Set the fuzzy linking threshold (0 - 100).
    pub const fn link_threshold(mut self, threshold: f64) -> Self {
        self.config.linking.threshold = threshold;
        self
    }

    pub const fn exact_only(mut self, exact_only: bool) -> Self {
        self.config.linking.exact_only = exact_only;
        self
    }

    pub const fn category_level(mut self, level: CategoryLevel) -> Self {
        self.config.metrics.level = level;
        self
    }

    pub const fn retain_unknown(mut self, retain: bool) -> Self {
        self.config.metrics.retain_unknown = retain;
        self
    }

    pub const fn weights(mut self, weights: ScoringWeights) -> Self {
        self.config.scoring.weights = weights;
        self
    }

    pub const fn sensitivity(mut self, enabled: bool) -> Self {
        self.config.sensitivity.enabled = enabled;
        self
    }

    pub const fn draws(mut self, draws: usize) -> Self {
        self.config.sensitivity.draws = draws;
        self
    }

    pub const fn seed(mut self, seed: u64) -> Self {
        self.config.sensitivity.seed = seed;
        self
    }

    pub const fn top_k(mut self, top_k: usize) -> Self {
        self.config.sensitivity.top_k = top_k;
        self
    }

    /// Set the output format.
    pub const fn output_format(mut self, format: ReportFormat) -> Self {
        self.config.output.format = format;
        self
    }

    /// Set the output file.
    pub fn output_file(mut self, file: Option<PathBuf>) -> Self {
        self.config.output.file = file;
        self
    }

    /// Set the enriched-table output file.
    pub fn enriched_file(mut self, file: Option<PathBuf>) -> Self {
        self.config.output.enriched_file = file;
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> AppConfig {
        self.config
    }
}

// ============================================================================
// Section types
// ============================================================================

/// Lookup tables used while cleaning records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct NormalizerConfig {
    /// YAML file replacing the built-in category map
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_map: Option<PathBuf>,
    /// Start from the built-in private-label brand lists
    pub builtin_private_labels: bool,
    /// Extra private-label brands, keyed by retailer id
    pub private_labels: BTreeMap<String, Vec<String>>,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            category_map: None,
            builtin_private_labels: true,
            private_labels: BTreeMap::new(),
        }
    }
}

impl NormalizerConfig {
    /// The category map to harmonize with: the configured file, or the
    /// built-in table.
    pub fn load_category_map(&self) -> crate::Result<CategoryMap> {
        match &self.category_map {
            Some(path) => CategoryMap::from_yaml_file(path),
            None => Ok(CategoryMap::with_builtins()),
        }
    }

    /// The private-label registry for this run.
    #[must_use]
    pub fn private_label_registry(&self) -> PrivateLabelRegistry {
        let mut registry = if self.builtin_private_labels {
            PrivateLabelRegistry::with_builtins()
        } else {
            PrivateLabelRegistry::new()
        };
        for (retailer, brands) in &self.private_labels {
            registry.add_brands(retailer, brands);
        }
        registry
    }
}

/// Composite score settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ScoringConfig {
    pub weights: ScoringWeights,
}

/// Output-related configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format
    pub format: ReportFormat,
    /// Output file path (None for stdout)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    /// Write the enriched product table here as JSON Lines
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enriched_file: Option<PathBuf>,
}
