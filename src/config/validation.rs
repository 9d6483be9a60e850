//! Configuration validation.

use super::types::{AppConfig, NormalizerConfig, OutputConfig, ScoringConfig};
use crate::linking::LinkConfig;
use crate::metrics::MetricsConfig;
use crate::scoring::SensitivityConfig;

// ============================================================================
// Configuration Error
// ============================================================================

/// Error type for configuration validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    /// The field that failed validation
    pub field: String,
    /// Description of the validation error
    pub message: String,
}

impl ConfigError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Validation Trait
// ============================================================================

/// Trait for validatable configuration types.
pub trait Validatable {
    /// Validate the configuration, returning any errors found.
    fn validate(&self) -> Vec<ConfigError>;

    /// Check if the configuration is valid.
    fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

// ============================================================================
// Validation Implementations
// ============================================================================

impl Validatable for AppConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        errors.extend(self.normalizer.validate());
        errors.extend(self.linking.validate());
        errors.extend(self.metrics.validate());
        errors.extend(self.scoring.validate());
        errors.extend(self.sensitivity.validate());
        errors.extend(self.output.validate());
        errors
    }
}

impl Validatable for NormalizerConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if let Some(path) = &self.category_map
            && !path.exists()
        {
            errors.push(ConfigError::new(
                "normalizer.category_map",
                format!("File not found: {}", path.display()),
            ));
        }
        for (retailer, brands) in &self.private_labels {
            if retailer.trim().is_empty() {
                errors.push(ConfigError::new(
                    "normalizer.private_labels",
                    "Retailer id must not be empty",
                ));
            }
            if brands.iter().all(|b| b.trim().is_empty()) {
                errors.push(ConfigError::new(
                    "normalizer.private_labels",
                    format!("No brands listed for retailer '{retailer}'"),
                ));
            }
        }
        errors
    }
}

impl Validatable for LinkConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if !(0.0..=100.0).contains(&self.threshold) {
            errors.push(ConfigError::new(
                "linking.threshold",
                format!("Threshold must be between 0 and 100, got {}", self.threshold),
            ));
        }
        if self.max_candidates == 0 {
            errors.push(ConfigError::new(
                "linking.max_candidates",
                "Candidate cap must be at least 1",
            ));
        }
        errors
    }
}

impl Validatable for MetricsConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if self.min_products == 0 {
            errors.push(ConfigError::new(
                "metrics.min_products",
                "Minimum product count must be at least 1",
            ));
        }
        errors
    }
}

impl Validatable for ScoringConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let weights = self.weights.as_array();
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            errors.push(ConfigError::new(
                "scoring.weights",
                "Weights must be finite and non-negative",
            ));
        } else if self.weights.sum() <= 0.0 {
            errors.push(ConfigError::new(
                "scoring.weights",
                "At least one weight must be positive",
            ));
        }
        errors
    }
}

impl Validatable for SensitivityConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if !self.enabled {
            return errors;
        }
        if self.draws == 0 {
            errors.push(ConfigError::new(
                "sensitivity.draws",
                "At least one draw is required when sensitivity is enabled",
            ));
        }
        if !(self.alpha.is_finite() && self.alpha > 0.0) {
            errors.push(ConfigError::new(
                "sensitivity.alpha",
                format!("Dirichlet concentration must be positive, got {}", self.alpha),
            ));
        }
        if self.top_k == 0 {
            errors.push(ConfigError::new("sensitivity.top_k", "top_k must be at least 1"));
        }
        errors
    }
}

impl Validatable for OutputConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        for (field, file) in [
            ("output.file", &self.file),
            ("output.enriched_file", &self.enriched_file),
        ] {
            if let Some(parent) = file.as_ref().and_then(|f| f.parent())
                && !parent.as_os_str().is_empty()
                && !parent.exists()
            {
                errors.push(ConfigError::new(
                    field,
                    format!("Parent directory does not exist: {}", parent.display()),
                ));
            }
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::ScoringWeights;
    use std::path::PathBuf;

    #[test]
    fn test_default_config_is_valid() {
        assert!(AppConfig::default().is_valid());
    }

    #[test]
    fn test_link_threshold_range() {
        let config = LinkConfig {
            threshold: 0.8e3,
            ..LinkConfig::default()
        };
        let errors = config.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "linking.threshold");
    }

    #[test]
    fn test_negative_weight_rejected() {
        let config = ScoringConfig {
            weights: ScoringWeights::from_array([-0.1, 0.3, 0.2, 0.2, 0.2, 0.2]),
        };
        assert!(!config.is_valid());
        let zero = ScoringConfig {
            weights: ScoringWeights::from_array([0.0; 6]),
        };
        assert!(!zero.is_valid());
    }

    #[test]
    fn test_sensitivity_checks_skipped_when_disabled() {
        let mut config = SensitivityConfig {
            alpha: -1.0,
            draws: 0,
            ..SensitivityConfig::default()
        };
        assert_eq!(config.validate().len(), 2);
        config.enabled = false;
        assert!(config.is_valid());
    }

    #[test]
    fn test_output_parent_must_exist() {
        let config = OutputConfig {
            file: Some(PathBuf::from("/nonexistent-dir/ranking.json")),
            ..OutputConfig::default()
        };
        assert_eq!(config.validate()[0].field, "output.file");
    }
}
