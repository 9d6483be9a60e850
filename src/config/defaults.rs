//! Configuration presets.

use super::types::AppConfig;
use crate::linking::LinkConfig;
use crate::metrics::MetricsConfig;
use crate::scoring::SensitivityConfig;

// ============================================================================
// Configuration Presets
// ============================================================================

/// Named configuration presets for common use cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigPreset {
    /// Documented defaults
    Default,
    /// Fast exploratory runs: small candidate pools, few draws
    Quick,
    /// Final rankings: strict linking, many draws, small categories unranked
    Robust,
}

impl ConfigPreset {
    /// Get the preset name as a string.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Quick => "quick",
            Self::Robust => "robust",
        }
    }

    /// Parse a preset from a string name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "default" | "balanced" => Some(Self::Default),
            "quick" | "fast" => Some(Self::Quick),
            "robust" | "final" => Some(Self::Robust),
            _ => None,
        }
    }

    /// Get a description of this preset.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Default => "Threshold 75, 1000 sensitivity draws, every category ranked",
            Self::Quick => "Capped candidate pools and 100 draws for exploratory runs",
            Self::Robust => "Strict linking, 10000 draws, categories under 10 products unranked",
        }
    }

    /// Get all available presets.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Default, Self::Quick, Self::Robust]
    }
}

impl std::fmt::Display for ConfigPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// Preset Implementations
// ============================================================================

impl AppConfig {
    /// Create an `AppConfig` from a named preset.
    #[must_use]
    pub fn from_preset(preset: ConfigPreset) -> Self {
        match preset {
            ConfigPreset::Default => Self::default(),
            ConfigPreset::Quick => Self::quick_preset(),
            ConfigPreset::Robust => Self::robust_preset(),
        }
    }

    #[must_use]
    pub fn quick_preset() -> Self {
        Self {
            linking: LinkConfig {
                max_candidates: 1_000,
                ..LinkConfig::balanced()
            },
            sensitivity: SensitivityConfig {
                draws: 100,
                ..SensitivityConfig::default()
            },
            ..Self::default()
        }
    }

    #[must_use]
    pub fn robust_preset() -> Self {
        Self {
            linking: LinkConfig::strict(),
            metrics: MetricsConfig {
                min_products: 10,
                ..MetricsConfig::default()
            },
            sensitivity: SensitivityConfig {
                draws: 10_000,
                top_k: 3,
                ..SensitivityConfig::default()
            },
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_names_round_trip() {
        for preset in ConfigPreset::all() {
            assert_eq!(ConfigPreset::from_name(preset.name()), Some(*preset));
        }
        assert_eq!(ConfigPreset::from_name("FAST"), Some(ConfigPreset::Quick));
        assert_eq!(ConfigPreset::from_name("unknown"), None);
    }

    #[test]
    fn test_presets_differ_from_default() {
        let default = AppConfig::from_preset(ConfigPreset::Default);
        assert_eq!(default, AppConfig::default());
        assert_eq!(AppConfig::from_preset(ConfigPreset::Quick).sensitivity.draws, 100);
        let robust = AppConfig::from_preset(ConfigPreset::Robust);
        assert_eq!(robust.linking.threshold, 85.0);
        assert_eq!(robust.metrics.min_products, 10);
    }
}
