//! Configuration for pl-opportunity.
//!
//! - Type-safe configuration structures with `#[serde(default)]`
//! - Validation for all configuration values
//! - Named presets
//! - YAML config file loading and discovery
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use pl_opportunity::config::{AppConfig, ConfigPreset};
//!
//! let config = AppConfig::from_preset(ConfigPreset::Quick);
//!
//! let config = AppConfig::builder()
//!     .link_threshold(80.0)
//!     .draws(500)
//!     .build();
//!
//! use pl_opportunity::config::load_or_default;
//! let (config, loaded_from) = load_or_default(None)?;
//! ```
//!
//! # Configuration File
//!
//! ```yaml
//! linking:
//!   threshold: 80
//! sensitivity:
//!   draws: 5000
//!   seed: 7
//! ```

mod defaults;
pub mod file;
mod types;
mod validation;

pub use defaults::ConfigPreset;
pub use types::{AppConfig, AppConfigBuilder, NormalizerConfig, OutputConfig, ScoringConfig};
pub use validation::{ConfigError, Validatable};

pub use file::{
    ConfigFileError, discover_config_file, generate_full_example_config,
    load_config_file, load_or_default,
};

/// JSON Schema of the `.pl-opportunity.yaml` format.
pub fn generate_json_schema() -> crate::Result<String> {
    let schema = schemars::schema_for!(AppConfig);
    Ok(serde_json::to_string_pretty(&schema)?)
}
