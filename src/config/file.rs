//! Configuration file loading and discovery.

use super::types::AppConfig;
use std::path::{Path, PathBuf};

// ============================================================================
// Configuration File Discovery
// ============================================================================

/// Standard config file names to search for.
const CONFIG_FILE_NAMES: &[&str] = &[
    ".pl-opportunity.yaml",
    ".pl-opportunity.yml",
    "pl-opportunity.yaml",
    "pl-opportunity.yml",
];

/// Discover a config file by searching standard locations.
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Current directory
/// 3. Git repository root (if in a repo)
/// 4. User config directory (~/.config/pl-opportunity/)
/// 5. Home directory
#[must_use]
pub fn discover_config_file(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path
        && path.exists()
    {
        return Some(path.to_path_buf());
    }

    if let Ok(cwd) = std::env::current_dir()
        && let Some(path) = find_config_in_dir(&cwd)
    {
        return Some(path);
    }

    if let Some(git_root) = find_git_root()
        && let Some(path) = find_config_in_dir(&git_root)
    {
        return Some(path);
    }

    if let Some(config_dir) = dirs::config_dir()
        && let Some(path) = find_config_in_dir(&config_dir.join("pl-opportunity"))
    {
        return Some(path);
    }

    dirs::home_dir().and_then(|home| find_config_in_dir(&home))
}

/// Find a config file in a specific directory.
fn find_config_in_dir(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
}

/// Find the git repository root by walking up the directory tree.
fn find_git_root() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    let mut current = cwd.as_path();
    loop {
        if current.join(".git").exists() {
            return Some(current.to_path_buf());
        }
        current = current.parent()?;
    }
}

// ============================================================================
// Configuration File Loading
// ============================================================================

/// Error type for config file operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

impl From<ConfigFileError> for crate::OpportunityError {
    fn from(err: ConfigFileError) -> Self {
        Self::config(err.to_string())
    }
}

/// Load an `AppConfig` from a YAML file.
pub fn load_config_file(path: &Path) -> Result<AppConfig, ConfigFileError> {
    if !path.exists() {
        return Err(ConfigFileError::NotFound(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&content)?)
}

/// Load config from discovered file, or return default.
///
/// An explicit path that fails to load is an error; a discovered file that
/// fails to parse is logged and skipped.
pub fn load_or_default(
    explicit_path: Option<&Path>,
) -> Result<(AppConfig, Option<PathBuf>), ConfigFileError> {
    if let Some(path) = explicit_path {
        return load_config_file(path).map(|config| (config, Some(path.to_path_buf())));
    }
    Ok(discover_config_file(None).map_or_else(
        || (AppConfig::default(), None),
        |path| match load_config_file(&path) {
            Ok(config) => (config, Some(path)),
            Err(e) => {
                tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                (AppConfig::default(), None)
            }
        },
    ))
}

// ============================================================================
// Example Config Generation
// ============================================================================

/// Generate a commented example config with all options.
#[must_use]
pub fn generate_full_example_config() -> String {
    r"# pl-opportunity configuration
# =============================
#
# Searched for as .pl-opportunity.yaml in the current directory, the git
# root, ~/.config/pl-opportunity/ and the home directory.
# CLI flags override file settings.

normalizer:
  # YAML map of category tag -> {broad, sub}; omit for the built-in table
  # category_map: ./categories.yaml
  builtin_private_labels: true
  # Extra private-label brands per retailer id
  private_labels: {}
  #   dia: [dia, bonte]

linking:
  # Minimum fuzzy similarity (0-100)
  threshold: 75.0
  # Reference records scored per pass; most complete records kept first
  max_candidates: 5000
  parallel_threshold: 50
  exact_only: false

metrics:
  # broad or sub
  level: broad
  include_unmatched_retailer: true
  retain_unknown: false
  min_products: 1

scoring:
  weights:
    nutritional_gap: 0.25
    brand_fragmentation: 0.15
    category_size: 0.15
    reformulation_feasibility: 0.15
    pl_opportunity: 0.15
    price_gap: 0.15

sensitivity:
  enabled: true
  draws: 1000
  alpha: 1.0
  seed: 42
  top_k: 5
  keep_draws: false

output:
  # summary, json or csv
  format: summary
  # file: ranking.json
  # enriched_file: enriched.jsonl
"
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_find_config_in_dir() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join(".pl-opportunity.yaml");
        std::fs::write(&config_path, "linking:\n  threshold: 80\n").unwrap();
        assert_eq!(find_config_in_dir(tmp.path()), Some(config_path));
    }

    #[test]
    fn test_find_config_in_dir_not_found() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(find_config_in_dir(tmp.path()), None);
    }

    #[test]
    fn test_load_config_file() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.yaml");
        let yaml = r"
linking:
  threshold: 82.5
sensitivity:
  draws: 250
  seed: 7
metrics:
  level: sub
";
        std::fs::write(&config_path, yaml).unwrap();

        let config = load_config_file(&config_path).unwrap();
        assert_eq!(config.linking.threshold, 82.5);
        assert_eq!(config.linking.max_candidates, 5_000);
        assert_eq!(config.sensitivity.draws, 250);
        assert_eq!(config.sensitivity.seed, 7);
        assert_eq!(config.metrics.level, crate::model::CategoryLevel::Sub);
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config_file(Path::new("/nonexistent/config.yaml"));
        assert!(matches!(result, Err(ConfigFileError::NotFound(_))));
        assert!(load_or_default(Some(Path::new("/nonexistent/config.yaml"))).is_err());
    }

    #[test]
    fn test_full_example_parses_to_defaults() {
        let parsed: AppConfig = serde_yaml::from_str(&generate_full_example_config()).unwrap();
        assert_eq!(parsed, AppConfig::default());
    }

    #[test]
    fn test_discover_explicit_path() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("custom-config.yaml");
        std::fs::write(&config_path, "sensitivity:\n  enabled: false\n").unwrap();
        assert_eq!(discover_config_file(Some(&config_path)), Some(config_path));
    }
}
