//! Run configuration.

use kosha_export_core::PackagingConfig;
use serde::{Deserialize, Serialize};

/// The known export target names, in release order.
pub const ALL_TARGETS: [&str; 3] = ["anki", "stardict", "epub"];

/// Serde-loaded configuration for one export run.
///
/// Everything that influences artifact bytes lives in here (via
/// [`PackagingConfig`]); the file is the single source of truth for a
/// reproducible release.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default)]
    pub packaging: PackagingConfig,
    /// Targets to export, subset of [`ALL_TARGETS`].
    #[serde(default = "default_targets")]
    pub targets: Vec<String>,
    /// Optional letter filter for a partial export.
    #[serde(default)]
    pub letters: Option<Vec<String>>,
    /// Enable the content-hash derivation caches.
    #[serde(default)]
    pub use_cache: bool,
}

fn default_targets() -> Vec<String> {
    ALL_TARGETS.iter().map(|t| t.to_string()).collect()
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            packaging: PackagingConfig::default(),
            targets: default_targets(),
            letters: None,
            use_cache: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_all_targets() {
        let config = ExportConfig::default();
        assert_eq!(config.targets, vec!["anki", "stardict", "epub"]);
        assert!(config.letters.is_none());
    }

    #[test]
    fn partial_config_fills_defaults() {
        let config: ExportConfig =
            serde_json::from_str(r#"{"targets": ["epub"], "letters": ["a", "kh"]}"#).unwrap();
        assert_eq!(config.targets, vec!["epub"]);
        assert_eq!(config.letters, Some(vec!["a".to_string(), "kh".to_string()]));
        assert_eq!(config.packaging.name, "kosha");
    }
}
