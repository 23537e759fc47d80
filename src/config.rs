//! Application configuration.
//!
//! Handles loading, validating, and merging `filtergraph.toml`. The file is
//! optional and sparse: its values are merged over the stock defaults, so it
//! only needs the keys it wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [catalog]
//! filters = ["none", "sepia", "invert", "vignette", "zoom-blur"]
//!
//! [output]
//! format = "png"            # png | jpeg
//! quality = 90              # JPEG quality (1-100)
//!
//! [processing]
//! max_processes = 4         # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Filter entries use the stable identifiers from [`crate::filters`], with an
//! optional strength suffix (`sepia@0.8`, `posterize@4`).
//!
//! Unknown keys are rejected to catch typos early.

use crate::catalog::FilterCatalog;
use crate::imaging::EncodeFormat;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `filtergraph.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Filters offered to the user, in presentation order.
    pub catalog: CatalogConfig,
    /// Encoding of rendered images.
    pub output: OutputConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl AppConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.output.quality == 0 || self.output.quality > 100 {
            return Err(ConfigError::Validation(
                "output.quality must be 1-100".into(),
            ));
        }
        self.catalog()?;
        Ok(())
    }

    /// Build the configured filter catalog.
    pub fn catalog(&self) -> Result<FilterCatalog, ConfigError> {
        FilterCatalog::from_ids(&self.catalog.filters)
            .map_err(|e| ConfigError::Validation(format!("catalog.filters: {e}")))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogConfig {
    /// Stable filter identifiers.
    pub filters: Vec<String>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            filters: FilterCatalog::standard()
                .iter()
                .map(|f| f.id())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub format: EncodeFormat,
    /// JPEG quality. Ignored for PNG.
    pub quality: u8,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: EncodeFormat::Png,
            quality: 90,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

/// The stock defaults as a `toml::Value::Table`, the base layer for merging.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(AppConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely, so a
///   configured `catalog.filters` list replaces the stock list.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<AppConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: AppConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `path`, falling back to stock defaults when it is missing.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// A fully-commented stock `filtergraph.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# filtergraph configuration
# =========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Filter catalog
# ---------------------------------------------------------------------------
[catalog]
# Filters offered for selection, in display order. Available ids:
#   none, sepia, invert, vignette, zoom-blur, noir, posterize,
#   hue-rotate-<degrees> (e.g. hue-rotate-90)
# Strength suffixes: sepia@0.8, vignette@0.5 (0.0-1.0), posterize@4 (2-256)
filters = ["none", "sepia", "invert", "vignette", "zoom-blur"]

# ---------------------------------------------------------------------------
# Output encoding
# ---------------------------------------------------------------------------
[output]
# Container for rendered images: "png" or "jpeg".
format = "png"
# JPEG quality (1-100). Ignored for PNG.
quality = 90

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel workers for `preview`. Omit for auto (= CPU cores).
# Values above the core count are clamped down.
# max_processes = 4
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::FilterKind;
    use tempfile::TempDir;

    fn write_config(content: &str) -> (TempDir, std::path::PathBuf) {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("filtergraph.toml");
        fs::write(&path, content).unwrap();
        (tmp, path)
    }

    // =========================================================================
    // Defaults and validation
    // =========================================================================

    #[test]
    fn default_config_uses_standard_catalog() {
        let config = AppConfig::default();
        assert_eq!(config.catalog().unwrap(), FilterCatalog::standard());
        assert_eq!(config.output.format, EncodeFormat::Png);
        assert_eq!(config.output.quality, 90);
        assert_eq!(config.processing.max_processes, None);
    }

    #[test]
    fn validate_default_config_passes() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_quality_bounds() {
        let mut config = AppConfig::default();
        config.output.quality = 100;
        assert!(config.validate().is_ok());
        config.output.quality = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
        config.output.quality = 101;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_rejects_empty_catalog() {
        let mut config = AppConfig::default();
        config.catalog.filters.clear();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_rejects_unknown_filter() {
        let mut config = AppConfig::default();
        config.catalog.filters.push("sparkle".into());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("sparkle"), "{err}");
    }

    // =========================================================================
    // Loading
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join("filtergraph.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn load_config_sparse_override() {
        let (_tmp, path) = write_config(
            r#"
[output]
format = "jpeg"
"#,
        );
        let config = load_config(&path).unwrap();
        assert_eq!(config.output.format, EncodeFormat::Jpeg);
        // Unspecified values keep their defaults
        assert_eq!(config.output.quality, 90);
        assert_eq!(config.catalog, CatalogConfig::default());
    }

    #[test]
    fn load_config_replaces_filter_list() {
        let (_tmp, path) = write_config(
            r#"
[catalog]
filters = ["noir", "hue-rotate-45", "sepia@0.8"]
"#,
        );
        let catalog = load_config(&path).unwrap().catalog().unwrap();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.filters()[0], FilterKind::Noir);
        assert_eq!(catalog.filters()[1], FilterKind::hue_rotate(45));
        assert_eq!(catalog.filters()[2].id(), "sepia@0.8");
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let (_tmp, path) = write_config("this is not valid toml [[[");
        assert!(matches!(load_config(&path), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn unknown_key_rejected() {
        let (_tmp, path) = write_config(
            r#"
[output]
colour = "blue"
"#,
        );
        assert!(matches!(load_config(&path), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn unknown_section_rejected() {
        let (_tmp, path) = write_config("[shaders]\nenabled = true\n");
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn load_config_validates_values() {
        let (_tmp, path) = write_config("[output]\nquality = 0\n");
        assert!(matches!(load_config(&path), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn load_raw_config_returns_none_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let result = load_raw_config(&tmp.path().join("missing.toml")).unwrap();
        assert!(result.is_none());
    }

    // =========================================================================
    // Merging
    // =========================================================================

    #[test]
    fn merge_toml_scalar_override() {
        let base: toml::Value = toml::from_str("a = 1\nb = 2").unwrap();
        let overlay: toml::Value = toml::from_str("b = 3").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("a").unwrap().as_integer(), Some(1));
        assert_eq!(merged.get("b").unwrap().as_integer(), Some(3));
    }

    #[test]
    fn merge_toml_nested_tables() {
        let base: toml::Value = toml::from_str("[output]\nformat = \"png\"\nquality = 90").unwrap();
        let overlay: toml::Value = toml::from_str("[output]\nquality = 70").unwrap();
        let merged = merge_toml(base, overlay);
        let output = merged.get("output").unwrap();
        assert_eq!(output.get("format").unwrap().as_str(), Some("png"));
        assert_eq!(output.get("quality").unwrap().as_integer(), Some(70));
    }

    #[test]
    fn merge_toml_arrays_replace() {
        let base: toml::Value = toml::from_str("filters = [\"a\", \"b\"]").unwrap();
        let overlay: toml::Value = toml::from_str("filters = [\"c\"]").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("filters").unwrap().as_array().unwrap().len(), 1);
    }

    #[test]
    fn resolve_config_with_no_overlay() {
        let config = resolve_config(stock_defaults_value().unwrap(), None).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    // =========================================================================
    // Processing
    // =========================================================================

    #[test]
    fn effective_threads_auto() {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(effective_threads(&ProcessingConfig::default()), cores);
    }

    #[test]
    fn effective_threads_clamped_to_cores() {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        let config = ProcessingConfig {
            max_processes: Some(99999),
        };
        assert_eq!(effective_threads(&config), cores);
    }

    #[test]
    fn effective_threads_user_constrains_down() {
        let config = ProcessingConfig {
            max_processes: Some(1),
        };
        assert_eq!(effective_threads(&config), 1);
    }

    #[test]
    fn effective_threads_zero_means_one() {
        let config = ProcessingConfig {
            max_processes: Some(0),
        };
        assert_eq!(effective_threads(&config), 1);
    }

    // =========================================================================
    // Stock config
    // =========================================================================

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: AppConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn stock_config_toml_contains_all_sections() {
        let content = stock_config_toml();
        assert!(content.contains("[catalog]"));
        assert!(content.contains("[output]"));
        assert!(content.contains("[processing]"));
    }

    #[test]
    fn stock_defaults_value_has_all_sections() {
        let val = stock_defaults_value().unwrap();
        assert!(val.is_table());
        assert!(val.get("catalog").is_some());
        assert!(val.get("output").is_some());
        assert!(val.get("processing").is_some());
    }
}
