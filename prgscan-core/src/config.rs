//! Configuration loading from prgscan.toml.

use serde::Deserialize;
use std::{fs, path::Path};

use crate::error::{IoResultExt, ScanError, ScanResult};

/// Name of the optional configuration file in the scan root.
pub const CONFIG_FILE: &str = "prgscan.toml";

/// Main configuration structure for prgscan.toml.
#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PrgscanConfig {
    /// Directory names to skip while discovering files.
    pub exclude: Option<Vec<String>>,
    /// Worker pool size. Defaults to the number of CPUs.
    pub threads: Option<usize>,
    /// Output configuration.
    pub output: Option<OutputConfig>,
}

/// Output configuration.
#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Report file path.
    pub path: Option<String>,
    /// Output format: "log" or "json".
    pub format: Option<String>,
}

impl PrgscanConfig {
    /// Excluded directory names, empty when unset.
    pub fn excludes(&self) -> &[String] {
        self.exclude.as_deref().unwrap_or(&[])
    }

    pub fn output_path(&self) -> Option<&str> {
        self.output.as_ref().and_then(|o| o.path.as_deref())
    }

    /// True when `[output] format = "json"`.
    pub fn wants_json(&self) -> bool {
        self.output
            .as_ref()
            .and_then(|o| o.format.as_deref())
            .is_some_and(|f| f.eq_ignore_ascii_case("json"))
    }
}

/// Loads configuration from prgscan.toml if it exists.
pub fn load_config(root: &Path) -> ScanResult<Option<PrgscanConfig>> {
    let path = root.join(CONFIG_FILE);
    if !path.is_file() {
        return Ok(None);
    }

    let content = fs::read_to_string(&path).with_path(&path)?;
    let cfg: PrgscanConfig = toml::from_str(&content)
        .map_err(|e| ScanError::config(&path, format!("Invalid {}: {}", CONFIG_FILE, e)))?;

    if let Some(format) = cfg.output.as_ref().and_then(|o| o.format.as_deref()) {
        if !matches!(format.to_ascii_lowercase().as_str(), "log" | "json") {
            return Err(ScanError::config(
                &path,
                format!("Unknown output format '{}' (expected \"log\" or \"json\")", format),
            ));
        }
    }
    if cfg.threads == Some(0) {
        return Err(ScanError::config(&path, "threads must be at least 1"));
    }

    Ok(Some(cfg))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn create_temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir()
            .join("prgscan_config_test")
            .join(format!("{}_{}", name, std::process::id()));
        if dir.exists() {
            fs::remove_dir_all(&dir).ok();
        }
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_missing_config_is_none() {
        let dir = create_temp_dir("missing");
        assert_eq!(load_config(&dir).unwrap(), None);
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_full_config() {
        let dir = create_temp_dir("full");
        fs::write(
            dir.join(CONFIG_FILE),
            "exclude = [\"backup\", \"old\"]\nthreads = 4\n\n[output]\npath = \"report.log\"\nformat = \"JSON\"\n",
        )
        .unwrap();

        let cfg = load_config(&dir).unwrap().unwrap();
        assert_eq!(cfg.excludes(), &["backup".to_string(), "old".to_string()]);
        assert_eq!(cfg.threads, Some(4));
        assert_eq!(cfg.output_path(), Some("report.log"));
        assert!(cfg.wants_json());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_defaults() {
        let cfg = PrgscanConfig::default();
        assert!(cfg.excludes().is_empty());
        assert_eq!(cfg.output_path(), None);
        assert!(!cfg.wants_json());
    }

    #[test]
    fn test_invalid_toml() {
        let dir = create_temp_dir("invalid");
        fs::write(dir.join(CONFIG_FILE), "exclude = [unterminated").unwrap();
        let err = load_config(&dir).unwrap_err();
        assert!(matches!(err, ScanError::Config { .. }));
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_unknown_key_rejected() {
        let dir = create_temp_dir("unknown_key");
        fs::write(dir.join(CONFIG_FILE), "extensions = [\"prg\"]\n").unwrap();
        assert!(load_config(&dir).is_err());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_bad_format_and_threads() {
        let dir = create_temp_dir("bad_values");
        fs::write(dir.join(CONFIG_FILE), "[output]\nformat = \"xml\"\n").unwrap();
        assert!(load_config(&dir).is_err());

        fs::write(dir.join(CONFIG_FILE), "threads = 0\n").unwrap();
        assert!(load_config(&dir).is_err());
        fs::remove_dir_all(&dir).ok();
    }
}
