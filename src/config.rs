/// Configuration management for the lineage graph builder
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Prefix for environment overrides, e.g. `EVO_LINEAGE_DISPLAY__MAX_LEN=40`
pub const ENV_PREFIX: &str = "EVO_LINEAGE";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub display: DisplaySettings,
    pub export: ExportSettings,
    pub report: ReportSettings,
}

/// How expressions are shortened for `display_tree`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Trees with more characters than this get truncated
    pub max_len: usize,
    /// Characters kept before the ellipsis
    pub keep_chars: usize,
    pub ellipsis: String,
    /// Rendered in place of a member with no tree
    pub missing_tree: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    pub format: ExportFormat,
    pub pretty: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    pub format: ReportFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// GraphML document
    Graphml,
    /// Node-link JSON document
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Text,
    Markdown,
    Json,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            max_len: 30,
            keep_chars: 27,
            ellipsis: "...".to_string(),
            missing_tree: "No equation".to_string(),
        }
    }
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            format: ExportFormat::Graphml,
            pretty: true,
        }
    }
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            format: ReportFormat::Text,
        }
    }
}

impl Config {
    /// Layer defaults, an optional YAML file and `EVO_LINEAGE_*` variables
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_layered(path, Self::environment())
    }

    fn environment() -> ::config::Environment {
        ::config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    fn load_layered(path: Option<&Path>, environment: ::config::Environment) -> Result<Self> {
        let mut builder = ::config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(
                ::config::File::from(path)
                    .format(::config::FileFormat::Yaml)
                    .required(true),
            );
        }

        let config: Config = builder
            .add_source(environment)
            .build()
            .context("Failed to assemble configuration")?
            .try_deserialize()
            .context("Failed to parse configuration")?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let display = &self.display;

        if display.max_len == 0 {
            return Err(anyhow::anyhow!("display.max_len must be greater than 0"));
        }

        if display.keep_chars + display.ellipsis.chars().count() > display.max_len {
            return Err(anyhow::anyhow!(
                "display.keep_chars plus the ellipsis must fit within display.max_len"
            ));
        }

        if display.ellipsis.is_empty() && display.keep_chars < display.max_len {
            return Err(anyhow::anyhow!(
                "display.ellipsis is required when display.keep_chars is below display.max_len"
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_save_and_load() {
        let mut config = Config::default();
        config.export.format = ExportFormat::Json;
        let temp_file = NamedTempFile::new().unwrap();

        config.save_to_file(temp_file.path()).unwrap();
        let loaded_config = Config::load(Some(temp_file.path())).unwrap();

        assert_eq!(config, loaded_config);
    }

    #[test]
    fn test_layered_load_from_partial_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "display:\n  max_len: 40\n  keep_chars: 37\nreport:\n  format: markdown").unwrap();

        let config = Config::load(Some(temp_file.path())).unwrap();

        assert_eq!(config.display.max_len, 40);
        assert_eq!(config.display.keep_chars, 37);
        assert_eq!(config.display.ellipsis, "...");
        assert_eq!(config.report.format, ReportFormat::Markdown);
        assert_eq!(config.export.format, ExportFormat::Graphml);
    }

    fn environment_with(vars: &[(&str, &str)]) -> ::config::Environment {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Config::environment().source(Some(vars))
    }

    #[test]
    fn test_environment_overrides() {
        let env = environment_with(&[
            ("EVO_LINEAGE_DISPLAY__MAX_LEN", "40"),
            ("EVO_LINEAGE_EXPORT__FORMAT", "json"),
            ("EVO_LINEAGE_EXPORT__PRETTY", "false"),
            ("OTHER_DISPLAY__MAX_LEN", "5"),
        ]);

        let config = Config::load_layered(None, env).unwrap();

        assert_eq!(config.display.max_len, 40);
        assert_eq!(config.display.keep_chars, 27);
        assert_eq!(config.export.format, ExportFormat::Json);
        assert!(!config.export.pretty);
    }

    #[test]
    fn test_environment_overrides_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "display:\n  max_len: 40\n  keep_chars: 37\nreport:\n  format: markdown").unwrap();
        let env = environment_with(&[("EVO_LINEAGE_REPORT__FORMAT", "json")]);

        let config = Config::load_layered(Some(temp_file.path()), env).unwrap();

        assert_eq!(config.display.max_len, 40);
        assert_eq!(config.report.format, ReportFormat::Json);
    }

    #[test]
    fn test_invalid_environment_override_is_rejected() {
        let env = environment_with(&[("EVO_LINEAGE_DISPLAY__MAX_LEN", "10")]);
        assert!(Config::load_layered(None, env).is_err());
    }

    #[test]
    fn test_load_missing_file_fails() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        assert!(Config::load(Some(temp_dir.path().join("absent.yml").as_path())).is_err());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.display.keep_chars = 29;
        assert!(config.validate().is_err());

        config = Config::default();
        config.display.max_len = 0;
        assert!(config.validate().is_err());

        config = Config::default();
        config.display.ellipsis = String::new();
        assert!(config.validate().is_err());

        config.display.keep_chars = config.display.max_len;
        assert!(config.validate().is_ok());
    }
}
