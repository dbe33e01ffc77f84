// letter-rendering-service/src/config.rs

use crate::numbering::{DEFAULT_LETTER_CODE, DEFAULT_NUMBER_PATTERN};
use crate::template::RenderOptions;
use config::{builder::DefaultState, Config as ConfigLoader, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub rendering: RenderingConfig,
    pub batch: BatchConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenderingConfig {
    pub default_letter_code: String,
    pub default_number_pattern: String,
    pub mark_spaced_placeholders: bool,
}

impl RenderingConfig {
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            mark_spaced_placeholders: self.mark_spaced_placeholders,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchConfig {
    pub input_path: String,
    /// Results go to stdout when unset.
    pub output_path: Option<String>,
    pub max_concurrent_renders: usize,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::defaults()?
            // Load from config file if it exists
            .add_source(File::with_name("config").required(false))
            // Override with environment variables (e.g., SERVICE__BATCH__INPUT_PATH)
            .add_source(Environment::with_prefix("SERVICE").separator("__"))
            .build()?
            .try_deserialize()
    }

    /// Defaults overlaid with one explicit config file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        Self::defaults()?
            .add_source(File::from(path))
            .build()?
            .try_deserialize()
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Ok(ConfigLoader::builder()
            .set_default("service.name", "letter-rendering-service")?
            .set_default("service.log_level", "info")?
            .set_default("rendering.default_letter_code", DEFAULT_LETTER_CODE)?
            .set_default("rendering.default_number_pattern", DEFAULT_NUMBER_PATTERN)?
            .set_default("rendering.mark_spaced_placeholders", false)?
            .set_default("batch.input_path", "./batch.json")?
            .set_default("batch.max_concurrent_renders", 8)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[rendering]\ndefault_letter_code = \"DS\"\nmark_spaced_placeholders = true\n\n[batch]\noutput_path = \"out.json\""
        )
        .unwrap();
        file.flush().unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.service.name, "letter-rendering-service");
        assert_eq!(config.rendering.default_letter_code, "DS");
        assert_eq!(config.rendering.default_number_pattern, DEFAULT_NUMBER_PATTERN);
        assert!(config.rendering.render_options().mark_spaced_placeholders);
        assert_eq!(config.batch.output_path.as_deref(), Some("out.json"));
        assert_eq!(config.batch.max_concurrent_renders, 8);
    }
}
