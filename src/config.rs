use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use glob::Pattern;
use serde::{Deserialize, Serialize};

use crate::extract::DEFAULT_DOMAIN;
use crate::extract::source::SOURCE_EXTENSIONS;
use crate::extract::template::TEMPLATE_EXTENSION;

pub const CONFIG_FILE_NAME: &str = ".transcatrc.json";

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_domain")]
    pub default_domain: String,
    #[serde(default = "default_locale")]
    pub locale: String,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    #[serde(default = "default_template_extension")]
    pub template_extension: String,
    #[serde(default = "default_source_extensions")]
    pub source_extensions: Vec<String>,
    #[serde(default)]
    pub ignores: Vec<String>,
}

fn default_domain() -> String {
    DEFAULT_DOMAIN.to_string()
}

fn default_locale() -> String {
    "en".to_string()
}

fn default_output_dir() -> String {
    "./languages".to_string()
}

fn default_template_extension() -> String {
    TEMPLATE_EXTENSION.to_string()
}

fn default_source_extensions() -> Vec<String> {
    SOURCE_EXTENSIONS.map(String::from).to_vec()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_domain: default_domain(),
            locale: default_locale(),
            output_dir: default_output_dir(),
            template_extension: default_template_extension(),
            source_extensions: default_source_extensions(),
            ignores: Vec::new(),
        }
    }
}

impl Config {
    /// Validate configuration values.
    ///
    /// Returns an error if a glob pattern in `ignores` is invalid or the
    /// default domain is empty.
    pub fn validate(&self) -> Result<()> {
        if self.default_domain.trim().is_empty() {
            bail!("'defaultDomain' must not be empty");
        }

        // Patterns without wildcards are literal paths and need no validation.
        for pattern in &self.ignores {
            if pattern.contains('*') || pattern.contains('?') {
                Pattern::new(pattern).with_context(|| {
                    format!("Invalid glob pattern in 'ignores': \"{}\"", pattern)
                })?;
            }
        }

        Ok(())
    }
}

pub fn default_config_json() -> Result<String> {
    let config = Config::default();
    serde_json::to_string_pretty(&config).context("Failed to generate default config.")
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Result of loading configuration.
pub struct ConfigLoadResult {
    pub config: Config,
    /// True if config was loaded from a file, false if using defaults.
    pub from_file: bool,
    /// Directory relative settings are resolved against.
    pub base_dir: PathBuf,
}

pub fn load_config(start_dir: &Path) -> Result<ConfigLoadResult> {
    match find_config_file(start_dir) {
        Some(path) => {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            config.validate()?;
            let base_dir = path
                .parent()
                .map_or_else(|| start_dir.to_path_buf(), Path::to_path_buf);
            Ok(ConfigLoadResult {
                config,
                from_file: true,
                base_dir,
            })
        }
        None => Ok(ConfigLoadResult {
            config: Config::default(),
            from_file: false,
            base_dir: start_dir.to_path_buf(),
        }),
    }
}
