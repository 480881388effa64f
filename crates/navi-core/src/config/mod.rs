//! Configuration management with file persistence

use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::visualization::{NodeStyle, RenderOptions};

/// Navi configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

/// Where nodes and the forest are fetched from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub base_url: String,
    pub forest_endpoint: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// "unicode" or "ascii"
    pub style: String,
    pub full_names: bool,
    /// Select a thread when the pointer hovers its heading
    pub hover_select: bool,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            forest_endpoint: "/tt".to_string(),
            timeout_secs: 10,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            style: "unicode".to_string(),
            full_names: false,
            hover_select: true,
        }
    }
}

impl DisplayConfig {
    pub fn node_style(&self) -> anyhow::Result<NodeStyle> {
        self.style.parse().map_err(|e: String| anyhow!(e))
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        let dir = if let Ok(custom_dir) = env::var("NAVI_CONFIG_DIR") {
            PathBuf::from(custom_dir)
        } else {
            dirs::config_dir()
                .ok_or_else(|| anyhow!("Could not determine config directory"))?
                .join("navi")
        };
        Ok(dir)
    }

    /// Get the config file path
    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from file, or defaults if it doesn't exist.
    /// `NAVI_BASE_URL` overrides the configured base URL.
    pub fn load() -> anyhow::Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_overrides(env::var("NAVI_BASE_URL").ok());
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            // Return default config without creating file
            return Ok(Config::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    fn apply_overrides(&mut self, base_url: Option<String>) {
        if let Some(url) = base_url.filter(|u| !u.trim().is_empty()) {
            self.source.base_url = url;
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        self.validate()?;

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        let url = &self.source.base_url;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(anyhow!(
                "source.base_url must start with http:// or https://, got '{}'",
                url
            ));
        }
        if self.source.timeout_secs == 0 {
            return Err(anyhow!("source.timeout_secs must be greater than zero"));
        }
        self.display.node_style()?;
        Ok(())
    }

    /// Rendering options derived from the display settings
    pub fn render_options(&self) -> anyhow::Result<RenderOptions> {
        Ok(RenderOptions::default()
            .with_style(self.display.node_style()?)
            .with_full_names(self.display.full_names))
    }

    /// Get a configuration value by key
    pub fn get(&self, key: &str) -> anyhow::Result<String> {
        match key {
            // Source settings
            "source.base_url" => Ok(self.source.base_url.clone()),
            "source.forest_endpoint" => Ok(self.source.forest_endpoint.clone()),
            "source.timeout_secs" => Ok(self.source.timeout_secs.to_string()),

            // Display settings
            "display.style" => Ok(self.display.style.clone()),
            "display.full_names" => Ok(self.display.full_names.to_string()),
            "display.hover_select" => Ok(self.display.hover_select.to_string()),

            _ => Err(anyhow!(
                "Unknown configuration key: {}. Use `navi config list` to see available keys.",
                key
            )),
        }
    }

    /// Set a configuration value by key
    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        match key {
            // Source settings
            "source.base_url" => {
                if !(value.starts_with("http://") || value.starts_with("https://")) {
                    return Err(anyhow!("Base URL must start with http:// or https://"));
                }
                self.source.base_url = value.to_string();
            }
            "source.forest_endpoint" => {
                if !value.starts_with('/') {
                    return Err(anyhow!("Forest endpoint must start with '/'"));
                }
                self.source.forest_endpoint = value.to_string();
            }
            "source.timeout_secs" => {
                let secs: u64 = value
                    .parse()
                    .with_context(|| format!("Invalid timeout_secs value: {}", value))?;
                if secs == 0 {
                    return Err(anyhow!("Timeout must be greater than zero"));
                }
                self.source.timeout_secs = secs;
            }

            // Display settings
            "display.style" => {
                value.parse::<NodeStyle>().map_err(|e| anyhow!(e))?;
                self.display.style = value.to_string();
            }
            "display.full_names" => {
                self.display.full_names = value
                    .parse()
                    .with_context(|| format!("Invalid full_names value: {}", value))?;
            }
            "display.hover_select" => {
                self.display.hover_select = value
                    .parse()
                    .with_context(|| format!("Invalid hover_select value: {}", value))?;
            }

            _ => {
                return Err(anyhow!(
                    "Unknown configuration key: {}. Use `navi config list` to see available keys.",
                    key
                ));
            }
        }
        Ok(())
    }

    /// List all configuration keys and values
    pub fn list(&self) -> anyhow::Result<Vec<(String, String)>> {
        const KEYS: [&str; 6] = [
            "source.base_url",
            "source.forest_endpoint",
            "source.timeout_secs",
            "display.style",
            "display.full_names",
            "display.hover_select",
        ];
        KEYS.iter()
            .map(|key| Ok((key.to_string(), self.get(key)?)))
            .collect()
    }

    /// Reset configuration to defaults
    pub fn reset() -> anyhow::Result<()> {
        Config::default().save()
    }
}
