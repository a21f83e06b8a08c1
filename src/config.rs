use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub artifacts: ArtifactsConfig,
    #[serde(default)]
    pub selections: SelectionsConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ArtifactsConfig {
    /// Base URL the precomputed analysis artifacts are served from.
    pub base_url: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,
}

fn default_request_timeout() -> u64 {
    5000
}

#[derive(Debug, Deserialize, Clone)]
pub struct SelectionsConfig {
    /// Years assumed valid when the discovery fetch fails.
    #[serde(default = "default_fallback_years")]
    pub fallback_years: Vec<String>,
}

fn default_fallback_years() -> Vec<String> {
    vec!["2021".to_string(), "2022".to_string(), "2023".to_string()]
}

impl Default for SelectionsConfig {
    fn default() -> Self {
        Self {
            fallback_years: default_fallback_years(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ExportConfig {
    /// Where to write the rendered pipeline graph, if anywhere.
    pub pipeline_svg: Option<String>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| "Failed to parse config TOML")?;
        Ok(config)
    }
}
