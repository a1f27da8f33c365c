//! Initial slider state, read from an optional TOML file.

use anyhow::Context;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SliderConfig {
    pub description: String,
    pub value: i64,
    pub min: i64,
    pub max: i64,
    pub step: i64,
}

impl Default for SliderConfig {
    fn default() -> Self {
        Self {
            description: "Slider".to_string(),
            value: 0,
            min: 0,
            max: 100,
            step: 1,
        }
    }
}

impl SliderConfig {
    pub fn parse(text: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(text)?;
        anyhow::ensure!(
            config.min <= config.max,
            "min ({}) must not exceed max ({})",
            config.min,
            config.max
        );
        anyhow::ensure!(config.step > 0, "step must be positive");
        Ok(config)
    }
}

pub fn load(path: Option<&Path>) -> anyhow::Result<SliderConfig> {
    let Some(path) = path else {
        return Ok(SliderConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    SliderConfig::parse(&text).with_context(|| format!("parsing config {}", path.display()))
}
