//! Match configuration loading

use std::path::Path;

use anyhow::{Context, Result};

use hexfront_core::MatchConfig;

/// Defaults, overlaid by the JSON file if given, then by the seed override
pub fn load_match_config(path: Option<&Path>, seed: Option<u64>) -> Result<MatchConfig> {
    let mut config = match path {
        Some(path) => read_config(path)?,
        None => MatchConfig::default(),
    };
    if let Some(seed) = seed {
        config.seed = seed;
    }
    Ok(config)
}

fn read_config(path: &Path) -> Result<MatchConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    let config = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config: {}", path.display()))?;
    tracing::debug!(path = %path.display(), "loaded match config");
    Ok(config)
}

/// Apply optional size overrides from command arguments
pub fn with_size(mut config: MatchConfig, width: Option<u32>, height: Option<u32>) -> MatchConfig {
    if let Some(width) = width {
        config.width = width;
    }
    if let Some(height) = height {
        config.height = height;
    }
    config
}
