//! Loading and saving generation configs as TOML or JSON.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use towergen::GenConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|extension| extension.to_str()) {
            Some("toml") => Ok(Self::Toml),
            Some("json") => Ok(Self::Json),
            other => bail!("unsupported config extension {other:?} for {}", path.display()),
        }
    }
}

/// Reads and validates a config. Missing fields take their defaults.
pub fn load_config(path: &Path) -> Result<GenConfig> {
    let format = ConfigFormat::from_path(path)?;
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config: GenConfig = match format {
        ConfigFormat::Toml => toml::from_str(&content)
            .with_context(|| format!("failed to parse TOML config {}", path.display()))?,
        ConfigFormat::Json => serde_json::from_str(&content)
            .with_context(|| format!("failed to parse JSON config {}", path.display()))?,
    };
    config.validate().with_context(|| format!("invalid config in {}", path.display()))?;
    Ok(config)
}

/// Writes through a sibling temp file so a crash never leaves half a config.
pub fn write_config_atomic(config: &GenConfig, path: &Path) -> Result<()> {
    let format = ConfigFormat::from_path(path)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }

    let content = match format {
        ConfigFormat::Toml => toml::to_string_pretty(config).context("failed to encode config as TOML")?,
        ConfigFormat::Json => {
            serde_json::to_string_pretty(config).context("failed to encode config as JSON")?
        }
    };
    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, content)
        .with_context(|| format!("failed to write config file {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path)
        .with_context(|| format!("failed to move config into place at {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn default_config_round_trips_through_both_formats() {
        let dir = tempdir().expect("temp dir");
        for name in ["tower.toml", "tower.json"] {
            let path = dir.path().join("nested").join(name);
            write_config_atomic(&GenConfig::default(), &path).expect("config writes");
            assert!(path.exists());
            assert!(!path.with_extension("tmp").exists(), "temp file is moved into place");

            let loaded = load_config(&path).expect("config loads");
            assert_eq!(loaded, GenConfig::default(), "{name} keeps every field");
        }
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("partial.toml");
        fs::write(&path, "floor_count = 4\nstages = [2.0, 1.0]\n\n[values]\nbase = 12.5\n").expect("fixture writes");

        let config = load_config(&path).expect("config loads");
        assert_eq!(config.floor_count, 4);
        assert_eq!(config.stages, vec![2.0, 1.0]);
        assert_eq!(config.values.base, 12.5);
        assert_eq!(config.values.keys, GenConfig::default().values.keys);
        assert_eq!(config.hero, GenConfig::default().hero);
    }

    #[test]
    fn invalid_values_are_reported_with_the_field_name() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("broken.toml");
        fs::write(&path, "floor_count = 0\n").expect("fixture writes");

        let error = load_config(&path).expect_err("zero floors is rejected");
        let message = format!("{error:#}");
        assert!(message.contains("floor_count"), "unexpected message: {message}");
    }

    #[test]
    fn unknown_extensions_are_rejected() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("tower.yaml");
        fs::write(&path, "floor_count: 3\n").expect("fixture writes");
        assert!(load_config(&path).is_err());
        assert_eq!(ConfigFormat::from_path(Path::new("a/b.json")).expect("json is known"), ConfigFormat::Json);
    }
}
