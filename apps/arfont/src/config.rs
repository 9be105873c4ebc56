use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context};
use client_core::DEFAULT_API_URL;
use serde::Deserialize;

pub const CONFIG_FILE: &str = "arfont.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api_url: String,
    pub download_dir: PathBuf,
    /// Config path → value, applied before `--set` overrides.
    pub defaults: BTreeMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
            download_dir: PathBuf::from("."),
            defaults: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_url: Option<String>,
    download_dir: Option<PathBuf>,
    #[serde(default)]
    defaults: BTreeMap<String, toml::Value>,
}

pub fn load_settings(config_path: &Path) -> anyhow::Result<Settings> {
    load_settings_with_env(config_path, |key| std::env::var(key).ok())
}

/// File values override built-in defaults; environment overrides the file.
pub fn load_settings_with_env(
    config_path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    match fs::read_to_string(config_path) {
        Ok(raw) => {
            let file_cfg: FileSettings = toml::from_str(&raw)
                .with_context(|| format!("invalid config file '{}'", config_path.display()))?;
            if let Some(v) = file_cfg.api_url {
                settings.api_url = v;
            }
            if let Some(v) = file_cfg.download_dir {
                settings.download_dir = v;
            }
            for (path, value) in file_cfg.defaults {
                settings.defaults.insert(path, toml_scalar(value));
            }
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read config file '{}'", config_path.display()))
        }
    }

    if let Some(v) = env("ARFONT_API_URL") {
        settings.api_url = v;
    }
    if let Some(v) = env("APP__API_URL") {
        settings.api_url = v;
    }

    if let Some(v) = env("ARFONT_DOWNLOAD_DIR") {
        settings.download_dir = PathBuf::from(v);
    }
    if let Some(v) = env("APP__DOWNLOAD_DIR") {
        settings.download_dir = PathBuf::from(v);
    }

    Ok(settings)
}

fn toml_scalar(value: toml::Value) -> String {
    match value {
        toml::Value::String(text) => text,
        other => other.to_string(),
    }
}

/// Parses a `PATH=VALUE` assignment given on the command line.
pub fn parse_assignment(raw: &str) -> anyhow::Result<(String, String)> {
    let (path, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("expected PATH=VALUE, got '{raw}'"))?;
    let path = path.trim();
    if path.is_empty() {
        return Err(anyhow!("missing config path in '{raw}'"));
    }
    Ok((path.to_string(), value.trim().to_string()))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
