// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_VERSION: i64 = 1;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub source: Source,
    #[serde(default)]
    pub cookies: Cookies,
    #[serde(default)]
    pub ui: Ui,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            source: Source::default(),
            cookies: Cookies::default(),
            ui: Ui::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Source {
    pub snapshot_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Cookies {
    pub jar_path: Option<String>,
    pub restore_session: Option<bool>,
}

impl Default for Cookies {
    fn default() -> Self {
        Self {
            jar_path: None,
            restore_session: Some(true),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Ui {
    pub show_generated_at: Option<bool>,
}

impl Default for Ui {
    fn default() -> Self {
        Self {
            show_generated_at: Some(true),
        }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("FEEDBOARD_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!(
                "cannot resolve config directory; set FEEDBOARD_CONFIG_PATH to the config file"
            )
        })?;

        let app_dir = config_root.join(feedboard_store::APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} has no version. Add `version = 1` and put values under [source], [cookies], and [ui]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if let Some(snapshot_path) = &self.source.snapshot_path {
            feedboard_store::validate_snapshot_path(snapshot_path)?;
        }
        if let Some(jar_path) = &self.cookies.jar_path {
            feedboard_store::validate_cookie_path(jar_path)?;
        }
        Ok(())
    }

    pub fn snapshot_path(&self) -> Option<PathBuf> {
        self.source.snapshot_path.as_ref().map(PathBuf::from)
    }

    /// `[cookies].jar_path` wins over `FEEDBOARD_COOKIE_PATH`, which wins
    /// over the platform data dir.
    pub fn cookie_path(&self) -> Result<PathBuf> {
        match &self.cookies.jar_path {
            Some(path) => Ok(PathBuf::from(path)),
            None => feedboard_store::default_cookie_path(),
        }
    }

    pub fn restore_session(&self) -> bool {
        self.cookies.restore_session.unwrap_or(true)
    }

    pub fn show_generated_at(&self) -> bool {
        self.ui.show_generated_at.unwrap_or(true)
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# feedboard config\n# Place this file at: {}\n\nversion = 1\n\n[source]\n# JSON export of the aggregator's feed sources\n# snapshot_path = \"/absolute/path/to/sources.json\"\n\n[cookies]\n# Optional. Default is platform data dir (for example ~/.local/share/feedboard/cookies.txt)\n# jar_path = \"/absolute/path/to/cookies.txt\"\n# false starts every run with no filters set\nrestore_session = true\n\n[ui]\nshow_generated_at = true\n",
            path.display(),
        )
    }
}
