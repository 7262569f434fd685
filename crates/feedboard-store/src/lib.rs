// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod cookies;
mod snapshot;
mod validation;

use anyhow::{Context, Result, anyhow};
use std::env;
use std::fs;
use std::path::PathBuf;

pub use cookies::{CookieFile, SessionCookies};
pub use snapshot::{load_snapshot, parse_snapshot};
pub use validation::{validate_cookie_path, validate_local_path, validate_snapshot_path};

pub const APP_NAME: &str = "feedboard";

pub fn default_cookie_path() -> Result<PathBuf> {
    if let Some(override_path) = env::var_os("FEEDBOARD_COOKIE_PATH") {
        return Ok(PathBuf::from(override_path));
    }
    Ok(data_dir()?.join("cookies.txt"))
}

pub fn default_log_path() -> Result<PathBuf> {
    if let Some(override_path) = env::var_os("FEEDBOARD_LOG_PATH") {
        return Ok(PathBuf::from(override_path));
    }
    Ok(data_dir()?.join("feedboard.log"))
}

fn data_dir() -> Result<PathBuf> {
    let data_root = dirs::data_local_dir().ok_or_else(|| {
        anyhow!("cannot resolve data directory; set FEEDBOARD_COOKIE_PATH to a writable file")
    })?;

    let app_dir = data_root.join(APP_NAME);
    fs::create_dir_all(&app_dir)
        .with_context(|| format!("create data directory {}", app_dir.display()))?;
    Ok(app_dir)
}
