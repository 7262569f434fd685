// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};

/// Rejects values that look like URLs rather than local files. `what`
/// names the setting in error messages ("cookie jar path", ...).
pub fn validate_local_path(what: &str, path: &str) -> Result<()> {
    if path.trim().is_empty() {
        bail!("{what} must not be empty");
    }

    if let Some(index) = path.find("://")
        && index > 0
    {
        let scheme = &path[..index];
        if scheme.chars().all(char::is_alphabetic) {
            bail!("{what} {path:?} looks like a URI ({scheme}://); pass a filesystem path instead");
        }
    }

    if path.starts_with("file:") {
        bail!("{what} {path:?} uses file: URI syntax; pass a plain filesystem path");
    }

    Ok(())
}

pub fn validate_cookie_path(path: &str) -> Result<()> {
    validate_local_path("cookie jar path", path)
}

pub fn validate_snapshot_path(path: &str) -> Result<()> {
    validate_local_path("feed snapshot path", path)?;
    if !path.ends_with(".json") {
        bail!("feed snapshot path {path:?} must point at a .json file");
    }
    Ok(())
}
