// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use cookie::{Cookie, CookieJar, SameSite};
use feedboard_app::FlagStore;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// In-memory session cookies scoped to the status page. Every cookie is
/// written `Secure; SameSite=Strict; Path=/` with no expiry.
#[derive(Debug, Clone, Default)]
pub struct SessionCookies {
    jar: CookieJar,
}

impl SessionCookies {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_session_cookie(&mut self, name: &str, value: &str) {
        let cookie = Cookie::build((name.to_owned(), value.to_owned()))
            .secure(true)
            .same_site(SameSite::Strict)
            .path("/")
            .build();
        self.jar.add(cookie);
    }

    pub fn get_session_cookie(&self, name: &str) -> Option<String> {
        self.jar.get(name).map(|cookie| cookie.value().to_owned())
    }

    pub fn cookie(&self, name: &str) -> Option<&Cookie<'static>> {
        self.jar.get(name)
    }

    /// `name=value` pairs joined by `"; "`, sorted by name.
    pub fn document_cookie(&self) -> String {
        self.sorted()
            .iter()
            .map(|cookie| format!("{}={}", cookie.name(), cookie.value()))
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// One `Set-Cookie` header value per cookie, sorted by name.
    pub fn set_cookie_lines(&self) -> Vec<String> {
        self.sorted()
            .iter()
            .map(|cookie| cookie.to_string())
            .collect()
    }

    /// Rebuilds a jar from `Set-Cookie` lines. Blank lines are ignored and
    /// lines that do not parse are skipped.
    pub fn from_set_cookie_lines(raw: &str) -> Self {
        let mut cookies = Self::new();
        for (index, line) in raw.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match Cookie::parse(line.to_owned()) {
                Ok(cookie) => cookies.jar.add(cookie),
                Err(error) => {
                    warn!(line = index + 1, %error, "skipping unparseable cookie line");
                }
            }
        }
        cookies
    }

    pub fn len(&self) -> usize {
        self.jar.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn sorted(&self) -> Vec<&Cookie<'static>> {
        let mut cookies = self.jar.iter().collect::<Vec<_>>();
        cookies.sort_by(|left, right| left.name().cmp(right.name()));
        cookies
    }
}

impl FlagStore for SessionCookies {
    fn flag(&self, name: &str) -> Result<Option<String>> {
        Ok(self.get_session_cookie(name))
    }

    fn set_flag(&mut self, name: &str, value: &str) -> Result<()> {
        self.set_session_cookie(name, value);
        Ok(())
    }
}

/// Session cookies persisted to disk. Every write is flushed immediately so
/// a later run sees the same flags.
#[derive(Debug, Clone)]
pub struct CookieFile {
    path: PathBuf,
    cookies: SessionCookies,
}

impl CookieFile {
    /// Opens the jar at `path`; a missing file is an empty jar.
    pub fn open(path: &Path) -> Result<Self> {
        let cookies = if path.exists() {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("read cookie jar {}", path.display()))?;
            SessionCookies::from_set_cookie_lines(&raw)
        } else {
            SessionCookies::new()
        };
        debug!(path = %path.display(), cookies = cookies.len(), "cookie jar opened");
        Ok(Self {
            path: path.to_path_buf(),
            cookies,
        })
    }

    /// Starts a new browsing session: drops whatever the file held.
    pub fn open_fresh(path: &Path) -> Result<Self> {
        let jar = Self {
            path: path.to_path_buf(),
            cookies: SessionCookies::new(),
        };
        jar.save()?;
        Ok(jar)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn cookies(&self) -> &SessionCookies {
        &self.cookies
    }

    pub fn save(&self) -> Result<()> {
        write_jar(&self.path, &self.cookies)
    }
}

fn write_jar(path: &Path, cookies: &SessionCookies) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create cookie directory {}", parent.display()))?;
    }

    let mut body = cookies.set_cookie_lines().join("\n");
    if !body.is_empty() {
        body.push('\n');
    }
    fs::write(path, body).with_context(|| format!("write cookie jar {}", path.display()))?;
    debug!(path = %path.display(), cookies = cookies.len(), "cookie jar saved");
    Ok(())
}

impl FlagStore for CookieFile {
    fn flag(&self, name: &str) -> Result<Option<String>> {
        self.cookies.flag(name)
    }

    /// The in-memory jar only changes once the file write succeeded.
    fn set_flag(&mut self, name: &str, value: &str) -> Result<()> {
        let mut next = self.cookies.clone();
        next.set_session_cookie(name, value);
        write_jar(&self.path, &next)?;
        self.cookies = next;
        Ok(())
    }
}
