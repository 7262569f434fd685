// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use feedboard_app::FeedSource;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SnapshotFile {
    Wrapped { sources: Vec<FeedSource> },
    Bare(Vec<FeedSource>),
}

/// Parses an aggregator snapshot: either a bare array of sources or an
/// object with a `sources` array.
pub fn parse_snapshot(raw: &str) -> Result<Vec<FeedSource>> {
    let file: SnapshotFile = serde_json::from_str(raw).context("decode feed snapshot JSON")?;
    let sources = match file {
        SnapshotFile::Wrapped { sources } | SnapshotFile::Bare(sources) => sources,
    };

    let mut seen = BTreeSet::new();
    for source in &sources {
        if !seen.insert(source.id) {
            bail!(
                "feed snapshot lists source id {} more than once",
                source.id.get()
            );
        }
        if source.source_id.trim().is_empty() {
            bail!(
                "feed source {} has an empty source_id",
                source.id.get()
            );
        }
    }
    Ok(sources)
}

pub fn load_snapshot(path: &Path) -> Result<Vec<FeedSource>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read feed snapshot {}", path.display()))?;
    parse_snapshot(&raw).with_context(|| format!("parse feed snapshot {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::parse_snapshot;
    use anyhow::Result;

    const ONE_SOURCE: &str = r#"{
        "id": 1,
        "source_id": "de-dwd",
        "name": "DWD",
        "cap_alert_feed_status": "operating"
    }"#;

    #[test]
    fn accepts_bare_array_and_wrapped_object() -> Result<()> {
        let bare = parse_snapshot(&format!("[{ONE_SOURCE}]"))?;
        let wrapped = parse_snapshot(&format!("{{\"sources\": [{ONE_SOURCE}]}}"))?;
        assert_eq!(bare, wrapped);
        assert_eq!(bare.len(), 1);
        Ok(())
    }

    #[test]
    fn rejects_duplicate_ids() {
        let raw = format!("[{ONE_SOURCE}, {ONE_SOURCE}]");
        let error = parse_snapshot(&raw).expect_err("duplicate ids should fail");
        assert!(error.to_string().contains("more than once"));
    }

    #[test]
    fn rejects_malformed_json() {
        let error = parse_snapshot("{oops").expect_err("malformed JSON should fail");
        assert!(error.to_string().contains("decode feed snapshot JSON"));
    }
}
