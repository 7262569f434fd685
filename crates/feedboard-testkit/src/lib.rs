// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use feedboard_app::{
    Column, FAILURE_CLASS, FeedSource, FeedSourceId, FeedStatus, STATUS_TABLE_ID, StatusPage,
    StatusTable, TableCell, TableRow, default_buttons,
};
use std::path::{Path, PathBuf};
use time::macros::datetime;
use time::{Duration, OffsetDateTime};

const AUTHORITIES: [(&str, &str, &str); 12] = [
    ("de", "DWD", "Deutscher Wetterdienst"),
    ("de", "BBK", "Bundesamt fuer Bevoelkerungsschutz"),
    ("at", "GSA", "GeoSphere Austria"),
    ("ch", "BABS", "Alertswiss"),
    ("lu", "GOUV", "LU-Alert"),
    ("fr", "MF", "Meteo-France"),
    ("nl", "KNMI", "Koninklijk Nederlands Meteorologisch Instituut"),
    ("it", "DPC", "Protezione Civile"),
    ("ie", "MET", "Met Eireann"),
    ("us", "NWS", "National Weather Service"),
    ("ca", "NAAD", "National Alert Aggregation and Dissemination"),
    ("tw", "CWA", "Central Weather Administration"),
];

const FORMATS: [&str; 4] = ["atom", "rss", "xml", "json"];
const FEED_HOSTS: [&str; 5] = [
    "alerts.example.org",
    "cap.example.net",
    "feeds.example.com",
    "warn.example.eu",
    "public-alerts.example.gov",
];
const WARNINGS: [&str; 4] = [
    "['no polygon or geocode in info block']",
    "['unknown geocode valueName']",
    "['area without geometry']",
    "['geocode could not be resolved']",
];

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    /// True roughly once every `n` draws.
    fn one_in(&mut self, n: usize) -> bool {
        self.int_n(n) == 0
    }
}

/// Seeded generator of plausible CAP feed sources.
#[derive(Debug, Clone)]
pub struct FeedFaker {
    rng: DeterministicRng,
}

impl FeedFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
        }
    }

    pub fn sources(&mut self, count: usize) -> Vec<FeedSource> {
        (1..=count)
            .map(|id| self.source(FeedSourceId::new(id as i64)))
            .collect()
    }

    pub fn source(&mut self, id: FeedSourceId) -> FeedSource {
        let (country, abbrev, name) = AUTHORITIES[self.rng.int_n(AUTHORITIES.len())];
        let format = FORMATS[self.rng.int_n(FORMATS.len())];
        let host = FEED_HOSTS[self.rng.int_n(FEED_HOSTS.len())];

        let status = if self.rng.one_in(8) {
            FeedStatus::Testing
        } else if self.rng.one_in(12) {
            FeedStatus::Unavailable
        } else {
            FeedStatus::Operating
        };

        let last_fetch_status = if self.rng.one_in(10) {
            None
        } else {
            Some(!self.rng.one_in(5))
        };
        let missing_geo_information = if last_fetch_status.is_none() {
            None
        } else {
            Some(self.rng.one_in(6))
        };
        let feed_warnings = if missing_geo_information == Some(true) {
            Some(WARNINGS[self.rng.int_n(WARNINGS.len())].to_owned())
        } else {
            None
        };
        let last_fetch_duration_ms = last_fetch_status.map(|_| 80 + self.rng.next_u64() % 4_920);
        let latest_published_alert_datetime = if self.rng.one_in(7) {
            None
        } else {
            let minutes_back = (self.rng.next_u64() % (60 * 24 * 30)) as i64;
            Some(reference_now() - Duration::minutes(minutes_back))
        };

        FeedSource {
            id,
            source_id: format!("{country}-{}-{:03}", abbrev.to_lowercase(), id.get()),
            name: name.to_owned(),
            authority_country: country.to_owned(),
            authority_abbrev: abbrev.to_owned(),
            format: format.to_owned(),
            feed_source: format!("https://{host}/{country}/{}.{format}", abbrev.to_lowercase()),
            cap_alert_feed_status: status.as_str().to_owned(),
            source_is_official: Some(!self.rng.one_in(4)),
            last_fetch_status,
            last_fetch_duration_ms,
            missing_geo_information,
            feed_warnings,
            latest_published_alert_datetime,
        }
    }
}

pub fn fixture_datetime() -> OffsetDateTime {
    datetime!(2026-02-19 12:34:56 UTC)
}

fn reference_now() -> OffsetDateTime {
    datetime!(2026-01-01 00:00:00 UTC)
}

/// A full-width data row. The two filtered cells carry the failure class
/// when the matching flag is set.
pub fn status_row(geo_failing: bool, fetch_failing: bool) -> TableRow {
    let cells = Column::ALL
        .iter()
        .map(|column| {
            let failing = match column {
                Column::MissingGeocode => geo_failing,
                Column::LastFetchStatus => fetch_failing,
                _ => false,
            };
            let cell = TableCell::new(column.label());
            if failing {
                cell.with_class(FAILURE_CLASS)
            } else {
                cell
            }
        })
        .collect();
    TableRow::data(None, cells)
}

/// A data row too short to reach the filtered columns, like a notice row
/// spanning the table.
pub fn notice_row(text: &str) -> TableRow {
    TableRow::data(None, vec![TableCell::new(text)])
}

pub fn status_page(rows: Vec<TableRow>) -> StatusPage {
    let mut all = Vec::with_capacity(rows.len() + 1);
    all.push(TableRow::header(
        Column::ALL.iter().map(|column| column.label()),
    ));
    all.extend(rows);
    StatusPage {
        number_of_sources: all.len() - 1,
        generated_at: fixture_datetime(),
        table: Some(StatusTable::new(STATUS_TABLE_ID, all)),
        buttons: default_buttons(),
    }
}

/// Three data rows; only the second has a failing fetch-status cell.
pub fn three_row_fetch_page() -> StatusPage {
    status_page(vec![
        status_row(false, false),
        status_row(false, true),
        status_row(false, false),
    ])
}

pub fn temp_cookie_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let path = dir.path().join("cookies.txt");
    Ok((dir, path))
}

pub fn write_snapshot(dir: &Path, sources: &[FeedSource]) -> Result<PathBuf> {
    let path = dir.join("sources.json");
    let body = serde_json::to_string_pretty(sources).context("encode feed snapshot")?;
    std::fs::write(&path, body)
        .with_context(|| format!("write feed snapshot {}", path.display()))?;
    Ok(path)
}
