// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::ids::*;

/// CSS class carried by a status cell that reports a problem. Rows whose
/// filtered cell has it stay visible while a filter is active.
pub const FAILURE_CLASS: &str = "last_fetch_status_failure";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedStatus {
    Operating,
    Testing,
    Unavailable,
}

impl FeedStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Operating => "operating",
            Self::Testing => "testing",
            Self::Unavailable => "unavailable",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "operating" => Some(Self::Operating),
            "testing" => Some(Self::Testing),
            "unavailable" => Some(Self::Unavailable),
            _ => None,
        }
    }
}

/// One CAP feed source as reported by the aggregator snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedSource {
    pub id: FeedSourceId,
    pub source_id: String,
    pub name: String,
    #[serde(default)]
    pub authority_country: String,
    #[serde(default)]
    pub authority_abbrev: String,
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub feed_source: String,
    pub cap_alert_feed_status: String,
    #[serde(default)]
    pub source_is_official: Option<bool>,
    #[serde(default)]
    pub last_fetch_status: Option<bool>,
    #[serde(default)]
    pub last_fetch_duration_ms: Option<u64>,
    #[serde(default)]
    pub missing_geo_information: Option<bool>,
    #[serde(default)]
    pub feed_warnings: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub latest_published_alert_datetime: Option<OffsetDateTime>,
}

impl FeedSource {
    pub fn status(&self) -> Option<FeedStatus> {
        FeedStatus::parse(&self.cap_alert_feed_status)
    }

    pub fn is_operating(&self) -> bool {
        self.status() == Some(FeedStatus::Operating)
    }

    pub fn fetch_failed(&self) -> bool {
        self.last_fetch_status == Some(false)
    }

    pub fn geo_missing(&self) -> bool {
        self.missing_geo_information == Some(true)
    }
}

/// Columns of the status table. The ordinal is the cell position inside a
/// row and is fixed; both filters address cells through this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Column {
    SourceId,
    Name,
    Country,
    Authority,
    Official,
    Format,
    FeedStatus,
    FeedSource,
    LatestAlert,
    FetchDuration,
    MissingGeocode,
    LastFetchStatus,
    Warnings,
}

impl Column {
    pub const ALL: [Self; 13] = [
        Self::SourceId,
        Self::Name,
        Self::Country,
        Self::Authority,
        Self::Official,
        Self::Format,
        Self::FeedStatus,
        Self::FeedSource,
        Self::LatestAlert,
        Self::FetchDuration,
        Self::MissingGeocode,
        Self::LastFetchStatus,
        Self::Warnings,
    ];

    pub const fn ordinal(self) -> usize {
        match self {
            Self::SourceId => 0,
            Self::Name => 1,
            Self::Country => 2,
            Self::Authority => 3,
            Self::Official => 4,
            Self::Format => 5,
            Self::FeedStatus => 6,
            Self::FeedSource => 7,
            Self::LatestAlert => 8,
            Self::FetchDuration => 9,
            Self::MissingGeocode => 10,
            Self::LastFetchStatus => 11,
            Self::Warnings => 12,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::SourceId => "source id",
            Self::Name => "name",
            Self::Country => "country",
            Self::Authority => "authority",
            Self::Official => "official",
            Self::Format => "format",
            Self::FeedStatus => "status",
            Self::FeedSource => "feed source",
            Self::LatestAlert => "latest alert",
            Self::FetchDuration => "fetch time",
            Self::MissingGeocode => "missing geocode",
            Self::LastFetchStatus => "last fetch",
            Self::Warnings => "warnings",
        }
    }
}
