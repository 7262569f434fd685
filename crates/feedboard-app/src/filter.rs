// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;

use crate::{
    Column, Display, FILTER_FETCH_STATUS_BUTTON_ID, FILTER_MISSING_GEO_BUTTON_ID, StatusTable,
};

pub const FILTER_MISSING_GEO_COOKIE: &str = "filterMissingGeoOn";
pub const FILTER_FETCH_STATUS_COOKIE: &str = "filterFetchStatusOn";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FilterKind {
    MissingGeo,
    FetchStatus,
}

impl FilterKind {
    pub const ALL: [Self; 2] = [Self::MissingGeo, Self::FetchStatus];

    /// Order in which persisted filters are re-run when the page loads. The
    /// later pass wins for rows both passes touch.
    pub const LOAD_ORDER: [Self; 2] = [Self::FetchStatus, Self::MissingGeo];

    pub const fn cookie_name(self) -> &'static str {
        match self {
            Self::MissingGeo => FILTER_MISSING_GEO_COOKIE,
            Self::FetchStatus => FILTER_FETCH_STATUS_COOKIE,
        }
    }

    pub const fn button_id(self) -> &'static str {
        match self {
            Self::MissingGeo => FILTER_MISSING_GEO_BUTTON_ID,
            Self::FetchStatus => FILTER_FETCH_STATUS_BUTTON_ID,
        }
    }

    pub const fn column(self) -> Column {
        match self {
            Self::MissingGeo => Column::MissingGeocode,
            Self::FetchStatus => Column::LastFetchStatus,
        }
    }

    pub const fn other(self) -> Self {
        match self {
            Self::MissingGeo => Self::FetchStatus,
            Self::FetchStatus => Self::MissingGeo,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::MissingGeo => "missing geocode",
            Self::FetchStatus => "fetch status",
        }
    }
}

/// Storage for the string-valued filter flags. Cookies in production, a
/// map in tests.
pub trait FlagStore {
    fn flag(&self, name: &str) -> Result<Option<String>>;
    fn set_flag(&mut self, name: &str, value: &str) -> Result<()>;
}

/// Only the literal `"true"` turns a filter on; absent or anything else is off.
pub fn parse_flag(value: Option<&str>) -> bool {
    value == Some("true")
}

pub const fn flag_value(active: bool) -> &'static str {
    if active { "true" } else { "false" }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FilterState {
    pub missing_geo: bool,
    pub fetch_status: bool,
}

impl FilterState {
    pub fn load<S: FlagStore + ?Sized>(store: &S) -> Result<Self> {
        let missing_geo = parse_flag(store.flag(FILTER_MISSING_GEO_COOKIE)?.as_deref());
        let fetch_status = parse_flag(store.flag(FILTER_FETCH_STATUS_COOKIE)?.as_deref());
        Ok(Self {
            missing_geo,
            fetch_status,
        })
    }

    pub const fn is_active(self, kind: FilterKind) -> bool {
        match kind {
            FilterKind::MissingGeo => self.missing_geo,
            FilterKind::FetchStatus => self.fetch_status,
        }
    }

    pub fn set(&mut self, kind: FilterKind, active: bool) {
        match kind {
            FilterKind::MissingGeo => self.missing_geo = active,
            FilterKind::FetchStatus => self.fetch_status = active,
        }
    }

    /// Inverts `kind`. Turning a filter on turns the other one off.
    pub fn toggle(&mut self, kind: FilterKind) -> bool {
        let active = !self.is_active(kind);
        if active {
            self.set(kind.other(), false);
        }
        self.set(kind, active);
        active
    }

    pub fn active(self) -> Option<FilterKind> {
        FilterKind::LOAD_ORDER
            .into_iter()
            .rev()
            .find(|kind| self.is_active(*kind))
    }

    pub const fn is_exclusive(self) -> bool {
        !(self.missing_geo && self.fetch_status)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FilterOutcome {
    pub hidden: usize,
    pub shown: usize,
    pub skipped: usize,
}

/// One visibility pass over every data row of `table`. Rows without a cell
/// at `column` keep their current display. The header row is never touched.
pub fn filter_rows(table: &mut StatusTable, column: Column, active: bool) -> FilterOutcome {
    let mut outcome = FilterOutcome::default();
    for row in table.rows.iter_mut().skip(1) {
        let Some(cell) = row.cell(column) else {
            outcome.skipped += 1;
            continue;
        };
        if active && !cell.is_failure() {
            row.display = Display::None;
            outcome.hidden += 1;
        } else {
            row.display = Display::Default;
            outcome.shown += 1;
        }
    }
    outcome
}

pub fn apply_filter(table: &mut StatusTable, kind: FilterKind, active: bool) -> FilterOutcome {
    filter_rows(table, kind.column(), active)
}
