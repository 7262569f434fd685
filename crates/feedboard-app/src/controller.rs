// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use tracing::{debug, warn};

use crate::{
    FilterKind, FilterOutcome, FilterState, FlagStore, STATUS_TABLE_ID, StatusPage, apply_filter,
    flag_value,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterEvent {
    FlagWritten { kind: FilterKind, active: bool },
    ButtonToggled { kind: FilterKind, active: bool },
    RowsFiltered { kind: FilterKind, outcome: FilterOutcome },
}

/// Click and load handlers for the status page filters. Flags live in the
/// injected store; the page is passed in per call.
#[derive(Debug)]
pub struct RowFilterController<S> {
    store: S,
}

impl<S: FlagStore> RowFilterController<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn state(&self) -> Result<FilterState> {
        FilterState::load(&self.store)
    }

    pub fn on_filter_geo_click(&mut self, page: &mut StatusPage) -> Result<Vec<FilterEvent>> {
        self.on_filter_click(page, FilterKind::MissingGeo)
    }

    pub fn on_filter_fetch_status_click(
        &mut self,
        page: &mut StatusPage,
    ) -> Result<Vec<FilterEvent>> {
        self.on_filter_click(page, FilterKind::FetchStatus)
    }

    pub fn on_filter_click(
        &mut self,
        page: &mut StatusPage,
        kind: FilterKind,
    ) -> Result<Vec<FilterEvent>> {
        debug!(filter = kind.label(), "filter button pressed");
        // Resolve every element the click touches before writing cookies so
        // a broken page leaves the stored flags as they were.
        page.table(STATUS_TABLE_ID)?;
        page.button(kind.button_id())?;
        page.button(kind.other().button_id())?;

        let mut state = self.state()?;
        let active = state.toggle(kind);
        let mut events = Vec::with_capacity(4);

        if active {
            self.store
                .set_flag(kind.other().cookie_name(), flag_value(false))?;
            events.push(FilterEvent::FlagWritten {
                kind: kind.other(),
                active: false,
            });
        }
        self.store
            .set_flag(kind.cookie_name(), flag_value(active))?;
        events.push(FilterEvent::FlagWritten { kind, active });
        debug!(filter = kind.label(), active, "filter flag written");

        events.extend(sync_buttons(page, state)?);

        let table = page.table_mut(STATUS_TABLE_ID)?;
        let outcome = apply_filter(table, kind, active);
        debug!(
            filter = kind.label(),
            hidden = outcome.hidden,
            shown = outcome.shown,
            skipped = outcome.skipped,
            "rows filtered"
        );
        events.push(FilterEvent::RowsFiltered { kind, outcome });
        Ok(events)
    }

    /// Re-runs every persisted filter on a freshly rendered page, in
    /// [`FilterKind::LOAD_ORDER`].
    pub fn apply_filters_on_load(&self, page: &mut StatusPage) -> Result<Vec<FilterEvent>> {
        let state = self.state()?;
        if !state.is_exclusive() {
            warn!("both filter cookies are set; the missing geocode pass runs last and wins");
        }

        let mut events = sync_buttons(page, state)?;
        for kind in FilterKind::LOAD_ORDER {
            if !state.is_active(kind) {
                continue;
            }
            let table = page.table_mut(STATUS_TABLE_ID)?;
            let outcome = apply_filter(table, kind, true);
            debug!(
                filter = kind.label(),
                hidden = outcome.hidden,
                "persisted filter reapplied"
            );
            events.push(FilterEvent::RowsFiltered { kind, outcome });
        }
        Ok(events)
    }
}

/// Brings each button's `active` class in line with its flag.
fn sync_buttons(page: &mut StatusPage, state: FilterState) -> Result<Vec<FilterEvent>> {
    let mut events = Vec::new();
    for kind in FilterKind::ALL {
        let active = state.is_active(kind);
        if page.button(kind.button_id())?.is_active() != active {
            page.toggle_active_class(kind.button_id())?;
            events.push(FilterEvent::ButtonToggled { kind, active });
        }
    }
    Ok(events)
}
