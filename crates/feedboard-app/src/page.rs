// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};
use std::collections::BTreeSet;
use time::OffsetDateTime;

use crate::{Column, FAILURE_CLASS, FeedSource, FeedSourceId};

pub const STATUS_TABLE_ID: &str = "source_feed_status_table";
pub const FILTER_MISSING_GEO_BUTTON_ID: &str = "filterMissingGeoButtonId";
pub const FILTER_FETCH_STATUS_BUTTON_ID: &str = "filterFetchStatusButtonId";
pub const ACTIVE_CLASS: &str = "active";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassList(BTreeSet<String>);

impl ClassList {
    pub fn contains(&self, class: &str) -> bool {
        self.0.contains(class)
    }

    pub fn add(&mut self, class: &str) {
        self.0.insert(class.to_owned());
    }

    pub fn remove(&mut self, class: &str) {
        self.0.remove(class);
    }
}

impl<const N: usize> From<[&str; N]> for ClassList {
    fn from(classes: [&str; N]) -> Self {
        Self(classes.iter().map(|class| (*class).to_owned()).collect())
    }
}

/// Inline display override of a row. `Default` means no override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Display {
    #[default]
    Default,
    None,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableCell {
    pub text: String,
    pub classes: ClassList,
}

impl TableCell {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            classes: ClassList::default(),
        }
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.classes.add(class);
        self
    }

    pub fn is_failure(&self) -> bool {
        self.classes.contains(FAILURE_CLASS)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Header,
    Data,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub kind: RowKind,
    pub source_id: Option<FeedSourceId>,
    pub cells: Vec<TableCell>,
    pub display: Display,
}

impl TableRow {
    pub fn header(labels: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            kind: RowKind::Header,
            source_id: None,
            cells: labels.into_iter().map(TableCell::new).collect(),
            display: Display::Default,
        }
    }

    pub fn data(source_id: Option<FeedSourceId>, cells: Vec<TableCell>) -> Self {
        Self {
            kind: RowKind::Data,
            source_id,
            cells,
            display: Display::Default,
        }
    }

    pub fn cell(&self, column: Column) -> Option<&TableCell> {
        self.cells.get(column.ordinal())
    }

    pub fn is_hidden(&self) -> bool {
        self.display == Display::None
    }
}

/// The feed status table. Row 0 is the header row; filters never touch it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusTable {
    pub id: String,
    pub rows: Vec<TableRow>,
}

impl StatusTable {
    pub fn new(id: impl Into<String>, rows: Vec<TableRow>) -> Self {
        Self {
            id: id.into(),
            rows,
        }
    }

    pub fn data_rows(&self) -> impl Iterator<Item = &TableRow> {
        self.rows.iter().skip(1)
    }

    pub fn visible_data_rows(&self) -> impl Iterator<Item = &TableRow> {
        self.data_rows().filter(|row| !row.is_hidden())
    }

    /// Ordinal positions (header = 0) of rows currently hidden.
    pub fn hidden_ordinals(&self) -> Vec<usize> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.is_hidden())
            .map(|(index, _)| index)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub id: String,
    pub label: String,
    pub classes: ClassList,
}

impl Button {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            classes: ClassList::default(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.classes.contains(ACTIVE_CLASS)
    }

    pub fn toggle_active_class(&mut self) {
        if self.is_active() {
            self.classes.remove(ACTIVE_CLASS);
        } else {
            self.classes.add(ACTIVE_CLASS);
        }
    }
}

/// The rendered status page: a header summary, one table and the filter
/// buttons. Elements are looked up by id the way the page script does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusPage {
    pub number_of_sources: usize,
    pub generated_at: OffsetDateTime,
    pub table: Option<StatusTable>,
    pub buttons: Vec<Button>,
}

impl StatusPage {
    /// Renders operating sources ordered by source id. `number_of_sources`
    /// counts every source, operating or not.
    pub fn from_sources(sources: &[FeedSource], generated_at: OffsetDateTime) -> Self {
        let mut listed = sources
            .iter()
            .filter(|source| source.is_operating())
            .collect::<Vec<_>>();
        listed.sort_by(|left, right| {
            left.source_id
                .cmp(&right.source_id)
                .then(left.id.cmp(&right.id))
        });

        let mut rows = Vec::with_capacity(listed.len() + 1);
        rows.push(TableRow::header(
            Column::ALL.iter().map(|column| column.label()),
        ));
        rows.extend(listed.into_iter().map(source_row));

        Self {
            number_of_sources: sources.len(),
            generated_at,
            table: Some(StatusTable::new(STATUS_TABLE_ID, rows)),
            buttons: default_buttons(),
        }
    }

    pub fn table(&self, id: &str) -> Result<&StatusTable> {
        self.table
            .as_ref()
            .filter(|table| table.id == id)
            .ok_or_else(|| anyhow!("table #{id} not found on status page"))
    }

    pub fn table_mut(&mut self, id: &str) -> Result<&mut StatusTable> {
        self.table
            .as_mut()
            .filter(|table| table.id == id)
            .ok_or_else(|| anyhow!("table #{id} not found on status page"))
    }

    pub fn button(&self, id: &str) -> Result<&Button> {
        self.buttons
            .iter()
            .find(|button| button.id == id)
            .ok_or_else(|| anyhow!("button #{id} not found on status page"))
    }

    pub fn button_mut(&mut self, id: &str) -> Result<&mut Button> {
        self.buttons
            .iter_mut()
            .find(|button| button.id == id)
            .ok_or_else(|| anyhow!("button #{id} not found on status page"))
    }

    pub fn toggle_active_class(&mut self, button_id: &str) -> Result<()> {
        self.button_mut(button_id)?.toggle_active_class();
        Ok(())
    }
}

pub fn default_buttons() -> Vec<Button> {
    vec![
        Button::new(FILTER_MISSING_GEO_BUTTON_ID, "missing geocode"),
        Button::new(FILTER_FETCH_STATUS_BUTTON_ID, "fetch failures"),
    ]
}

fn source_row(source: &FeedSource) -> TableRow {
    let mut cells = Vec::with_capacity(Column::ALL.len());
    for column in Column::ALL {
        cells.push(source_cell(source, column));
    }
    TableRow::data(Some(source.id), cells)
}

fn source_cell(source: &FeedSource, column: Column) -> TableCell {
    match column {
        Column::SourceId => TableCell::new(&source.source_id),
        Column::Name => TableCell::new(&source.name),
        Column::Country => TableCell::new(&source.authority_country),
        Column::Authority => TableCell::new(&source.authority_abbrev),
        Column::Official => TableCell::new(yes_no(source.source_is_official)),
        Column::Format => TableCell::new(&source.format),
        Column::FeedStatus => TableCell::new(&source.cap_alert_feed_status),
        Column::FeedSource => TableCell::new(&source.feed_source),
        Column::LatestAlert => TableCell::new(
            source
                .latest_published_alert_datetime
                .map(format_timestamp)
                .unwrap_or_default(),
        ),
        Column::FetchDuration => TableCell::new(
            source
                .last_fetch_duration_ms
                .map(format_duration_ms)
                .unwrap_or_default(),
        ),
        Column::MissingGeocode => {
            let cell = TableCell::new(yes_no(source.missing_geo_information));
            if source.geo_missing() {
                cell.with_class(FAILURE_CLASS)
            } else {
                cell
            }
        }
        Column::LastFetchStatus => {
            let label = match source.last_fetch_status {
                Some(true) => "ok",
                Some(false) => "failed",
                None => "",
            };
            let cell = TableCell::new(label);
            if source.fetch_failed() {
                cell.with_class(FAILURE_CLASS)
            } else {
                cell
            }
        }
        Column::Warnings => TableCell::new(source.feed_warnings.clone().unwrap_or_default()),
    }
}

fn yes_no(value: Option<bool>) -> &'static str {
    match value {
        Some(true) => "yes",
        Some(false) => "no",
        None => "",
    }
}

pub fn format_timestamp(value: OffsetDateTime) -> String {
    let layout = time::macros::format_description!("[year]-[month]-[day] [hour]:[minute]");
    value
        .format(layout)
        .unwrap_or_else(|_| value.unix_timestamp().to_string())
}

fn format_duration_ms(millis: u64) -> String {
    if millis < 1_000 {
        format!("{millis}ms")
    } else {
        format!("{:.1}s", millis as f64 / 1_000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::{
        Button, ClassList, Display, FILTER_FETCH_STATUS_BUTTON_ID, FILTER_MISSING_GEO_BUTTON_ID,
        RowKind, STATUS_TABLE_ID, StatusPage, format_duration_ms,
    };
    use crate::{Column, FAILURE_CLASS, FeedSource, FeedSourceId};
    use anyhow::Result;
    use time::OffsetDateTime;

    fn source(id: i64, source_id: &str, status: &str) -> FeedSource {
        FeedSource {
            id: FeedSourceId::new(id),
            source_id: source_id.to_owned(),
            name: format!("Source {id}"),
            authority_country: "de".to_owned(),
            authority_abbrev: "DWD".to_owned(),
            format: "atom".to_owned(),
            feed_source: "https://example.org/feed.xml".to_owned(),
            cap_alert_feed_status: status.to_owned(),
            source_is_official: Some(true),
            last_fetch_status: Some(true),
            last_fetch_duration_ms: Some(420),
            missing_geo_information: Some(false),
            feed_warnings: None,
            latest_published_alert_datetime: None,
        }
    }

    #[test]
    fn from_sources_lists_operating_sources_sorted_by_source_id() -> Result<()> {
        let sources = vec![
            source(1, "us-noaa", "operating"),
            source(2, "at-zamg", "operating"),
            source(3, "ch-meteo", "testing"),
        ];
        let page = StatusPage::from_sources(&sources, OffsetDateTime::UNIX_EPOCH);

        assert_eq!(page.number_of_sources, 3);
        let table = page.table(STATUS_TABLE_ID)?;
        assert_eq!(table.rows[0].kind, RowKind::Header);
        let listed = table
            .data_rows()
            .map(|row| row.cells[Column::SourceId.ordinal()].text.clone())
            .collect::<Vec<_>>();
        assert_eq!(listed, vec!["at-zamg", "us-noaa"]);
        Ok(())
    }

    #[test]
    fn failure_class_marks_missing_geo_and_failed_fetch_cells() -> Result<()> {
        let mut broken = source(1, "a", "operating");
        broken.missing_geo_information = Some(true);
        broken.last_fetch_status = Some(false);
        let healthy = source(2, "b", "operating");

        let page = StatusPage::from_sources(&[broken, healthy], OffsetDateTime::UNIX_EPOCH);
        let table = page.table(STATUS_TABLE_ID)?;
        let rows = table.data_rows().collect::<Vec<_>>();

        let geo = rows[0].cell(Column::MissingGeocode).expect("geo cell");
        let fetch = rows[0].cell(Column::LastFetchStatus).expect("fetch cell");
        assert!(geo.classes.contains(FAILURE_CLASS));
        assert!(fetch.classes.contains(FAILURE_CLASS));
        assert_eq!(fetch.text, "failed");

        assert!(!rows[1].cell(Column::MissingGeocode).expect("geo").is_failure());
        assert!(!rows[1].cell(Column::LastFetchStatus).expect("fetch").is_failure());
        Ok(())
    }

    #[test]
    fn missing_elements_are_reported_by_id() {
        let mut page = StatusPage::from_sources(&[], OffsetDateTime::UNIX_EPOCH);
        page.table = None;
        page.buttons.clear();

        let table_error = page
            .table(STATUS_TABLE_ID)
            .expect_err("table lookup should fail");
        assert!(table_error.to_string().contains(STATUS_TABLE_ID));

        let button_error = page
            .toggle_active_class(FILTER_MISSING_GEO_BUTTON_ID)
            .expect_err("button lookup should fail");
        assert!(button_error.to_string().contains(FILTER_MISSING_GEO_BUTTON_ID));
    }

    #[test]
    fn toggle_active_class_flips_only_the_named_button() -> Result<()> {
        let mut page = StatusPage::from_sources(&[], OffsetDateTime::UNIX_EPOCH);

        page.toggle_active_class(FILTER_FETCH_STATUS_BUTTON_ID)?;
        assert!(page.button(FILTER_FETCH_STATUS_BUTTON_ID)?.is_active());
        assert!(!page.button(FILTER_MISSING_GEO_BUTTON_ID)?.is_active());

        page.toggle_active_class(FILTER_FETCH_STATUS_BUTTON_ID)?;
        assert!(!page.button(FILTER_FETCH_STATUS_BUTTON_ID)?.is_active());
        Ok(())
    }

    #[test]
    fn toggle_keeps_unrelated_classes() {
        let mut button = Button::new("b", "b");
        button.classes = ClassList::from(["btn", "btn-primary"]);
        button.toggle_active_class();
        button.toggle_active_class();
        assert_eq!(button.classes, ClassList::from(["btn", "btn-primary"]));
    }

    #[test]
    fn new_rows_have_no_display_override() {
        let page = StatusPage::from_sources(
            &[source(1, "a", "operating")],
            OffsetDateTime::UNIX_EPOCH,
        );
        let table = page.table.expect("table");
        assert!(table.rows.iter().all(|row| row.display == Display::Default));
        assert!(table.hidden_ordinals().is_empty());
    }

    #[test]
    fn fetch_duration_switches_to_seconds_past_one_second() {
        assert_eq!(format_duration_ms(420), "420ms");
        assert_eq!(format_duration_ms(2_500), "2.5s");
    }
}
