// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use feedboard_app::{
    FILTER_FETCH_STATUS_BUTTON_ID, FILTER_FETCH_STATUS_COOKIE, FILTER_MISSING_GEO_BUTTON_ID,
    FILTER_MISSING_GEO_COOKIE, FlagStore, RowFilterController, STATUS_TABLE_ID, StatusPage,
};
use feedboard_store::{CookieFile, load_snapshot, validate_cookie_path};
use feedboard_testkit::{
    FeedFaker, fixture_datetime, temp_cookie_path, three_row_fetch_page, write_snapshot,
};

fn hidden(page: &StatusPage) -> Result<Vec<usize>> {
    Ok(page.table(STATUS_TABLE_ID)?.hidden_ordinals())
}

#[test]
fn validate_cookie_path_rejects_uri_forms() {
    assert!(validate_cookie_path("file:cookies.txt").is_err());
    assert!(validate_cookie_path("https://example.com/cookies").is_err());
    assert!(validate_cookie_path("/tmp/feedboard/cookies.txt").is_ok());
}

#[test]
fn snapshot_written_by_faker_loads_back_unchanged() -> Result<()> {
    let temp = tempfile::tempdir()?;
    let sources = FeedFaker::new(5).sources(12);
    let path = write_snapshot(temp.path(), &sources)?;

    let loaded = load_snapshot(&path)?;
    assert_eq!(loaded, sources);
    Ok(())
}

#[test]
fn missing_snapshot_names_the_path() {
    let error = load_snapshot(std::path::Path::new("/nonexistent/feedboard/sources.json"))
        .expect_err("missing snapshot should fail");
    assert!(format!("{error:#}").contains("/nonexistent/feedboard/sources.json"));
}

#[test]
fn fetch_filter_survives_a_reload_through_the_cookie_file() -> Result<()> {
    let temp = tempfile::tempdir()?;
    let (_cookie_dir, cookie_path) = temp_cookie_path()?;
    let sources = FeedFaker::new(9).sources(30);
    let snapshot = write_snapshot(temp.path(), &sources)?;

    let mut page = StatusPage::from_sources(&load_snapshot(&snapshot)?, fixture_datetime());
    let mut controller = RowFilterController::new(CookieFile::open(&cookie_path)?);
    controller.on_filter_fetch_status_click(&mut page)?;
    let after_click = hidden(&page)?;
    drop(controller);

    let jar = CookieFile::open(&cookie_path)?;
    assert_eq!(jar.flag(FILTER_FETCH_STATUS_COOKIE)?.as_deref(), Some("true"));
    assert_eq!(jar.flag(FILTER_MISSING_GEO_COOKIE)?.as_deref(), Some("false"));

    let mut reloaded = StatusPage::from_sources(&load_snapshot(&snapshot)?, fixture_datetime());
    RowFilterController::new(jar).apply_filters_on_load(&mut reloaded)?;

    assert_eq!(hidden(&reloaded)?, after_click);
    assert!(reloaded.button(FILTER_FETCH_STATUS_BUTTON_ID)?.is_active());
    assert!(!reloaded.button(FILTER_MISSING_GEO_BUTTON_ID)?.is_active());
    Ok(())
}

#[test]
fn fresh_session_starts_with_every_row_visible() -> Result<()> {
    let temp = tempfile::tempdir()?;
    let (_cookie_dir, cookie_path) = temp_cookie_path()?;
    let sources = FeedFaker::new(13).sources(20);
    let snapshot = write_snapshot(temp.path(), &sources)?;

    let mut page = StatusPage::from_sources(&load_snapshot(&snapshot)?, fixture_datetime());
    RowFilterController::new(CookieFile::open(&cookie_path)?).on_filter_geo_click(&mut page)?;

    let mut reloaded = StatusPage::from_sources(&load_snapshot(&snapshot)?, fixture_datetime());
    RowFilterController::new(CookieFile::open_fresh(&cookie_path)?)
        .apply_filters_on_load(&mut reloaded)?;

    assert!(hidden(&reloaded)?.is_empty());
    Ok(())
}

#[test]
fn fetch_click_on_three_rows_hides_the_healthy_ones_and_persists() -> Result<()> {
    let (_cookie_dir, cookie_path) = temp_cookie_path()?;
    let mut page = three_row_fetch_page();

    let mut controller = RowFilterController::new(CookieFile::open(&cookie_path)?);
    controller.on_filter_fetch_status_click(&mut page)?;
    assert_eq!(hidden(&page)?, vec![1, 3]);

    let raw = std::fs::read_to_string(&cookie_path)?;
    assert!(raw.contains("filterFetchStatusOn=true"));
    assert!(raw.contains("SameSite=Strict"));
    Ok(())
}
