// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use feedboard_app::{FilterEvent, FilterKind, FilterState, RowFilterController, StatusPage};
use feedboard_store::{CookieFile, load_snapshot};
use feedboard_testkit::FeedFaker;
use std::path::PathBuf;
use time::OffsetDateTime;
use tracing::info;

pub const DEMO_SEED: u64 = 20_260_219;
pub const DEMO_SOURCES: usize = 48;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageSource {
    Snapshot(PathBuf),
    Demo { seed: u64, count: usize },
}

/// Renders pages from the configured feed source and routes filter clicks
/// through a controller backed by the on-disk cookie jar.
pub struct PageRuntime {
    controller: RowFilterController<CookieFile>,
    source: PageSource,
}

impl PageRuntime {
    pub fn new(jar: CookieFile, source: PageSource) -> Self {
        Self {
            controller: RowFilterController::new(jar),
            source,
        }
    }
}

impl feedboard_tui::AppRuntime for PageRuntime {
    fn load_page(&mut self) -> Result<StatusPage> {
        let sources = match &self.source {
            PageSource::Snapshot(path) => load_snapshot(path)?,
            PageSource::Demo { seed, count } => FeedFaker::new(*seed).sources(*count),
        };
        let page = StatusPage::from_sources(&sources, OffsetDateTime::now_utc());
        info!(
            sources = page.number_of_sources,
            source = ?self.source,
            "status page rendered"
        );
        Ok(page)
    }

    fn toggle_filter(
        &mut self,
        page: &mut StatusPage,
        kind: FilterKind,
    ) -> Result<Vec<FilterEvent>> {
        self.controller.on_filter_click(page, kind)
    }

    fn apply_filters_on_load(&mut self, page: &mut StatusPage) -> Result<Vec<FilterEvent>> {
        self.controller.apply_filters_on_load(page)
    }

    fn filter_state(&mut self) -> Result<FilterState> {
        self.controller.state()
    }
}

#[cfg(test)]
mod tests {
    use super::{PageRuntime, PageSource};
    use anyhow::Result;
    use feedboard_app::{
        FILTER_FETCH_STATUS_COOKIE, FILTER_MISSING_GEO_COOKIE, FilterKind, FlagStore,
        STATUS_TABLE_ID,
    };
    use feedboard_store::CookieFile;
    use feedboard_testkit::{FeedFaker, write_snapshot};
    use feedboard_tui::AppRuntime;

    #[test]
    fn snapshot_page_lists_only_operating_sources() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let sources = FeedFaker::new(21).sources(30);
        let operating = sources.iter().filter(|s| s.is_operating()).count();
        let snapshot = write_snapshot(temp.path(), &sources)?;
        let jar = CookieFile::open(&temp.path().join("cookies.txt"))?;

        let mut runtime = PageRuntime::new(jar, PageSource::Snapshot(snapshot));
        let page = runtime.load_page()?;

        assert_eq!(page.number_of_sources, 30);
        assert_eq!(page.table(STATUS_TABLE_ID)?.data_rows().count(), operating);
        Ok(())
    }

    #[test]
    fn toggles_are_written_to_the_cookie_file() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let cookie_path = temp.path().join("cookies.txt");
        let source = PageSource::Demo {
            seed: 4,
            count: 20,
        };

        let mut runtime = PageRuntime::new(CookieFile::open(&cookie_path)?, source.clone());
        let mut page = runtime.load_page()?;
        runtime.toggle_filter(&mut page, FilterKind::MissingGeo)?;
        assert!(runtime.filter_state()?.missing_geo);

        let jar = CookieFile::open(&cookie_path)?;
        assert_eq!(jar.flag(FILTER_MISSING_GEO_COOKIE)?.as_deref(), Some("true"));
        assert_eq!(jar.flag(FILTER_FETCH_STATUS_COOKIE)?.as_deref(), Some("false"));

        let mut reopened = PageRuntime::new(jar, source);
        let mut reloaded = reopened.load_page()?;
        reopened.apply_filters_on_load(&mut reloaded)?;
        assert_eq!(
            reloaded.table(STATUS_TABLE_ID)?.hidden_ordinals(),
            page.table(STATUS_TABLE_ID)?.hidden_ordinals()
        );
        Ok(())
    }

    #[test]
    fn missing_snapshot_surfaces_the_path() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let jar = CookieFile::open(&temp.path().join("cookies.txt"))?;
        let missing = temp.path().join("absent.json");
        let mut runtime = PageRuntime::new(jar, PageSource::Snapshot(missing.clone()));

        let error = runtime.load_page().expect_err("missing snapshot should fail");
        assert!(error.to_string().contains(&missing.display().to_string()));
        Ok(())
    }
}
