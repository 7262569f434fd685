// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::FilterState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Browse,
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub mode: AppMode,
    pub filters: FilterState,
    pub status_line: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            mode: AppMode::Browse,
            filters: FilterState::default(),
            status_line: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    OpenHelp,
    CloseHelp,
    SyncFilters(FilterState),
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    ModeChanged(AppMode),
    FiltersChanged(FilterState),
    StatusUpdated(String),
    StatusCleared,
}

impl AppState {
    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        match command {
            AppCommand::OpenHelp => {
                self.mode = AppMode::Help;
                vec![AppEvent::ModeChanged(self.mode)]
            }
            AppCommand::CloseHelp => {
                self.mode = AppMode::Browse;
                vec![AppEvent::ModeChanged(self.mode)]
            }
            AppCommand::SyncFilters(filters) => {
                if filters == self.filters {
                    return Vec::new();
                }
                self.filters = filters;
                let label = match filters.active() {
                    Some(kind) => format!("filter on: {}", kind.label()),
                    None => "filters off".to_owned(),
                };
                vec![AppEvent::FiltersChanged(filters), self.set_status(&label)]
            }
            AppCommand::SetStatus(message) => vec![self.set_status(&message)],
            AppCommand::ClearStatus => {
                self.status_line = None;
                vec![AppEvent::StatusCleared]
            }
        }
    }

    fn set_status(&mut self, message: &str) -> AppEvent {
        self.status_line = Some(message.to_owned());
        AppEvent::StatusUpdated(message.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::{AppCommand, AppEvent, AppMode, AppState};
    use crate::FilterState;

    #[test]
    fn sync_filters_reports_the_active_filter() {
        let mut state = AppState::default();
        let filters = FilterState {
            missing_geo: false,
            fetch_status: true,
        };

        let events = state.dispatch(AppCommand::SyncFilters(filters));
        assert_eq!(state.filters, filters);
        assert_eq!(
            events,
            vec![
                AppEvent::FiltersChanged(filters),
                AppEvent::StatusUpdated("filter on: fetch status".to_owned()),
            ],
        );
    }

    #[test]
    fn sync_filters_is_silent_when_nothing_changed() {
        let mut state = AppState::default();
        let events = state.dispatch(AppCommand::SyncFilters(FilterState::default()));
        assert!(events.is_empty());
        assert_eq!(state.status_line, None);
    }

    #[test]
    fn turning_filters_off_says_so() {
        let mut state = AppState {
            filters: FilterState {
                missing_geo: true,
                fetch_status: false,
            },
            ..AppState::default()
        };
        state.dispatch(AppCommand::SyncFilters(FilterState::default()));
        assert_eq!(state.status_line.as_deref(), Some("filters off"));
    }

    #[test]
    fn help_mode_round_trip_and_status_clear() {
        let mut state = AppState::default();

        state.dispatch(AppCommand::OpenHelp);
        assert_eq!(state.mode, AppMode::Help);
        state.dispatch(AppCommand::CloseHelp);
        assert_eq!(state.mode, AppMode::Browse);

        state.dispatch(AppCommand::SetStatus("reloaded".to_owned()));
        assert_eq!(state.status_line.as_deref(), Some("reloaded"));
        let events = state.dispatch(AppCommand::ClearStatus);
        assert_eq!(events, vec![AppEvent::StatusCleared]);
        assert_eq!(state.status_line, None);
    }
}
