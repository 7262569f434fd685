// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use feedboard_app::{
    AppCommand, AppMode, AppState, Button, FilterEvent, FilterKind, FilterState, STATUS_TABLE_ID,
    StatusPage, TableRow, format_timestamp,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use tracing::warn;

const STATUS_CLEAR_AFTER: Duration = Duration::from_secs(4);

/// Everything the TUI needs from the outside world: a freshly rendered
/// page and the filter controller's click and load handlers.
pub trait AppRuntime {
    fn load_page(&mut self) -> Result<StatusPage>;
    fn toggle_filter(
        &mut self,
        page: &mut StatusPage,
        kind: FilterKind,
    ) -> Result<Vec<FilterEvent>>;
    fn apply_filters_on_load(&mut self, page: &mut StatusPage) -> Result<Vec<FilterEvent>>;
    fn filter_state(&mut self) -> Result<FilterState>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewOptions {
    pub show_generated_at: bool,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            show_generated_at: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
}

#[derive(Debug, Clone, PartialEq, Default)]
struct ViewData {
    options: ViewOptions,
    page: Option<StatusPage>,
    load_error: Option<String>,
    /// Index into the visible data rows.
    selected_row: usize,
    status_token: u64,
}

pub fn run_app<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    options: ViewOptions,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData {
        options,
        ..ViewData::default()
    };
    let (internal_tx, internal_rx) = mpsc::channel();

    refresh_view_data(state, runtime, &mut view_data);

    let mut result = Ok(());
    loop {
        process_internal_events(state, &view_data, &internal_rx);

        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = event::poll(Duration::from_millis(120)).context("poll event")?;
        if has_event {
            match event::read().context("read event")? {
                Event::Key(key) => {
                    if handle_key_event(state, runtime, &mut view_data, &internal_tx, key) {
                        break;
                    }
                }
                Event::Resize(_, _) => {}
                _ => {}
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn process_internal_events(
    state: &mut AppState,
    view_data: &ViewData,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(AppCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_CLEAR_AFTER);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    state.dispatch(AppCommand::SetStatus(message.into()));
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

/// Returns true when the app should quit.
fn handle_key_event<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('q') | KeyCode::Char('c'))
    {
        return true;
    }

    if state.mode == AppMode::Help {
        if key.code == KeyCode::Esc || key.code == KeyCode::Char('?') {
            state.dispatch(AppCommand::CloseHelp);
        }
        return false;
    }

    match (key.code, key.modifiers) {
        (KeyCode::Char('q'), KeyModifiers::NONE) => return true,
        (KeyCode::Char('?'), _) => {
            state.dispatch(AppCommand::OpenHelp);
        }
        (KeyCode::Char('g'), KeyModifiers::NONE) => {
            toggle_filter(state, runtime, view_data, internal_tx, FilterKind::MissingGeo);
        }
        (KeyCode::Char('f'), KeyModifiers::NONE) => {
            toggle_filter(state, runtime, view_data, internal_tx, FilterKind::FetchStatus);
        }
        (KeyCode::Char('r'), KeyModifiers::NONE) => {
            refresh_view_data(state, runtime, view_data);
            let message = match &view_data.page {
                Some(page) => format!("reloaded {} sources", page.number_of_sources),
                None => "reload failed".to_owned(),
            };
            emit_status(state, view_data, internal_tx, message);
        }
        (KeyCode::Char('j'), KeyModifiers::NONE) | (KeyCode::Down, _) => move_selection(view_data, 1),
        (KeyCode::Char('k'), KeyModifiers::NONE) | (KeyCode::Up, _) => move_selection(view_data, -1),
        (KeyCode::Home, _) => view_data.selected_row = 0,
        (KeyCode::End, _) => {
            view_data.selected_row = visible_row_count(view_data).saturating_sub(1);
        }
        _ => {}
    }
    false
}

fn toggle_filter<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    kind: FilterKind,
) {
    let Some(page) = view_data.page.as_mut() else {
        emit_status(state, view_data, internal_tx, "no page loaded; press r to reload");
        return;
    };

    let events = match runtime.toggle_filter(page, kind) {
        Ok(events) => events,
        Err(error) => {
            warn!(filter = kind.label(), error = %format!("{error:#}"), "filter toggle failed");
            emit_status(
                state,
                view_data,
                internal_tx,
                format!("{} filter failed: {error}", kind.label()),
            );
            return;
        }
    };

    sync_filter_state(state, runtime);
    clamp_selection(view_data);

    let message = events
        .iter()
        .find_map(|event| match event {
            FilterEvent::RowsFiltered { kind, outcome } => Some(if state.filters.is_active(*kind) {
                format!("filter on: {} ({} rows hidden)", kind.label(), outcome.hidden)
            } else {
                "filters off".to_owned()
            }),
            _ => None,
        })
        .unwrap_or_else(|| "filters off".to_owned());
    emit_status(state, view_data, internal_tx, message);
}

fn sync_filter_state<R: AppRuntime>(state: &mut AppState, runtime: &mut R) {
    match runtime.filter_state() {
        Ok(filters) => {
            state.dispatch(AppCommand::SyncFilters(filters));
        }
        Err(error) => {
            warn!(error = %format!("{error:#}"), "read filter flags");
        }
    }
}

/// Renders a fresh page and re-runs the persisted filters on it.
fn refresh_view_data<R: AppRuntime>(state: &mut AppState, runtime: &mut R, view_data: &mut ViewData) {
    let loaded = runtime.load_page().and_then(|mut page| {
        runtime.apply_filters_on_load(&mut page)?;
        Ok(page)
    });
    match loaded {
        Ok(page) => {
            view_data.page = Some(page);
            view_data.load_error = None;
        }
        Err(error) => {
            warn!(error = %format!("{error:#}"), "load status page");
            view_data.page = None;
            view_data.load_error = Some(format!("load failed: {error:#}"));
        }
    }
    sync_filter_state(state, runtime);
    clamp_selection(view_data);
}

fn visible_rows(page: &StatusPage) -> Vec<&TableRow> {
    page.table(STATUS_TABLE_ID)
        .map(|table| table.visible_data_rows().collect())
        .unwrap_or_default()
}

fn visible_row_count(view_data: &ViewData) -> usize {
    view_data.page.as_ref().map_or(0, |page| visible_rows(page).len())
}

fn move_selection(view_data: &mut ViewData, delta: isize) {
    let count = visible_row_count(view_data);
    if count == 0 {
        view_data.selected_row = 0;
        return;
    }
    let next = view_data.selected_row.saturating_add_signed(delta);
    view_data.selected_row = next.min(count - 1);
}

fn clamp_selection(view_data: &mut ViewData) {
    let count = visible_row_count(view_data);
    view_data.selected_row = view_data.selected_row.min(count.saturating_sub(1));
}

fn header_text(page: &StatusPage, options: ViewOptions) -> String {
    let mut text = format!("{} sources", page.number_of_sources);
    if options.show_generated_at {
        text.push_str(&format!(" | generated {}", format_timestamp(page.generated_at)));
    }
    text
}

fn button_span(button: &Button, key: char) -> Span<'static> {
    let label = format!(" [{key}] {} ", button.label);
    if button.is_active() {
        Span::styled(
            label,
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled(label, Style::default().fg(Color::Gray))
    }
}

fn header_line(page: &StatusPage, options: ViewOptions) -> Line<'static> {
    let mut spans = vec![Span::raw(header_text(page, options)), Span::raw("  ")];
    for (kind, key) in [(FilterKind::MissingGeo, 'g'), (FilterKind::FetchStatus, 'f')] {
        if let Ok(button) = page.button(kind.button_id()) {
            spans.push(button_span(button, key));
            spans.push(Span::raw(" "));
        }
    }
    Line::from(spans)
}

fn status_text(state: &AppState) -> String {
    if let Some(message) = &state.status_line {
        return message.clone();
    }
    "g missing geocode | f fetch status | j/k move | r reload | ? help | q quit".to_owned()
}

fn help_overlay_text() -> &'static str {
    "filters: g missing geocode | f fetch status (one at a time; press again to clear)\n\
nav: j/k or up/down move | home/end first/last\n\
page: r reload (persisted filters are reapplied)\n\
global: ? or esc close help | q ctrl+q ctrl+c quit"
}

fn render(frame: &mut ratatui::Frame<'_>, state: &AppState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let header = match &view_data.page {
        Some(page) => Paragraph::new(header_line(page, view_data.options)),
        None => Paragraph::new(view_data.load_error.clone().unwrap_or_default()),
    };
    frame.render_widget(
        header.block(Block::default().title("feedboard").borders(Borders::ALL)),
        layout[0],
    );

    render_table(frame, layout[1], view_data);

    let status_widget = Paragraph::new(status_text(state))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status_widget, layout[2]);

    if state.mode == AppMode::Help {
        let area = centered_rect(70, 40, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn render_table(frame: &mut ratatui::Frame<'_>, area: Rect, view_data: &ViewData) {
    let block = Block::default().borders(Borders::ALL).title("feed sources");
    let Some(page) = &view_data.page else {
        frame.render_widget(Paragraph::new(String::new()).block(block), area);
        return;
    };
    let table = match page.table(STATUS_TABLE_ID) {
        Ok(table) => table,
        Err(error) => {
            frame.render_widget(Paragraph::new(error.to_string()).block(block), area);
            return;
        }
    };

    let column_count = table.rows.first().map_or(0, |row| row.cells.len());
    let widths = vec![Constraint::Min(6); column_count.max(1)];

    let header = Row::new(table.rows.first().into_iter().flat_map(|row| {
        row.cells.iter().map(|cell| {
            Cell::from(cell.text.clone()).style(
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )
        })
    }));

    let rows = table
        .visible_data_rows()
        .enumerate()
        .map(|(index, row)| {
            let selected = index == view_data.selected_row;
            let cells = row.cells.iter().map(|cell| {
                let mut style = Style::default();
                if cell.is_failure() {
                    style = style.fg(Color::Red);
                }
                if selected {
                    style = style.bg(Color::DarkGray);
                }
                Cell::from(cell.text.clone()).style(style)
            });
            Row::new(cells)
        })
        .collect::<Vec<_>>();

    let title = format!(
        "feed sources ({} of {} shown)",
        rows.len(),
        table.data_rows().count()
    );
    let widget = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(widget, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
