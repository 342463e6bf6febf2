//! Terminal UI components
//!
//! Built with ratatui. Keyboard-first navigation throughout.

pub mod browser;
pub mod detail;
pub mod search;
pub mod theme;
pub mod watch;

pub use theme::Theme;

use ratatui::{
    prelude::*,
    widgets::{Block, Paragraph},
};

use crate::app::{App, AppState};

/// Render the whole frame for the current app state
pub fn render(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(frame.area());

    match app.state {
        AppState::Home => browser::render(frame, chunks[0], app),
        AppState::Search => search::render(frame, chunks[0], app),
        AppState::Detail => detail::render(frame, chunks[0], app),
        AppState::Watch => watch::render(frame, chunks[0], app),
    }

    render_status_bar(frame, chunks[1], app);
}

/// Bottom status bar: keybinds on the left, errors on the right
fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let hints = match app.state {
        AppState::Home => "j/k move  Tab rail  Enter open  / search  q quit",
        AppState::Search => "j/k move  Enter open  / edit  Esc back  q quit",
        AppState::Detail => "h/l recs  w watch  Esc back  q quit",
        AppState::Watch => "j/k move  d sub/dub  m server  Enter play  Esc back",
    };

    let line = if let Some(err) = &app.error {
        Line::from(vec![
            Span::styled(hints, Theme::keybind_desc()),
            Span::raw("  "),
            Span::styled(err.clone(), Theme::error()),
        ])
    } else {
        Line::from(Span::styled(hints, Theme::keybind_desc()))
    };

    let bar = Paragraph::new(line).block(Block::default().style(Theme::status_bar()));
    frame.render_widget(bar, area);
}
