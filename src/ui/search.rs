//! Search view: query input box plus results list

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

use crate::app::{App, InputMode};
use crate::ui::{browser, Theme};

/// Render the search screen
pub fn render(frame: &mut Frame, area: Rect, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(area);

    render_input(frame, chunks[0], app);
    render_results(frame, chunks[1], app);
}

fn render_input(frame: &mut Frame, area: Rect, app: &App) {
    let editing = app.input_mode == InputMode::Editing;
    let border_style = if editing {
        Theme::border_focused()
    } else {
        Theme::border()
    };

    let mut spans = vec![Span::styled(app.search.query.clone(), Theme::input())];
    if editing {
        // Block cursor at the insertion point
        spans = Vec::new();
        let (before, after) = app.search.query.split_at(app.search.cursor);
        spans.push(Span::styled(before.to_string(), Theme::input()));
        let (cursor_char, rest) = match after.chars().next() {
            Some(c) => (c.to_string(), after[c.len_utf8()..].to_string()),
            None => (" ".to_string(), String::new()),
        };
        spans.push(Span::styled(cursor_char, Theme::input_cursor()));
        spans.push(Span::styled(rest, Theme::input()));
    }

    let input = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(Span::styled(" Search ", Theme::title())),
    );
    frame.render_widget(input, area);
}

fn render_results(frame: &mut Frame, area: Rect, app: &mut App) {
    let visible_height = area.height.saturating_sub(2) as usize;
    app.search.list.scroll_into_view(visible_height);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Theme::border())
        .title(Span::styled(
            format!(" Results ({}) ", app.search.results.len()),
            Theme::title(),
        ));

    if app.search.loading.is_loading() {
        let msg = Paragraph::new(Span::styled("Searching...", Theme::loading()))
            .block(block)
            .alignment(Alignment::Center);
        frame.render_widget(msg, area);
        return;
    }

    let selected = app.search.list.selected;
    let items: Vec<ListItem> = app
        .search
        .results
        .iter()
        .enumerate()
        .skip(app.search.list.offset)
        .take(visible_height)
        .map(|(i, entry)| ListItem::new(browser::entry_line(entry, i == selected)))
        .collect();

    let list = List::new(items).block(block).style(Theme::text());
    frame.render_widget(list, area);
}
