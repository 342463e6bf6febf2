//! Catalog browser view (home screen)
//!
//! Displays the active rail as a selectable list with score and
//! type metadata per entry.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

use crate::app::App;
use crate::models::CatalogEntry;
use crate::ui::Theme;

/// Render the home screen
pub fn render(frame: &mut Frame, area: Rect, app: &mut App) {
    let visible_height = area.height.saturating_sub(2) as usize;
    app.home.list.scroll_into_view(visible_height);

    if app.home.loading.is_loading() {
        render_message(frame, area, app, "Loading...", Theme::loading());
        return;
    }
    if let Some(msg) = app.home.loading.message() {
        let msg = msg.to_string();
        render_message(frame, area, app, &msg, Theme::error());
        return;
    }
    if app.home.entries.is_empty() {
        render_message(frame, area, app, "Nothing here yet", Theme::dimmed());
        return;
    }

    let selected = app.home.list.selected;
    let items: Vec<ListItem> = app
        .home
        .entries
        .iter()
        .enumerate()
        .skip(app.home.list.offset)
        .take(visible_height)
        .map(|(i, entry)| entry_item(entry, i == selected))
        .collect();

    let list = List::new(items)
        .block(rail_block(app))
        .style(Theme::text());

    frame.render_widget(list, area);
}

fn rail_block(app: &App) -> Block<'static> {
    let title = format!(
        " {} ({}/{}) ",
        app.home.rail.title(),
        app.home.list.selected + 1,
        app.home.entries.len().max(1)
    );
    Block::default()
        .borders(Borders::ALL)
        .border_style(Theme::border_focused())
        .border_type(ratatui::widgets::BorderType::Rounded)
        .title(Span::styled(title, Theme::title()))
}

fn render_message(frame: &mut Frame, area: Rect, app: &App, msg: &str, style: Style) {
    let paragraph = Paragraph::new(Span::styled(msg.to_string(), style))
        .block(rail_block(app))
        .alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

/// Build one catalog row: title, kind, year, score
fn entry_item(entry: &CatalogEntry, is_selected: bool) -> ListItem<'static> {
    ListItem::new(entry_line(entry, is_selected))
}

pub(crate) fn entry_line(entry: &CatalogEntry, is_selected: bool) -> Line<'static> {
    let marker = if is_selected { "▸ " } else { "  " };
    let title_style = if is_selected {
        Theme::list_item_selected()
    } else {
        Theme::list_item()
    };

    let mut spans = vec![
        Span::styled(marker.to_string(), Theme::accent()),
        Span::styled(entry.title.clone(), title_style),
    ];

    if let Some(kind) = &entry.kind {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(kind.clone(), Theme::genre()));
    }
    if let Some(year) = entry.year {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(year.to_string(), Theme::year()));
    }
    if let Some(score) = entry.score {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(format!("★ {:.1}", score), Theme::score(score)));
    }

    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(title: &str, score: Option<f32>) -> CatalogEntry {
        CatalogEntry {
            mal_id: 1,
            title: title.into(),
            title_english: None,
            image_url: None,
            large_image_url: None,
            score,
            kind: Some("TV".into()),
            year: Some(2024),
        }
    }

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_entry_line_has_score_badge() {
        let line = entry_line(&entry("Frieren", Some(9.3)), false);
        let text = line_text(&line);
        assert!(text.contains("Frieren"));
        assert!(text.contains("★ 9.3"));
        assert!(text.contains("2024"));
    }

    #[test]
    fn test_entry_line_without_score() {
        let line = entry_line(&entry("Unrated", None), true);
        let text = line_text(&line);
        assert!(text.contains("Unrated"));
        assert!(!text.contains('★'));
        assert!(text.starts_with('▸'));
    }
}
