//! Title detail view
//!
//! Synopsis, metadata line, genre tags, and a recommendation strip.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};

use crate::app::{App, DetailState};
use crate::ui::{browser, Theme};

/// Render the detail screen
pub fn render(frame: &mut Frame, area: Rect, app: &mut App) {
    let Some(detail) = &mut app.detail else {
        let empty = Paragraph::new(Span::styled("No title selected", Theme::dimmed()))
            .block(Block::default().borders(Borders::ALL).border_style(Theme::border()))
            .alignment(Alignment::Center);
        frame.render_widget(empty, area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(5),
            Constraint::Length(8),
        ])
        .split(area);

    render_header(frame, chunks[0], detail);
    render_synopsis(frame, chunks[1], detail);
    render_recommendations(frame, chunks[2], detail);
}

/// Metadata line under the title: kind, episode count, status, season,
/// score, and the memoized dub-availability badge when known
pub(crate) fn header_meta_line(detail: &DetailState) -> Line<'static> {
    let record = &detail.record;
    let entry = &record.entry;

    let mut meta = Vec::new();
    if let Some(kind) = &entry.kind {
        meta.push(Span::styled(kind.clone(), Theme::genre()));
    }
    if let Some(eps) = record.episodes {
        meta.push(Span::raw("  "));
        meta.push(Span::styled(format!("{} eps", eps), Theme::dimmed()));
    }
    if let Some(status) = &record.status {
        meta.push(Span::raw("  "));
        meta.push(Span::styled(status.clone(), Theme::dimmed()));
    }
    if let Some(season) = &record.season {
        meta.push(Span::raw("  "));
        meta.push(Span::styled(season.clone(), Theme::year()));
    }
    if let Some(score) = entry.score {
        meta.push(Span::raw("  "));
        meta.push(Span::styled(format!("★ {:.2}", score), Theme::score(score)));
    }
    if detail.dub_hint == Some(true) {
        meta.push(Span::raw("  "));
        meta.push(Span::styled("DUB".to_string(), Theme::dub_badge()));
    }
    Line::from(meta)
}

fn render_header(frame: &mut Frame, area: Rect, detail: &DetailState) {
    let record = &detail.record;
    let entry = &record.entry;

    let genres = record
        .genres
        .iter()
        .map(|g| g.name.as_str())
        .collect::<Vec<_>>()
        .join(" · ");

    let header = Paragraph::new(vec![
        header_meta_line(detail),
        Line::from(Span::styled(genres, Theme::genre())),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Theme::border_focused())
            .border_type(ratatui::widgets::BorderType::Rounded)
            .title(Span::styled(format!(" {} ", entry.title), Theme::title())),
    );
    frame.render_widget(header, area);
}

fn render_synopsis(frame: &mut Frame, area: Rect, detail: &DetailState) {
    let synopsis = detail
        .record
        .synopsis
        .clone()
        .unwrap_or_else(|| "No synopsis available.".to_string());

    let paragraph = Paragraph::new(synopsis)
        .style(Theme::text())
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Theme::border())
                .title(Span::styled(" Synopsis ", Theme::title())),
        );
    frame.render_widget(paragraph, area);
}

fn render_recommendations(frame: &mut Frame, area: Rect, detail: &mut DetailState) {
    let visible_height = area.height.saturating_sub(2) as usize;
    detail.rec_list.scroll_into_view(visible_height);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Theme::border())
        .title(Span::styled(" You may also like ", Theme::title()));

    if detail.recommendations.is_empty() {
        let empty = Paragraph::new(Span::styled("No recommendations", Theme::dimmed()))
            .block(block)
            .alignment(Alignment::Center);
        frame.render_widget(empty, area);
        return;
    }

    let selected = detail.rec_list.selected;
    let items: Vec<ListItem> = detail
        .recommendations
        .iter()
        .enumerate()
        .skip(detail.rec_list.offset)
        .take(visible_height)
        .map(|(i, entry)| ListItem::new(browser::entry_line(entry, i == selected)))
        .collect();

    let list = List::new(items).block(block).style(Theme::text());
    frame.render_widget(list, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CatalogEntry, DetailRecord};

    fn detail_state(dub_hint: Option<bool>) -> DetailState {
        let record = DetailRecord {
            entry: CatalogEntry {
                mal_id: 20,
                title: "Naruto".into(),
                title_english: Some("Naruto".into()),
                image_url: None,
                large_image_url: None,
                score: Some(7.99),
                kind: Some("TV".into()),
                year: Some(2002),
            },
            synopsis: None,
            episodes: Some(220),
            duration: None,
            trailer_youtube_id: None,
            genres: Vec::new(),
            studios: Vec::new(),
            producers: Vec::new(),
            titles: Vec::new(),
            status: Some("Finished Airing".into()),
            season: None,
            streaming: Vec::new(),
        };
        let mut state = DetailState::new(record);
        state.dub_hint = dub_hint;
        state
    }

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_header_shows_memoized_dub_badge() {
        let text = line_text(&header_meta_line(&detail_state(Some(true))));
        assert!(text.contains("220 eps"));
        assert!(text.contains("DUB"));
    }

    #[test]
    fn test_header_without_hint_has_no_badge() {
        let text = line_text(&header_meta_line(&detail_state(None)));
        assert!(!text.contains("DUB"));

        // A memoized "no dub" is also badge-less
        let text = line_text(&header_meta_line(&detail_state(Some(false))));
        assert!(!text.contains("DUB"));
    }
}
