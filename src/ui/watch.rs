//! Watch view: episode list plus stream resolution status
//!
//! Shows the filtered episode list for the active audio variant, the
//! active mirror server, and the resolved source for playback.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

use crate::app::{App, WatchState};
use crate::models::StreamEpisode;
use crate::ui::Theme;

/// Render the watch screen
pub fn render(frame: &mut Frame, area: Rect, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(4)])
        .split(area);

    render_episode_list(frame, chunks[0], &mut app.watch);
    render_source_panel(frame, chunks[1], &app.watch);
}

fn render_episode_list(frame: &mut Frame, area: Rect, watch: &mut WatchState) {
    let visible_height = area.height.saturating_sub(2) as usize;
    watch.list.scroll_into_view(visible_height);

    let title = format!(
        " {} — {} [{}] ",
        watch.title, watch.variant, watch.server
    );
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Theme::border_focused())
        .border_type(ratatui::widgets::BorderType::Rounded)
        .title(Span::styled(title, Theme::title()));

    if watch.loading.is_loading() {
        let msg = watch
            .loading
            .message()
            .unwrap_or("Loading...")
            .to_string();
        let paragraph = Paragraph::new(Span::styled(msg, Theme::loading()))
            .block(block)
            .alignment(Alignment::Center);
        frame.render_widget(paragraph, area);
        return;
    }

    let episodes = watch.episodes();
    if episodes.is_empty() {
        let paragraph = Paragraph::new(Span::styled(
            "No playable episodes for this title",
            Theme::error(),
        ))
        .block(block)
        .alignment(Alignment::Center);
        frame.render_widget(paragraph, area);
        return;
    }

    let selected = watch.list.selected;
    let items: Vec<ListItem> = episodes
        .iter()
        .enumerate()
        .skip(watch.list.offset)
        .take(visible_height)
        .map(|(i, ep)| ListItem::new(episode_line(ep, i == selected)))
        .collect();

    let list = List::new(items).block(block).style(Theme::text());
    frame.render_widget(list, area);
}

pub(crate) fn episode_line(episode: &StreamEpisode, is_selected: bool) -> Line<'static> {
    let marker = if is_selected { "▸ " } else { "  " };
    let style = if is_selected {
        Theme::list_item_selected()
    } else {
        Theme::list_item()
    };

    let label = match &episode.title {
        Some(t) => format!("E{:02}  {}", episode.number, t),
        None => format!("E{:02}", episode.number),
    };

    let mut spans = vec![
        Span::styled(marker.to_string(), Theme::accent()),
        Span::styled(label, style),
    ];
    if episode.is_dub {
        spans.push(Span::raw("  "));
        spans.push(Span::styled("DUB".to_string(), Theme::dub_badge()));
    }
    Line::from(spans)
}

fn render_source_panel(frame: &mut Frame, area: Rect, watch: &WatchState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Theme::border())
        .title(Span::styled(" Stream ", Theme::title()));

    let lines = match &watch.resolved {
        Some(resolved) => match &resolved.source {
            Some(source) => {
                let mut badge_spans = vec![Span::styled(source.url.clone(), Theme::text())];
                if source.is_adaptive() {
                    badge_spans.push(Span::raw("  "));
                    badge_spans.push(Span::styled("HLS".to_string(), Theme::adaptive_badge()));
                }
                if let Some(q) = &source.quality {
                    badge_spans.push(Span::raw("  "));
                    badge_spans.push(Span::styled(q.clone(), Theme::dimmed()));
                }
                vec![
                    Line::from(badge_spans),
                    Line::from(Span::styled(
                        format!("{} subtitle track(s)", resolved.subtitles.len()),
                        Theme::dimmed(),
                    )),
                ]
            }
            None => vec![Line::from(Span::styled(
                "No playable source on this server (m to switch)",
                Theme::error(),
            ))],
        },
        None => vec![Line::from(Span::styled(
            "Press Enter to resolve the selected episode",
            Theme::dimmed(),
        ))],
    };

    let paragraph = Paragraph::new(lines).block(block);
    frame.render_widget(paragraph, area);
}
