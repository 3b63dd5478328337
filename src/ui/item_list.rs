use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::app::App;
use crate::ui::theme;

pub fn render(frame: &mut Frame, area: Rect, app: &mut App) {
    let mut title = format!(" Items ({}) ", app.items.len());
    if app.skipped > 0 {
        title.push_str(&format!("+{} skipped ", app.skipped));
    }
    if let Some(ref filter) = app.filter {
        let label = app
            .category(filter)
            .map(|c| c.label.clone())
            .unwrap_or_else(|| filter.clone());
        title.push_str(&format!("[{label}] "));
    }
    if app.loading {
        title.push_str("loading... ");
    }

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::BORDER_FOCUSED));

    if app.items.is_empty() {
        let msg = match (&app.briefing_id, app.loading) {
            (None, _) => "No briefing open. Press 'b' to generate one.",
            (Some(_), true) => "Loading...",
            (Some(_), false) => "No items in this briefing",
        };
        let text = Line::from(msg).style(Style::default().fg(theme::TEXT_DIM));
        let paragraph = Paragraph::new(text).block(block).centered();
        frame.render_widget(paragraph, area);
        return;
    }

    let rows: Vec<ListItem> = app
        .items
        .iter()
        .map(|item| {
            let (badge, badge_color) = match item.category.as_deref() {
                Some(key) => match app.category(key) {
                    Some(category) => (category.label.clone(), theme::category_color(category)),
                    None => (key.to_string(), theme::TEXT_DIM),
                },
                None => ("uncategorized".to_string(), theme::TEXT_DIM),
            };
            let marker = if app.is_item_busy(&item.id) {
                Span::styled("… ", Style::default().fg(theme::BUTTON_BUSY))
            } else {
                Span::raw("  ")
            };

            ListItem::new(Line::from(vec![
                marker,
                Span::styled(
                    format!("{badge:<22}"),
                    Style::default().fg(badge_color).add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("{:<18}", item.author),
                    Style::default().fg(theme::TEXT_DIM),
                ),
                Span::styled(
                    item.headline().to_string(),
                    Style::default().fg(theme::TEXT_PRIMARY),
                ),
            ]))
        })
        .collect();

    let list = List::new(rows)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(theme::HIGHLIGHT_BG)
                .fg(theme::HIGHLIGHT_FG),
        )
        .highlight_symbol("▶ ");

    frame.render_stateful_widget(list, area, &mut app.item_list_state);
}
