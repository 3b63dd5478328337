use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::App;
use crate::dispatch::Severity;
use crate::ui::theme;

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let [status_area, hints_area] =
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(area);

    // Left: notification, else server address
    let status_line = if let Some(notif) = app.notifier.visible() {
        let color = match notif.severity {
            Severity::Info => theme::INFO,
            Severity::Error => theme::ERROR_COLOR,
        };
        Line::from(Span::styled(
            format!(" {}", notif.text),
            Style::default().fg(color),
        ))
    } else if app.any_busy() {
        let frame_idx = app.tick_count as usize % SPINNER.len();
        Line::from(Span::styled(
            format!(" {} Working...", SPINNER[frame_idx]),
            Style::default().fg(theme::BUTTON_BUSY),
        ))
    } else {
        Line::from(Span::styled(
            format!(" {}", app.config.server.base_url),
            Style::default().fg(theme::TEXT_DIM),
        ))
    };

    frame.render_widget(Paragraph::new(status_line), status_area);

    // Right: keyboard hints
    let bold = Style::default()
        .fg(theme::HIGHLIGHT_FG)
        .add_modifier(Modifier::BOLD);
    let dim = Style::default().fg(theme::TEXT_DIM);

    let hints = if app.picker.is_some() {
        vec![
            Span::styled("Esc", bold),
            Span::styled(" Cancel  ", dim),
            Span::styled("Enter", bold),
            Span::styled(" Apply", dim),
        ]
    } else {
        vec![
            Span::styled("j/k", bold),
            Span::styled(" Nav  ", dim),
            Span::styled("c", bold),
            Span::styled(" Reclassify  ", dim),
            Span::styled("f", bold),
            Span::styled(" Filter  ", dim),
            Span::styled("?", bold),
            Span::styled(" Help", dim),
        ]
    };

    let bar = Paragraph::new(Line::from(hints)).right_aligned();
    frame.render_widget(bar, hints_area);
}
