use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::dispatch::ControlHandle;
use crate::ui::theme;

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .title(" muncher ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::BORDER_FOCUSED));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [buttons_area, briefing_area] =
        Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)]).areas(inner);

    let mut spans = button("p", app.poll_action.control());
    spans.push(Span::raw("   "));
    spans.extend(button("b", app.briefing_action.control()));
    frame.render_widget(Paragraph::new(Line::from(spans)), buttons_area);

    let briefing = match &app.briefing_id {
        Some(id) => Line::from(vec![
            Span::styled("Briefing ", Style::default().fg(theme::TEXT_DIM)),
            Span::styled(
                format!("#{id}"),
                Style::default()
                    .fg(theme::TEXT_PRIMARY)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" "),
        ]),
        None => Line::from(Span::styled(
            "No briefing open ",
            Style::default().fg(theme::TEXT_DIM),
        )),
    };
    frame.render_widget(Paragraph::new(briefing).right_aligned(), briefing_area);
}

fn button(key: &'static str, control: &ControlHandle) -> Vec<Span<'static>> {
    let state = control.snapshot();
    let (label_style, key_style) = if state.enabled {
        (
            Style::default()
                .fg(theme::BUTTON_IDLE)
                .add_modifier(Modifier::BOLD),
            Style::default().fg(theme::HIGHLIGHT_FG),
        )
    } else {
        (
            Style::default()
                .fg(theme::BUTTON_BUSY)
                .add_modifier(Modifier::DIM),
            Style::default().fg(theme::TEXT_DIM),
        )
    };

    vec![
        Span::styled(format!("[{key}]"), key_style),
        Span::styled(format!(" {} ", state.label), label_style),
    ]
}
