pub mod category_picker;
pub mod control_bar;
pub mod item_list;
pub mod status_bar;
pub mod theme;

use ratatui::{
    layout::{Constraint, Layout},
    Frame,
};

use crate::app::App;

pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // Terminal too small check
    if area.width < 60 || area.height < 10 {
        use ratatui::{style::Style, text::Line, widgets::Paragraph};
        let msg = Paragraph::new(Line::from("Terminal too small (min 60x10)"))
            .style(Style::default().fg(theme::ERROR_COLOR))
            .centered();
        frame.render_widget(msg, area);
        return;
    }

    let [controls_area, items_area, status_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .areas(area);

    control_bar::render(frame, controls_area, app);
    item_list::render(frame, items_area, app);
    status_bar::render(frame, status_area, app);

    // Overlays
    if let Some(ref picker) = app.picker {
        let current = app
            .items
            .iter()
            .find(|i| i.id == picker.item_id)
            .and_then(|i| i.category.as_deref());
        category_picker::render(frame, picker, current);
    } else if app.show_help {
        render_help_overlay(frame);
    }
}

fn render_help_overlay(frame: &mut Frame) {
    use ratatui::{
        layout::{Constraint, Flex, Layout},
        style::{Modifier, Style},
        text::{Line, Span},
        widgets::{Block, Borders, Clear, Paragraph},
    };

    let area = frame.area();

    let [modal_area] = Layout::horizontal([Constraint::Percentage(60)])
        .flex(Flex::Center)
        .areas(area);
    let [modal_area] = Layout::vertical([Constraint::Percentage(70)])
        .flex(Flex::Center)
        .areas(modal_area);

    frame.render_widget(Clear, modal_area);

    let bold = Style::default().add_modifier(Modifier::BOLD);
    let dim = Style::default().fg(theme::TEXT_DIM);

    let shortcuts = [
        ("j/k, ↑/↓", "Navigate items"),
        ("p", "Poll feeds now"),
        ("b", "Generate a briefing"),
        ("c, Enter", "Reclassify selected item"),
        ("f", "Cycle category filter"),
        ("r", "Reload items"),
        ("?", "Toggle this help"),
        ("q, Esc", "Quit"),
    ];

    let mut lines = vec![Line::from("")];
    lines.extend(shortcuts.iter().map(|(keys, what)| {
        Line::from(vec![
            Span::styled(format!("  {keys:<12}"), bold),
            Span::styled(*what, dim),
        ])
    }));
    lines.push(Line::from(""));

    let help = Paragraph::new(lines).block(
        Block::default()
            .title(" Keyboard Shortcuts ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::BORDER_FOCUSED)),
    );

    frame.render_widget(help, modal_area);
}
