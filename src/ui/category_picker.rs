use ratatui::{
    layout::{Constraint, Flex, Layout},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState},
    Frame,
};

use crate::api::types::Category;
use crate::ui::theme;

const PLACEHOLDER: &str = "-- select a category --";

/// Modal used to pick a new category for one item. Row 0 is the
/// placeholder, which picks nothing.
#[derive(Debug, Clone)]
pub struct CategoryPickerState {
    pub item_id: String,
    pub options: Vec<Category>,
    pub selected: usize,
}

impl CategoryPickerState {
    pub fn new(item_id: String, options: Vec<Category>) -> Self {
        Self {
            item_id,
            options,
            selected: 0,
        }
    }

    pub fn up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn down(&mut self) {
        self.selected = (self.selected + 1).min(self.options.len());
    }

    /// The chosen category key, or `None` while the placeholder is selected.
    pub fn choice(&self) -> Option<&str> {
        self.selected
            .checked_sub(1)
            .and_then(|idx| self.options.get(idx))
            .map(|c| c.key.as_str())
    }
}

pub fn render(frame: &mut Frame, state: &CategoryPickerState, current: Option<&str>) {
    let area = frame.area();
    let height = (state.options.len() as u16 + 3).min(area.height);

    let [modal_area] = Layout::horizontal([Constraint::Percentage(40)])
        .flex(Flex::Center)
        .areas(area);
    let [modal_area] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(modal_area);

    frame.render_widget(Clear, modal_area);

    let dim = Style::default().fg(theme::TEXT_DIM);
    let mut rows = vec![ListItem::new(Line::from(Span::styled(PLACEHOLDER, dim)))];
    rows.extend(state.options.iter().map(|category| {
        let marker = if current == Some(category.key.as_str()) {
            "● "
        } else {
            "  "
        };
        ListItem::new(Line::from(vec![
            Span::styled(marker, Style::default().fg(theme::category_color(category))),
            Span::styled(
                category.label.as_str(),
                Style::default().fg(theme::TEXT_PRIMARY),
            ),
        ]))
    }));

    let list = List::new(rows)
        .block(
            Block::default()
                .title(" Reclassify ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme::BORDER_FOCUSED)),
        )
        .highlight_style(
            Style::default()
                .bg(theme::HIGHLIGHT_BG)
                .fg(theme::HIGHLIGHT_FG)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▶ ");

    let mut list_state = ListState::default().with_selected(Some(state.selected));
    frame.render_stateful_widget(list, modal_area, &mut list_state);
}
