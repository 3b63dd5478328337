use ratatui::style::Color;

use crate::api::types::Category;

pub const HIGHLIGHT_BG: Color = Color::Rgb(38, 79, 120);
pub const HIGHLIGHT_FG: Color = Color::White;
pub const ERROR_COLOR: Color = Color::Red;
pub const BORDER_FOCUSED: Color = Color::Cyan;
pub const TEXT_PRIMARY: Color = Color::White;
pub const TEXT_DIM: Color = Color::DarkGray;
pub const INFO: Color = Color::Green;
pub const BUTTON_IDLE: Color = Color::Cyan;
pub const BUTTON_BUSY: Color = Color::Yellow;

/// Parse a `#rrggbb` color from the server settings.
pub fn parse_hex(hex: &str) -> Option<Color> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

pub fn category_color(category: &Category) -> Color {
    category
        .color
        .as_deref()
        .and_then(parse_hex)
        .unwrap_or(TEXT_DIM)
}
