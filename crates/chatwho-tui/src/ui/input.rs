//! Input line
//!
//! Displays the input buffer with cursor.

use chatwho_app::App;
use chatwho_core::env::Environment;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
};

const PROMPT_WIDTH: u16 = 2; // "> "
const BORDER_WIDTH: u16 = 1;
const INPUT_LINE_OFFSET_Y: u16 = 1; // inside top border

/// Render the input line.
pub fn render<E: Environment>(frame: &mut Frame, app: &App<E>, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(format!(" {} ", app.user()));

    let input_text = format!("> {}", app.input_buffer());
    let paragraph =
        Paragraph::new(input_text).style(Style::default().fg(Color::White)).block(block);

    frame.render_widget(paragraph, area);

    let available_width = area.width.saturating_sub(PROMPT_WIDTH + 2 * BORDER_WIDTH + 1);
    let cursor_offset = (app.input_cursor() as u16).min(available_width);

    let cursor_x = area.x + BORDER_WIDTH + PROMPT_WIDTH + cursor_offset;
    let cursor_y = area.y.saturating_add(INPUT_LINE_OFFSET_Y);
    let max_x = area.x.saturating_add(area.width).saturating_sub(BORDER_WIDTH + 1);

    frame.set_cursor_position((cursor_x.min(max_x), cursor_y));
}
