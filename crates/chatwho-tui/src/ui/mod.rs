//! UI rendering
//!
//! Rendering functions that convert App state into terminal output using
//! ratatui widgets. All functions are pure (no I/O).

mod chat;
mod input;
mod status;

use chatwho_app::App;
use chatwho_core::env::Environment;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
};

pub use self::chat::message_lines;

/// Render the entire UI.
pub fn render<E: Environment>(frame: &mut Frame, app: &App<E>) {
    const CHAT_AREA_MIN_HEIGHT: u16 = 3;
    const INPUT_HEIGHT: u16 = 3;
    const STATUS_HEIGHT: u16 = 1;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(CHAT_AREA_MIN_HEIGHT),
            Constraint::Length(INPUT_HEIGHT),
            Constraint::Length(STATUS_HEIGHT),
        ])
        .split(frame.area());

    let [chat_area, input_area, status_area] = chunks.as_ref() else {
        return;
    };

    chat::render(frame, app, *chat_area);
    input::render(frame, app, *input_area);
    status::render(frame, app, *status_area);
}
