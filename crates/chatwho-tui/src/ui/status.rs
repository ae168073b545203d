//! Status bar
//!
//! Displays connection state, room and the latest status message.

use chatwho_app::{App, ConnectionState};
use chatwho_core::env::Environment;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

/// Render the status bar.
pub fn render<E: Environment>(frame: &mut Frame, app: &App<E>, area: Rect) {
    let connection_status = match app.connection_state() {
        ConnectionState::Disconnected => {
            Span::styled("Disconnected", Style::default().fg(Color::Red))
        },
        ConnectionState::Connecting => {
            Span::styled("Connecting...", Style::default().fg(Color::Yellow))
        },
        ConnectionState::Connected => Span::styled(
            "Connected",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
    };

    let room_info = format!(" | Room: {} | Messages: {}", app.room(), app.transcript().len());
    let status = app.status_message().map_or_else(String::new, |message| format!(" | {message}"));

    let status_line = Line::from(vec![
        Span::raw(" "),
        connection_status,
        Span::styled(room_info, Style::default().fg(Color::Gray)),
        Span::raw(status),
    ]);

    let paragraph =
        Paragraph::new(status_line).style(Style::default().bg(Color::DarkGray).fg(Color::White));

    frame.render_widget(paragraph, area);
}
