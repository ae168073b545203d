//! Chat area
//!
//! Displays the transcript with code spans styled.

use chatwho_app::App;
use chatwho_core::{
    Message, Role,
    env::Environment,
    markup::{self, Span as Markup},
};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
};

const BORDER_SIZE: u16 = 2;
const FENCE_GUTTER: &str = "│ ";

/// Render the chat area.
pub fn render<E: Environment>(frame: &mut Frame, app: &App<E>, area: Rect) {
    let title = if app.scroll() == 0 {
        format!(" #{} ", app.room())
    } else {
        format!(" #{} (-{}) ", app.room(), app.scroll())
    };
    let block = Block::default().borders(Borders::ALL).title(title);

    let messages = app.transcript().as_slice();
    let lines: Vec<Line> = if messages.is_empty() {
        vec![Line::from(Span::styled(
            "No messages yet. Type below and press Enter",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        let shown = messages.len().saturating_sub(app.scroll());
        messages.iter().take(shown).flat_map(|message| message_lines(message, app.user())).collect()
    };

    let visible_height = area.height.saturating_sub(BORDER_SIZE) as usize;
    let skip = lines.len().saturating_sub(visible_height);
    let visible_items: Vec<_> = lines.into_iter().skip(skip).map(ListItem::new).collect();

    let list = List::new(visible_items).block(block);

    frame.render_widget(list, area);
}

/// Lay out one message as terminal lines.
///
/// The sender prefixes the first line. Fenced blocks start on their own
/// line behind a gutter, with the language tag (if any) as a label line.
pub fn message_lines<'a>(message: &'a Message, own_user: &str) -> Vec<Line<'a>> {
    let mut builder = LineBuilder::new(sender_span(message, own_user));

    for span in markup::tokenize(&message.content) {
        match span {
            Markup::Plain(text) => builder.text(text, Style::default()),
            Markup::InlineCode(code) => builder.text(code, inline_code_style()),
            Markup::FencedCode { language, code } => builder.fence(language, code),
        }
    }

    builder.finish()
}

fn sender_span<'a>(message: &'a Message, own_user: &str) -> Span<'a> {
    let color = match message.role {
        Role::Assistant => Color::Magenta,
        Role::User if message.user == own_user => Color::Cyan,
        Role::User => Color::Green,
    };
    Span::styled(
        format!("<{}>", message.user),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )
}

fn inline_code_style() -> Style {
    Style::default().fg(Color::Yellow)
}

fn gutter_span() -> Span<'static> {
    Span::styled(FENCE_GUTTER, Style::default().fg(Color::DarkGray))
}

struct LineBuilder<'a> {
    lines: Vec<Line<'a>>,
    current: Vec<Span<'a>>,
    after_fence: bool,
}

impl<'a> LineBuilder<'a> {
    fn new(sender: Span<'a>) -> Self {
        Self { lines: Vec::new(), current: vec![sender, Span::raw(" ")], after_fence: false }
    }

    fn break_line(&mut self) {
        self.lines.push(Line::from(std::mem::take(&mut self.current)));
    }

    fn text(&mut self, text: &'a str, style: Style) {
        // The newline closing a fence belongs to the fence.
        let text = if self.after_fence {
            text.strip_prefix("\r\n").or_else(|| text.strip_prefix('\n')).unwrap_or(text)
        } else {
            text
        };
        self.after_fence = false;

        for (i, segment) in text.split('\n').enumerate() {
            if i > 0 {
                self.break_line();
            }
            let segment = segment.strip_suffix('\r').unwrap_or(segment);
            if !segment.is_empty() {
                self.current.push(Span::styled(segment, style));
            }
        }
    }

    fn fence(&mut self, language: Option<&'a str>, code: &'a str) {
        if !self.current.is_empty() {
            self.break_line();
        }

        if let Some(language) = language {
            self.lines.push(Line::from(vec![
                gutter_span(),
                Span::styled(
                    language,
                    Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
                ),
            ]));
        }

        let code_style = Style::default().fg(Color::LightYellow);
        let before = self.lines.len();
        for line in code.lines() {
            self.lines.push(Line::from(vec![gutter_span(), Span::styled(line, code_style)]));
        }
        if self.lines.len() == before && language.is_none() {
            self.lines.push(Line::from(gutter_span()));
        }

        self.after_fence = true;
    }

    fn finish(mut self) -> Vec<Line<'a>> {
        if !self.current.is_empty() || self.lines.is_empty() {
            self.break_line();
        }
        self.lines
    }
}
