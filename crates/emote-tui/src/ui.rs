use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};
use emote_core::{assistant_avatar, avatar_for, Avatar, ChatMessage, ChatRole, Emotion};
use crate::app::App;

const TITLE: &str = "My AI Chat";
const PLACEHOLDER: &str = "Type a message (Shift+Enter for newline)";
const SEND_BUTTON_WIDTH: u16 = 14;
const MAX_INPUT_LINES: u16 = 5;

/// Wrap text to fit within a given display width.
/// Breaks at spaces where possible and inside words that are wider than a line
/// (text without spaces, such as Japanese, only wraps that way).
fn wrap_text_to_width(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut current_line = String::new();
    let mut current_width = 0;

    for word in text.split_whitespace() {
        let word_width = word.width();

        if !current_line.is_empty() && current_width + 1 + word_width <= width {
            current_line.push(' ');
            current_line.push_str(word);
            current_width += 1 + word_width;
            continue;
        }

        if !current_line.is_empty() {
            lines.push(std::mem::take(&mut current_line));
            current_width = 0;
        }

        for c in word.chars() {
            let char_width = c.width().unwrap_or(0);
            if !current_line.is_empty() && current_width + char_width > width {
                lines.push(std::mem::take(&mut current_line));
                current_width = 0;
            }
            current_line.push(c);
            current_width += char_width;
        }
    }

    if !current_line.is_empty() || lines.is_empty() {
        lines.push(current_line);
    }

    lines
}

fn emotion_color(emotion: Emotion) -> Color {
    match emotion {
        Emotion::Neutral => Color::Green,
        Emotion::Happy => Color::Yellow,
        Emotion::Sad => Color::Blue,
        Emotion::Angry => Color::Red,
        Emotion::Surprised => Color::Magenta,
    }
}

fn avatar_line(avatar: Avatar, color: Color, alignment: Alignment) -> Line<'static> {
    Line::from(vec![
        Span::styled(avatar.face, Style::default().fg(color).add_modifier(Modifier::BOLD)),
        Span::raw(" "),
        Span::styled(avatar.label, Style::default().fg(color)),
    ])
    .alignment(alignment)
}

fn message_lines(message: &ChatMessage, width: usize) -> Vec<Line<'static>> {
    let (alignment, color) = match message.role {
        ChatRole::User => (Alignment::Right, Color::Cyan),
        ChatRole::Assistant => (Alignment::Left, emotion_color(message.effective_emotion())),
    };

    let mut lines = vec![avatar_line(avatar_for(message), color, alignment)];
    for raw_line in message.content.split('\n') {
        for wrapped in wrap_text_to_width(raw_line, width) {
            lines.push(Line::from(wrapped).alignment(alignment));
        }
    }
    lines.push(Line::default());
    lines
}

/// Every line of the chat window, already wrapped to `width`
fn chat_lines(app: &App, width: usize) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = app
        .conversation
        .messages()
        .iter()
        .flat_map(|message| message_lines(message, width))
        .collect();

    if app.is_busy() {
        lines.push(avatar_line(
            assistant_avatar(Emotion::Neutral),
            emotion_color(Emotion::Neutral),
            Alignment::Left,
        ));
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        lines.push(Line::from(Span::styled(
            format!("typing{}", dots),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    lines
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_chat_screen(app, frame, body_area);
    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(format!(" {} ", TITLE), Style::default().fg(Color::Cyan).bold()),
        Span::styled(format!(" {} ", app.endpoint), Style::default().fg(Color::Gray)),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let (mode_text, mode_style) = if app.is_busy() {
        (" SENDING ", Style::default().bg(Color::Yellow).fg(Color::Black))
    } else {
        (" CHAT ", Style::default().bg(Color::Blue).fg(Color::White))
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hints = [
        ("Enter", "send"),
        ("Shift+Enter", "newline"),
        ("PgUp/PgDn", "scroll"),
        ("Ctrl+C", "quit"),
    ];

    let mut spans = vec![Span::styled(mode_text, mode_style), Span::raw(" ")];
    for (key, label) in hints {
        spans.push(Span::styled(format!(" {} ", key), key_style));
        spans.push(Span::styled(format!(" {} ", label), label_style));
        spans.push(Span::raw(" "));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_chat_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    let input_lines = (app.input_line_count() as u16).clamp(1, MAX_INPUT_LINES);
    let [chat_area, input_row] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(input_lines + 2),
    ])
    .areas(area);

    let [input_area, button_area] = Layout::horizontal([
        Constraint::Min(0),
        Constraint::Length(SEND_BUTTON_WIDTH),
    ])
    .areas(input_row);

    // Store areas for mouse hit-testing
    app.chat_area = Some(chat_area);
    app.send_button_area = Some(button_area);

    render_chat(app, frame, chat_area);
    render_input(app, frame, input_area);
    render_send_button(app, frame, button_area);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Chat ");

    if app.conversation.is_empty() && !app.is_busy() {
        let greeting = Paragraph::new(vec![
            Line::default(),
            Line::from("Hello! 👋"),
            Line::from("Let's have a relaxed chat with the AI."),
        ])
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center)
        .block(chat_block);

        frame.render_widget(greeting, area);
        app.chat_scroll = 0;
        app.chat_max_scroll = 0;
        return;
    }

    // Inner size minus borders
    let inner_width = area.width.saturating_sub(2) as usize;
    app.chat_height = area.height.saturating_sub(2);

    let lines = chat_lines(app, inner_width);
    let total_lines = u16::try_from(lines.len()).unwrap_or(u16::MAX);
    app.chat_max_scroll = total_lines.saturating_sub(app.chat_height);
    app.chat_scroll = if app.follow_tail {
        app.chat_max_scroll
    } else {
        app.chat_scroll.min(app.chat_max_scroll)
    };

    let chat = Paragraph::new(Text::from(lines))
        .block(chat_block)
        .scroll((app.chat_scroll, 0));

    frame.render_widget(chat, area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Message ");

    if app.input.is_empty() {
        let placeholder = Paragraph::new(Span::styled(PLACEHOLDER, Style::default().fg(Color::DarkGray)))
            .block(input_block);
        frame.render_widget(placeholder, area);
        frame.set_cursor_position((area.x + 1, area.y + 1));
        return;
    }

    // Scroll both ways so the cursor stays inside the box
    let inner_width = area.width.saturating_sub(2);
    let inner_height = area.height.saturating_sub(2);
    let (cursor_row, cursor_col) = app.cursor_line_col();
    let cursor_x: u16 = app
        .input
        .split('\n')
        .nth(cursor_row)
        .map(|line| line.chars().take(cursor_col).collect::<String>().width())
        .unwrap_or(0)
        .try_into()
        .unwrap_or(u16::MAX);
    let cursor_y = u16::try_from(cursor_row).unwrap_or(u16::MAX);

    let scroll_y = cursor_y.saturating_sub(inner_height.saturating_sub(1));
    let scroll_x = cursor_x.saturating_sub(inner_width.saturating_sub(1));

    // Use cyan text to match the user avatar colour
    let input = Paragraph::new(app.input.as_str())
        .style(Style::default().fg(Color::Cyan))
        .block(input_block)
        .scroll((scroll_y, scroll_x));

    frame.render_widget(input, area);

    frame.set_cursor_position((
        area.x + 1 + cursor_x - scroll_x,
        area.y + 1 + cursor_y - scroll_y,
    ));
}

fn render_send_button(app: &App, frame: &mut Frame, area: Rect) {
    let label = if app.is_busy() { "Sending..." } else { "Send" };
    let (border_color, label_style) = if app.can_submit() {
        (Color::Green, Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
    } else {
        (Color::DarkGray, Style::default().fg(Color::DarkGray))
    };

    let button = Paragraph::new(Span::styled(label, label_style))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border_color)),
        );

    frame.render_widget(button, area);
}
