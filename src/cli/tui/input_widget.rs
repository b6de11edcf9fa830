// Input Widget - Helper to render tui-textarea
//
// Note: This is not a proper Widget implementation due to tui-textarea's API.
// Instead, we provide a helper function to render the textarea.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use tui_textarea::TextArea;

pub const INPUT_PLACEHOLDER: &str =
    "e.g., What are the first-line treatment options for hypertensive emergency in adolescents?";

/// Fresh question box with the standard block and placeholder
pub fn new_textarea() -> TextArea<'static> {
    let mut textarea = TextArea::default();
    textarea.set_block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Enter your clinical question "),
    );
    textarea.set_placeholder_text(INPUT_PLACEHOLDER);
    textarea.set_placeholder_style(Style::default().fg(Color::DarkGray));
    textarea.set_cursor_line_style(Style::default());
    textarea
}

/// Render the textarea with a prompt marker that shows which model will answer
pub fn render_input_widget(frame: &mut Frame, textarea: &TextArea<'_>, area: Rect, model: &str) {
    let width = model.chars().count() as u16 + 3;
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(width), // " BitFit ❯"
            Constraint::Min(1),        // Textarea: rest of line
        ])
        .split(area);

    // Blank first line aligns the marker with the text row inside the border
    let prompt = Paragraph::new(vec![
        Line::default(),
        Line::from(Span::styled(
            format!(" {model}❯"),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
    ]);
    frame.render_widget(prompt, chunks[0]);
    frame.render_widget(textarea, chunks[1]);
}
