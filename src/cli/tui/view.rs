// Frame layout and the read-only panes (models, transcript, feedback)

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use super::input_widget::render_input_widget;
use super::status_widget::StatusWidget;
use super::TuiApp;
use crate::cli::commands::NoticeLevel;
use crate::config::constants::APP_TITLE;
use crate::session::Speaker;

const KEY_HELP: &[(&str, &str)] = &[
    ("Enter", "ask"),
    ("Alt-Enter", "newline"),
    ("F2", "next model"),
    ("Ctrl-G", "accurate"),
    ("Ctrl-B", "inaccurate"),
    ("Ctrl-R", "correction"),
    ("Ctrl-L", "clear chat"),
    ("Ctrl-S", "save"),
    ("PgUp/Dn", "scroll"),
    ("Esc", "quit"),
];

pub fn draw(f: &mut Frame, app: &TuiApp) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title
            Constraint::Min(8),    // Body
            Constraint::Length(5), // Input
            Constraint::Length(1), // Status
        ])
        .split(f.area());

    let title = Paragraph::new(format!("🏥 {APP_TITLE}"))
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center);
    f.render_widget(title, rows[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(24), Constraint::Min(20)])
        .split(rows[1]);

    render_sidebar(f, app, body[0]);

    let main = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(4), Constraint::Length(8)])
        .split(body[1]);

    render_transcript(f, app, main[0]);
    render_feedback(f, app, main[1]);

    render_input_widget(f, &app.input, rows[2], app.session.selected_model());

    f.render_widget(
        StatusWidget::new(
            app.busy.as_deref(),
            app.notice.as_ref(),
            app.session.last_latency(),
            app.session.selected_model(),
        ),
        rows[3],
    );
}

fn render_sidebar(f: &mut Frame, app: &TuiApp, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(app.assistant.registry().len() as u16 + 2),
            Constraint::Min(0),
        ])
        .split(area);

    let selected = app.session.selected_model();
    let items: Vec<ListItem> = app
        .assistant
        .registry()
        .labels()
        .map(|label| {
            let is_selected = label == selected;
            let marker = if is_selected { "● " } else { "○ " };
            let loaded = if app.assistant.selector().is_loaded(label) { " ✓" } else { "" };
            let style = if is_selected {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(Line::from(Span::styled(format!("{marker}{label}{loaded}"), style)))
        })
        .collect();

    let models = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Model Selection "),
    );
    f.render_widget(models, chunks[0]);

    let help: Vec<Line> = KEY_HELP
        .iter()
        .map(|(key, action)| {
            Line::from(vec![
                Span::styled(format!("{key:>9} "), Style::default().fg(Color::Cyan)),
                Span::styled(*action, Style::default().fg(Color::DarkGray)),
            ])
        })
        .collect();
    f.render_widget(
        Paragraph::new(help).block(Block::default().borders(Borders::ALL).title(" Keys ")),
        chunks[1],
    );
}

/// Transcript lines, most recent first
pub(super) fn transcript_lines(app: &TuiApp) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    // Multi-line command output (help, model list, history) is shown on top
    if let Some(notice) = app.notice.as_ref() {
        if notice.level == NoticeLevel::Info && notice.text.contains('\n') {
            lines.extend(
                notice
                    .text
                    .lines()
                    .map(|l| Line::styled(l.to_string(), Style::default().fg(Color::Gray))),
            );
            lines.push(Line::default());
        }
    }

    for entry in app.session.transcript().iter_recent_first() {
        let (label, style) = match entry.speaker {
            Speaker::User => (
                "🧑‍⚕️ You: ",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Speaker::Assistant => (
                "🤖 ",
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ),
        };

        let mut text_lines = entry.text.lines();
        let first = text_lines.next().unwrap_or_default().to_string();
        lines.push(Line::from(vec![Span::styled(label, style), Span::raw(first)]));
        lines.extend(text_lines.map(|l| Line::raw(format!("   {l}"))));
        lines.push(Line::default());
    }

    lines
}

fn render_transcript(f: &mut Frame, app: &TuiApp, area: Rect) {
    let lines = transcript_lines(app);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Conversation History ");

    let paragraph = if lines.is_empty() {
        Paragraph::new(
            "This tool helps clinicians quickly access expert guidelines on pediatric \
             hypertension.\nEnter a clinical question, and receive expert-aligned responses.",
        )
        .style(Style::default().fg(Color::DarkGray))
    } else {
        Paragraph::new(lines).scroll((app.scroll, 0))
    };

    f.render_widget(paragraph.block(block).wrap(Wrap { trim: false }), area);
}

fn render_feedback(f: &mut Frame, app: &TuiApp, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Provide Feedback on the Response ");

    let Some(exchange) = app.session.last_exchange() else {
        f.render_widget(
            Paragraph::new("Ask a question to give feedback on the response.")
                .style(Style::default().fg(Color::DarkGray))
                .block(block),
            area,
        );
        return;
    };

    let bold = Style::default().add_modifier(Modifier::BOLD);
    let verdict = exchange
        .feedback
        .map(|v| v.to_string())
        .unwrap_or_else(|| "–".to_string());

    let mut lines = vec![
        Line::from(vec![Span::styled("Question: ", bold), Span::raw(exchange.question.clone())]),
        Line::from(vec![
            Span::styled("Model Response: ", bold),
            Span::raw(exchange.response.clone()),
        ]),
        Line::from(vec![
            Span::styled("Feedback: ", bold),
            Span::raw(verdict),
            Span::styled(
                format!("   ({} recorded this session)", app.session.feedback_log().len()),
                Style::default().fg(Color::DarkGray),
            ),
        ]),
    ];
    if let Some(correction) = &exchange.corrected_response {
        lines.push(Line::from(vec![
            Span::styled("Correction: ", bold),
            Span::raw(correction.clone()),
        ]));
    }

    f.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        area,
    );
}
