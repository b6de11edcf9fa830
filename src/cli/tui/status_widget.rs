// Status Widget - single status line at the bottom of the TUI
//
// Shows, in priority order: the blocking operation in progress, the outcome
// of the last action, or the latency of the last response.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};
use std::time::Duration;

use crate::cli::commands::{Notice, NoticeLevel};

pub struct StatusWidget<'a> {
    busy: Option<&'a str>,
    notice: Option<&'a Notice>,
    last_latency: Option<Duration>,
    model: &'a str,
}

impl<'a> StatusWidget<'a> {
    pub fn new(
        busy: Option<&'a str>,
        notice: Option<&'a Notice>,
        last_latency: Option<Duration>,
        model: &'a str,
    ) -> Self {
        Self {
            busy,
            notice,
            last_latency,
            model,
        }
    }

    fn notice_style(level: NoticeLevel) -> Style {
        match level {
            NoticeLevel::Info => Style::default().fg(Color::Gray),
            NoticeLevel::Success => Style::default().fg(Color::Green),
            NoticeLevel::Warning => Style::default().fg(Color::Yellow),
            NoticeLevel::Error => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        }
    }

    fn line(&self) -> Line<'a> {
        if let Some(busy) = self.busy {
            return Line::from(Span::styled(
                format!(" ⏳ {busy}"),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ));
        }

        if let Some(notice) = self.notice {
            // Multi-line notices (help, history) are shown in the transcript pane
            let first = notice.text.lines().next().unwrap_or_default().to_string();
            return Line::from(Span::styled(
                format!(" {first}"),
                Self::notice_style(notice.level),
            ));
        }

        let text = match self.last_latency {
            Some(latency) => format!(
                " Last response: {:.2}s | Model: {}",
                latency.as_secs_f64(),
                self.model
            ),
            None => format!(" Model: {} | Type /help for commands", self.model),
        };
        Line::from(Span::styled(text, Style::default().fg(Color::DarkGray)))
    }
}

impl Widget for StatusWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Paragraph::new(self.line()).render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(widget: StatusWidget<'_>) -> String {
        let area = Rect::new(0, 0, 60, 1);
        let mut buf = Buffer::empty(area);
        widget.render(area, &mut buf);
        buf.content().iter().map(|cell| cell.symbol()).collect::<String>()
    }

    #[test]
    fn test_busy_takes_priority() {
        let notice = Notice::success("done");
        let text = rendered(StatusWidget::new(
            Some("Analyzing with BitFit..."),
            Some(&notice),
            None,
            "BitFit",
        ));
        assert!(text.contains("Analyzing with BitFit"));
        assert!(!text.contains("done"));
    }

    #[test]
    fn test_notice_first_line_only() {
        let notice = Notice::info("Available commands:\n  /help");
        let text = rendered(StatusWidget::new(None, Some(&notice), None, "LoRA"));
        assert!(text.contains("Available commands:"));
        assert!(!text.contains("/help"));
    }

    #[test]
    fn test_idle_shows_latency() {
        let text = rendered(StatusWidget::new(
            None,
            None,
            Some(Duration::from_millis(2500)),
            "QLoRA",
        ));
        assert!(text.contains("2.50s"));
        assert!(text.contains("QLoRA"));
    }
}
