use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::{App, InputKind, Mode};

fn prompt_prefix(kind: InputKind) -> &'static str {
    match kind {
        InputKind::Search => "/",
        InputKind::Filter(_) => "filter: ",
        InputKind::Command => ":",
    }
}

/// Render the status row (bottom of screen)
pub fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    let line = match app.mode {
        Mode::Input(kind) => Line::from(vec![
            Span::raw(format!("{}{}", prompt_prefix(kind), app.input)),
            Span::raw("\u{258C}"), // ▌ cursor
        ]),
        _ => match &app.status {
            Some(status) => Line::from(Span::styled(
                status.text.clone(),
                app.theme.message(status.is_error),
            )),
            None => Line::default(),
        },
    };
    frame.render_widget(Paragraph::new(line), area);
}
