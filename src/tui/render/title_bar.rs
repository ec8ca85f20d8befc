use chrono::Local;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::App;
use crate::util::date;
use crate::util::unicode::{display_width, pad_right};

/// `tasknc v<version>  (visible/total)` on the left, today's date on the right
pub fn title_text(visible: usize, total: usize, today: &str, width: usize) -> String {
    let left = format!(
        "tasknc v{}  ({}/{})",
        env!("CARGO_PKG_VERSION"),
        visible,
        total
    );
    let date_width = display_width(today);
    if display_width(&left) + date_width + 1 > width {
        return pad_right(&left, width);
    }
    let mut line = pad_right(&left, width - date_width);
    line.push_str(today);
    line
}

pub fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let today = date::today(&Local::now());
    let text = title_text(
        app.session.visible_count(),
        app.session.total_count(),
        &today,
        area.width as usize,
    );
    let line = Line::from(Span::styled(text, app.theme.title()));
    frame.render_widget(Paragraph::new(line).style(app.theme.title()), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn date_is_right_aligned() {
        let text = title_text(3, 10, "Jun 01", 40);
        assert_eq!(display_width(&text), 40);
        assert!(text.ends_with("Jun 01"));
        assert!(text.contains("(3/10)"));
    }

    #[test]
    fn narrow_terminal_drops_date() {
        let text = title_text(3, 10, "Jun 01", 20);
        assert_eq!(display_width(&text), 20);
        assert!(!text.contains("Jun"));
    }
}
