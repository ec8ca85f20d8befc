use ratatui::style::{Color, Style};

/// Colors for the viewer
#[derive(Debug, Clone)]
pub struct Theme {
    pub title_fg: Color,
    pub title_bg: Color,
    pub project: Color,
    pub description: Color,
    pub date: Color,
    pub selected_fg: Color,
    pub error: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            title_fg: Color::Blue,
            title_bg: Color::Black,
            project: Color::Green,
            description: Color::Cyan,
            date: Color::Yellow,
            selected_fg: Color::Black,
            error: Color::Red,
        }
    }
}

impl Theme {
    pub fn title(&self) -> Style {
        Style::default().fg(self.title_fg).bg(self.title_bg)
    }

    /// Style for a task column; selected rows swap to a filled background
    pub fn column(&self, color: Color, selected: bool) -> Style {
        if selected {
            Style::default().fg(self.selected_fg).bg(color)
        } else {
            Style::default().fg(color)
        }
    }

    pub fn message(&self, is_error: bool) -> Style {
        if is_error {
            Style::default().fg(self.error)
        } else {
            Style::default()
        }
    }
}
