use chrono::{DateTime, Local};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::model::task::Task;
use crate::model::task_list::TaskList;
use crate::tui::app::App;
use crate::util::date::format_date;
use crate::util::unicode::{display_width, pad_left, pad_right};

/// Width of the due date / priority column (`YYYY-MM-DD`)
const DATE_WIDTH: usize = 10;

/// Column widths for one screen width
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Columns {
    pub project: usize,
    pub description: usize,
    pub date: usize,
}

impl Columns {
    /// Project column fits the longest project; description takes the rest
    pub fn layout(list: &TaskList, width: usize) -> Self {
        let longest = list
            .iter()
            .filter_map(|(_, t)| t.project.as_deref())
            .map(display_width)
            .max()
            .unwrap_or(0);
        let date = DATE_WIDTH.min(width);
        let project = longest.min(width.saturating_sub(date + 2) / 2);
        let description = width.saturating_sub(project + date + 2);
        Columns {
            project,
            description,
            date,
        }
    }
}

/// Due date if set, else the priority letter, else blank
pub fn date_column(task: &Task, now: &DateTime<Local>) -> String {
    match (task.due, task.priority) {
        (Some(due), _) => format_date(due, now),
        (None, Some(priority)) => priority.as_char().to_string(),
        (None, None) => String::new(),
    }
}

fn task_line<'a>(
    app: &App,
    task: &Task,
    columns: Columns,
    selected: bool,
    now: &DateTime<Local>,
) -> Line<'a> {
    let theme = &app.theme;
    let project = pad_left(task.project.as_deref().unwrap_or(""), columns.project);
    let description = pad_right(&task.description, columns.description);
    let date = pad_left(&date_column(task, now), columns.date);
    Line::from(vec![
        Span::styled(project + " ", theme.column(theme.project, selected)),
        Span::styled(description + " ", theme.column(theme.description, selected)),
        Span::styled(date, theme.column(theme.date, selected)),
    ])
}

pub fn render_task_list(frame: &mut Frame, app: &App, area: Rect) {
    let now = Local::now();
    let columns = Columns::layout(app.session.tasks(), area.width as usize);
    let offset = app.session.page_offset();
    let selected = app.session.selected();

    let lines: Vec<Line> = app
        .session
        .window()
        .into_iter()
        .enumerate()
        .map(|(row, task)| task_line(app, task, columns, offset + row == selected, &now))
        .collect();
    frame.render_widget(Paragraph::new(lines), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::Priority;
    use crate::tui::app::tests::test_app;
    use crate::tui::render::test_helpers::render_app;
    use pretty_assertions::assert_eq;

    #[test]
    fn columns_fit_width() {
        let list = TaskList::from_tasks(vec![
            Task::new("a", "x").with_project("garden"),
            Task::new("b", "y"),
        ]);
        let columns = Columns::layout(&list, 60);
        assert_eq!(
            columns,
            Columns {
                project: 6,
                description: 42,
                date: 10
            }
        );
    }

    #[test]
    fn long_projects_are_capped() {
        let list = TaskList::from_tasks(vec![
            Task::new("a", "x").with_project("a very long project name indeed"),
        ]);
        let columns = Columns::layout(&list, 30);
        assert_eq!(columns.project, 9);
        assert_eq!(columns.project + columns.description + columns.date + 2, 30);
    }

    #[test]
    fn date_column_prefers_due() {
        let now = Local::now();
        let task = Task::new("a", "x").with_priority(Priority::High);
        assert_eq!(date_column(&task, &now), "H");
        assert_eq!(date_column(&Task::new("b", "y"), &now), "");
        let old = Task::new("c", "z").with_due(1_000_036_800);
        assert!(date_column(&old, &now).starts_with("2001-09"));
    }

    #[test]
    fn rows_show_project_and_description() {
        let mut app = test_app();
        let out = render_app(&mut app, 40, 6);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[1], "work write report");
        assert_eq!(lines[2], "home buy milk");
        assert_eq!(lines[4], "     read book");
    }

    #[test]
    fn hidden_tasks_are_not_drawn() {
        let mut app = test_app();
        app.session
            .apply_filter(crate::model::filter::FilterMode::Project, "home")
            .unwrap();
        let out = render_app(&mut app, 40, 6);
        assert!(!out.contains("write report"));
        assert!(out.contains("(2/4)"));
    }
}
