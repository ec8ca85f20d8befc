mod command;
mod prompt;

use crossterm::event::{KeyCode, KeyEvent};
use tracing::debug;

use crate::ops::action::TaskAction;
use crate::ops::session::{SearchError, Selection};

use super::app::{App, External, InputKind, Mode};

pub use command::run_command;

/// Handle a key event in the current mode
pub fn handle_key(app: &mut App, key: KeyEvent) {
    // Ignore bare modifier key presses (Shift, Ctrl, Alt, etc.)
    if matches!(key.code, KeyCode::Modifier(_)) {
        return;
    }
    match app.mode {
        Mode::Navigate => handle_navigate(app, key),
        Mode::SortKey => prompt::handle_sort_key(app, key),
        Mode::FilterKey => prompt::handle_filter_key(app, key),
        Mode::Input(kind) => prompt::handle_input(app, kind, key),
    }
}

fn handle_navigate(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.session.select(Selection::Down),
        KeyCode::Char('k') | KeyCode::Up => app.session.select(Selection::Up),
        KeyCode::Home => app.session.select(Selection::Home),
        KeyCode::End => app.session.select(Selection::End),

        KeyCode::Char('e') => queue_action(app, TaskAction::Edit),
        KeyCode::Char('c') => queue_action(app, TaskAction::Complete),
        KeyCode::Char('d') => queue_action(app, TaskAction::Delete),
        KeyCode::Char('v') | KeyCode::Enter => queue_action(app, TaskAction::View),
        KeyCode::Char('a') => app.pending = Some(External::Add),
        KeyCode::Char('u') => app.pending = Some(External::Undo),
        KeyCode::Char('y') => app.pending = Some(External::Sync),
        KeyCode::Char('r') => app.reload(),

        KeyCode::Char('s') => {
            app.mode = Mode::SortKey;
            app.set_status("enter sort mode: iNdex, Project, Due, pRiority");
        }
        KeyCode::Char('f') => {
            app.mode = Mode::FilterKey;
            app.set_status("filter by: Any Clear Proj Desc Tag");
        }
        KeyCode::Char('/') => start_input(app, InputKind::Search),
        KeyCode::Char(':') | KeyCode::Char(';') => start_input(app, InputKind::Command),
        KeyCode::Char('n') => search_next(app),
        KeyCode::Char('q') => app.should_quit = true,

        KeyCode::Char(c) => app.set_error(format!("unhandled key: {c}")),
        _ => {}
    }
}

fn queue_action(app: &mut App, action: TaskAction) {
    if app.session.selected_task().is_none() {
        app.set_error("no task selected");
        return;
    }
    debug!(?action, "action queued");
    app.pending = Some(External::Action(action));
}

fn start_input(app: &mut App, kind: InputKind) {
    app.mode = Mode::Input(kind);
    app.input.clear();
    app.status = None;
}

fn search_next(app: &mut App) {
    match app.session.search_next() {
        Ok(_) => {}
        Err(SearchError::NoPattern) => app.set_error("no active search string"),
        Err(SearchError::NoMatch(pattern)) => app.set_error(format!("no matches: {pattern}")),
    }
}
