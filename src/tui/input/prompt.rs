use crossterm::event::{KeyCode, KeyEvent};

use crate::model::filter::FilterMode;
use crate::ops::filter::FilterError;
use crate::ops::session::SearchError;

use super::command::run_command;
use crate::tui::app::{App, InputKind, Mode};

/// One-key sort mode selection
pub(super) fn handle_sort_key(app: &mut App, key: KeyEvent) {
    app.mode = Mode::Navigate;
    let KeyCode::Char(c) = key.code else {
        app.status = None;
        return;
    };
    match app.session.set_sort_mode(c) {
        Ok(mode) => {
            app.config.sortmode = mode.as_char();
            app.status = None;
        }
        Err(_) => app.set_error("invalid sort mode"),
    }
}

/// One-key filter mode selection; everything but clear then asks for a pattern
pub(super) fn handle_filter_key(app: &mut App, key: KeyEvent) {
    app.mode = Mode::Navigate;
    let KeyCode::Char(c) = key.code else {
        app.status = None;
        return;
    };
    match FilterMode::from_char(c) {
        Some(FilterMode::Clear) => {
            app.session.clear_filter();
            app.set_status("filters cleared");
        }
        Some(mode) => {
            app.mode = Mode::Input(InputKind::Filter(mode));
            app.input.clear();
            app.status = None;
        }
        None => app.set_error("invalid filter mode"),
    }
}

/// Line editing for the status row prompt
pub(super) fn handle_input(app: &mut App, kind: InputKind, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.mode = Mode::Navigate;
            app.input.clear();
        }
        KeyCode::Enter => {
            app.mode = Mode::Navigate;
            let line = std::mem::take(&mut app.input);
            submit(app, kind, &line);
        }
        KeyCode::Backspace => {
            app.input.pop();
        }
        KeyCode::Char(c) => app.input.push(c),
        _ => {}
    }
}

fn submit(app: &mut App, kind: InputKind, line: &str) {
    match kind {
        InputKind::Search => {
            if line.is_empty() {
                return;
            }
            match app.session.search(line) {
                Ok(_) => app.status = None,
                Err(SearchError::NoMatch(pattern)) => {
                    app.set_error(format!("no matches: {pattern}"))
                }
                Err(SearchError::NoPattern) => app.set_error("no active search string"),
            }
        }
        InputKind::Filter(mode) => match app.session.apply_filter(mode, line) {
            Ok(_) => app.set_status("filter applied"),
            Err(FilterError::EmptyResult) => app.set_error("filter yielded no results; reset"),
            Err(FilterError::InvalidMode(_)) => app.set_error("invalid filter mode"),
        },
        InputKind::Command => run_command(app, line),
    }
}
