use tracing::info;

use crate::model::config::ConfigError;
use crate::ops::action::TaskVersion;
use crate::tui::app::App;

/// Run a line typed at the `:` prompt
pub fn run_command(app: &mut App, line: &str) {
    let mut words = line.split_whitespace();
    let Some(name) = words.next() else {
        return;
    };
    let args: Vec<&str> = words.collect();
    info!(command = name, ?args, "command");

    match name {
        "version" => app.set_status(format!("tasknc v{}", env!("CARGO_PKG_VERSION"))),
        "quit" | "exit" => app.should_quit = true,
        "reload" => app.reload(),
        "redraw" => app.redraw = true,
        "set" => match args.as_slice() {
            [var, value @ ..] if !value.is_empty() => set_variable(app, var, &value.join(" ")),
            _ => app.set_error("usage: set <variable> <value>"),
        },
        "show" => match args.as_slice() {
            [var] => show_variable(app, var),
            _ => app.set_error("usage: show <variable>"),
        },
        _ => app.set_error(format!("error: command {name} not found")),
    }
}

fn variable_value(app: &App, var: &str) -> Option<String> {
    match var {
        "tasknc_version" => Some(app.version.to_string()),
        "searchstring" => Some(app.session.search_pattern().unwrap_or_default().to_string()),
        _ => app.config.get(var),
    }
}

fn show_variable(app: &mut App, var: &str) {
    match variable_value(app, var) {
        Some(value) => app.set_status(format!("{var}: {value}")),
        None => app.set_error(format!("unknown variable: {var}")),
    }
}

fn set_variable(app: &mut App, var: &str, value: &str) {
    match var {
        "tasknc_version" => app.version = TaskVersion::new(value),
        "searchstring" => app.session.set_search_pattern(value),
        _ => match app.config.set(var, value) {
            Ok(()) => app.apply_config(),
            Err(ConfigError::UnknownVariable(_)) => {
                app.set_error(format!("unknown variable: {var}"));
                return;
            }
            Err(e) => {
                app.set_error(e.to_string());
                return;
            }
        },
    }
    show_variable(app, var);
}
