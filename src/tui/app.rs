use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::{Backend, CrosstermBackend};
use tracing::{error, info};

use crate::cli::handlers::Startup;
use crate::io::taskwarrior::Taskwarrior;
use crate::model::config::Config;
use crate::model::filter::FilterMode;
use crate::model::task::Task;
use crate::ops::action::{TaskAction, TaskVersion};
use crate::ops::filter::FilterPolicy;
use crate::ops::session::Session;
use crate::ops::sort::SortMode;

use super::input;
use super::render;
use super::theme::Theme;

/// What the bottom line is collecting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Search,
    Filter(FilterMode),
    Command,
}

/// Current interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Navigate,
    /// Waiting for a sort mode key
    SortKey,
    /// Waiting for a filter mode key
    FilterKey,
    /// Typing into the status row
    Input(InputKind),
}

/// Work that needs the terminal handed over to `task`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum External {
    Action(TaskAction),
    Add,
    Undo,
    Sync,
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
    pub expires: Instant,
}

/// Main application state
pub struct App {
    pub session: Session,
    pub config: Config,
    pub version: TaskVersion,
    pub taskwarrior: Taskwarrior,
    pub theme: Theme,
    pub mode: Mode,
    /// Text typed at the current prompt
    pub input: String,
    pub status: Option<StatusMessage>,
    pub should_quit: bool,
    /// Clear the terminal before the next draw
    pub redraw: bool,
    /// External command queued by a key press
    pub pending: Option<External>,
}

impl App {
    pub fn new(config: Config, version: TaskVersion, taskwarrior: Taskwarrior, tasks: Vec<Task>) -> Self {
        let sort_mode = SortMode::from_char(config.sortmode).unwrap_or(SortMode::Due);
        let session = Session::new(tasks, sort_mode, policy_of(&config));
        App {
            session,
            config,
            version,
            taskwarrior,
            theme: Theme::default(),
            mode: Mode::Navigate,
            input: String::new(),
            status: None,
            should_quit: false,
            redraw: false,
            pending: None,
        }
    }

    fn status_timeout(&self) -> Duration {
        Duration::from_secs(self.config.statusbar_timeout)
    }

    pub fn set_status(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            is_error: false,
            expires: Instant::now() + self.status_timeout(),
        });
    }

    pub fn set_error(&mut self, text: impl Into<String>) {
        let text = text.into();
        error!("{text}");
        self.status = Some(StatusMessage {
            text,
            is_error: true,
            expires: Instant::now() + self.status_timeout(),
        });
    }

    /// Drop the status message once its time is up
    pub fn expire_status(&mut self, now: Instant) {
        if self.status.as_ref().is_some_and(|s| now >= s.expires) {
            self.status = None;
        }
    }

    /// Re-read sort mode and filter policy after a config change
    pub fn apply_config(&mut self) {
        self.session.set_policy(policy_of(&self.config));
        if self.config.sortmode != self.session.sort_mode().as_char()
            && let Err(e) = self.session.set_sort_mode(self.config.sortmode)
        {
            self.set_error(e.to_string());
        }
    }

    /// Fetch the task list again, keeping filters and sort mode
    pub fn reload(&mut self) {
        match self.taskwarrior.export(&self.version) {
            Ok(tasks) => {
                self.session.reload(tasks);
                self.set_status("task list reloaded");
            }
            Err(e) => self.set_error(format!("reload failed: {e}")),
        }
    }

    /// Run a queued external command. The terminal must already be released.
    pub fn run_external(&mut self, external: External) {
        info!(?external, "running external command");
        let (result, success, failure) = match external {
            External::Action(action) => {
                let Some(task) = self.session.selected_task().cloned() else {
                    self.set_error("no task selected");
                    return;
                };
                (
                    self.taskwarrior.run_action(&self.version, &task, action),
                    action.success_message(),
                    action.failure_message(),
                )
            }
            External::Add => (
                self.taskwarrior.add_task(&self.version).map(|_| ()),
                "task added",
                "task add failed",
            ),
            External::Undo => (self.taskwarrior.undo(), "undo executed", "undo execution failed"),
            External::Sync => (
                self.taskwarrior.sync(),
                "tasks synchronized",
                "task syncronization failed",
            ),
        };

        let modifies = match external {
            External::Action(action) => action.modifies(),
            _ => true,
        };
        match result {
            Ok(()) => {
                if modifies {
                    self.reload();
                }
                if !success.is_empty() {
                    self.set_status(success);
                }
            }
            Err(e) => {
                info!(error = %e, "external command failed");
                if modifies {
                    self.reload();
                }
                self.set_error(failure);
            }
        }
    }
}

fn policy_of(config: &Config) -> FilterPolicy {
    FilterPolicy {
        persist: config.filter_persist,
        cascade: config.filter_cascade,
    }
}

pub fn run(startup: Startup) -> Result<(), Box<dyn std::error::Error>> {
    let Startup {
        config,
        taskwarrior,
        version,
        tasks,
    } = startup;
    let mut app = App::new(config, version, taskwarrior, tasks);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Install panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let result = run_event_loop(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    info!("tasknc exiting");

    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        app.expire_status(Instant::now());
        if app.redraw {
            terminal.clear()?;
            app.redraw = false;
        }
        terminal.draw(|frame| render::render(frame, app))?;

        if event::poll(Duration::from_millis(app.config.nc_timeout))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            input::handle_key(app, key);
        }

        if let Some(external) = app.pending.take() {
            suspend(terminal)?;
            app.run_external(external);
            resume(terminal)?;
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

/// Hand the terminal back to the shell for a child process
fn suspend<B: Backend + io::Write>(terminal: &mut Terminal<B>) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()
}

fn resume<B: Backend + io::Write>(terminal: &mut Terminal<B>) -> io::Result<()> {
    enable_raw_mode()?;
    execute!(terminal.backend_mut(), EnterAlternateScreen)?;
    terminal.clear()
}
