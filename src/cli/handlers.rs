use tracing::{error, info};

use crate::cli::commands::Cli;
use crate::io::config_io::{data_dir, load_config};
use crate::io::log::init_logging;
use crate::io::taskwarrior::{Taskwarrior, TaskwarriorError};
use crate::model::config::{Config, ConfigError};
use crate::model::task::Task;
use crate::ops::action::TaskVersion;

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("could not open log file: {0}")]
    Log(#[from] std::io::Error),
    #[error(transparent)]
    Taskwarrior(#[from] TaskwarriorError),
    #[error("it appears that your task list is empty")]
    EmptyTaskList,
}

/// Everything the viewer needs before the terminal is taken over
#[derive(Debug)]
pub struct Startup {
    pub config: Config,
    pub taskwarrior: Taskwarrior,
    pub version: TaskVersion,
    pub tasks: Vec<Task>,
}

/// Load config, start logging, and fetch the initial task list
pub fn prepare(cli: &Cli) -> Result<Startup, StartupError> {
    let mut config = load_config(cli.config.as_deref())?;
    if let Some(loglvl) = cli.loglvl {
        config.loglvl = loglvl;
    }
    init_logging(&data_dir().join("tasknc.log"), config.loglvl)?;
    info!(version = env!("CARGO_PKG_VERSION"), "tasknc starting");

    let taskwarrior = Taskwarrior::default();
    let version = taskwarrior.detect_version()?;
    let tasks = match taskwarrior.export(&version) {
        Ok(tasks) => tasks,
        Err(TaskwarriorError::Load(e)) => {
            error!(error = %e, "task export could not be parsed");
            return Err(StartupError::EmptyTaskList);
        }
        Err(e) => return Err(e.into()),
    };
    if tasks.is_empty() {
        return Err(StartupError::EmptyTaskList);
    }
    Ok(Startup {
        config,
        taskwarrior,
        version,
        tasks,
    })
}

pub fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let startup = prepare(&cli)?;
    if cli.debug {
        println!("task count: {}", startup.tasks.len());
        return Ok(());
    }
    crate::tui::run(startup)
}
