use std::io::{self, BufRead, BufReader, Write};
use std::process::{Command, Stdio};

use tracing::{debug, info, warn};

use crate::model::task::Task;
use crate::ops::action::{ActionTarget, Addressing, TaskAction, TaskVersion, action_target, command_args};
use crate::parse::{LoadError, parse_export};

#[derive(Debug, thiserror::Error)]
pub enum TaskwarriorError {
    #[error("could not run {command}: {source}")]
    Spawn {
        command: String,
        source: io::Error,
    },
    #[error("{command} failed (exit status {status})")]
    Failed { command: String, status: String },
    #[error("could not determine task version")]
    UnknownVersion,
    #[error("no pending task with uuid {0}")]
    IdNotFound(String),
    #[error("task add did not report a task id")]
    NoCreatedId,
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

const ID_REPORT: &[&str] = &[
    "rc.report.all.columns:uuid,id",
    "rc.report.all.labels:UUID,id",
    "rc.report.all.sort:id-",
    "all",
    "status:pending",
    "rc._forcecolor=no",
];

/// Handle on the external `task` program
#[derive(Debug, Clone)]
pub struct Taskwarrior {
    program: String,
    leading_args: Vec<String>,
}

impl Default for Taskwarrior {
    fn default() -> Self {
        Taskwarrior::new("task")
    }
}

impl Taskwarrior {
    pub fn new(program: impl Into<String>) -> Self {
        Taskwarrior {
            program: program.into(),
            leading_args: Vec::new(),
        }
    }

    /// Run `program` with `leading_args` in front of every argument list,
    /// e.g. an interpreter and a script
    pub fn with_leading_args(program: impl Into<String>, leading_args: Vec<String>) -> Self {
        Taskwarrior {
            program: program.into(),
            leading_args,
        }
    }

    fn command<S: AsRef<str>>(&self, args: &[S]) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.leading_args);
        for arg in args {
            let arg: &str = arg.as_ref();
            cmd.arg(arg);
        }
        cmd
    }

    fn describe<S: AsRef<str>>(args: &[S]) -> String {
        let mut line = String::from("task");
        for arg in args {
            line.push(' ');
            line.push_str(arg.as_ref());
        }
        line
    }

    /// Run with stdout captured; stdin and stderr are discarded
    fn capture<S: AsRef<str>>(&self, args: &[S]) -> Result<String, TaskwarriorError> {
        let command = Self::describe(args);
        debug!(%command, "capturing");
        let output = self
            .command(args)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .map_err(|source| TaskwarriorError::Spawn {
                command: command.clone(),
                source,
            })?;
        if !output.status.success() {
            return Err(TaskwarriorError::Failed {
                command,
                status: output.status.to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Run attached to the terminal, echoing the command line first
    fn interactive<S: AsRef<str>>(&self, args: &[S]) -> Result<(), TaskwarriorError> {
        let command = Self::describe(args);
        println!("{command}");
        info!(%command, "running");
        let status = self
            .command(args)
            .status()
            .map_err(|source| TaskwarriorError::Spawn {
                command: command.clone(),
                source,
            })?;
        if !status.success() {
            warn!(%command, %status, "command failed");
            return Err(TaskwarriorError::Failed {
                command,
                status: status.to_string(),
            });
        }
        Ok(())
    }

    /// Ask `task version` which version is installed
    pub fn detect_version(&self) -> Result<TaskVersion, TaskwarriorError> {
        let output = self.capture(&["version", "rc._forcecolor=no"])?;
        let version = TaskVersion::from_banner(&output).ok_or(TaskwarriorError::UnknownVersion)?;
        info!(%version, "task version detected");
        Ok(version)
    }

    /// Load all pending tasks
    pub fn export(&self, version: &TaskVersion) -> Result<Vec<Task>, TaskwarriorError> {
        let args = version.export_args();
        let command = Self::describe(args);
        let mut child = self
            .command(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| TaskwarriorError::Spawn {
                command: command.clone(),
                source,
            })?;

        let parsed = match child.stdout.take() {
            Some(stdout) => parse_export(BufReader::new(stdout)),
            None => Ok(Vec::new()),
        };
        let status = child.wait()?;
        let tasks = parsed?;
        if !status.success() {
            return Err(TaskwarriorError::Failed {
                command,
                status: status.to_string(),
            });
        }
        info!(count = tasks.len(), "tasks exported");
        Ok(tasks)
    }

    /// Short numeric id of a pending task
    pub fn lookup_id(&self, uuid: &str) -> Result<u32, TaskwarriorError> {
        let output = self.capture(ID_REPORT)?;
        parse_id_report(&output, uuid).ok_or_else(|| TaskwarriorError::IdNotFound(uuid.to_string()))
    }

    /// Perform `action` on `task`. Viewing waits for ENTER before returning.
    pub fn run_action(
        &self,
        version: &TaskVersion,
        task: &Task,
        action: TaskAction,
    ) -> Result<(), TaskwarriorError> {
        let addressing = match action_target(version, task) {
            ActionTarget::Uuid(uuid) => Addressing::Uuid(uuid),
            ActionTarget::IdLookup(uuid) => Addressing::Id(self.lookup_id(&uuid)?),
        };
        let result = self.interactive(&command_args(&addressing, action));
        if action.waits_for_user() {
            wait_for_enter()?;
        }
        result
    }

    /// Add a placeholder task and open it in the editor. Returns the new id.
    pub fn add_task(&self, version: &TaskVersion) -> Result<u32, TaskwarriorError> {
        println!("task add new task");
        let output = self.capture(&["add", "new", "task"])?;
        let id = parse_created_id(&output).ok_or(TaskwarriorError::NoCreatedId)?;
        info!(id, "task added");
        let id_arg = id.to_string();
        if version.uses_uuid_addressing() {
            self.interactive(&[id_arg.as_str(), "edit"])?;
        } else {
            self.interactive(&["edit", id_arg.as_str()])?;
        }
        Ok(id)
    }

    pub fn undo(&self) -> Result<(), TaskwarriorError> {
        self.interactive(&["undo"])
    }

    /// Merge from the remote, declining every prompt, then push
    pub fn sync(&self) -> Result<(), TaskwarriorError> {
        let command = String::from("task merge");
        println!("{command}");
        let mut child = self
            .command(&["merge"])
            .stdin(Stdio::piped())
            .spawn()
            .map_err(|source| TaskwarriorError::Spawn {
                command: command.clone(),
                source,
            })?;
        if let Some(mut stdin) = child.stdin.take() {
            // The child may exit without reading; a closed pipe is fine
            for _ in 0..64 {
                if stdin.write_all(b"n\n").is_err() {
                    break;
                }
            }
        }
        let status = child.wait()?;
        if !status.success() {
            return Err(TaskwarriorError::Failed {
                command,
                status: status.to_string(),
            });
        }
        self.interactive(&["push"])
    }
}

fn wait_for_enter() -> io::Result<()> {
    println!("press ENTER to return");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(())
}

/// Find `uuid` in the uuid/id report and return its id
pub fn parse_id_report(output: &str, uuid: &str) -> Option<u32> {
    output.lines().find_map(|line| {
        let mut fields = line.split_whitespace();
        (fields.next()? == uuid)
            .then(|| fields.next()?.parse().ok())
            .flatten()
    })
}

/// Id from a `Created task N.` line
pub fn parse_created_id(output: &str) -> Option<u32> {
    output.lines().find_map(|line| {
        let rest = line.trim().strip_prefix("Created task ")?;
        let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
        digits.parse().ok()
    })
}
