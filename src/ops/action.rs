use std::fmt;

use crate::model::task::Task;

/// Mutation delegated to the `task` program
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskAction {
    Edit,
    Complete,
    Delete,
    View,
}

impl TaskAction {
    /// The `task` subcommand for this action
    pub fn verb(self) -> &'static str {
        match self {
            TaskAction::Edit => "edit",
            TaskAction::Complete => "done",
            TaskAction::Delete => "del",
            TaskAction::View => "info",
        }
    }

    /// Read-only actions wait for the user before returning to the list
    pub fn waits_for_user(self) -> bool {
        self == TaskAction::View
    }

    /// Whether the task list must be reloaded afterwards
    pub fn modifies(self) -> bool {
        self != TaskAction::View
    }

    pub fn success_message(self) -> &'static str {
        match self {
            TaskAction::Edit => "task edited",
            TaskAction::Complete => "task completed",
            TaskAction::Delete => "task deleted",
            TaskAction::View => "",
        }
    }

    pub fn failure_message(self) -> &'static str {
        match self {
            TaskAction::Edit => "task edit failed",
            TaskAction::Complete => "task complete failed",
            TaskAction::Delete => "task delete failed",
            TaskAction::View => "task info failed",
        }
    }
}

/// Version reported by `task version`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskVersion(String);

impl TaskVersion {
    pub fn new(version: impl Into<String>) -> Self {
        TaskVersion(version.into())
    }

    /// Extract the version from `task version` output (`task 2.6.2 built for linux`)
    pub fn from_banner(output: &str) -> Option<Self> {
        output.lines().find_map(|line| {
            let rest = line.trim().strip_prefix("task ")?;
            let version = rest.split_whitespace().next()?;
            version
                .starts_with(|c: char| c.is_ascii_digit())
                .then(|| TaskVersion::new(version))
        })
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Leading number of the version; 0 when it cannot be read
    pub fn major(&self) -> u32 {
        self.0
            .split('.')
            .next()
            .and_then(|m| m.parse().ok())
            .unwrap_or(0)
    }

    /// 2.x and later accept a uuid wherever an id is expected
    pub fn uses_uuid_addressing(&self) -> bool {
        self.major() >= 2
    }

    /// Arguments for `task` that print the pending tasks
    pub fn export_args(&self) -> &'static [&'static str] {
        if self.uses_uuid_addressing() {
            &["export", "status:pending"]
        } else {
            &["export.json", "status:pending"]
        }
    }
}

impl fmt::Display for TaskVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How the external program must be told which task to act on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionTarget {
    /// Address the task by uuid directly
    Uuid(String),
    /// Look up the short numeric id for this uuid first
    IdLookup(String),
}

/// Resolved task address
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Addressing {
    Id(u32),
    Uuid(String),
}

/// Decide how to address `task` for the given `task` version
pub fn action_target(version: &TaskVersion, task: &Task) -> ActionTarget {
    if version.uses_uuid_addressing() {
        ActionTarget::Uuid(task.uuid.clone())
    } else {
        ActionTarget::IdLookup(task.uuid.clone())
    }
}

/// Arguments for `task` to perform `action`. Ids come after the verb
/// (1.x style), uuids before it (2.x style).
pub fn command_args(addressing: &Addressing, action: TaskAction) -> Vec<String> {
    match addressing {
        Addressing::Id(id) => vec![action.verb().to_string(), id.to_string()],
        Addressing::Uuid(uuid) => vec![uuid.clone(), action.verb().to_string()],
    }
}
