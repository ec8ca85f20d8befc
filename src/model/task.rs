/// Task priority as exported by taskwarrior
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// The single character taskwarrior uses for this priority
    pub fn as_char(self) -> char {
        match self {
            Priority::High => 'H',
            Priority::Medium => 'M',
            Priority::Low => 'L',
        }
    }

    /// Parse a priority character into a priority
    pub fn from_char(c: char) -> Option<Priority> {
        match c {
            'H' => Some(Priority::High),
            'M' => Some(Priority::Medium),
            'L' => Some(Priority::Low),
            _ => None,
        }
    }
}

/// A pending task loaded from the external export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// Position in load order (0-based). Moves with the task when sorted.
    pub index: usize,
    /// Identity assigned by taskwarrior
    pub uuid: String,
    /// Task description text
    pub description: String,
    /// Project name
    pub project: Option<String>,
    /// Tags, comma-joined
    pub tags: Option<String>,
    pub priority: Option<Priority>,
    /// Due date (epoch seconds)
    pub due: Option<i64>,
    /// Creation time (epoch seconds)
    pub entry: Option<i64>,
    /// Start time (epoch seconds)
    pub start: Option<i64>,
    /// End time (epoch seconds)
    pub end: Option<i64>,
    /// Whether the task passes the current filter chain
    pub visible: bool,
}

impl Task {
    /// Create a task with the required fields; everything else absent
    pub fn new(uuid: impl Into<String>, description: impl Into<String>) -> Self {
        Task {
            index: 0,
            uuid: uuid.into(),
            description: description.into(),
            project: None,
            tags: None,
            priority: None,
            due: None,
            entry: None,
            start: None,
            end: None,
            visible: true,
        }
    }

    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    pub fn with_tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = Some(tags.into());
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_due(mut self, due: i64) -> Self {
        self.due = Some(due);
        self
    }

    /// A task is valid when both identity and description are non-empty
    pub fn is_valid(&self) -> bool {
        !self.uuid.is_empty() && !self.description.is_empty()
    }
}
