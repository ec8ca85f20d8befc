/// What a filter matches against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    /// Description, tags or project
    StringSearch,
    /// Drop every filter and show all tasks
    Clear,
    Description,
    Tags,
    Project,
}

impl FilterMode {
    /// Parse the key used at the filter prompt (`a c d p t`, any case)
    pub fn from_char(c: char) -> Option<FilterMode> {
        match c.to_ascii_lowercase() {
            'a' => Some(FilterMode::StringSearch),
            'c' => Some(FilterMode::Clear),
            'd' => Some(FilterMode::Description),
            't' => Some(FilterMode::Tags),
            'p' => Some(FilterMode::Project),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FilterMode::StringSearch => "any",
            FilterMode::Clear => "clear",
            FilterMode::Description => "description",
            FilterMode::Tags => "tags",
            FilterMode::Project => "project",
        }
    }
}

/// One filter command, as kept in the active filter chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSpec {
    pub mode: FilterMode,
    /// Regex pattern; empty for `Clear`
    pub pattern: String,
}

impl FilterSpec {
    pub fn new(mode: FilterMode, pattern: impl Into<String>) -> Self {
        FilterSpec {
            mode,
            pattern: pattern.into(),
        }
    }

    pub fn clear() -> Self {
        FilterSpec {
            mode: FilterMode::Clear,
            pattern: String::new(),
        }
    }
}
