use regex::{Regex, RegexBuilder};
use tracing::{debug, error};

use crate::model::filter::{FilterMode, FilterSpec};
use crate::model::task::Task;
use crate::model::task_list::TaskList;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("invalid filter mode: {0}")]
    InvalidMode(char),
    #[error("filter yielded no results")]
    EmptyResult,
}

/// How filters combine across successive applications
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterPolicy {
    /// Each filter only sees the tasks the previous one left visible
    pub persist: bool,
    /// Persisted filters accumulate instead of replacing each other
    pub cascade: bool,
}

impl Default for FilterPolicy {
    fn default() -> Self {
        FilterPolicy {
            persist: true,
            cascade: true,
        }
    }
}

/// Result of a filter pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterCounts {
    /// Tasks accepted by this pass
    pub visible: usize,
    /// Tasks this pass considered
    pub total: usize,
}

/// Compile a filter or search pattern: case-insensitive, unanchored.
/// Returns `None` when the pattern is not a valid regex.
pub fn compile_pattern(pattern: &str) -> Option<Regex> {
    match RegexBuilder::new(pattern)
        .case_insensitive(true)
        .multi_line(true)
        .build()
    {
        Ok(re) => Some(re),
        Err(e) => {
            error!(pattern, "invalid pattern: {e}");
            None
        }
    }
}

fn field_matches(field: Option<&str>, re: &Regex) -> bool {
    field.is_some_and(|text| re.is_match(text))
}

/// Match against description, tags or project
pub fn task_matches(task: &Task, re: &Regex) -> bool {
    field_matches(Some(task.description.as_str()), re)
        || field_matches(task.tags.as_deref(), re)
        || field_matches(task.project.as_deref(), re)
}

fn spec_matches(task: &Task, mode: FilterMode, re: &Regex) -> bool {
    match mode {
        FilterMode::Description => field_matches(Some(task.description.as_str()), re),
        FilterMode::Tags => field_matches(task.tags.as_deref(), re),
        FilterMode::Project => field_matches(task.project.as_deref(), re),
        FilterMode::StringSearch => task_matches(task, re),
        FilterMode::Clear => true,
    }
}

/// Make every task visible and drop the whole filter chain
fn clear(list: &mut TaskList) -> FilterCounts {
    let dropped = list.filters().len();
    list.clear_filters();
    let mut cursor = list.head();
    while let Some(id) = cursor {
        if let Some(task) = list.get_mut(id) {
            task.visible = true;
        }
        cursor = list.next(id);
    }
    debug!(dropped, "filters cleared");
    let len = list.len();
    FilterCounts {
        visible: len,
        total: len,
    }
}

/// Evaluate one filter over the list. With `only_visible`, hidden tasks are
/// skipped without being evaluated and stay hidden.
fn run_pass(list: &mut TaskList, spec: &FilterSpec, only_visible: bool) -> FilterCounts {
    let re = compile_pattern(&spec.pattern);
    let mut counts = FilterCounts {
        visible: 0,
        total: 0,
    };

    let mut cursor = list.head();
    while let Some(id) = cursor {
        cursor = list.next(id);
        let Some(task) = list.get_mut(id) else {
            continue;
        };
        if only_visible && !task.visible {
            continue;
        }
        let accepted = re.as_ref().is_some_and(|re| spec_matches(task, spec.mode, re));
        task.visible = accepted;
        counts.total += 1;
        if task.visible {
            counts.visible += 1;
        }
    }
    counts
}

/// Apply a filter to the list and record it in the active chain per `policy`.
///
/// `Clear` always restores every task and empties the chain. Other modes
/// narrow the previously visible set when persisting, or start over from the
/// full list otherwise. A pass leaving nothing visible returns
/// [`FilterError::EmptyResult`]; the chain and visibility are left as
/// computed so the caller can clear.
pub fn apply(
    list: &mut TaskList,
    spec: FilterSpec,
    policy: FilterPolicy,
) -> Result<FilterCounts, FilterError> {
    if spec.mode == FilterMode::Clear {
        return Ok(clear(list));
    }

    let counts = run_pass(list, &spec, policy.persist);
    debug!(
        mode = spec.mode.label(),
        pattern = %spec.pattern,
        visible = counts.visible,
        total = counts.total,
        "filter applied"
    );

    if policy.persist {
        if policy.cascade {
            list.push_filter(spec);
        } else {
            list.replace_filters(spec);
        }
    } else {
        list.clear_filters();
    }

    if counts.visible == 0 {
        return Err(FilterError::EmptyResult);
    }
    Ok(counts)
}

/// Re-run the retained chain over a freshly loaded list, oldest filter first.
/// The chain itself is left unchanged.
pub fn replay(list: &mut TaskList) -> FilterCounts {
    let chain = list.filters().to_vec();
    let mut counts = FilterCounts {
        visible: list.len(),
        total: list.len(),
    };
    for spec in &chain {
        counts = run_pass(list, spec, true);
    }
    counts
}
