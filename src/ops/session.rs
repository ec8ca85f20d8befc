use tracing::{debug, info};

use crate::model::filter::{FilterMode, FilterSpec};
use crate::model::task::Task;
use crate::model::task_list::TaskList;
use crate::ops::filter::{self, FilterCounts, FilterError, FilterPolicy};
use crate::ops::navigate;
use crate::ops::sort::{self, SortError, SortMode};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SearchError {
    #[error("no matches: {0}")]
    NoMatch(String),
    #[error("no active search string")]
    NoPattern,
}

/// Cursor movement requested by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Up,
    Down,
    Home,
    End,
}

/// Everything the viewer knows about the loaded task list.
///
/// The selection is an ordinal into the visible tasks, kept clamped to
/// `0..visible_count` after every operation that can change it.
#[derive(Debug)]
pub struct Session {
    list: TaskList,
    sort_mode: SortMode,
    policy: FilterPolicy,
    search: Option<String>,
    selected: usize,
    page_offset: usize,
    page_height: usize,
    counts: FilterCounts,
}

impl Session {
    /// Start a session over freshly parsed tasks, sorted by `sort_mode`
    pub fn new(tasks: Vec<Task>, sort_mode: SortMode, policy: FilterPolicy) -> Self {
        let mut list = TaskList::from_tasks(tasks);
        sort::sort_all(&mut list, sort_mode);
        let len = list.len();
        Session {
            list,
            sort_mode,
            policy,
            search: None,
            selected: 0,
            page_offset: 0,
            page_height: 1,
            counts: FilterCounts {
                visible: len,
                total: len,
            },
        }
    }

    /// Replace the task list with a new load, keeping the filter chain,
    /// sort mode and search pattern.
    pub fn reload(&mut self, tasks: Vec<Task>) {
        let mut list = TaskList::from_tasks(tasks);
        list.set_filters(self.list.take_filters());
        self.counts = filter::replay(&mut list);
        sort::sort_all(&mut list, self.sort_mode);
        self.list = list;
        info!(
            total = self.list.len(),
            visible = self.counts.visible,
            "task list reloaded"
        );
        if self.counts.visible == 0 && !self.list.is_empty() {
            self.clear_filter();
        }
        self.clamp_selection();
    }

    pub fn tasks(&self) -> &TaskList {
        &self.list
    }

    pub fn sort_mode(&self) -> SortMode {
        self.sort_mode
    }

    pub fn policy(&self) -> FilterPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: FilterPolicy) {
        self.policy = policy;
    }

    pub fn visible_count(&self) -> usize {
        self.counts.visible
    }

    pub fn total_count(&self) -> usize {
        self.counts.total
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn page_offset(&self) -> usize {
        self.page_offset
    }

    pub fn search_pattern(&self) -> Option<&str> {
        self.search.as_deref()
    }

    pub fn set_search_pattern(&mut self, pattern: impl Into<String>) {
        self.search = Some(pattern.into());
    }

    /// Tell the session how many rows the list view shows
    pub fn set_page_height(&mut self, height: usize) {
        self.page_height = height.max(1);
        self.clamp_selection();
    }

    // --- Sorting ---

    /// Switch sort mode and re-sort
    pub fn set_sort_mode(&mut self, c: char) -> Result<SortMode, SortError> {
        let mode = SortMode::from_char(c)?;
        self.sort_mode = mode;
        self.resort();
        info!(mode = %mode, "sort mode changed");
        Ok(mode)
    }

    pub fn resort(&mut self) {
        sort::sort_all(&mut self.list, self.sort_mode);
    }

    // --- Filtering ---

    /// Apply a filter. When nothing survives, the filters are cleared before
    /// [`FilterError::EmptyResult`] is returned.
    pub fn apply_filter(
        &mut self,
        mode: FilterMode,
        pattern: &str,
    ) -> Result<FilterCounts, FilterError> {
        let spec = if mode == FilterMode::Clear {
            FilterSpec::clear()
        } else {
            FilterSpec::new(mode, pattern)
        };
        let result = filter::apply(&mut self.list, spec, self.policy);
        match result {
            Ok(counts) => {
                self.counts = counts;
                self.clamp_selection();
                Ok(counts)
            }
            Err(FilterError::EmptyResult) => {
                debug!(pattern, "filter yielded no results; resetting");
                self.clear_filter();
                Err(FilterError::EmptyResult)
            }
            Err(e) => Err(e),
        }
    }

    /// Apply a filter chosen by its prompt key (`a c d p t`)
    pub fn apply_filter_key(
        &mut self,
        key: char,
        pattern: &str,
    ) -> Result<FilterCounts, FilterError> {
        let mode = FilterMode::from_char(key).ok_or(FilterError::InvalidMode(key))?;
        self.apply_filter(mode, pattern)
    }

    pub fn clear_filter(&mut self) -> FilterCounts {
        // Clear cannot fail
        let counts = filter::apply(&mut self.list, FilterSpec::clear(), self.policy)
            .unwrap_or(FilterCounts {
                visible: self.list.len(),
                total: self.list.len(),
            });
        self.counts = counts;
        self.clamp_selection();
        counts
    }

    pub fn active_filters(&self) -> &[FilterSpec] {
        self.list.filters()
    }

    // --- Selection ---

    pub fn select(&mut self, movement: Selection) {
        let visible = self.counts.visible;
        self.selected = match movement {
            Selection::Up => self.selected.saturating_sub(1),
            Selection::Down => self.selected + 1,
            Selection::Home => 0,
            Selection::End => visible.saturating_sub(1),
        };
        self.clamp_selection();
    }

    pub fn selected_task(&self) -> Option<&Task> {
        navigate::resolve(&self.list, self.selected).map(|id| self.list.task(id))
    }

    /// Clamp the selection to the visible tasks and scroll it into view
    fn clamp_selection(&mut self) {
        self.selected = navigate::clamp_ordinal(self.selected, self.counts.visible);
        if self.selected < self.page_offset {
            self.page_offset = self.selected;
        } else if self.selected >= self.page_offset + self.page_height {
            self.page_offset = self.selected + 1 - self.page_height;
        }
        let max_offset = self.counts.visible.saturating_sub(self.page_height);
        self.page_offset = self.page_offset.min(max_offset);
    }

    /// Visible tasks on the current page
    pub fn window(&self) -> Vec<&Task> {
        navigate::visible_window(&self.list, self.page_offset, self.page_height)
    }

    // --- Search ---

    /// Remember `pattern` and move to its next match
    pub fn search(&mut self, pattern: &str) -> Result<usize, SearchError> {
        self.search = Some(pattern.to_string());
        self.search_next()
    }

    /// Move to the next match of the remembered pattern
    pub fn search_next(&mut self) -> Result<usize, SearchError> {
        let pattern = self.search.clone().ok_or(SearchError::NoPattern)?;
        let Some(re) = filter::compile_pattern(&pattern) else {
            return Err(SearchError::NoMatch(pattern));
        };
        let from = navigate::resolve(&self.list, self.selected).or_else(|| self.list.tail());
        let hit = from.and_then(|from| navigate::find_next(&self.list, &re, from));
        match hit {
            Some(hit) => {
                self.selected = hit.ordinal;
                self.clamp_selection();
                Ok(hit.ordinal)
            }
            None => Err(SearchError::NoMatch(pattern)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::Priority;
    use pretty_assertions::assert_eq;

    fn sample() -> Vec<Task> {
        let descriptions = ["alpha", "bravo", "charlie", "delta", "echo"];
        descriptions
            .iter()
            .enumerate()
            .map(|(i, d)| {
                let mut t = Task::new(format!("u{i}"), *d);
                t.index = i;
                t
            })
            .collect()
    }

    fn session() -> Session {
        let mut s = Session::new(sample(), SortMode::Index, FilterPolicy::default());
        s.set_page_height(3);
        s
    }

    fn window_descriptions(s: &Session) -> Vec<String> {
        s.window().iter().map(|t| t.description.clone()).collect()
    }

    #[test]
    fn new_session_sorts_and_counts() {
        let tasks = vec![
            Task::new("a", "low").with_priority(Priority::Low),
            Task::new("b", "high").with_priority(Priority::High),
        ];
        let s = Session::new(tasks, SortMode::Priority, FilterPolicy::default());
        assert_eq!(s.visible_count(), 2);
        assert_eq!(s.total_count(), 2);
        assert_eq!(s.selected_task().unwrap().description, "high");
    }

    #[test]
    fn selection_is_clamped() {
        let mut s = session();
        s.select(Selection::Up);
        assert_eq!(s.selected(), 0);
        s.select(Selection::End);
        assert_eq!(s.selected(), 4);
        s.select(Selection::Down);
        assert_eq!(s.selected(), 4);
        s.select(Selection::Home);
        assert_eq!(s.selected(), 0);
    }

    #[test]
    fn page_follows_selection() {
        let mut s = session();
        assert_eq!(window_descriptions(&s), vec!["alpha", "bravo", "charlie"]);
        s.select(Selection::End);
        assert_eq!(s.page_offset(), 2);
        assert_eq!(window_descriptions(&s), vec!["charlie", "delta", "echo"]);
        s.select(Selection::Up);
        s.select(Selection::Up);
        s.select(Selection::Up);
        assert_eq!(s.selected(), 1);
        assert_eq!(s.page_offset(), 1);
    }

    #[test]
    fn filter_clamps_selection() {
        let mut s = session();
        s.select(Selection::End);
        let counts = s.apply_filter(FilterMode::Description, "a").unwrap();
        assert_eq!(counts.visible, 4);
        assert_eq!(s.selected(), 3);
        assert_eq!(s.selected_task().unwrap().description, "delta");
    }

    #[test]
    fn empty_filter_result_resets() {
        let mut s = session();
        s.apply_filter(FilterMode::Description, "alpha").unwrap();
        let err = s.apply_filter(FilterMode::Description, "zulu").unwrap_err();
        assert_eq!(err, FilterError::EmptyResult);
        assert_eq!(s.visible_count(), 5);
        assert!(s.active_filters().is_empty());
    }

    #[test]
    fn invalid_filter_key_leaves_state_alone() {
        let mut s = session();
        s.apply_filter(FilterMode::Description, "a").unwrap();
        let before = s.visible_count();
        let err = s.apply_filter_key('x', "foo").unwrap_err();
        assert_eq!(err, FilterError::InvalidMode('x'));
        assert_eq!(s.visible_count(), before);
        assert_eq!(s.active_filters().len(), 1);
    }

    #[test]
    fn clear_filter_key() {
        let mut s = session();
        s.apply_filter_key('d', "bravo").unwrap();
        assert_eq!(s.visible_count(), 1);
        let counts = s.apply_filter_key('C', "").unwrap();
        assert_eq!(counts.visible, 5);
    }

    #[test]
    fn search_wraps_from_last() {
        let mut s = session();
        s.select(Selection::End);
        assert_eq!(s.search("ALPHA"), Ok(0));
        assert_eq!(s.selected_task().unwrap().description, "alpha");
        assert_eq!(s.page_offset(), 0);
    }

    #[test]
    fn search_next_cycles_matches() {
        let mut s = session();
        assert_eq!(s.search("e"), Ok(2));
        assert_eq!(s.search_next(), Ok(3));
        assert_eq!(s.search_next(), Ok(4));
        assert_eq!(s.search_next(), Ok(2));
    }

    #[test]
    fn search_miss_keeps_selection() {
        let mut s = session();
        s.select(Selection::Down);
        assert_eq!(
            s.search("zulu"),
            Err(SearchError::NoMatch("zulu".to_string()))
        );
        assert_eq!(s.selected(), 1);
    }

    #[test]
    fn search_next_needs_a_pattern() {
        let mut s = session();
        assert_eq!(s.search_next(), Err(SearchError::NoPattern));
    }

    #[test]
    fn sort_mode_change() {
        let mut s = session();
        assert!(s.set_sort_mode('q').is_err());
        assert_eq!(s.sort_mode(), SortMode::Index);
        assert_eq!(s.set_sort_mode('P').unwrap(), SortMode::Project);
        assert_eq!(s.sort_mode(), SortMode::Project);
    }

    #[test]
    fn reload_replays_filters() {
        let mut s = session();
        s.apply_filter(FilterMode::Description, "a").unwrap();
        s.apply_filter(FilterMode::Description, "l").unwrap();
        assert_eq!(s.visible_count(), 3);

        let mut tasks = sample();
        let mut lima = Task::new("u5", "lima");
        lima.index = 5;
        tasks.push(lima);
        s.reload(tasks);
        assert_eq!(s.tasks().len(), 6);
        assert_eq!(s.active_filters().len(), 2);
        let visible: Vec<String> = s
            .tasks()
            .iter()
            .filter(|(_, t)| t.visible)
            .map(|(_, t)| t.description.clone())
            .collect();
        assert_eq!(visible, vec!["alpha", "charlie", "delta", "lima"]);
    }

    #[test]
    fn reload_without_survivors_clears() {
        let mut s = session();
        s.apply_filter(FilterMode::Description, "echo").unwrap();
        s.select(Selection::End);
        s.reload(vec![Task::new("x", "xray"), Task::new("y", "yankee")]);
        assert_eq!(s.visible_count(), 2);
        assert!(s.active_filters().is_empty());
        assert_eq!(s.selected(), 1);
    }
}
