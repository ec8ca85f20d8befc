use regex::Regex;
use tracing::trace;

use crate::model::task::Task;
use crate::model::task_list::{NodeId, TaskList};
use crate::ops::filter::task_matches;

/// A search result: the matching node and its position among visible tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchHit {
    pub node: NodeId,
    pub ordinal: usize,
}

/// Node holding the `ordinal`-th visible task
pub fn resolve(list: &TaskList, ordinal: usize) -> Option<NodeId> {
    list.iter()
        .filter(|(_, t)| t.visible)
        .nth(ordinal)
        .map(|(id, _)| id)
}

/// Clamp an ordinal into `0..visible_count` (0 when nothing is visible)
pub fn clamp_ordinal(ordinal: usize, visible_count: usize) -> usize {
    ordinal.min(visible_count.saturating_sub(1))
}

/// Find the next visible task after `from` matching `re`, wrapping at the
/// end of the list. The walk stops after one full lap; `from` itself is the
/// last candidate.
pub fn find_next(list: &TaskList, re: &Regex, from: NodeId) -> Option<SearchHit> {
    let head = list.head()?;
    list.get(from)?;
    // Running ordinal of `cur`; -1 while no visible task has been passed
    let mut ordinal: isize = list
        .iter()
        .take_while(|(id, _)| *id != from)
        .filter(|(_, t)| t.visible)
        .count() as isize
        + isize::from(list.get(from).is_some_and(|t| t.visible))
        - 1;

    let mut cur = from;
    loop {
        match list.next(cur) {
            Some(next) => {
                cur = next;
                if list.task(cur).visible {
                    ordinal += 1;
                }
            }
            None => {
                cur = head;
                ordinal = if list.task(head).visible { 0 } else { -1 };
                trace!("search wrapped");
            }
        }

        let task = list.task(cur);
        if task.visible && task_matches(task, re) {
            return Some(SearchHit {
                node: cur,
                ordinal: ordinal.max(0) as usize,
            });
        }
        if cur == from {
            return None;
        }
    }
}

/// Visible tasks in `[offset, offset + height)`, in list order
pub fn visible_window(list: &TaskList, offset: usize, height: usize) -> Vec<&Task> {
    list.iter()
        .map(|(_, t)| t)
        .filter(|t| t.visible)
        .skip(offset)
        .take(height)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::filter::compile_pattern;
    use pretty_assertions::assert_eq;

    fn list_with_visibility(visible: &[bool]) -> TaskList {
        TaskList::from_tasks(
            visible
                .iter()
                .enumerate()
                .map(|(i, &v)| {
                    let mut t = Task::new(format!("u{i}"), format!("task {i}"));
                    t.index = i;
                    t.visible = v;
                    t
                })
                .collect(),
        )
    }

    fn re(pattern: &str) -> Regex {
        compile_pattern(pattern).unwrap()
    }

    #[test]
    fn resolve_counts_visible_only() {
        let list = list_with_visibility(&[true, false, true, true]);
        assert_eq!(resolve(&list, 0), Some(0));
        assert_eq!(resolve(&list, 1), Some(2));
        assert_eq!(resolve(&list, 2), Some(3));
        assert_eq!(resolve(&list, 3), None);
    }

    #[test]
    fn clamp() {
        assert_eq!(clamp_ordinal(7, 3), 2);
        assert_eq!(clamp_ordinal(1, 3), 1);
        assert_eq!(clamp_ordinal(4, 0), 0);
    }

    #[test]
    fn search_wraps_to_first_task() {
        let mut list = list_with_visibility(&[true; 5]);
        list.get_mut(0).unwrap().description = "needle".to_string();
        let hit = find_next(&list, &re("needle"), 4).unwrap();
        assert_eq!(hit, SearchHit { node: 0, ordinal: 0 });
    }

    #[test]
    fn search_moves_forward() {
        let mut list = list_with_visibility(&[true, true, false, true, true]);
        list.get_mut(4).unwrap().project = Some("target".to_string());
        let hit = find_next(&list, &re("TARGET"), 0).unwrap();
        assert_eq!(hit, SearchHit { node: 4, ordinal: 3 });
    }

    #[test]
    fn search_skips_hidden_matches() {
        let mut list = list_with_visibility(&[true, false, true]);
        list.get_mut(1).unwrap().description = "needle".to_string();
        assert_eq!(find_next(&list, &re("needle"), 0), None);
    }

    #[test]
    fn wrap_past_hidden_head_keeps_ordinals_right() {
        let mut list = list_with_visibility(&[false, true, true, true]);
        list.get_mut(1).unwrap().tags = Some("needle".to_string());
        let hit = find_next(&list, &re("needle"), 3).unwrap();
        assert_eq!(hit, SearchHit { node: 1, ordinal: 0 });
    }

    #[test]
    fn search_returns_start_when_it_is_the_only_match() {
        let mut list = list_with_visibility(&[true, true, true]);
        list.get_mut(1).unwrap().description = "needle".to_string();
        let hit = find_next(&list, &re("needle"), 1).unwrap();
        assert_eq!(hit, SearchHit { node: 1, ordinal: 1 });
    }

    #[test]
    fn search_without_match_stops_after_one_lap() {
        let list = list_with_visibility(&[true, false, true, true]);
        assert_eq!(find_next(&list, &re("nothing here"), 2), None);
        assert_eq!(find_next(&TaskList::new(), &re("x"), 0), None);
    }

    #[test]
    fn window_pages_through_visible_tasks() {
        let list = list_with_visibility(&[true, false, true, true, false, true]);
        let page: Vec<usize> = visible_window(&list, 1, 2).iter().map(|t| t.index).collect();
        assert_eq!(page, vec![2, 3]);
        let tail: Vec<usize> = visible_window(&list, 3, 10).iter().map(|t| t.index).collect();
        assert_eq!(tail, vec![5]);
    }
}
