use std::cmp::Ordering;
use std::fmt;

use crate::model::task::Task;
use crate::model::task_list::{NodeId, TaskList};

#[derive(Debug, thiserror::Error)]
pub enum SortError {
    #[error("invalid sort mode: {0} (valid sort modes are: d, n, p, or r)")]
    InvalidMode(char),
}

/// Sort key, each with its own fallback chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortMode {
    /// Load order
    Index,
    /// Project, then index
    Project,
    /// Due date, then priority
    Due,
    /// Priority, then project
    Priority,
}

impl SortMode {
    pub fn as_char(self) -> char {
        match self {
            SortMode::Index => 'n',
            SortMode::Project => 'p',
            SortMode::Due => 'd',
            SortMode::Priority => 'r',
        }
    }

    /// Parse a sort mode character (`n p d r`, any case)
    pub fn from_char(c: char) -> Result<SortMode, SortError> {
        match c.to_ascii_lowercase() {
            'n' => Ok(SortMode::Index),
            'p' => Ok(SortMode::Project),
            'd' => Ok(SortMode::Due),
            'r' => Ok(SortMode::Priority),
            _ => Err(SortError::InvalidMode(c)),
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Absent values sort after present ones
fn present_first<T, F>(a: Option<T>, b: Option<T>, both: F, neither: Ordering) -> Ordering
where
    F: FnOnce(T, T) -> Ordering,
{
    match (a, b) {
        (Some(x), Some(y)) => both(x, y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => neither,
    }
}

/// Total order of two tasks under `mode`
pub fn order(a: &Task, b: &Task, mode: SortMode) -> Ordering {
    match mode {
        SortMode::Index => a.index.cmp(&b.index),
        SortMode::Project => match (a.project.as_deref(), b.project.as_deref()) {
            (None, None) => order(a, b, SortMode::Index),
            (pa, pb) => present_first(
                pa,
                pb,
                |x, y| x.cmp(y).then_with(|| order(a, b, SortMode::Index)),
                Ordering::Equal,
            ),
        },
        SortMode::Due => match (a.due, b.due) {
            (None, None) => order(a, b, SortMode::Priority),
            (da, db) => present_first(da, db, |x, y| x.cmp(&y), Ordering::Equal),
        },
        SortMode::Priority => match (a.priority, b.priority) {
            (None, None) => order(a, b, SortMode::Project),
            (pa, pb) => present_first(
                pa,
                pb,
                |x, y| x.cmp(&y).then_with(|| order(a, b, SortMode::Project)),
                Ordering::Equal,
            ),
        },
    }
}

/// True when `b` must sort before `a`
pub fn compare(a: &Task, b: &Task, mode: SortMode) -> bool {
    order(a, b, mode) == Ordering::Greater
}

/// Sort the whole chain that `start` belongs to, from `start` to its tail
pub fn sort(list: &mut TaskList, start: NodeId, mode: SortMode) {
    let last = list.tail_from(start);
    sort_range(list, start, last, mode);
}

/// Sort the list from its head
pub fn sort_all(list: &mut TaskList, mode: SortMode) {
    if let Some(head) = list.head() {
        sort(list, head, mode);
    }
}

/// Sort the nodes `first..=last` in place by exchanging task payloads.
///
/// Single-pivot partition: the pivot is `first`'s task. Every node after it
/// that must sort before the pivot is swapped into the left partition, then
/// the pivot is swapped onto the partition point and both sides are sorted.
/// The smaller side recurses and the larger side loops, so stack depth stays
/// logarithmic even on already-sorted input.
pub fn sort_range(list: &mut TaskList, mut first: NodeId, mut last: NodeId, mode: SortMode) {
    while first != last {
        let mut boundary = first;
        let mut left = 0usize;
        let mut right = 0usize;
        let mut cur = first;

        while cur != last {
            let Some(next) = list.next(cur) else {
                break;
            };
            cur = next;
            if compare(list.task(first), list.task(cur), mode) {
                boundary = match list.next(boundary) {
                    Some(b) => b,
                    None => break,
                };
                list.swap_contents(boundary, cur);
                left += 1;
            } else {
                right += 1;
            }
        }

        list.swap_contents(first, boundary);

        let left_range = list
            .prev(boundary)
            .filter(|_| boundary != first)
            .map(|end| (first, end));
        let right_range = list
            .next(boundary)
            .filter(|_| boundary != last)
            .map(|start| (start, last));

        let (smaller, larger) = if left <= right {
            (left_range, right_range)
        } else {
            (right_range, left_range)
        };
        if let Some((lo, hi)) = smaller {
            sort_range(list, lo, hi, mode);
        }
        match larger {
            Some((lo, hi)) => {
                first = lo;
                last = hi;
            }
            None => break,
        }
    }
}
