use crate::model::filter::FilterSpec;
use crate::model::task::Task;

/// Handle to a node in a [`TaskList`]. Stable for the lifetime of the list.
pub type NodeId = usize;

#[derive(Debug, Clone)]
struct Node {
    task: Task,
    prev: Option<NodeId>,
    next: Option<NodeId>,
}

/// Doubly linked sequence of tasks stored in an arena.
///
/// Links never change after construction: reordering moves task payloads
/// between nodes (see [`TaskList::swap_contents`]), so a `NodeId` always names
/// the same position in the chain. The list also owns the active filter chain,
/// oldest filter first.
#[derive(Debug, Clone, Default)]
pub struct TaskList {
    nodes: Vec<Node>,
    head: Option<NodeId>,
    filters: Vec<FilterSpec>,
}

impl TaskList {
    pub fn new() -> Self {
        TaskList::default()
    }

    /// Link tasks in the given order
    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        let count = tasks.len();
        let nodes = tasks
            .into_iter()
            .enumerate()
            .map(|(i, task)| Node {
                task,
                prev: i.checked_sub(1),
                next: if i + 1 < count { Some(i + 1) } else { None },
            })
            .collect();
        TaskList {
            nodes,
            head: if count > 0 { Some(0) } else { None },
            filters: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn head(&self) -> Option<NodeId> {
        self.head
    }

    /// Last node of the chain
    pub fn tail(&self) -> Option<NodeId> {
        self.head.map(|h| self.tail_from(h))
    }

    /// Follow `next` links from `start` to the end of the chain
    pub fn tail_from(&self, start: NodeId) -> NodeId {
        let mut last = start;
        while let Some(next) = self.nodes[last].next {
            last = next;
        }
        last
    }

    pub fn next(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|n| n.next)
    }

    pub fn prev(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|n| n.prev)
    }

    pub fn get(&self, id: NodeId) -> Option<&Task> {
        self.nodes.get(id).map(|n| &n.task)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Task> {
        self.nodes.get_mut(id).map(|n| &mut n.task)
    }

    /// Task at `id`. Panics on a handle from another list.
    pub fn task(&self, id: NodeId) -> &Task {
        &self.nodes[id].task
    }

    /// Exchange the payloads of two nodes, leaving the links in place
    pub fn swap_contents(&mut self, a: NodeId, b: NodeId) {
        if a == b {
            return;
        }
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        let (left, right) = self.nodes.split_at_mut(hi);
        std::mem::swap(&mut left[lo].task, &mut right[0].task);
    }

    /// Walk the chain from the head
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            list: self,
            cursor: self.head,
        }
    }

    /// Number of tasks passing the current filter chain
    pub fn visible_count(&self) -> usize {
        self.iter().filter(|(_, t)| t.visible).count()
    }

    // --- Active filter chain ---

    /// Active filters, oldest first
    pub fn filters(&self) -> &[FilterSpec] {
        &self.filters
    }

    pub fn push_filter(&mut self, spec: FilterSpec) {
        self.filters.push(spec);
    }

    /// Replace the chain with a single filter
    pub fn replace_filters(&mut self, spec: FilterSpec) {
        self.filters.clear();
        self.filters.push(spec);
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
    }

    /// Take the chain out of the list, leaving it empty
    pub fn take_filters(&mut self) -> Vec<FilterSpec> {
        std::mem::take(&mut self.filters)
    }

    pub fn set_filters(&mut self, filters: Vec<FilterSpec>) {
        self.filters = filters;
    }
}

/// Chain-order iterator over `(NodeId, &Task)`
pub struct Iter<'a> {
    list: &'a TaskList,
    cursor: Option<NodeId>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (NodeId, &'a Task);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cursor?;
        let node = &self.list.nodes[id];
        self.cursor = node.next;
        Some((id, &node.task))
    }
}
