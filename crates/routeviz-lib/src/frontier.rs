use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use crate::graph::NodeId;

#[derive(Copy, Clone, Debug, Default)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Entry popped from the frontier.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FrontierEntry {
    pub node: NodeId,
    priority: FloatOrd,
    cost: FloatOrd,
    seq: u64,
}

impl FrontierEntry {
    /// Score the frontier is ordered by (`f` for A*, `g` for Dijkstra).
    pub fn priority(&self) -> f64 {
        self.priority.0
    }

    /// Cost-from-start recorded when the entry was pushed.
    pub fn cost(&self) -> f64 {
        self.cost.0
    }
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering so BinaryHeap becomes a min-heap: lowest priority,
        // then lowest cost, then earliest insertion.
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.cost.cmp(&self.cost))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Min-priority set of open nodes with decrease-key by re-insertion.
///
/// Pushing a node that is already open supersedes its previous entry; the old
/// heap entry stays behind and is skipped when it surfaces.
#[derive(Debug, Default)]
pub struct PriorityFrontier {
    heap: BinaryHeap<FrontierEntry>,
    live: HashMap<NodeId, u64>,
    next_seq: u64,
}

impl PriorityFrontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `node`, or update its priority if it is already open.
    pub fn push(&mut self, node: NodeId, priority: f64, cost: f64) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.live.insert(node, seq);
        self.heap.push(FrontierEntry {
            node,
            priority: FloatOrd(priority),
            cost: FloatOrd(cost),
            seq,
        });
    }

    /// Remove and return the open node with the lowest priority.
    pub fn pop(&mut self) -> Option<FrontierEntry> {
        while let Some(entry) = self.heap.pop() {
            if self.live.get(&entry.node) == Some(&entry.seq) {
                self.live.remove(&entry.node);
                return Some(entry);
            }
        }
        None
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.live.contains_key(&node)
    }

    /// Number of open nodes (superseded entries are not counted).
    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Drop every entry and restart insertion numbering.
    pub fn clear(&mut self) {
        self.heap.clear();
        self.live.clear();
        self.next_seq = 0;
    }
}
