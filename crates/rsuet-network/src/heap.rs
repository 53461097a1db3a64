//! Indexed binary min-heap with O(log n) `decrease_key`.
//!
//! A plain `BinaryHeap` cannot update a key in place; relaxing an edge to an
//! already-queued node means either pushing a stale duplicate (and skipping
//! it later, cheap but still allocates and re-sorts extra entries) or
//! removing and re-inserting (O(n) scan to find the entry). This heap tracks
//! each node's slot with a `position` side array, so a relax is a single
//! `decrease_key` call that sifts up in O(log n).

use rsuet_core::NodeIdx;

const ABSENT: u32 = u32::MAX;

/// Binary min-heap over `(key, NodeIdx)` pairs keyed by `f64`, with O(log n)
/// `insert`, `extract_min`, and `decrease_key`.
pub struct IndexedHeap {
    /// Heap array of node ids; `heap[0]` is the current minimum.
    heap: Vec<NodeIdx>,
    /// `keys[node]` is that node's current priority, valid only while
    /// `position[node] != ABSENT`.
    keys: Vec<f64>,
    /// `position[node]` is `node`'s slot in `heap`, or `ABSENT` if not queued.
    position: Vec<u32>,
}

impl IndexedHeap {
    /// Create an empty heap sized for `node_count` possible entries.
    pub fn new(node_count: usize) -> Self {
        Self {
            heap: Vec::with_capacity(node_count),
            keys: vec![f64::INFINITY; node_count],
            position: vec![ABSENT; node_count],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Empty the heap while keeping its allocated capacity, so a workspace
    /// can run Dijkstra from a new origin without reallocating `heap` or
    /// `position`.
    pub fn clear(&mut self) {
        self.heap.clear();
        self.keys.fill(f64::INFINITY);
        self.position.fill(ABSENT);
    }

    pub fn contains(&self, node: NodeIdx) -> bool {
        self.position[node.index()] != ABSENT
    }

    /// Insert `node` with priority `key`. `node` must not already be queued.
    pub fn insert(&mut self, node: NodeIdx, key: f64) {
        debug_assert!(!self.contains(node));
        let slot = self.heap.len() as u32;
        self.heap.push(node);
        self.keys[node.index()] = key;
        self.position[node.index()] = slot;
        self.sift_up(slot);
    }

    /// Lower `node`'s priority to `key`. `node` must already be queued and
    /// `key` must be `<=` its current priority.
    pub fn decrease_key(&mut self, node: NodeIdx, key: f64) {
        debug_assert!(self.contains(node));
        debug_assert!(key <= self.keys[node.index()]);
        self.keys[node.index()] = key;
        self.sift_up(self.position[node.index()]);
    }

    /// Remove and return the node with the smallest key, or `None` if empty.
    pub fn extract_min(&mut self) -> Option<(NodeIdx, f64)> {
        if self.heap.is_empty() {
            return None;
        }
        let min = self.heap[0];
        let min_key = self.keys[min.index()];
        self.position[min.index()] = ABSENT;

        let last = self.heap.pop().unwrap();
        if !self.heap.is_empty() {
            self.heap[0] = last;
            self.position[last.index()] = 0;
            self.sift_down(0);
        }
        Some((min, min_key))
    }

    fn sift_up(&mut self, mut i: u32) {
        while i > 0 {
            let parent = (i - 1) / 2;
            if self.keys[self.heap[parent as usize].index()] <= self.keys[self.heap[i as usize].index()] {
                break;
            }
            self.swap(i, parent);
            i = parent;
        }
    }

    fn sift_down(&mut self, mut i: u32) {
        let n = self.heap.len() as u32;
        loop {
            let left = 2 * i + 1;
            let right = 2 * i + 2;
            let mut smallest = i;
            if left < n && self.keys[self.heap[left as usize].index()] < self.keys[self.heap[smallest as usize].index()] {
                smallest = left;
            }
            if right < n && self.keys[self.heap[right as usize].index()] < self.keys[self.heap[smallest as usize].index()] {
                smallest = right;
            }
            if smallest == i {
                break;
            }
            self.swap(i, smallest);
            i = smallest;
        }
    }

    fn swap(&mut self, i: u32, j: u32) {
        self.heap.swap(i as usize, j as usize);
        self.position[self.heap[i as usize].index()] = i;
        self.position[self.heap[j as usize].index()] = j;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_in_ascending_order() {
        let mut h = IndexedHeap::new(5);
        h.insert(NodeIdx(0), 5.0);
        h.insert(NodeIdx(1), 1.0);
        h.insert(NodeIdx(2), 3.0);
        h.insert(NodeIdx(3), 2.0);

        let mut out = Vec::new();
        while let Some((n, k)) = h.extract_min() {
            out.push((n, k));
        }
        assert_eq!(out, vec![(NodeIdx(1), 1.0), (NodeIdx(3), 2.0), (NodeIdx(2), 3.0), (NodeIdx(0), 5.0)]);
    }

    #[test]
    fn clear_allows_reuse_without_reallocating() {
        let mut h = IndexedHeap::new(3);
        h.insert(NodeIdx(0), 10.0);
        h.insert(NodeIdx(1), 20.0);
        h.clear();
        assert!(h.is_empty());
        assert!(!h.contains(NodeIdx(0)));
        assert!(!h.contains(NodeIdx(1)));

        h.insert(NodeIdx(2), 1.0);
        assert_eq!(h.extract_min(), Some((NodeIdx(2), 1.0)));
    }

    #[test]
    fn decrease_key_reorders() {
        let mut h = IndexedHeap::new(3);
        h.insert(NodeIdx(0), 10.0);
        h.insert(NodeIdx(1), 20.0);
        h.decrease_key(NodeIdx(1), 1.0);
        assert_eq!(h.extract_min(), Some((NodeIdx(1), 1.0)));
        assert_eq!(h.extract_min(), Some((NodeIdx(0), 10.0)));
    }
}
