use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// Which end of the cost range the queue hands out first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrontierOrder {
    #[default]
    LowestCostFirst,
    HighestCostFirst,
}

struct Entry<T> {
    rank: Reverse<(usize, u64)>,
    priority: usize,
    item: T,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.rank == other.rank
    }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank.cmp(&other.rank)
    }
}

/// A binary-heap priority queue. Items with equal priority come out in
/// insertion order, so a search driven by it is deterministic.
pub struct PriorityQueue<T> {
    heap: BinaryHeap<Entry<T>>,
    order: FrontierOrder,
    next_seq: u64,
}

impl<T> PriorityQueue<T> {
    pub fn new(order: FrontierOrder) -> Self {
        Self {
            heap: BinaryHeap::new(),
            order,
            next_seq: 0,
        }
    }

    pub fn push(&mut self, priority: usize, item: T) {
        let key = match self.order {
            FrontierOrder::LowestCostFirst => priority,
            FrontierOrder::HighestCostFirst => usize::MAX - priority,
        };
        self.heap.push(Entry {
            rank: Reverse((key, self.next_seq)),
            priority,
            item,
        });
        self.next_seq += 1;
    }

    /// Remove the best item along with its priority.
    pub fn pop(&mut self) -> Option<(usize, T)> {
        self.heap.pop().map(|entry| (entry.priority, entry.item))
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
        self.next_seq = 0;
    }
}

impl<T> Default for PriorityQueue<T> {
    fn default() -> Self {
        Self::new(FrontierOrder::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_pop_single() {
        let mut pq = PriorityQueue::default();
        pq.push(10, "hello");
        assert_eq!(pq.pop(), Some((10, "hello")));
        assert_eq!(pq.pop(), None);
    }

    #[test]
    fn test_push_pop_ordered() {
        let mut pq = PriorityQueue::default();
        pq.push(10, "low");
        pq.push(5, "lower");
        pq.push(15, "high");

        assert_eq!(pq.pop(), Some((5, "lower")));
        assert_eq!(pq.pop(), Some((10, "low")));
        assert_eq!(pq.pop(), Some((15, "high")));
        assert_eq!(pq.pop(), None);
    }

    #[test]
    fn test_push_pop_same_priority() {
        let mut pq = PriorityQueue::default();
        pq.push(10, "first");
        pq.push(10, "second");
        pq.push(10, "third");

        assert_eq!(pq.pop(), Some((10, "first")));
        assert_eq!(pq.pop(), Some((10, "second")));
        assert_eq!(pq.pop(), Some((10, "third")));
        assert_eq!(pq.pop(), None);
    }

    #[test]
    fn test_push_pop_mixed() {
        let mut pq = PriorityQueue::default();
        pq.push(100, "a");
        pq.push(50, "b");
        assert_eq!(pq.pop(), Some((50, "b")));
        pq.push(25, "c");
        pq.push(75, "d");
        assert_eq!(pq.pop(), Some((25, "c")));
        assert_eq!(pq.pop(), Some((75, "d")));
        assert_eq!(pq.pop(), Some((100, "a")));
    }

    #[test]
    fn test_highest_cost_first() {
        let mut pq = PriorityQueue::new(FrontierOrder::HighestCostFirst);
        pq.push(0, "min");
        pq.push(usize::MAX, "max");
        pq.push(2000, "mid");
        pq.push(2000, "mid again");

        assert_eq!(pq.pop(), Some((usize::MAX, "max")));
        assert_eq!(pq.pop(), Some((2000, "mid")));
        assert_eq!(pq.pop(), Some((2000, "mid again")));
        assert_eq!(pq.pop(), Some((0, "min")));
    }

    #[test]
    fn test_len_and_clear() {
        let mut pq = PriorityQueue::default();
        assert!(pq.is_empty());
        pq.push(3, 'a');
        pq.push(1, 'b');
        assert_eq!(pq.len(), 2);
        pq.clear();
        assert!(pq.is_empty());
        assert_eq!(pq.pop(), None);
    }

    #[test]
    fn test_empty_queue() {
        let mut pq: PriorityQueue<i32> = PriorityQueue::default();
        assert_eq!(pq.pop(), None);
    }
}
