//! Bounded heap keeping the K best scored values seen so far.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// Upper bound on heap slots reserved up front; larger heaps grow on demand.
const MAX_HEAP_PREALLOC: usize = 65_536;

/// Heap entry ordered by score, then by earlier arrival.
///
/// A greater entry is a better one: higher score, or equal score with a
/// smaller sequence number.
struct Entry<T> {
    score: f64,
    seq: u64,
    value: T,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
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
        self.score
            .total_cmp(&other.score)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// A bounded min-heap that keeps the top-K values by score.
///
/// Memory is O(K) regardless of how many values are offered. Values are tagged
/// with a monotonically increasing sequence number on arrival, so ties never
/// compare the payload.
pub struct BoundedTopK<T> {
    heap: BinaryHeap<Reverse<Entry<T>>>,
    capacity: usize,
    next_seq: u64,
}

impl<T> BoundedTopK<T> {
    /// Create a heap keeping at most `capacity` values.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(capacity.min(MAX_HEAP_PREALLOC)),
            capacity,
            next_seq: 0,
        }
    }

    /// Offer a scored value and return whether it was kept.
    ///
    /// Once full, the current minimum is replaced only by a strictly greater score.
    pub fn offer(&mut self, score: f64, value: T) -> bool {
        let seq = self.next_seq;
        self.next_seq += 1;

        if self.heap.len() < self.capacity {
            self.heap.push(Reverse(Entry { score, seq, value }));
            return true;
        }

        match self.heap.peek_mut() {
            Some(mut min) if score > min.0.score => {
                *min = Reverse(Entry { score, seq, value });
                true
            }
            _ => false,
        }
    }

    /// Lowest kept score.
    #[must_use]
    pub fn min_score(&self) -> Option<f64> {
        self.heap.peek().map(|min| min.0.score)
    }

    /// Number of kept values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Whether nothing is kept.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Maximum number of kept values.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of values offered so far.
    #[must_use]
    pub const fn offered(&self) -> u64 {
        self.next_seq
    }

    /// Kept values, best first; equal scores keep arrival order.
    #[must_use]
    pub fn into_sorted_desc(self) -> Vec<(f64, T)> {
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|Reverse(entry)| (entry.score, entry.value))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores<T>(heap: BoundedTopK<T>) -> Vec<f64> {
        heap.into_sorted_desc().into_iter().map(|(score, _)| score).collect()
    }

    #[test]
    fn test_empty_heap() {
        let heap: BoundedTopK<()> = BoundedTopK::with_capacity(3);
        assert!(heap.is_empty());
        assert_eq!(heap.min_score(), None);
        assert!(heap.into_sorted_desc().is_empty());
    }

    #[test]
    fn test_fewer_than_capacity() {
        let mut heap = BoundedTopK::with_capacity(10);
        for i in 1..=5 {
            assert!(heap.offer(f64::from(i), i));
        }
        assert_eq!(heap.len(), 5);
        assert_eq!(scores(heap), vec![5.0, 4.0, 3.0, 2.0, 1.0]);
    }

    #[test]
    fn test_keeps_largest() {
        let mut heap = BoundedTopK::with_capacity(5);
        for i in [1, 5, 3, 8, 2, 9, 4, 7, 6, 10] {
            heap.offer(f64::from(i), i);
        }
        assert_eq!(heap.min_score(), Some(6.0));
        assert_eq!(scores(heap), vec![10.0, 9.0, 8.0, 7.0, 6.0]);
    }

    #[test]
    fn test_bounded_size() {
        let mut heap = BoundedTopK::with_capacity(100);
        for i in 0..2_000_u32 {
            heap.offer(f64::from(i % 256), i);
        }
        assert_eq!(heap.len(), 100);
        assert_eq!(heap.offered(), 2_000);
    }

    #[test]
    fn test_equal_score_does_not_replace_min() {
        let mut heap = BoundedTopK::with_capacity(2);
        assert!(heap.offer(1.0, "first"));
        assert!(heap.offer(1.0, "second"));
        assert!(!heap.offer(1.0, "third"));
        let kept: Vec<&str> = heap.into_sorted_desc().into_iter().map(|(_, v)| v).collect();
        assert_eq!(kept, vec!["first", "second"]);
    }

    #[test]
    fn test_ties_keep_arrival_order() {
        let mut heap = BoundedTopK::with_capacity(4);
        heap.offer(2.0, 'a');
        heap.offer(3.0, 'b');
        heap.offer(2.0, 'c');
        heap.offer(3.0, 'd');
        let kept: Vec<char> = heap.into_sorted_desc().into_iter().map(|(_, v)| v).collect();
        assert_eq!(kept, vec!['b', 'd', 'a', 'c']);
    }

    #[test]
    fn test_huge_capacity_grows_on_demand() {
        let mut heap = BoundedTopK::with_capacity(usize::MAX);
        for i in 0..3 {
            assert!(heap.offer(f64::from(i), i));
        }
        assert_eq!(heap.capacity(), usize::MAX);
        assert_eq!(scores(heap), vec![2.0, 1.0, 0.0]);
    }

    #[test]
    fn test_zero_capacity_keeps_nothing() {
        let mut heap = BoundedTopK::with_capacity(0);
        assert!(!heap.offer(1.0, ()));
        assert!(heap.is_empty());
    }
}
