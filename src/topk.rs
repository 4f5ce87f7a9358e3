//! Deterministic top-3 selection over a frequency map.

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap};

/// How many entries [`select_top3`] keeps.
pub const TOP_K: usize = 3;

/// Heap key ordering entries by count, breaking ties by the *smaller* age.
///
/// The reversed age comparison makes a lower age the "greater" key, so the
/// bounded min-heap below evicts the right entry and the drained output is
/// count-descending, age-ascending. Insertion order never matters, which is
/// what makes concurrent merges safe to rank.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct RankKey {
    count: u64,
    age: i64,
}

impl Ord for RankKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.count
            .cmp(&other.count)
            .then_with(|| other.age.cmp(&self.age))
    }
}

impl PartialOrd for RankKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The up-to-three most frequent `(age, count)` pairs of `counts`, most
/// frequent first, equal counts ordered by ascending age.
///
/// Pure function of the map's contents: no hidden state, safe to call
/// repeatedly.
#[must_use]
pub fn select_top3(counts: &HashMap<i64, u64>) -> Vec<(i64, u64)> {
    select_top_k(counts, TOP_K)
}

// Min-heap of size ≤ k via Reverse, so memory stays bounded by k.
fn select_top_k(counts: &HashMap<i64, u64>, k: usize) -> Vec<(i64, u64)> {
    if k == 0 {
        return Vec::new();
    }
    let mut heap: BinaryHeap<Reverse<RankKey>> = BinaryHeap::with_capacity(k + 1);
    for (&age, &count) in counts {
        heap.push(Reverse(RankKey { count, age }));
        if heap.len() > k {
            heap.pop(); // drop smallest
        }
    }
    let mut out = Vec::with_capacity(heap.len());
    while let Some(Reverse(key)) = heap.pop() {
        out.push((key.age, key.count));
    }
    out.reverse(); // highest count first
    out
}

#[cfg(test)]
mod tests {
    use super::RankKey;

    #[test]
    fn higher_count_wins() {
        assert!(RankKey { count: 5, age: 40 } > RankKey { count: 4, age: 1 });
    }

    #[test]
    fn equal_counts_prefer_smaller_age() {
        assert!(RankKey { count: 5, age: 10 } > RankKey { count: 5, age: 11 });
    }
}
