//! Random worker selection.
//!
//! Picks an index into the live worker list uniformly at random. Load is
//! not balanced by occupancy; a busy worker is as likely to be picked as
//! an idle one.

use std::sync::Arc;

use rendergrid_core::RandomSource;

pub struct RandomSelector {
    rng: Arc<dyn RandomSource>,
}

impl RandomSelector {
    pub fn new(rng: Arc<dyn RandomSource>) -> Self {
        Self { rng }
    }

    /// Select an index in `0..count`.
    ///
    /// Returns `None` if count is zero.
    pub fn next(&self, count: usize) -> Option<usize> {
        if count == 0 {
            return None;
        }
        Some(self.rng.index(count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rendergrid_core::SeededRandom;

    fn selector(seed: u64) -> RandomSelector {
        RandomSelector::new(Arc::new(SeededRandom::new(seed)))
    }

    #[test]
    fn zero_count_returns_none() {
        assert_eq!(selector(1).next(0), None);
    }

    #[test]
    fn single_worker_is_always_picked() {
        let sel = selector(2);
        for _ in 0..10 {
            assert_eq!(sel.next(1), Some(0));
        }
    }

    #[test]
    fn every_index_gets_picked() {
        let sel = selector(3);
        let mut seen = [false; 4];
        for _ in 0..200 {
            seen[sel.next(4).unwrap()] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn adapts_to_changing_pool_size() {
        let sel = selector(4);
        for count in [2, 8, 1, 5] {
            for _ in 0..50 {
                assert!(sel.next(count).unwrap() < count);
            }
        }
    }

    #[test]
    fn concurrent_selection_stays_in_range() {
        use std::thread;

        let sel = Arc::new(selector(5));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let sel = sel.clone();
                thread::spawn(move || (0..100).map(|_| sel.next(4).unwrap()).collect::<Vec<_>>())
            })
            .collect();

        let all: Vec<usize> = handles.into_iter().flat_map(|h| h.join().unwrap()).collect();
        assert_eq!(all.len(), 400);
        assert!(all.iter().all(|&idx| idx < 4));
    }
}
