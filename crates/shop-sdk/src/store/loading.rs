//! Per-operation loading flags.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::hash::Hash;

/// Independent in-flight flags, one per operation kind.
///
/// A flag stays set while at least one operation of that kind runs, so a
/// slow fetch does not hide behind a quick add.
#[derive(Debug)]
pub struct LoadingFlags<Op> {
    in_flight: Mutex<HashMap<Op, usize>>,
}

impl<Op: Copy + Eq + Hash> Default for LoadingFlags<Op> {
    fn default() -> Self {
        Self {
            in_flight: Mutex::new(HashMap::new()),
        }
    }
}

impl<Op: Copy + Eq + Hash> LoadingFlags<Op> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `op` as running until the guard drops.
    pub fn start(&self, op: Op) -> LoadingGuard<'_, Op> {
        *self.in_flight.lock().entry(op).or_insert(0) += 1;
        LoadingGuard { flags: self, op }
    }

    pub fn is_loading(&self, op: Op) -> bool {
        self.in_flight.lock().get(&op).is_some_and(|n| *n > 0)
    }

    /// Whether anything at all is running.
    pub fn any(&self) -> bool {
        self.in_flight.lock().values().any(|n| *n > 0)
    }

    fn finish(&self, op: Op) {
        let mut in_flight = self.in_flight.lock();
        if let Some(n) = in_flight.get_mut(&op) {
            *n = n.saturating_sub(1);
            if *n == 0 {
                in_flight.remove(&op);
            }
        }
    }
}

/// Clears its flag on drop, including when the operation's future is
/// dropped mid-flight.
#[must_use = "the flag clears as soon as the guard is dropped"]
#[derive(Debug)]
pub struct LoadingGuard<'a, Op: Copy + Eq + Hash> {
    flags: &'a LoadingFlags<Op>,
    op: Op,
}

impl<Op: Copy + Eq + Hash> Drop for LoadingGuard<'_, Op> {
    fn drop(&mut self) {
        self.flags.finish(self.op);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Op {
        Fetch,
        Add,
    }

    #[test]
    fn test_flags_are_independent() {
        let flags = LoadingFlags::new();
        let fetch = flags.start(Op::Fetch);
        assert!(flags.is_loading(Op::Fetch));
        assert!(!flags.is_loading(Op::Add));
        drop(fetch);
        assert!(!flags.is_loading(Op::Fetch));
        assert!(!flags.any());
    }

    #[test]
    fn test_overlapping_same_op() {
        let flags = LoadingFlags::new();
        let a = flags.start(Op::Add);
        let b = flags.start(Op::Add);
        drop(a);
        assert!(flags.is_loading(Op::Add));
        drop(b);
        assert!(!flags.is_loading(Op::Add));
    }
}
