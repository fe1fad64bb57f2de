// Copyright 2025 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Storage for one attribute over the text: sorted, non-overlapping, non-empty runs.

use alloc::vec::Vec;
use core::ops::Range;

/// How runs react when the text under them is edited.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum EditPolicy {
    /// Runs stretch, shrink and split with the text.
    Splittable,
    /// Runs are never split: an edit touching a run's interior removes it.
    Atomic,
}

#[derive(Clone, Debug)]
pub(crate) struct Runs<V> {
    runs: Vec<(Range<usize>, V)>,
    policy: EditPolicy,
}

impl<V: Clone> Runs<V> {
    pub(crate) fn new(policy: EditPolicy) -> Self {
        Self {
            runs: Vec::new(),
            policy,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.runs.len()
    }

    pub(crate) fn as_slice(&self) -> &[(Range<usize>, V)] {
        &self.runs
    }

    /// The run containing `index`, if any.
    pub(crate) fn get(&self, index: usize) -> Option<(&Range<usize>, &V)> {
        let ix = self.runs.partition_point(|(range, _)| range.end <= index);
        let (range, value) = self.runs.get(ix)?;
        (range.start <= index).then_some((range, value))
    }

    /// The value at `index` (if any) and the maximal range around `index` over which that answer
    /// does not change, bounded by `len`.
    pub(crate) fn span_at(&self, index: usize, len: usize) -> (Option<&V>, Range<usize>) {
        let ix = self.runs.partition_point(|(range, _)| range.end <= index);
        match self.runs.get(ix) {
            Some((range, value)) if range.start <= index => (Some(value), range.clone()),
            next => {
                let start = ix
                    .checked_sub(1)
                    .map_or(0, |prev| self.runs[prev].0.end);
                let end = next.map_or(len, |(range, _)| range.start);
                (None, start..end.max(start))
            }
        }
    }

    /// Runs intersecting `range`. An empty `range` yields the run strictly containing it.
    pub(crate) fn intersecting(&self, range: &Range<usize>) -> &[(Range<usize>, V)] {
        let lo = self.runs.partition_point(|(r, _)| r.end <= range.start);
        if range.is_empty() {
            return match self.runs.get(lo) {
                Some((r, _)) if r.start < range.start => &self.runs[lo..lo + 1],
                _ => &[],
            };
        }
        let hi = self.runs.partition_point(|(r, _)| r.start < range.end);
        &self.runs[lo..hi.max(lo)]
    }

    /// Sets `value` over `range`, overwriting whatever was there.
    ///
    /// Splittable runs partially covered by `range` are cut at its edges. Atomic runs that
    /// intersect `range` at all are removed whole.
    pub(crate) fn set(&mut self, range: Range<usize>, value: Option<V>) {
        if range.is_empty() {
            return;
        }
        let lo = self.runs.partition_point(|(r, _)| r.end <= range.start);
        let hi = self.runs.partition_point(|(r, _)| r.start < range.end).max(lo);
        let mut replacement = Vec::with_capacity(3);
        if self.policy == EditPolicy::Splittable && lo < hi {
            let (first, first_value) = &self.runs[lo];
            if first.start < range.start {
                replacement.push((first.start..range.start, first_value.clone()));
            }
        }
        let tail = if self.policy == EditPolicy::Splittable && lo < hi {
            let (last, last_value) = &self.runs[hi - 1];
            (last.end > range.end).then(|| (range.end..last.end, last_value.clone()))
        } else {
            None
        };
        if let Some(value) = value {
            replacement.push((range, value));
        }
        replacement.extend(tail);
        self.runs.splice(lo..hi, replacement);
    }

    /// Moves runs to account for `edited` being replaced by `new_len` bytes of text.
    pub(crate) fn adjust_for_edit(&mut self, edited: &Range<usize>, new_len: usize) {
        match self.policy {
            EditPolicy::Splittable => self.adjust_splittable(edited, new_len),
            EditPolicy::Atomic => self.adjust_atomic(edited, new_len),
        }
    }

    /// Replaced text takes the attributes of the first replaced character. Inserted text takes
    /// the attributes of the character before it, or the one after it at the start of the text.
    fn adjust_splittable(&mut self, edited: &Range<usize>, new_len: usize) {
        let (a, b) = (edited.start, edited.end);
        let removed = b - a;
        let map_point = |p: usize| -> usize {
            if edited.is_empty() {
                if p < a || (p == a && a == 0) {
                    p
                } else {
                    p + new_len
                }
            } else if p <= a {
                p
            } else if p >= b {
                p - removed + new_len
            } else {
                a + new_len
            }
        };
        for (range, _) in &mut self.runs {
            *range = map_point(range.start)..map_point(range.end);
        }
        self.runs.retain(|(range, _)| !range.is_empty());
    }

    fn adjust_atomic(&mut self, edited: &Range<usize>, new_len: usize) {
        let (a, b) = (edited.start, edited.end);
        let removed = b - a;
        self.runs.retain_mut(|(range, _)| {
            let touched = if edited.is_empty() {
                range.start < a && a < range.end
            } else {
                range.start < b && a < range.end
            };
            if touched {
                return false;
            }
            if range.start >= b {
                *range = range.start - removed + new_len..range.end - removed + new_len;
            }
            true
        });
    }

    /// Pushes every run boundary strictly inside `range` into `out`.
    pub(crate) fn boundaries_within(&self, range: &Range<usize>, out: &mut Vec<usize>) {
        for (r, _) in self.intersecting(range) {
            if r.start > range.start && r.start < range.end {
                out.push(r.start);
            }
            if r.end > range.start && r.end < range.end {
                out.push(r.end);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{EditPolicy, Runs};

    fn ranges<V: Clone>(runs: &Runs<V>) -> Vec<core::ops::Range<usize>> {
        runs.as_slice().iter().map(|(r, _)| r.clone()).collect()
    }

    #[test]
    fn splittable_set_cuts_neighbors() {
        let mut runs = Runs::new(EditPolicy::Splittable);
        runs.set(0..10, Some('a'));
        runs.set(3..6, Some('b'));
        assert_eq!(ranges(&runs), vec![0..3, 3..6, 6..10]);
        assert_eq!(runs.get(4).map(|(_, v)| *v), Some('b'));
        assert_eq!(runs.get(7).map(|(_, v)| *v), Some('a'));
        runs.set(2..8, None);
        assert_eq!(ranges(&runs), vec![0..2, 8..10]);
    }

    #[test]
    fn atomic_set_removes_whole_runs() {
        let mut runs = Runs::new(EditPolicy::Atomic);
        runs.set(0..4, Some(1));
        runs.set(6..10, Some(2));
        runs.set(3..7, Some(3));
        assert_eq!(ranges(&runs), vec![3..7]);
        runs.set(5..5, None);
        assert_eq!(runs.len(), 1);
        runs.set(6..8, None);
        assert_eq!(runs.len(), 0);
    }

    #[test]
    fn span_at_reports_gaps() {
        let mut runs = Runs::new(EditPolicy::Splittable);
        runs.set(2..4, Some(()));
        runs.set(6..8, Some(()));
        assert_eq!(runs.span_at(0, 10), (None, 0..2));
        assert_eq!(runs.span_at(3, 10).1, 2..4);
        assert_eq!(runs.span_at(5, 10), (None, 4..6));
        assert_eq!(runs.span_at(9, 10), (None, 8..10));
    }

    #[test]
    fn insertion_inherits_preceding_run() {
        let mut runs = Runs::new(EditPolicy::Splittable);
        runs.set(0..3, Some('a'));
        runs.set(3..6, Some('b'));
        runs.adjust_for_edit(&(3..3), 2);
        assert_eq!(ranges(&runs), vec![0..5, 5..8]);
        runs.adjust_for_edit(&(0..0), 1);
        assert_eq!(ranges(&runs), vec![0..6, 6..9]);
    }

    #[test]
    fn replacement_inherits_first_replaced_run() {
        let mut runs = Runs::new(EditPolicy::Splittable);
        runs.set(0..3, Some('a'));
        runs.set(3..6, Some('b'));
        runs.set(6..9, Some('c'));
        runs.adjust_for_edit(&(4..7), 1);
        assert_eq!(ranges(&runs), vec![0..3, 3..5, 5..7]);
        assert_eq!(runs.get(4).map(|(_, v)| *v), Some('b'));
        runs.adjust_for_edit(&(0..5), 0);
        assert_eq!(ranges(&runs), vec![0..2]);
        assert_eq!(runs.get(0).map(|(_, v)| *v), Some('c'));
    }

    #[test]
    fn atomic_runs_drop_when_touched() {
        let mut runs = Runs::new(EditPolicy::Atomic);
        runs.set(2..4, Some(1));
        runs.set(6..8, Some(2));
        runs.set(10..12, Some(3));
        // Insert inside the first run.
        runs.adjust_for_edit(&(3..3), 5);
        assert_eq!(ranges(&runs), vec![11..13, 15..17]);
        // Insert exactly at a run start shifts it.
        runs.adjust_for_edit(&(11..11), 1);
        assert_eq!(ranges(&runs), vec![12..14, 16..18]);
        // Delete overlapping the tail of a run drops it.
        runs.adjust_for_edit(&(13..15), 0);
        assert_eq!(ranges(&runs), vec![14..16]);
        // Delete right before a run shifts it.
        runs.adjust_for_edit(&(0..14), 0);
        assert_eq!(ranges(&runs), vec![0..2]);
    }
}
