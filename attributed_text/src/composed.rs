// Copyright 2025 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Composed sequences: atomic substitution records over a range of the text.
//!
//! A composed sequence stands for something that must behave as a single unit (an emoji, a
//! mention token) even though it spans several characters. Every sequence carries three
//! representations:
//!
//! - *display*: what composes the visible run,
//! - *copy*: what a clipboard copy yields,
//! - *length*: what length computations treat the run as.
//!
//! Ranges and indices are normalized through [`ComposedSequenceIndex`] so that no endpoint ever
//! falls strictly inside a sequence.

use alloc::string::String;
use alloc::sync::Arc;
use core::any::Any;
use core::ops::Range;

use crate::runs::Runs;
use crate::{clamp_range, floor_char_boundary};

/// Selects one of the three representations of a [`ComposedSequence`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ReplacementKind {
    /// What the sequence displays as.
    Display,
    /// What copying the sequence yields.
    Copy,
    /// What length computations treat the sequence as.
    Length,
}

/// How [`ComposedSequenceIndex::normalize_range`] moves endpoints out of sequences.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum RangeRounding {
    /// Move each endpoint outward, growing the range.
    #[default]
    Extend,
    /// Move each endpoint inward, shrinking the range.
    Trim,
    /// Move each endpoint to whichever boundary is closer, preferring inward on ties.
    Round,
}

bitflags::bitflags! {
    /// Options for [`ComposedSequenceIndex::enumerate`].
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct EnumerationOptions: u8 {
        /// Visit sequences from the end of the range to its start.
        const REVERSE = 1 << 0;
    }
}

/// An atomic substitution record over a range of an [`AttributedText`](crate::AttributedText).
#[derive(Clone, Debug)]
pub struct ComposedSequence {
    display: String,
    copy: String,
    length: String,
    user_info: Option<Arc<dyn Any + Send + Sync>>,
    confirms_delete_operation: bool,
}

impl ComposedSequence {
    /// Creates a sequence whose three representations are all `replacement`.
    pub fn new(replacement: impl Into<String>) -> Self {
        let replacement = replacement.into();
        Self::with_representations(replacement.clone(), replacement.clone(), replacement)
    }

    /// Creates a sequence with distinct representations.
    pub fn with_representations(
        display: impl Into<String>,
        copy: impl Into<String>,
        length: impl Into<String>,
    ) -> Self {
        Self {
            display: display.into(),
            copy: copy.into(),
            length: length.into(),
            user_info: None,
            confirms_delete_operation: false,
        }
    }

    /// Attaches an opaque payload.
    #[must_use]
    pub fn with_user_info(mut self, user_info: Arc<dyn Any + Send + Sync>) -> Self {
        self.user_info = Some(user_info);
        self
    }

    /// Sets whether deleting the sequence should be confirmed by the user first.
    #[must_use]
    pub fn with_confirms_delete_operation(mut self, confirms: bool) -> Self {
        self.confirms_delete_operation = confirms;
        self
    }

    /// The display representation.
    pub fn display(&self) -> &str {
        &self.display
    }

    /// The copy representation.
    pub fn copy(&self) -> &str {
        &self.copy
    }

    /// The length representation.
    pub fn length(&self) -> &str {
        &self.length
    }

    /// The representation of the given kind.
    pub fn representation(&self, kind: ReplacementKind) -> &str {
        match kind {
            ReplacementKind::Display => &self.display,
            ReplacementKind::Copy => &self.copy,
            ReplacementKind::Length => &self.length,
        }
    }

    /// The opaque payload, if any.
    pub fn user_info(&self) -> Option<&(dyn Any + Send + Sync)> {
        self.user_info.as_deref()
    }

    /// Whether deleting the sequence should be confirmed first.
    pub fn confirms_delete_operation(&self) -> bool {
        self.confirms_delete_operation
    }
}

/// Read-only view over the composed sequences of an
/// [`AttributedText`](crate::AttributedText).
///
/// Obtained from [`AttributedText::composed_sequences`](crate::AttributedText::composed_sequences).
#[derive(Clone, Copy, Debug)]
pub struct ComposedSequenceIndex<'a> {
    text: &'a str,
    runs: &'a Runs<Arc<ComposedSequence>>,
}

impl<'a> ComposedSequenceIndex<'a> {
    pub(crate) fn new(text: &'a str, runs: &'a Runs<Arc<ComposedSequence>>) -> Self {
        Self { text, runs }
    }

    /// Number of sequences.
    pub fn len(&self) -> usize {
        self.runs.len()
    }

    /// Returns `true` if there are no sequences.
    pub fn is_empty(&self) -> bool {
        self.runs.len() == 0
    }

    /// The sequence whose range contains `index`, and that range.
    pub fn sequence_at(&self, index: usize) -> Option<(&'a ComposedSequence, Range<usize>)> {
        let runs: &'a Runs<_> = self.runs;
        runs.get(index).map(|(range, sequence)| (&**sequence, range.clone()))
    }

    /// Every sequence, in index order.
    pub fn iter(&self) -> ComposedSequences<'a> {
        ComposedSequences {
            inner: self.runs.as_slice().iter(),
            reverse: false,
        }
    }

    /// Sequences intersecting `range`, in index order unless [`EnumerationOptions::REVERSE`] is
    /// given. An empty range visits the sequence strictly containing it, if any.
    pub fn enumerate(
        &self,
        range: Range<usize>,
        options: EnumerationOptions,
    ) -> ComposedSequences<'a> {
        let runs: &'a Runs<_> = self.runs;
        ComposedSequences {
            inner: runs.intersecting(&range).iter(),
            reverse: options.contains(EnumerationOptions::REVERSE),
        }
    }

    /// The sequence strictly containing `index`, meaning `index` is neither its start nor its end.
    fn enclosing(&self, index: usize) -> Option<Range<usize>> {
        self.runs
            .get(index)
            .map(|(range, _)| range.clone())
            .filter(|range| range.start < index)
    }

    /// Rebuilds the text with each sequence replaced by its representation of `kind`.
    pub fn extract_text(&self, kind: ReplacementKind) -> String {
        self.extract_text_in_range(0..self.text.len(), kind)
    }

    /// Like [`extract_text`](Self::extract_text), over `range` extended to whole sequences.
    ///
    /// This is what copying a selection produces with [`ReplacementKind::Copy`].
    pub fn extract_text_in_range(&self, range: Range<usize>, kind: ReplacementKind) -> String {
        let range = self.extend_range(range);
        let mut out = String::with_capacity(range.len());
        let mut cursor = range.start;
        for (seq_range, sequence) in self.enumerate(range.clone(), EnumerationOptions::empty()) {
            if seq_range.start > cursor {
                out.push_str(&self.text[cursor..seq_range.start]);
            }
            out.push_str(sequence.representation(kind));
            cursor = seq_range.end;
        }
        if cursor < range.end {
            out.push_str(&self.text[cursor..range.end]);
        }
        out
    }

    /// Moves each endpoint lying inside a sequence outward to that sequence's boundary.
    pub fn extend_range(&self, range: Range<usize>) -> Range<usize> {
        self.normalize_range(range, RangeRounding::Extend)
    }

    /// Moves each endpoint lying inside a sequence inward to that sequence's boundary.
    ///
    /// If the endpoints cross, the result is empty at the lower of the two.
    pub fn trim_range(&self, range: Range<usize>) -> Range<usize> {
        self.normalize_range(range, RangeRounding::Trim)
    }

    /// Moves each endpoint lying inside a sequence to its nearer boundary, inward on ties.
    pub fn round_range(&self, range: Range<usize>) -> Range<usize> {
        self.normalize_range(range, RangeRounding::Round)
    }

    /// Adjusts `range` so that neither endpoint falls strictly inside a sequence.
    ///
    /// The range is first clamped to the text and reordered if backward, and endpoints inside a
    /// character move back to its start. Endpoints are adjusted independently.
    pub fn normalize_range(&self, range: Range<usize>, rounding: RangeRounding) -> Range<usize> {
        let range = clamp_range(range, self.text.len());
        let range = floor_char_boundary(self.text, range.start)
            ..floor_char_boundary(self.text, range.end);
        let start = match self.enclosing(range.start) {
            Some(seq) => {
                let outward = range.start - seq.start;
                let inward = seq.end - range.start;
                match rounding {
                    RangeRounding::Extend => seq.start,
                    RangeRounding::Trim => seq.end,
                    RangeRounding::Round if outward < inward => seq.start,
                    RangeRounding::Round => seq.end,
                }
            }
            None => range.start,
        };
        let end = match self.enclosing(range.end) {
            Some(seq) => {
                let outward = seq.end - range.end;
                let inward = range.end - seq.start;
                match rounding {
                    RangeRounding::Extend => seq.end,
                    RangeRounding::Trim => seq.start,
                    RangeRounding::Round if outward < inward => seq.end,
                    RangeRounding::Round => seq.start,
                }
            }
            None => range.end,
        };
        if start > end {
            end..end
        } else {
            start..end
        }
    }

    /// Moves `index` out of any sequence strictly containing it, to the nearer boundary.
    ///
    /// Ties go to the start of the sequence.
    pub fn round_index(&self, index: usize) -> usize {
        match self.enclosing(index) {
            Some(seq) if index - seq.start <= seq.end - index => seq.start,
            Some(seq) => seq.end,
            None => index,
        }
    }

    /// Returns `true` if `index` does not fall strictly inside a sequence.
    pub fn is_boundary(&self, index: usize) -> bool {
        self.enclosing(index).is_none()
    }

    /// Converts a range in display space (sequences measured by their display representation)
    /// to length space (sequences measured by their length representation).
    pub fn plain_range_from_composed_range(&self, range: Range<usize>) -> Range<usize> {
        self.convert_offset(range.start, ReplacementKind::Display, ReplacementKind::Length)
            ..self.convert_offset(range.end, ReplacementKind::Display, ReplacementKind::Length)
    }

    /// The inverse of [`plain_range_from_composed_range`](Self::plain_range_from_composed_range).
    pub fn composed_range_from_plain_range(&self, range: Range<usize>) -> Range<usize> {
        self.convert_offset(range.start, ReplacementKind::Length, ReplacementKind::Display)
            ..self.convert_offset(range.end, ReplacementKind::Length, ReplacementKind::Display)
    }

    /// Length of the text with every sequence replaced by its representation of `kind`.
    pub fn measured_len(&self, kind: ReplacementKind) -> usize {
        self.iter().fold(self.text.len(), |len, (range, sequence)| {
            len - range.len() + sequence.representation(kind).len()
        })
    }

    /// Maps `offset` from the space where sequences measure as `from` to the space where they
    /// measure as `to`. Offsets inside a sequence snap to its nearer boundary, ties to the start.
    fn convert_offset(&self, offset: usize, from: ReplacementKind, to: ReplacementKind) -> usize {
        // Running shift of each space relative to the underlying text.
        let mut from_shift = 0_isize;
        let mut to_shift = 0_isize;
        for (range, sequence) in self.iter() {
            let from_start = shift(range.start, from_shift);
            let from_len = sequence.representation(from).len();
            let to_start = shift(range.start, to_shift);
            let to_len = sequence.representation(to).len();
            if offset <= from_start {
                break;
            }
            if offset < from_start + from_len {
                return if offset - from_start <= from_start + from_len - offset {
                    to_start
                } else {
                    to_start + to_len
                };
            }
            from_shift += from_len as isize - range.len() as isize;
            to_shift += to_len as isize - range.len() as isize;
        }
        shift(offset, to_shift - from_shift)
    }
}

fn shift(offset: usize, by: isize) -> usize {
    offset.saturating_add_signed(by)
}

impl<'a> IntoIterator for ComposedSequenceIndex<'a> {
    type Item = (Range<usize>, &'a ComposedSequence);
    type IntoIter = ComposedSequences<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over `(range, sequence)` pairs from a [`ComposedSequenceIndex`].
#[derive(Clone, Debug)]
pub struct ComposedSequences<'a> {
    inner: core::slice::Iter<'a, (Range<usize>, Arc<ComposedSequence>)>,
    reverse: bool,
}

impl<'a> Iterator for ComposedSequences<'a> {
    type Item = (Range<usize>, &'a ComposedSequence);

    fn next(&mut self) -> Option<Self::Item> {
        let (range, sequence) = if self.reverse {
            self.inner.next_back()?
        } else {
            self.inner.next()?
        };
        Some((range.clone(), &**sequence))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for ComposedSequences<'_> {}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use proptest::prelude::*;

    use super::{ComposedSequence, EnumerationOptions, RangeRounding, ReplacementKind};
    use crate::AttributedText;

    fn emoji_text() -> AttributedText {
        let mut text = AttributedText::new("Hello 😀world");
        text.set_composed_sequence(
            6..10,
            Some(ComposedSequence::with_representations("😀", "😀", "#")),
        )
        .unwrap();
        text
    }

    /// 20 ASCII bytes with sequences over 2..5, 10..14 and 14..16.
    fn three_sequences() -> AttributedText {
        let mut text = AttributedText::new("abcdefghijklmnopqrst");
        text.set_composed_sequence(2..5, Some(ComposedSequence::new("[one]")))
            .unwrap();
        text.set_composed_sequence(10..14, Some(ComposedSequence::new("2")))
            .unwrap();
        text.set_composed_sequence(14..16, Some(ComposedSequence::new("three")))
            .unwrap();
        text
    }

    #[test]
    fn extracts_each_representation() {
        let text = emoji_text();
        let index = text.composed_sequences();
        let length = index.extract_text(ReplacementKind::Length);
        assert_eq!(length, "Hello #world");
        assert_eq!(length.len(), 12);
        assert_eq!(index.extract_text(ReplacementKind::Copy), "Hello 😀world");
        assert_eq!(index.extract_text(ReplacementKind::Display), "Hello 😀world");
        assert_eq!(index.measured_len(ReplacementKind::Length), 12);
    }

    #[test]
    fn extract_in_range_extends_first() {
        let text = emoji_text();
        let index = text.composed_sequences();
        assert_eq!(
            index.extract_text_in_range(4..8, ReplacementKind::Length),
            "o #"
        );
        assert_eq!(index.extract_text_in_range(10..12, ReplacementKind::Copy), "wo");
    }

    #[test]
    fn endpoints_inside_a_character_move_to_its_start() {
        let text = AttributedText::new("Hello 😀world");
        let index = text.composed_sequences();
        assert_eq!(index.extend_range(0..7), 0..6);
        assert_eq!(index.trim_range(8..12), 6..12);
        assert_eq!(
            index.extract_text_in_range(0..7, ReplacementKind::Copy),
            "Hello "
        );
    }

    #[test]
    fn sequence_at_returns_exact_range() {
        let text = three_sequences();
        let index = text.composed_sequences();
        let (sequence, range) = index.sequence_at(11).unwrap();
        assert_eq!(sequence.display(), "2");
        assert_eq!(range, 10..14);
        assert_eq!(index.sequence_at(14).map(|(_, r)| r), Some(14..16));
        assert!(index.sequence_at(5).is_none());
        assert!(index.sequence_at(20).is_none());
    }

    #[test]
    fn enumerate_in_both_directions() {
        let text = three_sequences();
        let index = text.composed_sequences();
        let forward: Vec<_> = index
            .enumerate(3..15, EnumerationOptions::empty())
            .map(|(r, _)| r)
            .collect();
        assert_eq!(forward, vec![2..5, 10..14, 14..16]);
        let backward: Vec<_> = index
            .enumerate(3..15, EnumerationOptions::REVERSE)
            .map(|(r, _)| r)
            .collect();
        assert_eq!(backward, vec![14..16, 10..14, 2..5]);
        assert_eq!(index.enumerate(5..10, EnumerationOptions::empty()).count(), 0);
        assert_eq!(index.enumerate(12..12, EnumerationOptions::empty()).count(), 1);
    }

    #[test]
    fn set_overwrites_overlapping_sequences() {
        let mut text = three_sequences();
        text.set_composed_sequence(4..11, Some(ComposedSequence::new("big")))
            .unwrap();
        let ranges: Vec<_> = text.composed_sequences().iter().map(|(r, _)| r).collect();
        assert_eq!(ranges, vec![4..11, 14..16]);
        text.set_composed_sequence(0..15, None).unwrap();
        assert!(text.composed_sequences().is_empty());
    }

    #[test]
    fn normalization_modes() {
        let text = three_sequences();
        let index = text.composed_sequences();
        assert_eq!(index.extend_range(3..11), 2..14);
        assert_eq!(index.trim_range(3..11), 5..10);
        // Start is 1 from 2 and 2 from 5; end is 1 from 10 and 3 from 14.
        assert_eq!(index.round_range(3..11), 2..10);
        // Exact tie inside 10..14 at 12 goes inward for both endpoints.
        assert_eq!(index.round_range(12..12), 10..10);
        assert_eq!(index.round_range(0..12), 0..10);
        assert_eq!(index.normalize_range(4..13, RangeRounding::Round), 5..14);
        // Trimming a range inside one sequence collapses to its start.
        assert_eq!(index.trim_range(11..13), 10..10);
        // Endpoints on boundaries are untouched.
        assert_eq!(index.trim_range(2..16), 2..16);
    }

    #[test]
    fn round_index_ties_to_start() {
        let text = three_sequences();
        let index = text.composed_sequences();
        assert_eq!(index.round_index(12), 10);
        assert_eq!(index.round_index(13), 14);
        assert_eq!(index.round_index(11), 10);
        assert_eq!(index.round_index(10), 10);
        assert_eq!(index.round_index(7), 7);
        assert!(index.is_boundary(14));
        assert!(!index.is_boundary(15));
    }

    #[test]
    fn converts_between_display_and_length_space() {
        let text = emoji_text();
        let index = text.composed_sequences();
        // "world" is 10..15 underlying, 10..15 displayed, 7..12 in length space.
        assert_eq!(index.plain_range_from_composed_range(10..15), 7..12);
        assert_eq!(index.composed_range_from_plain_range(7..12), 10..15);
        assert_eq!(index.plain_range_from_composed_range(0..6), 0..6);
        assert_eq!(index.plain_range_from_composed_range(6..10), 6..7);
    }

    #[test]
    fn sequence_carries_payload() {
        let sequence = ComposedSequence::new("@ann")
            .with_user_info(Arc::new(42_u32))
            .with_confirms_delete_operation(true);
        assert!(sequence.confirms_delete_operation());
        assert_eq!(
            sequence.user_info().and_then(|info| info.downcast_ref::<u32>()),
            Some(&42)
        );
    }

    /// Non-overlapping sequence ranges over a 64 byte ASCII text.
    fn arb_sequences() -> impl Strategy<Value = Vec<(std::ops::Range<usize>, String, String)>> {
        prop::collection::vec((0_usize..64, 1_usize..6, "[a-z]{1,4}", "[a-z]{1,4}"), 0..8).prop_map(
            |candidates| {
                let mut taken = [false; 64];
                let mut out = Vec::new();
                for (start, len, display, length) in candidates {
                    let end = (start + len).min(64);
                    if end <= start || taken[start..end].iter().any(|t| *t) {
                        continue;
                    }
                    taken[start..end].iter_mut().for_each(|t| *t = true);
                    out.push((start..end, display, length));
                }
                out.sort_by_key(|(r, _, _)| r.start);
                out
            },
        )
    }

    fn build(sequences: &[(std::ops::Range<usize>, String, String)]) -> AttributedText {
        let mut text = AttributedText::new("x".repeat(64));
        for (range, display, length) in sequences {
            text.set_composed_sequence(
                range.clone(),
                Some(ComposedSequence::with_representations(
                    display.as_str(),
                    display.as_str(),
                    length.as_str(),
                )),
            )
            .unwrap();
        }
        text
    }

    proptest! {
        #[test]
        fn enumerate_returns_inserted_set(sequences in arb_sequences()) {
            let text = build(&sequences);
            let found: Vec<_> = text
                .composed_sequences()
                .enumerate(0..64, EnumerationOptions::empty())
                .map(|(r, _)| r)
                .collect();
            let expected: Vec<_> = sequences.iter().map(|(r, _, _)| r.clone()).collect();
            prop_assert_eq!(found, expected);
        }

        #[test]
        fn normalized_endpoints_never_split(
            sequences in arb_sequences(),
            a in 0_usize..=64,
            b in 0_usize..=64,
        ) {
            let text = build(&sequences);
            let index = text.composed_sequences();
            let range = a.min(b)..a.max(b);
            for rounding in [RangeRounding::Extend, RangeRounding::Trim, RangeRounding::Round] {
                let normalized = index.normalize_range(range.clone(), rounding);
                prop_assert!(index.is_boundary(normalized.start));
                prop_assert!(index.is_boundary(normalized.end));
                prop_assert!(normalized.start <= normalized.end);
            }
            prop_assert!(index.is_boundary(index.round_index(a)));
        }

        #[test]
        fn extend_contains_range_contains_trim(
            sequences in arb_sequences(),
            a in 0_usize..=64,
            b in 0_usize..=64,
        ) {
            let text = build(&sequences);
            let index = text.composed_sequences();
            let range = a.min(b)..a.max(b);
            let extended = index.extend_range(range.clone());
            let trimmed = index.trim_range(range.clone());
            prop_assert!(extended.start <= range.start && range.end <= extended.end);
            prop_assert!(
                trimmed.is_empty() || (range.start <= trimmed.start && trimmed.end <= range.end)
            );
        }

        #[test]
        fn conversion_round_trips(
            sequences in arb_sequences(),
            a in 0_usize..=64,
            b in 0_usize..=64,
        ) {
            let text = build(&sequences);
            let index = text.composed_sequences();
            // Work in display space from boundary-aligned underlying offsets.
            let range = index.extend_range(a.min(b)..a.max(b));
            let composed = index.composed_range_from_plain_range(
                index.plain_range_from_composed_range(
                    to_display(&index, range.start)..to_display(&index, range.end),
                ),
            );
            prop_assert_eq!(
                composed,
                to_display(&index, range.start)..to_display(&index, range.end)
            );
        }
    }

    /// Maps a boundary-aligned underlying offset into display space.
    fn to_display(index: &super::ComposedSequenceIndex<'_>, offset: usize) -> usize {
        index
            .iter()
            .take_while(|(r, _)| r.end <= offset)
            .fold(offset, |o, (r, s)| o - r.len() + s.display().len())
    }
}
