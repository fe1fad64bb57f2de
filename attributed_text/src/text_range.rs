// Copyright 2025 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::ops::Range;

use crate::{Endpoint, Error};

/// Checks that `range` is ordered, in bounds and on `char` boundaries of `text`.
#[inline]
pub(crate) fn validate_range(text: &str, range: &Range<usize>) -> Result<(), Error> {
    let text_len = text.len();
    if range.start > range.end {
        return Err(Error::invalid_range(range.start, range.end, text_len));
    }
    if range.end > text_len {
        return Err(Error::out_of_range(range.start, range.end, text_len));
    }
    if !text.is_char_boundary(range.start) {
        return Err(Error::not_on_char_boundary(
            text,
            range.start,
            range.end,
            Endpoint::Start,
            range.start,
        ));
    }
    if !text.is_char_boundary(range.end) {
        return Err(Error::not_on_char_boundary(
            text,
            range.start,
            range.end,
            Endpoint::End,
            range.end,
        ));
    }
    Ok(())
}

/// Returns the largest `char` boundary of `text` that is `<= index`, clamping to the text length.
pub fn floor_char_boundary(text: &str, index: usize) -> usize {
    if index >= text.len() {
        return text.len();
    }
    let mut index = index;
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

/// Clamps `range` into `0..len`, reordering reversed endpoints.
pub fn clamp_range(range: Range<usize>, len: usize) -> Range<usize> {
    let (start, end) = if range.start <= range.end {
        (range.start, range.end)
    } else {
        (range.end, range.start)
    };
    start.min(len)..end.min(len)
}

/// The overlap of two ranges, or `None` if they do not overlap.
///
/// An empty range overlaps a range that strictly contains its position.
pub fn intersect(a: &Range<usize>, b: &Range<usize>) -> Option<Range<usize>> {
    let start = a.start.max(b.start);
    let end = a.end.min(b.end);
    if start < end {
        return Some(start..end);
    }
    if start == end && ((a.start < start && start < a.end) || (b.start < start && start < b.end)) {
        return Some(start..end);
    }
    None
}

/// Returns `true` if `index` is inside `range`.
///
/// Unlike [`Range::contains`], the end of a non-empty range counts as inside when it is also the
/// end of the text, so a caret after the last character still belongs to the final range.
pub fn range_contains_index(range: &Range<usize>, index: usize, text_len: usize) -> bool {
    range.contains(&index) || (index == range.end && index == text_len && !range.is_empty())
}
