// Copyright 2025 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Attribute-based segmentation for [`AttributedText`].
//!
//! Every attribute kind is stored as its own set of runs. This module merges the run boundaries
//! of all kinds into non-overlapping, contiguous segments over which the resolved attribute set
//! is constant.

use alloc::vec::Vec;
use core::ops::Range;

use crate::{clamp_range, AttributedText, Attributes};

/// Iterator over contiguous attribute segments of an [`AttributedText`].
///
/// Each yielded item is a non-empty byte range and the attributes in effect over all of it.
///
/// # Examples
///
/// ```
/// use attributed_text::AttributedText;
/// use peniko::color::palette;
///
/// let mut text = AttributedText::new("hello");
/// text.set_color(0..2, palette::css::RED).unwrap();
/// text.set_kerning(1..5, 0.5).unwrap();
///
/// let ranges: Vec<_> = text.attribute_runs(0..5).map(|(range, _)| range).collect();
/// assert_eq!(ranges, [0..1, 1..2, 2..5]);
/// ```
#[derive(Clone, Debug)]
pub struct AttributeSegments<'a> {
    text: &'a AttributedText,
    boundaries: Vec<usize>,
    index: usize,
}

impl<'a> AttributeSegments<'a> {
    pub(crate) fn new(text: &'a AttributedText, range: Range<usize>) -> Self {
        let range = clamp_range(range, text.len());
        let mut boundaries = Vec::new();
        if !range.is_empty() {
            boundaries.push(range.start);
            text.store().boundaries_within(&range, &mut boundaries);
            boundaries.push(range.end);
            boundaries.sort_unstable();
            boundaries.dedup();
        }
        Self {
            text,
            boundaries,
            index: 0,
        }
    }

    /// Byte offsets at which the attribute set changes, including both ends of the range.
    pub fn boundaries(&self) -> &[usize] {
        &self.boundaries
    }
}

impl Iterator for AttributeSegments<'_> {
    type Item = (Range<usize>, Attributes);

    fn next(&mut self) -> Option<Self::Item> {
        let start = *self.boundaries.get(self.index)?;
        let end = *self.boundaries.get(self.index + 1)?;
        self.index += 1;
        let (attributes, _) = self.text.attributes_at(start);
        Some((start..end, attributes))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.boundaries.len().saturating_sub(self.index + 1);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for AttributeSegments<'_> {}
