// Copyright 2025 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Unicode segmentation used by line breaking and selection snapping.

use core::ops::Range;

use icu_segmenter::options::{LineBreakOptions, WordBreakInvariantOptions};
use icu_segmenter::{LineSegmenter, WordSegmenter};

use crate::shape::is_line_separator;

/// Byte offsets where a line may be broken, excluding the start and end of `text`.
pub(crate) fn line_break_opportunities(text: &str) -> Vec<usize> {
    if text.is_empty() {
        return Vec::new();
    }
    LineSegmenter::new_auto(LineBreakOptions::default())
        .segment_str(text)
        .filter(|&ix| ix != 0 && ix != text.len())
        .collect()
}

/// The word (or run of non-word characters) around `index`.
pub(crate) fn word_range_at(text: &str, index: usize) -> Range<usize> {
    if text.is_empty() {
        return 0..0;
    }
    let index = index.min(text.len());
    let mut start = 0;
    let segmenter = WordSegmenter::new_auto(WordBreakInvariantOptions::default());
    for boundary in segmenter.segment_str(text) {
        if boundary > index || (boundary == index && index == text.len()) {
            return start..boundary;
        }
        start = boundary;
    }
    start..text.len()
}

/// The paragraph around `index`, excluding its terminating separator.
pub(crate) fn paragraph_range_at(text: &str, index: usize) -> Range<usize> {
    let index = index.min(text.len());
    let start = text[..index]
        .char_indices()
        .rev()
        .find(|&(_, c)| is_separator_char(c))
        .map_or(0, |(ix, c)| ix + c.len_utf8());
    let end = text[index..]
        .char_indices()
        .find(|&(_, c)| is_separator_char(c))
        .map_or(text.len(), |(ix, _)| index + ix);
    start..end.max(start)
}

fn is_separator_char(c: char) -> bool {
    let mut buf = [0; 4];
    is_line_separator(c.encode_utf8(&mut buf))
}
