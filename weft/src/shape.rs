// Copyright 2025 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The boundary to the text shaping engine.

use core::ops::Range;

use icu_segmenter::GraphemeClusterSegmenter;
use text_primitives::{Font, FontMetrics};

/// One shaped cluster: the smallest unit the layout can position or break between.
#[derive(Clone, Debug, PartialEq)]
pub struct ShapedCluster {
    /// Byte range of the cluster in the shaped text.
    pub range: Range<usize>,
    /// Horizontal advance.
    pub advance: f32,
}

/// A text shaping engine.
///
/// The layout hands the shaper runs of text with a uniform font and receives clusters back. The
/// shaper owns everything font-specific: fallback, glyph selection, advances and metrics.
pub trait Shaper {
    /// Metrics of `font` at its size.
    fn metrics(&self, font: &Font) -> FontMetrics;

    /// Shapes `text` with `font`, appending one entry per cluster to `out`.
    ///
    /// Cluster ranges are relative to `text`, cover it contiguously and never split a grapheme.
    fn shape(&self, text: &str, font: &Font, out: &mut Vec<ShapedCluster>);
}

/// A shaper that gives every grapheme cluster the same advance.
///
/// All measurements are ratios of the font size, which makes the resulting geometry exact and
/// independent of installed fonts. Line separators have no advance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedAdvanceShaper {
    /// Advance of one grapheme, in ems.
    pub advance: f32,
    /// Ascent, in ems.
    pub ascent: f32,
    /// Descent, in ems.
    pub descent: f32,
    /// Leading, in ems.
    pub leading: f32,
}

impl Default for FixedAdvanceShaper {
    fn default() -> Self {
        Self {
            advance: 0.5,
            ascent: 0.75,
            descent: 0.25,
            leading: 0.0,
        }
    }
}

impl Shaper for FixedAdvanceShaper {
    fn metrics(&self, font: &Font) -> FontMetrics {
        let size = font.size();
        FontMetrics::new(self.ascent * size, self.descent * size, self.leading * size)
    }

    fn shape(&self, text: &str, font: &Font, out: &mut Vec<ShapedCluster>) {
        let advance = self.advance * font.size();
        let mut start = 0;
        for boundary in GraphemeClusterSegmenter::new().segment_str(text) {
            if boundary == 0 {
                continue;
            }
            let range = start..boundary;
            let advance = if is_line_separator(&text[range.clone()]) {
                0.0
            } else {
                advance
            };
            out.push(ShapedCluster { range, advance });
            start = boundary;
        }
    }
}

/// Returns `true` for a cluster that ends a line unconditionally.
pub(crate) fn is_line_separator(cluster: &str) -> bool {
    matches!(cluster, "\n" | "\r\n" | "\r" | "\u{2028}" | "\u{2029}" | "\u{0085}")
}
