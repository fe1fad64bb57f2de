// Copyright 2025 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::ops::Range;

use peniko::kurbo::Size;
use text_primitives::FontMetrics;

use super::line::LineFragment;
use crate::{LayoutPoint, LayoutRect};

/// The result of one layout pass: line fragments in text order, plus the extent they cover.
///
/// Fragments are contiguous, do not overlap and strictly increase in start offset. A frame is
/// never patched; any change to its inputs produces a new one.
#[derive(Clone, Debug, Default)]
pub struct LayoutFrame {
    lines: Vec<LineFragment>,
    size: Size,
    containing_range: Range<usize>,
}

impl LayoutFrame {
    pub(crate) fn new(lines: Vec<LineFragment>) -> Self {
        let width = lines
            .iter()
            .map(|line| line.origin.x() + line.width)
            .fold(0.0, f64::max);
        let height = lines
            .iter()
            .map(|line| line.rect().0.y1)
            .fold(0.0, f64::max);
        let containing_range = match (lines.first(), lines.last()) {
            (Some(first), Some(last)) => first.range.start..last.range.end,
            _ => 0..0,
        };
        Self {
            lines,
            size: Size::new(width, height),
            containing_range,
        }
    }

    /// All line fragments, in text order.
    pub fn lines(&self) -> &[LineFragment] {
        &self.lines
    }

    /// Number of line fragments.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// The extent of all fragments.
    pub fn size(&self) -> Size {
        self.size
    }

    /// The text covered by the fragments. Text hidden by truncation of the last line, or that
    /// did not fit, lies after it.
    pub fn containing_range(&self) -> Range<usize> {
        self.containing_range.clone()
    }

    /// The text covered by the first `lines` fragments, or all of them when `lines` is 0.
    pub fn containing_range_with_line_limit(&self, lines: usize) -> Range<usize> {
        if lines == 0 || lines >= self.lines.len() {
            return self.containing_range();
        }
        self.containing_range.start..self.lines[lines - 1].range.end
    }

    /// Index of the fragment holding `index`.
    ///
    /// The end of the containing range belongs to the last fragment.
    pub fn line_index_for_character(&self, index: usize) -> Option<usize> {
        let found = self
            .lines
            .partition_point(|line| line.range.end <= index);
        if found < self.lines.len() && self.lines[found].range.start <= index {
            return Some(found);
        }
        (index == self.containing_range.end && !self.lines.is_empty())
            .then(|| self.lines.len() - 1)
    }

    /// The fragment holding `index`.
    pub fn line_for_character(&self, index: usize) -> Option<&LineFragment> {
        self.line_index_for_character(index)
            .map(|line| &self.lines[line])
    }

    /// The rect and text range of fragment `line`.
    pub fn line_fragment_rect_for_line(&self, line: usize) -> Option<(LayoutRect, Range<usize>)> {
        self.lines
            .get(line)
            .map(|line| (line.rect(), line.range()))
    }

    /// The rect and text range of the fragment holding `index`.
    pub fn line_fragment_rect_for_character(
        &self,
        index: usize,
    ) -> Option<(LayoutRect, Range<usize>)> {
        self.line_for_character(index)
            .map(|line| (line.rect(), line.range()))
    }

    /// Metrics of fragment `line`, or [`FontMetrics::NULL`] if there is no such fragment.
    pub fn line_metrics(&self, line: usize) -> FontMetrics {
        self.lines
            .get(line)
            .map_or(FontMetrics::NULL, LineFragment::metrics)
    }

    /// Fragments intersecting `range`, or holding it if it is empty.
    pub fn line_fragments_in_range(
        &self,
        range: Range<usize>,
    ) -> core::slice::Iter<'_, LineFragment> {
        let lines = if range.is_empty() {
            match self.line_index_for_character(range.start) {
                Some(line) => &self.lines[line..=line],
                None => &self.lines[..0],
            }
        } else {
            let first = self
                .lines
                .partition_point(|line| line.range.end <= range.start);
            let end = self
                .lines
                .partition_point(|line| line.range.start < range.end);
            &self.lines[first..end.max(first)]
        };
        lines.iter()
    }

    /// The rect covering the part of `range` inside `line`.
    fn span_rect(line: &LineFragment, range: &Range<usize>) -> LayoutRect {
        let start = range.start.max(line.range.start);
        let end = range.end.min(line.range.end).max(start);
        let rect = line.rect().0;
        LayoutRect::new(
            rect.x0 + line.offset_for_index(start),
            rect.y0,
            rect.x0 + line.offset_for_index(end),
            rect.y1,
        )
    }

    /// One rect per fragment around the glyphs of `range`.
    ///
    /// The rects hug the glyphs: they do not reach the fragment's edges and leave gaps between
    /// rows.
    pub fn enclosing_rects(&self, range: Range<usize>) -> Vec<LayoutRect> {
        self.line_fragments_in_range(range.clone())
            .map(|line| Self::span_rect(line, &range))
            .collect()
    }

    /// Rects for painting `range` as a selection, and their union.
    ///
    /// Where the selection wraps, rects reach the edges of their fragments and down to the next
    /// row, so that a multi-line selection paints as one seamless band.
    pub fn selection_rects(&self, range: Range<usize>) -> (Vec<LayoutRect>, Option<LayoutRect>) {
        let lines: Vec<&LineFragment> = self.line_fragments_in_range(range.clone()).collect();
        let mut rects = Vec::with_capacity(lines.len());
        for (i, line) in lines.iter().enumerate() {
            let mut rect = Self::span_rect(line, &range).0;
            if range.start < line.range.start {
                rect.x0 = line.edges.start;
            }
            if range.end > line.range.end {
                rect.x1 = line.edges.end;
                if let Some(next) = lines.get(i + 1) {
                    rect.y1 = rect.y1.max(next.origin.y());
                }
            }
            rects.push(LayoutRect(rect));
        }
        let bounds = rects.iter().copied().reduce(LayoutRect::union);
        (rects, bounds)
    }

    /// The union of the glyph rects of `range`.
    pub fn bounding_rect_for_character_range(&self, range: Range<usize>) -> Option<LayoutRect> {
        self.enclosing_rects(range)
            .into_iter()
            .reduce(LayoutRect::union)
    }

    /// The glyph rect of `range` in the first fragment it touches.
    pub fn first_selection_rect_for_character_range(
        &self,
        range: Range<usize>,
    ) -> Option<LayoutRect> {
        self.line_fragments_in_range(range.clone())
            .next()
            .map(|line| Self::span_rect(line, &range))
    }

    /// The text of every fragment intersecting `rect`, or an empty range if there is none.
    pub fn character_range_for_bounding_rect(&self, rect: LayoutRect) -> Range<usize> {
        let mut hits = self
            .lines
            .iter()
            .filter(|line| line.rect().intersects(rect));
        match hits.next() {
            Some(first) => {
                let end = hits.last().map_or(first.range.end, |last| last.range.end);
                first.range.start..end
            }
            None => 0..0,
        }
    }

    /// The caret position nearest to `point`.
    ///
    /// Points above the first fragment give the start of the text and points below the last give
    /// the end of the containing range. Otherwise the row is the first one whose bottom is at or
    /// below `point`, and the fragment within it is the horizontally nearest.
    pub fn character_index_for_point(&self, point: LayoutPoint) -> usize {
        let Some(first) = self.lines.first() else {
            return 0;
        };
        if point.y() < first.origin.y() {
            return self.containing_range.start;
        }
        let Some(row) = self.lines.iter().find(|line| line.rect().0.y1 >= point.y()) else {
            return self.containing_range.end;
        };
        let row_top = row.origin.y();
        let nearest = self
            .lines
            .iter()
            .filter(|line| line.origin.y() == row_top)
            .min_by(|a, b| {
                horizontal_distance(a, point.x()).total_cmp(&horizontal_distance(b, point.x()))
            })
            .unwrap_or(row);
        nearest.character_index_for_position(point)
    }

    /// Center of the glyph at `index`.
    pub fn location_for_character(&self, index: usize) -> Option<LayoutPoint> {
        let line = self.line_for_character(index)?;
        let rect = line.rect().0;
        let x = line
            .cluster_center(index)
            .unwrap_or_else(|| line.offset_for_index(index));
        Some(LayoutPoint::new(rect.x0 + x, (rect.y0 + rect.y1) * 0.5))
    }
}

fn horizontal_distance(line: &LineFragment, x: f64) -> f64 {
    let rect = line.rect().0;
    if x < rect.x0 {
        rect.x0 - x
    } else if x > rect.x1 {
        x - rect.x1
    } else {
        0.0
    }
}
