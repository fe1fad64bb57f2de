// Copyright 2025 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Laying out attributed text into line fragments.

mod alignment;
mod breaker;
mod constraints;
mod frame;
mod line;

use core::fmt;
use core::ops::Range;
use std::cell::OnceCell;

use attributed_text::AttributedText;
use peniko::kurbo::{BezPath, Size};
use text_primitives::FontMetrics;

pub use constraints::{LayoutConstraints, LineWidthOverride, DEFAULT_TRUNCATION_TEXT};
pub use frame::LayoutFrame;
pub use line::{ClusterKind, LineFragment, LineRun, PositionedCluster, TruncationToken};

use self::breaker::{LineBreaker, ShapedText};
use crate::geometry::{flip_point, flip_rect};
use crate::shape::{FixedAdvanceShaper, Shaper};
use crate::{LayoutPoint, LayoutRect, NativePoint, NativeRect};

/// Lays out an [`AttributedText`] under a set of [`LayoutConstraints`].
///
/// The layout owns its text. The result is computed on the first query after construction or
/// after any input changes, then cached until the next change. Changes never patch a cached
/// result; it is discarded whole.
pub struct TextLayout {
    text: AttributedText,
    constraints: LayoutConstraints,
    shaper: Box<dyn Shaper>,
    line_width_override: Option<LineWidthOverride>,
    frame: OnceCell<LayoutFrame>,
    generation: u64,
}

impl fmt::Debug for TextLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextLayout")
            .field("text", &self.text)
            .field("constraints", &self.constraints)
            .field("line_width_override", &self.line_width_override.is_some())
            .field("frame", &self.frame.get())
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

impl Default for TextLayout {
    fn default() -> Self {
        Self::new(AttributedText::default())
    }
}

impl TextLayout {
    /// Creates a layout shaping with [`FixedAdvanceShaper`].
    pub fn new(text: AttributedText) -> Self {
        Self::with_shaper(text, FixedAdvanceShaper::default())
    }

    /// Creates a layout with its own shaping engine.
    pub fn with_shaper(text: AttributedText, shaper: impl Shaper + 'static) -> Self {
        Self {
            text,
            constraints: LayoutConstraints::default(),
            shaper: Box::new(shaper),
            line_width_override: None,
            frame: OnceCell::new(),
            generation: 0,
        }
    }

    /// The text being laid out.
    pub fn attributed_text(&self) -> &AttributedText {
        &self.text
    }

    /// Mutable access to the text. The layout is invalidated.
    pub fn attributed_text_mut(&mut self) -> &mut AttributedText {
        self.invalidate_because("text borrowed mutably");
        &mut self.text
    }

    /// Replaces the text, returning the old one.
    pub fn set_attributed_text(&mut self, text: AttributedText) -> AttributedText {
        self.invalidate_because("text replaced");
        core::mem::replace(&mut self.text, text)
    }

    /// The current constraints.
    pub fn constraints(&self) -> &LayoutConstraints {
        &self.constraints
    }

    /// Replaces all constraints. The layout is invalidated only if they differ.
    pub fn set_constraints(&mut self, constraints: LayoutConstraints) {
        if !self.constraints.same_as(&constraints) {
            self.constraints = constraints;
            self.invalidate_because("constraints changed");
        }
    }

    fn update_constraints(&mut self, f: impl FnOnce(&mut LayoutConstraints)) {
        let mut constraints = self.constraints.clone();
        f(&mut constraints);
        self.set_constraints(constraints);
    }

    /// Sets the size to break and stop at.
    pub fn set_size(&mut self, size: Size) {
        self.update_constraints(|c| c.size = size);
    }

    /// Sets the regions glyphs must avoid.
    pub fn set_exclusion_paths(&mut self, paths: Vec<BezPath>) {
        self.update_constraints(|c| c.exclusion_paths = paths);
    }

    /// Sets the maximum number of line fragments; 0 means unlimited.
    pub fn set_maximum_number_of_lines(&mut self, lines: usize) {
        self.update_constraints(|c| c.maximum_number_of_lines = lines);
    }

    /// Sets the text drawn in place of truncated content.
    pub fn set_truncation_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.update_constraints(|c| c.truncation_text = text);
    }

    /// Sets the metrics lines use when automatic metrics are off and no fixed metrics are set.
    pub fn set_baseline_metrics(&mut self, metrics: FontMetrics) {
        self.update_constraints(|c| c.baseline_metrics = metrics);
    }

    /// Sets the metrics lines use when automatic metrics are off.
    pub fn set_fixed_metrics(&mut self, metrics: FontMetrics) {
        self.update_constraints(|c| c.fixed_metrics = metrics);
    }

    /// Sets whether lines take the metrics of their own content.
    pub fn set_retrieve_font_metrics_automatically(&mut self, automatic: bool) {
        self.update_constraints(|c| c.retrieve_font_metrics_automatically = automatic);
    }

    /// Caps the width of individual lines. The layout is always invalidated.
    pub fn set_line_width_override(&mut self, line_width_override: Option<LineWidthOverride>) {
        self.line_width_override = line_width_override;
        self.invalidate_because("line width override changed");
    }

    /// Discards the cached result.
    pub fn invalidate(&mut self) {
        self.invalidate_because("explicit invalidation");
    }

    fn invalidate_because(&mut self, reason: &'static str) {
        if self.frame.take().is_some() {
            tracing::debug!(reason, generation = self.generation, "layout invalidated");
        }
        self.generation += 1;
    }

    /// Returns `true` if a result is cached.
    pub fn layout_up_to_date(&self) -> bool {
        self.frame.get().is_some()
    }

    /// A counter that changes whenever the cached result is discarded.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The layout result, computed if needed.
    pub fn frame(&self) -> &LayoutFrame {
        self.frame.get_or_init(|| {
            let frame = self.compute(&self.constraints);
            tracing::debug!(
                lines = frame.line_count(),
                range = ?frame.containing_range(),
                width = frame.size().width,
                height = frame.size().height,
                generation = self.generation,
                "computed layout"
            );
            frame
        })
    }

    fn compute(&self, constraints: &LayoutConstraints) -> LayoutFrame {
        let shaped = ShapedText::new(&self.text, self.shaper.as_ref());
        let lines = LineBreaker::new(
            &shaped,
            self.shaper.as_ref(),
            constraints,
            self.line_width_override.as_ref(),
            self.text.len(),
        )
        .break_lines();
        LayoutFrame::new(lines)
    }

    /// All line fragments, in text order.
    pub fn line_fragments(&self) -> &[LineFragment] {
        self.frame().lines()
    }

    /// The text covered by the line fragments.
    pub fn containing_string_range(&self) -> Range<usize> {
        self.frame().containing_range()
    }

    /// The text covered by the first `lines` line fragments; 0 means all of them.
    pub fn containing_string_range_with_line_limit(&self, lines: usize) -> Range<usize> {
        self.frame().containing_range_with_line_limit(lines)
    }

    /// Number of line fragments.
    pub fn containing_line_count(&self) -> usize {
        self.frame().line_count()
    }

    /// Extent of the laid out text.
    pub fn layout_size(&self) -> Size {
        self.frame().size()
    }

    /// Height of the laid out text.
    pub fn layout_height(&self) -> f64 {
        self.frame().size().height
    }

    /// Index of the line fragment holding `index`.
    pub fn line_fragment_index_for_character(&self, index: usize) -> Option<usize> {
        self.frame().line_index_for_character(index)
    }

    /// Rect and text range of line fragment `line`.
    pub fn line_fragment_rect_for_line(&self, line: usize) -> Option<(LayoutRect, Range<usize>)> {
        self.frame().line_fragment_rect_for_line(line)
    }

    /// Rect and text range of the line fragment holding `index`.
    pub fn line_fragment_rect_for_character(
        &self,
        index: usize,
    ) -> Option<(LayoutRect, Range<usize>)> {
        self.frame().line_fragment_rect_for_character(index)
    }

    /// Metrics of line fragment `line`, or [`FontMetrics::NULL`].
    pub fn line_metrics(&self, line: usize) -> FontMetrics {
        self.frame().line_metrics(line)
    }

    /// Union of the glyph rects of `range`.
    pub fn bounding_rect_for_character_range(&self, range: Range<usize>) -> Option<LayoutRect> {
        self.frame().bounding_rect_for_character_range(range)
    }

    /// Glyph rect of `range` in the first line fragment it touches.
    pub fn first_selection_rect_for_character_range(
        &self,
        range: Range<usize>,
    ) -> Option<LayoutRect> {
        self.frame().first_selection_rect_for_character_range(range)
    }

    /// Text of every line fragment intersecting `rect`.
    pub fn character_range_for_bounding_rect(&self, rect: LayoutRect) -> Range<usize> {
        self.frame().character_range_for_bounding_rect(rect)
    }

    /// The caret position nearest to `point`.
    pub fn character_index_for_point(&self, point: LayoutPoint) -> usize {
        self.frame().character_index_for_point(point)
    }

    /// Line fragments intersecting `range`.
    pub fn line_fragments_in_range(
        &self,
        range: Range<usize>,
    ) -> core::slice::Iter<'_, LineFragment> {
        self.frame().line_fragments_in_range(range)
    }

    /// One rect per line fragment hugging the glyphs of `range`.
    pub fn enclosing_rects(&self, range: Range<usize>) -> Vec<LayoutRect> {
        self.frame().enclosing_rects(range)
    }

    /// Seamless selection rects for `range`, and their union.
    pub fn selection_rects(&self, range: Range<usize>) -> (Vec<LayoutRect>, Option<LayoutRect>) {
        self.frame().selection_rects(range)
    }

    /// Center of the glyph at `index`.
    pub fn location_for_character(&self, index: usize) -> Option<LayoutPoint> {
        self.frame().location_for_character(index)
    }

    /// Size of the text laid out at `width` with at most `number_of_lines` lines (0 for no
    /// limit) and unbounded height. The cached result is left alone.
    pub fn size_constrained_to_width(&self, width: f64, number_of_lines: usize) -> Size {
        let mut constraints = self.constraints.clone();
        constraints.size = Size::new(width, f64::INFINITY);
        constraints.maximum_number_of_lines = number_of_lines;
        if constraints.same_as(&self.constraints) {
            return self.layout_size();
        }
        self.compute(&constraints).size()
    }

    /// Height the native space is flipped over: the constrained height when it is finite,
    /// otherwise the laid out height.
    fn flip_height(&self) -> f64 {
        let height = self.constraints.size.height;
        if height.is_finite() {
            height
        } else {
            self.layout_height()
        }
    }

    /// Converts a point from the shaping engine's space.
    pub fn convert_point_from_native(&self, point: NativePoint) -> LayoutPoint {
        LayoutPoint(flip_point(point.0, self.flip_height()))
    }

    /// Converts a point to the shaping engine's space.
    pub fn convert_point_to_native(&self, point: LayoutPoint) -> NativePoint {
        NativePoint(flip_point(point.0, self.flip_height()))
    }

    /// Converts a rect from the shaping engine's space.
    pub fn convert_rect_from_native(&self, rect: NativeRect) -> LayoutRect {
        LayoutRect(flip_rect(rect.0, self.flip_height()))
    }

    /// Converts a rect to the shaping engine's space.
    pub fn convert_rect_to_native(&self, rect: LayoutRect) -> NativeRect {
        NativeRect(flip_rect(rect.0, self.flip_height()))
    }
}
