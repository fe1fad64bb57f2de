// Copyright 2025 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A stateful controller that draws a [`TextLayout`] and tracks selection and interaction.
//!
//! The renderer works in *drawing space*: the coordinate space of its `frame`, origin top-left
//! with y growing downward. A point in drawing space maps to layout space by subtracting the
//! frame origin.
//!
//! Vertical alignment other than [`VerticalAlignment::Top`] only shifts what is drawn; events
//! are still mapped as if the text were top aligned, so selection and hit-testing drift under
//! middle or bottom alignment.

mod draw;
mod event;

use core::ops::Range;
use std::sync::Arc;

use attributed_text::{clamp_range, ReplacementKind, Shadow};
use hashbrown::HashMap;
use peniko::kurbo::{Point, Rect, Vec2};
use peniko::Color;

pub use draw::{DrawingSurface, TextRendererDelegate, TextRun};
pub use event::{ActiveRange, ActiveRangeKey, EventDelegateCapabilities, TextRendererEventDelegate};

use crate::segment::{paragraph_range_at, word_range_at};
use crate::{LayoutPoint, LayoutRect, TextLayout};

/// Where the text sits vertically within the renderer's frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VerticalAlignment {
    /// Against the top edge.
    #[default]
    Top,
    /// Centered.
    Middle,
    /// Against the bottom edge.
    Bottom,
}

/// The unit a pointer position snaps to when selecting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SelectionAffinity {
    /// Caret positions.
    #[default]
    Character,
    /// Words, as found by Unicode word segmentation.
    Word,
    /// Line fragments.
    Line,
    /// Text between hard line breaks.
    Paragraph,
}

/// How selection rects are computed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SelectionRectMode {
    /// One rect per fragment, hugging the glyphs.
    Enclosing,
    /// Rects stretched to fragment edges at wrap points, forming one seamless band.
    #[default]
    Selection,
}

/// Drawing options.
#[derive(Clone, Debug)]
pub struct RendererOptions {
    /// Shadow for glyphs without a shadow attribute.
    pub shadow: Option<Shadow>,
    /// Whether background color attributes are painted.
    pub background_drawing_enabled: bool,
    /// Whether pre-draw callbacks run.
    pub pre_draw_blocks_enabled: bool,
    /// Selection color while the renderer is first responder.
    pub selection_color: Color,
    /// Selection color otherwise.
    pub inactive_selection_color: Color,
    /// Fill behind a pressed active range.
    pub highlight_color: Color,
}

impl Default for RendererOptions {
    fn default() -> Self {
        Self {
            shadow: None,
            background_drawing_enabled: true,
            pre_draw_blocks_enabled: true,
            selection_color: Color::from_rgba8(0x9c, 0xc3, 0xff, 0xff),
            inactive_selection_color: Color::from_rgba8(0xd4, 0xd4, 0xd4, 0xff),
            highlight_color: Color::from_rgba8(0x00, 0x00, 0x00, 0x40),
        }
    }
}

/// Draws one [`TextLayout`] into a frame and handles selection and active-range interaction.
pub struct TextRenderer {
    layout: TextLayout,
    frame: Rect,
    vertical_alignment: VerticalAlignment,
    options: RendererOptions,
    selection_start: usize,
    selection_end: usize,
    affinity: SelectionAffinity,
    /// The unit range under the last press, which drags extend from.
    anchor: Option<Range<usize>>,
    hit: Option<ActiveRangeKey>,
    hovering: Option<ActiveRangeKey>,
    pressing: Option<ActiveRangeKey>,
    hit_attachment: Option<usize>,
    first_responder: bool,
    event_delegate: Option<Arc<dyn TextRendererEventDelegate>>,
    capabilities: EventDelegateCapabilities,
    delegate: Option<Arc<dyn TextRendererDelegate>>,
    /// Glyph rects of active ranges for the layout generation in `rects_generation`.
    active_rects: HashMap<ActiveRangeKey, (Range<usize>, Vec<LayoutRect>)>,
    rects_generation: u64,
}

impl core::fmt::Debug for TextRenderer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TextRenderer")
            .field("layout", &self.layout)
            .field("frame", &self.frame)
            .field("vertical_alignment", &self.vertical_alignment)
            .field("selection", &(self.selection_start..self.selection_end))
            .field("affinity", &self.affinity)
            .field("hovering", &self.hovering)
            .field("pressing", &self.pressing)
            .field("first_responder", &self.first_responder)
            .field("capabilities", &self.capabilities)
            .finish_non_exhaustive()
    }
}

impl TextRenderer {
    /// Creates a renderer for `layout` drawing into `frame`.
    pub fn new(layout: TextLayout, frame: Rect) -> Self {
        Self {
            layout,
            frame,
            vertical_alignment: VerticalAlignment::Top,
            options: RendererOptions::default(),
            selection_start: 0,
            selection_end: 0,
            affinity: SelectionAffinity::Character,
            anchor: None,
            hit: None,
            hovering: None,
            pressing: None,
            hit_attachment: None,
            first_responder: false,
            event_delegate: None,
            capabilities: EventDelegateCapabilities::empty(),
            delegate: None,
            active_rects: HashMap::new(),
            rects_generation: 0,
        }
    }

    /// The layout being rendered.
    pub fn layout(&self) -> &TextLayout {
        &self.layout
    }

    /// Mutable access to the layout.
    pub fn layout_mut(&mut self) -> &mut TextLayout {
        &mut self.layout
    }

    /// The frame the text is drawn in, in drawing space.
    pub fn frame(&self) -> Rect {
        self.frame
    }

    /// Moves or resizes the frame. The layout's width follows the frame's.
    pub fn set_frame(&mut self, frame: Rect) {
        self.frame = frame;
        let mut size = self.layout.constraints().size;
        size.width = frame.width();
        self.layout.set_size(size);
    }

    /// Vertical placement of the text within the frame.
    pub fn vertical_alignment(&self) -> VerticalAlignment {
        self.vertical_alignment
    }

    /// Sets the vertical placement of the text within the frame.
    pub fn set_vertical_alignment(&mut self, alignment: VerticalAlignment) {
        self.vertical_alignment = alignment;
    }

    /// Drawing options.
    pub fn options(&self) -> &RendererOptions {
        &self.options
    }

    /// Mutable drawing options.
    pub fn options_mut(&mut self) -> &mut RendererOptions {
        &mut self.options
    }

    /// Sets the hook that draws attachments.
    pub fn set_delegate(&mut self, delegate: Option<Arc<dyn TextRendererDelegate>>) {
        self.delegate = delegate;
    }

    /// Sets the delegate for interaction events, reading its capabilities once.
    pub fn set_event_delegate(&mut self, delegate: Option<Arc<dyn TextRendererEventDelegate>>) {
        self.capabilities = delegate
            .as_ref()
            .map_or(EventDelegateCapabilities::empty(), |d| d.capabilities());
        self.event_delegate = delegate;
        self.hit = None;
        self.hovering = None;
        self.pressing = None;
        self.active_rects.clear();
    }

    /// Where the layout's origin lands in drawing space when drawing.
    ///
    /// Middle and bottom alignment need the layout's height, so they lay the text out before
    /// anything is drawn.
    pub fn drawing_origin(&self) -> Point {
        let free = (self.frame.height() - self.layout.layout_height()).max(0.0);
        let offset = match self.vertical_alignment {
            VerticalAlignment::Top => 0.0,
            VerticalAlignment::Middle => (free * 0.5).floor(),
            VerticalAlignment::Bottom => free,
        };
        self.frame.origin() + Vec2::new(0.0, offset)
    }

    /// Converts a point from layout space to drawing space.
    pub fn convert_point_from_layout(&self, point: LayoutPoint) -> Point {
        point.0 + self.frame.origin().to_vec2()
    }

    /// Converts a point from drawing space to layout space.
    pub fn convert_point_to_layout(&self, point: Point) -> LayoutPoint {
        LayoutPoint(point - self.frame.origin().to_vec2())
    }

    /// Converts a rect from layout space to drawing space.
    pub fn convert_rect_from_layout(&self, rect: LayoutRect) -> Rect {
        rect.0 + self.frame.origin().to_vec2()
    }

    /// Converts a rect from drawing space to layout space.
    pub fn convert_rect_to_layout(&self, rect: Rect) -> LayoutRect {
        LayoutRect(rect - self.frame.origin().to_vec2())
    }

    /// The selection as an ordered range.
    pub fn selected_range(&self) -> Range<usize> {
        self.selection_start.min(self.selection_end)..self.selection_start.max(self.selection_end)
    }

    /// The selection's start and end as set; the start may come after the end.
    pub fn selection_endpoints(&self) -> (usize, usize) {
        (self.selection_start, self.selection_end)
    }

    /// Selects `range`, extended to whole composed sequences and clamped to the laid out text.
    pub fn set_selection(&mut self, range: Range<usize>) {
        let backward = range.start > range.end;
        let extended = self.clamp_to_layout(range);
        (self.selection_start, self.selection_end) = if backward {
            (extended.end, extended.start)
        } else {
            (extended.start, extended.end)
        };
    }

    /// Collapses the selection to the start of the text.
    pub fn reset_selection(&mut self) {
        self.selection_start = 0;
        self.selection_end = 0;
        self.anchor = None;
    }

    /// The unit presses snap to.
    pub fn selection_affinity(&self) -> SelectionAffinity {
        self.affinity
    }

    /// Sets the unit presses snap to. Presses with a click count reset it.
    pub fn set_selection_affinity(&mut self, affinity: SelectionAffinity) {
        self.affinity = affinity;
    }

    /// The selected text, with composed sequences in their copy representation.
    pub fn selected_text(&self) -> String {
        self.layout
            .attributed_text()
            .composed_sequences()
            .extract_text_in_range(self.selected_range(), ReplacementKind::Copy)
    }

    /// What copying produces: the selected text, or `None` if nothing is selected.
    pub fn copy(&self) -> Option<String> {
        (!self.selected_range().is_empty()).then(|| self.selected_text())
    }

    /// Bounding rect of the current selection in drawing space.
    pub fn rect_for_current_selection(&self) -> Option<Rect> {
        let range = self.selected_range();
        if range.is_empty() {
            return None;
        }
        self.layout
            .selection_rects(range)
            .1
            .map(|rect| self.convert_rect_from_layout(rect))
    }

    /// Rects of the current selection in drawing space.
    pub fn selection_rects(&self, mode: SelectionRectMode) -> Vec<Rect> {
        let range = self.selected_range();
        if range.is_empty() {
            return Vec::new();
        }
        let rects = match mode {
            SelectionRectMode::Enclosing => self.layout.enclosing_rects(range),
            SelectionRectMode::Selection => self.layout.selection_rects(range).0,
        };
        rects
            .into_iter()
            .map(|rect| self.convert_rect_from_layout(rect))
            .collect()
    }

    /// The range of the `affinity` unit at `index`, extended to whole composed sequences.
    pub(crate) fn unit_range(&self, index: usize, affinity: SelectionAffinity) -> Range<usize> {
        let text = self.layout.attributed_text();
        let range = match affinity {
            SelectionAffinity::Character => index..index,
            SelectionAffinity::Word => word_range_at(text.text(), index),
            SelectionAffinity::Line => self
                .layout
                .line_fragment_rect_for_character(index)
                .map_or(index..index, |(_, range)| range),
            SelectionAffinity::Paragraph => paragraph_range_at(text.text(), index),
        };
        self.clamp_to_layout(range)
    }

    /// Orders `range`, clamps it to the laid out text and extends it to whole composed
    /// sequences. A sequence straddling the end of the laid out text is left out instead.
    fn clamp_to_layout(&self, range: Range<usize>) -> Range<usize> {
        let limit = self.layout.containing_string_range().end;
        let clamped = clamp_range(range, limit);
        let sequences = self.layout.attributed_text().composed_sequences();
        let extended = sequences.extend_range(clamped.clone());
        if extended.end > limit {
            sequences.trim_range(clamped)
        } else {
            extended
        }
    }

    /// Returns `true` while the renderer is first responder.
    pub fn is_first_responder(&self) -> bool {
        self.first_responder
    }

    /// Makes the renderer first responder, notifying the event delegate around the change.
    pub fn become_first_responder(&mut self) {
        if self.first_responder {
            return;
        }
        let notify = self
            .event_delegate
            .clone()
            .filter(|_| self.capabilities.contains(EventDelegateCapabilities::FIRST_RESPONDER));
        if let Some(delegate) = &notify {
            delegate.will_become_first_responder();
        }
        self.first_responder = true;
        tracing::debug!("became first responder");
        if let Some(delegate) = &notify {
            delegate.did_become_first_responder();
        }
    }

    /// Resigns first responder, notifying the event delegate around the change.
    pub fn resign_first_responder(&mut self) {
        if !self.first_responder {
            return;
        }
        let notify = self
            .event_delegate
            .clone()
            .filter(|_| self.capabilities.contains(EventDelegateCapabilities::FIRST_RESPONDER));
        if let Some(delegate) = &notify {
            delegate.will_resign_first_responder();
        }
        self.first_responder = false;
        tracing::debug!("resigned first responder");
        if let Some(delegate) = &notify {
            delegate.did_resign_first_responder();
        }
    }
}
