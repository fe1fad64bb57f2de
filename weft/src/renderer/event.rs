// Copyright 2025 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::ops::Range;
use std::sync::Arc;

use attributed_text::TextAttachment;
use peniko::kurbo::Point;

use super::{SelectionAffinity, TextRenderer};
use crate::{LayoutPoint, LayoutRect};

/// Identifies an [`ActiveRange`] across calls. Chosen by the event delegate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ActiveRangeKey(pub u64);

/// An interactive span of text, such as a link, owned by the event delegate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActiveRange {
    /// Identity of the span.
    pub key: ActiveRangeKey,
    /// Byte range of the span.
    pub range: Range<usize>,
}

bitflags::bitflags! {
    /// Which parts of [`TextRendererEventDelegate`] a delegate implements.
    ///
    /// Read once when the delegate is attached; callbacks outside the set are never made.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
    pub struct EventDelegateCapabilities: u8 {
        /// Supplies active ranges.
        const ACTIVE_RANGES = 1 << 0;
        /// Wants clicks on active ranges.
        const CLICK = 1 << 1;
        /// Wants context menu requests.
        const CONTEXT_MENU = 1 << 2;
        /// Wants hover enter, move and exit.
        const HOVER = 1 << 3;
        /// Wants clicks on attachments.
        const ATTACHMENT_CLICK = 1 << 4;
        /// Wants first responder transitions.
        const FIRST_RESPONDER = 1 << 5;
    }
}

/// Receives interaction events from a [`TextRenderer`].
///
/// Every method but [`capabilities`](Self::capabilities) has an empty default. Delegates are
/// shared, so state they keep needs interior mutability.
pub trait TextRendererEventDelegate: Send + Sync {
    /// The callbacks this delegate wants.
    fn capabilities(&self) -> EventDelegateCapabilities;

    /// The current active ranges.
    fn active_ranges(&self) -> Vec<ActiveRange> {
        Vec::new()
    }

    /// A press on `range` was released inside it.
    fn did_click_active_range(&self, range: &ActiveRange) {
        let _ = range;
    }

    /// A context menu was requested over `range` at `location`, in layout space.
    fn context_menu_for_active_range(&self, range: &ActiveRange, location: LayoutPoint) {
        let _ = (range, location);
    }

    /// A context menu was requested over the attachment at `index`.
    fn context_menu_for_attachment(&self, attachment: &TextAttachment, index: usize) {
        let _ = (attachment, index);
    }

    /// The pointer entered `range`.
    fn mouse_entered_active_range(&self, range: &ActiveRange) {
        let _ = range;
    }

    /// The pointer moved within `range`.
    fn mouse_moved_in_active_range(&self, range: &ActiveRange, location: LayoutPoint) {
        let _ = (range, location);
    }

    /// The pointer left `range`.
    fn mouse_exited_active_range(&self, range: &ActiveRange) {
        let _ = range;
    }

    /// A press on the attachment at `index` was released over it.
    fn did_click_attachment(&self, attachment: &TextAttachment, index: usize) {
        let _ = (attachment, index);
    }

    /// The renderer is about to become first responder.
    fn will_become_first_responder(&self) {}

    /// The renderer became first responder.
    fn did_become_first_responder(&self) {}

    /// The renderer is about to resign first responder.
    fn will_resign_first_responder(&self) {}

    /// The renderer resigned first responder.
    fn did_resign_first_responder(&self) {}
}

impl TextRenderer {
    fn delegate_with(
        &self,
        capability: EventDelegateCapabilities,
    ) -> Option<Arc<dyn TextRendererEventDelegate>> {
        self.event_delegate
            .clone()
            .filter(|_| self.capabilities.contains(capability))
    }

    fn active_ranges(&self) -> Vec<ActiveRange> {
        self.delegate_with(EventDelegateCapabilities::ACTIVE_RANGES)
            .map(|delegate| delegate.active_ranges())
            .unwrap_or_default()
    }

    fn lookup(&self, key: Option<ActiveRangeKey>) -> Option<ActiveRange> {
        let key = key?;
        self.active_ranges().into_iter().find(|range| range.key == key)
    }

    /// Glyph rects of `range`, cached until the layout changes.
    fn glyph_rects(&mut self, range: &ActiveRange) -> &[LayoutRect] {
        let generation = self.layout.generation();
        if generation != self.rects_generation {
            self.active_rects.clear();
            self.rects_generation = generation;
        }
        let stale = self
            .active_rects
            .get(&range.key)
            .is_none_or(|(cached, _)| *cached != range.range);
        if stale {
            let rects = self.layout.enclosing_rects(range.range.clone());
            self.active_rects
                .insert(range.key, (range.range.clone(), rects));
        }
        self.active_rects
            .get(&range.key)
            .map_or(&[][..], |(_, rects)| rects.as_slice())
    }

    /// The active range under `location` (drawing space).
    ///
    /// The point must fall on the range's glyphs, not merely on a fragment holding part of it.
    pub fn active_range_for_location(&mut self, location: Point) -> Option<ActiveRange> {
        let point = self.convert_point_to_layout(location);
        let index = self.layout.character_index_for_point(point);
        let ranges = self.active_ranges();
        // The caret position may sit after the glyph under the point.
        let candidates: Vec<ActiveRange> = ranges
            .into_iter()
            .filter(|r| r.range.contains(&index) || (index > 0 && r.range.contains(&(index - 1))))
            .collect();
        candidates
            .into_iter()
            .find(|range| self.glyph_rects(range).iter().any(|rect| rect.contains(point)))
    }

    /// The index of the attachment under `point` (layout space).
    fn attachment_at(&self, point: LayoutPoint) -> Option<usize> {
        let line = self
            .layout
            .line_fragments()
            .iter()
            .find(|line| line.rect().contains(point))?;
        let x = point.x() - line.rect().0.x0;
        line.runs()
            .find(|run| {
                run.attributes.attachment.is_some() && x >= run.x && x <= run.x + run.advance
            })
            .map(|run| run.range.start)
    }

    fn attachment(&self, index: usize) -> Option<Arc<TextAttachment>> {
        self.layout.attributed_text().attributes_at(index).0.attachment
    }

    /// The attachment under the current press.
    pub fn hit_attachment(&self) -> Option<(usize, Arc<TextAttachment>)> {
        let index = self.hit_attachment?;
        self.attachment(index).map(|attachment| (index, attachment))
    }

    /// The active range under the current press, if it still exists.
    pub fn hit_range(&self) -> Option<ActiveRange> {
        self.lookup(self.hit)
    }

    /// The active range under the pointer, if it still exists.
    pub fn hovering_range(&self) -> Option<ActiveRange> {
        self.lookup(self.hovering)
    }

    /// The active range being pressed, if it still exists.
    pub fn pressing_range(&self) -> Option<ActiveRange> {
        self.lookup(self.pressing)
    }

    /// Handles a press at `location` (drawing space).
    ///
    /// A press on an active range starts pressing it. Otherwise the selection collapses to the
    /// unit under the press: a character for one click, a word for two, a paragraph for more.
    pub fn mouse_down(&mut self, location: Point, click_count: u32) {
        let point = self.convert_point_to_layout(location);
        self.hit_attachment = self.attachment_at(point);
        let active = self.active_range_for_location(location);
        self.hit = active.as_ref().map(|range| range.key);
        if let Some(range) = active {
            tracing::debug!(key = range.key.0, range = ?range.range, "pressing active range");
            self.pressing = Some(range.key);
            self.anchor = None;
            return;
        }

        self.affinity = match click_count {
            0 | 1 => SelectionAffinity::Character,
            2 => SelectionAffinity::Word,
            _ => SelectionAffinity::Paragraph,
        };
        let index = self.layout.character_index_for_point(point);
        let unit = self.unit_range(index, self.affinity);
        self.selection_start = unit.start;
        self.selection_end = unit.end;
        self.anchor = Some(unit);
    }

    /// Handles a drag to `location` (drawing space), extending the selection from the press.
    ///
    /// Dragging cancels a press on an active range.
    pub fn mouse_dragged(&mut self, location: Point) {
        self.hit = None;
        if let Some(key) = self.pressing.take() {
            tracing::debug!(key = key.0, "press cancelled by drag");
            return;
        }
        let Some(anchor) = self.anchor.clone() else {
            return;
        };
        let point = self.convert_point_to_layout(location);
        let index = self.layout.character_index_for_point(point);
        let unit = self.unit_range(index, self.affinity);
        if unit.start < anchor.start {
            self.selection_start = anchor.end;
            self.selection_end = unit.start;
        } else {
            self.selection_start = anchor.start;
            self.selection_end = unit.end.max(anchor.end);
        }
    }

    /// Handles a release at `location` (drawing space).
    ///
    /// Releasing inside the pressed active range clicks it.
    pub fn mouse_up(&mut self, location: Point) {
        self.anchor = None;
        self.hit = None;
        let pressed = self.pressing.take();
        if pressed.is_some() {
            self.hit_attachment = None;
        }
        if let Some(key) = pressed {
            let released = self.active_range_for_location(location);
            match released {
                Some(range) if range.key == key => {
                    tracing::debug!(key = key.0, "clicked active range");
                    if let Some(delegate) = self.delegate_with(EventDelegateCapabilities::CLICK) {
                        delegate.did_click_active_range(&range);
                    }
                }
                _ => tracing::debug!(key = key.0, "press released outside"),
            }
            return;
        }

        let point = self.convert_point_to_layout(location);
        if let Some(index) = self.hit_attachment.take() {
            if self.attachment_at(point) == Some(index) {
                if let Some(attachment) = self.attachment(index) {
                    if attachment.user_interaction_enabled {
                        if let Some(delegate) =
                            self.delegate_with(EventDelegateCapabilities::ATTACHMENT_CLICK)
                        {
                            delegate.did_click_attachment(&attachment, index);
                        }
                    }
                }
            }
        }
    }

    /// Handles pointer movement without a press, tracking hover.
    pub fn mouse_moved(&mut self, location: Point) {
        let current = self.active_range_for_location(location);
        let previous = self.hovering;
        let delegate = self.delegate_with(EventDelegateCapabilities::HOVER);
        match (&current, previous) {
            (Some(range), Some(key)) if range.key == key => {
                if let Some(delegate) = &delegate {
                    let point = self.convert_point_to_layout(location);
                    delegate.mouse_moved_in_active_range(range, point);
                }
            }
            _ => {
                if let Some(old) = self.lookup(previous) {
                    tracing::trace!(key = old.key.0, "hover exited");
                    if let Some(delegate) = &delegate {
                        delegate.mouse_exited_active_range(&old);
                    }
                }
                if let Some(range) = &current {
                    tracing::trace!(key = range.key.0, "hover entered");
                    if let Some(delegate) = &delegate {
                        delegate.mouse_entered_active_range(range);
                    }
                }
            }
        }
        self.hovering = current.map(|range| range.key);
    }

    /// Handles the pointer leaving the renderer.
    pub fn mouse_exited(&mut self) {
        self.invalidate_hover();
    }

    /// Ends any hover, notifying the delegate.
    pub fn invalidate_hover(&mut self) {
        let previous = self.hovering.take();
        if let Some(old) = self.lookup(previous) {
            if let Some(delegate) = self.delegate_with(EventDelegateCapabilities::HOVER) {
                delegate.mouse_exited_active_range(&old);
            }
        }
    }

    /// Handles a secondary press, requesting a context menu for what is under `location`.
    ///
    /// Returns `true` if a context menu was requested.
    pub fn right_mouse_down(&mut self, location: Point) -> bool {
        let Some(delegate) = self.delegate_with(EventDelegateCapabilities::CONTEXT_MENU) else {
            return false;
        };
        let point = self.convert_point_to_layout(location);
        if let Some(range) = self.active_range_for_location(location) {
            delegate.context_menu_for_active_range(&range, point);
            return true;
        }
        if let Some(index) = self.attachment_at(point) {
            if let Some(attachment) = self.attachment(index) {
                delegate.context_menu_for_attachment(&attachment, index);
                return true;
            }
        }
        false
    }
}
