// Copyright 2025 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::sync::{Arc, Mutex};

use attributed_text::TextAttachment;
use peniko::color::palette::css;
use peniko::kurbo::{Point, Rect};
use peniko::Color;

use crate::{
    ActiveRange, DrawingSurface, EventDelegateCapabilities, LayoutPoint, TextRendererDelegate,
    TextRendererEventDelegate, TextRun,
};

/// A callback received by [`RecordingDelegate`], keyed by active range or attachment index.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Event {
    Click(u64),
    ContextMenu(u64),
    AttachmentContextMenu(usize),
    Entered(u64),
    Moved(u64),
    Exited(u64),
    AttachmentClick(usize),
    WillBecome,
    DidBecome,
    WillResign,
    DidResign,
}

/// An event delegate that serves fixed active ranges and records every callback.
pub(crate) struct RecordingDelegate {
    capabilities: EventDelegateCapabilities,
    ranges: Vec<ActiveRange>,
    events: Mutex<Vec<Event>>,
}

impl RecordingDelegate {
    pub(crate) fn new(
        capabilities: EventDelegateCapabilities,
        ranges: Vec<ActiveRange>,
    ) -> Arc<Self> {
        Arc::new(Self {
            capabilities,
            ranges,
            events: Mutex::new(Vec::new()),
        })
    }

    /// Returns the events recorded so far and forgets them.
    pub(crate) fn take_events(&self) -> Vec<Event> {
        core::mem::take(&mut *self.events.lock().unwrap())
    }

    fn push(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

impl TextRendererEventDelegate for RecordingDelegate {
    fn capabilities(&self) -> EventDelegateCapabilities {
        self.capabilities
    }

    fn active_ranges(&self) -> Vec<ActiveRange> {
        self.ranges.clone()
    }

    fn did_click_active_range(&self, range: &ActiveRange) {
        self.push(Event::Click(range.key.0));
    }

    fn context_menu_for_active_range(&self, range: &ActiveRange, _location: LayoutPoint) {
        self.push(Event::ContextMenu(range.key.0));
    }

    fn context_menu_for_attachment(&self, _attachment: &TextAttachment, index: usize) {
        self.push(Event::AttachmentContextMenu(index));
    }

    fn mouse_entered_active_range(&self, range: &ActiveRange) {
        self.push(Event::Entered(range.key.0));
    }

    fn mouse_moved_in_active_range(&self, range: &ActiveRange, _location: LayoutPoint) {
        self.push(Event::Moved(range.key.0));
    }

    fn mouse_exited_active_range(&self, range: &ActiveRange) {
        self.push(Event::Exited(range.key.0));
    }

    fn did_click_attachment(&self, _attachment: &TextAttachment, index: usize) {
        self.push(Event::AttachmentClick(index));
    }

    fn will_become_first_responder(&self) {
        self.push(Event::WillBecome);
    }

    fn did_become_first_responder(&self) {
        self.push(Event::DidBecome);
    }

    fn will_resign_first_responder(&self) {
        self.push(Event::WillResign);
    }

    fn did_resign_first_responder(&self) {
        self.push(Event::DidResign);
    }
}

/// One call made on a [`RecordingSurface`].
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum SurfaceOp {
    Fill(Rect, Color),
    Text {
        text: String,
        origin: Point,
        advance: f64,
    },
}

/// A drawing surface that records what is painted into it.
#[derive(Default)]
pub(crate) struct RecordingSurface {
    pub(crate) ops: Vec<SurfaceOp>,
}

impl RecordingSurface {
    /// The recorded fills of `color`.
    pub(crate) fn fills_of(&self, color: Color) -> Vec<Rect> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                SurfaceOp::Fill(rect, c) if *c == color => Some(*rect),
                _ => None,
            })
            .collect()
    }

    /// The recorded text runs, as `(text, origin)`.
    pub(crate) fn texts(&self) -> Vec<(String, Point)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                SurfaceOp::Text { text, origin, .. } => Some((text.clone(), *origin)),
                SurfaceOp::Fill(..) => None,
            })
            .collect()
    }
}

impl DrawingSurface for RecordingSurface {
    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.ops.push(SurfaceOp::Fill(rect, color));
    }

    fn draw_text_run(&mut self, run: &TextRun<'_>) {
        self.ops.push(SurfaceOp::Text {
            text: run.text.to_owned(),
            origin: run.origin,
            advance: run.advance,
        });
    }
}

/// Paints attachments as solid rects: red while pressed, blue otherwise.
pub(crate) struct AttachmentPainter;

impl AttachmentPainter {
    pub(crate) const NORMAL: Color = css::BLUE;
    pub(crate) const HIGHLIGHTED: Color = css::RED;
}

impl TextRendererDelegate for AttachmentPainter {
    fn render_attachment(
        &self,
        _attachment: &TextAttachment,
        rect: Rect,
        highlighted: bool,
        surface: &mut dyn DrawingSurface,
    ) {
        let color = if highlighted {
            Self::HIGHLIGHTED
        } else {
            Self::NORMAL
        };
        surface.fill_rect(rect, color);
    }
}
