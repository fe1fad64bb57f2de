// Copyright 2025 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

mod recorder;

use attributed_text::AttributedText;
use peniko::kurbo::{Rect, Size};

use crate::{TextLayout, TextRenderer};

pub(crate) use recorder::{
    AttachmentPainter, Event, RecordingDelegate, RecordingSurface, SurfaceOp,
};

/// A layout of `text` in the default 12pt font, `width` wide and unbounded in height.
///
/// Every character advances 6 units and every line is 12 units tall.
pub(crate) fn layout(text: impl Into<AttributedText>, width: f64) -> TextLayout {
    let mut layout = TextLayout::new(text.into());
    layout.set_size(Size::new(width, f64::INFINITY));
    layout
}

/// A renderer of `text` in a `200 x 100` frame at `(10, 20)`.
pub(crate) fn renderer(text: impl Into<AttributedText>) -> TextRenderer {
    let frame = Rect::new(10.0, 20.0, 210.0, 120.0);
    TextRenderer::new(layout(text, frame.width()), frame)
}

/// Ranges of all line fragments.
pub(crate) fn line_ranges(layout: &TextLayout) -> Vec<core::ops::Range<usize>> {
    layout.line_fragments().iter().map(|line| line.range()).collect()
}
