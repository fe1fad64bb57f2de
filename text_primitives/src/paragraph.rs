// Copyright 2025 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

/// Horizontal alignment of the lines of a paragraph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TextAlignment {
    /// Flush with the left edge of the line's available space.
    #[default]
    Left,
    /// Centered within the line's available space.
    Center,
    /// Flush with the right edge of the line's available space.
    Right,
    /// Spread across the available space, except for the last line of a paragraph.
    Justified,
}

/// How a paragraph behaves when its text does not fit the available width.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LineBreakMode {
    /// Wrap at line-break opportunities, breaking inside a word only when it alone overflows.
    #[default]
    WordWrap,
    /// Wrap at any grapheme boundary.
    CharacterWrap,
    /// Do not wrap; overflowing glyphs are clipped by the drawing surface.
    Clip,
    /// Do not wrap; overflowing lines lose their head to the truncation text.
    HeadTruncation,
    /// Do not wrap; overflowing lines lose their tail to the truncation text.
    TailTruncation,
    /// Do not wrap; overflowing lines lose their middle to the truncation text.
    MiddleTruncation,
}

impl LineBreakMode {
    /// Returns `true` if this mode wraps overflowing lines.
    pub fn wraps(self) -> bool {
        matches!(self, Self::WordWrap | Self::CharacterWrap)
    }
}

/// Alignment and line-break mode, applied together to whole paragraphs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct ParagraphStyle {
    /// Horizontal alignment.
    pub alignment: TextAlignment,
    /// Behavior on overflow.
    pub line_break_mode: LineBreakMode,
}

/// How a background color attribute is filled behind its text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum BackgroundFillStyle {
    /// Fill only behind the glyphs of the attributed range.
    #[default]
    Inline,
    /// Fill the whole line fragment for every line the range touches.
    Block,
}
