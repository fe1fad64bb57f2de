// Copyright 2025 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use core::ops::Range;

use peniko::kurbo::{Rect, Size, Vec2};
use peniko::Color;
use text_primitives::{BackgroundFillStyle, Font, FontMetrics, ParagraphStyle};

use crate::runs::{EditPolicy, Runs};
use crate::{AttributedText, ComposedSequence};

/// A drop shadow drawn behind glyphs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shadow {
    /// Offset of the shadow from the glyphs, in drawing space.
    pub offset: Vec2,
    /// Blur radius.
    pub blur: f64,
    /// Shadow color.
    pub color: Color,
}

impl Shadow {
    /// Creates a shadow.
    pub fn new(blur: f64, offset: Vec2, color: Color) -> Self {
        Self {
            offset,
            blur,
            color,
        }
    }
}

/// A callback invoked before the text or text background of its range is drawn.
///
/// It receives the text being drawn, the attributed substring range, and the rects (in drawing
/// space) that the range occupies.
#[derive(Clone)]
pub struct PreDrawHook(Arc<dyn Fn(&AttributedText, Range<usize>, &[Rect]) + Send + Sync>);

impl PreDrawHook {
    /// Wraps a callback.
    pub fn new(f: impl Fn(&AttributedText, Range<usize>, &[Rect]) + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Invokes the callback.
    pub fn call(&self, text: &AttributedText, range: Range<usize>, rects: &[Rect]) {
        (self.0)(text, range, rects);
    }
}

impl fmt::Debug for PreDrawHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PreDrawHook(..)")
    }
}

/// An inline object embedded in the text, such as an image.
///
/// The attachment is laid out as a single glyph of `placeholder_size`. When `font_metrics` is set,
/// the placeholder is centered on the font's ascent/descent box instead of sitting on the baseline.
#[derive(Clone, Debug, PartialEq)]
pub struct TextAttachment {
    /// Size of the visible content.
    pub content_size: Size,
    /// Size reserved in the line.
    pub placeholder_size: Size,
    /// Metrics of the surrounding font, or [`FontMetrics::NULL`] to sit on the baseline.
    pub font_metrics: FontMetrics,
    /// Whether the attachment reacts to clicks.
    pub user_interaction_enabled: bool,
    /// Caller-defined identifier.
    pub tag: i64,
}

impl TextAttachment {
    /// Creates an attachment whose content fills its placeholder.
    pub fn new(size: Size) -> Self {
        Self {
            content_size: size,
            placeholder_size: size,
            font_metrics: FontMetrics::NULL,
            user_interaction_enabled: false,
            tag: 0,
        }
    }

    /// Distance the placeholder extends above the baseline.
    #[expect(clippy::cast_possible_truncation, reason = "layout units are f32")]
    pub fn ascent_for_layout(&self) -> f32 {
        let height = self.placeholder_size.height as f32;
        if self.font_metrics.is_null() {
            return height;
        }
        let font_height = self.font_metrics.ascent + self.font_metrics.descent;
        self.font_metrics.ascent - (font_height - height) / 2.0
    }

    /// Distance the placeholder extends below the baseline.
    #[expect(clippy::cast_possible_truncation, reason = "layout units are f32")]
    pub fn descent_for_layout(&self) -> f32 {
        (self.placeholder_size.height as f32 - self.ascent_for_layout()).max(0.0)
    }
}

/// One attribute value, used with [`AttributedText::set_attribute`].
#[derive(Clone, Debug)]
pub enum Attribute {
    /// Font request.
    Font(Font),
    /// Foreground (glyph) color.
    Color(Color),
    /// Background fill color.
    BackgroundColor(Color),
    /// How the background color is filled.
    BackgroundFillStyle(BackgroundFillStyle),
    /// Glyph shadow.
    Shadow(Shadow),
    /// Extra advance after each character.
    Kerning(f32),
    /// Fixed line height for lines containing the range.
    LineHeight(f32),
    /// Alignment and line-break mode.
    Paragraph(ParagraphStyle),
    /// Callback invoked before drawing.
    PreDraw(PreDrawHook),
    /// Inline object.
    Attachment(Arc<TextAttachment>),
}

impl Attribute {
    /// The key this value is stored under.
    pub fn kind(&self) -> AttributeKind {
        match self {
            Self::Font(_) => AttributeKind::Font,
            Self::Color(_) => AttributeKind::Color,
            Self::BackgroundColor(_) => AttributeKind::BackgroundColor,
            Self::BackgroundFillStyle(_) => AttributeKind::BackgroundFillStyle,
            Self::Shadow(_) => AttributeKind::Shadow,
            Self::Kerning(_) => AttributeKind::Kerning,
            Self::LineHeight(_) => AttributeKind::LineHeight,
            Self::Paragraph(_) => AttributeKind::Paragraph,
            Self::PreDraw(_) => AttributeKind::PreDraw,
            Self::Attachment(_) => AttributeKind::Attachment,
        }
    }
}

/// Attribute keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    /// See [`Attribute::Font`].
    Font,
    /// See [`Attribute::Color`].
    Color,
    /// See [`Attribute::BackgroundColor`].
    BackgroundColor,
    /// See [`Attribute::BackgroundFillStyle`].
    BackgroundFillStyle,
    /// See [`Attribute::Shadow`].
    Shadow,
    /// See [`Attribute::Kerning`].
    Kerning,
    /// See [`Attribute::LineHeight`].
    LineHeight,
    /// See [`Attribute::Paragraph`].
    Paragraph,
    /// See [`Attribute::PreDraw`].
    PreDraw,
    /// See [`Attribute::Attachment`].
    Attachment,
}

/// The full set of attributes in effect at some position.
#[derive(Clone, Debug, Default)]
pub struct Attributes {
    /// Font request.
    pub font: Option<Font>,
    /// Foreground color.
    pub color: Option<Color>,
    /// Background color.
    pub background_color: Option<Color>,
    /// Background fill style.
    pub background_fill_style: BackgroundFillStyle,
    /// Glyph shadow.
    pub shadow: Option<Shadow>,
    /// Extra advance after each character.
    pub kerning: Option<f32>,
    /// Fixed line height.
    pub line_height: Option<f32>,
    /// Alignment and line-break mode.
    pub paragraph: Option<ParagraphStyle>,
    /// Pre-draw callback.
    pub pre_draw: Option<PreDrawHook>,
    /// Inline object.
    pub attachment: Option<Arc<TextAttachment>>,
    /// Composed sequence marker.
    pub composed_sequence: Option<Arc<ComposedSequence>>,
}

impl Attributes {
    /// The paragraph style, falling back to the default.
    pub fn paragraph_style(&self) -> ParagraphStyle {
        self.paragraph.unwrap_or_default()
    }
}

/// Per-attribute run storage backing an [`AttributedText`].
#[derive(Clone, Debug)]
pub(crate) struct AttributeStore {
    font: Runs<Font>,
    color: Runs<Color>,
    background_color: Runs<Color>,
    background_fill_style: Runs<BackgroundFillStyle>,
    shadow: Runs<Shadow>,
    kerning: Runs<f32>,
    line_height: Runs<f32>,
    paragraph: Runs<ParagraphStyle>,
    pre_draw: Runs<PreDrawHook>,
    attachment: Runs<Arc<TextAttachment>>,
    pub(crate) composed: Runs<Arc<ComposedSequence>>,
}

impl Default for AttributeStore {
    fn default() -> Self {
        Self {
            font: Runs::new(EditPolicy::Splittable),
            color: Runs::new(EditPolicy::Splittable),
            background_color: Runs::new(EditPolicy::Splittable),
            background_fill_style: Runs::new(EditPolicy::Splittable),
            shadow: Runs::new(EditPolicy::Splittable),
            kerning: Runs::new(EditPolicy::Splittable),
            line_height: Runs::new(EditPolicy::Splittable),
            paragraph: Runs::new(EditPolicy::Splittable),
            pre_draw: Runs::new(EditPolicy::Splittable),
            attachment: Runs::new(EditPolicy::Atomic),
            composed: Runs::new(EditPolicy::Atomic),
        }
    }
}

impl AttributeStore {
    pub(crate) fn set(&mut self, range: Range<usize>, attribute: Attribute) {
        match attribute {
            Attribute::Font(v) => self.font.set(range, Some(v)),
            Attribute::Color(v) => self.color.set(range, Some(v)),
            Attribute::BackgroundColor(v) => self.background_color.set(range, Some(v)),
            Attribute::BackgroundFillStyle(v) => self.background_fill_style.set(range, Some(v)),
            Attribute::Shadow(v) => self.shadow.set(range, Some(v)),
            Attribute::Kerning(v) => self.kerning.set(range, Some(v)),
            Attribute::LineHeight(v) => self.line_height.set(range, Some(v)),
            Attribute::Paragraph(v) => self.paragraph.set(range, Some(v)),
            Attribute::PreDraw(v) => self.pre_draw.set(range, Some(v)),
            Attribute::Attachment(v) => self.attachment.set(range, Some(v)),
        }
    }

    pub(crate) fn remove(&mut self, range: Range<usize>, kind: AttributeKind) {
        match kind {
            AttributeKind::Font => self.font.set(range, None),
            AttributeKind::Color => self.color.set(range, None),
            AttributeKind::BackgroundColor => self.background_color.set(range, None),
            AttributeKind::BackgroundFillStyle => self.background_fill_style.set(range, None),
            AttributeKind::Shadow => self.shadow.set(range, None),
            AttributeKind::Kerning => self.kerning.set(range, None),
            AttributeKind::LineHeight => self.line_height.set(range, None),
            AttributeKind::Paragraph => self.paragraph.set(range, None),
            AttributeKind::PreDraw => self.pre_draw.set(range, None),
            AttributeKind::Attachment => self.attachment.set(range, None),
        }
    }

    pub(crate) fn adjust_for_edit(&mut self, edited: &Range<usize>, new_len: usize) {
        self.font.adjust_for_edit(edited, new_len);
        self.color.adjust_for_edit(edited, new_len);
        self.background_color.adjust_for_edit(edited, new_len);
        self.background_fill_style.adjust_for_edit(edited, new_len);
        self.shadow.adjust_for_edit(edited, new_len);
        self.kerning.adjust_for_edit(edited, new_len);
        self.line_height.adjust_for_edit(edited, new_len);
        self.paragraph.adjust_for_edit(edited, new_len);
        self.pre_draw.adjust_for_edit(edited, new_len);
        self.attachment.adjust_for_edit(edited, new_len);
        self.composed.adjust_for_edit(edited, new_len);
    }

    /// Resolves every attribute at `index` and narrows `span` to the range over which the
    /// resolved set stays the same.
    pub(crate) fn resolve(&self, index: usize, len: usize) -> (Attributes, Range<usize>) {
        let mut span = 0..len;
        let mut narrow = |r: Range<usize>| {
            span.start = span.start.max(r.start);
            span.end = span.end.min(r.end);
        };
        let (font, r) = self.font.span_at(index, len);
        narrow(r);
        let (color, r) = self.color.span_at(index, len);
        narrow(r);
        let (background_color, r) = self.background_color.span_at(index, len);
        narrow(r);
        let (background_fill_style, r) = self.background_fill_style.span_at(index, len);
        narrow(r);
        let (shadow, r) = self.shadow.span_at(index, len);
        narrow(r);
        let (kerning, r) = self.kerning.span_at(index, len);
        narrow(r);
        let (line_height, r) = self.line_height.span_at(index, len);
        narrow(r);
        let (paragraph, r) = self.paragraph.span_at(index, len);
        narrow(r);
        let (pre_draw, r) = self.pre_draw.span_at(index, len);
        narrow(r);
        let (attachment, r) = self.attachment.span_at(index, len);
        narrow(r);
        let (composed_sequence, r) = self.composed.span_at(index, len);
        narrow(r);
        let attributes = Attributes {
            font: font.cloned(),
            color: color.copied(),
            background_color: background_color.copied(),
            background_fill_style: background_fill_style.copied().unwrap_or_default(),
            shadow: shadow.copied(),
            kerning: kerning.copied(),
            line_height: line_height.copied(),
            paragraph: paragraph.copied(),
            pre_draw: pre_draw.cloned(),
            attachment: attachment.cloned(),
            composed_sequence: composed_sequence.cloned(),
        };
        (attributes, span.start..span.end.max(span.start))
    }

    /// Every run boundary strictly inside `range`, unsorted and possibly repeated.
    pub(crate) fn boundaries_within(&self, range: &Range<usize>, out: &mut Vec<usize>) {
        self.font.boundaries_within(range, out);
        self.color.boundaries_within(range, out);
        self.background_color.boundaries_within(range, out);
        self.background_fill_style.boundaries_within(range, out);
        self.shadow.boundaries_within(range, out);
        self.kerning.boundaries_within(range, out);
        self.line_height.boundaries_within(range, out);
        self.paragraph.boundaries_within(range, out);
        self.pre_draw.boundaries_within(range, out);
        self.attachment.boundaries_within(range, out);
        self.composed.boundaries_within(range, out);
    }
}
