// Copyright 2025 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::ops::Range;

use attributed_text::{Shadow, TextAttachment};
use peniko::kurbo::{Point, Rect, Vec2};
use peniko::Color;
use text_primitives::{BackgroundFillStyle, Font};

use super::TextRenderer;
use crate::LineFragment;

/// A run of glyphs ready to paint.
#[derive(Clone, Debug)]
pub struct TextRun<'a> {
    /// The text of the run.
    pub text: &'a str,
    /// Byte range of the run in the attributed text. Truncation text has an empty range at the
    /// position it stands for.
    pub range: Range<usize>,
    /// Font to shape with.
    pub font: &'a Font,
    /// Start of the baseline, in drawing space.
    pub origin: Point,
    /// Total advance.
    pub advance: f64,
    /// Glyph color, or `None` for the surface's default.
    pub color: Option<Color>,
    /// Shadow to draw behind the glyphs.
    pub shadow: Option<Shadow>,
}

/// The external 2D drawing layer a [`TextRenderer`] paints into.
pub trait DrawingSurface {
    /// Fills `rect` with `color`.
    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Shapes and paints a run of glyphs.
    fn draw_text_run(&mut self, run: &TextRun<'_>);
}

/// Draws what the renderer cannot draw itself.
pub trait TextRendererDelegate: Send + Sync {
    /// Draws `attachment` into `rect` (drawing space). `highlighted` is set while it is pressed.
    fn render_attachment(
        &self,
        attachment: &TextAttachment,
        rect: Rect,
        highlighted: bool,
        surface: &mut dyn DrawingSurface,
    );
}

impl TextRenderer {
    /// Paints the text into `surface`.
    ///
    /// In order: pre-draw callbacks, background colors, the pressed active range, the selection,
    /// glyphs and finally attachments.
    pub fn draw(&mut self, surface: &mut impl DrawingSurface) {
        let origin = self.drawing_origin().to_vec2();
        let range = self.layout.containing_string_range();
        tracing::trace!(?range, ?origin, "draw");

        if self.options.pre_draw_blocks_enabled {
            self.run_pre_draw_hooks(range.clone(), origin);
        }
        if self.options.background_drawing_enabled {
            self.draw_backgrounds(surface, origin);
        }
        if let Some(pressed) = self.pressing_range() {
            let color = self.options.highlight_color;
            for rect in self.layout.enclosing_rects(pressed.range) {
                surface.fill_rect(rect.0 + origin, color);
            }
        }
        let selection = self.selected_range();
        if !selection.is_empty() {
            let color = if self.first_responder {
                self.options.selection_color
            } else {
                self.options.inactive_selection_color
            };
            for rect in self.layout.selection_rects(selection).0 {
                surface.fill_rect(rect.0 + origin, color);
            }
        }
        self.draw_glyphs(surface, origin);
        self.draw_attachments(surface, origin);
    }

    fn run_pre_draw_hooks(&self, range: Range<usize>, origin: Vec2) {
        let text = self.layout.attributed_text();
        for (segment, attributes) in text.attribute_runs(range) {
            let Some(hook) = &attributes.pre_draw else {
                continue;
            };
            let rects: Vec<Rect> = self
                .layout
                .enclosing_rects(segment.clone())
                .into_iter()
                .map(|rect| rect.0 + origin)
                .collect();
            hook.call(text, segment, &rects);
        }
    }

    fn draw_backgrounds(&self, surface: &mut impl DrawingSurface, origin: Vec2) {
        for line in self.layout.line_fragments() {
            let rect = line.rect().0 + origin;
            for run in line.runs() {
                let Some(color) = run.attributes.background_color else {
                    continue;
                };
                let fill = match run.attributes.background_fill_style {
                    BackgroundFillStyle::Inline => {
                        Rect::new(rect.x0 + run.x, rect.y0, rect.x0 + run.x + run.advance, rect.y1)
                    }
                    BackgroundFillStyle::Block => Rect::new(
                        line.edges.start + origin.x,
                        rect.y0,
                        line.edges.end + origin.x,
                        rect.y1,
                    ),
                };
                surface.fill_rect(fill, color);
            }
        }
    }

    fn draw_glyphs(&self, surface: &mut impl DrawingSurface, origin: Vec2) {
        let text = self.layout.attributed_text().text();
        for line in self.layout.line_fragments() {
            let baseline = line.baseline_origin().0 + origin;
            for run in line.runs() {
                if run.attributes.attachment.is_some() {
                    continue;
                }
                surface.draw_text_run(&TextRun {
                    text: visible_text(text, line, run.range.clone()),
                    range: run.range.clone(),
                    font: &run.font,
                    origin: baseline + Vec2::new(run.x, 0.0),
                    advance: run.advance,
                    color: run.attributes.color,
                    shadow: run.attributes.shadow.or(self.options.shadow),
                });
            }
            if let Some(token) = line.truncation_token() {
                surface.draw_text_run(&TextRun {
                    text: &token.text,
                    range: token.index..token.index,
                    font: &token.font,
                    origin: baseline + Vec2::new(token.x, 0.0),
                    advance: token.advance,
                    color: token.attributes.color,
                    shadow: token.attributes.shadow.or(self.options.shadow),
                });
            }
        }
    }

    fn draw_attachments(&self, surface: &mut impl DrawingSurface, origin: Vec2) {
        let Some(delegate) = self.delegate.clone() else {
            return;
        };
        let pressed = self.hit_attachment;
        for line in self.layout.line_fragments() {
            let baseline = line.baseline_origin().0 + origin;
            for run in line.runs() {
                let Some(attachment) = &run.attributes.attachment else {
                    continue;
                };
                let top = baseline.y - f64::from(attachment.ascent_for_layout());
                let rect = Rect::from_origin_size(
                    Point::new(baseline.x + run.x, top),
                    attachment.content_size,
                );
                let highlighted = pressed == Some(run.range.start);
                delegate.render_attachment(attachment, rect, highlighted, surface);
            }
        }
    }
}

/// The text of `range` without a trailing line separator, which has nothing to paint.
fn visible_text<'a>(text: &'a str, line: &LineFragment, range: Range<usize>) -> &'a str {
    let end = match line.clusters().last() {
        Some(last)
            if last.kind == crate::ClusterKind::LineSeparator && last.range.end == range.end =>
        {
            last.range.start.max(range.start)
        }
        _ => range.end,
    };
    &text[range.start..end]
}
