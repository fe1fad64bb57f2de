// Copyright 2025 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::string::String;
use alloc::sync::Arc;
use core::fmt;
use core::ops::Range;

use peniko::Color;
use text_primitives::{
    BackgroundFillStyle, Font, LineBreakMode, ParagraphStyle, TextAlignment,
};

use crate::attributes::AttributeStore;
use crate::text_range::validate_range;
use crate::{
    Attribute, AttributeKind, AttributeSegments, Attributes, ComposedSequence,
    ComposedSequenceIndex, Error, PreDrawHook, Shadow, TextAttachment,
};

/// The character used to stand in for an inline [`TextAttachment`].
pub const ATTACHMENT_CHARACTER: char = '\u{FFFC}';

bitflags::bitflags! {
    /// What an edit changed.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
    pub struct EditActions: u8 {
        /// Attribute values changed over the edited range.
        const ATTRIBUTES = 1 << 0;
        /// Characters were inserted, removed or replaced.
        const CHARACTERS = 1 << 1;
    }
}

/// A description of one successful mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Edit {
    /// The edited range, in the text as it was before the edit.
    pub range: Range<usize>,
    /// Length of the text after the edit minus its length before.
    pub change_in_length: isize,
    /// What changed.
    pub actions: EditActions,
}

/// Receives a notification for every mutation of an [`AttributedText`].
///
/// Notifications are delivered synchronously, after the text has been updated and before the
/// mutating method returns.
pub trait TextStorageDelegate: Send + Sync {
    /// Called once per successful mutation.
    fn did_process_editing(
        &self,
        actions: EditActions,
        range: Range<usize>,
        change_in_length: isize,
    );
}

/// A mutable rich-text buffer.
///
/// The text is a UTF-8 `String`; each attribute is stored as its own set of non-overlapping runs.
/// All ranges are byte ranges that must lie on `char` boundaries.
pub struct AttributedText {
    text: String,
    attributes: AttributeStore,
    revision: u64,
    delegate: Option<Arc<dyn TextStorageDelegate>>,
}

impl AttributedText {
    /// Creates a buffer with no attributes applied.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            attributes: AttributeStore::default(),
            revision: 0,
            delegate: None,
        }
    }

    /// The underlying text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length of the text in bytes.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Returns `true` if the text is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// A counter bumped by every successful mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// A copy of the text and its attributes without the delegate.
    ///
    /// Use this to hand the text to code running on another thread.
    pub fn snapshot(&self) -> Self {
        Self {
            text: self.text.clone(),
            attributes: self.attributes.clone(),
            revision: self.revision,
            delegate: None,
        }
    }

    /// Sets (or clears) the edit delegate.
    pub fn set_delegate(&mut self, delegate: Option<Arc<dyn TextStorageDelegate>>) {
        self.delegate = delegate;
    }

    /// The edit delegate, if any.
    pub fn delegate(&self) -> Option<&Arc<dyn TextStorageDelegate>> {
        self.delegate.as_ref()
    }

    /// Inserts `text` at `index`.
    pub fn insert(&mut self, index: usize, text: &str) -> Result<Edit, Error> {
        self.replace(index..index, text)
    }

    /// Deletes the text in `range`.
    pub fn delete(&mut self, range: Range<usize>) -> Result<Edit, Error> {
        self.replace(range, "")
    }

    /// Replaces the text in `range` with `text`.
    ///
    /// Replacement text takes the attributes of the first replaced character; inserted text takes
    /// the attributes of the character before it. Composed sequences and attachments touched by
    /// the edit are removed.
    pub fn replace(&mut self, range: Range<usize>, text: &str) -> Result<Edit, Error> {
        validate_range(&self.text, &range)?;
        self.text.replace_range(range.clone(), text);
        self.attributes.adjust_for_edit(&range, text.len());
        let change_in_length = len_delta(range.len(), text.len());
        Ok(self.did_edit(range, change_in_length, EditActions::CHARACTERS))
    }

    /// Replaces the whole text.
    pub fn set_text(&mut self, text: &str) -> Edit {
        let range = 0..self.text.len();
        self.text.replace_range(.., text);
        self.attributes.adjust_for_edit(&range, text.len());
        let change_in_length = len_delta(range.len(), text.len());
        self.did_edit(range, change_in_length, EditActions::CHARACTERS)
    }

    /// Sets `attribute` over `range`, replacing any value of the same kind there.
    pub fn set_attribute(
        &mut self,
        range: Range<usize>,
        attribute: Attribute,
    ) -> Result<Edit, Error> {
        validate_range(&self.text, &range)?;
        self.attributes.set(range.clone(), attribute);
        Ok(self.did_edit(range, 0, EditActions::ATTRIBUTES))
    }

    /// Removes every attribute of `kind` from `range`.
    pub fn remove_attribute(
        &mut self,
        range: Range<usize>,
        kind: AttributeKind,
    ) -> Result<Edit, Error> {
        validate_range(&self.text, &range)?;
        self.attributes.remove(range.clone(), kind);
        Ok(self.did_edit(range, 0, EditActions::ATTRIBUTES))
    }

    /// Sets the font over `range`.
    pub fn set_font(&mut self, range: Range<usize>, font: Font) -> Result<Edit, Error> {
        self.set_attribute(range, Attribute::Font(font))
    }

    /// Sets the foreground color over `range`.
    pub fn set_color(&mut self, range: Range<usize>, color: Color) -> Result<Edit, Error> {
        self.set_attribute(range, Attribute::Color(color))
    }

    /// Sets the background color over `range`.
    pub fn set_background_color(
        &mut self,
        range: Range<usize>,
        color: Color,
    ) -> Result<Edit, Error> {
        self.set_attribute(range, Attribute::BackgroundColor(color))
    }

    /// Sets how the background color over `range` is filled.
    pub fn set_background_fill_style(
        &mut self,
        range: Range<usize>,
        style: BackgroundFillStyle,
    ) -> Result<Edit, Error> {
        self.set_attribute(range, Attribute::BackgroundFillStyle(style))
    }

    /// Sets the glyph shadow over `range`.
    pub fn set_shadow(&mut self, range: Range<usize>, shadow: Shadow) -> Result<Edit, Error> {
        self.set_attribute(range, Attribute::Shadow(shadow))
    }

    /// Sets the extra advance after each character in `range`.
    pub fn set_kerning(&mut self, range: Range<usize>, kerning: f32) -> Result<Edit, Error> {
        self.set_attribute(range, Attribute::Kerning(kerning))
    }

    /// Sets a fixed line height for lines containing `range`.
    pub fn set_line_height(&mut self, range: Range<usize>, height: f32) -> Result<Edit, Error> {
        self.set_attribute(range, Attribute::LineHeight(height))
    }

    /// Sets the alignment over `range`, resetting the line-break mode to word wrap.
    pub fn set_alignment(
        &mut self,
        range: Range<usize>,
        alignment: TextAlignment,
    ) -> Result<Edit, Error> {
        self.set_alignment_with_line_break_mode(range, alignment, LineBreakMode::WordWrap)
    }

    /// Sets the alignment and line-break mode over `range`.
    pub fn set_alignment_with_line_break_mode(
        &mut self,
        range: Range<usize>,
        alignment: TextAlignment,
        line_break_mode: LineBreakMode,
    ) -> Result<Edit, Error> {
        self.set_attribute(
            range,
            Attribute::Paragraph(ParagraphStyle {
                alignment,
                line_break_mode,
            }),
        )
    }

    /// Sets a callback run before the text in `range` is drawn.
    pub fn set_pre_draw(&mut self, range: Range<usize>, hook: PreDrawHook) -> Result<Edit, Error> {
        self.set_attribute(range, Attribute::PreDraw(hook))
    }

    /// Marks `range` as an inline attachment.
    pub fn set_attachment(
        &mut self,
        range: Range<usize>,
        attachment: TextAttachment,
    ) -> Result<Edit, Error> {
        self.set_attribute(range, Attribute::Attachment(Arc::new(attachment)))
    }

    /// Inserts [`ATTACHMENT_CHARACTER`] at `index` and attaches `attachment` to it.
    ///
    /// The delegate sees the insertion and then the attribute change.
    pub fn insert_attachment(
        &mut self,
        index: usize,
        attachment: TextAttachment,
    ) -> Result<Edit, Error> {
        let mut buf = [0; 4];
        let placeholder = ATTACHMENT_CHARACTER.encode_utf8(&mut buf);
        let inserted = self.insert(index, placeholder)?;
        self.set_attachment(index..index + placeholder.len(), attachment)?;
        Ok(inserted)
    }

    /// Sets or removes a composed sequence over `range`.
    ///
    /// A value replaces every sequence overlapping `range` with a single sequence spanning exactly
    /// `range`. `None` removes every sequence that overlaps `range`, or the one strictly
    /// containing it when `range` is empty. Setting a value over an empty range does nothing.
    pub fn set_composed_sequence(
        &mut self,
        range: Range<usize>,
        sequence: Option<ComposedSequence>,
    ) -> Result<Edit, Error> {
        validate_range(&self.text, &range)?;
        let composed = &mut self.attributes.composed;
        match sequence {
            Some(sequence) => composed.set(range.clone(), Some(Arc::new(sequence))),
            None if range.is_empty() => {
                let containing = composed.intersecting(&range).first().map(|(r, _)| r.clone());
                if let Some(containing) = containing {
                    composed.set(containing, None);
                }
            }
            None => composed.set(range.clone(), None),
        }
        Ok(self.did_edit(range, 0, EditActions::ATTRIBUTES))
    }

    /// Sets the font over the whole text.
    pub fn set_font_all(&mut self, font: Font) -> Edit {
        self.set_all(Attribute::Font(font))
    }

    /// Sets the foreground color over the whole text.
    pub fn set_color_all(&mut self, color: Color) -> Edit {
        self.set_all(Attribute::Color(color))
    }

    /// Sets the shadow over the whole text.
    pub fn set_shadow_all(&mut self, shadow: Shadow) -> Edit {
        self.set_all(Attribute::Shadow(shadow))
    }

    /// Sets the kerning over the whole text.
    pub fn set_kerning_all(&mut self, kerning: f32) -> Edit {
        self.set_all(Attribute::Kerning(kerning))
    }

    /// Sets a fixed line height over the whole text.
    pub fn set_line_height_all(&mut self, height: f32) -> Edit {
        self.set_all(Attribute::LineHeight(height))
    }

    /// Sets the alignment over the whole text, resetting the line-break mode to word wrap.
    pub fn set_alignment_all(&mut self, alignment: TextAlignment) -> Edit {
        self.set_all(Attribute::Paragraph(ParagraphStyle {
            alignment,
            line_break_mode: LineBreakMode::WordWrap,
        }))
    }

    /// Sets the alignment and line-break mode over the whole text.
    pub fn set_paragraph_style_all(&mut self, style: ParagraphStyle) -> Edit {
        self.set_all(Attribute::Paragraph(style))
    }

    fn set_all(&mut self, attribute: Attribute) -> Edit {
        let range = 0..self.text.len();
        self.attributes.set(range.clone(), attribute);
        self.did_edit(range, 0, EditActions::ATTRIBUTES)
    }

    /// The attributes in effect at `index` and the maximal range over which they are constant.
    ///
    /// Indices past the end of the text resolve to an empty set of attributes.
    pub fn attributes_at(&self, index: usize) -> (Attributes, Range<usize>) {
        self.attributes.resolve(index, self.text.len())
    }

    /// Iterates the maximal segments of `range` over which all attributes are constant.
    ///
    /// The range is clamped to the text.
    pub fn attribute_runs(&self, range: Range<usize>) -> AttributeSegments<'_> {
        AttributeSegments::new(self, range)
    }

    /// A view for looking up composed sequences and normalizing ranges around them.
    pub fn composed_sequences(&self) -> ComposedSequenceIndex<'_> {
        ComposedSequenceIndex::new(&self.text, &self.attributes.composed)
    }

    pub(crate) fn store(&self) -> &AttributeStore {
        &self.attributes
    }

    fn did_edit(
        &mut self,
        range: Range<usize>,
        change_in_length: isize,
        actions: EditActions,
    ) -> Edit {
        self.revision += 1;
        if let Some(delegate) = &self.delegate {
            delegate.did_process_editing(actions, range.clone(), change_in_length);
        }
        Edit {
            range,
            change_in_length,
            actions,
        }
    }
}

fn len_delta(old: usize, new: usize) -> isize {
    new as isize - old as isize
}

impl Clone for AttributedText {
    fn clone(&self) -> Self {
        self.snapshot()
    }
}

impl fmt::Debug for AttributedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributedText")
            .field("text", &self.text)
            .field("attributes", &self.attributes)
            .field("revision", &self.revision)
            .field("delegate", &self.delegate.is_some())
            .finish()
    }
}

impl Default for AttributedText {
    fn default() -> Self {
        Self::new(String::new())
    }
}

impl From<&str> for AttributedText {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use peniko::color::palette;
    use text_primitives::{Font, LineBreakMode, TextAlignment};

    use super::{AttributedText, EditActions, TextStorageDelegate};
    use crate::{ComposedSequence, Endpoint, ErrorKind, TextAttachment};

    #[derive(Default)]
    struct Recorder(Mutex<Vec<(EditActions, core::ops::Range<usize>, isize)>>);

    impl TextStorageDelegate for Recorder {
        fn did_process_editing(
            &self,
            actions: EditActions,
            range: core::ops::Range<usize>,
            change_in_length: isize,
        ) {
            self.0.lock().unwrap().push((actions, range, change_in_length));
        }
    }

    fn recorded(text: &mut AttributedText) -> Arc<Recorder> {
        let recorder = Arc::new(Recorder::default());
        text.set_delegate(Some(recorder.clone()));
        recorder
    }

    #[test]
    fn edits_notify_delegate() {
        let mut text = AttributedText::new("Hello world");
        let recorder = recorded(&mut text);

        text.insert(5, ",").unwrap();
        text.delete(0..1).unwrap();
        text.replace(0..4, "J").unwrap();
        text.set_color(0..2, palette::css::RED).unwrap();

        assert_eq!(text.text(), "J, world");
        let events = recorder.0.lock().unwrap();
        assert_eq!(
            *events,
            vec![
                (EditActions::CHARACTERS, 5..5, 1),
                (EditActions::CHARACTERS, 0..1, -1),
                (EditActions::CHARACTERS, 0..4, -3),
                (EditActions::ATTRIBUTES, 0..2, 0),
            ]
        );
        assert_eq!(text.revision(), 4);
    }

    #[test]
    fn out_of_range_edits_fail_without_notifying() {
        let mut text = AttributedText::new("abc");
        let recorder = recorded(&mut text);

        let err = text.insert(4, "x").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfRange);
        let err = text.set_font(1..9, Font::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfRange);
        assert!(recorder.0.lock().unwrap().is_empty());
        assert_eq!(text.revision(), 0);
    }

    #[test]
    fn rejects_split_characters() {
        let mut text = AttributedText::new("éclair");
        let err = text.delete(0..1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotOnCharBoundary);
        assert_eq!(err.boundary().map(|b| b.which), Some(Endpoint::End));
    }

    #[test]
    fn inserted_text_inherits_preceding_attributes() {
        let mut text = AttributedText::new("abcdef");
        text.set_color(0..3, palette::css::RED).unwrap();
        text.set_color(3..6, palette::css::BLUE).unwrap();
        text.insert(3, "xy").unwrap();

        let (attrs, range) = text.attributes_at(3);
        assert_eq!(attrs.color, Some(palette::css::RED));
        assert_eq!(range, 0..5);
        let (attrs, range) = text.attributes_at(5);
        assert_eq!(attrs.color, Some(palette::css::BLUE));
        assert_eq!(range, 5..8);
    }

    #[test]
    fn attributes_at_reports_intersection_of_runs() {
        let mut text = AttributedText::new("0123456789");
        text.set_color(0..6, palette::css::RED).unwrap();
        text.set_kerning(4..10, 1.5).unwrap();

        let (attrs, range) = text.attributes_at(5);
        assert_eq!(attrs.color, Some(palette::css::RED));
        assert_eq!(attrs.kerning, Some(1.5));
        assert_eq!(range, 4..6);

        let (attrs, range) = text.attributes_at(8);
        assert_eq!(attrs.color, None);
        assert_eq!(range, 6..10);
    }

    #[test]
    fn alignment_forces_word_wrap() {
        let mut text = AttributedText::new("abc");
        text.set_alignment_with_line_break_mode(0..3, TextAlignment::Left, LineBreakMode::Clip)
            .unwrap();
        text.set_alignment(0..3, TextAlignment::Center).unwrap();
        let style = text.attributes_at(1).0.paragraph_style();
        assert_eq!(style.alignment, TextAlignment::Center);
        assert_eq!(style.line_break_mode, LineBreakMode::WordWrap);
    }

    #[test]
    fn whole_text_setters_cover_everything() {
        let mut text = AttributedText::new("abc");
        let edit = text.set_font_all(Font::new("Menlo", 10.0));
        assert_eq!(edit.range, 0..3);
        assert_eq!(edit.change_in_length, 0);
        assert_eq!(edit.actions, EditActions::ATTRIBUTES);
        assert_eq!(text.attributes_at(2).1, 0..3);
    }

    #[test]
    fn composed_sequence_is_dropped_when_its_interior_is_edited() {
        let mut text = AttributedText::new("ab[xyz]cd");
        text.set_composed_sequence(2..7, Some(ComposedSequence::new("@bob")))
            .unwrap();

        text.insert(0, "__").unwrap();
        assert_eq!(
            text.composed_sequences().sequence_at(5).map(|(_, r)| r),
            Some(4..9)
        );

        text.insert(6, "!").unwrap();
        assert!(text.composed_sequences().sequence_at(5).is_none());
    }

    #[test]
    fn removing_sequence_with_empty_range_hits_container() {
        let mut text = AttributedText::new("0123456789");
        text.set_composed_sequence(2..6, Some(ComposedSequence::new("x")))
            .unwrap();
        text.set_composed_sequence(6..6, None).unwrap();
        assert!(text.composed_sequences().sequence_at(2).is_some());
        text.set_composed_sequence(4..4, None).unwrap();
        assert!(text.composed_sequences().sequence_at(2).is_none());
    }

    #[test]
    fn attachments_insert_placeholder() {
        let mut text = AttributedText::new("ab");
        let recorder = recorded(&mut text);
        let edit = text
            .insert_attachment(1, TextAttachment::new(peniko::kurbo::Size::new(10.0, 10.0)))
            .unwrap();
        assert_eq!(edit.change_in_length, 3);
        assert_eq!(text.text(), "a\u{FFFC}b");
        assert!(text.attributes_at(1).0.attachment.is_some());
        assert!(text.attributes_at(4).0.attachment.is_none());
        assert_eq!(recorder.0.lock().unwrap().len(), 2);
    }

    #[test]
    fn snapshot_drops_delegate() {
        let mut text = AttributedText::new("abc");
        let _recorder = recorded(&mut text);
        text.set_kerning(0..1, 2.0).unwrap();
        let copy = text.snapshot();
        assert!(copy.delegate().is_none());
        assert_eq!(copy.text(), "abc");
        assert_eq!(copy.attributes_at(0).0.kerning, Some(2.0));
    }
}
