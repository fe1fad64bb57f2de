// Copyright 2025 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::ops::Range;

use attributed_text::{AttributedText, ComposedSequence, TextAttachment};
use peniko::kurbo::Size;
use text_primitives::{FontMetrics, LineBreakMode, TextAlignment};

use super::utils::{layout, line_ranges};
use crate::{ClusterKind, TextLayout};

fn with_mode(text: &str, mode: LineBreakMode) -> AttributedText {
    let mut text = AttributedText::new(text);
    let len = text.len();
    text.set_alignment_with_line_break_mode(0..len, TextAlignment::Left, mode)
        .unwrap();
    text
}

fn cluster_positions(layout: &TextLayout, line: usize) -> Vec<(Range<usize>, f64)> {
    layout.line_fragments()[line]
        .clusters()
        .iter()
        .map(|cluster| (cluster.range.clone(), cluster.x))
        .collect()
}

#[test]
fn character_wrap_ignores_word_boundaries() {
    let layout = layout(with_mode("aaa bbb", LineBreakMode::CharacterWrap), 30.0);
    assert_eq!(line_ranges(&layout), [0..5, 5..7]);
}

#[test]
fn composed_sequence_spanning_a_space() {
    let plain = layout("ab cd ef", 24.0);
    assert_eq!(line_ranges(&plain), [0..3, 3..6, 6..8]);

    let mut text = AttributedText::new("ab cd ef");
    text.set_composed_sequence(1..4, Some(ComposedSequence::new("b c")))
        .unwrap();
    let composed = layout(text, 24.0);
    assert_eq!(line_ranges(&composed), [0..4, 4..8]);
}

#[test]
fn clip_keeps_one_line() {
    let layout = layout(with_mode("aaaaaaaaaa", LineBreakMode::Clip), 30.0);
    let lines = layout.line_fragments();
    assert_eq!(lines.len(), 1);
    assert!(!lines[0].is_truncated());
    assert_eq!(lines[0].range(), 0..10);
    assert_eq!(lines[0].rect().0.width(), 60.0);
}

#[test]
fn head_truncation_keeps_the_tail() {
    let layout = layout(with_mode("abcdefghij", LineBreakMode::HeadTruncation), 30.0);
    let line = &layout.line_fragments()[0];
    assert_eq!(line.range(), 0..10);
    let token = line.truncation_token().unwrap();
    assert_eq!((token.x, token.index), (0.0, 0));
    assert_eq!(
        cluster_positions(&layout, 0),
        [(6..7, 6.0), (7..8, 12.0), (8..9, 18.0), (9..10, 24.0)]
    );
}

#[test]
fn middle_truncation_keeps_both_ends() {
    let layout = layout(with_mode("abcdefghij", LineBreakMode::MiddleTruncation), 30.0);
    let line = &layout.line_fragments()[0];
    assert_eq!(line.range(), 0..10);
    let token = line.truncation_token().unwrap();
    assert_eq!((token.x, token.index), (12.0, 2));
    assert_eq!(
        cluster_positions(&layout, 0),
        [(0..1, 0.0), (1..2, 6.0), (8..9, 18.0), (9..10, 24.0)]
    );
}

#[test]
fn truncation_modes_leave_short_lines_alone() {
    let layout = layout(with_mode("abc", LineBreakMode::TailTruncation), 30.0);
    assert!(!layout.line_fragments()[0].is_truncated());
    assert_eq!(cluster_positions(&layout, 0).len(), 3);
}

#[test]
fn justified_lines_spread_over_spaces() {
    let mut text = AttributedText::new("aa bb cc dd");
    text.set_alignment_all(TextAlignment::Justified);
    let layout = layout(text, 50.0);
    assert_eq!(line_ranges(&layout), [0..9, 9..11]);

    let first = layout.line_fragments()[0].clusters();
    assert_eq!(first[2].kind, ClusterKind::Whitespace);
    assert_eq!(first[2].advance, 7.0);
    assert_eq!(first[3].x, 19.0);
    assert_eq!(first[6].x, 38.0);
    // The trailing space hangs and is not widened.
    assert_eq!(first[8].advance, 6.0);

    // The last line of the paragraph stays left aligned.
    let last = layout.line_fragments()[1].clusters();
    assert_eq!((last[0].x, last[1].x), (0.0, 6.0));
}

#[test]
fn kerning_widens_clusters() {
    let mut text = AttributedText::new("aaa bbb");
    text.set_kerning_all(1.0);
    let layout = layout(text, 30.0);
    assert_eq!(line_ranges(&layout), [0..4, 4..7]);
    assert_eq!(layout.line_fragments()[1].clusters()[2].x, 14.0);
}

#[test]
fn attachments_take_part_in_line_metrics() {
    let mut text = AttributedText::new("ab");
    text.insert_attachment(1, TextAttachment::new(Size::new(20.0, 10.0)))
        .unwrap();
    let layout = layout(text, 100.0);
    let line = &layout.line_fragments()[0];
    assert_eq!(line.range(), 0..5);
    assert_eq!(line.clusters()[1].kind, ClusterKind::Attachment);
    assert_eq!(cluster_positions(&layout, 0), [(0..1, 0.0), (1..4, 6.0), (4..5, 26.0)]);
    // The placeholder rises above the font's ascent.
    assert_eq!(line.metrics(), FontMetrics::new(10.0, 3.0, 0.0));
    assert_eq!(line.rect().0.height(), 13.0);
}

#[test]
fn attachments_wrap_like_glyphs() {
    let mut text = AttributedText::new("aaa bbb");
    text.insert_attachment(4, TextAttachment::new(Size::new(20.0, 10.0)))
        .unwrap();
    let layout = layout(text, 30.0);
    assert_eq!(layout.line_fragments()[0].range(), 0..4);
    assert!(layout.containing_line_count() >= 2);
    assert_eq!(layout.containing_string_range(), 0..10);
}
