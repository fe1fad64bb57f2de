// Copyright 2025 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use text_primitives::TextAlignment;

use super::line::{ClusterKind, LineFragment};
use crate::LayoutPoint;

/// What alignment needs to know about a line besides its clusters.
#[derive(Clone, Copy, Debug)]
pub(crate) struct AlignInfo {
    /// Width of the interval the line was broken in. May be infinite.
    pub(crate) available: f64,
    pub(crate) alignment: TextAlignment,
    /// Whether the line ends its paragraph, which exempts it from justification.
    pub(crate) ends_paragraph: bool,
}

/// Applies `info.alignment` to `line`.
///
/// Lines broken in an infinite interval align within `fallback_width`, the widest line's
/// content. Trailing whitespace hangs past the aligned edge.
pub(crate) fn align(line: &mut LineFragment, info: &AlignInfo, fallback_width: f64) {
    let alignment_width = if info.available.is_finite() {
        info.available
    } else {
        fallback_width
    };
    let (trailing, trailing_count) = trailing_whitespace(line);
    let free_space = alignment_width - line.width + trailing;
    if free_space <= 0.0 {
        return;
    }

    match info.alignment {
        TextAlignment::Left => {}
        TextAlignment::Right => shift(line, free_space),
        TextAlignment::Center => shift(line, free_space * 0.5),
        TextAlignment::Justified => {
            // The last line of a paragraph and truncated lines stay left-aligned.
            if info.ends_paragraph || line.is_truncated() {
                return;
            }
            let limit = line.clusters.len() - trailing_count;
            let num_spaces = line.clusters[..limit]
                .iter()
                .filter(|cluster| cluster.kind == ClusterKind::Whitespace)
                .count();
            if num_spaces == 0 {
                return;
            }
            let adjustment = free_space / num_spaces as f64;
            let mut offset = 0.0;
            for cluster in &mut line.clusters[..limit] {
                cluster.x += offset;
                if cluster.kind == ClusterKind::Whitespace {
                    cluster.advance += adjustment;
                    offset += adjustment;
                }
            }
            for cluster in &mut line.clusters[limit..] {
                cluster.x += offset;
            }
            line.width += offset;
        }
    }
}

fn shift(line: &mut LineFragment, offset: f64) {
    line.origin = LayoutPoint::new(line.origin.x() + offset, line.origin.y());
}

/// Advance and count of the whitespace and separators ending the line.
fn trailing_whitespace(line: &LineFragment) -> (f64, usize) {
    line.clusters
        .iter()
        .rev()
        .take_while(|c| matches!(c.kind, ClusterKind::Whitespace | ClusterKind::LineSeparator))
        .fold((0.0, 0), |(advance, count), c| (advance + c.advance, count + 1))
}
