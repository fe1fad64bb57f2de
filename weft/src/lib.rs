// Copyright 2025 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Weft lays out [`AttributedText`] into line fragments and renders it with selection and
//! interactive ranges.
//!
//! - [`TextLayout`] breaks text into [`LineFragment`]s under [`LayoutConstraints`]: a size,
//!   exclusion paths, a line limit with truncation, and optional forced line metrics. The result
//!   is cached and answers geometry queries: hit-testing, rects for ranges, coordinate conversion.
//! - [`TextRenderer`] binds a layout to a frame, tracks the selection and active ranges (such as
//!   links) under the pointer, and paints into a [`DrawingSurface`].
//!
//! Shaping is delegated to a [`Shaper`]. [`FixedAdvanceShaper`] is a deterministic built-in that
//! gives every grapheme the same advance.
//!
//! All text positions are byte offsets into the attributed text.
//!
//! ## Example
//!
//! ```
//! use attributed_text::AttributedText;
//! use peniko::kurbo::Size;
//! use weft::{LayoutPoint, TextLayout};
//!
//! // The default font is 12pt, and the built-in shaper gives each character 6 units.
//! let mut layout = TextLayout::new(AttributedText::new("aaa bbb ccc"));
//! layout.set_size(Size::new(30.0, f64::INFINITY));
//!
//! assert_eq!(layout.containing_line_count(), 3);
//! assert_eq!(layout.line_fragment_index_for_character(5), Some(1));
//! assert_eq!(layout.character_index_for_point(LayoutPoint::new(7.0, 15.0)), 5);
//! ```
//!
//! ## Features
//!
//! - `std` (enabled by default): Enables `std` in the text model and its dependencies.
// LINEBENDER LINT SET - lib.rs - v3
// See https://linebender.org/wiki/canonical-lints/
// These lints shouldn't apply to examples or tests.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
// These lints shouldn't apply to examples.
#![warn(clippy::print_stdout, clippy::print_stderr)]
// Targeting e.g. 32-bit means structs containing usize can give false positives for 64-bit.
#![cfg_attr(target_pointer_width = "64", warn(clippy::trivially_copy_pass_by_ref))]
// END LINEBENDER LINT SET
#![cfg_attr(docsrs, feature(doc_cfg))]

mod geometry;
mod segment;
mod shape;

pub mod layout;
pub mod renderer;

#[cfg(test)]
mod tests;

pub use attributed_text::{self, AttributedText};
pub use peniko;
pub use text_primitives;

pub use geometry::{LayoutPoint, LayoutRect, NativePoint, NativeRect};
pub use layout::{
    ClusterKind, LayoutConstraints, LayoutFrame, LineFragment, LineRun, LineWidthOverride,
    PositionedCluster, TextLayout, TruncationToken,
};
pub use renderer::{
    ActiveRange, ActiveRangeKey, DrawingSurface, EventDelegateCapabilities, RendererOptions,
    SelectionAffinity, SelectionRectMode, TextRenderer, TextRendererDelegate,
    TextRendererEventDelegate, TextRun, VerticalAlignment,
};
pub use shape::{FixedAdvanceShaper, ShapedCluster, Shaper};
