// Copyright 2025 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Attributed Text is a mutable rich-text buffer: a UTF-8 string plus non-overlapping runs of
//! styling attributes, with every edit reported to an optional delegate.
//!
//! On top of the buffer sit *composed sequences*: atomic substitution records over a byte range
//! (an emoji, a mention token) that carry separate display, copy and length representations.
//! [`ComposedSequenceIndex`] looks them up and normalizes ranges and indices so that no endpoint
//! ever splits a sequence.
//!
//! All indices are byte offsets into the text and must lie on `char` boundaries.
//!
//! ## Example
//!
//! ```
//! use attributed_text::{AttributedText, ComposedSequence, ReplacementKind};
//!
//! let mut text = AttributedText::new("Hello 😀world");
//! text.set_composed_sequence(
//!     6..10,
//!     Some(ComposedSequence::with_representations("😀", "😀", "#")),
//! )
//! .unwrap();
//!
//! let index = text.composed_sequences();
//! assert_eq!(index.extract_text(ReplacementKind::Length), "Hello #world");
//! assert_eq!(index.extract_text(ReplacementKind::Copy), "Hello 😀world");
//! assert_eq!(index.round_index(8), 6);
//! ```
//!
//! ## Features
//!
//! - `std` (enabled by default): Enables `std` in `text_primitives`.
//! - `libm`: Enables `libm` in `text_primitives`, for builds without `std`.
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
#![cfg_attr(not(test), no_std)]

extern crate alloc;

mod attribute_segments;
mod attributed_text;
mod attributes;
mod composed;
mod error;
mod runs;
mod text_range;

pub use crate::attribute_segments::AttributeSegments;
pub use crate::attributed_text::{
    ATTACHMENT_CHARACTER, AttributedText, Edit, EditActions, TextStorageDelegate,
};
pub use crate::attributes::{
    Attribute, AttributeKind, Attributes, PreDrawHook, Shadow, TextAttachment,
};
pub use crate::composed::{
    ComposedSequence, ComposedSequenceIndex, ComposedSequences, EnumerationOptions,
    RangeRounding, ReplacementKind,
};
pub use crate::error::{BoundaryInfo, Endpoint, Error, ErrorKind};
pub use crate::text_range::{clamp_range, floor_char_boundary, intersect, range_contains_index};
