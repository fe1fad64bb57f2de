// Copyright 2025 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fundamental text property types.
//!
//! This crate is the small, `no_std`-friendly vocabulary shared by the attributed text model and
//! the layout engine: font descriptors, font metrics, and paragraph-level properties.
//!
//! ## Features
//!
//! - `std` (enabled by default): Uses the standard library for float rounding.
//! - `libm`: Uses `core_maths` for float rounding, for builds without `std`.
//!
//! At least one of `std` and `libm` must be enabled.
//!
//! ## Example
//!
//! ```
//! use text_primitives::{Font, FontMetrics, FontWeight};
//!
//! let font = Font::new("Helvetica", 13.0).with_weight(FontWeight::BOLD);
//! assert_eq!(font.size(), 13.0);
//!
//! let metrics = FontMetrics::new(10.0, 3.0, 0.5);
//! assert_eq!(metrics.line_height(), 14.0);
//! assert!(FontMetrics::NULL.is_null());
//! ```
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
#![no_std]

#[cfg(not(any(feature = "std", feature = "libm")))]
compile_error!("text_primitives requires either the `std` or `libm` feature to be enabled");

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

mod font;
mod metrics;
mod paragraph;

pub use font::{Font, FontStyle, FontWeight};
pub use metrics::FontMetrics;
pub use paragraph::{BackgroundFillStyle, LineBreakMode, ParagraphStyle, TextAlignment};
