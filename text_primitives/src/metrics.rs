// Copyright 2025 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

#[cfg(feature = "libm")]
#[allow(unused_imports)]
use core_maths::CoreFloat;

/// Vertical metrics of a font or a line of text.
///
/// All three values are non-negative distances: `ascent` above the baseline, `descent` below it,
/// and `leading` as extra space below the descent.
///
/// [`FontMetrics::NULL`] is the sentinel returned by queries that have no answer (for example,
/// the metrics of a line index that does not exist). It compares unequal to every real metric.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FontMetrics {
    /// Distance from the baseline to the top of the line.
    pub ascent: f32,
    /// Distance from the baseline to the bottom of the glyphs.
    pub descent: f32,
    /// Extra spacing below the descent.
    pub leading: f32,
}

impl FontMetrics {
    /// All-zero metrics.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// The "no metrics" sentinel.
    pub const NULL: Self = Self::new(f32::NAN, f32::NAN, f32::NAN);

    /// Creates metrics from raw values. Negative inputs are stored as their magnitude.
    pub const fn new(ascent: f32, descent: f32, leading: f32) -> Self {
        Self {
            ascent: ascent.abs(),
            descent: descent.abs(),
            leading: leading.abs(),
        }
    }

    /// Returns `true` for the [`FontMetrics::NULL`] sentinel.
    pub fn is_null(&self) -> bool {
        self.ascent.is_nan() || self.descent.is_nan() || self.leading.is_nan()
    }

    /// The rounded-up height of a line using these metrics.
    pub fn line_height(&self) -> f32 {
        (self.ascent + self.descent + self.leading).ceil()
    }

    /// Returns metrics whose line height is `target`, keeping descent and leading and
    /// absorbing the difference into the ascent.
    #[must_use]
    pub fn with_target_line_height(&self, target: f32) -> Self {
        Self::new(target - self.descent - self.leading, self.descent, self.leading)
    }

    /// The component-wise maximum of two metrics. `NULL` operands are ignored.
    #[must_use]
    pub fn max(&self, other: &Self) -> Self {
        if self.is_null() {
            return *other;
        }
        if other.is_null() {
            return *self;
        }
        Self {
            ascent: self.ascent.max(other.ascent),
            descent: self.descent.max(other.descent),
            leading: self.leading.max(other.leading),
        }
    }
}

impl Default for FontMetrics {
    fn default() -> Self {
        Self::ZERO
    }
}
