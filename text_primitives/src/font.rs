// Copyright 2025 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::sync::Arc;
use core::fmt;

/// Visual weight class of a font, typically on a scale from 1.0 to 1000.0.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct FontWeight(f32);

impl FontWeight {
    /// Weight value of 300.
    pub const LIGHT: Self = Self(300.0);

    /// Weight value of 400. This is the default value.
    pub const NORMAL: Self = Self(400.0);

    /// Weight value of 500.
    pub const MEDIUM: Self = Self(500.0);

    /// Weight value of 600.
    pub const SEMI_BOLD: Self = Self(600.0);

    /// Weight value of 700.
    pub const BOLD: Self = Self(700.0);

    /// Creates a new weight value.
    pub fn new(weight: f32) -> Self {
        Self(weight)
    }

    /// Returns the underlying weight value.
    pub fn value(self) -> f32 {
        self.0
    }
}

impl Default for FontWeight {
    fn default() -> Self {
        Self::NORMAL
    }
}

impl fmt::Display for FontWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Slant of a font.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum FontStyle {
    /// An upright face.
    #[default]
    Normal,
    /// A true italic face.
    Italic,
    /// A synthesized or designed oblique face.
    Oblique,
}

/// A font request: family name, point size, weight and slant.
///
/// Resolving the request to actual font data is the job of the shaping engine; this type only
/// names what was asked for.
#[derive(Clone, Debug, PartialEq)]
pub struct Font {
    family: Arc<str>,
    size: f32,
    weight: FontWeight,
    style: FontStyle,
}

impl Font {
    /// Creates a regular-weight, upright font request.
    pub fn new(family: impl Into<Arc<str>>, size: f32) -> Self {
        Self {
            family: family.into(),
            size,
            weight: FontWeight::NORMAL,
            style: FontStyle::Normal,
        }
    }

    /// The system UI font at the given size.
    pub fn system(size: f32) -> Self {
        Self::new("system-ui", size)
    }

    /// Returns a copy with the given weight.
    #[must_use]
    pub fn with_weight(mut self, weight: FontWeight) -> Self {
        self.weight = weight;
        self
    }

    /// Returns a copy with the given style.
    #[must_use]
    pub fn with_style(mut self, style: FontStyle) -> Self {
        self.style = style;
        self
    }

    /// Returns a copy with the given point size.
    #[must_use]
    pub fn with_size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    /// The family name.
    pub fn family(&self) -> &str {
        &self.family
    }

    /// The point size.
    pub fn size(&self) -> f32 {
        self.size
    }

    /// The weight.
    pub fn weight(&self) -> FontWeight {
        self.weight
    }

    /// The slant.
    pub fn style(&self) -> FontStyle {
        self.style
    }
}

impl Default for Font {
    fn default() -> Self {
        Self::system(12.0)
    }
}
