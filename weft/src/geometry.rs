// Copyright 2025 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Points and rects tagged with the coordinate space they live in.
//!
//! Layout space has its origin at the top-left with y growing downward. Native space is the
//! shaping engine's space: origin at the bottom-left, y growing upward. The two are only related
//! through [`TextLayout`](crate::TextLayout)'s conversion methods.

use peniko::kurbo::{Point, Rect, Size, Vec2};

/// A point in layout space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LayoutPoint(pub Point);

/// A rect in layout space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LayoutRect(pub Rect);

/// A point in native (shaping engine) space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NativePoint(pub Point);

/// A rect in native (shaping engine) space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NativeRect(pub Rect);

impl LayoutPoint {
    /// The origin.
    pub const ZERO: Self = Self(Point::ZERO);

    /// Creates a point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self(Point::new(x, y))
    }

    /// Horizontal coordinate.
    pub fn x(self) -> f64 {
        self.0.x
    }

    /// Vertical coordinate, growing downward.
    pub fn y(self) -> f64 {
        self.0.y
    }
}

impl LayoutRect {
    /// The empty rect at the origin.
    pub const ZERO: Self = Self(Rect::ZERO);

    /// Creates a rect from its edges.
    pub const fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self(Rect::new(x0, y0, x1, y1))
    }

    /// Creates a rect from an origin and a size.
    pub fn from_origin_size(origin: LayoutPoint, size: Size) -> Self {
        Self(Rect::from_origin_size(origin.0, size))
    }

    /// Top-left corner.
    pub fn origin(self) -> LayoutPoint {
        LayoutPoint(self.0.origin())
    }

    /// Width and height.
    pub fn size(self) -> Size {
        self.0.size()
    }

    /// The smallest rect containing both.
    #[must_use]
    pub fn union(self, other: Self) -> Self {
        Self(self.0.union(other.0))
    }

    /// Moves the rect.
    #[must_use]
    pub fn offset(self, delta: Vec2) -> Self {
        Self(self.0 + delta)
    }

    /// Returns `true` if `point` lies inside, edges included.
    pub fn contains(self, point: LayoutPoint) -> bool {
        let Rect { x0, y0, x1, y1 } = self.0;
        point.0.x >= x0 && point.0.x <= x1 && point.0.y >= y0 && point.0.y <= y1
    }

    /// Returns `true` if the two rects overlap or touch.
    pub fn intersects(self, other: Self) -> bool {
        self.0.x0 <= other.0.x1
            && other.0.x0 <= self.0.x1
            && self.0.y0 <= other.0.y1
            && other.0.y0 <= self.0.y1
    }
}

impl NativePoint {
    /// Creates a point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self(Point::new(x, y))
    }
}

impl NativeRect {
    /// Creates a rect from its edges.
    pub const fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self(Rect::new(x0, y0, x1, y1))
    }
}

/// Flips between layout and native space for a layout of the given height.
///
/// The flip is its own inverse.
pub(crate) fn flip_point(point: Point, height: f64) -> Point {
    Point::new(point.x, height - point.y)
}

pub(crate) fn flip_rect(rect: Rect, height: f64) -> Rect {
    Rect::new(rect.x0, height - rect.y1, rect.x1, height - rect.y0)
}
