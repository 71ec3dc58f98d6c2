// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shape type tags, points and bounding boxes

use std::fmt;

/// Shape types decoded by this crate.
///
/// Each shapefile holds a single shape type; Z/M variants and MultiPatch
/// are rejected as unsupported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(i32)]
pub enum ShapeType {
    /// Placeholder record without geometry
    Null = 0,
    Point = 1,
    /// One or more connected paths (roads, rivers)
    PolyLine = 3,
    /// One or more closed rings (boundaries, lakes)
    Polygon = 5,
    Multipoint = 8,
}

impl ShapeType {
    /// Raw wire tag
    #[inline]
    pub fn tag(self) -> i32 {
        self as i32
    }

    /// PolyLine and Polygon records carry a part table
    #[inline]
    pub fn has_parts(self) -> bool {
        matches!(self, ShapeType::PolyLine | ShapeType::Polygon)
    }
}

impl TryFrom<i32> for ShapeType {
    type Error = i32;

    fn try_from(tag: i32) -> std::result::Result<Self, i32> {
        match tag {
            0 => Ok(ShapeType::Null),
            1 => Ok(ShapeType::Point),
            3 => Ok(ShapeType::PolyLine),
            5 => Ok(ShapeType::Polygon),
            8 => Ok(ShapeType::Multipoint),
            other => Err(other),
        }
    }
}

impl fmt::Display for ShapeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ShapeType::Null => "Null",
            ShapeType::Point => "Point",
            ShapeType::PolyLine => "PolyLine",
            ShapeType::Polygon => "Polygon",
            ShapeType::Multipoint => "Multipoint",
        };
        f.write_str(name)
    }
}

/// A decoded vertex. Only Point records carry an elevation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShapePoint {
    pub x: f64,
    pub y: f64,
    pub z: Option<f64>,
}

impl ShapePoint {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: None }
    }

    #[inline]
    pub fn with_z(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z: Some(z) }
    }
}

/// Axis-aligned 2D bounds, stored in wire order (xmin, ymin, xmax, ymax)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundingBox {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
}

impl BoundingBox {
    /// Minimum extent (in dataset units) below which an axis is widened
    pub const DEGENERATE_EXTENT: f64 = 1.0;
    /// Amount added on each side of a degenerate axis
    pub const DEGENERATE_PADDING: f64 = 5.0;

    #[inline]
    pub fn new(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Self {
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    /// Zero-area box located at a single point
    #[inline]
    pub fn from_point(x: f64, y: f64) -> Self {
        Self::new(x, y, x, y)
    }

    /// Tight bounds of a point set, `None` when empty
    pub fn from_points(points: &[ShapePoint]) -> Option<Self> {
        let first = points.first()?;
        let mut bbox = Self::from_point(first.x, first.y);
        for p in &points[1..] {
            bbox.x_min = bbox.x_min.min(p.x);
            bbox.y_min = bbox.y_min.min(p.y);
            bbox.x_max = bbox.x_max.max(p.x);
            bbox.y_max = bbox.y_max.max(p.y);
        }
        Some(bbox)
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    /// Widen each axis whose extent is under one unit by five units per side.
    ///
    /// Axes are corrected independently; a single-point dataset ends up
    /// with a 10x10 box centred on the point.
    pub fn expanded_if_degenerate(mut self) -> Self {
        if self.width().abs() < Self::DEGENERATE_EXTENT {
            self.x_min -= Self::DEGENERATE_PADDING;
            self.x_max += Self::DEGENERATE_PADDING;
        }
        if self.height().abs() < Self::DEGENERATE_EXTENT {
            self.y_min -= Self::DEGENERATE_PADDING;
            self.y_max += Self::DEGENERATE_PADDING;
        }
        self
    }
}
