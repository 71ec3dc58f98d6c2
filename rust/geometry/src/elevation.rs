// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-vertex elevation lookup

use shp_terrain_core::ShapePoint;

use crate::error::{Error, Result};

/// Elevations indexed by vertex, in the order points were handed to the
/// triangulator.
///
/// The table stores values computed elsewhere; it never interpolates and
/// never substitutes a default for a missing index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElevationTable {
    values: Vec<f64>,
}

impl ElevationTable {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    /// Elevations taken from the stored z of each point.
    ///
    /// Planar points have no z; they get `fallback`.
    pub fn from_points<'a, I>(points: I, fallback: f64) -> Self
    where
        I: IntoIterator<Item = &'a ShapePoint>,
    {
        Self {
            values: points.into_iter().map(|p| p.z.unwrap_or(fallback)).collect(),
        }
    }

    /// Elevation of vertex `index`
    #[inline]
    pub fn get(&self, index: usize) -> Result<f64> {
        self.values
            .get(index)
            .copied()
            .ok_or(Error::ElevationIndexOutOfRange {
                index,
                len: self.values.len(),
            })
    }

    pub fn push(&mut self, elevation: f64) {
        self.values.push(elevation);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Lowest and highest elevation, `None` when empty
    pub fn range(&self) -> Option<(f64, f64)> {
        let first = *self.values.first()?;
        Some(
            self.values
                .iter()
                .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v))),
        )
    }
}

impl From<Vec<f64>> for ElevationTable {
    fn from(values: Vec<f64>) -> Self {
        Self::new(values)
    }
}

impl FromIterator<f64> for ElevationTable {
    fn from_iter<T: IntoIterator<Item = f64>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
