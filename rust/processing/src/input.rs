// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Triangulator input gathered from a decoded dataset

use shp_terrain_core::{RecordSelection, ShapefileDataset};
use shp_terrain_geometry::{ElevationTable, Point2, TriangulationInput};

/// Planar points, ring constraints and elevations, index-aligned.
///
/// Vertex `i` of the triangulator input has elevation `i` in the table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TerrainInput {
    pub triangulation: TriangulationInput,
    pub elevations: ElevationTable,
}

impl TerrainInput {
    /// Gather every point of the selected records in record order.
    ///
    /// Each part of a PolyLine or Polygon record becomes one ring. Point and
    /// Multipoint records contribute loose points.
    pub fn from_dataset(
        dataset: &ShapefileDataset,
        selection: RecordSelection,
        fallback_elevation: f64,
    ) -> Self {
        let records = dataset.select(selection);
        let point_count = dataset.point_count(selection);

        let mut triangulation = TriangulationInput {
            points: Vec::with_capacity(point_count),
            rings: Vec::new(),
        };

        for record in records {
            let base = triangulation.points.len();
            triangulation
                .points
                .extend(record.points.iter().map(|p| Point2::new(p.x, p.y)));

            if record.shape_type.has_parts() {
                triangulation.rings.extend(
                    record
                        .part_ranges()
                        .map(|range| base + range.start..base + range.end),
                );
            }
        }

        let elevations = ElevationTable::from_points(dataset.points(selection), fallback_elevation);

        tracing::debug!(
            selection = %selection,
            records = records.len(),
            points = triangulation.points.len(),
            rings = triangulation.rings.len(),
            "gathered terrain input"
        );

        Self {
            triangulation,
            elevations,
        }
    }

    #[inline]
    pub fn point_count(&self) -> usize {
        self.triangulation.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.triangulation.is_empty()
    }
}
