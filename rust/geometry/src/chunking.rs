// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Terrain Mesh Chunk Builder
//!
//! Splits a triangle list into consecutive groups of at most `chunk_size`
//! triangles and turns each group into a [`MeshChunk`]:
//!
//! - winding is reversed (vertex 2, 1, 0) because the triangulation is
//!   wound opposite to the target's front-face convention
//! - vertices are never shared, so each triangle gets its own three
//! - the normal is `(v1 - v0) x (v2 - v0)` on the reversed triangle and is
//!   left unnormalized; its length is twice the triangle area
//! - planar `(x, y)` maps to `(x, elevation, y)`: elevation is the up axis

use nalgebra::Point3;
use rayon::prelude::*;

use crate::elevation::ElevationTable;
use crate::error::{Error, Result};
use crate::mesh::{CoordinateShift, MeshChunk};
use crate::triangulation::Triangulation;

/// Default triangles per chunk. Three unshared vertices per triangle keeps a
/// full chunk at 60 000 vertices, under the common 65 535 per-mesh limit.
pub const DEFAULT_CHUNK_SIZE: usize = 20_000;

/// Largest chunk whose local vertex indices still fit in `u32`
pub const MAX_CHUNK_SIZE: usize = u32::MAX as usize / 3;

/// Chunk building options
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChunkConfig {
    /// Maximum triangles per chunk
    pub chunk_size: usize,
    /// Build chunks on the rayon pool
    pub parallel: bool,
    /// Offset subtracted from every output position
    pub shift: CoordinateShift,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            parallel: true,
            shift: CoordinateShift::default(),
        }
    }
}

impl ChunkConfig {
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_shift(mut self, shift: CoordinateShift) -> Self {
        self.shift = shift;
        self
    }
}

/// Number of chunks needed for `triangle_count` triangles
#[inline]
pub fn chunk_count(triangle_count: usize, chunk_size: usize) -> usize {
    if chunk_size == 0 {
        return 0;
    }
    triangle_count.div_ceil(chunk_size)
}

/// Build all chunks for a triangulation.
///
/// Chunks come back in triangle order. The first out-of-range vertex or
/// elevation index aborts the whole build.
pub fn build_chunks(
    triangulation: &Triangulation,
    elevations: &ElevationTable,
    config: &ChunkConfig,
) -> Result<Vec<MeshChunk>> {
    if config.chunk_size == 0 || config.chunk_size > MAX_CHUNK_SIZE {
        return Err(Error::InvalidChunkSize);
    }

    if elevations.len() != triangulation.vertices.len() {
        tracing::warn!(
            vertices = triangulation.vertices.len(),
            elevations = elevations.len(),
            "elevation table and vertex array differ in length"
        );
    }

    let builder = ChunkBuilder {
        triangulation,
        elevations,
        shift: config.shift,
    };

    let chunks = if config.parallel {
        triangulation
            .triangles
            .par_chunks(config.chunk_size)
            .map(|group| builder.build(group))
            .collect::<Result<Vec<_>>>()?
    } else {
        triangulation
            .triangles
            .chunks(config.chunk_size)
            .map(|group| builder.build(group))
            .collect::<Result<Vec<_>>>()?
    };

    tracing::debug!(
        triangles = triangulation.triangles.len(),
        chunks = chunks.len(),
        chunk_size = config.chunk_size,
        "built terrain chunks"
    );
    Ok(chunks)
}

/// Read-only view shared by every chunk
struct ChunkBuilder<'a> {
    triangulation: &'a Triangulation,
    elevations: &'a ElevationTable,
    shift: CoordinateShift,
}

impl ChunkBuilder<'_> {
    /// Position of a global vertex: planar x, elevation up, planar y as depth
    fn point_3d(&self, index: usize) -> Result<Point3<f64>> {
        let vertex = self
            .triangulation
            .vertices
            .get(index)
            .ok_or(Error::VertexIndexOutOfRange {
                index,
                len: self.triangulation.vertices.len(),
            })?;
        let elevation = self.elevations.get(index)?;
        Ok(Point3::new(vertex.x, elevation, vertex.y))
    }

    fn build(&self, group: &[[usize; 3]]) -> Result<MeshChunk> {
        let mut chunk = MeshChunk::with_triangle_capacity(group.len());

        for &[a, b, c] in group {
            // Reversed winding
            let v0 = self.point_3d(c)?;
            let v1 = self.point_3d(b)?;
            let v2 = self.point_3d(a)?;

            // Not normalized: magnitude is twice the triangle area
            let normal = (v1 - v0).cross(&(v2 - v0));

            let i0 = chunk.add_vertex_with_shift(v0, normal, &self.shift);
            let i1 = chunk.add_vertex_with_shift(v1, normal, &self.shift);
            let i2 = chunk.add_vertex_with_shift(v2, normal, &self.shift);
            chunk.add_triangle(i0, i1, i2);
        }

        Ok(chunk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Point2;

    fn grid(n: usize) -> (Triangulation, ElevationTable) {
        let mut vertices = Vec::new();
        let mut elevations = Vec::new();
        for y in 0..=n {
            for x in 0..=n {
                vertices.push(Point2::new(x as f64, y as f64));
                elevations.push((x + y) as f64 * 0.5);
            }
        }
        let row = n + 1;
        let mut triangles = Vec::new();
        for y in 0..n {
            for x in 0..n {
                let i = y * row + x;
                triangles.push([i, i + 1, i + row]);
                triangles.push([i + 1, i + row + 1, i + row]);
            }
        }
        (Triangulation::new(vertices, triangles), ElevationTable::new(elevations))
    }

    #[test]
    fn test_chunk_count() {
        assert_eq!(chunk_count(0, 10), 0);
        assert_eq!(chunk_count(1, 10), 1);
        assert_eq!(chunk_count(10, 10), 1);
        assert_eq!(chunk_count(11, 10), 2);
        assert_eq!(chunk_count(45_000, DEFAULT_CHUNK_SIZE), 3);
    }

    #[test]
    fn test_single_triangle() {
        let triangulation = Triangulation::new(
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(1.0, 0.0),
                Point2::new(0.0, 1.0),
            ],
            vec![[0, 1, 2]],
        );
        let elevations = ElevationTable::new(vec![10.0, 20.0, 30.0]);

        let chunks = build_chunks(&triangulation, &elevations, &ChunkConfig::default()).unwrap();
        assert_eq!(chunks.len(), 1);
        let chunk = &chunks[0];

        // Emitted in order 2, 1, 0 as (x, elevation, y)
        assert_eq!(
            chunk.positions,
            vec![0.0, 30.0, 1.0, 1.0, 20.0, 0.0, 0.0, 10.0, 0.0]
        );
        assert_eq!(chunk.indices, vec![0, 1, 2]);
        assert_eq!(chunk.uvs, vec![0.0; 6]);

        // (v1 - v0) x (v2 - v0) = (1, -10, -1) x (0, -20, -1) = (-10, 1, -20)
        for v in 0..3 {
            assert_eq!(chunk.normal(v), Some([-10.0, 1.0, -20.0]));
        }
    }

    #[test]
    fn test_flat_triangle_normal_points_up() {
        // A counter-clockwise planar triangle ends up facing +elevation
        let triangulation = Triangulation::new(
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(2.0, 0.0),
                Point2::new(0.0, 2.0),
            ],
            vec![[0, 1, 2]],
        );
        let elevations = ElevationTable::new(vec![0.0; 3]);
        let chunks = build_chunks(&triangulation, &elevations, &ChunkConfig::default()).unwrap();

        // Length is twice the area (area 2)
        assert_eq!(chunks[0].normal(0), Some([0.0, 4.0, 0.0]));
    }

    #[test]
    fn test_chunk_partitioning() {
        let (triangulation, elevations) = grid(5); // 50 triangles
        let config = ChunkConfig::default().with_chunk_size(12);

        let chunks = build_chunks(&triangulation, &elevations, &config).unwrap();
        assert_eq!(chunks.len(), 5);
        for chunk in &chunks[..4] {
            assert_eq!(chunk.triangle_count(), 12);
            assert_eq!(chunk.vertex_count(), 36);
        }
        assert_eq!(chunks[4].triangle_count(), 2);

        for chunk in &chunks {
            assert_eq!(chunk.indices.len(), chunk.triangle_count() * 3);
            assert_eq!(chunk.uvs.len(), chunk.vertex_count() * 2);
            assert_eq!(chunk.normals.len(), chunk.positions.len());
            let expected: Vec<u32> = (0..chunk.vertex_count() as u32).collect();
            assert_eq!(chunk.indices, expected);
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let (triangulation, elevations) = grid(20);
        let base = ChunkConfig::default().with_chunk_size(64);

        let parallel = build_chunks(&triangulation, &elevations, &base.with_parallel(true)).unwrap();
        let sequential =
            build_chunks(&triangulation, &elevations, &base.with_parallel(false)).unwrap();
        assert_eq!(parallel, sequential);
    }

    #[test]
    fn test_empty_triangulation() {
        let triangulation = Triangulation::new(vec![Point2::new(0.0, 0.0)], Vec::new());
        let elevations = ElevationTable::new(vec![0.0]);
        let chunks = build_chunks(&triangulation, &elevations, &ChunkConfig::default()).unwrap();
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_zero_chunk_size() {
        let (triangulation, elevations) = grid(1);
        let config = ChunkConfig::default().with_chunk_size(0);
        assert!(matches!(
            build_chunks(&triangulation, &elevations, &config),
            Err(Error::InvalidChunkSize)
        ));
    }

    #[test]
    fn test_oversized_chunk_size() {
        let (triangulation, elevations) = grid(1);
        for size in [MAX_CHUNK_SIZE + 1, usize::MAX] {
            let config = ChunkConfig::default().with_chunk_size(size);
            assert!(matches!(
                build_chunks(&triangulation, &elevations, &config),
                Err(Error::InvalidChunkSize)
            ));
        }

        let config = ChunkConfig::default().with_chunk_size(MAX_CHUNK_SIZE);
        let chunks = build_chunks(&triangulation, &elevations, &config).unwrap();
        assert_eq!(chunks.len(), 1);
    }

    #[test]
    fn test_short_elevation_table() {
        let (triangulation, mut elevations) = grid(2);
        let values = elevations.as_slice()[..elevations.len() - 1].to_vec();
        elevations = ElevationTable::new(values);

        for parallel in [true, false] {
            let config = ChunkConfig::default().with_parallel(parallel);
            match build_chunks(&triangulation, &elevations, &config) {
                Err(Error::ElevationIndexOutOfRange { index, len }) => {
                    assert_eq!(index, 8);
                    assert_eq!(len, 8);
                }
                other => panic!("expected elevation error, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_vertex_index_out_of_range() {
        let triangulation = Triangulation::new(vec![Point2::new(0.0, 0.0)], vec![[0, 0, 3]]);
        let elevations = ElevationTable::new(vec![0.0; 4]);
        assert!(matches!(
            build_chunks(&triangulation, &elevations, &ChunkConfig::default()),
            Err(Error::VertexIndexOutOfRange { index: 3, len: 1 })
        ));
    }

    #[test]
    fn test_shift_applied() {
        let triangulation = Triangulation::new(
            vec![
                Point2::new(1000.0, 2000.0),
                Point2::new(1001.0, 2000.0),
                Point2::new(1000.0, 2001.0),
            ],
            vec![[0, 1, 2]],
        );
        let elevations = ElevationTable::new(vec![50.0; 3]);
        let config = ChunkConfig::default().with_shift(CoordinateShift::new(1000.0, 50.0, 2000.0));

        let chunks = build_chunks(&triangulation, &elevations, &config).unwrap();
        assert_eq!(chunks[0].position(0), Some([0.0, 0.0, 1.0]));
        assert_eq!(chunks[0].position(2), Some([0.0, 0.0, 0.0]));
    }
}
