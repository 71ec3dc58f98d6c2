// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Serializable pipeline results.

use serde::{Deserialize, Serialize};
use shp_terrain_core::{FileHeader, RecordSelection};
use shp_terrain_geometry::MeshChunk;

/// Counts and timings for one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessingStats {
    /// Records as stored (with at least one point).
    pub record_count: usize,
    /// Records after multi-part splitting.
    pub split_record_count: usize,
    /// Collection fed to the triangulator.
    pub selection: RecordSelection,
    /// Rings handed to the triangulator.
    pub ring_count: usize,
    /// Triangulation vertices.
    pub vertex_count: usize,
    /// Triangles across all chunks.
    pub triangle_count: usize,
    /// Chunks produced.
    pub chunk_count: usize,
    /// Decode time (0 when the dataset was decoded elsewhere).
    pub parse_time_ms: u64,
    pub triangulate_time_ms: u64,
    pub chunk_time_ms: u64,
    pub total_time_ms: u64,
}

/// One chunk as written to JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkExport {
    /// Position of the chunk in triangle order.
    pub index: usize,
    pub vertex_count: usize,
    pub triangle_count: usize,
    /// Axis-aligned bounds of the positions (min, max).
    pub bounds_min: [f32; 3],
    pub bounds_max: [f32; 3],
    /// Vertex positions (x, elevation, y triplets).
    pub positions: Vec<f32>,
    /// Per-vertex face normals, not normalized.
    pub normals: Vec<f32>,
    pub uvs: Vec<f32>,
    pub indices: Vec<u32>,
}

impl ChunkExport {
    pub fn from_chunk(index: usize, chunk: &MeshChunk) -> Self {
        let (min, max) = chunk.bounds();
        Self {
            index,
            vertex_count: chunk.vertex_count(),
            triangle_count: chunk.triangle_count(),
            bounds_min: [min.x, min.y, min.z],
            bounds_max: [max.x, max.y, max.z],
            positions: chunk.positions.clone(),
            normals: chunk.normals.clone(),
            uvs: chunk.uvs.clone(),
            indices: chunk.indices.clone(),
        }
    }
}

/// Full export document: `{header, stats, chunks}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerrainExport {
    pub header: FileHeader,
    pub stats: ProcessingStats,
    pub chunks: Vec<ChunkExport>,
}
