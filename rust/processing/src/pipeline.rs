// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shapefile to terrain chunks: decode, triangulate, build chunks.

use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;
use std::time::Instant;

use shp_terrain_core::{FileHeader, ShapefileDataset};
use shp_terrain_geometry::{build_chunks, MeshChunk, Triangulator};

use crate::config::PipelineConfig;
use crate::error::{ProcessingError, Result};
use crate::input::TerrainInput;
use crate::types::{ChunkExport, ProcessingStats, TerrainExport};

/// Chunks of one run plus its statistics.
#[derive(Debug, Clone, Default)]
pub struct TerrainOutput {
    pub chunks: Vec<MeshChunk>,
    pub stats: ProcessingStats,
}

impl TerrainOutput {
    /// Build the export document for this output.
    pub fn to_export(&self, header: &FileHeader) -> TerrainExport {
        TerrainExport {
            header: *header,
            stats: self.stats.clone(),
            chunks: self
                .chunks
                .iter()
                .enumerate()
                .map(|(index, chunk)| ChunkExport::from_chunk(index, chunk))
                .collect(),
        }
    }

    /// Write the export document as JSON.
    pub fn write_json<W: Write>(&self, header: &FileHeader, writer: W, pretty: bool) -> Result<()> {
        let export = self.to_export(header);
        if pretty {
            serde_json::to_writer_pretty(writer, &export)?;
        } else {
            serde_json::to_writer(writer, &export)?;
        }
        Ok(())
    }
}

/// Triangulate a decoded dataset and cut the result into chunks.
///
/// The first triangulation or chunk error aborts the run; no partial
/// output is returned.
pub fn process_dataset<T>(
    dataset: &ShapefileDataset,
    triangulator: &T,
    config: &PipelineConfig,
) -> Result<TerrainOutput>
where
    T: Triangulator + ?Sized,
{
    let total_start = Instant::now();

    let input = TerrainInput::from_dataset(dataset, config.selection, config.fallback_elevation);

    let triangulate_start = Instant::now();
    let triangulation = triangulator.triangulate(&input.triangulation)?;
    let triangulate_time_ms = triangulate_start.elapsed().as_millis() as u64;

    if triangulation.vertices.len() != input.point_count() {
        tracing::warn!(
            input_points = input.point_count(),
            vertices = triangulation.vertices.len(),
            "triangulator changed the vertex count; elevations may not line up"
        );
    }
    if triangulation.triangles.is_empty() && !input.is_empty() {
        tracing::warn!(
            points = input.point_count(),
            rings = input.triangulation.rings.len(),
            "triangulation produced no triangles"
        );
    }

    let chunk_start = Instant::now();
    let chunks = build_chunks(&triangulation, &input.elevations, &config.chunk)?;
    let chunk_time_ms = chunk_start.elapsed().as_millis() as u64;

    let stats = ProcessingStats {
        record_count: dataset.records.len(),
        split_record_count: dataset.split_records.len(),
        selection: config.selection,
        ring_count: input.triangulation.rings.len(),
        vertex_count: triangulation.vertices.len(),
        triangle_count: triangulation.triangle_count(),
        chunk_count: chunks.len(),
        parse_time_ms: 0,
        triangulate_time_ms,
        chunk_time_ms,
        total_time_ms: total_start.elapsed().as_millis() as u64,
    };

    tracing::debug!(
        triangles = stats.triangle_count,
        chunks = stats.chunk_count,
        triangulate_ms = triangulate_time_ms,
        chunk_ms = chunk_time_ms,
        "processed terrain"
    );

    Ok(TerrainOutput { chunks, stats })
}

/// Decode a `.shp` file and process it.
///
/// The file handle is dropped before triangulation starts, on success and
/// on every error path.
pub fn process_file<P, T>(
    path: P,
    triangulator: &T,
    config: &PipelineConfig,
) -> Result<(ShapefileDataset, TerrainOutput)>
where
    P: AsRef<Path>,
    T: Triangulator + ?Sized,
{
    let path = path.as_ref();
    let parse_start = Instant::now();

    let dataset = {
        let file = File::open(path).map_err(|source| ProcessingError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        ShapefileDataset::parse(BufReader::new(file))?
    };
    let parse_time_ms = parse_start.elapsed().as_millis() as u64;

    tracing::info!(
        path = %path.display(),
        records = dataset.records.len(),
        split_records = dataset.split_records.len(),
        parse_ms = parse_time_ms,
        "decoded shapefile"
    );

    let mut output = process_dataset(&dataset, triangulator, config)?;
    output.stats.parse_time_ms = parse_time_ms;
    output.stats.total_time_ms += parse_time_ms;

    Ok((dataset, output))
}
