//! SHP-Terrain Geometry Processing
//!
//! Turns a triangulated point set plus per-vertex elevations into
//! bounded-size, flat-shaded mesh chunks, using nalgebra for vector math,
//! earcutr and delaunator for triangulation and rayon for parallel chunk builds.

pub mod chunking;
pub mod elevation;
pub mod error;
pub mod mesh;
pub mod triangulation;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Point3, Vector3};

pub use chunking::{build_chunks, chunk_count, ChunkConfig, DEFAULT_CHUNK_SIZE, MAX_CHUNK_SIZE};
pub use elevation::ElevationTable;
pub use error::{Error, Result};
pub use mesh::{CoordinateShift, MeshChunk};
pub use triangulation::{
    triangulate_polygon, AutoTriangulator, DelaunayTriangulator, EarcutTriangulator,
    Triangulation, TriangulationInput, Triangulator,
};
