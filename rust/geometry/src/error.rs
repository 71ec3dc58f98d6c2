use thiserror::Error;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during triangulation and chunk building
#[derive(Error, Debug)]
pub enum Error {
    /// A triangle references a vertex with no elevation value
    #[error("Elevation index {index} out of range (table has {len} values)")]
    ElevationIndexOutOfRange { index: usize, len: usize },

    /// A triangle references a vertex outside the vertex array
    #[error("Vertex index {index} out of range (triangulation has {len} vertices)")]
    VertexIndexOutOfRange { index: usize, len: usize },

    #[error(
        "Invalid chunk size: must be between 1 and {} triangles",
        crate::chunking::MAX_CHUNK_SIZE
    )]
    InvalidChunkSize,

    #[error("Triangulation failed: {0}")]
    TriangulationError(String),

    #[error("Core decoder error: {0}")]
    CoreError(#[from] shp_terrain_core::Error),
}
