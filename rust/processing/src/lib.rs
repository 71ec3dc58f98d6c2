// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! SHP-Terrain processing pipeline
//!
//! Glue between the shapefile decoder and the chunk builder: gathers
//! triangulator input from a dataset, runs a [`Triangulator`], builds mesh
//! chunks and packages the result with statistics for export.
//!
//! ```rust,ignore
//! use shp_terrain_geometry::EarcutTriangulator;
//! use shp_terrain_processing::{process_file, PipelineConfig};
//!
//! let config = PipelineConfig::from_env();
//! let (dataset, output) = process_file("terrain.shp", &EarcutTriangulator, &config)?;
//! output.write_json(&dataset.header, std::io::stdout(), false)?;
//! ```
//!
//! [`Triangulator`]: shp_terrain_geometry::Triangulator

pub mod config;
pub mod error;
pub mod input;
pub mod pipeline;
pub mod types;

pub use config::PipelineConfig;
pub use error::{ProcessingError, Result};
pub use input::TerrainInput;
pub use pipeline::{process_dataset, process_file, TerrainOutput};
pub use types::{ChunkExport, ProcessingStats, TerrainExport};
