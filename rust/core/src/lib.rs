// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # SHP-Terrain Core Decoder
//!
//! Byte-exact decoder for the ESRI Shapefile (`.shp`) geometry stream.
//!
//! ## Overview
//!
//! - **Binary Cursor**: fixed-width reads with the byte order picked per call,
//!   since the format mixes big-endian record headers with little-endian payloads
//! - **Header Decoder**: the fixed 100-byte header, with a bounding-box
//!   correction for near-degenerate datasets
//! - **Record Decoder**: variable-length records read until the stream ends
//! - **Part Splitter**: multi-ring records expanded into single-ring polygons
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use shp_terrain_core::{RecordSelection, ShapefileDataset};
//!
//! let dataset = ShapefileDataset::open("contours.shp")?;
//! println!("{}", dataset.header);
//!
//! for record in dataset.select(RecordSelection::Split) {
//!     println!("{} -> {} points", record, record.points.len());
//! }
//! ```
//!
//! ## Supported shape types
//!
//! Null, Point, PolyLine, Polygon and Multipoint. Any other tag aborts the
//! parse with [`Error::UnsupportedShapeType`].
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization support for decoded data

pub mod cursor;
pub mod dataset;
pub mod error;
pub mod header;
pub mod record;
pub mod shape;
pub mod split;

pub use cursor::BinaryCursor;
pub use dataset::{RecordSelection, ShapefileDataset};
pub use error::{Error, Result};
pub use header::{FileHeader, FILE_CODE, HEADER_LENGTH};
pub use record::{PartOffsets, RecordDecoder, ShapeRecord};
pub use shape::{BoundingBox, ShapePoint, ShapeType};
pub use split::split_parts;
