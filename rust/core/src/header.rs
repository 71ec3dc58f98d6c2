// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Header Decoder - the fixed 100-byte file header

use std::fmt;
use std::io::Read;

use crate::cursor::BinaryCursor;
use crate::error::{Error, Result};
use crate::shape::{BoundingBox, ShapeType};

/// Magic number stored big-endian in the first four bytes
pub const FILE_CODE: i32 = 9994;

/// Bytes reserved for the header, including fields this crate ignores
pub const HEADER_LENGTH: u64 = 100;

/// Decoded file header
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FileHeader {
    pub file_code: i32,
    /// Total file length in 16-bit words
    pub file_length: i32,
    pub version: i32,
    /// Raw shape type tag declared for the whole file
    pub shape_type: i32,
    /// Bounding box after the degeneracy correction
    pub bbox: BoundingBox,
}

impl FileHeader {
    /// Decode the header from a cursor positioned at offset 0.
    ///
    /// Leaves the cursor at offset 100 regardless of how many header
    /// bytes were interpreted.
    pub fn decode<R: Read>(cursor: &mut BinaryCursor<R>) -> Result<Self> {
        let file_code = cursor.read_i32_be()?;
        if file_code != FILE_CODE {
            return Err(Error::invalid_format(
                0,
                format!(
                    "invalid file code {}, expecting {}",
                    file_code, FILE_CODE
                ),
            ));
        }

        // Five unused big-endian words
        for _ in 0..5 {
            cursor.read_i32_be()?;
        }

        let file_length = cursor.read_i32_be()?;
        let version = cursor.read_i32_le()?;
        let shape_type = cursor.read_i32_le()?;

        // Stored interleaved: xmin, ymin, xmax, ymax
        let x_min = cursor.read_f64_le()?;
        let y_min = cursor.read_f64_le()?;
        let x_max = cursor.read_f64_le()?;
        let y_max = cursor.read_f64_le()?;
        let bbox = BoundingBox::new(x_min, y_min, x_max, y_max).expanded_if_degenerate();

        cursor.seek_to_offset(HEADER_LENGTH)?;

        Ok(Self {
            file_code,
            file_length,
            version,
            shape_type,
            bbox,
        })
    }

    /// File length converted from 16-bit words to bytes
    #[inline]
    pub fn file_length_bytes(&self) -> u64 {
        self.file_length.max(0) as u64 * 2
    }

    /// The declared shape type, if it is one this crate understands
    pub fn declared_shape_type(&self) -> Option<ShapeType> {
        ShapeType::try_from(self.shape_type).ok()
    }

    /// Bounds as `[x_min, x_max, y_min, y_max]`, grouped by axis
    pub fn min_max(&self) -> [f64; 4] {
        [self.bbox.x_min, self.bbox.x_max, self.bbox.y_min, self.bbox.y_max]
    }
}

impl Default for FileHeader {
    fn default() -> Self {
        Self {
            file_code: FILE_CODE,
            file_length: 0,
            version: 0,
            shape_type: 0,
            bbox: BoundingBox::default(),
        }
    }
}

impl fmt::Display for FileHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FileHeader: file_code={}, file_length={}, version={}, shape_type={}, \
             x_min={}, x_max={}, y_min={}, y_max={}",
            self.file_code,
            self.file_length,
            self.version,
            self.shape_type,
            self.bbox.x_min,
            self.bbox.x_max,
            self.bbox.y_min,
            self.bbox.y_max
        )
    }
}
