// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shapefile Dataset - header plus decoded and split records

use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::str::FromStr;

use crate::cursor::BinaryCursor;
use crate::error::{Error, Result};
use crate::header::FileHeader;
use crate::record::{RecordDecoder, ShapeRecord};
use crate::shape::ShapePoint;

/// Which record collection a consumer reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RecordSelection {
    /// Records as stored, multi-part records intact
    Original,
    /// Single-ring records, multi-part records expanded
    #[default]
    Split,
}

impl FromStr for RecordSelection {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "original" => Ok(RecordSelection::Original),
            "split" => Ok(RecordSelection::Split),
            other => Err(format!("unknown record selection '{}'", other)),
        }
    }
}

impl fmt::Display for RecordSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordSelection::Original => write!(f, "original"),
            RecordSelection::Split => write!(f, "split"),
        }
    }
}

/// A fully decoded shapefile.
///
/// `records` keeps every record with at least one point. `split_records`
/// holds the same geometry with every multi-part record replaced by its
/// rings; single-part records appear in both collections.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShapefileDataset {
    pub header: FileHeader,
    pub records: Vec<ShapeRecord>,
    pub split_records: Vec<ShapeRecord>,
}

impl ShapefileDataset {
    /// Decode a complete dataset from a stream positioned at offset 0.
    ///
    /// Either every record decodes or the first error is returned.
    pub fn parse<R: Read>(reader: R) -> Result<Self> {
        let mut cursor = BinaryCursor::new(reader);
        let header = FileHeader::decode(&mut cursor)?;

        let mut dataset = Self {
            header,
            records: Vec::new(),
            split_records: Vec::new(),
        };

        for record in RecordDecoder::new(&mut cursor) {
            dataset.push(record?);
        }

        tracing::debug!(
            records = dataset.records.len(),
            split_records = dataset.split_records.len(),
            bytes = cursor.position(),
            declared_bytes = dataset.header.file_length_bytes(),
            "decoded shapefile"
        );
        Ok(dataset)
    }

    /// Open and decode a `.shp` file. The file is closed before returning.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| Error::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(BufReader::new(file))
    }

    /// Add a decoded record to both collections
    pub fn push(&mut self, record: ShapeRecord) {
        if record.points.is_empty() {
            tracing::trace!(record = record.record_number, "skipping record without points");
            return;
        }

        if record.is_multi_part() {
            self.split_records.extend(record.split_parts());
        } else {
            self.split_records.push(record.clone());
        }
        self.records.push(record);
    }

    /// Records of the chosen collection
    pub fn select(&self, selection: RecordSelection) -> &[ShapeRecord] {
        match selection {
            RecordSelection::Original => &self.records,
            RecordSelection::Split => &self.split_records,
        }
    }

    /// Every point of the chosen collection, in record order
    pub fn points(&self, selection: RecordSelection) -> impl Iterator<Item = &ShapePoint> + '_ {
        self.select(selection).iter().flat_map(|r| r.points.iter())
    }

    pub fn point_count(&self, selection: RecordSelection) -> usize {
        self.select(selection).iter().map(|r| r.points.len()).sum()
    }
}

impl fmt::Display for ShapefileDataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ShapefileDataset: {} ({} records, {} split records)",
            self.header,
            self.records.len(),
            self.split_records.len()
        )
    }
}
