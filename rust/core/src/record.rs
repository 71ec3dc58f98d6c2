// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Record Decoder - variable-length shape records
//!
//! Records are read one after another until the stream runs dry. Running
//! out of bytes while reading the leading record number is the normal end
//! of the record stream; running out anywhere else is a truncated record.

use std::fmt;
use std::io::Read;
use std::ops::Range;

use smallvec::SmallVec;

use crate::cursor::BinaryCursor;
use crate::error::{Error, Result};
use crate::shape::{BoundingBox, ShapePoint, ShapeType};

/// Part offsets of a record. Nearly every record has a single ring.
pub type PartOffsets = SmallVec<[usize; 4]>;

/// A decoded shape record
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShapeRecord {
    /// 1-based record number from the record header
    pub record_number: i32,
    /// Content length in 16-bit words, as stored
    pub content_length: i32,
    pub shape_type: ShapeType,
    /// Only meaningful for Point, PolyLine, Polygon and Multipoint
    pub bbox: BoundingBox,
    /// Start offsets into `points`, empty for Point and Multipoint
    pub parts: PartOffsets,
    pub points: Vec<ShapePoint>,
}

impl ShapeRecord {
    /// Empty record of the given type
    pub fn new(record_number: i32, content_length: i32, shape_type: ShapeType) -> Self {
        Self {
            record_number,
            content_length,
            shape_type,
            bbox: BoundingBox::default(),
            parts: PartOffsets::new(),
            points: Vec::new(),
        }
    }

    #[inline]
    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    #[inline]
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_multi_part(&self) -> bool {
        self.parts.len() > 1
    }

    /// Half-open point range of every part.
    ///
    /// The last part runs to the end of `points`. An offset equal to
    /// `points.len()` yields an empty range.
    pub fn part_ranges(&self) -> impl Iterator<Item = Range<usize>> + '_ {
        let len = self.points.len();
        self.parts.iter().enumerate().map(move |(i, &start)| {
            let end = self.parts.get(i + 1).copied().unwrap_or(len);
            start..end
        })
    }

    /// Points of one part
    pub fn part_points(&self, part: usize) -> Option<&[ShapePoint]> {
        let range = self.part_ranges().nth(part)?;
        self.points.get(range)
    }
}

impl fmt::Display for ShapeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ShapeRecord: record_number={}, content_length={}, shape_type={}, parts={}, points={}",
            self.record_number,
            self.content_length,
            self.shape_type,
            self.parts.len(),
            self.points.len()
        )
    }
}

/// Iterator over the records that follow the file header.
///
/// The first error ends iteration; later calls return `None`.
pub struct RecordDecoder<'c, R> {
    cursor: &'c mut BinaryCursor<R>,
    finished: bool,
}

impl<'c, R: Read> RecordDecoder<'c, R> {
    /// Decode records starting at the cursor's current position
    pub fn new(cursor: &'c mut BinaryCursor<R>) -> Self {
        Self {
            cursor,
            finished: false,
        }
    }

    /// Decode the next record, `Ok(None)` at the end of the record stream
    pub fn next_record(&mut self) -> Result<Option<ShapeRecord>> {
        let start = self.cursor.position();

        let record_number = match self.cursor.read_i32_be() {
            Ok(n) => n,
            Err(Error::UnexpectedEndOfInput { available, .. }) => {
                if available > 0 {
                    tracing::debug!(
                        offset = start,
                        trailing_bytes = available,
                        "ignoring partial record header at end of stream"
                    );
                }
                return Ok(None);
            }
            Err(e) => return Err(e),
        };
        let content_length = self.cursor.read_i32_be()?;

        let tag_offset = self.cursor.position();
        let tag = self.cursor.read_i32_le()?;
        let shape_type = ShapeType::try_from(tag).map_err(|tag| Error::UnsupportedShapeType {
            tag,
            record: record_number,
            offset: tag_offset,
        })?;

        let mut record = ShapeRecord::new(record_number, content_length, shape_type);
        match shape_type {
            ShapeType::Null => {}
            ShapeType::Point => self.read_point(&mut record)?,
            ShapeType::Multipoint => self.read_multipoint(&mut record)?,
            // PolyLine has exactly the same layout as Polygon
            ShapeType::PolyLine | ShapeType::Polygon => self.read_poly(&mut record)?,
        }

        tracing::trace!(
            record = record.record_number,
            shape_type = %record.shape_type,
            parts = record.parts.len(),
            points = record.points.len(),
            offset = start,
            "decoded record"
        );
        Ok(Some(record))
    }

    fn read_bbox(&mut self) -> Result<BoundingBox> {
        let x_min = self.cursor.read_f64_le()?;
        let y_min = self.cursor.read_f64_le()?;
        let x_max = self.cursor.read_f64_le()?;
        let y_max = self.cursor.read_f64_le()?;
        Ok(BoundingBox::new(x_min, y_min, x_max, y_max))
    }

    /// Read a non-negative element count
    fn read_count(&mut self, record: &ShapeRecord, what: &str) -> Result<usize> {
        let offset = self.cursor.position();
        let count = self.cursor.read_i32_le()?;
        usize::try_from(count).map_err(|_| {
            Error::invalid_format(
                offset,
                format!(
                    "record {} has negative {} count {}",
                    record.record_number, what, count
                ),
            )
        })
    }

    fn read_xy(&mut self) -> Result<ShapePoint> {
        let x = self.cursor.read_f64_le()?;
        let y = self.cursor.read_f64_le()?;
        Ok(ShapePoint::new(x, y))
    }

    fn read_point(&mut self, record: &mut ShapeRecord) -> Result<()> {
        let x = self.cursor.read_f64_le()?;
        let y = self.cursor.read_f64_le()?;
        let z = self.cursor.read_f64_le()?;
        record.points.push(ShapePoint::with_z(x, y, z));
        record.bbox = BoundingBox::from_point(x, y);
        Ok(())
    }

    fn read_multipoint(&mut self, record: &mut ShapeRecord) -> Result<()> {
        record.bbox = self.read_bbox()?;
        let num_points = self.read_count(record, "point")?;

        for _ in 0..num_points {
            let p = self.read_xy()?;
            record.points.push(p);
        }
        Ok(())
    }

    fn read_poly(&mut self, record: &mut ShapeRecord) -> Result<()> {
        record.bbox = self.read_bbox()?;
        let num_parts = self.read_count(record, "part")?;
        let num_points = self.read_count(record, "point")?;

        let parts_offset = self.cursor.position();
        let mut raw_parts: SmallVec<[i32; 4]> = SmallVec::new();
        for _ in 0..num_parts {
            raw_parts.push(self.cursor.read_i32_le()?);
        }

        for _ in 0..num_points {
            let p = self.read_xy()?;
            record.points.push(p);
        }

        record.parts = validate_parts(record, &raw_parts, parts_offset)?;
        Ok(())
    }
}

/// Check part offsets: strictly increasing and at most `points.len()`.
///
/// Only the last offset may equal `points.len()`, which yields an empty ring.
fn validate_parts(
    record: &ShapeRecord,
    raw: &SmallVec<[i32; 4]>,
    offset: u64,
) -> Result<PartOffsets> {
    let len = record.points.len();
    let mut parts = PartOffsets::with_capacity(raw.len());

    for (i, &value) in raw.iter().enumerate() {
        let lowest = parts.last().map_or(0, |&previous| previous + 1);
        let start = usize::try_from(value)
            .ok()
            .filter(|&s| s >= lowest && s <= len);
        match start {
            Some(start) => parts.push(start),
            None => {
                return Err(Error::invalid_format(
                    offset + 4 * i as u64,
                    format!(
                        "record {} part {} has offset {} outside [{}, {}]",
                        record.record_number, i, value, lowest, len
                    ),
                ));
            }
        }
    }
    Ok(parts)
}

impl<R: Read> Iterator for RecordDecoder<'_, R> {
    type Item = Result<ShapeRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.next_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn record_header(bytes: &mut Vec<u8>, number: i32, content_length: i32, tag: i32) {
        bytes.extend_from_slice(&number.to_be_bytes());
        bytes.extend_from_slice(&content_length.to_be_bytes());
        bytes.extend_from_slice(&tag.to_le_bytes());
    }

    fn f64s(bytes: &mut Vec<u8>, values: &[f64]) {
        for v in values {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
    }

    fn decode_all(bytes: Vec<u8>) -> Result<Vec<ShapeRecord>> {
        let mut cursor = BinaryCursor::new(Cursor::new(bytes));
        RecordDecoder::new(&mut cursor).collect()
    }

    #[test]
    fn test_point_record() {
        let mut bytes = Vec::new();
        record_header(&mut bytes, 1, 14, 1);
        f64s(&mut bytes, &[10.0, 20.0, 3.5]);

        let records = decode_all(bytes).unwrap();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.shape_type, ShapeType::Point);
        assert_eq!(record.points, vec![ShapePoint::with_z(10.0, 20.0, 3.5)]);
        assert_eq!(record.bbox, BoundingBox::new(10.0, 20.0, 10.0, 20.0));
        assert!(record.parts.is_empty());
    }

    #[test]
    fn test_null_record() {
        let mut bytes = Vec::new();
        record_header(&mut bytes, 1, 2, 0);
        record_header(&mut bytes, 2, 2, 0);

        let records = decode_all(bytes).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.points.is_empty()));
        assert_eq!(records[1].record_number, 2);
    }

    #[test]
    fn test_multipoint_drops_z() {
        let mut bytes = Vec::new();
        record_header(&mut bytes, 7, 40, 8);
        f64s(&mut bytes, &[0.0, 0.0, 4.0, 4.0]);
        bytes.extend_from_slice(&2i32.to_le_bytes());
        f64s(&mut bytes, &[1.0, 2.0, 3.0, 4.0]);

        let records = decode_all(bytes).unwrap();
        let record = &records[0];
        assert_eq!(record.record_number, 7);
        assert_eq!(record.bbox, BoundingBox::new(0.0, 0.0, 4.0, 4.0));
        assert_eq!(
            record.points,
            vec![ShapePoint::new(1.0, 2.0), ShapePoint::new(3.0, 4.0)]
        );
    }

    #[test]
    fn test_polyline_layout_matches_polygon() {
        for tag in [3, 5] {
            let mut bytes = Vec::new();
            record_header(&mut bytes, 1, 0, tag);
            f64s(&mut bytes, &[0.0, 0.0, 1.0, 1.0]);
            bytes.extend_from_slice(&2i32.to_le_bytes());
            bytes.extend_from_slice(&4i32.to_le_bytes());
            bytes.extend_from_slice(&0i32.to_le_bytes());
            bytes.extend_from_slice(&2i32.to_le_bytes());
            f64s(&mut bytes, &[0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0]);

            let records = decode_all(bytes).unwrap();
            let record = &records[0];
            assert_eq!(record.shape_type.tag(), tag);
            assert_eq!(record.parts.as_slice(), &[0, 2]);
            assert_eq!(record.points.len(), 4);
            let ranges: Vec<_> = record.part_ranges().collect();
            assert_eq!(ranges, vec![0..2, 2..4]);
            assert_eq!(record.part_points(1).unwrap()[0], ShapePoint::new(1.0, 1.0));
        }
    }

    #[test]
    fn test_unsupported_shape_type() {
        let mut bytes = Vec::new();
        record_header(&mut bytes, 3, 0, 15);

        let err = decode_all(bytes).unwrap_err();
        match err {
            Error::UnsupportedShapeType { tag, record, offset } => {
                assert_eq!(tag, 15);
                assert_eq!(record, 3);
                assert_eq!(offset, 8);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_negative_point_count() {
        let mut bytes = Vec::new();
        record_header(&mut bytes, 1, 0, 8);
        f64s(&mut bytes, &[0.0, 0.0, 1.0, 1.0]);
        bytes.extend_from_slice(&(-1i32).to_le_bytes());

        let err = decode_all(bytes).unwrap_err();
        assert!(matches!(err, Error::InvalidFormat { offset: 44, .. }));
    }

    #[test]
    fn test_part_offset_out_of_range() {
        let mut bytes = Vec::new();
        record_header(&mut bytes, 1, 0, 5);
        f64s(&mut bytes, &[0.0, 0.0, 1.0, 1.0]);
        bytes.extend_from_slice(&2i32.to_le_bytes());
        bytes.extend_from_slice(&2i32.to_le_bytes());
        bytes.extend_from_slice(&0i32.to_le_bytes());
        bytes.extend_from_slice(&3i32.to_le_bytes());
        f64s(&mut bytes, &[0.0, 0.0, 1.0, 1.0]);

        let err = decode_all(bytes).unwrap_err();
        assert!(matches!(err, Error::InvalidFormat { .. }));
        assert!(err.to_string().contains("part 1"));
    }

    #[test]
    fn test_decreasing_part_offsets() {
        let mut bytes = Vec::new();
        record_header(&mut bytes, 1, 0, 5);
        f64s(&mut bytes, &[0.0, 0.0, 1.0, 1.0]);
        bytes.extend_from_slice(&2i32.to_le_bytes());
        bytes.extend_from_slice(&3i32.to_le_bytes());
        bytes.extend_from_slice(&2i32.to_le_bytes());
        bytes.extend_from_slice(&1i32.to_le_bytes());
        f64s(&mut bytes, &[0.0, 0.0, 1.0, 1.0, 2.0, 2.0]);

        assert!(matches!(
            decode_all(bytes),
            Err(Error::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_repeated_part_offsets() {
        let mut bytes = Vec::new();
        record_header(&mut bytes, 9, 0, 5);
        f64s(&mut bytes, &[0.0, 0.0, 1.0, 1.0]);
        bytes.extend_from_slice(&3i32.to_le_bytes());
        bytes.extend_from_slice(&4i32.to_le_bytes());
        for part in [0i32, 2, 2] {
            bytes.extend_from_slice(&part.to_le_bytes());
        }
        f64s(&mut bytes, &[0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0]);

        match decode_all(bytes) {
            Err(Error::InvalidFormat { offset, message }) => {
                // third offset, after header(12) + bbox(32) + counts(8) + two offsets(8)
                assert_eq!(offset, 60);
                assert!(message.contains("record 9 part 2"));
            }
            other => panic!("expected InvalidFormat, got {:?}", other),
        }
    }

    #[test]
    fn test_last_offset_at_point_count_is_accepted() {
        let mut bytes = Vec::new();
        record_header(&mut bytes, 1, 0, 5);
        f64s(&mut bytes, &[0.0, 0.0, 1.0, 1.0]);
        bytes.extend_from_slice(&2i32.to_le_bytes());
        bytes.extend_from_slice(&3i32.to_le_bytes());
        for part in [0i32, 3] {
            bytes.extend_from_slice(&part.to_le_bytes());
        }
        f64s(&mut bytes, &[0.0, 0.0, 1.0, 0.0, 1.0, 1.0]);

        let records = decode_all(bytes).unwrap();
        let ranges: Vec<_> = records[0].part_ranges().collect();
        assert_eq!(ranges, vec![0..3, 3..3]);
    }

    #[test]
    fn test_partial_trailing_bytes_end_stream() {
        let mut bytes = Vec::new();
        record_header(&mut bytes, 1, 14, 1);
        f64s(&mut bytes, &[1.0, 2.0, 3.0]);
        bytes.extend_from_slice(&[0, 0]);

        let records = decode_all(bytes).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_truncated_record_body() {
        let mut bytes = Vec::new();
        record_header(&mut bytes, 1, 14, 1);
        f64s(&mut bytes, &[1.0, 2.0]);
        bytes.extend_from_slice(&[0, 0, 0]);

        let err = decode_all(bytes).unwrap_err();
        assert!(matches!(
            err,
            Error::UnexpectedEndOfInput {
                offset: 28,
                needed: 8,
                available: 3
            }
        ));
    }

    #[test]
    fn test_truncated_after_record_number() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&1i32.to_be_bytes());
        bytes.extend_from_slice(&[0, 0]);

        assert!(decode_all(bytes).unwrap_err().is_end_of_input());
    }

    #[test]
    fn test_iterator_fuses_after_error() {
        let mut bytes = Vec::new();
        record_header(&mut bytes, 1, 0, 99);
        record_header(&mut bytes, 2, 2, 0);

        let mut cursor = BinaryCursor::new(Cursor::new(bytes));
        let mut decoder = RecordDecoder::new(&mut cursor);
        assert!(decoder.next().unwrap().is_err());
        assert!(decoder.next().is_none());
    }

    #[test]
    fn test_record_display() {
        let record = ShapeRecord::new(4, 10, ShapeType::Polygon);
        assert_eq!(
            record.to_string(),
            "ShapeRecord: record_number=4, content_length=10, shape_type=Polygon, parts=0, points=0"
        );
    }
}
