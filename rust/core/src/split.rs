// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polygon Part Splitter
//!
//! Turns one multi-ring record into independent single-ring polygon
//! records so each ring can be triangulated on its own.

use crate::record::{PartOffsets, ShapeRecord};
use crate::shape::{BoundingBox, ShapeType};

/// Split a record into one record per part.
///
/// Part `i` covers `[parts[i], parts[i + 1])`, the last part runs to the
/// end of the points. Each output owns a copy of its slice, has a single
/// part at offset 0 and is typed as a Polygon. Record number and content
/// length are carried over from the source for diagnostics.
///
/// A part offset equal to the point count produces an empty record, which
/// is kept so output index `i` always corresponds to source part `i`.
///
/// Offsets are expected to be valid, as the decoder guarantees. A range
/// outside the points of a hand-built record asserts in debug builds and
/// yields an empty ring otherwise.
pub fn split_parts(record: &ShapeRecord) -> Vec<ShapeRecord> {
    record
        .part_ranges()
        .map(|range| {
            let points = match record.points.get(range.clone()) {
                Some(points) => points.to_vec(),
                None => {
                    debug_assert!(
                        false,
                        "record {} part range {:?} outside {} points",
                        record.record_number,
                        range,
                        record.points.len()
                    );
                    tracing::warn!(
                        record = record.record_number,
                        start = range.start,
                        end = range.end,
                        points = record.points.len(),
                        "part range outside the record's points, ring left empty"
                    );
                    Vec::new()
                }
            };
            let bbox = BoundingBox::from_points(&points).unwrap_or_default();
            let mut parts = PartOffsets::new();
            parts.push(0);

            ShapeRecord {
                record_number: record.record_number,
                content_length: record.content_length,
                shape_type: ShapeType::Polygon,
                bbox,
                parts,
                points,
            }
        })
        .collect()
}

impl ShapeRecord {
    /// See [`split_parts`]
    #[inline]
    pub fn split_parts(&self) -> Vec<ShapeRecord> {
        split_parts(self)
    }
}
