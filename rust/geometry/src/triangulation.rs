// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Triangulation seam
//!
//! The chunk builder only needs a vertex array and index triples. Any
//! engine able to produce them plugs in through [`Triangulator`]. Bundled
//! are an earcutr ring filler, a delaunator point-set surface and
//! [`AutoTriangulator`], which picks between them.

use std::ops::Range;

use rustc_hash::FxHashSet;

use crate::{Error, Point2, Result};

/// Points handed to a triangulator, with optional ring constraints
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangulationInput {
    pub points: Vec<Point2<f64>>,
    /// Point ranges forming closed rings
    pub rings: Vec<Range<usize>>,
}

impl TriangulationInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a loose point, returning its vertex index
    pub fn push_point(&mut self, point: Point2<f64>) -> usize {
        self.points.push(point);
        self.points.len() - 1
    }

    /// Add a ring; its points are appended to the vertex order
    pub fn push_ring<I>(&mut self, ring: I) -> Range<usize>
    where
        I: IntoIterator<Item = Point2<f64>>,
    {
        let start = self.points.len();
        self.points.extend(ring);
        let range = start..self.points.len();
        self.rings.push(range.clone());
        range
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Output of a triangulator: vertices plus index triples into them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Triangulation {
    pub vertices: Vec<Point2<f64>>,
    pub triangles: Vec<[usize; 3]>,
}

impl Triangulation {
    pub fn new(vertices: Vec<Point2<f64>>, triangles: Vec<[usize; 3]>) -> Self {
        Self {
            vertices,
            triangles,
        }
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Unique undirected edges, in first-seen order. Used for wireframe overlays.
    pub fn edges(&self) -> Vec<(usize, usize)> {
        let mut seen = FxHashSet::default();
        let mut edges = Vec::with_capacity(self.triangles.len() * 3 / 2);
        for &[a, b, c] in &self.triangles {
            for (p, q) in [(a, b), (b, c), (c, a)] {
                let key = if p < q { (p, q) } else { (q, p) };
                if seen.insert(key) {
                    edges.push(key);
                }
            }
        }
        edges
    }
}

/// External triangulation engine
pub trait Triangulator {
    /// Triangulate `input`. The returned vertex array must keep the input
    /// point order so per-point data (elevations) stays aligned.
    fn triangulate(&self, input: &TriangulationInput) -> Result<Triangulation>;
}

/// Triangulates every ring independently with earcutr.
///
/// Loose points become unreferenced vertices. Rings are not merged, so a
/// ring inside another ring is filled, not cut out.
#[derive(Debug, Clone, Copy, Default)]
pub struct EarcutTriangulator;

impl Triangulator for EarcutTriangulator {
    fn triangulate(&self, input: &TriangulationInput) -> Result<Triangulation> {
        let mut triangles = Vec::new();

        for (ring_index, range) in input.rings.iter().enumerate() {
            let ring = input.points.get(range.clone()).ok_or_else(|| {
                Error::TriangulationError(format!(
                    "ring {} spans {:?} but only {} points exist",
                    ring_index,
                    range,
                    input.points.len()
                ))
            })?;

            let ring = open_ring(ring);
            if ring.len() < 3 {
                tracing::trace!(ring = ring_index, points = ring.len(), "skipping degenerate ring");
                continue;
            }

            let indices = triangulate_polygon(ring)?;
            triangles.extend(
                indices
                    .chunks_exact(3)
                    .map(|t| [range.start + t[0], range.start + t[1], range.start + t[2]]),
            );
        }

        Ok(Triangulation::new(input.points.clone(), triangles))
    }
}

/// Delaunay triangulation of every input point with delaunator.
///
/// Rings are ignored. Indices address the input points directly, so the
/// vertex array is the input in order. Fewer than three points, or all
/// points collinear, give no triangles. Coincident points are left
/// unreferenced.
#[derive(Debug, Clone, Copy, Default)]
pub struct DelaunayTriangulator;

impl Triangulator for DelaunayTriangulator {
    fn triangulate(&self, input: &TriangulationInput) -> Result<Triangulation> {
        if input.len() < 3 {
            tracing::trace!(points = input.len(), "too few points for a surface");
            return Ok(Triangulation::new(input.points.clone(), Vec::new()));
        }

        let points: Vec<delaunator::Point> = input
            .points
            .iter()
            .map(|p| delaunator::Point { x: p.x, y: p.y })
            .collect();

        let result = delaunator::triangulate(&points);
        let triangles: Vec<[usize; 3]> = result
            .triangles
            .chunks_exact(3)
            .map(|t| [t[0], t[1], t[2]])
            .collect();

        if triangles.is_empty() {
            tracing::debug!(points = points.len(), "point set is degenerate, no triangles");
        }

        Ok(Triangulation::new(input.points.clone(), triangles))
    }
}

/// Earcut for inputs with rings, Delaunay over all points otherwise.
///
/// Point and Multipoint datasets carry no rings, so they get a surface
/// over their points; PolyLine and Polygon datasets get their rings filled.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoTriangulator;

impl Triangulator for AutoTriangulator {
    fn triangulate(&self, input: &TriangulationInput) -> Result<Triangulation> {
        if input.rings.is_empty() {
            DelaunayTriangulator.triangulate(input)
        } else {
            EarcutTriangulator.triangulate(input)
        }
    }
}

/// Drop the closing point of a ring that repeats its first point
#[inline]
fn open_ring(ring: &[Point2<f64>]) -> &[Point2<f64>] {
    match ring {
        [first, .., last] if first == last => &ring[..ring.len() - 1],
        _ => ring,
    }
}

/// Check if a polygon is convex (all cross products have same sign)
#[inline]
fn is_convex(points: &[Point2<f64>]) -> bool {
    if points.len() < 3 {
        return false;
    }

    let n = points.len();
    let mut sign = 0i8;

    for i in 0..n {
        let p0 = &points[i];
        let p1 = &points[(i + 1) % n];
        let p2 = &points[(i + 2) % n];

        let cross = (p1.x - p0.x) * (p2.y - p1.y) - (p1.y - p0.y) * (p2.x - p1.x);

        if cross.abs() > 1e-10 {
            let current_sign = if cross > 0.0 { 1i8 } else { -1i8 };
            if sign == 0 {
                sign = current_sign;
            } else if sign != current_sign {
                return false;
            }
        }
    }

    true
}

/// Simple fan triangulation for convex polygons
#[inline]
fn fan_triangulate(n: usize) -> Vec<usize> {
    let mut indices = Vec::with_capacity((n - 2) * 3);
    for i in 1..n - 1 {
        indices.push(0);
        indices.push(i);
        indices.push(i + 1);
    }
    indices
}

/// Triangulate a simple polygon (no holes)
/// Returns triangle indices into the input points
pub fn triangulate_polygon(points: &[Point2<f64>]) -> Result<Vec<usize>> {
    let n = points.len();

    if n < 3 {
        return Err(Error::TriangulationError(
            "Need at least 3 points to triangulate".to_string(),
        ));
    }

    // FAST PATH: Triangle - no triangulation needed
    if n == 3 {
        return Ok(vec![0, 1, 2]);
    }

    // FAST PATH: Convex polygon - use fan triangulation
    if n <= 8 && is_convex(points) {
        return Ok(fan_triangulate(n));
    }

    let mut vertices = Vec::with_capacity(n * 2);
    for p in points {
        vertices.push(p.x);
        vertices.push(p.y);
    }

    earcutr::earcut(&vertices, &[], 2).map_err(|e| Error::TriangulationError(format!("{:?}", e)))
}
