//! Polygon container and geometric predicates.
//!
//! Intersection predicates are delegated to `parry2d`; the polygon keeps
//! its own shoelace area and Monte-Carlo area estimate so the initial tile
//! count can be derived either way (see
//! [`AreaEstimation`](crate::AreaEstimation)).
//!
//! A tile's footprint is an equilateral triangle of circumradius 1 centered
//! on the tile position: the vertices sit at compass headings
//! `angle - 60`, `angle - 180` and `angle + 60` from the center.

use parry2d_f64::na::Isometry2;
use parry2d_f64::query;
use parry2d_f64::shape::{Segment, Triangle};
use parry2d_f64::utils::point_in_poly2d;
use rand::Rng;

use crate::angle::heading;
use crate::error::{PlacementError, PlacementResult};
use crate::{Point, Vector, EPSILON};

/// A simple polygon, stored counter-clockwise and implicitly closed.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    vertices: Vec<Point>,
}

impl Polygon {
    /// Validate a vertex sequence and normalize its winding to CCW.
    ///
    /// Rejects polygons with fewer than 3 vertices or with an edge shorter
    /// than epsilon, before anything downstream touches them.
    pub fn new(vertices: Vec<Point>) -> PlacementResult<Self> {
        if vertices.len() < 3 {
            return Err(PlacementError::DegeneratePolygon {
                vertices: vertices.len(),
            });
        }
        for i in 0..vertices.len() {
            let u = vertices[i];
            let v = vertices[(i + 1) % vertices.len()];
            if (v - u).norm() < EPSILON {
                return Err(PlacementError::DegenerateEdge { index: i });
            }
        }
        let mut polygon = Polygon { vertices };
        if polygon.signed_area() < 0.0 {
            polygon.vertices.reverse();
        }
        Ok(polygon)
    }

    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Edge `i`, from vertex `i` to vertex `i + 1` (wrapping).
    pub fn edge(&self, i: usize) -> (Point, Point) {
        let u = self.vertices[i];
        let v = self.vertices[(i + 1) % self.vertices.len()];
        (u, v)
    }

    /// Uniformly scaled copy. The factor must be positive so the winding
    /// is preserved.
    pub fn scaled(&self, factor: f64) -> Polygon {
        Polygon {
            vertices: self
                .vertices
                .iter()
                .map(|p| Point::new(p.x * factor, p.y * factor))
                .collect(),
        }
    }

    /// Shoelace signed area; positive for CCW winding.
    pub fn signed_area(&self) -> f64 {
        let n = self.vertices.len();
        let mut area = 0.0;
        for i in 0..n {
            let p = self.vertices[i];
            let q = self.vertices[(i + 1) % n];
            area += p.x * q.y - q.x * p.y;
        }
        area / 2.0
    }

    /// Exact (shoelace) area.
    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// Axis-aligned bounding box as (lower-left, upper-right).
    pub fn bounding_box(&self) -> (Point, Point) {
        let mut lb = self.vertices[0];
        let mut rt = self.vertices[0];
        for p in &self.vertices[1..] {
            lb.x = lb.x.min(p.x);
            lb.y = lb.y.min(p.y);
            rt.x = rt.x.max(p.x);
            rt.y = rt.y.max(p.y);
        }
        (lb, rt)
    }

    /// Strict interior test.
    pub fn contains(&self, p: &Point) -> bool {
        point_in_poly2d(p, &self.vertices)
    }

    /// Monte-Carlo area estimate: sample the bounding box uniformly and
    /// scale by the hit rate.
    pub fn sampled_area<R: Rng>(&self, samples: u32, rng: &mut R) -> f64 {
        let (lb, rt) = self.bounding_box();
        let width = rt.x - lb.x;
        let height = rt.y - lb.y;
        if width < EPSILON || height < EPSILON || samples == 0 {
            return 0.0;
        }
        let mut inside = 0u32;
        for _ in 0..samples {
            let p = Point::new(rng.gen_range(lb.x..rt.x), rng.gen_range(lb.y..rt.y));
            if self.contains(&p) {
                inside += 1;
            }
        }
        width * height * inside as f64 / samples as f64
    }
}

/// Normalize a vector, erroring out below the epsilon threshold instead of
/// propagating an invalid value.
pub fn unit(v: Vector, context: &'static str) -> PlacementResult<Vector> {
    let len = v.norm();
    if len < EPSILON {
        return Err(PlacementError::DegenerateGeometry { context });
    }
    Ok(v / len)
}

/// Perpendicular distance from `p` to the infinite line through `u` and `v`.
pub fn distance_to_line(p: Point, u: Point, v: Point) -> PlacementResult<f64> {
    let e1 = u - v;
    let e2 = p - v;
    let len = e1.norm();
    if len < EPSILON {
        return Err(PlacementError::DegenerateGeometry {
            context: "distance to zero-length edge",
        });
    }
    Ok((e1.x * e2.y - e1.y * e2.x).abs() / len)
}

/// Footprint triangle of a tile at `center` with orientation `angle_deg`.
pub fn tile_triangle(center: Point, angle_deg: f64) -> Triangle {
    Triangle::new(
        center + heading(angle_deg - 60.0),
        center + heading(angle_deg - 180.0),
        center + heading(angle_deg + 60.0),
    )
}

/// Do the footprints of two tiles intersect?
pub fn tiles_intersect(c1: Point, a1_deg: f64, c2: Point, a2_deg: f64) -> bool {
    let id = Isometry2::identity();
    let t1 = tile_triangle(c1, a1_deg);
    let t2 = tile_triangle(c2, a2_deg);
    matches!(query::intersection_test(&id, &t1, &id, &t2), Ok(true))
}

/// Does a tile's footprint intersect the segment `u`-`v`?
pub fn tile_intersects_segment(c: Point, a_deg: f64, u: Point, v: Point) -> bool {
    let id = Isometry2::identity();
    let tri = tile_triangle(c, a_deg);
    let seg = Segment::new(u, v);
    matches!(query::intersection_test(&id, &tri, &id, &seg), Ok(true))
}

/// Intersection point of segments `p1`-`p2` and `p3`-`p4`, if they cross.
///
/// Cramer's rule on the two line equations, then a parameter check that the
/// solution lies within both segments. Parallel segments yield `None`.
pub fn segment_intersection_point(p1: Point, p2: Point, p3: Point, p4: Point) -> Option<Point> {
    let s1 = p2 - p1;
    let s2 = p4 - p3;
    let denom = s1.x * s2.y - s2.x * s1.y;
    if denom.abs() < EPSILON {
        return None;
    }
    let s = (s1.x * (p1.y - p3.y) - s1.y * (p1.x - p3.x)) / denom;
    let t = (s2.x * (p1.y - p3.y) - s2.y * (p1.x - p3.x)) / denom;
    if (0.0..=1.0).contains(&s) && (0.0..=1.0).contains(&t) {
        Some(p1 + s1 * t)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn square(side: f64) -> Polygon {
        Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(side, 0.0),
            Point::new(side, side),
            Point::new(0.0, side),
        ])
        .unwrap()
    }

    #[test]
    fn rejects_fewer_than_three_vertices() {
        let err = Polygon::new(vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)]).unwrap_err();
        assert_eq!(err, PlacementError::DegeneratePolygon { vertices: 2 });
    }

    #[test]
    fn rejects_zero_length_edge() {
        let err = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(0.0, 0.0),
            Point::new(1.0, 1.0),
        ])
        .unwrap_err();
        assert_eq!(err, PlacementError::DegenerateEdge { index: 0 });
    }

    #[test]
    fn winding_is_normalized_to_ccw() {
        // Clockwise input.
        let polygon = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(0.0, 1.0),
            Point::new(1.0, 1.0),
            Point::new(1.0, 0.0),
        ])
        .unwrap();
        assert!(polygon.signed_area() > 0.0);
    }

    #[test]
    fn square_area_and_bbox() {
        let polygon = square(10.0);
        assert!((polygon.area() - 100.0).abs() < 1e-12);
        let (lb, rt) = polygon.bounding_box();
        assert_eq!((lb.x, lb.y), (0.0, 0.0));
        assert_eq!((rt.x, rt.y), (10.0, 10.0));
    }

    #[test]
    fn containment() {
        let polygon = square(10.0);
        assert!(polygon.contains(&Point::new(5.0, 5.0)));
        assert!(!polygon.contains(&Point::new(15.0, 5.0)));
        assert!(!polygon.contains(&Point::new(-1.0, -1.0)));
    }

    #[test]
    fn sampled_area_approximates_exact_area() {
        let polygon = square(10.0);
        let mut rng = StdRng::seed_from_u64(7);
        let approx = polygon.sampled_area(0xfff, &mut rng);
        // The square fills its own bounding box, so every sample hits.
        assert!((approx - 100.0).abs() < 1e-9);
    }

    #[test]
    fn scaled_multiplies_area_quadratically() {
        let polygon = square(10.0).scaled(3.0);
        assert!((polygon.area() - 900.0).abs() < 1e-9);
    }

    #[test]
    fn coincident_tiles_intersect() {
        let c = Point::new(1.0, 1.0);
        assert!(tiles_intersect(c, 0.0, c, 90.0));
    }

    #[test]
    fn distant_tiles_do_not_intersect() {
        assert!(!tiles_intersect(
            Point::new(0.0, 0.0),
            0.0,
            Point::new(5.0, 0.0),
            0.0
        ));
    }

    #[test]
    fn tile_against_segment() {
        let c = Point::new(0.0, 0.0);
        // Passes through the footprint.
        assert!(tile_intersects_segment(
            c,
            0.0,
            Point::new(-2.0, 0.0),
            Point::new(2.0, 0.0)
        ));
        // Well clear of the circumradius.
        assert!(!tile_intersects_segment(
            c,
            0.0,
            Point::new(-2.0, 3.0),
            Point::new(2.0, 3.0)
        ));
    }

    #[test]
    fn segment_intersection() {
        let p = segment_intersection_point(
            Point::new(-1.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(0.0, -1.0),
            Point::new(0.0, 1.0),
        )
        .unwrap();
        assert!(p.x.abs() < 1e-12 && p.y.abs() < 1e-12);

        assert!(segment_intersection_point(
            Point::new(-1.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(-1.0, 1.0),
            Point::new(1.0, 1.0),
        )
        .is_none());
    }

    #[test]
    fn distance_to_line_is_perpendicular() {
        let d = distance_to_line(Point::new(0.0, 3.0), Point::new(-1.0, 0.0), Point::new(1.0, 0.0))
            .unwrap();
        assert!((d - 3.0).abs() < 1e-12);
    }

    #[test]
    fn unit_rejects_near_zero() {
        let err = unit(Vector::new(1e-12, 0.0), "test").unwrap_err();
        assert!(matches!(err, PlacementError::DegenerateGeometry { .. }));
    }
}
