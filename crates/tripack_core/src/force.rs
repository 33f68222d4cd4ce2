//! Force model: converts neighbor, overlap and boundary geometry into
//! per-tile corrective velocities.
//!
//! Each tile accumulates up to three kinds of pairwise interaction. Every
//! interaction contributes a linear correction vector, an angular
//! correction and a weight; the tile's output velocity and angular
//! velocity are the weight-normalized sums. Interaction weights use the
//! steep inverse-twelfth-power profile `(d / d0)^-12`, so short-range
//! violations dominate and distant pairs are negligible.
//!
//! The pass also accumulates the global diagnostics: the energy `E`
//! (summed overlap severity, counted once from each side and halved later
//! by the convergence tracker), the packing quality `K` (minimum
//! separation ratio over all violating pairs) and the per-tile removal
//! ranks fed to the density adjuster.

use crate::angle::{angle_diff, heading};
use crate::config::PlacementConfig;
use crate::error::{PlacementError, PlacementResult};
use crate::field::TilePose;
use crate::geometry::{self, Polygon};
use crate::neighbor::{self, NeighborTable};
use crate::overlap::Overlaps;
use crate::{Point, Vector, EPSILON};

/// Removal-rank entry of one tile: contact-bonus count plus accumulated
/// (negative) violation score. Both reset every step.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RemovalRank {
    pub bonus: i32,
    pub score: f64,
}

/// Output of one force pass over a pose snapshot.
#[derive(Debug, Clone)]
pub struct ForcePass {
    /// Per-tile linear velocity, weight-normalized.
    pub linear: Vec<Vector>,
    /// Per-tile angular velocity in degrees per second.
    pub angular_deg: Vec<f64>,
    /// Raw energy, counted from both sides of each violating pair.
    pub energy: f64,
    /// Packing quality K; 1 when nothing violates its required separation.
    pub quality: f64,
    /// Per-tile removal ranks for the density adjuster.
    pub removal: Vec<RemovalRank>,
}

/// `(dis / min_dis)^-12`: steep short-range repulsion, negligible at range.
fn repulsion_weight(dis: f64, min_dis: f64) -> f64 {
    (dis.max(EPSILON) / min_dis).powi(-12)
}

struct PairInteraction {
    linear: Vector,
    angular_deg: f64,
    weight: f64,
    /// Actual over required separation.
    ratio: f64,
    /// Matched-edge midpoints within the contact-bonus distance.
    contact: bool,
}

/// Shared pair computation for the neighbor and overlap cases.
///
/// `sector` is the self sector facing the other tile; the other tile's
/// matching sector is the one whose facing direction most nearly opposes
/// the relative vector. The required separation grows with the facing
/// misalignment `ang_diff`: tiles meeting edge-to-edge at an angle need a
/// larger gap than perfectly aligned ones.
fn pair_interaction(
    config: &PlacementConfig,
    p1: &TilePose,
    sector: usize,
    p2: &TilePose,
    other_index: usize,
) -> PlacementResult<PairInteraction> {
    let a = p1.angle_deg + 120.0 * sector as f64;
    let v = p2.position - p1.position;
    let n = heading(a);
    let t = heading(a + 90.0);

    let l = neighbor::sector_of(config, p2.position, p2.angle_deg, p1.position)
        .ok_or(PlacementError::UnresolvedSector { tile: other_index })?;
    let al = p2.angle_deg + 120.0 * l as f64;
    let n2 = heading(al);

    let self_mid = n * 0.5;
    let other_mid = v + n2 * 0.5;
    let ang_diff = angle_diff(a, al + 180.0);

    // Coincident tiles fall back to the sector heading so the repulsion
    // still has a direction.
    let raw_len = v.norm();
    let v_len = raw_len.max(EPSILON);
    let dir = if raw_len < EPSILON { n } else { v / v_len };

    let v_n = v.dot(&n);
    let v_n2 = -v.dot(&n2);
    let facing = (v_n.max(v_n2) / v_len).max(EPSILON);
    let required = (0.5 + (30.0 + ang_diff.abs()).to_radians().sin()) / facing;

    let kr = 1.0 - (v_len / required).powi(-2);
    let kt = 0.5 * other_mid.dot(&t);
    let weight = repulsion_weight(required, 2.0) + repulsion_weight(v_len, 2.0);

    Ok(PairInteraction {
        linear: (dir * kr + t * kt) * weight,
        angular_deg: 0.5 * ang_diff * weight,
        weight,
        ratio: v_len / required,
        contact: (self_mid - other_mid).norm() < config.contact_bonus_distance,
    })
}

struct BoundaryInteraction {
    linear: Vector,
    angular_deg: f64,
    weight: f64,
    /// Center distance over required separation.
    ratio: f64,
    /// Nearest sector midpoint within the edge contact-bonus distance.
    contact: bool,
}

/// Push-back from one overlapped boundary edge, or `None` when the tile's
/// footprint does not actually reach past the edge.
///
/// The required separation is the tile center's distance to the edge line
/// plus how far the footprint extends into the band behind the edge. The
/// extent is measured by intersecting the footprint's three edges against
/// the band: the boundary edge itself and two perpendicular offsets
/// hanging off its endpoints.
fn boundary_interaction(
    config: &PlacementConfig,
    polygon: &Polygon,
    p1: &TilePose,
    edge_index: usize,
) -> PlacementResult<Option<BoundaryInteraction>> {
    let (u, v) = polygon.edge(edge_index);
    let dis = geometry::distance_to_line(p1.position, u, v)?;
    // Interior-facing normal of a CCW polygon edge.
    let n_unit = geometry::unit(Vector::new(u.y - v.y, v.x - u.x), "boundary edge normal")?;
    let band = n_unit * config.boundary_band_depth;

    // Sector whose edge midpoint sits closest to the boundary edge.
    let mut k = 0usize;
    let mut min_mid_dist = f64::INFINITY;
    for l in 0..3 {
        let al = p1.angle_deg + 120.0 * l as f64;
        let mid = p1.position + heading(al) * 0.5;
        let dist = geometry::distance_to_line(mid, u, v)?;
        if dist < min_mid_dist {
            min_mid_dist = dist;
            k = l;
        }
    }
    let ak = p1.angle_deg + 120.0 * k as f64;
    let edge_deg = (v.y - u.y).atan2(v.x - u.x).to_degrees();
    let ang_diff = angle_diff(ak, 180.0 - edge_deg);

    let box_segments = [(u, v), (u, u - band), (v, v - band)];

    let mut crossings: Vec<Point> = Vec::new();
    for l in 0..3 {
        let al = p1.angle_deg + 120.0 * l as f64;
        let t1 = p1.position + heading(al - 60.0);
        let t2 = p1.position + heading(al + 60.0);
        let mut count = 0usize;
        let (mut at_u, mut at_v) = (false, false);
        for &(b1, b2) in &box_segments {
            if let Some(p) = geometry::segment_intersection_point(t1, t2, b1, b2) {
                // Crossings at the edge endpoints count once, not per box
                // segment.
                if (u - p).norm() < EPSILON {
                    at_u = true;
                } else if (v - p).norm() < EPSILON {
                    at_v = true;
                } else {
                    count += 1;
                    crossings.push(p);
                }
            }
        }
        count += at_u as usize + at_v as usize;
        if count == 1 {
            // One endpoint of this footprint edge lies inside the band;
            // keep the endpoint on the outer side of the boundary edge.
            let outer = (v - u).x * (t1 - v).y - (v - u).y * (t1 - v).x;
            crossings.push(if outer < 0.0 { t1 } else { t2 });
        }
    }

    let mut max_dis = 0.0f64;
    for p in &crossings {
        max_dis = max_dis.max(geometry::distance_to_line(*p, u, v)?);
    }
    let required = dis + max_dis;
    if required < EPSILON {
        return Ok(None);
    }
    let kn = 1.0 - (dis.max(EPSILON) / required).powi(-2);
    if kn > 0.0 {
        // Footprint clear of the edge despite the broad intersection test.
        return Ok(None);
    }

    let weight = repulsion_weight(required, 1.0) + repulsion_weight(dis, 1.0);
    Ok(Some(BoundaryInteraction {
        linear: -(n_unit * (kn * weight)),
        angular_deg: ang_diff * weight,
        weight,
        ratio: dis / required,
        contact: min_mid_dist < config.edge_contact_bonus_distance,
    }))
}

/// One full force pass: blend the three interaction cases per tile and
/// weight-normalize the outputs.
pub fn step_forces(
    config: &PlacementConfig,
    polygon: &Polygon,
    poses: &[TilePose],
    neighbors: &NeighborTable,
    overlaps: &Overlaps,
) -> PlacementResult<ForcePass> {
    let n_tiles = poses.len();
    let mut pass = ForcePass {
        linear: vec![Vector::new(0.0, 0.0); n_tiles],
        angular_deg: vec![0.0; n_tiles],
        energy: 0.0,
        quality: 1.0,
        removal: vec![RemovalRank::default(); n_tiles],
    };

    for (i, p1) in poses.iter().enumerate() {
        let mut weight_sum = 0.0;

        // Alignment with the nearest neighbor of each resolved sector.
        for (k, slot) in neighbors[i].iter().enumerate() {
            let Some(j) = *slot else { continue };
            let pair = pair_interaction(config, p1, k, &poses[j], j)?;
            pass.linear[i] += pair.linear;
            pass.angular_deg[i] += pair.angular_deg;
            weight_sum += pair.weight;
            if pair.contact {
                pass.removal[i].bonus += 10;
            }
        }

        // Separation from currently-overlapping tiles.
        for &j in &overlaps.tiles[i] {
            let p2 = &poses[j];
            let k = neighbor::sector_of(config, p1.position, p1.angle_deg, p2.position)
                .ok_or(PlacementError::UnresolvedSector { tile: i })?;
            let pair = pair_interaction(config, p1, k, p2, j)?;
            pass.linear[i] += pair.linear;
            pass.angular_deg[i] += pair.angular_deg;
            weight_sum += pair.weight;
            pass.energy += (1.0 / pair.ratio.max(EPSILON) - 1.0).max(0.0);
            pass.quality = pass.quality.min(pair.ratio);
            pass.removal[i].score -= (1.0 - pair.ratio).max(0.0);
        }

        // Push-back from overlapped boundary edges.
        for &e in &overlaps.edges[i] {
            let Some(edge) = boundary_interaction(config, polygon, p1, e)? else {
                continue;
            };
            pass.linear[i] += edge.linear;
            pass.angular_deg[i] += edge.angular_deg;
            weight_sum += edge.weight;
            pass.energy += (1.0 / edge.ratio.max(EPSILON) - 1.0).max(0.0);
            pass.quality = pass.quality.min(edge.ratio);
            pass.removal[i].score -= (1.0 - edge.ratio).max(0.0);
            if edge.contact {
                pass.removal[i].bonus += 1;
            }
        }

        if weight_sum > EPSILON {
            pass.linear[i] /= weight_sum;
            pass.angular_deg[i] /= weight_sum;
        } else {
            pass.linear[i] = Vector::new(0.0, 0.0);
            pass.angular_deg[i] = 0.0;
        }
    }

    Ok(pass)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlap;

    fn pose(x: f64, y: f64, angle_deg: f64) -> TilePose {
        TilePose {
            position: Point::new(x, y),
            angle_deg,
        }
    }

    fn big_square() -> Polygon {
        Polygon::new(vec![
            Point::new(-20.0, -20.0),
            Point::new(20.0, -20.0),
            Point::new(20.0, 20.0),
            Point::new(-20.0, 20.0),
        ])
        .unwrap()
    }

    fn run_pass(polygon: &Polygon, poses: &[TilePose]) -> ForcePass {
        let config = PlacementConfig::default();
        let neighbors = neighbor::find_neighbors(&config, poses).unwrap();
        let overlaps = overlap::detect(polygon, poses);
        step_forces(&config, polygon, poses, &neighbors, &overlaps).unwrap()
    }

    #[test]
    fn clear_configuration_has_zero_energy() {
        let polygon = big_square();
        let poses = vec![pose(-6.0, 0.0, 0.0), pose(6.0, 0.0, 0.0), pose(0.0, 8.0, 0.0)];
        let pass = run_pass(&polygon, &poses);
        assert_eq!(pass.energy, 0.0);
        assert_eq!(pass.quality, 1.0);
        assert!(pass.removal.iter().all(|r| r.score == 0.0));
    }

    #[test]
    fn coincident_tiles_get_finite_separating_velocities() {
        let polygon = big_square();
        let poses = vec![pose(0.0, 0.0, 0.0), pose(0.0, 0.0, 90.0)];
        let pass = run_pass(&polygon, &poses);
        for i in 0..2 {
            let v = pass.linear[i];
            assert!(v.x.is_finite() && v.y.is_finite());
            assert!(v.norm() > 0.0, "tile {} must be pushed", i);
            assert!(pass.angular_deg[i].is_finite());
        }
        assert!(pass.energy > 0.0);
        assert!(pass.quality < 1.0);
    }

    #[test]
    fn overlapping_pair_lowers_quality_and_scores() {
        let polygon = big_square();
        // Centers one unit apart: footprints of circumradius 1 overlap.
        let poses = vec![pose(0.0, 0.0, 0.0), pose(0.0, 1.0, 0.0)];
        let pass = run_pass(&polygon, &poses);
        assert!(pass.energy > 0.0);
        assert!(pass.quality < 1.0);
        assert!(pass.removal[0].score < 0.0);
        assert!(pass.removal[1].score < 0.0);
    }

    #[test]
    fn aligned_neighbors_need_no_rotation() {
        let polygon = big_square();
        // Edge-to-edge at the ideal gap, facing each other exactly.
        let poses = vec![pose(0.0, 0.0, 0.0), pose(0.0, 2.0, 180.0)];
        let pass = run_pass(&polygon, &poses);
        assert!(pass.angular_deg[0].abs() < 1e-9);
        assert!(pass.angular_deg[1].abs() < 1e-9);
    }

    #[test]
    fn misaligned_neighbor_produces_angular_correction() {
        let polygon = big_square();
        let poses = vec![pose(0.0, 0.0, 0.0), pose(0.0, 2.5, 30.0)];
        let pass = run_pass(&polygon, &poses);
        assert!(pass.angular_deg[0].abs() > 1e-6);
    }

    #[test]
    fn boundary_violation_pushes_inward() {
        let polygon = big_square();
        // Center sitting on the bottom edge; the interior is above.
        let poses = vec![pose(0.0, -20.0, 0.0)];
        let pass = run_pass(&polygon, &poses);
        assert!(pass.linear[0].y > 0.0, "push must point into the polygon");
        assert!(pass.energy > 0.0);
        assert!(pass.quality < 1.0);
        assert!(pass.removal[0].score < 0.0);
    }

    #[test]
    fn quality_never_exceeds_one() {
        let polygon = big_square();
        let poses = vec![pose(0.0, 0.0, 10.0), pose(0.3, 0.4, 70.0), pose(-3.0, 2.0, 200.0)];
        let pass = run_pass(&polygon, &poses);
        assert!(pass.quality <= 1.0);
        assert!(pass.energy >= 0.0);
    }
}
