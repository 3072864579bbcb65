use crate::geometry::aabb2::{segment_aabb, OverlapVisitor};
use crate::geometry::distances2::mid_point;
use ncollide2d::na::{Point2, RealField, Vector2};
use ncollide2d::partitioning::BVH;
use ncollide2d::shape::Polyline;
use serde::{Deserialize, Serialize};

/// Chains with more segments than this are checked through the polyline's bounding volume tree
/// rather than by testing every pair of segments
pub const INDEXED_SEGMENT_THRESHOLD: usize = 256;

/// Returns the z component of the cross product of (b - a) and (c - a). Positive when `c` lies to
/// the left of the directed line from `a` to `b`, zero when the three points are collinear.
pub fn orientation(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Tests whether segment a1-a2 properly crosses segment b1-b2, meaning that the endpoints of each
/// lie strictly on opposite sides of the other's line. Touching and collinear overlap are not
/// crossings.
pub fn segments_intersect(
    a1: &Point2<f64>,
    a2: &Point2<f64>,
    b1: &Point2<f64>,
    b2: &Point2<f64>,
) -> bool {
    let d1 = orientation(b1, b2, a1);
    let d2 = orientation(b1, b2, a2);
    let d3 = orientation(a1, a2, b1);
    let d4 = orientation(a1, a2, b2);

    ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
}

/// Compute the intersection parameters between two parameterized lines. Will return None if
/// the two directions are parallel to each other
pub fn intersection_param<N: RealField + Copy>(
    a0: &Point2<N>,
    ad: &Vector2<N>,
    b0: &Point2<N>,
    bd: &Vector2<N>,
) -> Option<(N, N)> {
    let det: N = bd.x * ad.y - bd.y * ad.x;
    if det.abs() <= N::default_epsilon() {
        return None;
    }

    let dx = b0.x - a0.x;
    let dy = b0.y - a0.y;

    Some(((dy * bd.x - dx * bd.y) / det, (dy * ad.x - dx * ad.y) / det))
}

/// A crossing between segment `first` (points first..first+1) and segment `second` of the same
/// chain, with `first < second`
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SegmentCrossing {
    pub first: usize,
    pub second: usize,

    #[serde(with = "crate::serialize::optional_point")]
    pub location: Option<Point2<f64>>,
}

fn crossing_between(points: &[Point2<f64>], i: usize, j: usize) -> Option<SegmentCrossing> {
    let (a1, a2) = (&points[i], &points[i + 1]);
    let (b1, b2) = (&points[j], &points[j + 1]);
    if !segments_intersect(a1, a2, b1, b2) {
        return None;
    }

    let ad = a2 - a1;
    let location = match intersection_param(a1, &ad, b1, &(b2 - b1)) {
        Some((t, _)) => a1 + ad * t,
        None => mid_point(a1, b1),
    };

    Some(SegmentCrossing {
        first: i,
        second: j,
        location: Some(location),
    })
}

/// Checks every pair of non-adjacent segments of the open chain through `points`
pub fn naive_self_intersections(points: &[Point2<f64>]) -> Vec<SegmentCrossing> {
    let segments = points.len().saturating_sub(1);
    let mut results = Vec::new();
    for i in 0..segments {
        for j in (i + 2)..segments {
            if let Some(c) = crossing_between(points, i, j) {
                results.push(c);
            }
        }
    }

    results
}

/// Produces the same crossings as `naive_self_intersections`, in the same order, but only runs
/// the exact test on segment pairs whose bounding boxes overlap in the polyline's BVT
pub fn indexed_self_intersections(points: &[Point2<f64>]) -> Vec<SegmentCrossing> {
    // Fewer than three segments can't contain a non-adjacent pair
    if points.len() < 4 {
        return Vec::new();
    }

    let line = Polyline::new(points.to_vec(), None);
    let mut results = Vec::new();
    let mut candidates: Vec<usize> = Vec::new();
    for i in 0..points.len() - 1 {
        candidates.clear();
        let query = segment_aabb(&points[i], &points[i + 1]);
        let mut visitor = OverlapVisitor::new(&query, &mut candidates);
        line.bvt().visit(&mut visitor);

        candidates.sort_unstable();
        for &j in candidates.iter().filter(|j| **j >= i + 2) {
            if let Some(c) = crossing_between(points, i, j) {
                results.push(c);
            }
        }
    }

    results
}

/// Finds the crossings between non-adjacent segments, choosing the search strategy by size
pub fn self_intersections(points: &[Point2<f64>]) -> Vec<SegmentCrossing> {
    if points.len() > INDEXED_SEGMENT_THRESHOLD + 1 {
        indexed_self_intersections(points)
    } else {
        naive_self_intersections(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;
    use test_case::test_case;

    fn p(x: f64, y: f64) -> Point2<f64> {
        Point2::new(x, y)
    }

    #[test_case((0.0, 0.0, 1.0, 1.0), (0.0, 1.0, 1.0, 0.0), true; "crossing")]
    #[test_case((0.0, 0.0, 1.0, 0.0), (0.5, 0.0, 0.5, 1.0), false; "t junction")]
    #[test_case((0.0, 0.0, 1.0, 0.0), (0.0, 1.0, 1.0, 1.0), false; "parallel")]
    #[test_case((0.0, 0.0, 2.0, 0.0), (1.0, 0.0, 3.0, 0.0), false; "collinear overlap")]
    #[test_case((0.0, 0.0, 1.0, 1.0), (2.0, 0.0, 3.0, 1.0), false; "disjoint")]
    #[test_case((0.0, 0.0, 1.0, 1.0), (1.0, 1.0, 2.0, 0.0), false; "shared endpoint")]
    fn test_segments_intersect(a: (f64, f64, f64, f64), b: (f64, f64, f64, f64), e: bool) {
        let result = segments_intersect(&p(a.0, a.1), &p(a.2, a.3), &p(b.0, b.1), &p(b.2, b.3));
        assert_eq!(e, result);
    }

    #[test]
    fn test_segments_intersect_symmetric() {
        let (a1, a2, b1, b2) = (p(0.0, 0.0), p(1.0, 1.0), p(0.0, 1.0), p(1.0, 0.0));
        assert!(segments_intersect(&a1, &a2, &b1, &b2));
        assert!(segments_intersect(&b1, &b2, &a1, &a2));
        assert!(segments_intersect(&a2, &a1, &b2, &b1));
    }

    #[test]
    fn test_figure_eight_crossing() {
        let points = vec![p(0.0, 0.0), p(1.0, 1.0), p(1.0, 0.0), p(0.0, 1.0), p(0.0, 0.0)];
        let result = naive_self_intersections(&points);

        assert_eq!(1, result.len());
        assert_eq!((0, 2), (result[0].first, result[0].second));
        let location = result[0].location.unwrap();
        assert_relative_eq!(0.5, location.x, epsilon = 1e-12);
        assert_relative_eq!(0.5, location.y, epsilon = 1e-12);
    }

    #[test]
    fn test_closed_square_has_no_crossings() {
        let points = vec![p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0), p(0.0, 1.0), p(0.0, 0.0)];
        assert!(naive_self_intersections(&points).is_empty());
        assert!(indexed_self_intersections(&points).is_empty());
    }

    #[test]
    fn test_intersection_param_parallel() {
        let r = intersection_param(
            &p(0.0, 0.0),
            &Vector2::new(1.0, 0.0),
            &p(0.0, 1.0),
            &Vector2::new(2.0, 0.0),
        );
        assert!(r.is_none());
    }

    #[test]
    fn test_indexed_matches_naive_on_random_chain() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let points: Vec<Point2<f64>> = (0..400)
            .map(|_| p(rng.gen_range(0.0..1.0), rng.gen_range(0.0..1.0)))
            .collect();

        let naive = naive_self_intersections(&points);
        let indexed = indexed_self_intersections(&points);

        assert!(!naive.is_empty());
        assert_eq!(naive, indexed);
    }

    #[test]
    fn test_indexed_matches_naive_on_smooth_loop() {
        let points: Vec<Point2<f64>> = (0..=600)
            .map(|i| {
                let a = i as f64 / 600.0 * std::f64::consts::TAU;
                p(0.5 + 0.5 * a.cos(), 0.1 * a.sin())
            })
            .collect();

        assert!(self_intersections(&points).is_empty());
        assert_eq!(naive_self_intersections(&points), indexed_self_intersections(&points));
    }
}
