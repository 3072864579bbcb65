use crate::errors::Result;
use crate::geometry::polyline::check_points;
use ncollide2d::na::Point2;

/// Maps a chain of points onto exactly `target` points by walking a fractional index with a
/// constant step of `(len - 1) / (target - 1)` and linearly interpolating between the two
/// neighboring original points. Spacing follows the original indices, not arc length.
///
/// Asking for the original count returns the input unchanged, and for any target of two or more
/// the first and last original points are reproduced exactly.
pub fn resample(points: &[Point2<f64>], target: usize) -> Result<Vec<Point2<f64>>> {
    check_points(points, 1)?;

    if target == points.len() {
        return Ok(points.to_vec());
    }

    match target {
        0 => return Ok(Vec::new()),
        1 => return Ok(vec![points[0]]),
        _ => {}
    }

    let last = points.len() - 1;
    let step = last as f64 / (target - 1) as f64;
    let mut result: Vec<Point2<f64>> = (0..target)
        .map(|i| {
            let f = i as f64 * step;
            let i0 = (f.floor() as usize).min(last);
            let i1 = (i0 + 1).min(last);
            let t = f - i0 as f64;
            points[i0] + (points[i1] - points[i0]) * t
        })
        .collect();

    result[target - 1] = points[last];
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AeroError;
    use approx::assert_relative_eq;
    use proptest::prelude::*;
    use test_case::test_case;

    fn chain() -> Vec<Point2<f64>> {
        vec![
            Point2::new(1.0, 0.0),
            Point2::new(0.5, 0.1),
            Point2::new(0.0, 0.0),
            Point2::new(0.5, -0.1),
            Point2::new(1.0, 0.0),
        ]
    }

    #[test]
    fn test_same_count_is_identity() {
        let points = chain();
        assert_eq!(points, resample(&points, points.len()).unwrap());
    }

    #[test_case(2)]
    #[test_case(3)]
    #[test_case(9)]
    #[test_case(50)]
    fn test_count_and_endpoints(target: usize) {
        let points = chain();
        let result = resample(&points, target).unwrap();
        assert_eq!(target, result.len());
        assert_eq!(points[0], result[0]);
        assert_eq!(points[4], result[target - 1]);
    }

    #[test]
    fn test_upsample_interpolates_midpoints() {
        let result = resample(&chain(), 9).unwrap();
        assert_relative_eq!(0.75, result[1].x, epsilon = 1e-12);
        assert_relative_eq!(0.05, result[1].y, epsilon = 1e-12);
        assert_eq!(Point2::new(0.0, 0.0), result[4]);
    }

    #[test]
    fn test_degenerate_targets() {
        let points = chain();
        assert!(resample(&points, 0).unwrap().is_empty());
        assert_eq!(vec![points[0]], resample(&points, 1).unwrap());
        let single = vec![Point2::new(0.3, 0.2)];
        assert_eq!(vec![single[0]; 4], resample(&single, 4).unwrap());
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(matches!(resample(&[], 10), Err(AeroError::EmptyInput)));
        let bad = vec![Point2::new(0.0, f64::INFINITY), Point2::new(1.0, 0.0)];
        assert!(matches!(
            resample(&bad, 10),
            Err(AeroError::NonFiniteCoordinate { index: 0 })
        ));
    }

    proptest! {
        #[test]
        fn resample_preserves_endpoints(
            ys in prop::collection::vec(-1.0f64..1.0, 2..60),
            target in 2usize..200,
        ) {
            let points: Vec<Point2<f64>> = ys
                .iter()
                .enumerate()
                .map(|(i, y)| Point2::new(i as f64, *y))
                .collect();
            let result = resample(&points, target).unwrap();
            prop_assert_eq!(target, result.len());
            prop_assert_eq!(points[0], result[0]);
            prop_assert_eq!(points[points.len() - 1], result[target - 1]);
        }
    }
}
