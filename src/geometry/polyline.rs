use crate::errors::{AeroError, Result};
use crate::geometry::distances2::dist;
use itertools::Itertools;
use ncollide2d::na::Point2;

/// Confirms that a point array holds at least `required` points and that every coordinate is
/// finite. Public entry points call this before any geometric math runs.
pub fn check_points(points: &[Point2<f64>], required: usize) -> Result<()> {
    if points.is_empty() {
        return Err(AeroError::EmptyInput);
    }

    if let Some(index) = points
        .iter()
        .position(|p| !(p.x.is_finite() && p.y.is_finite()))
    {
        return Err(AeroError::NonFiniteCoordinate { index });
    }

    if points.len() < required {
        return Err(AeroError::NotEnoughPoints {
            found: points.len(),
            required,
        });
    }

    Ok(())
}

/// Lengths of the consecutive segments of an open chain
pub fn segment_lengths(points: &[Point2<f64>]) -> Vec<f64> {
    points
        .iter()
        .tuple_windows()
        .map(|(a, b)| dist(a, b))
        .collect()
}

/// Total length of the open chain through the points
pub fn chain_length(points: &[Point2<f64>]) -> f64 {
    segment_lengths(points).iter().sum()
}

/// Estimates |d²y/dx²| at the center of a five point window from the second difference of the
/// outer and center points, `|y0 - 2·y2 + y4| / dx²` with `dx = (x4 - x0) / 4`.
///
/// No check is made that x advances monotonically, so a window wrapping around the nose of a loop
/// gives a large value. Returns 0.0 only when the window has no x extent.
pub fn estimate_curvature(window: &[Point2<f64>]) -> f64 {
    if window.len() != 5 {
        return 0.0;
    }

    let dx = (window[4].x - window[0].x) / 4.0;
    if dx == 0.0 {
        return 0.0;
    }

    ((window[0].y - 2.0 * window[2].y + window[4].y) / (dx * dx)).abs()
}

/// Linearly interpolates the y value of the chain at `x`, using the first segment (in chain
/// order) whose x span contains it. Returns None if `x` is outside every segment.
pub fn interpolate_y(points: &[Point2<f64>], x: f64) -> Option<f64> {
    points.iter().tuple_windows().find_map(|(p1, p2)| {
        let (lo, hi) = if p1.x <= p2.x {
            (p1.x, p2.x)
        } else {
            (p2.x, p1.x)
        };

        if x < lo || x > hi {
            None
        } else if (p2.x - p1.x).abs() <= f64::EPSILON {
            Some(p1.y)
        } else {
            let t = (x - p1.x) / (p2.x - p1.x);
            Some(p1.y + t * (p2.y - p1.y))
        }
    })
}
