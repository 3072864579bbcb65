use ncollide2d::na::{Point2, RealField};

/// Return the distance between two 2D points
pub fn dist<N: RealField + Copy>(a: &Point2<N>, b: &Point2<N>) -> N {
    (a - b).norm()
}

pub fn mid_point(a: &Point2<f64>, b: &Point2<f64>) -> Point2<f64> {
    Point2::new((a.x + b.x) * 0.5, (a.y + b.y) * 0.5)
}

/// Returns the interior angle in degrees at `p1` formed by the rays towards `p0` and `p2`. A
/// degenerate vertex (where either neighbor coincides with `p1`) is reported as straight, 180
/// degrees, so that it never registers as a sharp corner.
pub fn angle_between(p0: &Point2<f64>, p1: &Point2<f64>, p2: &Point2<f64>) -> f64 {
    let v1 = p0 - p1;
    let v2 = p2 - p1;
    let norms = v1.norm() * v2.norm();
    if norms <= f64::EPSILON {
        return 180.0;
    }

    (v1.dot(&v2) / norms).clamp(-1.0, 1.0).acos().to_degrees()
}
