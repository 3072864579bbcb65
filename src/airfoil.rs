use crate::errors::{AeroError, Result};
use crate::geometry::distances2::dist;
use crate::geometry::polyline::check_points;
use crate::serialize::AeroPoint;
use ncollide2d::na::Point2;
use serde::{Deserialize, Serialize};

pub mod blend;
pub mod catalog;
pub mod dat;
pub mod generate;
pub mod params;
pub mod validate;

/// The camber line point and the two surface points generated at one chordwise fraction
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CamberStation {
    pub camber: Point2<f64>,
    pub upper: Point2<f64>,
    pub lower: Point2<f64>,
}

impl CamberStation {
    pub fn new(camber: Point2<f64>, upper: Point2<f64>, lower: Point2<f64>) -> CamberStation {
        CamberStation {
            camber,
            upper,
            lower,
        }
    }
}

/// An airfoil as three chains of points, each ordered from the leading edge to the trailing edge
#[derive(Clone, Debug, PartialEq)]
pub struct Airfoil {
    pub camber: Vec<Point2<f64>>,
    pub upper: Vec<Point2<f64>>,
    pub lower: Vec<Point2<f64>>,
}

impl Airfoil {
    pub fn from_stations(stations: &[CamberStation]) -> Airfoil {
        Airfoil {
            camber: stations.iter().map(|s| s.camber).collect(),
            upper: stations.iter().map(|s| s.upper).collect(),
            lower: stations.iter().map(|s| s.lower).collect(),
        }
    }

    /// Assembles the closed outline: the upper surface from the trailing edge forward to the
    /// leading edge, then the lower surface back to the trailing edge. When both surfaces start
    /// on the same leading edge point it appears only once.
    pub fn to_outer_contour(&self) -> Vec<Point2<f64>> {
        let mut result: Vec<Point2<f64>> = self.upper.iter().rev().copied().collect();
        let skip = match (self.upper.first(), self.lower.first()) {
            (Some(u), Some(l)) if u == l => 1,
            _ => 0,
        };
        result.extend(self.lower.iter().skip(skip));
        result
    }

    pub fn to_loop(&self) -> Result<CoordinateLoop> {
        CoordinateLoop::new(self.to_outer_contour())
    }
}

/// An ordered, closed (or nearly closed) contour of at least three finite points. By convention
/// it runs along the upper surface from the trailing edge to the leading edge and returns along
/// the lower surface.
///
/// The loop is planar. Serialized points carry only x and y, and any z given on input is
/// discarded when the loop is built.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<AeroPoint>", into = "Vec<AeroPoint>")]
pub struct CoordinateLoop {
    points: Vec<Point2<f64>>,
}

impl CoordinateLoop {
    pub const MIN_POINTS: usize = 3;

    pub fn new(points: Vec<Point2<f64>>) -> Result<CoordinateLoop> {
        check_points(&points, Self::MIN_POINTS)?;
        Ok(CoordinateLoop { points })
    }

    pub fn points(&self) -> &[Point2<f64>] {
        &self.points
    }

    pub fn into_points(self) -> Vec<Point2<f64>> {
        self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Point2<f64> {
        self.points[0]
    }

    pub fn last(&self) -> Point2<f64> {
        self.points[self.points.len() - 1]
    }

    /// Distance between the two ends of the contour
    pub fn trailing_edge_gap(&self) -> f64 {
        dist(&self.first(), &self.last())
    }

    pub fn to_aero_points(&self) -> Vec<AeroPoint> {
        self.points.iter().map(AeroPoint::from).collect()
    }
}

/// Projects the points onto the xy plane, dropping z
impl TryFrom<Vec<AeroPoint>> for CoordinateLoop {
    type Error = AeroError;

    fn try_from(values: Vec<AeroPoint>) -> Result<Self> {
        CoordinateLoop::new(values.into_iter().map(Point2::from).collect())
    }
}

impl From<CoordinateLoop> for Vec<AeroPoint> {
    fn from(value: CoordinateLoop) -> Self {
        value.to_aero_points()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point2<f64> {
        Point2::new(x, y)
    }

    #[test]
    fn test_outer_contour_shares_leading_edge() {
        let stations = vec![
            CamberStation::new(p(0.0, 0.0), p(0.0, 0.0), p(0.0, 0.0)),
            CamberStation::new(p(0.5, 0.01), p(0.5, 0.06), p(0.5, -0.04)),
            CamberStation::new(p(1.0, 0.0), p(1.0, 0.0), p(1.0, 0.0)),
        ];
        let airfoil = Airfoil::from_stations(&stations);
        let contour = airfoil.to_outer_contour();

        assert_eq!(
            vec![p(1.0, 0.0), p(0.5, 0.06), p(0.0, 0.0), p(0.5, -0.04), p(1.0, 0.0)],
            contour
        );
        assert_eq!(0.0, airfoil.to_loop().unwrap().trailing_edge_gap());
    }

    #[test]
    fn test_outer_contour_keeps_distinct_leading_edges() {
        let airfoil = Airfoil {
            camber: vec![],
            upper: vec![p(0.0, 0.01), p(1.0, 0.0)],
            lower: vec![p(0.0, -0.01), p(1.0, 0.0)],
        };
        assert_eq!(4, airfoil.to_outer_contour().len());
    }

    #[test]
    fn test_loop_requires_three_points() {
        let result = CoordinateLoop::new(vec![p(0.0, 0.0), p(1.0, 0.0)]);
        assert!(matches!(
            result,
            Err(AeroError::NotEnoughPoints { found: 2, .. })
        ));
    }

    #[test]
    fn test_loop_json_is_point_array() {
        let lp = CoordinateLoop::new(vec![p(1.0, 0.0), p(0.0, 0.5), p(1.0, 0.0)]).unwrap();
        let text = serde_json::to_string(&lp).unwrap();
        assert_eq!(
            r#"[{"x":1.0,"y":0.0},{"x":0.0,"y":0.5},{"x":1.0,"y":0.0}]"#,
            text
        );
        let back: CoordinateLoop = serde_json::from_str(&text).unwrap();
        assert_eq!(lp, back);
    }

    #[test]
    fn test_loop_json_drops_z() {
        let text = r#"[{"x":1.0,"y":0.0,"z":0.3},{"x":0.0,"y":0.5,"z":0.3},{"x":1.0,"y":0.0}]"#;
        let lp: CoordinateLoop = serde_json::from_str(text).unwrap();
        assert_eq!(vec![p(1.0, 0.0), p(0.0, 0.5), p(1.0, 0.0)], lp.points());

        let out = serde_json::to_string(&lp).unwrap();
        assert!(!out.contains('z'));
    }

    #[test]
    fn test_loop_json_rejects_short_arrays() {
        let result: std::result::Result<CoordinateLoop, _> =
            serde_json::from_str(r#"[{"x":1.0,"y":0.0}]"#);
        assert!(result.is_err());
    }
}
