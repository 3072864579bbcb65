use ncollide2d::na::Point2;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The boundary representation of a coordinate, as it appears in JSON and coordinate files. The
/// optional `z` is carried through for three dimensional shapes but ignored by the 2D algorithms.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AeroPoint {
    pub x: f64,
    pub y: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
}

impl AeroPoint {
    pub fn new(x: f64, y: f64) -> AeroPoint {
        AeroPoint { x, y, z: None }
    }

    pub fn with_z(x: f64, y: f64, z: f64) -> AeroPoint {
        AeroPoint { x, y, z: Some(z) }
    }
}

impl From<Point2<f64>> for AeroPoint {
    fn from(p: Point2<f64>) -> Self {
        AeroPoint::new(p.x, p.y)
    }
}

impl From<&Point2<f64>> for AeroPoint {
    fn from(p: &Point2<f64>) -> Self {
        AeroPoint::new(p.x, p.y)
    }
}

impl From<AeroPoint> for Point2<f64> {
    fn from(p: AeroPoint) -> Self {
        Point2::new(p.x, p.y)
    }
}

/// Serde adapter for an optional point, written as `{x, y}` or `null`
pub mod optional_point {
    use super::*;

    pub fn serialize<S: Serializer>(point: &Option<Point2<f64>>, s: S) -> Result<S::Ok, S::Error> {
        point.map(AeroPoint::from).serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Point2<f64>>, D::Error> {
        let value: Option<AeroPoint> = Option::deserialize(d)?;
        Ok(value.map(Point2::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn z_is_omitted_when_absent() {
        let text = serde_json::to_string(&AeroPoint::new(0.5, -0.25)).unwrap();
        assert_eq!(r#"{"x":0.5,"y":-0.25}"#, text);
    }

    #[test]
    fn z_survives_json() {
        let p = AeroPoint::with_z(1.0, 2.0, 3.0);
        let text = serde_json::to_string(&p).unwrap();
        let back: AeroPoint = serde_json::from_str(&text).unwrap();
        assert_eq!(p, back);
    }
}
