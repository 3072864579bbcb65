use crate::airfoil::{Airfoil, CoordinateLoop};
use crate::errors::Result;
use crate::geometry::polyline::interpolate_y;
use ncollide2d::na::Point2;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Number of chord stations used when measuring thickness and camber from coordinates
pub const MEASURE_STATIONS: usize = 20;

/// A real section used as blending source material
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceAirfoil {
    pub name: String,
    pub coordinates: CoordinateLoop,
    pub thickness: f64,
    pub camber: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_ld: Option<f64>,
}

impl ReferenceAirfoil {
    /// Performance figure assumed for references that don't declare one
    pub const NEUTRAL_PERFORMANCE: f64 = 100.0;

    pub fn new(
        name: &str,
        coordinates: CoordinateLoop,
        thickness: f64,
        camber: f64,
        expected_ld: Option<f64>,
    ) -> ReferenceAirfoil {
        ReferenceAirfoil {
            name: name.to_string(),
            coordinates,
            thickness,
            camber,
            expected_ld,
        }
    }

    /// Builds a reference whose declared thickness and camber are measured from the coordinates
    pub fn measured(
        name: &str,
        coordinates: CoordinateLoop,
        expected_ld: Option<f64>,
    ) -> ReferenceAirfoil {
        let (thickness, camber) = measure_thickness_and_camber(coordinates.points());
        ReferenceAirfoil::new(name, coordinates, thickness, camber, expected_ld)
    }

    pub fn performance(&self) -> f64 {
        self.expected_ld.unwrap_or(Self::NEUTRAL_PERFORMANCE)
    }
}

/// Splits the loop at its middle index and compares the two halves at evenly spaced chord
/// stations. Stations that one half doesn't span are skipped. Returns the maximum thickness and
/// the maximum absolute camber found.
pub fn measure_thickness_and_camber(points: &[Point2<f64>]) -> (f64, f64) {
    let split = points.len() / 2;
    let (upper, lower) = points.split_at(split);

    let mut thickness: f64 = 0.0;
    let mut camber: f64 = 0.0;
    for i in 0..MEASURE_STATIONS {
        let x = i as f64 / (MEASURE_STATIONS - 1) as f64;
        if let (Some(yu), Some(yl)) = (interpolate_y(upper, x), interpolate_y(lower, x)) {
            thickness = thickness.max((yu - yl).abs());
            camber = camber.max(((yu + yl) / 2.0).abs());
        }
    }

    (thickness, camber)
}

/// Returns the `count` references with the highest performance figure, best first
pub fn top_performers(references: &[ReferenceAirfoil], count: usize) -> Vec<ReferenceAirfoil> {
    let mut sorted = references.to_vec();
    sorted.sort_by(|a, b| {
        b.performance()
            .partial_cmp(&a.performance())
            .unwrap_or(Ordering::Equal)
    });
    sorted.truncate(count);
    sorted
}

/// Draws up to `count` distinct references at random, leaving out any whose name is in `exclude`
pub fn random_diverse<R: Rng + ?Sized>(
    rng: &mut R,
    references: &[ReferenceAirfoil],
    count: usize,
    exclude: &[&str],
) -> Vec<ReferenceAirfoil> {
    let candidates: Vec<&ReferenceAirfoil> = references
        .iter()
        .filter(|r| !exclude.contains(&r.name.as_str()))
        .collect();

    candidates
        .choose_multiple(rng, count)
        .map(|r| (*r).clone())
        .collect()
}

const UPPER_X: [f64; 19] = [
    0.0, 0.005, 0.01, 0.025, 0.05, 0.075, 0.1, 0.15, 0.2, 0.25, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9,
    0.95, 1.0,
];
const LOWER_X: [f64; 14] = [
    0.0, 0.01, 0.05, 0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9, 0.95, 1.0,
];

struct EmbeddedSection {
    name: &'static str,
    thickness: f64,
    camber: f64,
    expected_ld: f64,
    upper: [f64; 19],
    lower: [f64; 14],
}

const EMBEDDED: [EmbeddedSection; 5] = [
    EmbeddedSection {
        name: "E374",
        thickness: 0.098,
        camber: 0.025,
        expected_ld: 135.0,
        upper: [
            0.0, 0.018, 0.025, 0.038, 0.052, 0.062, 0.070, 0.082, 0.090, 0.095, 0.098, 0.098,
            0.092, 0.080, 0.064, 0.045, 0.024, 0.012, 0.0,
        ],
        lower: [
            0.0, -0.006, -0.014, -0.020, -0.028, -0.032, -0.034, -0.034, -0.032, -0.028, -0.022,
            -0.014, -0.008, 0.0,
        ],
    },
    EmbeddedSection {
        name: "S1223",
        thickness: 0.118,
        camber: 0.035,
        expected_ld: 116.0,
        upper: [
            0.0, 0.022, 0.030, 0.045, 0.062, 0.075, 0.085, 0.100, 0.110, 0.115, 0.118, 0.115,
            0.105, 0.090, 0.070, 0.048, 0.025, 0.012, 0.0,
        ],
        lower: [
            0.0, -0.002, -0.006, -0.010, -0.016, -0.020, -0.022, -0.023, -0.022, -0.020, -0.016,
            -0.010, -0.006, 0.0,
        ],
    },
    EmbeddedSection {
        name: "FX 63-137",
        thickness: 0.137,
        camber: 0.028,
        expected_ld: 142.0,
        upper: [
            0.0, 0.019, 0.026, 0.040, 0.055, 0.066, 0.075, 0.088, 0.097, 0.103, 0.106, 0.105,
            0.098, 0.085, 0.068, 0.047, 0.024, 0.012, 0.0,
        ],
        lower: [
            0.0, -0.003, -0.008, -0.013, -0.020, -0.025, -0.028, -0.029, -0.028, -0.025, -0.020,
            -0.012, -0.007, 0.0,
        ],
    },
    EmbeddedSection {
        name: "AG38",
        thickness: 0.102,
        camber: 0.024,
        expected_ld: 128.0,
        upper: [
            0.0, 0.0185, 0.0255, 0.039, 0.0535, 0.064, 0.0725, 0.085, 0.0935, 0.099, 0.102,
            0.101, 0.0945, 0.0825, 0.066, 0.046, 0.0235, 0.0115, 0.0,
        ],
        lower: [
            0.0, -0.0035, -0.0095, -0.0155, -0.0235, -0.0285, -0.031, -0.0315, -0.030, -0.0265,
            -0.021, -0.013, -0.0075, 0.0,
        ],
    },
    EmbeddedSection {
        name: "E423",
        thickness: 0.105,
        camber: 0.027,
        expected_ld: 118.0,
        upper: [
            0.0, 0.0175, 0.0245, 0.0375, 0.0515, 0.0615, 0.0695, 0.0815, 0.0895, 0.0945, 0.0975,
            0.097, 0.091, 0.0795, 0.0635, 0.0445, 0.023, 0.0115, 0.0,
        ],
        lower: [
            0.0, -0.0065, -0.0145, -0.0205, -0.0285, -0.0325, -0.0345, -0.0345, -0.0325, -0.0285,
            -0.0225, -0.0145, -0.0085, 0.0,
        ],
    },
];

impl EmbeddedSection {
    fn to_reference(&self) -> Result<ReferenceAirfoil> {
        let airfoil = Airfoil {
            camber: Vec::new(),
            upper: UPPER_X
                .iter()
                .zip(self.upper.iter())
                .map(|(x, y)| Point2::new(*x, *y))
                .collect(),
            lower: LOWER_X
                .iter()
                .zip(self.lower.iter())
                .map(|(x, y)| Point2::new(*x, *y))
                .collect(),
        };

        Ok(ReferenceAirfoil::new(
            self.name,
            airfoil.to_loop()?,
            self.thickness,
            self.camber,
            Some(self.expected_ld),
        ))
    }
}

/// The built in set of high performance low Reynolds number sections, each as a closed loop
/// starting and ending on the trailing edge
pub fn embedded() -> Result<Vec<ReferenceAirfoil>> {
    EMBEDDED.iter().map(|s| s.to_reference()).collect()
}
