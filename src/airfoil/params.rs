use crate::airfoil::generate::AirfoilFamily;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::ops::{Range, RangeInclusive};
use tracing::warn;

/// Distribution of the generated stations along the chord
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Spacing {
    #[default]
    Linear,
    /// Clusters stations near both edges, where curvature is highest
    Cosine,
}

impl Spacing {
    /// Chord fraction of station `i` out of `count` intervals, 0.0 at the leading edge
    pub fn fraction(&self, i: usize, count: usize) -> f64 {
        let f = i as f64 / count as f64;
        match self {
            Spacing::Linear => f,
            Spacing::Cosine => (1.0 - (PI * f).cos()) / 2.0,
        }
    }
}

/// The valid and recommended ranges of one numeric parameter
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct ParameterSpec {
    pub name: &'static str,
    pub min: f64,
    pub max: f64,
    pub default: f64,
    pub recommended: (f64, f64),
    pub warning: Option<&'static str>,
}

impl ParameterSpec {
    pub fn is_recommended(&self, value: f64) -> bool {
        value >= self.recommended.0 && value <= self.recommended.1
    }

    /// Returns the value to use for `key` along with a warning when the requested value had to be
    /// changed, or when it lies outside the recommended range and that range carries a note.
    pub fn check(&self, key: &str, value: f64) -> (f64, Option<String>) {
        if !value.is_finite() {
            let message = format!(
                "{}: value {} is not a finite number. Reset to default {}.",
                key, value, self.default
            );
            return (self.default, Some(message));
        }

        let clamped = value.clamp(self.min, self.max);
        if clamped != value {
            let message = format!(
                "{}: value {} outside valid range [{}, {}]. Clamped to {}.",
                key, value, self.min, self.max, clamped
            );
            (clamped, Some(message))
        } else if !self.is_recommended(value) {
            (value, self.warning.map(|w| format!("{}: {}", key, w)))
        } else {
            (value, None)
        }
    }
}

pub const TEMPERATURE: ParameterSpec = ParameterSpec {
    name: "Temperature",
    min: 0.1,
    max: 1.5,
    default: 0.7,
    recommended: (0.5, 1.0),
    warning: Some("Values > 1.2 may produce unconventional shapes requiring validation"),
};

pub const CAMBER: ParameterSpec = ParameterSpec {
    name: "Camber",
    min: 0.0,
    max: 0.08,
    default: 0.02,
    recommended: (0.015, 0.04),
    warning: Some("Values > 0.06 may increase drag significantly"),
};

pub const SMOOTHNESS: ParameterSpec = ParameterSpec {
    name: "Smoothness",
    min: 0.0,
    max: 1.0,
    default: 0.8,
    recommended: (0.7, 0.95),
    warning: Some("Values < 0.5 may produce non-manufacturable shapes"),
};

pub const THICKNESS_RATIO: ParameterSpec = ParameterSpec {
    name: "Thickness",
    min: 0.06,
    max: 0.18,
    default: 0.12,
    recommended: (0.08, 0.14),
    warning: Some("Values < 0.08 may compromise structural integrity"),
};

pub const LEADING_EDGE_RADIUS: ParameterSpec = ParameterSpec {
    name: "Leading Edge Radius",
    min: 0.005,
    max: 0.025,
    default: 0.012,
    recommended: (0.008, 0.025),
    warning: None,
};

pub const TRAILING_EDGE_ANGLE: ParameterSpec = ParameterSpec {
    name: "Trailing Edge Angle",
    min: 5.0,
    max: 25.0,
    default: 12.0,
    recommended: (10.0, 22.0),
    warning: None,
};

pub const LATENT_DIMENSION: ParameterSpec = ParameterSpec {
    name: "Latent Dimension",
    min: 8.0,
    max: 128.0,
    default: 32.0,
    recommended: (24.0, 64.0),
    warning: Some("Values > 96 may slow generation without significant quality gain"),
};

pub const COMPLEXITY: ParameterSpec = ParameterSpec {
    name: "Complexity",
    min: 30.0,
    max: 100.0,
    default: 50.0,
    recommended: (40.0, 70.0),
    warning: Some("Values > 80 may slow rendering without visual improvement"),
};

/// Number of points drawn for a randomly generated shape
pub const RANDOM_RESOLUTION: RangeInclusive<usize> = 200..=400;
pub const RANDOM_LATENT_DIMENSION: usize = 24;
const RANDOM_TEMPERATURE: Range<f64> = 0.1..5.0;

/// Parameters for generating one shape from a family generator. Values outside their valid
/// ranges are only corrected by `clamped`, the generators themselves take the numbers as given.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeParameters {
    pub family: AirfoilFamily,
    pub temperature: f64,
    pub camber: f64,
    pub smoothness: f64,
    pub thickness_ratio: f64,
    pub leading_edge_radius: f64,
    pub trailing_edge_angle: f64,
    pub latent_dimension: usize,

    /// Target number of coordinate points
    pub complexity: usize,
    pub spacing: Spacing,
}

impl Default for ShapeParameters {
    fn default() -> Self {
        ShapeParameters {
            family: AirfoilFamily::default(),
            temperature: TEMPERATURE.default,
            camber: CAMBER.default,
            smoothness: SMOOTHNESS.default,
            thickness_ratio: THICKNESS_RATIO.default,
            leading_edge_radius: LEADING_EDGE_RADIUS.default,
            trailing_edge_angle: TRAILING_EDGE_ANGLE.default,
            latent_dimension: LATENT_DIMENSION.default as usize,
            complexity: COMPLEXITY.default as usize,
            spacing: Spacing::default(),
        }
    }
}

/// A parameter set after range enforcement, with one message per adjusted or questionable value
#[derive(Clone, Debug, PartialEq)]
pub struct ClampedParameters {
    pub parameters: ShapeParameters,
    pub warnings: Vec<String>,
}

impl ShapeParameters {
    pub fn new(family: AirfoilFamily) -> ShapeParameters {
        ShapeParameters {
            family,
            ..ShapeParameters::default()
        }
    }

    fn numeric_fields(&self) -> [(&'static str, ParameterSpec, f64); 8] {
        [
            ("temperature", TEMPERATURE, self.temperature),
            ("camber", CAMBER, self.camber),
            ("smoothness", SMOOTHNESS, self.smoothness),
            ("thickness_ratio", THICKNESS_RATIO, self.thickness_ratio),
            ("leading_edge_radius", LEADING_EDGE_RADIUS, self.leading_edge_radius),
            ("trailing_edge_angle", TRAILING_EDGE_ANGLE, self.trailing_edge_angle),
            ("latent_dimension", LATENT_DIMENSION, self.latent_dimension as f64),
            ("complexity", COMPLEXITY, self.complexity as f64),
        ]
    }

    /// Clamps every numeric field into its valid range. Each out of range value produces a
    /// warning, which is also logged, and is never used as given.
    pub fn clamped(&self) -> ClampedParameters {
        let mut warnings = Vec::new();
        let mut values = [0.0; 8];
        for (i, (key, spec, value)) in self.numeric_fields().iter().enumerate() {
            let (v, message) = spec.check(key, *value);
            if let Some(m) = message {
                warn!("{}", m);
                warnings.push(m);
            }
            values[i] = v;
        }

        let parameters = ShapeParameters {
            family: self.family,
            temperature: values[0],
            camber: values[1],
            smoothness: values[2],
            thickness_ratio: values[3],
            leading_edge_radius: values[4],
            trailing_edge_angle: values[5],
            latent_dimension: values[6].round() as usize,
            complexity: values[7].round() as usize,
            spacing: self.spacing,
        };

        ClampedParameters {
            parameters,
            warnings,
        }
    }

    /// Draws a parameter set from ranges tuned to `family`, such as negative camber for reflex
    /// sections and thin profiles for the sharp family. The draws reach outside the valid ranges
    /// on purpose, so the result is meant to be generated as it is rather than clamped.
    pub fn random<R: Rng + ?Sized>(family: AirfoilFamily, rng: &mut R) -> ShapeParameters {
        let camber = match family {
            AirfoilFamily::ReflexCamber => -0.10..-0.04,
            AirfoilFamily::HighCamberUav => 0.10..0.18,
            AirfoilFamily::ThinSharp => -0.03..0.03,
            AirfoilFamily::WortmannFx => 0.05..0.13,
            AirfoilFamily::RandomProcedural => -0.12..0.18,
            _ => -0.06..0.12,
        };
        let smoothness = match family {
            AirfoilFamily::RandomProcedural => 0.0..1.0,
            AirfoilFamily::ThinSharp => 0.7..1.0,
            _ => 0.3..1.0,
        };
        let thickness_ratio = match family {
            AirfoilFamily::ThinSharp => 0.05..0.10,
            AirfoilFamily::Naca6Series => 0.08..0.16,
            AirfoilFamily::WortmannFx => 0.13..0.20,
            AirfoilFamily::RandomProcedural => 0.05..0.23,
            AirfoilFamily::HighCamberUav => 0.14..0.22,
            _ => 0.07..0.21,
        };
        let leading_edge_radius = match family {
            AirfoilFamily::ThinSharp => 0.005..0.010,
            AirfoilFamily::Selig => 0.012..0.025,
            AirfoilFamily::RandomProcedural => 0.005..0.025,
            _ => 0.008..0.025,
        };
        let trailing_edge_angle = match family {
            AirfoilFamily::ThinSharp => 5.0..13.0,
            AirfoilFamily::ReflexCamber => 8.0..15.0,
            AirfoilFamily::RandomProcedural => 5.0..25.0,
            _ => 10.0..22.0,
        };

        ShapeParameters {
            family,
            temperature: rng.gen_range(RANDOM_TEMPERATURE),
            camber: rng.gen_range(camber),
            smoothness: rng.gen_range(smoothness),
            thickness_ratio: rng.gen_range(thickness_ratio),
            leading_edge_radius: rng.gen_range(leading_edge_radius),
            trailing_edge_angle: rng.gen_range(trailing_edge_angle),
            latent_dimension: RANDOM_LATENT_DIMENSION,
            complexity: rng.gen_range(RANDOM_RESOLUTION),
            spacing: Spacing::Linear,
        }
    }

    /// A note for every numeric field outside its valid range. Values are left as they are.
    pub fn range_notes(&self) -> Vec<String> {
        self.numeric_fields()
            .iter()
            .filter(|(_, spec, value)| *value < spec.min || *value > spec.max)
            .map(|(key, spec, value)| {
                format!(
                    "{}: value {:.4} outside valid range [{}, {}]. Used as drawn.",
                    key, value, spec.min, spec.max
                )
            })
            .collect()
    }

    /// Coarse description of the noise, camber and finish, such as "stable, positive lift, smooth"
    pub fn character(&self) -> String {
        let temperature = if self.temperature < 1.0 {
            "stable"
        } else if self.temperature < 3.0 {
            "moderate"
        } else {
            "wild"
        };
        let camber = if self.camber < 0.0 {
            "reflex"
        } else {
            "positive lift"
        };
        let finish = if self.smoothness < 0.3 {
            "rough"
        } else if self.smoothness < 0.7 {
            "moderate"
        } else {
            "smooth"
        };
        format!("{}, {}, {}", temperature, camber, finish)
    }

    /// One line per numeric field, marking whether it sits inside its recommended range
    pub fn summary(&self) -> String {
        self.numeric_fields()
            .iter()
            .map(|(_, spec, value)| {
                let status = if spec.is_recommended(*value) { "ok" } else { "!!" };
                format!(
                    "{} {}: {:.3} (recommended: {}-{})",
                    status, spec.name, value, spec.recommended.0, spec.recommended.1
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// A file name safe identifier combining a shape name with the main parameters
    pub fn identifier(&self, name: &str) -> String {
        let mut safe = String::new();
        for c in name.chars() {
            let c = if c.is_ascii_alphanumeric() { c } else { '_' };
            if !(c == '_' && safe.ends_with('_')) {
                safe.push(c);
            }
        }
        let safe: String = safe.chars().take(30).collect();

        format!(
            "{}_T{:.0}_C{:.0}_S{:.0}",
            safe,
            self.temperature * 100.0,
            self.camber * 100.0,
            self.smoothness * 100.0
        )
    }
}
