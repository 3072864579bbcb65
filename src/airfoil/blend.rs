//! Blending of reference sections into new airfoils.
//!
//! The selected references are resampled to a common point count and averaged index by index.
//! Index correspondence only approximates chordwise correspondence, the later thickness and
//! camber rescale absorbs most of the difference.

use crate::airfoil::catalog::{random_diverse, top_performers, ReferenceAirfoil};
use crate::airfoil::generate::AirfoilFamily;
use crate::airfoil::params::ShapeParameters;
use crate::airfoil::CoordinateLoop;
use crate::errors::{AeroError, Result};
use crate::geometry::resample::resample;
use ncollide2d::na::Point2;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::{debug, warn};

/// Below this temperature only the best performing references are blended
pub const CONSERVATIVE_TEMPERATURE: f64 = 0.3;

/// Below this temperature top performers are mixed with randomly drawn references
pub const BALANCED_TEMPERATURE: f64 = 0.7;

/// Smoothness at or above which no moving average is applied
pub const SMOOTHING_CUTOFF: f64 = 0.99;

pub const MAX_SMOOTHING_RADIUS: f64 = 5.0;

/// Temperature below which no jitter is added
pub const MIN_JITTER_TEMPERATURE: f64 = 0.1;

/// Blend targets are restricted to the span covered by the reference sections
pub const TARGET_THICKNESS_RANGE: (f64, f64) = (0.08, 0.14);
pub const TARGET_CAMBER_RANGE: (f64, f64) = (0.015, 0.05);

const GEOMETRY_WEIGHT: f64 = 0.6;
const PERFORMANCE_WEIGHT: f64 = 0.4;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlendConfig {
    pub target_thickness: f64,
    pub target_camber: f64,
    pub temperature: f64,
    pub smoothness: f64,
    pub point_count: usize,

    /// Maximum number of references blended together
    pub blend_count: usize,

    /// Jitter amplitude per unit of `(1 - smoothness) * temperature`
    pub jitter_scale: f64,
}

impl Default for BlendConfig {
    fn default() -> Self {
        BlendConfig {
            target_thickness: 0.12,
            target_camber: 0.02,
            temperature: 0.7,
            smoothness: 0.8,
            point_count: 50,
            blend_count: 3,
            jitter_scale: 0.002,
        }
    }
}

impl From<&ShapeParameters> for BlendConfig {
    fn from(params: &ShapeParameters) -> Self {
        BlendConfig {
            target_thickness: params.thickness_ratio,
            target_camber: params.camber,
            temperature: params.temperature,
            smoothness: params.smoothness,
            point_count: params.complexity,
            ..BlendConfig::default()
        }
    }
}

impl BlendConfig {
    /// The thickness and camber actually aimed for, restricted to the reference span
    pub fn targets(&self) -> (f64, f64) {
        (
            self.target_thickness
                .clamp(TARGET_THICKNESS_RANGE.0, TARGET_THICKNESS_RANGE.1),
            self.target_camber
                .clamp(TARGET_CAMBER_RANGE.0, TARGET_CAMBER_RANGE.1),
        )
    }

    pub fn smoothing_radius(&self) -> usize {
        if self.smoothness >= SMOOTHING_CUTOFF {
            0
        } else {
            ((1.0 - self.smoothness.max(0.0)) * MAX_SMOOTHING_RADIUS).round() as usize
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlendedAirfoil {
    pub name: String,
    pub coordinates: CoordinateLoop,

    /// Names of the blended references, in the order their weights are listed
    pub sources: Vec<String>,
    pub weights: Vec<f64>,

    /// True when no references were available and a parametric section was generated instead
    pub used_fallback: bool,
}

/// Runs the full pipeline: selection, weighting, resampling, pointwise blend, smoothing,
/// thickness and camber rescale, then jitter. With no references a NACA 4-digit section with
/// the same targets is returned instead.
pub fn blend<R: Rng + ?Sized>(
    rng: &mut R,
    references: &[ReferenceAirfoil],
    config: &BlendConfig,
) -> Result<BlendedAirfoil> {
    if config.point_count < CoordinateLoop::MIN_POINTS {
        return Err(AeroError::NotEnoughPoints {
            found: config.point_count,
            required: CoordinateLoop::MIN_POINTS,
        });
    }

    let selected = select_references(rng, references, config);
    if selected.is_empty() {
        warn!("no reference airfoils available, falling back to a parametric section");
        return parametric_fallback(config);
    }

    let weights = blend_weights(rng, selected.len(), config.temperature);
    debug!(
        sources = ?selected.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(),
        weights = ?weights,
        "blending references"
    );

    let resampled = selected
        .iter()
        .map(|r| resample(r.coordinates.points(), config.point_count))
        .collect::<Result<Vec<_>>>()?;

    let (thickness, camber) = config.targets();
    let blended = weighted_sum(&resampled, &weights);
    let smoothed = smooth(&blended, config.smoothing_radius());
    let scaled = rescale(&smoothed, thickness, camber);
    let points = jitter(rng, &scaled, config);

    let sources: Vec<String> = selected.iter().map(|r| r.name.clone()).collect();
    Ok(BlendedAirfoil {
        name: format!("Blend ({})", sources.join("+")),
        coordinates: CoordinateLoop::new(points)?,
        sources,
        weights,
        used_fallback: false,
    })
}

/// Picks the references to blend according to the temperature, then orders them by how close
/// their thickness and camber are to the targets, with better performers breaking near ties.
pub fn select_references<R: Rng + ?Sized>(
    rng: &mut R,
    references: &[ReferenceAirfoil],
    config: &BlendConfig,
) -> Vec<ReferenceAirfoil> {
    let count = config.blend_count.max(1);
    let mut selected = if config.temperature < CONSERVATIVE_TEMPERATURE {
        top_performers(references, count)
    } else if config.temperature < BALANCED_TEMPERATURE {
        let mut top = top_performers(references, count.saturating_sub(1).max(1));
        let exclude: Vec<&str> = top.iter().map(|r| r.name.as_str()).collect();
        let extra = random_diverse(rng, references, count - top.len(), &exclude);
        top.extend(extra);
        top
    } else {
        random_diverse(rng, references, count, &[])
    };

    let (thickness, camber) = config.targets();
    selected.sort_by(|a, b| {
        selection_score(a, thickness, camber)
            .partial_cmp(&selection_score(b, thickness, camber))
            .unwrap_or(Ordering::Equal)
    });
    selected
}

/// Lower is better
pub fn selection_score(reference: &ReferenceAirfoil, thickness: f64, camber: f64) -> f64 {
    let geometry = (reference.thickness - thickness).abs() + (reference.camber - camber).abs();
    geometry * GEOMETRY_WEIGHT + PERFORMANCE_WEIGHT / reference.performance()
}

/// Draws `count` weights as `u^(1 / (2T + 0.5))` for uniform `u` and normalizes them to sum to
/// one. Hotter temperatures give flatter weights.
pub fn blend_weights<R: Rng + ?Sized>(rng: &mut R, count: usize, temperature: f64) -> Vec<f64> {
    if count == 0 {
        return Vec::new();
    }

    let exponent = 1.0 / (2.0 * temperature + 0.5);
    let raw: Vec<f64> = (0..count)
        .map(|_| rng.gen::<f64>().powf(exponent))
        .collect();
    let total: f64 = raw.iter().sum();

    if total > 0.0 && total.is_finite() {
        raw.iter().map(|w| w / total).collect()
    } else {
        vec![1.0 / count as f64; count]
    }
}

/// Pointwise weighted average of equally long point sequences
pub fn weighted_sum(shapes: &[Vec<Point2<f64>>], weights: &[f64]) -> Vec<Point2<f64>> {
    let count = shapes.iter().map(|s| s.len()).min().unwrap_or(0);
    (0..count)
        .map(|i| {
            shapes
                .iter()
                .zip(weights.iter())
                .fold(Point2::origin(), |acc, (s, w)| acc + s[i].coords * *w)
        })
        .collect()
}

/// Symmetric moving average of the given radius. The window is truncated near the ends of the
/// sequence, and the two end points are left in place so a closed loop stays closed.
pub fn smooth(points: &[Point2<f64>], radius: usize) -> Vec<Point2<f64>> {
    if radius == 0 || points.len() < 3 {
        return points.to_vec();
    }

    let last = points.len() - 1;
    (0..points.len())
        .map(|i| {
            if i == 0 || i == last {
                return points[i];
            }
            let window = &points[i.saturating_sub(radius)..=(i + radius).min(last)];
            let sum = window
                .iter()
                .fold(Point2::origin(), |acc: Point2<f64>, p| acc + p.coords);
            sum / window.len() as f64
        })
        .collect()
}

/// Pairs each point with its mirror index `n - 1 - i`, which sits at a similar chord position on
/// the opposite surface, and returns the largest thickness and absolute camber over the pairs.
pub fn paired_thickness_and_camber(points: &[Point2<f64>]) -> (f64, f64) {
    let n = points.len();
    (0..n / 2).fold((0.0, 0.0), |(t, c): (f64, f64), i| {
        let (a, b) = (points[i].y, points[n - 1 - i].y);
        (t.max((a - b).abs()), c.max(((a + b) / 2.0).abs()))
    })
}

/// Scales the thickness and camber of every mirror pair independently so that the measured
/// maxima match the targets. A shape with no thickness or no camber keeps that component.
pub fn rescale(points: &[Point2<f64>], thickness: f64, camber: f64) -> Vec<Point2<f64>> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }

    let (current_t, current_c) = paired_thickness_and_camber(points);
    let kt = if current_t > 0.0 { thickness / current_t } else { 1.0 };
    let kc = if current_c > 0.0 { camber / current_c } else { 1.0 };

    let mut result = points.to_vec();
    for i in 0..(n + 1) / 2 {
        let j = n - 1 - i;
        let mid = (points[i].y + points[j].y) / 2.0;
        let half = (points[i].y - points[j].y) / 2.0;
        result[i].y = mid * kc + half * kt;
        result[j].y = mid * kc - half * kt;
    }
    result
}

/// Adds uniform vertical noise of amplitude `(1 - smoothness) * temperature * jitter_scale` to
/// the interior points
pub fn jitter<R: Rng + ?Sized>(
    rng: &mut R,
    points: &[Point2<f64>],
    config: &BlendConfig,
) -> Vec<Point2<f64>> {
    if config.temperature < MIN_JITTER_TEMPERATURE || points.len() < 3 {
        return points.to_vec();
    }

    let amplitude = (1.0 - config.smoothness) * config.temperature * config.jitter_scale;
    let last = points.len() - 1;
    points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            if i == 0 || i == last {
                *p
            } else {
                Point2::new(p.x, p.y + (rng.gen::<f64>() - 0.5) * amplitude)
            }
        })
        .collect()
}

fn parametric_fallback(config: &BlendConfig) -> Result<BlendedAirfoil> {
    let (thickness, camber) = config.targets();
    let params = ShapeParameters {
        family: AirfoilFamily::Naca4Digit,
        thickness_ratio: thickness,
        camber,
        temperature: config.temperature,
        smoothness: config.smoothness,
        complexity: config.point_count,
        ..ShapeParameters::default()
    };

    let generated = AirfoilFamily::Naca4Digit.generate(&params, &[], config.point_count)?;
    let points = resample(generated.points(), config.point_count)?;

    Ok(BlendedAirfoil {
        name: format!("{} fallback", AirfoilFamily::Naca4Digit.label()),
        coordinates: CoordinateLoop::new(points)?,
        sources: Vec::new(),
        weights: Vec::new(),
        used_fallback: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::airfoil::catalog::embedded;
    use crate::airfoil::validate::validate_geometry;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use test_case::test_case;

    fn rng(seed: u64) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(seed)
    }

    fn config(temperature: f64) -> BlendConfig {
        BlendConfig {
            temperature,
            ..BlendConfig::default()
        }
    }

    fn names(refs: &[ReferenceAirfoil]) -> Vec<String> {
        let mut n: Vec<String> = refs.iter().map(|r| r.name.clone()).collect();
        n.sort();
        n
    }

    #[test_case(0.8, 1)]
    #[test_case(0.5, 3)]
    #[test_case(0.0, 5)]
    #[test_case(0.99, 0)]
    #[test_case(1.0, 0)]
    fn test_smoothing_radius(smoothness: f64, expected: usize) {
        let c = BlendConfig {
            smoothness,
            ..BlendConfig::default()
        };
        assert_eq!(expected, c.smoothing_radius());
    }

    #[test]
    fn test_targets_clamped_to_reference_span() {
        let c = BlendConfig {
            target_thickness: 0.2,
            target_camber: 0.0,
            ..BlendConfig::default()
        };
        assert_eq!((0.14, 0.015), c.targets());
    }

    #[test]
    fn test_config_from_parameters() {
        let params = ShapeParameters {
            thickness_ratio: 0.1,
            camber: 0.03,
            complexity: 64,
            ..ShapeParameters::default()
        };
        let c = BlendConfig::from(&params);
        assert_eq!(0.1, c.target_thickness);
        assert_eq!(0.03, c.target_camber);
        assert_eq!(64, c.point_count);
        assert_eq!(3, c.blend_count);
    }

    #[test]
    fn test_conservative_selection_uses_top_performers() {
        let refs = embedded().unwrap();
        let selected = select_references(&mut rng(1), &refs, &config(0.1));
        assert_eq!(vec!["AG38", "E374", "FX 63-137"], names(&selected));
    }

    #[test]
    fn test_balanced_selection_mixes_top_and_random() {
        let refs = embedded().unwrap();
        for seed in 0..10 {
            let selected = select_references(&mut rng(seed), &refs, &config(0.5));
            let n = names(&selected);
            assert_eq!(3, n.len());
            assert!(n.contains(&"FX 63-137".to_string()));
            assert!(n.contains(&"E374".to_string()));
            let mut unique = n.clone();
            unique.dedup();
            assert_eq!(n, unique);
        }
    }

    #[test]
    fn test_exploratory_selection_is_random() {
        let refs = embedded().unwrap();
        let mut seen = Vec::new();
        for seed in 0..20 {
            let selected = select_references(&mut rng(seed), &refs, &config(1.2));
            assert_eq!(3, selected.len());
            seen.extend(names(&selected));
        }
        seen.sort();
        seen.dedup();
        assert_eq!(5, seen.len());
    }

    #[test]
    fn test_selection_sorted_by_score() {
        let refs = embedded().unwrap();
        let c = config(0.1);
        let selected = select_references(&mut rng(1), &refs, &c);
        let (t, m) = c.targets();
        let scores: Vec<f64> = selected.iter().map(|r| selection_score(r, t, m)).collect();
        assert!(scores.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_weights_are_normalized() {
        let mut r = rng(7);
        for temperature in [0.1, 0.7, 1.5] {
            let w = blend_weights(&mut r, 3, temperature);
            assert_eq!(3, w.len());
            assert_relative_eq!(1.0, w.iter().sum::<f64>(), epsilon = 1e-12);
            assert!(w.iter().all(|v| *v >= 0.0));
        }
        assert!(blend_weights(&mut r, 0, 0.7).is_empty());
    }

    #[test]
    fn test_weighted_sum() {
        let a = vec![Point2::new(0.0, 0.0), Point2::new(1.0, 1.0)];
        let b = vec![Point2::new(1.0, 0.0), Point2::new(0.0, 1.0)];
        let blended = weighted_sum(&[a, b], &[0.25, 0.75]);
        assert_relative_eq!(0.75, blended[0].x);
        assert_relative_eq!(0.25, blended[1].x);
        assert_relative_eq!(1.0, blended[1].y);
    }

    #[test]
    fn test_smooth_keeps_ends() {
        let points = vec![
            Point2::new(1.0, 0.0),
            Point2::new(0.5, 0.3),
            Point2::new(0.0, 0.0),
            Point2::new(0.5, -0.3),
            Point2::new(1.0, 0.0),
        ];
        let smoothed = smooth(&points, 1);
        assert_eq!(points[0], smoothed[0]);
        assert_eq!(points[4], smoothed[4]);
        assert_relative_eq!(0.5, smoothed[1].x);
        assert_relative_eq!(0.1, smoothed[1].y);
        assert_relative_eq!(0.0, smoothed[2].y);
        assert_eq!(points, smooth(&points, 0));
    }

    #[test]
    fn test_rescale_hits_targets() {
        let points = vec![
            Point2::new(1.0, 0.0),
            Point2::new(0.5, 0.08),
            Point2::new(0.0, 0.0),
            Point2::new(0.5, -0.02),
            Point2::new(1.0, 0.0),
        ];
        let (t0, c0) = paired_thickness_and_camber(&points);
        assert_relative_eq!(0.1, t0, epsilon = 1e-12);
        assert_relative_eq!(0.03, c0, epsilon = 1e-12);

        let scaled = rescale(&points, 0.12, 0.02);
        let (t, c) = paired_thickness_and_camber(&scaled);
        assert_relative_eq!(0.12, t, epsilon = 1e-12);
        assert_relative_eq!(0.02, c, epsilon = 1e-12);
        assert_relative_eq!(0.08, scaled[1].y, epsilon = 1e-12);
        assert_relative_eq!(-0.04, scaled[3].y, epsilon = 1e-12);
    }

    #[test]
    fn test_jitter_is_small_and_keeps_ends() {
        let points: Vec<Point2<f64>> = (0..10).map(|i| Point2::new(i as f64, 0.0)).collect();
        let c = BlendConfig {
            temperature: 1.0,
            smoothness: 0.0,
            ..BlendConfig::default()
        };
        let moved = jitter(&mut rng(2), &points, &c);
        assert_eq!(points[0], moved[0]);
        assert_eq!(points[9], moved[9]);
        assert!(moved.iter().all(|p| p.y.abs() <= 0.001));
        assert!(moved.iter().any(|p| p.y != 0.0));

        let cold = BlendConfig {
            temperature: 0.05,
            ..c
        };
        assert_eq!(points, jitter(&mut rng(2), &points, &cold));
    }

    #[test_case(0.1)]
    #[test_case(0.5)]
    #[test_case(1.0)]
    fn test_blend_embedded_references(temperature: f64) {
        let refs = embedded().unwrap();
        let c = config(temperature);
        let result = blend(&mut rng(11), &refs, &c).unwrap();

        assert!(!result.used_fallback);
        assert_eq!(c.point_count, result.coordinates.len());
        assert_eq!(3, result.sources.len());
        assert_relative_eq!(1.0, result.weights.iter().sum::<f64>(), epsilon = 1e-12);
        assert_eq!(0.0, result.coordinates.trailing_edge_gap());

        let (t, m) = paired_thickness_and_camber(result.coordinates.points());
        assert_relative_eq!(0.12, t, epsilon = 1e-3);
        assert_relative_eq!(0.02, m, epsilon = 1e-3);

        let validation = validate_geometry(&result.coordinates);
        assert!(validation.valid, "{:?}", validation.issues);
    }

    #[test]
    fn test_blend_is_reproducible() {
        let refs = embedded().unwrap();
        let a = blend(&mut rng(5), &refs, &config(0.9)).unwrap();
        let b = blend(&mut rng(5), &refs, &config(0.9)).unwrap();
        assert_eq!(a, b);
    }

    #[test_case(50)]
    #[test_case(51)]
    #[test_case(3)]
    fn test_empty_references_fall_back(point_count: usize) {
        let c = BlendConfig {
            point_count,
            ..BlendConfig::default()
        };
        let result = blend(&mut rng(1), &[], &c).unwrap();
        assert!(result.used_fallback);
        assert!(result.sources.is_empty());
        assert_eq!(point_count, result.coordinates.len());
    }

    #[test]
    fn test_fallback_is_valid() {
        let result = blend(&mut rng(1), &[], &BlendConfig::default()).unwrap();
        assert!(validate_geometry(&result.coordinates).valid);
    }

    #[test]
    fn test_too_few_points_is_an_error() {
        let c = BlendConfig {
            point_count: 2,
            ..BlendConfig::default()
        };
        assert!(matches!(
            blend(&mut rng(1), &[], &c),
            Err(AeroError::NotEnoughPoints { found: 2, .. })
        ));
    }
}
