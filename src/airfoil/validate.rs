use crate::airfoil::CoordinateLoop;
use crate::errors::Result;
use crate::geometry::distances2::{angle_between, dist};
use crate::geometry::polyline::{chain_length, estimate_curvature, segment_lengths};
use crate::geometry::polyline_intersections::self_intersections;
use itertools::Itertools;
use ncollide2d::na::Point2;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A segment adjacent to a vertex longer than this multiple of the average of the vertex's two
/// segments is reported as a gap
pub const GAP_RATIO: f64 = 3.0;

/// Interior angles below this many degrees are reported as sharp
pub const SHARP_ANGLE_DEGREES: f64 = 30.0;
pub const MAX_CURVATURE: f64 = 50.0;
pub const MAX_TRAILING_EDGE_GAP: f64 = 0.01;
pub const MIN_THICKNESS: f64 = 0.04;
pub const MAX_THICKNESS: f64 = 0.20;
pub const MIN_LEADING_EDGE_RADIUS: f64 = 0.001;

/// Points within this chordwise distance of the leading edge point feed the radius estimate
pub const LEADING_EDGE_WINDOW: f64 = 0.05;
const FALLBACK_LEADING_EDGE_RADIUS: f64 = 0.01;

pub const ERROR_PENALTY: f64 = 0.3;
pub const WARNING_PENALTY: f64 = 0.1;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueKind {
    SelfIntersection,
    Discontinuity,
    SharpAngle,
    OpenTrailingEdge,
    TooThin,
    TooThick,
    SharpLeadingEdge,
    HighCurvature,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub severity: Severity,

    #[serde(rename = "type")]
    pub kind: IssueKind,
    pub message: String,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "crate::serialize::optional_point"
    )]
    pub location: Option<Point2<f64>>,
}

impl ValidationIssue {
    pub fn new(
        severity: Severity,
        kind: IssueKind,
        message: String,
        location: Option<Point2<f64>>,
    ) -> ValidationIssue {
        ValidationIssue {
            severity,
            kind,
            message,
            location,
        }
    }

    fn warning(kind: IssueKind, message: String, location: Option<Point2<f64>>) -> Self {
        Self::new(Severity::Warning, kind, message, location)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeometryMetrics {
    pub chord_length: f64,
    pub max_thickness: f64,
    pub max_thickness_location: f64,

    /// Signed, the camber with the largest magnitude
    pub max_camber: f64,
    pub max_camber_location: f64,
    pub leading_edge_radius: f64,

    /// Degrees
    pub trailing_edge_angle: f64,

    /// Length of the outline, a stand-in for wetted area
    pub surface_area: f64,
    pub continuity_score: f64,
    pub smoothness_score: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub issues: Vec<ValidationIssue>,
    pub metrics: GeometryMetrics,
    pub score: f64,
}

impl ValidationResult {
    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Warning)
    }

    pub fn has_issue(&self, kind: IssueKind) -> bool {
        self.issues.iter().any(|i| i.kind == kind)
    }
}

/// Runs every check over the loop, computes its metrics and scores it. The checks never short
/// circuit, and the shape is valid when none of them raised an error.
pub fn validate_geometry(shape: &CoordinateLoop) -> ValidationResult {
    let points = shape.points();
    let metrics = calculate_metrics(points);

    let mut issues = check_self_intersection(points);
    issues.extend(check_continuity(points));
    issues.extend(check_physical_plausibility(points, &metrics));
    issues.extend(check_manufacturability(points));

    let valid = !issues.iter().any(|i| i.severity == Severity::Error);
    let score = quality_score(&issues, &metrics);
    debug!(
        points = points.len(),
        issues = issues.len(),
        valid,
        score,
        "validated geometry"
    );

    ValidationResult {
        valid,
        issues,
        metrics,
        score,
    }
}

/// Validates a raw point array, failing if it is not a usable loop
pub fn validate_points(points: &[Point2<f64>]) -> Result<ValidationResult> {
    let shape = CoordinateLoop::new(points.to_vec())?;
    Ok(validate_geometry(&shape))
}

pub fn check_self_intersection(points: &[Point2<f64>]) -> Vec<ValidationIssue> {
    self_intersections(points)
        .into_iter()
        .map(|c| {
            ValidationIssue::new(
                Severity::Error,
                IssueKind::SelfIntersection,
                format!(
                    "Self-intersection detected between segments {}-{} and {}-{}",
                    c.first,
                    c.first + 1,
                    c.second,
                    c.second + 1
                ),
                c.location,
            )
        })
        .collect()
}

/// Compares the two segments at every interior vertex with their own average, and checks the
/// interior angle there.
///
/// Neither segment can exceed three times the average of the pair, so the gap test only matters
/// if `GAP_RATIO` is lowered below 2.
pub fn check_continuity(points: &[Point2<f64>]) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    for (i, (p0, p1, p2)) in points.iter().tuple_windows().enumerate() {
        let index = i + 1;
        let before = dist(p0, p1);
        let after = dist(p1, p2);
        let limit = (before + after) / 2.0 * GAP_RATIO;
        if before > limit || after > limit {
            issues.push(ValidationIssue::warning(
                IssueKind::Discontinuity,
                format!("Large gap detected at point {}", index),
                Some(*p1),
            ));
        }

        let angle = angle_between(p0, p1, p2);
        if angle < SHARP_ANGLE_DEGREES {
            issues.push(ValidationIssue::warning(
                IssueKind::SharpAngle,
                format!("Sharp angle ({:.1}°) at point {}", angle, index),
                Some(*p1),
            ));
        }
    }

    issues
}

pub fn check_physical_plausibility(
    points: &[Point2<f64>],
    metrics: &GeometryMetrics,
) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let (first, last) = match (points.first(), points.last()) {
        (Some(f), Some(l)) => (f, l),
        _ => return issues,
    };

    let te_gap = dist(first, last);
    if te_gap > MAX_TRAILING_EDGE_GAP {
        issues.push(ValidationIssue::warning(
            IssueKind::OpenTrailingEdge,
            format!("Trailing edge not closed (gap: {:.2}%)", te_gap * 100.0),
            Some(*last),
        ));
    }

    if metrics.max_thickness < MIN_THICKNESS {
        issues.push(ValidationIssue::warning(
            IssueKind::TooThin,
            format!(
                "Very thin airfoil ({:.1}%) may lack structural strength",
                metrics.max_thickness * 100.0
            ),
            None,
        ));
    }

    if metrics.max_thickness > MAX_THICKNESS {
        issues.push(ValidationIssue::warning(
            IssueKind::TooThick,
            format!(
                "Very thick airfoil ({:.1}%) may have high drag",
                metrics.max_thickness * 100.0
            ),
            None,
        ));
    }

    if metrics.leading_edge_radius < MIN_LEADING_EDGE_RADIUS {
        issues.push(ValidationIssue::new(
            Severity::Error,
            IssueKind::SharpLeadingEdge,
            "Leading edge too sharp - not physically realistic".to_string(),
            None,
        ));
    }

    issues
}

pub fn check_manufacturability(points: &[Point2<f64>]) -> Vec<ValidationIssue> {
    points
        .windows(5)
        .enumerate()
        .filter(|(_, w)| estimate_curvature(w) > MAX_CURVATURE)
        .map(|(i, w)| {
            ValidationIssue::warning(
                IssueKind::HighCurvature,
                format!(
                    "High curvature at point {} may be difficult to manufacture",
                    i + 2
                ),
                Some(w[2]),
            )
        })
        .collect()
}

/// Computes the geometric metrics of a loop. The loop is split at its middle index into an upper
/// half and a reversed lower half, and thickness and camber are measured between the points at
/// matching indices.
pub fn calculate_metrics(points: &[Point2<f64>]) -> GeometryMetrics {
    let (min_x, max_x) = points
        .iter()
        .map(|p| p.x)
        .minmax()
        .into_option()
        .unwrap_or((0.0, 0.0));

    let mid = points.len() / 2;
    let mut max_thickness = 0.0;
    let mut max_thickness_location = 0.0;
    let mut max_camber: f64 = 0.0;
    let mut max_camber_location = 0.0;
    for (u, l) in points[..mid].iter().zip(points[mid..].iter().rev()) {
        let thickness = (u.y - l.y).abs();
        if thickness > max_thickness {
            max_thickness = thickness;
            max_thickness_location = u.x;
        }

        let camber = (u.y + l.y) / 2.0;
        if camber.abs() > max_camber.abs() {
            max_camber = camber;
            max_camber_location = u.x;
        }
    }

    GeometryMetrics {
        chord_length: max_x - min_x,
        max_thickness,
        max_thickness_location,
        max_camber,
        max_camber_location,
        leading_edge_radius: estimate_leading_edge_radius(points),
        trailing_edge_angle: estimate_trailing_edge_angle(points),
        surface_area: chain_length(points),
        continuity_score: continuity_score(points),
        smoothness_score: smoothness_score(points),
    }
}

/// Mean distance from the point nearest x = 0 to every point within the leading edge window,
/// itself included. Too few points in the window to say anything gives a neutral 0.01.
pub fn estimate_leading_edge_radius(points: &[Point2<f64>]) -> f64 {
    let le = match points
        .iter()
        .fold(None, |best: Option<&Point2<f64>>, p| match best {
            Some(b) if b.x.abs() <= p.x.abs() => Some(b),
            _ => Some(p),
        }) {
        Some(p) => p,
        None => return FALLBACK_LEADING_EDGE_RADIUS,
    };

    let nearby: Vec<f64> = points
        .iter()
        .filter(|p| (p.x - le.x).abs() < LEADING_EDGE_WINDOW)
        .map(|p| dist(p, le))
        .collect();

    if nearby.len() < 3 {
        return FALLBACK_LEADING_EDGE_RADIUS;
    }

    nearby.iter().sum::<f64>() / nearby.len() as f64
}

/// Angle in degrees, from 0 to 180, between the directions of the second segment in from each
/// end of the loop
pub fn estimate_trailing_edge_angle(points: &[Point2<f64>]) -> f64 {
    let n = points.len();
    if n < 4 {
        return 0.0;
    }

    let slope = |a: &Point2<f64>, b: &Point2<f64>| (b.y - a.y).atan2(b.x - a.x);
    let upper = slope(&points[1], &points[2]);
    let lower = slope(&points[n - 2], &points[n - 3]);

    // Both directions point forward along the chord, so their atan2 values straddle +/-180
    let diff = (upper - lower).abs().to_degrees() % 360.0;
    if diff > 180.0 {
        360.0 - diff
    } else {
        diff
    }
}

/// `max(0, 1 - 2 * cv)` where cv is the coefficient of variation of the segment lengths
pub fn continuity_score(points: &[Point2<f64>]) -> f64 {
    if points.len() < 3 {
        return 1.0;
    }

    let (mean, std) = mean_and_std(&segment_lengths(points));
    if mean <= f64::EPSILON {
        return 0.0;
    }

    (1.0 - 2.0 * std / mean).max(0.0)
}

/// `max(0, 1 - std / 90)` over the interior angles in degrees
pub fn smoothness_score(points: &[Point2<f64>]) -> f64 {
    if points.len() < 3 {
        return 1.0;
    }

    let angles: Vec<f64> = points
        .iter()
        .tuple_windows()
        .map(|(a, b, c)| angle_between(a, b, c))
        .collect();
    let (_, std) = mean_and_std(&angles);

    (1.0 - std / 90.0).max(0.0)
}

/// Starts from 1.0, takes off a fixed penalty per error and warning, scales by the mean of the
/// continuity and smoothness scores and clamps to [0, 1]
pub fn quality_score(issues: &[ValidationIssue], metrics: &GeometryMetrics) -> f64 {
    let penalty: f64 = issues
        .iter()
        .map(|i| match i.severity {
            Severity::Error => ERROR_PENALTY,
            Severity::Warning => WARNING_PENALTY,
            Severity::Info => 0.0,
        })
        .sum();

    let score = (1.0 - penalty) * (metrics.continuity_score + metrics.smoothness_score) / 2.0;
    if score.is_finite() {
        score.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Population mean and standard deviation, both zero for an empty slice
fn mean_and_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}
