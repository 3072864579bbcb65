use crate::airfoil::params::{ShapeParameters, Spacing};
use crate::airfoil::{Airfoil, CamberStation, CoordinateLoop};
use crate::errors::{AeroError, Result};
use ncollide2d::na::Point2;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// An AirfoilGenerator is an entity which can generate the vertical position of the mean camber
/// line and the half thickness of the airfoil at fractions of the chord. This provides the
/// information necessary for a generator to compute the airfoil surfaces.
pub trait AirfoilGenerator {
    /// Return the height of the camber line at a fraction from 0.0 to 1.0
    fn camber(&self, x: f64) -> f64;

    /// Return the half thickness of the airfoil, measured vertically from the camber line, at a
    /// fraction from 0.0 to 1.0
    fn half_thickness(&self, x: f64) -> f64;

    /// A vertical offset applied identically to both surfaces, so that it bends the section
    /// without opening either edge
    fn perturbation(&self, _x: f64) -> f64 {
        0.0
    }

    fn station_at(&self, x: f64) -> CamberStation {
        let yc = self.camber(x);
        let yt = self.half_thickness(x);
        let d = self.perturbation(x);

        CamberStation::new(
            Point2::new(x, yc + d),
            Point2::new(x, yc + yt + d),
            Point2::new(x, yc - yt + d),
        )
    }

    /// Generates `intervals + 1` stations from the leading edge to the trailing edge
    fn generate(&self, intervals: usize, spacing: Spacing) -> Airfoil {
        let stations: Vec<CamberStation> = (0..=intervals)
            .map(|i| self.station_at(spacing.fraction(i, intervals)))
            .collect();

        Airfoil::from_stations(&stations)
    }
}

/// Coefficients of a half thickness distribution of the form 5t(a√x + bx + cx² + dx³ + ex⁴)
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ThicknessPolynomial {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
}

impl ThicknessPolynomial {
    /// The classic 4 and 5 digit distribution
    pub const NACA: ThicknessPolynomial =
        ThicknessPolynomial::new(0.2969, -0.1260, -0.3516, 0.2843, -0.1015);

    /// Sharper nose with a fuller mid-chord, for a longer run of laminar flow
    pub const LAMINAR: ThicknessPolynomial = ThicknessPolynomial::new(0.2, -0.1, -0.4, 0.3, -0.1);

    /// Large nose radius, used by the Selig and high camber UAV sections
    pub const THICK_NOSE: ThicknessPolynomial =
        ThicknessPolynomial::new(0.35, -0.08, -0.25, 0.2, -0.08);
    pub const EPPLER: ThicknessPolynomial =
        ThicknessPolynomial::new(0.25, -0.12, -0.3, 0.25, -0.12);
    pub const WORTMANN: ThicknessPolynomial =
        ThicknessPolynomial::new(0.32, -0.1, -0.28, 0.22, -0.09);
    pub const THIN_SHARP: ThicknessPolynomial =
        ThicknessPolynomial::new(0.15, -0.15, -0.4, 0.3, -0.15);

    pub const fn new(a: f64, b: f64, c: f64, d: f64, e: f64) -> ThicknessPolynomial {
        ThicknessPolynomial { a, b, c, d, e }
    }

    fn raw(&self, x: f64) -> f64 {
        self.a * x.sqrt() + self.b * x + self.c * x * x + self.d * x.powi(3) + self.e * x.powi(4)
    }

    /// Half thickness at `x` for a thickness ratio of `t`. The polynomial's residual at x = 1 is
    /// removed with a linear ramp so that the trailing edge closes to a point, and the result is
    /// floored at zero.
    pub fn half_thickness(&self, t: f64, x: f64) -> f64 {
        (5.0 * t * (self.raw(x) - x * self.raw(1.0))).max(0.0)
    }
}

/// A sum of sine harmonics over the leading entries of a latent vector. Entry `j` contributes
/// `latent[j] * sin((j + offset) * π * x + phase)`, and the sum is multiplied by `amplitude`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Harmonics {
    pub count: usize,
    pub offset: f64,
    pub phase: f64,
    pub amplitude: f64,
}

impl Harmonics {
    pub const fn new(count: usize, offset: f64, phase: f64, amplitude: f64) -> Harmonics {
        Harmonics {
            count,
            offset,
            phase,
            amplitude,
        }
    }

    pub fn evaluate(&self, latent: &[f64], x: f64) -> f64 {
        latent
            .iter()
            .take(self.count)
            .enumerate()
            .map(|(j, l)| l * ((j as f64 + self.offset) * PI * x + self.phase).sin())
            .sum::<f64>()
            * self.amplitude
    }
}

/// The latent vector and the overall strength of the noise it drives, `(1 - smoothness) *
/// temperature`
#[derive(Copy, Clone, Debug)]
pub struct Perturbation<'a> {
    latent: &'a [f64],
    scale: f64,
}

impl<'a> Perturbation<'a> {
    pub fn new(latent: &'a [f64], smoothness: f64, temperature: f64) -> Perturbation<'a> {
        Perturbation {
            latent,
            scale: (1.0 - smoothness) * temperature,
        }
    }

    pub fn none() -> Perturbation<'static> {
        Perturbation {
            latent: &[],
            scale: 0.0,
        }
    }

    fn at(&self, h: &Harmonics, x: f64) -> f64 {
        h.evaluate(self.latent, x) * self.scale
    }

    /// Latent entry `j`, with missing entries treated as zero
    fn component(&self, j: usize) -> f64 {
        self.latent.get(j).copied().unwrap_or(0.0)
    }
}

/// The classic four digit mean line: two parabolic arcs meeting at the point of max camber `p`
pub fn piecewise_camber(m: f64, p: f64, x: f64) -> f64 {
    if p < 1e-6 {
        0.0
    } else if x < p {
        (m / p.powi(2)) * (2.0 * p * x - x.powi(2))
    } else {
        (m / (1.0 - p).powi(2)) * ((1.0 - 2.0 * p) + 2.0 * p * x - x.powi(2))
    }
}

const STANDARD_HARMONICS: Harmonics = Harmonics::new(8, 1.0, 0.0, 0.02);

/// A generator for a NACA 4-digit airfoil with its max camber fixed at 40% of the chord. For
/// example, a NACA 2412 has `max_camber` 0.02 and `t_max` 0.12.
pub struct Naca4Digit<'a> {
    t: f64,
    m: f64,
    noise: Perturbation<'a>,
}

impl<'a> Naca4Digit<'a> {
    const P: f64 = 0.4;

    /// Create a new NACA 4 digit generator.
    ///
    /// # Arguments
    ///
    /// * `t_max` - the maximum thickness of the airfoil as a fraction of the chord length. For
    /// instance, on a NACA 2412 t_max should be 0.12
    ///
    /// * `max_camber` - The max camber as a fraction, for example on a NACA 2412 this value should
    /// be set to 0.02
    ///
    /// * `noise` - the latent driven perturbation of both surfaces
    pub fn new(t_max: f64, max_camber: f64, noise: Perturbation<'a>) -> Naca4Digit<'a> {
        Naca4Digit {
            t: t_max,
            m: max_camber,
            noise,
        }
    }
}

impl<'a> AirfoilGenerator for Naca4Digit<'a> {
    fn camber(&self, x: f64) -> f64 {
        piecewise_camber(self.m, Self::P, x)
    }

    fn half_thickness(&self, x: f64) -> f64 {
        ThicknessPolynomial::NACA.half_thickness(self.t, x)
    }

    fn perturbation(&self, x: f64) -> f64 {
        self.noise.at(&STANDARD_HARMONICS, x)
    }
}

/// NACA 5-digit mean line, forward loaded with its max camber near 20% of the chord
pub struct Naca5Digit<'a> {
    t: f64,
    m: f64,
    noise: Perturbation<'a>,
}

impl<'a> Naca5Digit<'a> {
    const P: f64 = 0.2;
    const K1: f64 = 15.957;
    const HARMONICS: Harmonics = Harmonics::new(8, 2.0, FRAC_PI_4, 0.025);

    pub fn new(t_max: f64, max_camber: f64, noise: Perturbation<'a>) -> Naca5Digit<'a> {
        Naca5Digit {
            t: t_max,
            m: max_camber,
            noise,
        }
    }
}

impl<'a> AirfoilGenerator for Naca5Digit<'a> {
    fn camber(&self, x: f64) -> f64 {
        let p = Self::P;
        if x < p {
            (Self::K1 / 6.0) * (x.powi(3) - 3.0 * p * x * x + p * p * (3.0 - p) * x) * self.m
        } else {
            (Self::K1 * p.powi(3) / 6.0) * (1.0 - x) * self.m
        }
    }

    fn half_thickness(&self, x: f64) -> f64 {
        ThicknessPolynomial::NACA.half_thickness(self.t, x)
    }

    fn perturbation(&self, x: f64) -> f64 {
        self.noise.at(&Self::HARMONICS, x)
    }
}

/// A 6-series style laminar section with the cubic mean line m·x²·(3 - 2x)
pub struct Naca6Series<'a> {
    t: f64,
    m: f64,
    noise: Perturbation<'a>,
}

impl<'a> Naca6Series<'a> {
    const HARMONICS: Harmonics = Harmonics::new(8, 1.0, FRAC_PI_2, 0.015);

    pub fn new(t_max: f64, max_camber: f64, noise: Perturbation<'a>) -> Naca6Series<'a> {
        Naca6Series {
            t: t_max,
            m: max_camber,
            noise,
        }
    }
}

impl<'a> AirfoilGenerator for Naca6Series<'a> {
    fn camber(&self, x: f64) -> f64 {
        self.m * x * x * (3.0 - 2.0 * x)
    }

    fn half_thickness(&self, x: f64) -> f64 {
        ThicknessPolynomial::LAMINAR.half_thickness(self.t, x)
    }

    fn perturbation(&self, x: f64) -> f64 {
        self.noise.at(&Self::HARMONICS, x)
    }
}

/// Low Reynolds number section with a thick rounded nose and max camber at 35% of the chord
pub struct Selig<'a> {
    t: f64,
    m: f64,
    noise: Perturbation<'a>,
}

impl<'a> Selig<'a> {
    const P: f64 = 0.35;
    const HARMONICS: Harmonics = Harmonics::new(8, 1.0, 0.0, 0.03);

    pub fn new(t_max: f64, max_camber: f64, noise: Perturbation<'a>) -> Selig<'a> {
        Selig {
            t: t_max,
            m: max_camber,
            noise,
        }
    }
}

impl<'a> AirfoilGenerator for Selig<'a> {
    fn camber(&self, x: f64) -> f64 {
        piecewise_camber(self.m, Self::P, x)
    }

    fn half_thickness(&self, x: f64) -> f64 {
        ThicknessPolynomial::THICK_NOSE.half_thickness(self.t, x)
    }

    fn perturbation(&self, x: f64) -> f64 {
        self.noise.at(&Self::HARMONICS, x)
    }
}

/// Glider section with a thin trailing edge and the forward loaded mean line m·√x·(1 - x)
pub struct Eppler<'a> {
    t: f64,
    m: f64,
    noise: Perturbation<'a>,
}

impl<'a> Eppler<'a> {
    const HARMONICS: Harmonics = Harmonics::new(8, 1.5, 0.0, 0.02);

    pub fn new(t_max: f64, max_camber: f64, noise: Perturbation<'a>) -> Eppler<'a> {
        Eppler {
            t: t_max,
            m: max_camber,
            noise,
        }
    }
}

impl<'a> AirfoilGenerator for Eppler<'a> {
    fn camber(&self, x: f64) -> f64 {
        self.m * x.sqrt() * (1.0 - x)
    }

    fn half_thickness(&self, x: f64) -> f64 {
        ThicknessPolynomial::EPPLER.half_thickness(self.t, x)
    }

    fn perturbation(&self, x: f64) -> f64 {
        self.noise.at(&Self::HARMONICS, x)
    }
}

/// Thick, highly cambered section in the style of the Wortmann FX series
pub struct WortmannFx<'a> {
    t: f64,
    m: f64,
    noise: Perturbation<'a>,
}

impl<'a> WortmannFx<'a> {
    const P: f64 = 0.3;
    const CAMBER_GAIN: f64 = 1.2;
    const HARMONICS: Harmonics = Harmonics::new(8, 0.5, 0.0, 0.025);

    pub fn new(t_max: f64, max_camber: f64, noise: Perturbation<'a>) -> WortmannFx<'a> {
        WortmannFx {
            t: t_max,
            m: max_camber,
            noise,
        }
    }
}

impl<'a> AirfoilGenerator for WortmannFx<'a> {
    fn camber(&self, x: f64) -> f64 {
        piecewise_camber(self.m, Self::P, x) * Self::CAMBER_GAIN
    }

    fn half_thickness(&self, x: f64) -> f64 {
        ThicknessPolynomial::WORTMANN.half_thickness(self.t, x)
    }

    fn perturbation(&self, x: f64) -> f64 {
        self.noise.at(&Self::HARMONICS, x)
    }
}

/// Thin section with sharp edges, half the requested camber on a parabolic mean line, and a
/// weaker perturbation over fewer harmonics
pub struct ThinSharp<'a> {
    t: f64,
    m: f64,
    noise: Perturbation<'a>,
}

impl<'a> ThinSharp<'a> {
    const HARMONICS: Harmonics = Harmonics::new(4, 1.0, 0.0, 0.01);

    pub fn new(t_max: f64, max_camber: f64, noise: Perturbation<'a>) -> ThinSharp<'a> {
        ThinSharp {
            t: t_max,
            m: max_camber * 0.5,
            noise,
        }
    }
}

impl<'a> AirfoilGenerator for ThinSharp<'a> {
    fn camber(&self, x: f64) -> f64 {
        self.m * x * (1.0 - x)
    }

    fn half_thickness(&self, x: f64) -> f64 {
        ThicknessPolynomial::THIN_SHARP.half_thickness(self.t, x)
    }

    fn perturbation(&self, x: f64) -> f64 {
        self.noise.at(&Self::HARMONICS, x)
    }
}

/// Tailless aircraft section whose mean line is a full period sine less half a double frequency
/// sine
pub struct ReflexCamber<'a> {
    t: f64,
    m: f64,
    noise: Perturbation<'a>,
}

impl<'a> ReflexCamber<'a> {
    pub fn new(t_max: f64, max_camber: f64, noise: Perturbation<'a>) -> ReflexCamber<'a> {
        ReflexCamber {
            t: t_max,
            m: max_camber,
            noise,
        }
    }
}

impl<'a> AirfoilGenerator for ReflexCamber<'a> {
    fn camber(&self, x: f64) -> f64 {
        self.m * ((PI * x).sin() - 0.5 * (2.0 * PI * x).sin())
    }

    fn half_thickness(&self, x: f64) -> f64 {
        ThicknessPolynomial::NACA.half_thickness(self.t, x)
    }

    fn perturbation(&self, x: f64) -> f64 {
        self.noise.at(&STANDARD_HARMONICS, x)
    }
}

/// High lift section for slow UAVs: thick nose, 1.5x camber loaded at 25% of the chord
pub struct HighCamberUav<'a> {
    t: f64,
    m: f64,
    noise: Perturbation<'a>,
}

impl<'a> HighCamberUav<'a> {
    const P: f64 = 0.25;
    const CAMBER_GAIN: f64 = 1.5;
    const HARMONICS: Harmonics = Harmonics::new(8, 1.0, 0.0, 0.03);

    pub fn new(t_max: f64, max_camber: f64, noise: Perturbation<'a>) -> HighCamberUav<'a> {
        HighCamberUav {
            t: t_max,
            m: max_camber,
            noise,
        }
    }
}

impl<'a> AirfoilGenerator for HighCamberUav<'a> {
    fn camber(&self, x: f64) -> f64 {
        piecewise_camber(self.m * Self::CAMBER_GAIN, Self::P, x)
    }

    fn half_thickness(&self, x: f64) -> f64 {
        ThicknessPolynomial::THICK_NOSE.half_thickness(self.t, x)
    }

    fn perturbation(&self, x: f64) -> f64 {
        self.noise.at(&Self::HARMONICS, x)
    }
}

/// Unconventional sections built directly from the latent vector. The thickness is the rectified
/// sum of twelve sine harmonics and each surface gets its own Bernstein style mean line, the upper
/// one weighted by latent entries 0 to 2 and the lower one by entries 3 to 5.
pub struct RandomProcedural<'a> {
    t: f64,
    m: f64,
    noise: Perturbation<'a>,
}

impl<'a> RandomProcedural<'a> {
    const HARMONICS: Harmonics = Harmonics::new(12, 1.0, 0.0, 0.5);

    pub fn new(t_max: f64, max_camber: f64, noise: Perturbation<'a>) -> RandomProcedural<'a> {
        RandomProcedural {
            t: t_max,
            m: max_camber,
            noise,
        }
    }

    fn surface_camber(&self, first: usize, x: f64) -> f64 {
        let (t1, t2) = (x, 1.0 - x);
        let w = |k: usize| self.noise.component(first + k);
        4.0 * self.m
            * (w(0) * t1 * t2.powi(3) + w(1) * t1.powi(2) * t2.powi(2) + w(2) * t1.powi(3) * t2)
    }
}

impl<'a> AirfoilGenerator for RandomProcedural<'a> {
    fn camber(&self, x: f64) -> f64 {
        (self.surface_camber(0, x) + self.surface_camber(3, x)) / 2.0
    }

    fn half_thickness(&self, x: f64) -> f64 {
        (Self::HARMONICS.evaluate(self.noise.latent, x) * self.t).abs()
    }

    fn station_at(&self, x: f64) -> CamberStation {
        let yt = self.half_thickness(x);
        CamberStation::new(
            Point2::new(x, self.camber(x)),
            Point2::new(x, self.surface_camber(0, x) + yt),
            Point2::new(x, self.surface_camber(3, x) - yt),
        )
    }
}

/// The closed set of generator families
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum AirfoilFamily {
    #[default]
    #[serde(rename = "naca4")]
    Naca4Digit,
    #[serde(rename = "naca5")]
    Naca5Digit,
    #[serde(rename = "naca6")]
    Naca6Series,
    #[serde(rename = "selig")]
    Selig,
    #[serde(rename = "eppler")]
    Eppler,
    #[serde(rename = "wortmann-fx")]
    WortmannFx,
    #[serde(rename = "thin-sharp")]
    ThinSharp,
    #[serde(rename = "reflex")]
    ReflexCamber,
    #[serde(rename = "high-camber-uav")]
    HighCamberUav,
    #[serde(rename = "random-procedural")]
    RandomProcedural,
}

impl AirfoilFamily {
    pub const ALL: [AirfoilFamily; 10] = [
        AirfoilFamily::Naca4Digit,
        AirfoilFamily::Naca5Digit,
        AirfoilFamily::Naca6Series,
        AirfoilFamily::Selig,
        AirfoilFamily::Eppler,
        AirfoilFamily::WortmannFx,
        AirfoilFamily::ThinSharp,
        AirfoilFamily::ReflexCamber,
        AirfoilFamily::HighCamberUav,
        AirfoilFamily::RandomProcedural,
    ];

    /// Smallest point count that still yields a loop of three points
    pub const MIN_POINTS: usize = 2;

    /// Picks one of the families with equal probability
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> AirfoilFamily {
        AirfoilFamily::ALL[rng.gen_range(0..AirfoilFamily::ALL.len())]
    }

    pub fn slug(&self) -> &'static str {
        match self {
            AirfoilFamily::Naca4Digit => "naca4",
            AirfoilFamily::Naca5Digit => "naca5",
            AirfoilFamily::Naca6Series => "naca6",
            AirfoilFamily::Selig => "selig",
            AirfoilFamily::Eppler => "eppler",
            AirfoilFamily::WortmannFx => "wortmann-fx",
            AirfoilFamily::ThinSharp => "thin-sharp",
            AirfoilFamily::ReflexCamber => "reflex",
            AirfoilFamily::HighCamberUav => "high-camber-uav",
            AirfoilFamily::RandomProcedural => "random-procedural",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AirfoilFamily::Naca4Digit => "NACA 4-digit",
            AirfoilFamily::Naca5Digit => "NACA 5-digit",
            AirfoilFamily::Naca6Series => "NACA 6-series",
            AirfoilFamily::Selig => "Selig",
            AirfoilFamily::Eppler => "Eppler",
            AirfoilFamily::WortmannFx => "Wortmann FX",
            AirfoilFamily::ThinSharp => "Thin sharp",
            AirfoilFamily::ReflexCamber => "Reflex camber",
            AirfoilFamily::HighCamberUav => "High camber UAV",
            AirfoilFamily::RandomProcedural => "Random procedural",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            AirfoilFamily::Naca4Digit => "General purpose section with max camber at 40% chord",
            AirfoilFamily::Naca5Digit => "Forward loaded camber at 20% chord for higher max lift",
            AirfoilFamily::Naca6Series => "Laminar flow section with a sharper nose",
            AirfoilFamily::Selig => "Low Reynolds number section with a rounded nose",
            AirfoilFamily::Eppler => "Glider section with a thin trailing edge",
            AirfoilFamily::WortmannFx => "Thick high camber sailplane section",
            AirfoilFamily::ThinSharp => "Thin section with sharp edges for high speed",
            AirfoilFamily::ReflexCamber => "S-shaped mean line for tailless pitch stability",
            AirfoilFamily::HighCamberUav => "Heavily cambered high lift section for slow flight",
            AirfoilFamily::RandomProcedural => "Latent driven shapes outside the classic families",
        }
    }

    /// Builds the closed loop for this family. `num_points / 2` chord intervals are generated on
    /// each surface, so the loop holds `2 * (num_points / 2) + 1` points, starting and ending on
    /// the trailing edge. Latent entries beyond the end of `latent` count as zero.
    pub fn generate(
        &self,
        params: &ShapeParameters,
        latent: &[f64],
        num_points: usize,
    ) -> Result<CoordinateLoop> {
        if num_points < Self::MIN_POINTS {
            return Err(AeroError::NotEnoughPoints {
                found: num_points,
                required: Self::MIN_POINTS,
            });
        }

        if let Some(index) = latent.iter().position(|v| !v.is_finite()) {
            return Err(AeroError::NonFiniteLatent { index });
        }

        let intervals = num_points / 2;
        let (t, m, s) = (params.thickness_ratio, params.camber, params.spacing);
        let noise = Perturbation::new(latent, params.smoothness, params.temperature);
        let airfoil = match self {
            AirfoilFamily::Naca4Digit => Naca4Digit::new(t, m, noise).generate(intervals, s),
            AirfoilFamily::Naca5Digit => Naca5Digit::new(t, m, noise).generate(intervals, s),
            AirfoilFamily::Naca6Series => Naca6Series::new(t, m, noise).generate(intervals, s),
            AirfoilFamily::Selig => Selig::new(t, m, noise).generate(intervals, s),
            AirfoilFamily::Eppler => Eppler::new(t, m, noise).generate(intervals, s),
            AirfoilFamily::WortmannFx => WortmannFx::new(t, m, noise).generate(intervals, s),
            AirfoilFamily::ThinSharp => ThinSharp::new(t, m, noise).generate(intervals, s),
            AirfoilFamily::ReflexCamber => ReflexCamber::new(t, m, noise).generate(intervals, s),
            AirfoilFamily::HighCamberUav => HighCamberUav::new(t, m, noise).generate(intervals, s),
            AirfoilFamily::RandomProcedural => {
                RandomProcedural::new(t, m, noise).generate(intervals, s)
            }
        };

        airfoil.to_loop()
    }
}

impl Display for AirfoilFamily {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

fn normalized(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

impl FromStr for AirfoilFamily {
    type Err = AeroError;

    /// Accepts either the slug ("naca4", "wortmann-fx") or the label ("NACA 4-digit"), ignoring
    /// case, spaces and punctuation
    fn from_str(s: &str) -> Result<Self> {
        let key = normalized(s);
        AirfoilFamily::ALL
            .iter()
            .find(|f| normalized(f.slug()) == key || normalized(f.label()) == key)
            .copied()
            .ok_or_else(|| AeroError::UnknownFamily(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::distances2::dist;
    use approx::assert_relative_eq;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;
    use test_case::test_case;

    fn latent(seed: u64, n: usize) -> Vec<f64> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        (0..n).map(|_| rng.gen_range(-1.0..1.0)).collect()
    }

    fn params(family: AirfoilFamily) -> ShapeParameters {
        ShapeParameters {
            family,
            thickness_ratio: 0.12,
            camber: 0.02,
            smoothness: 0.5,
            temperature: 1.0,
            ..ShapeParameters::default()
        }
    }

    // Half thickness of a NACA 0012, less the 0.00126 * x trailing edge closure ramp
    #[test_case(1.000000, 0.001260)]
    #[test_case(0.840000, 0.021694)]
    #[test_case(0.680000, 0.038557)]
    #[test_case(0.520000, 0.051635)]
    #[test_case(0.360000, 0.059263)]
    #[test_case(0.200000, 0.057375)]
    #[test_case(0.040000, 0.032277)]
    fn test_naca_4_thickness(x: f64, e: f64) {
        let naca = Naca4Digit::new(0.12, 0.0, Perturbation::none());
        let result = naca.half_thickness(x);
        assert_relative_eq!(e - 0.00126 * x, result, epsilon = 1e-4);
    }

    #[test_case(1.0000, 0.0013)]
    #[test_case(0.9000, 0.0208)]
    #[test_case(0.7000, 0.0518)]
    #[test_case(0.5000, 0.0724)]
    #[test_case(0.3000, 0.0788)]
    #[test_case(0.2000, 0.0726)]
    #[test_case(0.1000, 0.0563)]
    fn test_naca_4_upper_surface(x: f64, e: f64) {
        let naca = Naca4Digit::new(0.12, 0.02, Perturbation::none());
        let s = naca.station_at(x);
        assert_relative_eq!(e - 0.00126 * x, s.upper.y, epsilon = 1e-3);
    }

    #[test]
    fn test_naca_5_camber_is_continuous() {
        let naca = Naca5Digit::new(0.12, 0.02, Perturbation::none());
        let left = naca.camber(0.2 - 1e-9);
        let right = naca.camber(0.2);
        assert_relative_eq!(left, right, epsilon = 1e-9);
        assert_eq!(0.0, naca.camber(1.0));
    }

    #[test]
    fn test_thin_sharp_halves_camber() {
        let thin = ThinSharp::new(0.12, 0.04, Perturbation::none());
        assert_relative_eq!(0.005, thin.camber(0.5), epsilon = 1e-12);
    }

    #[test]
    fn test_reflex_peaks_aft_of_mid_chord() {
        let reflex = ReflexCamber::new(0.12, 0.02, Perturbation::none());
        assert!(reflex.camber(2.0 / 3.0) > reflex.camber(0.5));
        assert!(reflex.camber(2.0 / 3.0) > reflex.camber(0.8));
    }

    #[test]
    fn test_harmonics_missing_entries() {
        let h = Harmonics::new(8, 1.0, 0.0, 1.0);
        assert_relative_eq!(0.5 * (PI * 0.5).sin(), h.evaluate(&[0.5], 0.5));
        assert_eq!(0.0, h.evaluate(&[], 0.5));
    }

    #[test]
    fn test_every_family_is_deterministic() {
        let z = latent(3, 32);
        for family in AirfoilFamily::ALL {
            let a = family.generate(&params(family), &z, 60).unwrap();
            let b = family.generate(&params(family), &z, 60).unwrap();
            assert_eq!(a, b, "{}", family);
        }
    }

    #[test_case(Spacing::Linear)]
    #[test_case(Spacing::Cosine)]
    fn test_every_family_is_closed(spacing: Spacing) {
        let z = latent(11, 64);
        for family in AirfoilFamily::ALL {
            let p = ShapeParameters {
                smoothness: 0.0,
                temperature: 1.5,
                spacing,
                ..params(family)
            };
            let lp = family.generate(&p, &z, 100).unwrap();
            assert!(lp.trailing_edge_gap() < 0.02, "{}", family);
            assert_eq!(101, lp.len());
        }
    }

    #[test]
    fn test_loop_order_and_leading_edge() {
        let lp = AirfoilFamily::Naca4Digit
            .generate(&params(AirfoilFamily::Naca4Digit), &[], 10)
            .unwrap();
        let points = lp.points();

        assert_eq!(11, points.len());
        assert_eq!(1.0, points[0].x);
        assert_relative_eq!(0.0, points[0].y, epsilon = 1e-12);
        assert_eq!(0.0, points[5].x);
        assert!(points[2].y > points[8].y);
        assert_relative_eq!(points[2].x, points[8].x, epsilon = 1e-12);
    }

    #[test]
    fn test_symmetric_section_without_noise() {
        let p = ShapeParameters {
            camber: 0.0,
            ..params(AirfoilFamily::Naca4Digit)
        };
        let lp = AirfoilFamily::Naca4Digit.generate(&p, &[], 40).unwrap();
        let n = lp.len();
        for i in 0..n / 2 {
            assert_relative_eq!(lp.points()[i].y, -lp.points()[n - 1 - i].y, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_smooth_shapes_ignore_latent() {
        let p = ShapeParameters {
            smoothness: 1.0,
            ..params(AirfoilFamily::Selig)
        };
        let a = AirfoilFamily::Selig.generate(&p, &latent(1, 16), 40).unwrap();
        let b = AirfoilFamily::Selig.generate(&p, &[], 40).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_short_latent_matches_zero_padding() {
        let family = AirfoilFamily::RandomProcedural;
        let short = vec![0.4, -0.2, 0.7];
        let mut padded = short.clone();
        padded.resize(16, 0.0);
        let a = family.generate(&params(family), &short, 30).unwrap();
        let b = family.generate(&params(family), &padded, 30).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_random_procedural_closes_at_both_edges() {
        let family = AirfoilFamily::RandomProcedural;
        let lp = family.generate(&params(family), &latent(5, 12), 50).unwrap();
        let n = lp.len();
        assert_relative_eq!(0.0, dist(&lp.first(), &lp.last()), epsilon = 1e-9);
        assert_relative_eq!(0.0, lp.points()[n / 2].y, epsilon = 1e-12);
    }

    #[test]
    fn test_generate_rejects_bad_inputs() {
        let p = params(AirfoilFamily::Eppler);
        assert!(matches!(
            AirfoilFamily::Eppler.generate(&p, &[], 1),
            Err(AeroError::NotEnoughPoints { found: 1, .. })
        ));
        assert!(matches!(
            AirfoilFamily::Eppler.generate(&p, &[0.0, f64::NAN], 20),
            Err(AeroError::NonFiniteLatent { index: 1 })
        ));
        let bad = ShapeParameters {
            camber: f64::NAN,
            ..p
        };
        assert!(AirfoilFamily::Eppler.generate(&bad, &[], 20).is_err());
    }

    #[test]
    fn test_minimum_loop() {
        let p = params(AirfoilFamily::Naca4Digit);
        let lp = AirfoilFamily::Naca4Digit.generate(&p, &[], 2).unwrap();
        assert_eq!(3, lp.len());
    }

    #[test_case("naca4", AirfoilFamily::Naca4Digit)]
    #[test_case("NACA 4-digit", AirfoilFamily::Naca4Digit)]
    #[test_case("Wortmann FX", AirfoilFamily::WortmannFx)]
    #[test_case("high_camber_uav", AirfoilFamily::HighCamberUav)]
    #[test_case("reflex", AirfoilFamily::ReflexCamber)]
    fn test_family_from_str(s: &str, e: AirfoilFamily) {
        assert_eq!(e, s.parse::<AirfoilFamily>().unwrap());
    }

    #[test]
    fn test_unknown_family() {
        assert!(matches!(
            "clark-y".parse::<AirfoilFamily>(),
            Err(AeroError::UnknownFamily(_))
        ));
    }

    #[test]
    fn test_family_json_uses_slug() {
        for family in AirfoilFamily::ALL {
            let text = serde_json::to_string(&family).unwrap();
            assert_eq!(format!("\"{}\"", family.slug()), text);
        }
    }

    #[test]
    fn test_random_family_reaches_every_family() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let seen: std::collections::BTreeSet<AirfoilFamily> =
            (0..200).map(|_| AirfoilFamily::random(&mut rng)).collect();
        assert_eq!(AirfoilFamily::ALL.len(), seen.len());

        let mut a = ChaCha8Rng::seed_from_u64(5);
        let mut b = ChaCha8Rng::seed_from_u64(5);
        assert_eq!(AirfoilFamily::random(&mut a), AirfoilFamily::random(&mut b));
    }
}
