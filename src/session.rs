use crate::airfoil::blend::{blend, BlendConfig, BlendedAirfoil};
use crate::airfoil::catalog::ReferenceAirfoil;
use crate::airfoil::generate::AirfoilFamily;
use crate::airfoil::params::ShapeParameters;
use crate::airfoil::validate::{validate_geometry, ValidationResult};
use crate::airfoil::CoordinateLoop;
use crate::diversity::{DiversityConfig, DiversityTracker, LatentSummary};
use crate::errors::Result;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::{info, warn};

/// Generation is repeated this many times at most while the geometry comes out invalid. The
/// last attempt is returned even if it is still invalid.
pub const MAX_GENERATION_ATTEMPTS: usize = 3;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedShape {
    pub name: String,
    pub family: AirfoilFamily,

    /// The parameters after clamping, as actually used
    pub parameters: ShapeParameters,
    pub latent: Vec<f64>,
    pub coordinates: CoordinateLoop,
    pub validation: ValidationResult,
    pub similarity: f64,
    pub is_diverse: bool,
    pub attempts: usize,
    pub warnings: Vec<String>,
    pub latent_summary: Option<LatentSummary>,

    /// Id and millisecond timestamp of the latent record kept by the session's tracker
    pub record_id: u64,
    pub timestamp: u64,
}

impl GeneratedShape {
    /// Header lines for a coordinate listing of this shape
    pub fn dat_headers(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            format!("{} - {}", self.family.label(), self.family.description()),
            format!("Generated: {} ms since epoch", self.timestamp),
            format!("ID: {}_{}", self.family.slug(), self.record_id),
            format!("Character: {}", self.parameters.character()),
        ]
    }
}

/// Owns the random source and the latent history for a sequence of generations
pub struct DesignSession<R: Rng> {
    rng: R,
    tracker: DiversityTracker,
}

impl DesignSession<ChaCha8Rng> {
    /// A reproducible session with the default diversity settings
    pub fn seeded(seed: u64) -> DesignSession<ChaCha8Rng> {
        DesignSession::new(
            ChaCha8Rng::seed_from_u64(seed),
            DiversityTracker::new(DiversityConfig::default()),
        )
    }
}

impl<R: Rng> DesignSession<R> {
    pub fn new(rng: R, tracker: DiversityTracker) -> DesignSession<R> {
        DesignSession { rng, tracker }
    }

    pub fn tracker(&self) -> &DiversityTracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut DiversityTracker {
        &mut self.tracker
    }

    /// Clamps the parameters, draws a diverse latent vector, generates the family's loop and
    /// validates it, retrying with a fresh latent vector while the result has errors.
    pub fn generate(&mut self, params: &ShapeParameters) -> Result<GeneratedShape> {
        let clamped = params.clamped();
        self.generate_checked(clamped.parameters, clamped.warnings)
    }

    /// Picks a family and draws its parameters at random, then generates them unclamped. Every
    /// value drawn outside its valid range is listed in the warnings.
    pub fn generate_random(&mut self) -> Result<GeneratedShape> {
        let family = AirfoilFamily::random(&mut self.rng);
        let params = ShapeParameters::random(family, &mut self.rng);
        let warnings = params.range_notes();
        info!(
            family = family.slug(),
            points = params.complexity,
            character = %params.character(),
            "drew random parameters"
        );
        self.generate_checked(params, warnings)
    }

    fn generate_checked(
        &mut self,
        p: ShapeParameters,
        mut warnings: Vec<String>,
    ) -> Result<GeneratedShape> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let latent = self.tracker.generate_diverse_latent(
                &mut self.rng,
                p.latent_dimension,
                p.temperature,
                p.family,
                &p,
            );
            if !latent.is_diverse && attempt == 1 {
                warnings.push(format!(
                    "Shape may be similar to recent generations (similarity: {:.1}%)",
                    latent.similarity * 100.0
                ));
            }

            let coordinates = p.family.generate(&p, &latent.vector, p.complexity)?;
            let validation = validate_geometry(&coordinates);

            if !validation.valid && attempt < MAX_GENERATION_ATTEMPTS {
                warn!(
                    attempt,
                    family = p.family.slug(),
                    errors = validation.errors().count(),
                    "generated geometry is invalid, retrying"
                );
                continue;
            }

            warnings.extend(validation.warnings().map(|i| i.message.clone()));

            info!(
                family = p.family.slug(),
                attempts = attempt,
                score = validation.score,
                valid = validation.valid,
                "generated shape"
            );

            let (record_id, timestamp) = self
                .tracker
                .recent(1)
                .first()
                .map_or((0, 0), |r| (r.id, r.timestamp));

            return Ok(GeneratedShape {
                name: p.identifier(p.family.label()),
                family: p.family,
                parameters: p,
                latent_summary: LatentSummary::of(&latent.vector),
                latent: latent.vector,
                coordinates,
                validation,
                similarity: latent.similarity,
                is_diverse: latent.is_diverse,
                attempts: attempt,
                warnings,
                record_id,
                timestamp,
            });
        }
    }

    /// Runs the blend engine with this session's random source
    pub fn blend(
        &mut self,
        references: &[ReferenceAirfoil],
        config: &BlendConfig,
    ) -> Result<BlendedAirfoil> {
        blend(&mut self.rng, references, config)
    }
}
