//! Latent vector sampling with a soft guarantee of novelty.
//!
//! The tracker keeps a bounded history of accepted latent vectors. New vectors are compared
//! against the recent entries of the same family by cosine similarity and redrawn at a higher
//! temperature while they are too close to one of them.

use crate::airfoil::generate::AirfoilFamily;
use crate::airfoil::params::ShapeParameters;
use crate::errors::Result;
use crate::geometry::resample::resample;
use itertools::Itertools;
use ncollide2d::na::Point2;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::f64::consts::PI;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::warn;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiversityConfig {
    /// Oldest records are evicted beyond this many
    pub max_history: usize,
    pub similarity_threshold: f64,
    pub max_attempts: usize,

    /// Number of most recent same family records a candidate is compared against
    pub comparison_window: usize,

    /// Temperature multiplier applied after each rejected candidate
    pub temperature_growth: f64,
}

impl Default for DiversityConfig {
    fn default() -> Self {
        DiversityConfig {
            max_history: 50,
            similarity_threshold: 0.85,
            max_attempts: 5,
            comparison_window: 10,
            temperature_growth: 1.2,
        }
    }
}

/// An accepted latent vector with the request that produced it
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LatentRecord {
    pub id: u64,
    pub vector: Vec<f64>,

    /// Milliseconds since the unix epoch
    pub timestamp: u64,
    pub family: AirfoilFamily,
    pub parameters: ShapeParameters,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiverseLatent {
    pub vector: Vec<f64>,

    /// Highest cosine similarity to the compared history, 0 when there was nothing to compare
    pub similarity: f64,
    pub is_diverse: bool,
    pub attempts: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiversityStatistics {
    pub total: usize,
    pub by_family: BTreeMap<AirfoilFamily, usize>,

    /// Mean cosine similarity between consecutive records of the same family
    pub average_similarity: f64,
}

#[derive(Clone, Debug, Default)]
pub struct DiversityTracker {
    config: DiversityConfig,
    history: VecDeque<LatentRecord>,
    next_id: u64,
}

impl DiversityTracker {
    pub fn new(config: DiversityConfig) -> DiversityTracker {
        DiversityTracker {
            config,
            history: VecDeque::new(),
            next_id: 0,
        }
    }

    /// Starts from existing records, oldest first. Only the newest `max_history` are kept.
    pub fn with_history(config: DiversityConfig, records: Vec<LatentRecord>) -> DiversityTracker {
        let next_id = records.iter().map(|r| r.id + 1).max().unwrap_or(0);
        let mut tracker = DiversityTracker {
            config,
            history: records.into(),
            next_id,
        };
        tracker.evict();
        tracker
    }

    pub fn config(&self) -> &DiversityConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }

    pub fn history(&self) -> impl Iterator<Item = &LatentRecord> {
        self.history.iter()
    }

    /// The newest `count` records, oldest first
    pub fn recent(&self, count: usize) -> Vec<&LatentRecord> {
        let skip = self.history.len().saturating_sub(count);
        self.history.iter().skip(skip).collect()
    }

    pub fn set_similarity_threshold(&mut self, threshold: f64) {
        self.config.similarity_threshold = threshold.clamp(0.0, 1.0);
    }

    /// Draws latent vectors until one is less similar than the threshold to the recent history
    /// of `family`, multiplying the temperature after each miss. When the attempts run out the
    /// least similar candidate is kept anyway and flagged as not diverse. Either way the
    /// returned vector is added to the history.
    pub fn generate_diverse_latent<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        dimension: usize,
        temperature: f64,
        family: AirfoilFamily,
        parameters: &ShapeParameters,
    ) -> DiverseLatent {
        let max_attempts = self.config.max_attempts.max(1);
        let mut temperature = temperature;
        let mut best: Option<(Vec<f64>, f64)> = None;

        for attempt in 1..=max_attempts {
            let candidate = sample_latent(rng, dimension, temperature);
            let similarity = self.max_similarity(&candidate, family);

            if similarity < self.config.similarity_threshold {
                self.push(candidate.clone(), family, parameters);
                return DiverseLatent {
                    vector: candidate,
                    similarity,
                    is_diverse: true,
                    attempts: attempt,
                };
            }

            if best.as_ref().map_or(true, |(_, s)| similarity < *s) {
                best = Some((candidate, similarity));
            }
            temperature *= self.config.temperature_growth;
        }

        let (vector, similarity) = best.unwrap_or_else(|| (vec![0.0; dimension], 0.0));
        warn!(
            attempts = max_attempts,
            similarity, "no sufficiently diverse latent vector found, using the best candidate"
        );
        self.push(vector.clone(), family, parameters);
        DiverseLatent {
            vector,
            similarity,
            is_diverse: false,
            attempts: max_attempts,
        }
    }

    /// Highest cosine similarity between `vector` and the recent records of `family`, never
    /// below zero
    pub fn max_similarity(&self, vector: &[f64], family: AirfoilFamily) -> f64 {
        let same_family: Vec<&LatentRecord> =
            self.history.iter().filter(|r| r.family == family).collect();
        let skip = same_family.len().saturating_sub(self.config.comparison_window);

        same_family
            .iter()
            .skip(skip)
            .map(|r| cosine_similarity(vector, &r.vector))
            .fold(0.0, f64::max)
    }

    pub fn statistics(&self) -> DiversityStatistics {
        let mut by_family = BTreeMap::new();
        for r in self.history.iter() {
            *by_family.entry(r.family).or_insert(0) += 1;
        }

        let similarities: Vec<f64> = self
            .history
            .iter()
            .zip(self.history.iter().skip(1))
            .filter(|(a, b)| a.family == b.family)
            .map(|(a, b)| cosine_similarity(&a.vector, &b.vector))
            .collect();

        let average_similarity = if similarities.is_empty() {
            0.0
        } else {
            similarities.iter().sum::<f64>() / similarities.len() as f64
        };

        DiversityStatistics {
            total: self.history.len(),
            by_family,
            average_similarity,
        }
    }

    fn push(&mut self, vector: Vec<f64>, family: AirfoilFamily, parameters: &ShapeParameters) {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        self.history.push_back(LatentRecord {
            id: self.next_id,
            vector,
            timestamp,
            family,
            parameters: parameters.clone(),
        });
        self.next_id += 1;
        self.evict();
    }

    fn evict(&mut self) {
        while self.history.len() > self.config.max_history {
            self.history.pop_front();
        }
    }
}

/// A vector of `dimension` standard normal draws, each from two uniforms with the Box-Muller
/// transform, scaled by `temperature`
pub fn sample_latent<R: Rng + ?Sized>(rng: &mut R, dimension: usize, temperature: f64) -> Vec<f64> {
    (0..dimension)
        .map(|_| {
            // 1 - u keeps the logarithm argument in (0, 1]
            let u1 = 1.0 - rng.gen::<f64>();
            let u2 = rng.gen::<f64>();
            (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos() * temperature
        })
        .collect()
}

/// Population statistics of one latent vector
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatentSummary {
    pub dimension: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl LatentSummary {
    /// None for an empty vector
    pub fn of(vector: &[f64]) -> Option<LatentSummary> {
        let (min, max) = vector.iter().copied().minmax().into_option()?;
        let n = vector.len() as f64;
        let mean = vector.iter().sum::<f64>() / n;
        let variance = vector.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

        Some(LatentSummary {
            dimension: vector.len(),
            mean,
            std_dev: variance.sqrt(),
            min,
            max,
        })
    }
}

/// Dot product over the product of norms. Vectors of different lengths, or with a zero norm,
/// have a similarity of 0.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() {
        return 0.0;
    }

    let (dot, na, nb) = a
        .iter()
        .zip(b.iter())
        .fold((0.0, 0.0, 0.0), |(d, x, y), (u, v)| {
            (d + u * v, x + u * u, y + v * v)
        });

    if na == 0.0 || nb == 0.0 {
        return 0.0;
    }
    dot / (na.sqrt() * nb.sqrt())
}

/// Similarity of two coordinate sequences from 0 (unrelated) to 1 (identical): one minus the
/// root of the summed squared point differences over the summed squared norms of `a`. Sequences
/// of different lengths are both resampled to the shorter length first.
pub fn shape_similarity(a: &[Point2<f64>], b: &[Point2<f64>]) -> Result<f64> {
    let target = a.len().min(b.len());
    let a = resample(a, target)?;
    let b = resample(b, target)?;

    let (diff, norm) = a
        .iter()
        .zip(b.iter())
        .fold((0.0, 0.0), |(d, n), (p, q)| {
            (d + (p - q).norm_squared(), n + p.coords.norm_squared())
        });

    if norm == 0.0 {
        return Ok(0.0);
    }
    Ok((1.0 - (diff / norm).sqrt()).max(0.0))
}
