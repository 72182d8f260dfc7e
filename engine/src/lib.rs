#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic generation engine for moodfield artifacts.
//!
//! [`Engine::generate`] runs the whole pipeline for one validated input pair:
//! seed hash, palette classification, particle and waveform construction,
//! static compositing and rarity scoring. Each call builds fresh collections
//! and shares nothing with concurrent calls, so the engine can be used from
//! any thread without locks.

mod ledger;

pub use ledger::LedgerTokenRecord;

use moodfield_core::{ActivityCount, MoodSeed, PaletteName, RarityScore, ValidationError};
use moodfield_rendering::{Artifact, CanvasSize, Compositor, Raster, RenderError, Scene};
use moodfield_system_palette::{classify_detailed, hash_seed, MoodMatch};
use moodfield_system_particles::build_particles;
use moodfield_system_rarity as rarity;
use moodfield_system_waveforms::build_waveforms;
use thiserror::Error;
use tracing::{debug, info};

/// Tunables that do not affect the determinism contract.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EngineConfig {
    /// Side length of the rendered artifact in pixels.
    pub canvas: CanvasSize,
}

/// Outcome of a successful generation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerationResult {
    artifact: Artifact,
    rarity_score: RarityScore,
    particle_count: usize,
    palette_name: PaletteName,
}

impl GenerationResult {
    /// Encoded PNG artifact.
    #[must_use]
    pub const fn artifact(&self) -> &Artifact {
        &self.artifact
    }

    /// Display rarity score.
    #[must_use]
    pub const fn rarity_score(&self) -> RarityScore {
        self.rarity_score
    }

    /// Number of particles composited into the artifact.
    #[must_use]
    pub const fn particle_count(&self) -> usize {
        self.particle_count
    }

    /// Name of the palette selected for the seed.
    #[must_use]
    pub const fn palette_name(&self) -> PaletteName {
        self.palette_name
    }
}

/// Failures that abort a generation.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Input was rejected before any work started.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The artifact could not be rendered or encoded.
    #[error("rendering failed: {0}")]
    Render(#[from] RenderError),
}

impl GenerationError {
    /// Message suitable for end users.
    ///
    /// Validation failures name the violated bound; render failures depend on
    /// the environment rather than the input, so they only suggest a retry.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(error) => format!("invalid input: {error}"),
            Self::Render(_) => "could not render the artwork; please try again".to_owned(),
        }
    }

    /// Whether retrying the same input may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Render(_))
    }
}

/// Runs generations with a fixed configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    /// Creates an engine with the provided configuration.
    #[must_use]
    pub const fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Validates raw input and generates from it.
    ///
    /// Rejects invalid input before any builder runs.
    pub fn generate_raw(
        &self,
        seed: &str,
        activity: i64,
    ) -> Result<GenerationResult, GenerationError> {
        let seed = MoodSeed::new(seed)?;
        let activity = ActivityCount::from_signed(activity)?;
        self.generate(&seed, activity)
    }

    /// Generates the artifact and rarity score for a validated input pair.
    pub fn generate(
        &self,
        seed: &MoodSeed,
        activity: ActivityCount,
    ) -> Result<GenerationResult, GenerationError> {
        let scene = build_scene(seed, activity);
        let particle_count = scene.particles.len();
        let palette_name = scene.palette.name();

        let artifact = Compositor::new(self.config.canvas).render_static(&scene)?;
        let breakdown = rarity::breakdown(activity, seed);
        debug!(
            base = breakdown.base,
            length_bonus = breakdown.length_bonus,
            diversity_bonus = breakdown.diversity_bonus,
            "scored rarity"
        );

        let result = GenerationResult {
            artifact,
            rarity_score: breakdown.total(),
            particle_count,
            palette_name,
        };
        info!(
            palette = %palette_name,
            particles = particle_count,
            rarity = result.rarity_score.get(),
            bytes = result.artifact.bytes().len(),
            digest = %result.artifact.digest_hex(),
            "generated artifact"
        );
        Ok(result)
    }

    /// Renders a preview frame at `time` seconds. Never used for artifacts.
    pub fn preview_frame(&self, scene: &Scene, time: f32) -> Result<Raster, GenerationError> {
        Ok(Compositor::new(self.config.canvas).render_frame(scene, time)?)
    }
}

/// Builds the read-only scene for an input pair.
///
/// Pure and deterministic; the seed hash stays internal to this call.
#[must_use]
pub fn build_scene(seed: &MoodSeed, activity: ActivityCount) -> Scene {
    let hash = hash_seed(seed);
    let classification = classify_detailed(seed);
    match classification.matched {
        MoodMatch::Rule { index, keyword } => {
            debug!(rule = index, keyword, "mood rule matched");
        }
        MoodMatch::Default => debug!("no mood rule matched; using default palette"),
    }

    let palette = classification.palette;
    let particles = build_particles(hash, activity, &palette);
    let waveforms = build_waveforms(hash, activity, &palette);
    debug!(
        palette = %palette.name(),
        particles = particles.len(),
        waveforms = waveforms.len(),
        "built scene"
    );
    Scene::new(particles, waveforms, palette)
}
