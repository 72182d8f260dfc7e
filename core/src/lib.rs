#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the moodfield generation engine.
//!
//! This crate defines the value types that flow between the pure systems and
//! the adapters. Upstream collaborators wrap raw input in [`MoodSeed`] and
//! [`ActivityCount`], which validate on construction. Systems derive a
//! [`SeedHash`] and a [`Palette`] from the seed, build ordered [`Particle`] and
//! [`WaveformLayer`] batches from them, and hand those read-only collections to
//! the compositor. Every value here is immutable once built and carries no
//! references to shared state, so concurrent generations never interfere.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum number of Unicode scalar values accepted in a mood seed.
pub const MAX_SEED_CHARS: usize = 100;

/// Characters rejected in mood seeds in addition to control characters.
pub const FORBIDDEN_SEED_CHARS: [char; 4] = ['<', '>', '"', '\''];

/// Activity count below which the particle field stops thinning out.
pub const PARTICLE_ACTIVITY_FLOOR: u64 = 8;

/// Constant added to the floored activity count when sizing the particle field.
pub const PARTICLE_OFFSET: u64 = 7;

/// Smallest particle field the builder will ever emit.
pub const MIN_PARTICLES: usize = 15;

/// Hard cap on the particle field, independent of the activity count.
pub const MAX_PARTICLES: usize = 50;

/// Smallest number of waveform layers in a scene.
pub const MIN_WAVEFORMS: usize = 3;

/// Hard cap on the number of waveform layers in a scene.
pub const MAX_WAVEFORMS: usize = 8;

/// Activity needed to earn each waveform layer above [`MIN_WAVEFORMS`].
pub const WAVEFORM_ACTIVITY_DIVISOR: u64 = 100;

/// Side length of the canvas that particle and waveform geometry is expressed in.
///
/// Compositors scale geometry by `canvas_size / REFERENCE_CANVAS_SIZE`.
pub const REFERENCE_CANVAS_SIZE: f32 = 400.0;

/// Reasons raw input is rejected before any generation work starts.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The mood seed was empty or contained only whitespace.
    #[error("mood seed must not be empty")]
    EmptySeed,
    /// The mood seed exceeded the maximum number of characters.
    #[error("mood seed is {length} characters long; the maximum is {max}")]
    SeedTooLong {
        /// Number of characters in the rejected seed.
        length: usize,
        /// Maximum number of characters accepted.
        max: usize,
    },
    /// The mood seed contained a character from the forbidden set.
    #[error("mood seed contains forbidden character {character:?} at position {position}")]
    ForbiddenCharacter {
        /// Offending character.
        character: char,
        /// Zero-based character index of the offending character.
        position: usize,
    },
    /// The mood seed contained a control character.
    #[error("mood seed contains a control character (U+{code_point:04X}) at position {position}")]
    ControlCharacter {
        /// Code point of the offending character.
        code_point: u32,
        /// Zero-based character index of the offending character.
        position: usize,
    },
    /// The activity count was negative.
    #[error("activity count must be non-negative (received {value})")]
    NegativeActivity {
        /// Value supplied by the caller.
        value: i64,
    },
}

/// Validated free-text mood phrase steering palette selection and rarity bonuses.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct MoodSeed(String);

impl MoodSeed {
    /// Validates the provided text and wraps it as a mood seed.
    ///
    /// The text must hold between 1 and [`MAX_SEED_CHARS`] characters, must
    /// not be blank, and must not contain control characters or any of
    /// [`FORBIDDEN_SEED_CHARS`].
    pub fn new(text: impl Into<String>) -> Result<Self, ValidationError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(ValidationError::EmptySeed);
        }

        let mut length = 0;
        for (position, character) in text.chars().enumerate() {
            if FORBIDDEN_SEED_CHARS.contains(&character) {
                return Err(ValidationError::ForbiddenCharacter {
                    character,
                    position,
                });
            }
            if character.is_control() {
                return Err(ValidationError::ControlCharacter {
                    code_point: u32::from(character),
                    position,
                });
            }
            length += 1;
        }

        if length > MAX_SEED_CHARS {
            return Err(ValidationError::SeedTooLong {
                length,
                max: MAX_SEED_CHARS,
            });
        }

        Ok(Self(text))
    }

    /// Text of the seed exactly as supplied.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of Unicode scalar values in the seed.
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }

    /// Number of UTF-8 bytes in the seed.
    #[must_use]
    pub fn byte_len(&self) -> usize {
        self.0.len()
    }
}

impl std::fmt::Display for MoodSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Observed on-ledger activity for the owning identity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActivityCount(u64);

impl ActivityCount {
    /// Wraps an unsigned activity count.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Validates a signed count supplied by an upstream collaborator.
    pub fn from_signed(value: i64) -> Result<Self, ValidationError> {
        u64::try_from(value)
            .map(Self)
            .map_err(|_| ValidationError::NegativeActivity { value })
    }

    /// Retrieves the numeric activity count.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

/// Deterministic hash of a mood seed used to offset the builders.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeedHash(u32);

impl SeedHash {
    /// Wraps a raw hash value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the raw hash value.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Opaque colour expressed as byte RGB channels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    red: u8,
    green: u8,
    blue: u8,
}

impl Rgb {
    /// Pure white.
    pub const WHITE: Self = Self::new(255, 255, 255);

    /// Creates a new colour from byte RGB components.
    #[must_use]
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Red component of the colour.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the colour.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the colour.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }

    /// Components as an array in red, green, blue order.
    #[must_use]
    pub const fn channels(&self) -> [u8; 3] {
        [self.red, self.green, self.blue]
    }
}

/// Names of the palettes known to the palette provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaletteName {
    /// Warm yellows and oranges.
    Happy,
    /// Cool blues.
    Calm,
    /// Vibrant magentas.
    Energetic,
    /// Soft greens.
    Peaceful,
    /// Deep purples.
    Mysterious,
    /// Reds and oranges.
    Passionate,
    /// Fallback used when no mood keyword matches.
    Cosmic,
}

impl PaletteName {
    /// Stable lowercase identifier of the palette.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Happy => "happy",
            Self::Calm => "calm",
            Self::Energetic => "energetic",
            Self::Peaceful => "peaceful",
            Self::Mysterious => "mysterious",
            Self::Passionate => "passionate",
            Self::Cosmic => "cosmic",
        }
    }
}

impl std::fmt::Display for PaletteName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered, non-empty list of colours associated with a palette name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Palette {
    name: PaletteName,
    colors: &'static [Rgb],
}

impl Palette {
    /// Creates a palette over a static, non-empty colour table.
    ///
    /// Panics at compile time when used in a `const` with an empty table.
    #[must_use]
    pub const fn new<const N: usize>(name: PaletteName, colors: &'static [Rgb; N]) -> Self {
        assert!(N > 0, "palettes must contain at least one colour");
        Self { name, colors }
    }

    /// Name of the palette.
    #[must_use]
    pub const fn name(&self) -> PaletteName {
        self.name
    }

    /// Colours of the palette in table order.
    #[must_use]
    pub const fn colors(&self) -> &'static [Rgb] {
        self.colors
    }

    /// Number of colours in the palette. Never zero.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.colors.len()
    }

    /// Always `false`; palettes are constructed non-empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// First colour of the palette, used for the background tint and the core glyph.
    #[must_use]
    pub const fn primary(&self) -> Rgb {
        self.colors[0]
    }

    /// Colour at `index`, wrapping around the palette length.
    #[must_use]
    pub const fn cycled(&self, index: usize) -> Rgb {
        self.colors[index % self.colors.len()]
    }
}

/// Trajectory selector applied to a particle at render time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MotionClass {
    /// Circles the canvas centre at a breathing radius.
    Orbiting,
    /// Drifts outward and inward while rotating slowly.
    Spiral,
    /// Sways back and forth around its base angle.
    Wave,
}

impl MotionClass {
    /// Maps a particle index onto its motion class.
    #[must_use]
    pub const fn from_index(index: usize) -> Self {
        match index % 3 {
            0 => Self::Orbiting,
            1 => Self::Spiral,
            _ => Self::Wave,
        }
    }
}

/// Immutable descriptor of a single particle in the field.
///
/// Geometry is expressed in reference units of a
/// [`REFERENCE_CANVAS_SIZE`]-sided canvas centred on the origin.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    angle_base: f32,
    base_radius: f32,
    radius_variation: f32,
    size: f32,
    color: Rgb,
    phase_offset: f32,
    motion: MotionClass,
}

impl Particle {
    /// Creates a new particle descriptor.
    #[must_use]
    #[allow(clippy::too_many_arguments)] // Every descriptor channel is spelled out explicitly.
    pub const fn new(
        angle_base: f32,
        base_radius: f32,
        radius_variation: f32,
        size: f32,
        color: Rgb,
        phase_offset: f32,
        motion: MotionClass,
    ) -> Self {
        Self {
            angle_base,
            base_radius,
            radius_variation,
            size,
            color,
            phase_offset,
            motion,
        }
    }

    /// Angle around the canvas centre in radians at time zero, before motion.
    #[must_use]
    pub const fn angle_base(&self) -> f32 {
        self.angle_base
    }

    /// Distance from the canvas centre around which the particle oscillates.
    #[must_use]
    pub const fn base_radius(&self) -> f32 {
        self.base_radius
    }

    /// Amplitude of the radial oscillation.
    #[must_use]
    pub const fn radius_variation(&self) -> f32 {
        self.radius_variation
    }

    /// Radius of the solid particle disk.
    #[must_use]
    pub const fn size(&self) -> f32 {
        self.size
    }

    /// Fill colour of the particle.
    #[must_use]
    pub const fn color(&self) -> Rgb {
        self.color
    }

    /// Phase offset in radians applied to the particle's oscillations.
    #[must_use]
    pub const fn phase_offset(&self) -> f32 {
        self.phase_offset
    }

    /// Trajectory selector used at render time.
    #[must_use]
    pub const fn motion(&self) -> MotionClass {
        self.motion
    }
}

/// Immutable descriptor of a background closed-curve layer.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaveformLayer {
    amplitude: f32,
    phase: f32,
    color: Rgb,
    alpha: f32,
    base_radius: f32,
    lobes: u32,
}

impl WaveformLayer {
    /// Creates a new waveform layer descriptor.
    #[must_use]
    pub const fn new(
        amplitude: f32,
        phase: f32,
        color: Rgb,
        alpha: f32,
        base_radius: f32,
        lobes: u32,
    ) -> Self {
        Self {
            amplitude,
            phase,
            color,
            alpha,
            base_radius,
            lobes,
        }
    }

    /// Radial displacement of the curve around its base radius.
    #[must_use]
    pub const fn amplitude(&self) -> f32 {
        self.amplitude
    }

    /// Phase of the curve in radians.
    #[must_use]
    pub const fn phase(&self) -> f32 {
        self.phase
    }

    /// Stroke colour.
    #[must_use]
    pub const fn color(&self) -> Rgb {
        self.color
    }

    /// Stroke opacity in the range 0.0..=1.0.
    #[must_use]
    pub const fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Mean distance of the curve from the canvas centre.
    #[must_use]
    pub const fn base_radius(&self) -> f32 {
        self.base_radius
    }

    /// Number of undulations around one revolution.
    #[must_use]
    pub const fn lobes(&self) -> u32 {
        self.lobes
    }
}

/// Bounded integer in `0..=100` summarising the scarcity of a generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RarityScore(u8);

impl RarityScore {
    /// Highest representable score.
    pub const MAX: u8 = 100;

    /// Creates a score, clamping the raw total to [`RarityScore::MAX`].
    #[must_use]
    pub const fn clamped(total: u32) -> Self {
        if total > Self::MAX as u32 {
            Self(Self::MAX)
        } else {
            Self(total as u8)
        }
    }

    /// Retrieves the numeric score.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::{
        ActivityCount, MotionClass, MoodSeed, Palette, PaletteName, Particle, RarityScore, Rgb,
        ValidationError, MAX_SEED_CHARS,
    };
    use serde::{de::DeserializeOwned, Serialize};

    const TWO: [Rgb; 2] = [Rgb::new(1, 2, 3), Rgb::new(4, 5, 6)];

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn seed_accepts_ordinary_text() {
        let seed = MoodSeed::new("calm morning").expect("valid seed");
        assert_eq!(seed.as_str(), "calm morning");
        assert_eq!(seed.char_len(), 12);
    }

    #[test]
    fn seed_rejects_empty_and_blank_text() {
        assert_eq!(MoodSeed::new(""), Err(ValidationError::EmptySeed));
        assert_eq!(MoodSeed::new("   "), Err(ValidationError::EmptySeed));
    }

    #[test]
    fn seed_length_is_measured_in_characters() {
        let at_limit = "é".repeat(MAX_SEED_CHARS);
        assert!(MoodSeed::new(at_limit).is_ok());

        let too_long = "a".repeat(MAX_SEED_CHARS + 1);
        assert_eq!(
            MoodSeed::new(too_long),
            Err(ValidationError::SeedTooLong {
                length: 101,
                max: MAX_SEED_CHARS,
            })
        );
    }

    #[test]
    fn seed_reports_forbidden_character_position() {
        assert_eq!(
            MoodSeed::new("so <bold>"),
            Err(ValidationError::ForbiddenCharacter {
                character: '<',
                position: 3,
            })
        );
        assert!(matches!(
            MoodSeed::new("it's"),
            Err(ValidationError::ForbiddenCharacter { character: '\'', .. })
        ));
    }

    #[test]
    fn seed_rejects_control_characters() {
        assert_eq!(
            MoodSeed::new("line\nbreak"),
            Err(ValidationError::ControlCharacter {
                code_point: 0x0A,
                position: 4,
            })
        );
    }

    #[test]
    fn validation_messages_name_the_violated_bound() {
        let message = ValidationError::SeedTooLong {
            length: 120,
            max: 100,
        }
        .to_string();
        assert!(message.contains("120"));
        assert!(message.contains("100"));
    }

    #[test]
    fn negative_activity_is_rejected() {
        assert_eq!(ActivityCount::from_signed(12), Ok(ActivityCount::new(12)));
        assert_eq!(
            ActivityCount::from_signed(-1),
            Err(ValidationError::NegativeActivity { value: -1 })
        );
    }

    #[test]
    fn palette_cycles_through_colours() {
        let palette = Palette::new(PaletteName::Calm, &TWO);
        assert_eq!(palette.primary(), Rgb::new(1, 2, 3));
        assert_eq!(palette.cycled(3), Rgb::new(4, 5, 6));
        assert_eq!(palette.len(), 2);
        assert!(!palette.is_empty());
    }

    #[test]
    fn motion_class_repeats_every_three_indices() {
        assert_eq!(MotionClass::from_index(0), MotionClass::Orbiting);
        assert_eq!(MotionClass::from_index(4), MotionClass::Spiral);
        assert_eq!(MotionClass::from_index(8), MotionClass::Wave);
    }

    #[test]
    fn rarity_score_clamps_to_one_hundred() {
        assert_eq!(RarityScore::clamped(45).get(), 45);
        assert_eq!(RarityScore::clamped(115).get(), 100);
    }

    #[test]
    fn particle_round_trips_through_bincode() {
        let particle = Particle::new(
            0.5,
            60.0,
            8.0,
            2.0,
            Rgb::new(10, 20, 30),
            1.25,
            MotionClass::Spiral,
        );
        assert_round_trip(&particle);
    }
}
