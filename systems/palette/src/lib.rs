#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure seed hashing and mood classification.
//!
//! The mood classifier walks an explicit, ordered rule table. The first rule
//! whose stem appears in the lowercased seed wins, so table order is the
//! tie-break and must never be reshuffled. Seeds that match nothing fall back
//! to [`COSMIC`].

use moodfield_core::{MoodSeed, Palette, PaletteName, Rgb, SeedHash};

const HAPPY_COLORS: [Rgb; 5] = [
    Rgb::new(255, 215, 0),
    Rgb::new(255, 165, 0),
    Rgb::new(255, 140, 0),
    Rgb::new(255, 223, 128),
    Rgb::new(255, 250, 205),
];

/// Warm yellows and oranges.
pub const HAPPY: Palette = Palette::new(PaletteName::Happy, &HAPPY_COLORS);

const CALM_COLORS: [Rgb; 5] = [
    Rgb::new(70, 130, 180),
    Rgb::new(100, 149, 237),
    Rgb::new(135, 206, 250),
    Rgb::new(176, 224, 230),
    Rgb::new(25, 25, 112),
];

/// Cool blues.
pub const CALM: Palette = Palette::new(PaletteName::Calm, &CALM_COLORS);

const ENERGETIC_COLORS: [Rgb; 5] = [
    Rgb::new(255, 0, 255),
    Rgb::new(255, 20, 147),
    Rgb::new(199, 21, 133),
    Rgb::new(255, 105, 180),
    Rgb::new(138, 43, 226),
];

/// Vibrant magentas.
pub const ENERGETIC: Palette = Palette::new(PaletteName::Energetic, &ENERGETIC_COLORS);

const PEACEFUL_COLORS: [Rgb; 5] = [
    Rgb::new(144, 238, 144),
    Rgb::new(152, 251, 152),
    Rgb::new(60, 179, 113),
    Rgb::new(46, 139, 87),
    Rgb::new(240, 255, 240),
];

/// Soft greens.
pub const PEACEFUL: Palette = Palette::new(PaletteName::Peaceful, &PEACEFUL_COLORS);

const MYSTERIOUS_COLORS: [Rgb; 5] = [
    Rgb::new(75, 0, 130),
    Rgb::new(72, 61, 139),
    Rgb::new(106, 90, 205),
    Rgb::new(123, 104, 238),
    Rgb::new(25, 25, 112),
];

/// Deep purples.
pub const MYSTERIOUS: Palette = Palette::new(PaletteName::Mysterious, &MYSTERIOUS_COLORS);

const PASSIONATE_COLORS: [Rgb; 5] = [
    Rgb::new(220, 20, 60),
    Rgb::new(255, 69, 0),
    Rgb::new(178, 34, 34),
    Rgb::new(255, 99, 71),
    Rgb::new(139, 0, 0),
];

/// Reds and oranges.
pub const PASSIONATE: Palette = Palette::new(PaletteName::Passionate, &PASSIONATE_COLORS);

const COSMIC_COLORS: [Rgb; 5] = [
    Rgb::new(138, 43, 226),
    Rgb::new(0, 191, 255),
    Rgb::new(255, 105, 180),
    Rgb::new(127, 255, 212),
    Rgb::new(255, 255, 255),
];

/// Fallback palette for seeds that match no mood rule.
pub const COSMIC: Palette = Palette::new(PaletteName::Cosmic, &COSMIC_COLORS);

/// Every palette known to the provider, default last.
pub const ALL_PALETTES: [Palette; 7] = [
    HAPPY, CALM, ENERGETIC, PEACEFUL, MYSTERIOUS, PASSIONATE, COSMIC,
];

/// Returns the palette registered under `name`.
#[must_use]
pub const fn palette(name: PaletteName) -> Palette {
    match name {
        PaletteName::Happy => HAPPY,
        PaletteName::Calm => CALM,
        PaletteName::Energetic => ENERGETIC,
        PaletteName::Peaceful => PEACEFUL,
        PaletteName::Mysterious => MYSTERIOUS,
        PaletteName::Passionate => PASSIONATE,
        PaletteName::Cosmic => COSMIC,
    }
}

/// Reduces a mood seed to a stable hash.
///
/// Folds the seed's Unicode scalar values as `h = h * 31 + code_point` with
/// wrapping 32-bit arithmetic, so the result depends on character order and
/// never on locale or platform.
#[must_use]
pub fn hash_seed(seed: &MoodSeed) -> SeedHash {
    let value = seed.as_str().chars().fold(0u32, |hash, character| {
        hash.wrapping_mul(31).wrapping_add(u32::from(character))
    });
    SeedHash::new(value)
}

/// Single entry of the mood rule table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoodRule {
    keyword: &'static str,
    stem: &'static str,
    palette: PaletteName,
}

impl MoodRule {
    /// Creates a rule. `stem` must be a prefix of `keyword`.
    #[must_use]
    pub const fn new(keyword: &'static str, stem: &'static str, palette: PaletteName) -> Self {
        Self {
            keyword,
            stem,
            palette,
        }
    }

    /// Mood keyword the rule is named after.
    #[must_use]
    pub const fn keyword(&self) -> &'static str {
        self.keyword
    }

    /// Short prefix of the keyword searched for in the seed.
    #[must_use]
    pub const fn stem(&self) -> &'static str {
        self.stem
    }

    /// Palette selected when the rule matches.
    #[must_use]
    pub const fn palette(&self) -> PaletteName {
        self.palette
    }

    fn matches(&self, lowered_seed: &str) -> bool {
        lowered_seed.contains(self.stem)
    }
}

/// Mood rules in evaluation order.
pub const MOOD_RULES: [MoodRule; 6] = [
    MoodRule::new("happy", "happ", PaletteName::Happy),
    MoodRule::new("calm", "calm", PaletteName::Calm),
    MoodRule::new("energetic", "energ", PaletteName::Energetic),
    MoodRule::new("peaceful", "peace", PaletteName::Peaceful),
    MoodRule::new("mysterious", "myster", PaletteName::Mysterious),
    MoodRule::new("passionate", "passion", PaletteName::Passionate),
];

/// Outcome of classifying a seed against the rule table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoodMatch {
    /// A rule matched.
    Rule {
        /// Position of the winning rule in [`MOOD_RULES`].
        index: usize,
        /// Keyword of the winning rule.
        keyword: &'static str,
    },
    /// No rule matched and the default palette applies.
    Default,
}

/// Palette chosen for a seed together with the rule that selected it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Classification {
    /// Rule outcome responsible for the palette.
    pub matched: MoodMatch,
    /// Selected palette.
    pub palette: Palette,
}

/// Classifies a seed into a palette, reporting which rule won.
#[must_use]
pub fn classify_detailed(seed: &MoodSeed) -> Classification {
    let lowered = seed.as_str().to_lowercase();
    for (index, rule) in MOOD_RULES.iter().enumerate() {
        if rule.matches(&lowered) {
            return Classification {
                matched: MoodMatch::Rule {
                    index,
                    keyword: rule.keyword(),
                },
                palette: palette(rule.palette()),
            };
        }
    }

    Classification {
        matched: MoodMatch::Default,
        palette: COSMIC,
    }
}

/// Classifies a seed into a palette.
#[must_use]
pub fn classify(seed: &MoodSeed) -> Palette {
    classify_detailed(seed).palette
}
