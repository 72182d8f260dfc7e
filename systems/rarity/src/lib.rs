#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Rarity scoring for generations.
//!
//! Two formulas live here. [`score`] is the display-facing scorer shown next
//! to the artifact. [`ledger_score`] mirrors the coarser formula recomputed by
//! the ledger at mint time. The two are independent and do not always agree;
//! callers must not substitute one for the other.

use moodfield_core::{ActivityCount, MoodSeed, RarityScore};

/// Activity thresholds (strictly greater than) and the base score each unlocks,
/// highest tier first.
const BASE_TIERS: [(u64, u32); 5] = [(5_000, 90), (1_000, 80), (500, 70), (100, 60), (50, 50)];
const BASE_FLOOR: u32 = 40;

/// Inclusive upper character counts of the short and medium length buckets.
const SHORT_SEED_CHARS: usize = 10;
const MEDIUM_SEED_CHARS: usize = 25;
const LENGTH_BONUS: [u32; 3] = [5, 10, 15];

/// Assumed share of distinct characters, in tenths, when estimating diversity.
const DISTINCT_TENTHS: usize = 7;
/// Exclusive upper estimates of the low and medium diversity buckets.
const LOW_DIVERSITY: usize = 5;
const MEDIUM_DIVERSITY: usize = 10;
const DIVERSITY_BONUS: [u32; 3] = [0, 5, 10];

const LEDGER_TIERS: [(u64, u32); 2] = [(1_000, 80), (100, 60)];
const LEDGER_FLOOR: u32 = 40;
/// The ledger measures seeds in UTF-8 bytes, not characters.
const LEDGER_LONG_SEED_BYTES: usize = 20;
const LEDGER_LONG_BONUS: u32 = 10;
const LEDGER_SHORT_BONUS: u32 = 5;

/// Itemised display rarity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RarityBreakdown {
    /// Score earned from the activity tier.
    pub base: u32,
    /// Bonus earned from the seed length bucket.
    pub length_bonus: u32,
    /// Bonus earned from the estimated character diversity.
    pub diversity_bonus: u32,
}

impl RarityBreakdown {
    /// Sum of all components, clamped to the score range.
    #[must_use]
    pub const fn total(&self) -> RarityScore {
        RarityScore::clamped(self.base + self.length_bonus + self.diversity_bonus)
    }
}

/// Computes the display rarity score.
#[must_use]
pub fn score(activity: ActivityCount, seed: &MoodSeed) -> RarityScore {
    breakdown(activity, seed).total()
}

/// Computes the display rarity score component by component.
#[must_use]
pub fn breakdown(activity: ActivityCount, seed: &MoodSeed) -> RarityBreakdown {
    RarityBreakdown {
        base: base_score(activity),
        length_bonus: length_bonus(seed.char_len()),
        diversity_bonus: diversity_bonus(seed.byte_len()),
    }
}

/// Base score unlocked by the activity tier.
#[must_use]
pub fn base_score(activity: ActivityCount) -> u32 {
    tiered(activity, &BASE_TIERS, BASE_FLOOR)
}

fn length_bonus(chars: usize) -> u32 {
    if chars <= SHORT_SEED_CHARS {
        LENGTH_BONUS[0]
    } else if chars <= MEDIUM_SEED_CHARS {
        LENGTH_BONUS[1]
    } else {
        LENGTH_BONUS[2]
    }
}

/// Buckets a byte-length estimate of distinct characters.
///
/// This is a heuristic over the raw seed length, not a count of distinct
/// characters; scores for existing seeds depend on it staying that way.
fn diversity_bonus(bytes: usize) -> u32 {
    let estimate = bytes * DISTINCT_TENTHS / 10;
    if estimate < LOW_DIVERSITY {
        DIVERSITY_BONUS[0]
    } else if estimate < MEDIUM_DIVERSITY {
        DIVERSITY_BONUS[1]
    } else {
        DIVERSITY_BONUS[2]
    }
}

/// Computes the rarity the ledger assigns at mint time.
#[must_use]
pub fn ledger_score(activity: ActivityCount, seed: &MoodSeed) -> RarityScore {
    let base = tiered(activity, &LEDGER_TIERS, LEDGER_FLOOR);
    let bonus = if seed.byte_len() > LEDGER_LONG_SEED_BYTES {
        LEDGER_LONG_BONUS
    } else {
        LEDGER_SHORT_BONUS
    };
    RarityScore::clamped(base + bonus)
}

fn tiered(activity: ActivityCount, tiers: &[(u64, u32)], floor: u32) -> u32 {
    tiers
        .iter()
        .find(|(threshold, _)| activity.get() > *threshold)
        .map_or(floor, |(_, base)| *base)
}
