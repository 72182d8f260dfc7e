use moodfield_core::{ActivityCount, MoodSeed, RarityScore};
use moodfield_system_rarity::ledger_score;
use serde::Serialize;

/// Per-token record persisted by the ownership ledger at mint time.
///
/// The ledger scores rarity with its own coarser tiers, so the stored score
/// can differ from the one reported by [`crate::Engine::generate`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LedgerTokenRecord {
    mood_seed: MoodSeed,
    activity_count: ActivityCount,
    rarity_score: RarityScore,
    mint_timestamp: u64,
    creator: String,
}

impl LedgerTokenRecord {
    /// Builds the record for a mint, scoring rarity with the ledger formula.
    #[must_use]
    pub fn mint(
        mood_seed: MoodSeed,
        activity_count: ActivityCount,
        mint_timestamp: u64,
        creator: impl Into<String>,
    ) -> Self {
        let rarity_score = ledger_score(activity_count, &mood_seed);
        Self {
            mood_seed,
            activity_count,
            rarity_score,
            mint_timestamp,
            creator: creator.into(),
        }
    }

    /// Rarity recorded by the ledger.
    #[must_use]
    pub const fn rarity_score(&self) -> RarityScore {
        self.rarity_score
    }

    /// Mint time in seconds since the Unix epoch.
    #[must_use]
    pub const fn mint_timestamp(&self) -> u64 {
        self.mint_timestamp
    }

    /// Account that minted the token.
    #[must_use]
    pub fn creator(&self) -> &str {
        &self.creator
    }
}
