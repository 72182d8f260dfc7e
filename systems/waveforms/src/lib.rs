#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that builds the background waveform layers.

use std::f32::consts::TAU;

use moodfield_core::{
    ActivityCount, Palette, SeedHash, WaveformLayer, MAX_WAVEFORMS, MIN_WAVEFORMS,
    WAVEFORM_ACTIVITY_DIVISOR,
};

const AMPLITUDE_BASE: f32 = 6.0;
const AMPLITUDE_PRIME: u64 = 7;
const AMPLITUDE_RANGE: u64 = 12;

const PHASE_HASH_MODULUS: u32 = 100;
const PHASE_HASH_STEP: f32 = 0.01;

const ALPHA_BASE: f32 = 0.12;
const ALPHA_STEP: f32 = 0.04;
const ALPHA_TIERS: usize = 3;

const RADIUS_BASE: f32 = 70.0;
const RADIUS_STEP: f32 = 22.0;

const LOBES_BASE: u32 = 3;
const LOBE_TIERS: usize = 4;

/// Number of waveform layers for the provided activity count.
///
/// Grows by one layer per [`WAVEFORM_ACTIVITY_DIVISOR`] of activity, from
/// [`MIN_WAVEFORMS`] up to [`MAX_WAVEFORMS`].
#[must_use]
pub fn waveform_count(activity: ActivityCount) -> usize {
    let earned = activity.get() / WAVEFORM_ACTIVITY_DIVISOR;
    let total = earned.saturating_add(MIN_WAVEFORMS as u64);
    total.min(MAX_WAVEFORMS as u64) as usize
}

/// Builds the ordered waveform layers for a generation.
#[must_use]
pub fn build_waveforms(
    hash: SeedHash,
    activity: ActivityCount,
    palette: &Palette,
) -> Vec<WaveformLayer> {
    let count = waveform_count(activity);
    let hash_phase = (hash.get() % PHASE_HASH_MODULUS) as f32 * PHASE_HASH_STEP;
    let raw_hash = u64::from(hash.get());

    (0..count)
        .map(|index| {
            let amplitude_step =
                raw_hash.wrapping_add((index as u64).wrapping_mul(AMPLITUDE_PRIME)) % AMPLITUDE_RANGE;
            let amplitude = AMPLITUDE_BASE + amplitude_step as f32;
            let phase = index as f32 * TAU / count as f32 + hash_phase;
            let alpha = ALPHA_BASE + (index % ALPHA_TIERS) as f32 * ALPHA_STEP;
            let base_radius = RADIUS_BASE + index as f32 * RADIUS_STEP;
            let lobes = LOBES_BASE + (index % LOBE_TIERS) as u32;

            WaveformLayer::new(
                amplitude,
                phase,
                palette.cycled(index + 1),
                alpha,
                base_radius,
                lobes,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use moodfield_core::{PaletteName, Rgb};

    const DUO: [Rgb; 2] = [Rgb::new(10, 10, 10), Rgb::new(200, 100, 50)];

    fn duo() -> Palette {
        Palette::new(PaletteName::Calm, &DUO)
    }

    #[test]
    fn count_grows_per_hundred_and_caps() {
        assert_eq!(waveform_count(ActivityCount::new(0)), 3);
        assert_eq!(waveform_count(ActivityCount::new(99)), 3);
        assert_eq!(waveform_count(ActivityCount::new(100)), 4);
        assert_eq!(waveform_count(ActivityCount::new(499)), 7);
        assert_eq!(waveform_count(ActivityCount::new(500)), 8);
        assert_eq!(waveform_count(ActivityCount::new(u64::MAX)), MAX_WAVEFORMS);
    }

    #[test]
    fn layers_skip_primary_colour_first() {
        let layers = build_waveforms(SeedHash::new(5), ActivityCount::new(0), &duo());
        assert_eq!(layers[0].color(), Rgb::new(200, 100, 50));
        assert_eq!(layers[1].color(), Rgb::new(10, 10, 10));
    }

    #[test]
    fn descriptors_follow_index_tiers() {
        let layers = build_waveforms(SeedHash::new(0), ActivityCount::new(400), &duo());
        assert_eq!(layers.len(), 7);
        assert_eq!(layers[0].amplitude(), 6.0);
        assert_eq!(layers[1].amplitude(), 13.0);
        assert_eq!(layers[2].amplitude(), 8.0);
        assert_eq!(layers[3].base_radius(), 136.0);
        assert_eq!(layers[4].lobes(), 3);
        assert_eq!(layers[5].lobes(), 4);
        for layer in &layers {
            assert!(layer.alpha() > 0.0 && layer.alpha() < 0.25);
        }
    }

    #[test]
    fn layers_replay_identically() {
        let first = build_waveforms(SeedHash::new(99_047_136), ActivityCount::new(250), &duo());
        let second = build_waveforms(SeedHash::new(99_047_136), ActivityCount::new(250), &duo());
        assert_eq!(first, second);
    }
}
