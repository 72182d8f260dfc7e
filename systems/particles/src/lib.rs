#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that lays out the deterministic particle field.
//!
//! Every descriptor channel is derived from the particle index, the seed hash
//! and the palette using integer buckets, so the field reproduces exactly
//! without a floating-point PRNG. Output order follows the particle index;
//! the compositor relies on it for z-order and connection lines.

use std::f32::consts::TAU;

use moodfield_core::{
    ActivityCount, MotionClass, Palette, Particle, Rgb, SeedHash, MAX_PARTICLES, MIN_PARTICLES,
    PARTICLE_ACTIVITY_FLOOR, PARTICLE_OFFSET,
};

/// Rotation applied per unit of `hash mod HASH_ROTATION_MODULUS`.
const HASH_ROTATION_STEP: f32 = 0.001;
const HASH_ROTATION_MODULUS: u32 = 10_000;

const RADIUS_TIERS: usize = 5;
const RADIUS_BASE: f32 = 60.0;
const RADIUS_STEP: f32 = 18.0;

const VARIATION_TIERS: usize = 3;
const VARIATION_BASE: f32 = 8.0;
const VARIATION_STEP: f32 = 7.0;

const SIZE_TIERS: usize = 4;
const SIZE_BASE: f32 = 2.0;
const SIZE_STEP: f32 = 1.5;

/// Per-channel primes (red, green, blue) used to decorrelate colour jitter.
const CHANNEL_PRIMES: [u64; 3] = [17, 31, 47];
const CHANNEL_JITTER_RANGE: u64 = 30;

const PHASE_PRIME: u64 = 13;
/// Phase offsets are hundredths of a radian in `0..PHASE_RANGE`.
const PHASE_RANGE: u64 = 628;

/// Number of particles emitted for the provided activity count.
///
/// Monotonic in `activity` and never outside `MIN_PARTICLES..=MAX_PARTICLES`.
#[must_use]
pub fn particle_count(activity: ActivityCount) -> usize {
    let floored = activity.get().max(PARTICLE_ACTIVITY_FLOOR);
    let raw = floored.saturating_add(PARTICLE_OFFSET);
    let capped = raw.min(MAX_PARTICLES as u64);
    // Lossless: capped never exceeds MAX_PARTICLES.
    (capped as usize).max(MIN_PARTICLES)
}

/// Builds the ordered particle field for a generation.
#[must_use]
pub fn build_particles(hash: SeedHash, activity: ActivityCount, palette: &Palette) -> Vec<Particle> {
    let count = particle_count(activity);
    let rotation = (hash.get() % HASH_ROTATION_MODULUS) as f32 * HASH_ROTATION_STEP;

    (0..count)
        .map(|index| {
            let angle_base = index as f32 / count as f32 * TAU + rotation;
            let base_radius = RADIUS_BASE + (index % RADIUS_TIERS) as f32 * RADIUS_STEP;
            let radius_variation =
                VARIATION_BASE + (index % VARIATION_TIERS) as f32 * VARIATION_STEP;
            let size = SIZE_BASE + (index % SIZE_TIERS) as f32 * SIZE_STEP;
            let color = jitter_color(palette.cycled(index), hash, index);
            let phase_offset = phase_offset(hash, index);

            Particle::new(
                angle_base,
                base_radius,
                radius_variation,
                size,
                color,
                phase_offset,
                MotionClass::from_index(index),
            )
        })
        .collect()
}

fn jitter_color(base: Rgb, hash: SeedHash, index: usize) -> Rgb {
    let [red, green, blue] = base.channels();
    let hash = u64::from(hash.get());
    let index = index as u64;
    let jitter = |channel: u8, prime: u64| -> u8 {
        let offset = hash.wrapping_add(index.wrapping_mul(prime)) % CHANNEL_JITTER_RANGE;
        // Offset is below 30, so the sum fits before clamping.
        (u64::from(channel) + offset).min(255) as u8
    };

    Rgb::new(
        jitter(red, CHANNEL_PRIMES[0]),
        jitter(green, CHANNEL_PRIMES[1]),
        jitter(blue, CHANNEL_PRIMES[2]),
    )
}

fn phase_offset(hash: SeedHash, index: usize) -> f32 {
    let hundredths =
        u64::from(hash.get()).wrapping_add((index as u64).wrapping_mul(PHASE_PRIME)) % PHASE_RANGE;
    hundredths as f32 / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use moodfield_core::{PaletteName, Rgb};

    const WARM: [Rgb; 5] = [
        Rgb::new(255, 215, 0),
        Rgb::new(255, 165, 0),
        Rgb::new(255, 140, 0),
        Rgb::new(255, 223, 128),
        Rgb::new(255, 250, 205),
    ];

    fn warm() -> Palette {
        Palette::new(PaletteName::Happy, &WARM)
    }

    #[test]
    fn count_starts_at_floor() {
        assert_eq!(particle_count(ActivityCount::new(0)), MIN_PARTICLES);
        assert_eq!(particle_count(ActivityCount::new(8)), 15);
        assert_eq!(particle_count(ActivityCount::new(10)), 17);
    }

    #[test]
    fn count_is_monotonic_and_capped() {
        let mut previous = 0;
        for activity in 0..200 {
            let count = particle_count(ActivityCount::new(activity));
            assert!(count >= previous, "count shrank at activity {activity}");
            assert!(count <= MAX_PARTICLES);
            previous = count;
        }
        assert_eq!(particle_count(ActivityCount::new(43)), MAX_PARTICLES);
        assert_eq!(particle_count(ActivityCount::new(u64::MAX)), MAX_PARTICLES);
    }

    #[test]
    fn colours_are_jittered_per_channel() {
        let particles = build_particles(SeedHash::new(99_047_136), ActivityCount::new(10), &warm());
        assert_eq!(particles[0].color(), Rgb::new(255, 221, 6));
        assert_eq!(particles[1].color(), Rgb::new(255, 172, 23));
        assert_eq!(particles[2].color(), Rgb::new(255, 148, 10));
    }

    #[test]
    fn tiers_repeat_by_index() {
        let particles = build_particles(SeedHash::new(0), ActivityCount::new(0), &warm());
        assert_eq!(particles[0].base_radius(), 60.0);
        assert_eq!(particles[4].base_radius(), 132.0);
        assert_eq!(particles[5].base_radius(), 60.0);
        assert_eq!(particles[2].radius_variation(), 22.0);
        assert_eq!(particles[3].size(), 6.5);
        assert_eq!(particles[1].motion(), MotionClass::Spiral);
    }

    #[test]
    fn phase_offsets_stay_within_one_turn() {
        let particles =
            build_particles(SeedHash::new(u32::MAX), ActivityCount::new(1_000), &warm());
        for particle in &particles {
            assert!((0.0..6.28).contains(&particle.phase_offset()));
        }
        assert_eq!(
            build_particles(SeedHash::new(99_047_136), ActivityCount::new(0), &warm())[0]
                .phase_offset(),
            2.32
        );
    }

    #[test]
    fn angles_are_evenly_spaced_from_hash_rotation() {
        let particles = build_particles(SeedHash::new(7_136), ActivityCount::new(0), &warm());
        let step = TAU / particles.len() as f32;
        assert!((particles[0].angle_base() - 7.136).abs() < 1e-5);
        let delta = particles[1].angle_base() - particles[0].angle_base();
        assert!((delta - step).abs() < 1e-5);
    }
}
