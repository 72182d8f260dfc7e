//! Scene layers in back-to-front order.
//!
//! Geometry arrives in reference units around the canvas centre and is scaled
//! to the surface here.

use std::f32::consts::TAU;

use glam::Vec2;
use libm::{cosf, sinf};
use moodfield_core::{MotionClass, Palette, Particle, WaveformLayer, REFERENCE_CANVAS_SIZE};

use crate::{Color, Raster};

const BACKGROUND_TINT: f32 = 0.35;
const BACKGROUND_EDGE: Color = Color::from_rgb_u8(8, 8, 18);

/// Samples per closed waveform curve (a 2 degree angular step).
const WAVEFORM_SAMPLES: usize = 180;
const WAVEFORM_STROKE: f32 = 1.5;
const WAVEFORM_DRIFT: f32 = 0.6;

/// Glow rings as (radius multiple, alpha), outermost first.
const PARTICLE_GLOW: [(f32, f32); 3] = [(3.0, 0.06), (2.2, 0.10), (1.5, 0.18)];
const PARTICLE_ALPHA: f32 = 0.9;
const HIGHLIGHT_ALPHA: f32 = 0.6;
const HIGHLIGHT_RADIUS: f32 = 0.35;
const HIGHLIGHT_OFFSET: f32 = -0.3;
/// Every n-th particle is tethered to the centre.
const CONNECTION_EVERY: usize = 5;
const CONNECTION_STROKE: f32 = 0.6;
const CONNECTION_ALPHA: f32 = 0.18;
const SPIRAL_WOBBLE: f32 = 4.0;

const CORE_RADIUS: f32 = 16.0;
const CORE_PULSE: f32 = 3.0;
const CORE_GLOW: [(f32, f32); 3] = [(2.4, 0.08), (1.8, 0.14), (1.3, 0.22)];
const CORE_HIGHLIGHT_RADIUS: f32 = 0.4;
const CORE_HIGHLIGHT_ALPHA: f32 = 0.8;

fn scale_of(raster: &Raster) -> f32 {
    raster.width().min(raster.height()) as f32 / REFERENCE_CANVAS_SIZE
}

pub(crate) fn draw_background(raster: &mut Raster, palette: &Palette) {
    let center = raster.center();
    let inner = Color::from_rgb(palette.primary()).scaled(BACKGROUND_TINT);
    raster.fill_radial_gradient(center, inner, BACKGROUND_EDGE);
}

pub(crate) fn draw_waveforms(raster: &mut Raster, waveforms: &[WaveformLayer], time: f32) {
    let center = raster.center();
    let scale = scale_of(raster);
    let step = TAU / WAVEFORM_SAMPLES as f32;

    for layer in waveforms {
        let color = Color::from_rgb(layer.color()).with_alpha(layer.alpha());
        let lobes = layer.lobes() as f32;
        let points: Vec<Vec2> = (0..WAVEFORM_SAMPLES)
            .map(|sample| {
                let theta = sample as f32 * step;
                let undulation = sinf(lobes * theta + layer.phase() + time * WAVEFORM_DRIFT);
                let radius = layer.base_radius() + layer.amplitude() * undulation;
                center + unit(theta) * radius * scale
            })
            .collect();

        for (index, from) in points.iter().enumerate() {
            let to = points[(index + 1) % points.len()];
            raster.stroke_segment(*from, to, WAVEFORM_STROKE * scale, color);
        }
    }
}

pub(crate) fn draw_particles(raster: &mut Raster, particles: &[Particle], time: f32) {
    let center = raster.center();
    let scale = scale_of(raster);

    for (index, particle) in particles.iter().enumerate() {
        let position = center + particle_offset(particle, time) * scale;
        let base = Color::from_rgb(particle.color());
        let size = particle.size() * scale;

        if has_connection(index) {
            raster.stroke_segment(
                center,
                position,
                CONNECTION_STROKE * scale,
                base.with_alpha(CONNECTION_ALPHA),
            );
        }

        for (multiple, alpha) in PARTICLE_GLOW {
            raster.fill_circle(position, size * multiple, base.with_alpha(alpha));
        }
        raster.fill_circle(position, size, base.with_alpha(PARTICLE_ALPHA));
        raster.fill_circle(
            position + Vec2::splat(HIGHLIGHT_OFFSET * size),
            size * HIGHLIGHT_RADIUS,
            Color::new(1.0, 1.0, 1.0, HIGHLIGHT_ALPHA),
        );
    }
}

pub(crate) fn draw_core(raster: &mut Raster, palette: &Palette, time: f32) {
    let center = raster.center();
    let radius = (CORE_RADIUS + CORE_PULSE * sinf(time * 2.0)) * scale_of(raster);
    let primary = Color::from_rgb(palette.primary());

    for (multiple, alpha) in CORE_GLOW {
        raster.fill_circle(center, radius * multiple, primary.with_alpha(alpha));
    }
    raster.fill_circle(center, radius, primary);
    raster.fill_circle(
        center,
        radius * CORE_HIGHLIGHT_RADIUS,
        Color::new(1.0, 1.0, 1.0, CORE_HIGHLIGHT_ALPHA),
    );
}

/// Offset of a particle from the canvas centre at `time`, in reference units.
pub(crate) fn particle_offset(particle: &Particle, time: f32) -> Vec2 {
    let phase = particle.phase_offset();
    let base = particle.base_radius();
    let variation = particle.radius_variation();

    let (theta, radius) = match particle.motion() {
        MotionClass::Orbiting => (
            particle.angle_base() + 0.4 * time,
            base + variation * sinf(time + phase),
        ),
        MotionClass::Spiral => {
            let theta = particle.angle_base() + 0.25 * time;
            (
                theta,
                base + variation * sinf(0.5 * time + phase) + SPIRAL_WOBBLE * sinf(theta * 3.0),
            )
        }
        MotionClass::Wave => (
            particle.angle_base() + 0.3 * sinf(time + phase),
            base + variation * sinf(2.0 * time + phase),
        ),
    };

    unit(theta) * radius
}

/// Whether the particle at `index` is tethered to the centre.
fn has_connection(index: usize) -> bool {
    index % CONNECTION_EVERY == 0
}

fn unit(theta: f32) -> Vec2 {
    Vec2::new(cosf(theta), sinf(theta))
}

#[cfg(test)]
mod tests {
    use super::*;
    use moodfield_core::Rgb;
    use std::f32::consts::PI;

    fn particle(motion: MotionClass) -> Particle {
        Particle::new(0.0, 100.0, 10.0, 3.0, Rgb::new(255, 255, 255), 0.0, motion)
    }

    #[test]
    fn orbiting_particle_starts_on_base_radius() {
        let offset = particle_offset(&particle(MotionClass::Orbiting), 0.0);
        assert!((offset - Vec2::new(100.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn wave_particle_sways_but_keeps_moving_radius() {
        let particle = particle(MotionClass::Wave);
        let early = particle_offset(&particle, 0.0);
        let later = particle_offset(&particle, 0.7);
        assert!((early.length() - 100.0).abs() < 1e-4);
        assert!(later.length() > early.length());
    }

    #[test]
    fn particles_stay_inside_reference_canvas() {
        let extreme = Particle::new(1.0, 132.0, 22.0, 6.5, Rgb::WHITE, 2.0, MotionClass::Spiral);
        for step in 0..50 {
            let offset = particle_offset(&extreme, step as f32 * 0.37);
            assert!(offset.length() + 6.5 * 3.0 < REFERENCE_CANVAS_SIZE * 0.5);
        }
    }

    #[test]
    fn every_fifth_particle_is_tethered() {
        let tethered: Vec<usize> = (0..10).filter(|index| has_connection(*index)).collect();
        assert_eq!(tethered, vec![0, 5]);
    }

    #[test]
    fn connection_line_only_reaches_tethered_particles() {
        let right = Particle::new(0.0, 100.0, 0.0, 3.0, Rgb::WHITE, 0.0, MotionClass::Orbiting);
        let left = Particle::new(PI, 100.0, 0.0, 3.0, Rgb::WHITE, 0.0, MotionClass::Orbiting);
        let mut raster = Raster::new(400, 400).expect("surface");
        draw_particles(&mut raster, &[right, left], 0.0);

        let [red, ..] = raster.pixel(250, 200).expect("inside");
        assert!(red > 0);
        assert_eq!(raster.pixel(150, 200), Some([0, 0, 0, 255]));
    }

    #[test]
    fn core_glyph_uses_primary_colour() {
        const PRIMARY: [Rgb; 1] = [Rgb::new(0, 0, 255)];
        let palette = Palette::new(moodfield_core::PaletteName::Calm, &PRIMARY);
        let mut raster = Raster::new(400, 400).expect("surface");
        draw_core(&mut raster, &palette, 0.0);
        // Ring between the white highlight and the disk edge.
        assert_eq!(raster.pixel(200, 190), Some([0, 0, 255, 255]));
    }
}
