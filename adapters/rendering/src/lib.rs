#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Compositor and shared rendering contracts for moodfield adapters.
//!
//! The compositor rasterises a [`Scene`] back to front: radial background,
//! waveform layers, particles with their connection lines, then the core
//! glyph. [`Compositor::render_static`] pins time to zero and produces the
//! persisted PNG [`Artifact`]; [`Compositor::render_frame`] accepts a time
//! parameter and is only meant for on-screen previews.

mod layers;
mod png;
mod raster;

pub use raster::Raster;

use anyhow::Result as AnyResult;
use moodfield_core::{Palette, Particle, Rgb, WaveformLayer};
use sha2::{Digest, Sha256};
use std::{fmt::Write as _, time::Duration};
use thiserror::Error;

/// Time parameter used for every persisted frame.
pub const STATIC_FRAME_TIME: f32 = 0.0;

/// RGBA color used when compositing frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Creates an opaque color from a palette entry.
    #[must_use]
    pub const fn from_rgb(rgb: Rgb) -> Self {
        Self::from_rgb_u8(rgb.red(), rgb.green(), rgb.blue())
    }

    /// Returns the same color with its alpha replaced.
    #[must_use]
    pub const fn with_alpha(self, alpha: f32) -> Self {
        Self { alpha, ..self }
    }

    /// Returns a new color with every colour channel multiplied by `factor`.
    #[must_use]
    pub fn scaled(self, factor: f32) -> Self {
        Self {
            red: (self.red * factor).clamp(0.0, 1.0),
            green: (self.green * factor).clamp(0.0, 1.0),
            blue: (self.blue * factor).clamp(0.0, 1.0),
            alpha: self.alpha,
        }
    }
}

/// Side length in pixels of the square raster surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CanvasSize(u32);

impl CanvasSize {
    /// Largest side length a surface can be acquired for.
    pub const MAX_SIDE: u32 = 4_096;

    /// Canvas used when no configuration overrides it.
    pub const DEFAULT: Self = Self(400);

    /// Creates a canvas size. Validity is checked when a surface is acquired.
    #[must_use]
    pub const fn new(side: u32) -> Self {
        Self(side)
    }

    /// Side length in pixels.
    #[must_use]
    pub const fn side(&self) -> u32 {
        self.0
    }
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Read-only scene composited into a frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Particle field in index order; later particles draw on top.
    pub particles: Vec<Particle>,
    /// Background waveform layers in index order.
    pub waveforms: Vec<WaveformLayer>,
    /// Palette providing the background tint and core glyph colour.
    pub palette: Palette,
}

impl Scene {
    /// Creates a new scene descriptor.
    #[must_use]
    pub fn new(particles: Vec<Particle>, waveforms: Vec<WaveformLayer>, palette: Palette) -> Self {
        Self {
            particles,
            waveforms,
            palette,
        }
    }
}

/// Encoded PNG bytes of a persisted frame.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Artifact {
    png: Vec<u8>,
    width: u32,
    height: u32,
}

impl Artifact {
    /// Encoded PNG bytes.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.png
    }

    /// Width of the encoded image in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the encoded image in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// SHA-256 digest of the encoded bytes.
    #[must_use]
    pub fn digest(&self) -> [u8; 32] {
        Sha256::digest(&self.png).into()
    }

    /// Lowercase hexadecimal SHA-256 digest of the encoded bytes.
    #[must_use]
    pub fn digest_hex(&self) -> String {
        let mut hex = String::with_capacity(64);
        for byte in self.digest() {
            // Writing into a String cannot fail.
            let _ = write!(hex, "{byte:02x}");
        }
        hex
    }
}

/// Failures that abort compositing. None of them leave a partial artifact.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A raster surface with the requested dimensions could not be acquired.
    #[error("could not acquire a {width}x{height} drawing surface")]
    SurfaceUnavailable {
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
    },
    /// A preview frame was requested with a non-finite time parameter.
    #[error("frame time must be finite (received {time})")]
    InvalidFrameTime {
        /// Rejected time parameter in seconds.
        time: f32,
    },
    /// The raster could not be encoded as PNG.
    #[error("could not encode the artifact as PNG")]
    Encoding(#[source] std::io::Error),
}

/// Rasterises scenes onto a fixed-size surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Compositor {
    canvas: CanvasSize,
}

impl Compositor {
    /// Creates a compositor drawing onto square surfaces of the given size.
    #[must_use]
    pub const fn new(canvas: CanvasSize) -> Self {
        Self { canvas }
    }

    /// Canvas size used for every surface.
    #[must_use]
    pub const fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    /// Renders the persisted frame and encodes it as PNG.
    ///
    /// Time is pinned to [`STATIC_FRAME_TIME`], so identical scenes always
    /// produce byte-identical artifacts.
    pub fn render_static(&self, scene: &Scene) -> Result<Artifact, RenderError> {
        self.render_frame(scene, STATIC_FRAME_TIME)?.encode_png()
    }

    /// Renders a preview frame at `time` seconds.
    pub fn render_frame(&self, scene: &Scene, time: f32) -> Result<Raster, RenderError> {
        if !time.is_finite() {
            return Err(RenderError::InvalidFrameTime { time });
        }

        let side = self.canvas.side();
        let mut raster = Raster::new(side, side)?;
        layers::draw_background(&mut raster, &scene.palette);
        layers::draw_waveforms(&mut raster, &scene.waveforms, time);
        layers::draw_particles(&mut raster, &scene.particles, time);
        layers::draw_core(&mut raster, &scene.palette, time);
        Ok(raster)
    }
}

/// Presentation descriptor consumed by preview backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame around the canvas.
    pub clear_color: Color,
    /// Size of the frames the backend will receive.
    pub canvas: CanvasSize,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, canvas: CanvasSize) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            canvas,
        }
    }
}

/// Backend capable of showing an animated preview of a scene.
pub trait PreviewBackend {
    /// Runs the preview until it is requested to exit.
    ///
    /// The provided `render_frame` closure receives the animation time elapsed
    /// since the preview started and returns the raster to present. Backends
    /// may pause or rewind that time. Preview frames are never persisted.
    fn run<F>(self, presentation: Presentation, render_frame: F) -> AnyResult<()>
    where
        F: FnMut(Duration) -> AnyResult<Raster> + 'static;
}

#[cfg(test)]
mod tests {
    use super::*;
    use moodfield_core::{MotionClass, PaletteName};

    const DUO: [Rgb; 2] = [Rgb::new(200, 40, 40), Rgb::new(40, 200, 40)];

    fn scene() -> Scene {
        let palette = Palette::new(PaletteName::Passionate, &DUO);
        let particles = (0..6)
            .map(|index| {
                Particle::new(
                    index as f32,
                    60.0 + index as f32 * 10.0,
                    8.0,
                    3.0,
                    palette.cycled(index),
                    0.5,
                    MotionClass::from_index(index),
                )
            })
            .collect();
        let waveforms = vec![WaveformLayer::new(8.0, 0.0, DUO[1], 0.2, 90.0, 4)];
        Scene::new(particles, waveforms, palette)
    }

    #[test]
    fn static_render_is_byte_stable() {
        let compositor = Compositor::new(CanvasSize::new(64));
        let first = compositor.render_static(&scene()).expect("render");
        let second = compositor.render_static(&scene()).expect("render");
        assert_eq!(first, second);
        assert_eq!(first.digest_hex(), second.digest_hex());
        assert_eq!(first.digest_hex().len(), 64);
        assert_eq!((first.width(), first.height()), (64, 64));
    }

    #[test]
    fn static_render_matches_frame_at_time_zero() {
        let compositor = Compositor::new(CanvasSize::new(48));
        let frame = compositor
            .render_frame(&scene(), STATIC_FRAME_TIME)
            .expect("frame");
        let artifact = compositor.render_static(&scene()).expect("render");
        assert_eq!(frame.encode_png().expect("encode"), artifact);
    }

    #[test]
    fn frames_change_over_time() {
        let compositor = Compositor::new(CanvasSize::new(64));
        let start = compositor.render_frame(&scene(), 0.0).expect("frame");
        let later = compositor.render_frame(&scene(), 1.5).expect("frame");
        assert_ne!(start.to_rgba8(), later.to_rgba8());
    }

    #[test]
    fn zero_sized_canvas_is_a_render_error() {
        let compositor = Compositor::new(CanvasSize::new(0));
        let error = compositor
            .render_static(&scene())
            .expect_err("zero canvas must fail");
        assert!(matches!(
            error,
            RenderError::SurfaceUnavailable {
                width: 0,
                height: 0
            }
        ));
    }

    #[test]
    fn oversized_canvas_is_a_render_error() {
        let compositor = Compositor::new(CanvasSize::new(CanvasSize::MAX_SIDE + 1));
        assert!(matches!(
            compositor.render_frame(&scene(), 0.0),
            Err(RenderError::SurfaceUnavailable { .. })
        ));
    }

    #[test]
    fn non_finite_time_is_rejected() {
        let compositor = Compositor::new(CanvasSize::new(16));
        assert!(matches!(
            compositor.render_frame(&scene(), f32::NAN),
            Err(RenderError::InvalidFrameTime { .. })
        ));
    }

    #[test]
    fn core_glyph_covers_particles_at_the_centre() {
        const BLUE: [Rgb; 1] = [Rgb::new(0, 0, 255)];
        let palette = Palette::new(PaletteName::Calm, &BLUE);
        let centred = Particle::new(
            0.0,
            0.0,
            0.0,
            10.0,
            Rgb::new(255, 0, 0),
            0.0,
            MotionClass::Orbiting,
        );
        let scene = Scene::new(vec![centred], Vec::new(), palette);

        let frame = Compositor::new(CanvasSize::DEFAULT)
            .render_frame(&scene, STATIC_FRAME_TIME)
            .expect("frame");
        assert_eq!(frame.pixel(200, 190), Some([0, 0, 255, 255]));
    }

    #[test]
    fn waveforms_are_drawn_over_the_background() {
        const DARK: [Rgb; 2] = [Rgb::new(0, 0, 0), Rgb::new(255, 255, 255)];
        let palette = Palette::new(PaletteName::Calm, &DARK);
        let ring = WaveformLayer::new(0.0, 0.0, DARK[1], 0.5, 90.0, 4);
        let compositor = Compositor::new(CanvasSize::DEFAULT);

        let bare = compositor
            .render_frame(&Scene::new(Vec::new(), Vec::new(), palette), 0.0)
            .expect("frame");
        let layered = compositor
            .render_frame(&Scene::new(Vec::new(), vec![ring], palette), 0.0)
            .expect("frame");

        let [bare_red, ..] = bare.pixel(290, 199).expect("inside");
        let [layered_red, ..] = layered.pixel(290, 199).expect("inside");
        assert!(layered_red > bare_red + 50);
    }

    #[test]
    fn color_helpers_clamp_channels() {
        let color = Color::from_rgb(Rgb::new(255, 0, 128)).scaled(2.0);
        assert_eq!(color.red, 1.0);
        assert_eq!(color.green, 0.0);
        let faded = color.with_alpha(0.25);
        assert_eq!(faded.alpha, 0.25);
        assert_eq!(faded.blue, color.blue);
    }
}
