#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed preview window for moodfield scenes.
//!
//! The preview is silent, so macroquad is built without its `audio` feature.
//!
//! Frames are rasterised by the shared compositor on the CPU and uploaded as a
//! single texture each frame, so the window shows exactly what an artifact at
//! the same time parameter would contain.

use anyhow::{Context, Result};
use macroquad::{
    color::WHITE,
    input::{is_key_pressed, KeyCode},
    texture::{draw_texture_ex, DrawTextureParams, FilterMode, Image, Texture2D},
};
use moodfield_rendering::{CanvasSize, Color, PreviewBackend, Presentation, Raster};
use std::{
    sync::mpsc,
    time::{Duration, Instant},
};
use tracing::info;

const MIN_WINDOW_SIDE: u32 = 400;
const MAX_WINDOW_SIDE: u32 = 960;

/// Snapshot of edge-triggered keyboard shortcuts observed during a single frame.
#[derive(Clone, Copy, Debug, Default)]
struct KeyboardShortcuts {
    /// `Q` or `Escape` to close the preview.
    quit_requested: bool,
    /// `Space` pauses or resumes the animation.
    toggle_pause: bool,
    /// `R` rewinds the animation to the static frame.
    rewind: bool,
}

impl KeyboardShortcuts {
    fn poll() -> Self {
        Self {
            quit_requested: is_key_pressed(KeyCode::Escape) || is_key_pressed(KeyCode::Q),
            toggle_pause: is_key_pressed(KeyCode::Space),
            rewind: is_key_pressed(KeyCode::R),
        }
    }
}

/// Animation clock that only advances while the preview is running.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PreviewClock {
    elapsed: Duration,
    paused: bool,
}

impl PreviewClock {
    /// Advances the clock by a frame delta unless paused and returns the
    /// animation time to render.
    pub fn advance(&mut self, delta: Duration) -> Duration {
        if !self.paused {
            self.elapsed = self.elapsed.saturating_add(delta);
        }
        self.elapsed
    }

    /// Flips between paused and running.
    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    /// Returns to the static frame without changing the pause state.
    pub fn rewind(&mut self) {
        self.elapsed = Duration::ZERO;
    }

    /// Whether the clock is paused.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }
}

/// Preview backend implemented on top of macroquad.
#[derive(Clone, Copy, Debug, Default)]
pub struct MacroquadPreview {
    swap_interval: Option<i32>,
    show_fps: bool,
}

impl MacroquadPreview {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(mut self, enabled: bool) -> Self {
        self.swap_interval = if enabled { Some(1) } else { Some(0) };
        self
    }

    /// Configures whether the backend logs frame timing once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }
}

/// Average frame rate and raster time over the last reporting window.
#[derive(Clone, Copy, Debug)]
struct FpsMetrics {
    per_second: f32,
    avg_render: Duration,
}

#[derive(Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
    render_accum: Duration,
}

impl FpsCounter {
    /// Records a presented frame and returns averages once one second has elapsed.
    fn record_frame(&mut self, frame: Duration, render: Duration) -> Option<FpsMetrics> {
        self.elapsed += frame;
        self.frames = self.frames.saturating_add(1);
        self.render_accum += render;

        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let metrics = FpsMetrics {
            per_second: self.frames as f32 / self.elapsed.as_secs_f32(),
            avg_render: self.render_accum / self.frames,
        };
        *self = Self::default();
        Some(metrics)
    }
}

/// Side length of the preview window for a canvas.
fn window_side(canvas: CanvasSize) -> u32 {
    canvas.side().clamp(MIN_WINDOW_SIDE, MAX_WINDOW_SIDE)
}

/// Largest centred square that fits the screen, as `(x, y, side)`.
fn fit_square(screen_width: f32, screen_height: f32) -> (f32, f32, f32) {
    let side = screen_width.min(screen_height).max(0.0);
    ((screen_width - side) * 0.5, (screen_height - side) * 0.5, side)
}

fn to_image(raster: &Raster) -> Result<Image> {
    let width = u16::try_from(raster.width()).context("frame too wide for a texture")?;
    let height = u16::try_from(raster.height()).context("frame too tall for a texture")?;
    Ok(Image {
        bytes: raster.to_rgba8(),
        width,
        height,
    })
}

impl PreviewBackend for MacroquadPreview {
    fn run<F>(self, presentation: Presentation, mut render_frame: F) -> Result<()>
    where
        F: FnMut(Duration) -> Result<Raster> + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            canvas,
        } = presentation;

        let side = i32::try_from(window_side(canvas)).unwrap_or(MIN_WINDOW_SIDE as i32);
        let mut config = macroquad::window::Conf {
            window_title,
            window_width: side,
            window_height: side,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        let (failure_sender, failure_receiver) = mpsc::channel::<anyhow::Error>();

        macroquad::Window::from_config(config, async move {
            let background = to_macroquad_color(clear_color);
            let mut clock = PreviewClock::default();
            let mut fps_counter = FpsCounter::default();
            let mut texture: Option<Texture2D> = None;
            let mut last_frame = Instant::now();

            loop {
                let keyboard = KeyboardShortcuts::poll();
                if keyboard.quit_requested {
                    break;
                }
                if keyboard.toggle_pause {
                    clock.toggle_pause();
                }
                if keyboard.rewind {
                    clock.rewind();
                }

                let now = Instant::now();
                let frame_delta = now.saturating_duration_since(last_frame);
                last_frame = now;
                let time = clock.advance(frame_delta);

                let render_start = Instant::now();
                let image = match render_frame(time).and_then(|raster| to_image(&raster)) {
                    Ok(image) => image,
                    Err(error) => {
                        let error = error.context("failed to render preview frame");
                        let _ = failure_sender.send(error);
                        break;
                    }
                };
                let render_time = render_start.elapsed();

                let current = match texture {
                    Some(existing) => {
                        existing.update(&image);
                        existing
                    }
                    None => {
                        let created = Texture2D::from_rgba8(image.width, image.height, &image.bytes);
                        created.set_filter(FilterMode::Linear);
                        texture = Some(created);
                        created
                    }
                };

                macroquad::window::clear_background(background);
                let (x, y, side) = fit_square(
                    macroquad::window::screen_width(),
                    macroquad::window::screen_height(),
                );
                draw_texture_ex(
                    current,
                    x,
                    y,
                    WHITE,
                    DrawTextureParams {
                        dest_size: Some(macroquad::math::vec2(side, side)),
                        ..DrawTextureParams::default()
                    },
                );

                if show_fps {
                    if let Some(metrics) = fps_counter.record_frame(frame_delta, render_time) {
                        info!(
                            fps = metrics.per_second,
                            render_ms = metrics.avg_render.as_secs_f64() * 1_000.0,
                            paused = clock.is_paused(),
                            "preview frame timing"
                        );
                    }
                }

                macroquad::window::next_frame().await;
            }

            if let Some(texture) = texture {
                texture.delete();
            }
        });

        // The loop drops its sender on exit, so an empty channel means a clean close.
        match failure_receiver.try_recv() {
            Ok(error) => Err(error),
            Err(_) => Ok(()),
        }
    }
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_advances_only_while_running() {
        let mut clock = PreviewClock::default();
        assert_eq!(clock.advance(Duration::from_millis(40)), Duration::from_millis(40));

        clock.toggle_pause();
        assert!(clock.is_paused());
        assert_eq!(clock.advance(Duration::from_millis(500)), Duration::from_millis(40));

        clock.toggle_pause();
        assert_eq!(clock.advance(Duration::from_millis(10)), Duration::from_millis(50));
    }

    #[test]
    fn rewind_returns_to_static_frame() {
        let mut clock = PreviewClock::default();
        let _ = clock.advance(Duration::from_secs(3));
        clock.toggle_pause();
        clock.rewind();
        assert_eq!(clock.advance(Duration::from_secs(1)), Duration::ZERO);
        assert!(clock.is_paused());
    }

    #[test]
    fn window_side_is_clamped() {
        assert_eq!(window_side(CanvasSize::new(64)), MIN_WINDOW_SIDE);
        assert_eq!(window_side(CanvasSize::DEFAULT), 400);
        assert_eq!(window_side(CanvasSize::new(600)), 600);
        assert_eq!(window_side(CanvasSize::new(4_096)), MAX_WINDOW_SIDE);
    }

    #[test]
    fn square_is_centred_on_wide_screens() {
        assert_eq!(fit_square(800.0, 600.0), (100.0, 0.0, 600.0));
        assert_eq!(fit_square(500.0, 700.0), (0.0, 100.0, 500.0));
    }

    #[test]
    fn frame_image_matches_raster() {
        let raster = Raster::new(3, 2).expect("surface");
        let image = to_image(&raster).expect("image");
        assert_eq!((image.width, image.height), (3, 2));
        assert_eq!(image.bytes.len(), 3 * 2 * 4);
    }

    #[test]
    fn fps_counter_reports_average_frames_per_second() {
        let mut counter = FpsCounter::default();
        let frame = Duration::from_millis(250);
        let render = Duration::from_millis(4);
        assert!(counter.record_frame(frame, render).is_none());
        assert!(counter.record_frame(frame, render).is_none());
        assert!(counter.record_frame(frame, render).is_none());

        let metrics = counter
            .record_frame(frame, render)
            .expect("should report FPS after one second of samples");
        assert!((metrics.per_second - 4.0).abs() <= 1e-3);
        assert_eq!(metrics.avg_render, render);
        assert!(counter.record_frame(frame, render).is_none());
    }
}
