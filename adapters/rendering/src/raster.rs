use glam::Vec2;

use crate::{png, Artifact, CanvasSize, Color, RenderError};

/// Opaque software surface holding linear `0.0..=1.0` RGB channels.
///
/// Drawing uses straight-alpha source-over blending with analytic
/// anti-aliasing, so the same calls always produce the same pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct Raster {
    width: u32,
    height: u32,
    pixels: Vec<[f32; 3]>,
}

impl Raster {
    /// Acquires a black surface of the given dimensions.
    pub fn new(width: u32, height: u32) -> Result<Self, RenderError> {
        let unavailable = RenderError::SurfaceUnavailable { width, height };
        if width == 0 || height == 0 || width > CanvasSize::MAX_SIDE || height > CanvasSize::MAX_SIDE
        {
            return Err(unavailable);
        }

        let len = width as usize * height as usize;
        let mut pixels = Vec::new();
        if pixels.try_reserve_exact(len).is_err() {
            return Err(unavailable);
        }
        pixels.resize(len, [0.0; 3]);

        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Width of the surface in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the surface in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Centre of the surface in pixel coordinates.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width as f32 * 0.5, self.height as f32 * 0.5)
    }

    /// Quantised pixel at `(x, y)` as RGBA bytes, or `None` outside the surface.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let [red, green, blue] = self.pixels[self.index(x, y)];
        Some([quantize(red), quantize(green), quantize(blue), u8::MAX])
    }

    /// Quantises the surface into row-major RGBA bytes.
    #[must_use]
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 4);
        for [red, green, blue] in &self.pixels {
            bytes.extend_from_slice(&[quantize(*red), quantize(*green), quantize(*blue), u8::MAX]);
        }
        bytes
    }

    /// Encodes the surface as a PNG artifact in a single step.
    pub fn encode_png(&self) -> Result<Artifact, RenderError> {
        let png = png::encode_rgba(self.width, self.height, &self.to_rgba8())?;
        Ok(Artifact {
            png,
            width: self.width,
            height: self.height,
        })
    }

    /// Fills every pixel with a radial gradient from `inner` at `center` to
    /// `outer` at the farthest corner.
    pub(crate) fn fill_radial_gradient(&mut self, center: Vec2, inner: Color, outer: Color) {
        let corners = [
            Vec2::ZERO,
            Vec2::new(self.width as f32, 0.0),
            Vec2::new(0.0, self.height as f32),
            Vec2::new(self.width as f32, self.height as f32),
        ];
        let reach = corners
            .iter()
            .map(|corner| corner.distance(center))
            .fold(f32::EPSILON, f32::max);

        for y in 0..self.height {
            for x in 0..self.width {
                let t = (pixel_center(x, y).distance(center) / reach).clamp(0.0, 1.0);
                let index = self.index(x, y);
                self.pixels[index] = [
                    lerp(inner.red, outer.red, t),
                    lerp(inner.green, outer.green, t),
                    lerp(inner.blue, outer.blue, t),
                ];
            }
        }
    }

    /// Draws an anti-aliased filled circle.
    pub(crate) fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        if radius <= 0.0 || color.alpha <= 0.0 {
            return;
        }

        let reach = Vec2::splat(radius + 1.0);
        let Some((min, max)) = self.clip(center - reach, center + reach) else {
            return;
        };

        for y in min.1..=max.1 {
            for x in min.0..=max.0 {
                let distance = pixel_center(x, y).distance(center);
                let coverage = (radius + 0.5 - distance).clamp(0.0, 1.0);
                self.blend(x, y, color, coverage);
            }
        }
    }

    /// Draws an anti-aliased line segment of the given width with round caps.
    pub(crate) fn stroke_segment(&mut self, from: Vec2, to: Vec2, width: f32, color: Color) {
        if width <= 0.0 || color.alpha <= 0.0 {
            return;
        }

        let half = width * 0.5;
        let reach = Vec2::splat(half + 1.0);
        let Some((min, max)) = self.clip(from.min(to) - reach, from.max(to) + reach) else {
            return;
        };

        for y in min.1..=max.1 {
            for x in min.0..=max.0 {
                let distance = distance_to_segment(pixel_center(x, y), from, to);
                let coverage = (half + 0.5 - distance).clamp(0.0, 1.0);
                self.blend(x, y, color, coverage);
            }
        }
    }

    fn blend(&mut self, x: u32, y: u32, color: Color, coverage: f32) {
        let alpha = (color.alpha * coverage).clamp(0.0, 1.0);
        if alpha <= 0.0 {
            return;
        }

        let index = self.index(x, y);
        let [red, green, blue] = self.pixels[index];
        self.pixels[index] = [
            lerp(red, color.red, alpha),
            lerp(green, color.green, alpha),
            lerp(blue, color.blue, alpha),
        ];
    }

    /// Clamps a pixel-space bounding box to the surface, returning inclusive
    /// pixel bounds or `None` when the box lies entirely outside.
    fn clip(&self, min: Vec2, max: Vec2) -> Option<((u32, u32), (u32, u32))> {
        let width = self.width as f32;
        let height = self.height as f32;
        if !min.is_finite() || !max.is_finite() {
            return None;
        }
        if max.x < 0.0 || max.y < 0.0 || min.x >= width || min.y >= height {
            return None;
        }

        let min_x = min.x.floor().max(0.0) as u32;
        let min_y = min.y.floor().max(0.0) as u32;
        let max_x = (max.x.ceil() as u32).min(self.width - 1);
        let max_y = (max.y.ceil() as u32).min(self.height - 1);
        Some(((min_x, min_y), (max_x, max_y)))
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

fn pixel_center(x: u32, y: u32) -> Vec2 {
    Vec2::new(x as f32 + 0.5, y as f32 + 0.5)
}

fn distance_to_segment(point: Vec2, from: Vec2, to: Vec2) -> f32 {
    let along = to - from;
    let length_squared = along.length_squared();
    if length_squared <= f32::EPSILON {
        return point.distance(from);
    }

    let t = ((point - from).dot(along) / length_squared).clamp(0.0, 1.0);
    point.distance(from + along * t)
}

fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}

/// Rounds half up so quantisation never depends on the platform's rounding mode.
fn quantize(channel: f32) -> u8 {
    (channel.clamp(0.0, 1.0) * 255.0 + 0.5).floor() as u8
}
