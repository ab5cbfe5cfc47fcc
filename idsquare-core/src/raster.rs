//! Raster Backend - Drawing Surface Contract
//!
//! The generator only talks to surfaces through `RasterBackend`.
//! `ImageBackend` is the default implementation over `image::RgbImage`.

use image::codecs::png::PngEncoder;
use image::imageops::{self, FilterType};
use image::{ColorType, ImageEncoder, ImageError, Rgb, RgbImage};
use std::io::Write;
use thiserror::Error;

use crate::palettes::Color;

/// Largest surface, in pixels, the default backend will allocate.
pub const MAX_SURFACE_PIXELS: u64 = 1 << 28;

#[derive(Debug, Error)]
pub enum RasterError {
    #[error("cannot allocate a {width}x{height} surface")]
    Allocation { width: u32, height: u32 },

    #[error("region {region:?} exceeds a {width}x{height} surface")]
    RegionOutOfBounds { region: Rect, width: u32, height: u32 },

    #[error("encoding error: {0}")]
    Encoding(#[from] ImageError),
}

/// Half-open pixel rectangle: `x0..x1` by `y0..y1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl Rect {
    pub fn new(x0: u32, y0: u32, x1: u32, y1: u32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Square of edge `side` with its top-left corner at (`x`, `y`).
    pub fn square(x: u32, y: u32, side: u32) -> Self {
        Self::new(x, y, x + side, y + side)
    }

    pub fn width(&self) -> u32 {
        self.x1.saturating_sub(self.x0)
    }

    pub fn height(&self) -> u32 {
        self.y1.saturating_sub(self.y0)
    }
}

/// Operations the identicon pipeline needs from a 2D raster library.
pub trait RasterBackend {
    type Surface;

    /// New true-color surface, painted black.
    fn create(&self, width: u32, height: u32) -> Result<Self::Surface, RasterError>;

    fn dimensions(&self, surface: &Self::Surface) -> (u32, u32);

    /// Solid fill; the parts of `rect` outside the surface are ignored.
    fn fill_rect(&self, surface: &mut Self::Surface, rect: Rect, color: Color);

    /// Rotate counter-clockwise by `angle_deg`. The result grows to hold
    /// the rotated content; uncovered pixels take `background`.
    fn rotate(
        &self,
        surface: &Self::Surface,
        angle_deg: f64,
        background: Color,
    ) -> Result<Self::Surface, RasterError>;

    /// Scale `region` of `surface` into a fresh `width` x `height` surface.
    fn resample(
        &self,
        surface: &Self::Surface,
        region: Rect,
        width: u32,
        height: u32,
    ) -> Result<Self::Surface, RasterError>;

    fn encode_png<W: Write>(&self, surface: &Self::Surface, writer: W) -> Result<(), RasterError>;
}

/// Default backend over `image::RgbImage`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageBackend;

impl RasterBackend for ImageBackend {
    type Surface = RgbImage;

    fn create(&self, width: u32, height: u32) -> Result<RgbImage, RasterError> {
        check_allocation(width, height)?;
        Ok(RgbImage::new(width, height))
    }

    fn dimensions(&self, surface: &RgbImage) -> (u32, u32) {
        surface.dimensions()
    }

    fn fill_rect(&self, surface: &mut RgbImage, rect: Rect, color: Color) {
        let (width, height) = surface.dimensions();
        let pixel = Rgb(color.channels());
        for y in rect.y0..rect.y1.min(height) {
            for x in rect.x0..rect.x1.min(width) {
                surface.put_pixel(x, y, pixel);
            }
        }
    }

    fn rotate(
        &self,
        surface: &RgbImage,
        angle_deg: f64,
        background: Color,
    ) -> Result<RgbImage, RasterError> {
        let quarter = angle_deg / 90.0;
        if (quarter - quarter.round()).abs() < 1e-9 {
            // exact path, no resampling
            return Ok(match (quarter.round() as i64).rem_euclid(4) {
                0 => surface.clone(),
                1 => imageops::rotate270(surface),
                2 => imageops::rotate180(surface),
                _ => imageops::rotate90(surface),
            });
        }
        self.rotate_bilinear(surface, angle_deg, background)
    }

    fn resample(
        &self,
        surface: &RgbImage,
        region: Rect,
        width: u32,
        height: u32,
    ) -> Result<RgbImage, RasterError> {
        let (src_w, src_h) = surface.dimensions();
        if region.width() == 0
            || region.height() == 0
            || region.x1 > src_w
            || region.y1 > src_h
        {
            return Err(RasterError::RegionOutOfBounds {
                region,
                width: src_w,
                height: src_h,
            });
        }
        check_allocation(width, height)?;

        let cropped = imageops::crop_imm(
            surface,
            region.x0,
            region.y0,
            region.width(),
            region.height(),
        )
        .to_image();
        Ok(imageops::resize(&cropped, width, height, FilterType::Triangle))
    }

    fn encode_png<W: Write>(&self, surface: &RgbImage, writer: W) -> Result<(), RasterError> {
        let (width, height) = surface.dimensions();
        PngEncoder::new(writer).write_image(surface.as_raw(), width, height, ColorType::Rgb8)?;
        Ok(())
    }
}

impl ImageBackend {
    fn rotate_bilinear(
        &self,
        surface: &RgbImage,
        angle_deg: f64,
        background: Color,
    ) -> Result<RgbImage, RasterError> {
        let (width, height) = surface.dimensions();
        check_allocation(width, height)?;
        let (sin, cos) = angle_deg.to_radians().sin_cos();
        let out_w = bounding_edge(width, height, cos, sin);
        let out_h = bounding_edge(height, width, cos, sin);
        let mut out = self.create(out_w, out_h)?;

        let (cx, cy) = (width as f64 / 2.0, height as f64 / 2.0);
        let (out_cx, out_cy) = (out_w as f64 / 2.0, out_h as f64 / 2.0);
        let background = background.channels();

        for (x, y, pixel) in out.enumerate_pixels_mut() {
            let dx = x as f64 + 0.5 - out_cx;
            let dy = y as f64 + 0.5 - out_cy;
            // inverse mapping; y grows downwards
            let sx = dx * cos - dy * sin + cx - 0.5;
            let sy = dx * sin + dy * cos + cy - 0.5;
            *pixel = Rgb(sample_bilinear(surface, sx, sy, background));
        }

        Ok(out)
    }
}

fn check_allocation(width: u32, height: u32) -> Result<(), RasterError> {
    let pixels = width as u64 * height as u64;
    if pixels == 0 || pixels > MAX_SURFACE_PIXELS {
        return Err(RasterError::Allocation { width, height });
    }
    Ok(())
}

fn bounding_edge(along: u32, across: u32, cos: f64, sin: f64) -> u32 {
    let edge = along as f64 * cos.abs() + across as f64 * sin.abs();
    (edge - 1e-6).ceil().max(1.0) as u32
}

/// Half a pixel of slack around the source area. Samples that close to
/// the content read the nearest edge pixel instead of the background.
const EDGE_SLACK: f64 = 0.5;

fn sample_bilinear(surface: &RgbImage, sx: f64, sy: f64, background: [u8; 3]) -> [u8; 3] {
    let (width, height) = surface.dimensions();
    let (max_x, max_y) = ((width - 1) as f64, (height - 1) as f64);
    // pixel centres sit on integers, so a pixel covers +-0.5 around its centre
    let reach = 0.5 + EDGE_SLACK;
    if sx < -reach || sy < -reach || sx > max_x + reach || sy > max_y + reach {
        return background;
    }

    let (sx, sy) = (sx.clamp(0.0, max_x), sy.clamp(0.0, max_y));
    let fetch = |x: f64, y: f64| -> [u8; 3] {
        surface.get_pixel(x.min(max_x) as u32, y.min(max_y) as u32).0
    };

    let (x0, y0) = (sx.floor(), sy.floor());
    let (fx, fy) = (sx - x0, sy - y0);
    let top_left = fetch(x0, y0);
    let top_right = fetch(x0 + 1.0, y0);
    let bottom_left = fetch(x0, y0 + 1.0);
    let bottom_right = fetch(x0 + 1.0, y0 + 1.0);

    let mut out = [0u8; 3];
    for c in 0..3 {
        let top = top_left[c] as f64 * (1.0 - fx) + top_right[c] as f64 * fx;
        let bottom = bottom_left[c] as f64 * (1.0 - fx) + bottom_right[c] as f64 * fx;
        let value = top * (1.0 - fy) + bottom * fy;
        out[c] = value.round().clamp(0.0, 255.0) as u8;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = Color::from_rgb(0xFF0000);
    const BLUE: Color = Color::from_rgb(0x0000FF);

    #[test]
    fn test_create_rejects_empty_and_huge() {
        let backend = ImageBackend;
        assert!(matches!(
            backend.create(0, 10),
            Err(RasterError::Allocation { width: 0, height: 10 })
        ));
        assert!(backend.create(1 << 15, 1 << 15).is_err());
        assert_eq!(backend.create(3, 2).unwrap().dimensions(), (3, 2));
    }

    #[test]
    fn test_fill_rect_is_half_open_and_clipped() {
        let backend = ImageBackend;
        let mut surface = backend.create(4, 4).unwrap();
        backend.fill_rect(&mut surface, Rect::new(1, 1, 3, 3), RED);
        assert_eq!(surface.get_pixel(1, 1).0, [255, 0, 0]);
        assert_eq!(surface.get_pixel(2, 2).0, [255, 0, 0]);
        assert_eq!(surface.get_pixel(3, 3).0, [0, 0, 0]);
        assert_eq!(surface.get_pixel(0, 0).0, [0, 0, 0]);

        backend.fill_rect(&mut surface, Rect::new(2, 2, 10, 10), BLUE);
        assert_eq!(surface.get_pixel(3, 3).0, [0, 0, 255]);
    }

    #[test]
    fn test_quarter_turn_is_counter_clockwise() {
        let backend = ImageBackend;
        let mut surface = backend.create(2, 1).unwrap();
        backend.fill_rect(&mut surface, Rect::new(1, 0, 2, 1), RED);
        // the red pixel on the right ends up on top
        let rotated = backend.rotate(&surface, 90.0, Color::BLACK).unwrap();
        assert_eq!(rotated.dimensions(), (1, 2));
        assert_eq!(rotated.get_pixel(0, 0).0, [255, 0, 0]);
        assert_eq!(rotated.get_pixel(0, 1).0, [0, 0, 0]);

        let full = backend.rotate(&surface, 360.0, Color::BLACK).unwrap();
        assert_eq!(full, surface);
    }

    #[test]
    fn test_tilt_grows_bounding_box() {
        let backend = ImageBackend;
        let mut surface = backend.create(100, 100).unwrap();
        backend.fill_rect(&mut surface, Rect::square(0, 0, 100), RED);
        let rotated = backend.rotate(&surface, 5.0, BLUE).unwrap();
        // 100 * (cos 5 + sin 5) = 108.3
        assert_eq!(rotated.dimensions(), (109, 109));
        assert_eq!(rotated.get_pixel(54, 54).0, [255, 0, 0]);
        assert_eq!(rotated.get_pixel(0, 0).0, [0, 0, 255]);
    }

    #[test]
    fn test_tilt_edge_reads_content_not_background() {
        let backend = ImageBackend;
        let mut surface = backend.create(4, 4).unwrap();
        backend.fill_rect(&mut surface, Rect::square(0, 0, 4), RED);
        let rotated = backend.rotate(&surface, 5.0, BLUE).unwrap();
        assert_eq!(rotated.dimensions(), (5, 5));
        // every pixel of the inner 4x4 lies within half a pixel of the content
        for y in 0..4 {
            for x in 0..4 {
                assert_eq!(rotated.get_pixel(x, y).0, [255, 0, 0], "({}, {})", x, y);
            }
        }
    }

    #[test]
    fn test_resample_solid_region_stays_solid() {
        let backend = ImageBackend;
        let mut surface = backend.create(40, 40).unwrap();
        backend.fill_rect(&mut surface, Rect::square(0, 0, 40), RED);
        let out = backend.resample(&surface, Rect::square(4, 4, 36), 20, 20).unwrap();
        assert_eq!(out.dimensions(), (20, 20));
        assert!(out.pixels().all(|p| p.0 == [255, 0, 0]));
    }

    #[test]
    fn test_resample_region_out_of_bounds() {
        let backend = ImageBackend;
        let surface = backend.create(10, 10).unwrap();
        assert!(matches!(
            backend.resample(&surface, Rect::square(5, 5, 6), 4, 4),
            Err(RasterError::RegionOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_encode_png_signature() {
        let backend = ImageBackend;
        let surface = backend.create(2, 2).unwrap();
        let mut bytes = Vec::new();
        backend.encode_png(&surface, &mut bytes).unwrap();
        assert_eq!(&bytes[..8], &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]);
    }
}
