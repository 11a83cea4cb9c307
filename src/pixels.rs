// ============================================================================
// PIXEL BUFFER — flat row-major RGBA8 storage
// ============================================================================

use image::{Rgba, RgbaImage};
use rayon::prelude::*;

/// One RGBA8 pixel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Pixel {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}

impl Pixel {
    pub const fn new(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self { red, green, blue, alpha }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.red, self.green, self.blue, self.alpha]
    }
}

impl From<[u8; 4]> for Pixel {
    fn from([red, green, blue, alpha]: [u8; 4]) -> Self {
        Self { red, green, blue, alpha }
    }
}

impl From<Rgba<u8>> for Pixel {
    fn from(px: Rgba<u8>) -> Self {
        Self::from(px.0)
    }
}

impl From<Pixel> for Rgba<u8> {
    fn from(px: Pixel) -> Self {
        Rgba(px.to_array())
    }
}

/// Decoded bitmap: `width * height` pixels in row-major order
/// (pixel `(x, y)` lives at `y * width + x`).
///
/// The pixel count never changes after construction; filter passes write
/// back in place.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Pixel>,
}

impl PixelBuffer {
    /// Buffer of the given size filled with `fill`.  Returns `None` for a
    /// zero dimension.
    pub fn new(width: u32, height: u32, fill: Pixel) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        let count = width as usize * height as usize;
        Some(Self { width, height, pixels: vec![fill; count] })
    }

    /// Wrap an existing pixel vector.  `None` if the length does not match.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Pixel>) -> Option<Self> {
        if width == 0 || height == 0 || pixels.len() != width as usize * height as usize {
            return None;
        }
        Some(Self { width, height, pixels })
    }

    /// Build from interleaved RGBA8 bytes (4 bytes per pixel).
    pub fn from_raw(width: u32, height: u32, raw: &[u8]) -> Option<Self> {
        if raw.len() != width as usize * height as usize * 4 {
            return None;
        }
        let pixels = raw
            .chunks_exact(4)
            .map(|c| Pixel::new(c[0], c[1], c[2], c[3]))
            .collect();
        Self::from_pixels(width, height, pixels)
    }

    pub fn from_rgba_image(img: &RgbaImage) -> Option<Self> {
        Self::from_raw(img.width(), img.height(), img.as_raw())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y as usize * self.width as usize + x as usize)
    }

    pub fn get(&self, x: u32, y: u32) -> Option<Pixel> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Overwrite one pixel.  Returns `false` when `(x, y)` is out of bounds.
    pub fn set(&mut self, x: u32, y: u32, px: Pixel) -> bool {
        match self.index(x, y) {
            Some(i) => {
                self.pixels[i] = px;
                true
            }
            None => false,
        }
    }

    /// Replace every pixel with `transform(pixel)`, in place.
    /// Rows are processed in parallel; each pixel is independent.
    pub fn map_pixels<F>(&mut self, transform: F)
    where
        F: Fn(Pixel) -> Pixel + Sync,
    {
        let stride = self.width as usize;
        self.pixels.par_chunks_mut(stride).for_each(|row| {
            for px in row.iter_mut() {
                *px = transform(*px);
            }
        });
    }

    /// Interleaved RGBA8 bytes.
    pub fn to_raw(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|p| p.to_array()).collect()
    }

    pub fn to_rgba_image(&self) -> RgbaImage {
        RgbaImage::from_fn(self.width, self.height, |x, y| {
            self.pixels[y as usize * self.width as usize + x as usize].into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_dimensions_are_rejected() {
        assert!(PixelBuffer::new(0, 4, Pixel::default()).is_none());
        assert!(PixelBuffer::new(4, 0, Pixel::default()).is_none());
        assert!(PixelBuffer::from_raw(0, 0, &[]).is_none());
    }

    #[test]
    fn from_raw_checks_length() {
        assert!(PixelBuffer::from_raw(2, 1, &[0; 7]).is_none());
        let buf = PixelBuffer::from_raw(2, 1, &[1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        assert_eq!(buf.get(1, 0), Some(Pixel::new(5, 6, 7, 8)));
        assert_eq!(buf.to_raw(), vec![1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn indexing_is_row_major() {
        let mut buf = PixelBuffer::new(3, 2, Pixel::default()).unwrap();
        assert!(buf.set(2, 1, Pixel::new(9, 9, 9, 9)));
        assert_eq!(buf.pixels()[3 + 2], Pixel::new(9, 9, 9, 9));
        assert!(!buf.set(3, 0, Pixel::default()));
        assert_eq!(buf.get(0, 2), None);
    }

    #[test]
    fn rgba_image_bridge_preserves_pixels() {
        let img = RgbaImage::from_fn(3, 2, |x, y| Rgba([x as u8, y as u8, 7, 200]));
        let buf = PixelBuffer::from_rgba_image(&img).unwrap();
        assert_eq!(buf.get(2, 1), Some(Pixel::new(2, 1, 7, 200)));
        assert_eq!(buf.to_rgba_image(), img);
    }

    #[test]
    fn map_pixels_keeps_length() {
        let mut buf = PixelBuffer::new(5, 3, Pixel::new(1, 2, 3, 4)).unwrap();
        buf.map_pixels(|p| Pixel { red: p.red + 1, ..p });
        assert_eq!(buf.len(), 15);
        assert!(buf.pixels().iter().all(|p| *p == Pixel::new(2, 2, 3, 4)));
    }
}
