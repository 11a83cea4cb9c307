// ============================================================================
// IMAGE I/O — decode files into pixel buffers and encode them back out
// ============================================================================

use image::codecs::bmp::BmpEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ColorType, DynamicImage, ImageEncoder, ImageError, RgbaImage};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::pixels::PixelBuffer;

/// Output formats supported by [`save_buffer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SaveFormat {
    #[default]
    Png,
    Jpeg,
    Bmp,
    Tiff,
}

/// Compression options for TIFF format
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TiffCompression {
    #[default]
    None,
    Lzw,
    Deflate,
}

impl SaveFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            SaveFormat::Png => "png",
            SaveFormat::Jpeg => "jpg",
            SaveFormat::Bmp => "bmp",
            SaveFormat::Tiff => "tiff",
        }
    }

    /// Parse a format name or file extension (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "png" => Some(SaveFormat::Png),
            "jpeg" | "jpg" => Some(SaveFormat::Jpeg),
            "bmp" => Some(SaveFormat::Bmp),
            "tiff" | "tif" => Some(SaveFormat::Tiff),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_name)
    }
}

impl TiffCompression {
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "lzw" => TiffCompression::Lzw,
            "deflate" => TiffCompression::Deflate,
            _ => TiffCompression::None,
        }
    }
}

/// Decode an image file into an RGBA8 pixel buffer.
pub fn load_buffer(path: &Path) -> Result<PixelBuffer, ImageError> {
    let img = image::open(path)?.to_rgba8();
    PixelBuffer::from_rgba_image(&img).ok_or_else(|| {
        ImageError::IoError(std::io::Error::other(format!(
            "{} decoded to an empty image",
            path.display()
        )))
    })
}

/// Encode `buffer` to `path` in the given format.
pub fn save_buffer(
    buffer: &PixelBuffer,
    path: &Path,
    format: SaveFormat,
    quality: u8,
    tiff_compression: TiffCompression,
) -> Result<(), ImageError> {
    encode_and_write(&buffer.to_rgba_image(), path, format, quality, tiff_compression)
}

fn encode_and_write(
    image: &RgbaImage,
    path: &Path,
    format: SaveFormat,
    quality: u8,
    tiff_compression: TiffCompression,
) -> Result<(), ImageError> {
    let mut writer = BufWriter::new(File::create(path)?);
    let (w, h) = image.dimensions();

    match format {
        SaveFormat::Png => {
            PngEncoder::new(&mut writer).write_image(image.as_raw(), w, h, ColorType::Rgba8)?
        }
        SaveFormat::Jpeg => {
            // No alpha in JPEG
            let rgb = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
            JpegEncoder::new_with_quality(&mut writer, quality.clamp(1, 100))
                .write_image(rgb.as_raw(), w, h, ColorType::Rgb8)?
        }
        SaveFormat::Bmp => {
            BmpEncoder::new(&mut writer).write_image(image.as_raw(), w, h, ColorType::Rgba8)?
        }
        SaveFormat::Tiff => write_tiff(&mut writer, image, tiff_compression)?,
    }

    writer.flush()?;
    Ok(())
}

fn write_tiff<W: std::io::Write + std::io::Seek>(
    writer: &mut W,
    image: &RgbaImage,
    compression: TiffCompression,
) -> Result<(), ImageError> {
    use tiff::encoder::{TiffEncoder, colortype::RGBA8, compression as tc};

    let err_map = |e: tiff::TiffError| {
        ImageError::IoError(std::io::Error::other(format!("TIFF encode error: {}", e)))
    };
    let mut enc = TiffEncoder::new(writer).map_err(err_map)?;
    let (w, h) = (image.width(), image.height());
    let written = match compression {
        TiffCompression::None => enc.write_image::<RGBA8>(w, h, image.as_raw()),
        TiffCompression::Lzw => enc.write_image_with_compression::<RGBA8, _>(w, h, tc::Lzw, image.as_raw()),
        TiffCompression::Deflate => {
            enc.write_image_with_compression::<RGBA8, _>(w, h, tc::Deflate::default(), image.as_raw())
        }
    };
    written.map_err(err_map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixels::Pixel;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("filterer-io-{}-{}", std::process::id(), name))
    }

    #[test]
    fn format_lookup() {
        assert_eq!(SaveFormat::from_name("JPG"), Some(SaveFormat::Jpeg));
        assert_eq!(SaveFormat::from_name("tif"), Some(SaveFormat::Tiff));
        assert_eq!(SaveFormat::from_name("gif"), None);
        assert_eq!(SaveFormat::from_name("tga"), None);
        assert_eq!(SaveFormat::from_path(Path::new("a/b.PNG")), Some(SaveFormat::Png));
        assert_eq!(SaveFormat::Jpeg.extension(), "jpg");
    }

    #[test]
    fn png_save_then_load_is_lossless() {
        let mut buf = PixelBuffer::new(3, 2, Pixel::new(10, 20, 30, 255)).unwrap();
        buf.set(1, 1, Pixel::new(200, 100, 50, 128));
        let path = temp_path("lossless.png");
        save_buffer(&buf, &path, SaveFormat::Png, 90, TiffCompression::None).unwrap();
        let loaded = load_buffer(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded, buf);
    }

    #[test]
    fn tiff_lzw_save_then_load() {
        let buf = PixelBuffer::new(4, 4, Pixel::new(1, 2, 3, 4)).unwrap();
        let path = temp_path("lzw.tiff");
        save_buffer(&buf, &path, SaveFormat::Tiff, 90, TiffCompression::Lzw).unwrap();
        let loaded = load_buffer(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded, buf);
    }

    #[test]
    fn bmp_save_then_load_is_lossless() {
        let mut buf = PixelBuffer::new(5, 3, Pixel::new(40, 80, 120, 255)).unwrap();
        buf.set(4, 2, Pixel::new(255, 0, 7, 255));
        buf.set(0, 1, Pixel::new(0, 0, 0, 255));
        let path = temp_path("lossless.bmp");
        save_buffer(&buf, &path, SaveFormat::Bmp, 90, TiffCompression::None).unwrap();
        let loaded = load_buffer(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded, buf);
    }

    #[test]
    fn jpeg_keeps_size_and_drops_alpha() {
        let buf = PixelBuffer::new(16, 8, Pixel::new(200, 60, 30, 90)).unwrap();
        let path = temp_path("solid.jpg");
        save_buffer(&buf, &path, SaveFormat::Jpeg, 95, TiffCompression::None).unwrap();
        let loaded = load_buffer(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!((loaded.width(), loaded.height()), (16, 8));
        let close = |a: u8, b: u8| (a as i32 - b as i32).abs() <= 3;
        for p in loaded.pixels() {
            assert!(close(p.red, 200) && close(p.green, 60) && close(p.blue, 30), "{:?}", p);
            assert_eq!(p.alpha, 255);
        }
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_buffer(&temp_path("does-not-exist.png")).is_err());
    }
}
