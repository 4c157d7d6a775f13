//! This module contains utilities for decoding tile images and persisting them to disk.

use std::path::Path;

use image::{DynamicImage, ImageFormat, RgbaImage};

use crate::error::TileFetchError;

/// An image that has been loaded into memory.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    /// Raw bytes of the image, in RGBA order.
    bytes: Vec<u8>,
    /// Width and height of the image.
    dimensions: (u32, u32),
}

impl DecodedImage {
    /// Decode an image from a byte slice.
    ///
    /// Attempts to guess the format of the image from the data. Non-RGBA images
    /// will be converted to RGBA.
    pub fn decode(bytes: &[u8]) -> Result<Self, TileFetchError> {
        let decoded = image::load_from_memory(bytes)?;
        Ok(Self::from_dynamic(decoded))
    }

    /// Reads and decodes an image file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, TileFetchError> {
        let decoded = image::open(path)?;
        Ok(Self::from_dynamic(decoded))
    }

    /// Creates an image from raw RGBA bytes.
    ///
    /// Returns an error if the length of `bytes` does not match the dimensions.
    pub fn from_raw(bytes: Vec<u8>, width: u32, height: u32) -> Result<Self, TileFetchError> {
        if bytes.len() as u64 != u64::from(width) * u64::from(height) * 4 {
            return Err(TileFetchError::Generic(format!(
                "{} bytes do not make an RGBA image of size {width}x{height}",
                bytes.len()
            )));
        }

        Ok(Self {
            bytes,
            dimensions: (width, height),
        })
    }

    fn from_dynamic(decoded: DynamicImage) -> Self {
        let rgba = decoded.to_rgba8();
        let dimensions = rgba.dimensions();
        Self {
            bytes: rgba.into_raw(),
            dimensions,
        }
    }

    /// Width of the image in pixels.
    pub fn width(&self) -> u32 {
        self.dimensions.0
    }

    /// Height of the image in pixels.
    pub fn height(&self) -> u32 {
        self.dimensions.1
    }

    /// Pixel data in RGBA order, row by row.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Writes the image to the given path as JPEG, replacing the existing file.
    ///
    /// JPEG has no alpha channel, so transparency is dropped.
    pub fn save_jpeg(&self, path: impl AsRef<Path>) -> Result<(), TileFetchError> {
        let (width, height) = self.dimensions;
        let rgba = RgbaImage::from_raw(width, height, self.bytes.clone())
            .ok_or_else(|| TileFetchError::Generic("image buffer size mismatch".into()))?;
        let rgb = DynamicImage::ImageRgba8(rgba).to_rgb8();
        rgb.save_with_format(path, ImageFormat::Jpeg)?;

        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::io::Cursor;

    use assert_matches::assert_matches;
    use image::{ImageOutputFormat, Rgb, RgbImage};

    use super::*;

    /// PNG encoded solid color image.
    pub(crate) fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let image = RgbImage::from_pixel(width, height, Rgb([200, 30, 60]));
        let mut bytes = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(image)
            .write_to(&mut bytes, ImageOutputFormat::Png)
            .expect("failed to encode test image");
        bytes.into_inner()
    }

    #[test]
    fn decodes_png() {
        let image = DecodedImage::decode(&png_bytes(4, 2)).unwrap();
        assert_eq!(image.width(), 4);
        assert_eq!(image.height(), 2);
        assert_eq!(image.bytes().len(), 4 * 2 * 4);
        assert_eq!(&image.bytes()[0..4], &[200, 30, 60, 255]);
    }

    #[test]
    fn rejects_garbage() {
        assert_matches!(
            DecodedImage::decode(b"<html>not found</html>"),
            Err(TileFetchError::Image(_))
        );
    }

    #[test]
    fn from_raw_checks_size() {
        assert!(DecodedImage::from_raw(vec![0; 16], 2, 2).is_ok());
        assert!(DecodedImage::from_raw(vec![0; 15], 2, 2).is_err());
    }

    #[test]
    fn jpeg_round_trip_keeps_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tile.jpg");

        let image = DecodedImage::decode(&png_bytes(16, 8)).unwrap();
        image.save_jpeg(&path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[0..2], &[0xFF, 0xD8]);

        let loaded = DecodedImage::open(&path).unwrap();
        assert_eq!((loaded.width(), loaded.height()), (16, 8));
    }
}
