use image::RgbImage;

use crate::error::{EngineError, EngineResult};
use crate::palette::Palette;

/// Immutable canvas state before any logged edits, stored as row-major
/// palette indices. Built once during ingestion; queries only read it.
#[derive(Debug, Clone)]
pub struct BaseCanvas {
    width: u16,
    height: u16,
    pixels: Vec<u8>,
}

impl BaseCanvas {
    /// Convert a decoded base image into palette indices.
    ///
    /// A pixel outside the palette aborts the build; silently substituting a
    /// default would corrupt every derived query.
    pub fn from_image(image: &RgbImage, palette: &Palette) -> EngineResult<Self> {
        let (width, height) = image.dimensions();
        if width > u16::MAX as u32 || height > u16::MAX as u32 {
            return Err(EngineError::CanvasTooLarge { width, height });
        }

        let mut pixels = Vec::with_capacity(width as usize * height as usize);
        for (x, y, rgb) in image.enumerate_pixels() {
            let index = palette
                .rgb_to_index(rgb.0)
                .map_err(|_| EngineError::UnmappedBaseColor { x, y, rgb: rgb.0 })?;
            pixels.push(index);
        }

        Ok(Self {
            width: width as u16,
            height: height as u16,
            pixels,
        })
    }

    /// Build from already-indexed pixels, e.g. out of an archive.
    pub fn from_indices(
        width: u16,
        height: u16,
        pixels: Vec<u8>,
        palette: &Palette,
    ) -> EngineResult<Self> {
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(EngineError::DimensionMismatch {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }

        for index in &pixels {
            if !palette.contains_index(*index) {
                return Err(EngineError::InvalidIndex {
                    index: *index,
                    palette_len: palette.len(),
                });
            }
        }

        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn contains(&self, x: u16, y: u16) -> bool {
        x < self.width && y < self.height
    }

    /// Color index at `(x, y)`. Callers validate bounds first.
    pub fn color_at(&self, x: u16, y: u16) -> u8 {
        debug_assert!(self.contains(x, y));
        self.pixels[y as usize * self.width as usize + x as usize]
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_every_pixel_through_the_palette() {
        let palette = Palette::place_2017();
        let mut image = RgbImage::from_pixel(3, 2, image::Rgb([255, 255, 255]));
        image.put_pixel(2, 1, image::Rgb([229, 0, 0]));

        let canvas = BaseCanvas::from_image(&image, &palette).unwrap();
        assert_eq!(canvas.width(), 3);
        assert_eq!(canvas.height(), 2);
        assert_eq!(canvas.color_at(0, 0), 0);
        assert_eq!(canvas.color_at(2, 1), 5);
    }

    #[test]
    fn unmapped_base_pixel_aborts_with_coordinate() {
        let palette = Palette::place_2017();
        let mut image = RgbImage::new(2, 2);
        image.put_pixel(1, 0, image::Rgb([1, 2, 3]));
        image.put_pixel(0, 0, image::Rgb([255, 255, 255]));
        image.put_pixel(0, 1, image::Rgb([255, 255, 255]));
        image.put_pixel(1, 1, image::Rgb([255, 255, 255]));

        let err = BaseCanvas::from_image(&image, &palette).unwrap_err();
        assert!(matches!(
            err,
            EngineError::UnmappedBaseColor {
                x: 1,
                y: 0,
                rgb: [1, 2, 3]
            }
        ));
    }

    #[test]
    fn indexed_pixels_are_validated() {
        let palette = Palette::place_2017();

        assert!(matches!(
            BaseCanvas::from_indices(2, 2, vec![0; 3], &palette),
            Err(EngineError::DimensionMismatch { expected: 4, actual: 3, .. })
        ));
        assert!(matches!(
            BaseCanvas::from_indices(2, 2, vec![0, 1, 2, 16], &palette),
            Err(EngineError::InvalidIndex { index: 16, .. })
        ));
    }
}
