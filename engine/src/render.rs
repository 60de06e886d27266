use image::RgbImage;
use rayon::prelude::*;

use crate::error::{EngineError, EngineResult};
use crate::history::CanvasHistory;
use crate::palette::Palette;

/// A rectangle of the canvas with inclusive corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x1: u16,
    pub y1: u16,
    pub x2: u16,
    pub y2: u16,
}

impl Region {
    pub fn new(x1: u16, y1: u16, x2: u16, y2: u16) -> EngineResult<Self> {
        if x2 <= x1 {
            return Err(EngineError::invalid_region(format!(
                "x2 ({x2}) must be greater than x1 ({x1})"
            )));
        }
        if y2 <= y1 {
            return Err(EngineError::invalid_region(format!(
                "y2 ({y2}) must be greater than y1 ({y1})"
            )));
        }
        Ok(Self { x1, y1, x2, y2 })
    }

    /// The whole canvas. `width` and `height` must be at least 2 to form a
    /// non-degenerate rectangle.
    pub fn full(width: u16, height: u16) -> EngineResult<Self> {
        Self::new(0, 0, width.saturating_sub(1), height.saturating_sub(1))
    }

    pub fn width(&self) -> u32 {
        (self.x2 - self.x1) as u32 + 1
    }

    pub fn height(&self) -> u32 {
        (self.y2 - self.y1) as u32 + 1
    }

    pub fn num_pixels(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }
}

/// A materialized raster of color indices for one region at one instant.
/// Fully derived; the engine never caches these across calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    region: Region,
    seconds: u32,
    colors: Vec<u8>,
}

impl Snapshot {
    pub fn region(&self) -> Region {
        self.region
    }

    pub fn seconds(&self) -> u32 {
        self.seconds
    }

    pub fn width(&self) -> u32 {
        self.region.width()
    }

    pub fn height(&self) -> u32 {
        self.region.height()
    }

    /// Color index at region-local coordinates.
    pub fn color_at(&self, dx: u32, dy: u32) -> u8 {
        self.colors[(dy * self.width() + dx) as usize]
    }

    pub fn colors(&self) -> &[u8] {
        &self.colors
    }

    /// Materialize concrete triples for an encoder.
    pub fn to_image(&self, palette: &Palette) -> EngineResult<RgbImage> {
        let mut image = RgbImage::new(self.width(), self.height());
        for (dy, row) in self.colors.chunks(self.width() as usize).enumerate() {
            for (dx, index) in row.iter().enumerate() {
                let rgb = palette.index_to_rgb(*index)?;
                image.put_pixel(dx as u32, dy as u32, image::Rgb(rgb));
            }
        }
        Ok(image)
    }
}

impl CanvasHistory {
    pub(crate) fn check_region(&self, region: Region) -> EngineResult<()> {
        // Re-validate shape: Region's fields are public, so a degenerate
        // value can reach us without going through Region::new.
        Region::new(region.x1, region.y1, region.x2, region.y2)?;

        for (x, y) in [(region.x1, region.y1), (region.x2, region.y2)] {
            if !self.base().contains(x, y) {
                return Err(EngineError::CoordinateOutOfBounds {
                    x,
                    y,
                    width: self.width(),
                    height: self.height(),
                });
            }
        }
        Ok(())
    }

    /// Fill a raster for `region` as it was at `seconds`.
    ///
    /// Rows are evaluated in parallel; no cell depends on any other, so the
    /// result is deterministic regardless of scheduling.
    pub fn render(&self, region: Region, seconds: u32) -> EngineResult<Snapshot> {
        self.check_region(region)?;

        let width = region.width() as usize;
        let rows = (0..region.height())
            .into_par_iter()
            .map(|dy| {
                let y = region.y1 + dy as u16;
                let mut row = Vec::with_capacity(width);
                for x in region.x1..=region.x2 {
                    row.push(self.color_at(x, y, seconds)?);
                }
                Ok(row)
            })
            .collect::<EngineResult<Vec<Vec<u8>>>>()?;

        Ok(Snapshot {
            region,
            seconds,
            colors: rows.concat(),
        })
    }
}
