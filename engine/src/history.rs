use structures::StoredPixelEdit;

use crate::canvas::BaseCanvas;
use crate::error::{EngineError, EngineResult};
use crate::index::EditIndex;
use crate::palette::Palette;

/// Build-time knobs for [`CanvasHistory`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    /// Earliest instant the edit log is authoritative for. Queries before it
    /// resolve to the base canvas; edits before it are kept in the index but
    /// never applied.
    pub data_start_seconds: u32,
    /// Fail the build with `UnorderedEventStream` when the global timestamp
    /// order regresses, instead of trusting the documented precondition.
    pub strict_order: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            data_start_seconds: 0,
            strict_order: false,
        }
    }
}

/// The read-only pair every query runs against: base canvas + edit index,
/// plus the palette both are expressed in.
///
/// Constructed once from external inputs, then shared freely (by reference or
/// `Arc`) across worker threads; nothing here mutates after the build.
#[derive(Debug)]
pub struct CanvasHistory {
    palette: Palette,
    base: BaseCanvas,
    index: EditIndex,
    data_start_seconds: u32,
}

impl CanvasHistory {
    pub fn new(
        palette: Palette,
        base: BaseCanvas,
        index: EditIndex,
        options: &EngineOptions,
    ) -> Self {
        Self {
            palette,
            base,
            index,
            data_start_seconds: options.data_start_seconds,
        }
    }

    /// Build the index from an edit stream and assemble the history in one go.
    pub fn build(
        palette: Palette,
        base: BaseCanvas,
        edits: impl IntoIterator<Item = StoredPixelEdit>,
        options: &EngineOptions,
    ) -> EngineResult<Self> {
        let index = EditIndex::from_edits(edits, &base, &palette, options)?;
        Ok(Self::new(palette, base, index, options))
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn base(&self) -> &BaseCanvas {
        &self.base
    }

    pub fn index(&self) -> &EditIndex {
        &self.index
    }

    pub fn width(&self) -> u16 {
        self.base.width()
    }

    pub fn height(&self) -> u16 {
        self.base.height()
    }

    pub fn data_start_seconds(&self) -> u32 {
        self.data_start_seconds
    }

    /// The color of `(x, y)` as it was at `seconds`.
    ///
    /// Binary-searches the pixel's history for the entry with the greatest
    /// `(timestamp, seq)` at or before the queried instant; falls back to the
    /// base canvas when nothing applies.
    pub fn color_at(&self, x: u16, y: u16, seconds: u32) -> EngineResult<u8> {
        if !self.base.contains(x, y) {
            return Err(EngineError::CoordinateOutOfBounds {
                x,
                y,
                width: self.base.width(),
                height: self.base.height(),
            });
        }

        let base_color = self.base.color_at(x, y);
        if seconds < self.data_start_seconds {
            return Ok(base_color);
        }

        let Some(history) = self.index.history(x, y) else {
            return Ok(base_color);
        };

        // Entries before the data-start threshold are present but ignored;
        // they form a prefix of the sorted history.
        let first_applied =
            history.partition_point(|e| e.seconds_since_epoch < self.data_start_seconds);
        let applied = &history[first_applied..];

        match applied.partition_point(|e| e.seconds_since_epoch <= seconds) {
            0 => Ok(base_color),
            n => Ok(applied[n - 1].color_index),
        }
    }

    /// [`color_at`](Self::color_at) resolved to its concrete triple.
    pub fn rgb_at(&self, x: u16, y: u16, seconds: u32) -> EngineResult<[u8; 3]> {
        let index = self.color_at(x, y, seconds)?;
        self.palette.index_to_rgb(index)
    }
}
