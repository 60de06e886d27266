use std::collections::HashMap;

use rayon::prelude::*;
use structures::StoredPixelEdit;

use crate::canvas::BaseCanvas;
use crate::error::{EngineError, EngineResult};
use crate::history::EngineOptions;
use crate::palette::Palette;

/// One applied edit in a pixel's history. `seq` is the edit's position in the
/// original arrival order, assigned globally across all pixels; for equal
/// timestamps the larger `seq` is authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryEntry {
    pub seconds_since_epoch: u32,
    pub color_index: u8,
    pub seq: u64,
}

/// Per-pixel edit histories, sorted by `(timestamp, seq)` ascending.
///
/// Built once from the full edit stream, read-only afterwards. Pixels that
/// were never edited are absent.
#[derive(Debug, Default)]
pub struct EditIndex {
    histories: HashMap<(u16, u16), Vec<HistoryEntry>>,
    num_edits: u64,
    last_edit_seconds: u32,
}

impl EditIndex {
    pub fn from_edits(
        edits: impl IntoIterator<Item = StoredPixelEdit>,
        canvas: &BaseCanvas,
        palette: &Palette,
        options: &EngineOptions,
    ) -> EngineResult<Self> {
        let mut builder = EditIndexBuilder::new(canvas, palette, options);
        for edit in edits {
            builder.push(edit)?;
        }
        Ok(builder.finish())
    }

    pub fn history(&self, x: u16, y: u16) -> Option<&[HistoryEntry]> {
        self.histories.get(&(x, y)).map(Vec::as_slice)
    }

    pub fn num_edits(&self) -> u64 {
        self.num_edits
    }

    pub fn num_edited_pixels(&self) -> usize {
        self.histories.len()
    }

    pub fn last_edit_seconds(&self) -> u32 {
        self.last_edit_seconds
    }
}

/// Incremental [`EditIndex`] construction with build-time validation.
pub struct EditIndexBuilder {
    width: u16,
    height: u16,
    palette_len: usize,
    strict_order: bool,
    histories: HashMap<(u16, u16), Vec<HistoryEntry>>,
    next_seq: u64,
    last_edit_seconds: u32,
}

impl EditIndexBuilder {
    pub fn new(canvas: &BaseCanvas, palette: &Palette, options: &EngineOptions) -> Self {
        Self {
            width: canvas.width(),
            height: canvas.height(),
            palette_len: palette.len(),
            strict_order: options.strict_order,
            histories: HashMap::new(),
            next_seq: 0,
            last_edit_seconds: 0,
        }
    }

    pub fn push(&mut self, edit: StoredPixelEdit) -> EngineResult<()> {
        let seq = self.next_seq;

        if edit.x >= self.width || edit.y >= self.height {
            return Err(EngineError::CoordinateOutOfBounds {
                x: edit.x,
                y: edit.y,
                width: self.width,
                height: self.height,
            });
        }
        if edit.color_index as usize >= self.palette_len {
            return Err(EngineError::InvalidColorIndex {
                seq,
                index: edit.color_index,
                palette_len: self.palette_len,
            });
        }
        if self.strict_order && edit.seconds_since_epoch < self.last_edit_seconds {
            return Err(EngineError::UnorderedEventStream {
                seq,
                seconds: edit.seconds_since_epoch,
                previous: self.last_edit_seconds,
            });
        }

        self.histories
            .entry((edit.x, edit.y))
            .or_default()
            .push(HistoryEntry {
                seconds_since_epoch: edit.seconds_since_epoch,
                color_index: edit.color_index,
                seq,
            });

        self.next_seq += 1;
        self.last_edit_seconds = self.last_edit_seconds.max(edit.seconds_since_epoch);
        Ok(())
    }

    pub fn finish(mut self) -> EditIndex {
        // A stable no-op pass for time-ordered input; each pixel's history is
        // independent, so the sort shards cleanly across workers.
        self.histories
            .par_iter_mut()
            .for_each(|(_, history)| {
                history.sort_unstable_by_key(|entry| (entry.seconds_since_epoch, entry.seq))
            });

        log::info!(
            "indexed {} edits across {} pixels",
            self.next_seq,
            self.histories.len()
        );

        EditIndex {
            histories: self.histories,
            num_edits: self.next_seq,
            last_edit_seconds: self.last_edit_seconds,
        }
    }
}
