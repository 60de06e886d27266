use std::collections::BTreeMap;
use std::io::Write;

use mla::{config::ArchiveWriterConfig, ArchiveWriter};
use structures::{CanvasMeta, ChunkDescription, StoredPixelEdit, BINCODE_CONFIG};

use crate::errors::CanvasArchiveError;

// todo: make parameter
const NUM_CHUNKS: u32 = 64;

/// Packs a base image plus an edit log into a chunked archive.
///
/// Edits are buffered until [`finalize`](Self::finalize), sorted by
/// timestamp (stable, so arrival order survives among equal timestamps) and
/// split into fixed-count chunk files next to a `meta` file describing them.
pub struct CanvasArchiveWriter<'a, W: Write> {
    mla: ArchiveWriter<'a, W>,
    width: u16,
    height: u16,
    data_start_seconds: u32,
    color_index_to_rgb: BTreeMap<u8, [u8; 3]>,
    base_png: Option<Vec<u8>>,
    edits: Vec<StoredPixelEdit>,
}

impl<'a, W: Write> CanvasArchiveWriter<'a, W> {
    pub fn new(dest: W, width: u16, height: u16) -> Result<Self, CanvasArchiveError> {
        let mut config = ArchiveWriterConfig::new();
        config.disable_layer(mla::Layers::ENCRYPT);
        let mla = ArchiveWriter::from_config(dest, config).map_err(CanvasArchiveError::MlaWrite)?;

        Ok(CanvasArchiveWriter {
            mla,
            width,
            height,
            data_start_seconds: 0,
            color_index_to_rgb: BTreeMap::new(),
            base_png: None,
            edits: Vec::new(),
        })
    }

    pub fn set_palette(&mut self, entries: impl IntoIterator<Item = (u8, [u8; 3])>) {
        self.color_index_to_rgb = entries.into_iter().collect();
    }

    /// Encoded PNG bytes of the canvas state before any edits.
    pub fn set_base_png(&mut self, png: Vec<u8>) {
        self.base_png = Some(png);
    }

    pub fn set_data_start(&mut self, seconds: u32) {
        self.data_start_seconds = seconds;
    }

    pub fn add_edit(&mut self, edit: StoredPixelEdit) {
        self.edits.push(edit);
    }

    pub fn finalize(mut self) -> Result<(), CanvasArchiveError> {
        // Stable sort: later arrivals at the same instant stay later, and
        // queries depend on that order.
        self.edits.sort_by_key(|edit| edit.seconds_since_epoch);

        let num_edits_per_chunk = (self.edits.len() as u32 / NUM_CHUNKS).max(1);

        let mut chunk_descs: Vec<ChunkDescription> = Vec::new();
        for (i, edits) in self.edits.chunks(num_edits_per_chunk as usize).enumerate() {
            let mut edit_buf = Vec::with_capacity(edits.len() * StoredPixelEdit::encoded_size());
            for edit in edits {
                bincode::encode_into_std_write(*edit, &mut edit_buf, BINCODE_CONFIG)?;
            }

            self.mla
                .add_file(
                    format!("edits/{}", i).as_str(),
                    edit_buf.len() as u64,
                    edit_buf.as_slice(),
                )
                .map_err(CanvasArchiveError::MlaWrite)?;

            chunk_descs.push(ChunkDescription {
                id: i as u32,
                up_to_seconds_since_epoch: edits.last().map(|e| e.seconds_since_epoch).unwrap_or(0),
                num_edits: edits.len() as u32,
            });
        }

        let meta = CanvasMeta {
            width: self.width,
            height: self.height,
            num_edits: self.edits.len() as u64,
            data_start_seconds: self.data_start_seconds,
            last_edit_seconds: self
                .edits
                .last()
                .map(|e| e.seconds_since_epoch)
                .unwrap_or(self.data_start_seconds),
            color_index_to_rgb: self.color_index_to_rgb,
            chunk_descs,
        };

        let mut meta_buf = Vec::new();
        bincode::encode_into_std_write(meta, &mut meta_buf, BINCODE_CONFIG)?;
        self.mla
            .add_file("meta", meta_buf.len() as u64, meta_buf.as_slice())
            .map_err(CanvasArchiveError::MlaWrite)?;

        if let Some(png) = self.base_png {
            self.mla
                .add_file("base", png.len() as u64, png.as_slice())
                .map_err(CanvasArchiveError::MlaWrite)?;
        }

        self.mla.finalize().map_err(CanvasArchiveError::MlaWrite)?;
        log::debug!("finalized archive of {} edits", self.edits.len());
        Ok(())
    }
}
