use std::collections::BTreeMap;
use std::mem::size_of;

use bincode::config::{Configuration, Fixint, LittleEndian, NoLimit, WriteFixedArrayLength};
use bincode::{Decode, Encode};

// Use legacy encoding for fixed-width integers (field size needs to be constant so we can seek)
pub const BINCODE_CONFIG: Configuration<LittleEndian, Fixint, WriteFixedArrayLength, NoLimit> =
    bincode::config::legacy();

/// One recorded edit: a single pixel set to a palette color at one instant.
///
/// The wire layout is constant-width so a record stream can be chunked and
/// counted without parsing it.
#[derive(Encode, Decode, PartialEq, Eq, Debug, Clone, Copy)]
pub struct StoredPixelEdit {
    pub x: u16,
    pub y: u16,
    pub seconds_since_epoch: u32,
    pub color_index: u8,
}

impl StoredPixelEdit {
    pub const fn encoded_size() -> usize {
        size_of::<u16>() * 2 + size_of::<u32>() + size_of::<u8>()
    }

    pub fn write_into(&self, buf: &mut Vec<u8>) {
        bincode::encode_into_std_write(*self, buf, BINCODE_CONFIG).unwrap();
    }
}

#[derive(Encode, Decode, PartialEq, Eq, Debug, Clone)]
pub struct ChunkDescription {
    pub id: u32,
    pub up_to_seconds_since_epoch: u32,
    pub num_edits: u32,
}

/// Archive metadata: canvas bounds, palette, and the chunk table.
#[derive(Encode, Decode, PartialEq, Eq, Debug, Clone)]
pub struct CanvasMeta {
    pub width: u16,
    pub height: u16,
    pub num_edits: u64,
    pub data_start_seconds: u32,
    pub last_edit_seconds: u32,
    pub color_index_to_rgb: BTreeMap<u8, [u8; 3]>,
    pub chunk_descs: Vec<ChunkDescription>,
}
