//! Ingestion collaborators: raw log and CSV decoding, base image loading,
//! and archive packing/unpacking glue around the engine.

mod errors;
mod load;
mod pack;
mod raw_log;

pub use crate::errors::IngestError;
pub use crate::load::{load_base_canvas, load_base_image, load_history_from_archive};
pub use crate::pack::{pack_csv, pack_raw};
pub use crate::raw_log::RawEditLogReader;

/// Constants of the 2017 reference dataset.
pub mod place2017 {
    /// First instant the edit log is authoritative for.
    pub const DATA_START_SECONDS: u32 = 1_490_986_860;
    /// Instant the canvas was frozen.
    pub const DATA_END_SECONDS: u32 = 1_491_238_721;
    pub const CANVAS_WIDTH: u16 = 1_000;
    pub const CANVAS_HEIGHT: u16 = 1_000;
}
