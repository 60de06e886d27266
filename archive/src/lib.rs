mod archive_reader;
mod archive_writer;
mod errors;

pub use crate::archive_reader::CanvasArchiveReader;
pub use crate::archive_writer::CanvasArchiveWriter;
pub use crate::errors::{CanvasArchiveError, NextEditChunkError};
