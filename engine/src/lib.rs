//! Point-in-time canvas reconstruction.
//!
//! Builds a per-pixel edit index from a chronological edit log, answers
//! "what color was this pixel at time T" queries against it, and renders
//! rectangular snapshots, frame sequences, and timelapse animations.

mod canvas;
mod error;
mod history;
mod index;
mod palette;
mod render;
mod timelapse;

pub use crate::canvas::BaseCanvas;
pub use crate::error::{EngineError, EngineResult};
pub use crate::history::{CanvasHistory, EngineOptions};
pub use crate::index::{EditIndex, EditIndexBuilder, HistoryEntry};
pub use crate::palette::Palette;
pub use crate::render::{Region, Snapshot};
pub use crate::timelapse::{FrameSink, SequencePlan};

pub use structures::StoredPixelEdit;
