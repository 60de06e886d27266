/// Convenience result type used across the engine.
pub type EngineResult<T> = Result<T, EngineError>;

/// Error taxonomy for the canvas-history engine.
///
/// Build-phase data problems (unmapped colors, malformed histories) are kept
/// separate from query-time validation so callers can tell "your request is
/// bad" apart from "your dataset is bad".
#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    #[error("palette must have between 1 and 256 entries, got {len}")]
    InvalidPaletteSize { len: usize },

    #[error("palette entries {first} and {second} both map to {rgb:?}")]
    DuplicateColor { first: u8, second: u8, rgb: [u8; 3] },

    #[error("color index {index} is outside the {palette_len}-entry palette")]
    InvalidIndex { index: u8, palette_len: usize },

    #[error("color {rgb:?} is not a palette entry")]
    UnknownColor { rgb: [u8; 3] },

    #[error("base pixel at ({x}, {y}) has color {rgb:?} which is not in the palette")]
    UnmappedBaseColor { x: u32, y: u32, rgb: [u8; 3] },

    #[error("canvas of {width}x{height} exceeds the supported size")]
    CanvasTooLarge { width: u32, height: u32 },

    #[error("base canvas of {width}x{height} needs {expected} pixels, got {actual}")]
    DimensionMismatch {
        width: u16,
        height: u16,
        expected: usize,
        actual: usize,
    },

    #[error("coordinate ({x}, {y}) is outside the {width}x{height} canvas")]
    CoordinateOutOfBounds {
        x: u16,
        y: u16,
        width: u16,
        height: u16,
    },

    #[error("edit #{seq} has color index {index} outside the {palette_len}-entry palette")]
    InvalidColorIndex {
        seq: u64,
        index: u8,
        palette_len: usize,
    },

    #[error("edit #{seq} at {seconds}s arrived after an edit at {previous}s")]
    UnorderedEventStream { seq: u64, seconds: u32, previous: u32 },

    #[error("invalid region: {0}")]
    InvalidRegion(String),

    #[error("sequence must contain at least one frame")]
    EmptySequence,

    #[error("playback rate must be at least 1 fps, got {fps}")]
    InvalidFrameRate { fps: u16 },

    #[error("timestamp of frame {frame} overflows ({start}s + {frame} * {step}s)")]
    TimestampOverflow { frame: u32, start: u32, step: u32 },

    #[error("frame {frame} at {seconds}s failed")]
    FrameFailed {
        frame: u32,
        seconds: u32,
        #[source]
        source: Box<EngineError>,
    },

    #[error("render cancelled before frame {frame}")]
    Cancelled { frame: u32 },

    #[error("frame sink error: {0}")]
    FrameSink(String),
}

impl EngineError {
    /// Build an [`EngineError::InvalidRegion`] value.
    pub fn invalid_region(reason: impl Into<String>) -> Self {
        Self::InvalidRegion(reason.into())
    }

    /// Build an [`EngineError::FrameSink`] value.
    pub fn frame_sink(reason: impl Into<String>) -> Self {
        Self::FrameSink(reason.into())
    }
}
