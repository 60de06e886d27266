use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum IngestError {
    #[error("could not open source image {path}: {source}")]
    SourceImageUnavailable {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("malformed event record at byte {offset}: {detail}")]
    MalformedEventRecord { offset: u64, detail: String },

    #[error("record is missing column {index}")]
    MissingColumn { index: usize },

    #[error("could not parse timestamp {value:?}: {source}")]
    Timestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("could not parse color {value:?}")]
    Color { value: String },

    #[error("could not parse coordinates {value:?}")]
    Coordinates { value: String },

    #[error("input uses more than 256 distinct colors")]
    PaletteOverflow,

    #[error("archive palette indices are not dense")]
    SparsePalette,

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Engine(#[from] engine::EngineError),

    #[error(transparent)]
    Archive(#[from] archive::CanvasArchiveError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
