#[derive(thiserror::Error, Debug)]
pub enum CanvasArchiveError {
    #[error("could not read archive: {0:?}")]
    MlaRead(mla::errors::Error),

    #[error("could not write archive: {0:?}")]
    MlaWrite(mla::errors::Error),

    #[error("archive is missing its meta file")]
    MissingMetaFile,

    #[error("could not decode the meta file")]
    CouldNotDecodeMetaFile,

    #[error("archive is missing its base image")]
    MissingBaseImage,

    #[error("could not decode the base image: {0}")]
    BaseImageDecode(#[from] image::ImageError),

    #[error("could not encode record: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(thiserror::Error, Debug)]
pub enum NextEditChunkError {
    #[error("no chunks left")]
    OutOfChunks,

    #[error("chunk file named in the meta chunk table is missing")]
    MissingChunkFile,

    #[error("could not fetch chunk file: {0:?}")]
    CouldNotFetchChunkFile(mla::errors::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
