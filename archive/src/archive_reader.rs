use std::io::{Cursor, Read, Seek};

use image::RgbImage;
use mla::ArchiveReader;
use structures::{CanvasMeta, StoredPixelEdit, BINCODE_CONFIG};

use crate::errors::{CanvasArchiveError, NextEditChunkError};

/// Streams an archive back out: `meta` is parsed eagerly on open, the base
/// image on demand, and the edit log lazily as an iterator walking the chunk
/// files in order.
pub struct CanvasArchiveReader<'a, R: Read + Seek> {
    mla: ArchiveReader<'a, R>,
    pub meta: CanvasMeta,
    current_chunk_id: Option<u32>,
    current_chunk_data: Option<Cursor<Vec<u8>>>,
}

impl<'a, R: Read + Seek + 'a> CanvasArchiveReader<'a, R> {
    pub fn new(reader: R) -> Result<Self, CanvasArchiveError> {
        let mut mla = match ArchiveReader::new(reader) {
            Ok(mla) => mla,
            Err(err) => return Err(CanvasArchiveError::MlaRead(err)),
        };

        let mut meta_file = match mla.get_file("meta".to_string()) {
            Ok(Some(meta_file)) => meta_file,
            Ok(None) => return Err(CanvasArchiveError::MissingMetaFile),
            Err(_) => return Err(CanvasArchiveError::MissingMetaFile),
        };

        let meta: CanvasMeta =
            match bincode::decode_from_std_read(&mut meta_file.data, BINCODE_CONFIG) {
                Ok(meta) => meta,
                Err(_) => return Err(CanvasArchiveError::CouldNotDecodeMetaFile),
            };

        Ok(Self {
            mla,
            meta,
            current_chunk_id: None,
            current_chunk_data: None,
        })
    }

    /// Decode the stored base PNG.
    pub fn base_image(&mut self) -> Result<RgbImage, CanvasArchiveError> {
        let mut base_file = match self.mla.get_file("base".to_string()) {
            Ok(Some(base_file)) => base_file,
            Ok(None) => return Err(CanvasArchiveError::MissingBaseImage),
            Err(err) => return Err(CanvasArchiveError::MlaRead(err)),
        };

        let mut buf = Vec::new();
        base_file.data.read_to_end(&mut buf)?;

        let image = image::load_from_memory_with_format(&buf, image::ImageFormat::Png)?;
        Ok(image.to_rgb8())
    }

    fn get_next_chunk_data(&mut self) -> Result<(), NextEditChunkError> {
        let chunk_id = match self.current_chunk_id {
            Some(id) => id + 1,
            None => 0,
        };

        if chunk_id >= self.meta.chunk_descs.len() as u32 {
            return Err(NextEditChunkError::OutOfChunks);
        }

        let chunk_file_name = format!("edits/{}", chunk_id);

        let mut current_chunk_file = match self.mla.get_file(chunk_file_name) {
            Ok(Some(chunk_file)) => chunk_file,
            Ok(None) => return Err(NextEditChunkError::MissingChunkFile),
            Err(err) => return Err(NextEditChunkError::CouldNotFetchChunkFile(err)),
        };

        self.current_chunk_id = Some(chunk_id);

        let mut buf = Vec::new();
        current_chunk_file.data.read_to_end(&mut buf)?;

        self.current_chunk_data = Some(Cursor::new(buf));

        Ok(())
    }
}

impl<'a, R: Read + Seek> Iterator for CanvasArchiveReader<'a, R> {
    type Item = StoredPixelEdit;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.current_chunk_data {
            Some(ref mut data) => {
                if data.position() == data.get_ref().len() as u64 {
                    match self.get_next_chunk_data() {
                        Ok(_) => self.next(),
                        Err(_) => None,
                    }
                } else {
                    match bincode::decode_from_std_read(data, BINCODE_CONFIG) {
                        Ok(edit) => Some(edit),
                        Err(_) => None,
                    }
                }
            }
            None => match self.get_next_chunk_data() {
                Ok(_) => self.next(),
                Err(_) => None,
            },
        }
    }
}
