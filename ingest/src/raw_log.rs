use std::io::Read;

use bincode::Decode;
use structures::{StoredPixelEdit, BINCODE_CONFIG};

use crate::errors::IngestError;

/// On-disk layout of one raw log record: four little-endian u32s.
#[derive(Decode, Debug)]
struct RawEditRecord {
    timestamp: u32,
    x: u32,
    y: u32,
    color: u32,
}

const RAW_RECORD_SIZE: usize = 16;

/// Lazily decodes the raw fixed-width binary edit log, in arrival order.
///
/// Single pass, not restartable; a short tail or a field that does not fit
/// the typed representation surfaces as `MalformedEventRecord` with the byte
/// offset of the offending record.
pub struct RawEditLogReader<R: Read> {
    reader: R,
    offset: u64,
}

impl<R: Read> RawEditLogReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, offset: 0 }
    }

    fn malformed(&self, detail: impl Into<String>) -> IngestError {
        IngestError::MalformedEventRecord {
            offset: self.offset,
            detail: detail.into(),
        }
    }
}

impl<R: Read> Iterator for RawEditLogReader<R> {
    type Item = Result<StoredPixelEdit, IngestError>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut buf = [0u8; RAW_RECORD_SIZE];
        let mut filled = 0;

        while filled < RAW_RECORD_SIZE {
            match self.reader.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(err) => return Some(Err(err.into())),
            }
        }

        if filled == 0 {
            return None;
        }
        if filled < RAW_RECORD_SIZE {
            return Some(Err(self.malformed(format!(
                "truncated record ({filled} of {RAW_RECORD_SIZE} bytes)"
            ))));
        }

        let record: RawEditRecord = match bincode::decode_from_slice(&buf, BINCODE_CONFIG) {
            Ok((record, _)) => record,
            Err(err) => return Some(Err(self.malformed(err.to_string()))),
        };

        let x = match u16::try_from(record.x) {
            Ok(x) => x,
            Err(_) => return Some(Err(self.malformed(format!("x {} out of range", record.x)))),
        };
        let y = match u16::try_from(record.y) {
            Ok(y) => y,
            Err(_) => return Some(Err(self.malformed(format!("y {} out of range", record.y)))),
        };
        let color_index = match u8::try_from(record.color) {
            Ok(color) => color,
            Err(_) => {
                return Some(Err(
                    self.malformed(format!("color {} out of range", record.color))
                ))
            }
        };

        self.offset += RAW_RECORD_SIZE as u64;

        Some(Ok(StoredPixelEdit {
            x,
            y,
            seconds_since_epoch: record.timestamp,
            color_index,
        }))
    }
}
