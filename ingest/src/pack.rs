use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use archive::CanvasArchiveWriter;
use chrono::NaiveDateTime;
use colors_transform::Color;
use engine::{BaseCanvas, Palette};
use structures::StoredPixelEdit;

use crate::errors::IngestError;
use crate::raw_log::RawEditLogReader;

/// Timestamp format of the public CSV export.
const CSV_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f UTC";

fn field<'a>(record: &'a csv::StringRecord, index: usize) -> Result<&'a str, IngestError> {
    record.get(index).ok_or(IngestError::MissingColumn { index })
}

/// Repack the public CSV export (`timestamp, user, hex color, "x,y"`) into
/// an archive, assigning color indices in first-seen order.
///
/// The export has no base image; a canvas packed this way starts blank.
pub fn pack_csv(
    input: &Path,
    output: &Path,
    width: u16,
    height: u16,
) -> Result<u64, IngestError> {
    let file = File::open(input)?;
    let mut reader = csv::Reader::from_reader(file);

    let out_file = File::create(output)?;
    let mut buffered = BufWriter::new(out_file);
    let mut writer = CanvasArchiveWriter::new(&mut buffered, width, height)?;

    let mut rgb_to_index: BTreeMap<[u8; 3], u8> = BTreeMap::new();
    let mut data_start: Option<u32> = None;
    let mut num_edits = 0u64;

    for result in reader.records() {
        let record = result?;

        let timestamp_str = field(&record, 0)?;
        let timestamp = NaiveDateTime::parse_from_str(timestamp_str, CSV_TIMESTAMP_FORMAT)
            .map_err(|source| IngestError::Timestamp {
                value: timestamp_str.to_string(),
                source,
            })?;
        let seconds = timestamp.timestamp() as u32;

        let color_str = field(&record, 2)?;
        let parsed = colors_transform::Rgb::from_hex_str(color_str).map_err(|_| {
            IngestError::Color {
                value: color_str.to_string(),
            }
        })?;
        let rgb = [
            parsed.get_red() as u8,
            parsed.get_green() as u8,
            parsed.get_blue() as u8,
        ];

        let color_index = match rgb_to_index.get(&rgb) {
            Some(index) => *index,
            None => {
                if rgb_to_index.len() == 256 {
                    return Err(IngestError::PaletteOverflow);
                }
                let index = rgb_to_index.len() as u8;
                rgb_to_index.insert(rgb, index);
                index
            }
        };

        let coords_str = field(&record, 3)?.replace('"', "");
        let mut coords = coords_str.split(',');
        let (x, y) = match (coords.next(), coords.next(), coords.next()) {
            (Some(x), Some(y), None) => (
                x.parse::<u16>().map_err(|_| IngestError::Coordinates {
                    value: coords_str.clone(),
                })?,
                y.parse::<u16>().map_err(|_| IngestError::Coordinates {
                    value: coords_str.clone(),
                })?,
            ),
            _ => {
                return Err(IngestError::Coordinates {
                    value: coords_str.clone(),
                })
            }
        };

        data_start = Some(data_start.map_or(seconds, |start| start.min(seconds)));
        writer.add_edit(StoredPixelEdit {
            x,
            y,
            seconds_since_epoch: seconds,
            color_index,
        });
        num_edits += 1;
    }

    writer.set_palette(rgb_to_index.into_iter().map(|(rgb, index)| (index, rgb)));
    writer.set_data_start(data_start.unwrap_or(0));
    writer.finalize()?;
    buffered.flush()?;

    log::info!("packed {num_edits} edits from {}", input.display());
    Ok(num_edits)
}

/// Pack the raw binary edit log plus its base PNG into an archive.
///
/// The base image is validated against the palette up front, so an
/// incompatible source image fails the pack instead of the first render.
pub fn pack_raw(
    log_path: &Path,
    base_png_path: &Path,
    output: &Path,
    palette: &Palette,
    data_start_seconds: u32,
) -> Result<u64, IngestError> {
    let png_bytes = std::fs::read(base_png_path)?;
    let base_image = image::load_from_memory(&png_bytes)
        .map_err(|source| IngestError::SourceImageUnavailable {
            path: base_png_path.to_path_buf(),
            source,
        })?
        .to_rgb8();
    let base = BaseCanvas::from_image(&base_image, palette)?;

    let out_file = File::create(output)?;
    let mut buffered = BufWriter::new(out_file);
    let mut writer = CanvasArchiveWriter::new(&mut buffered, base.width(), base.height())?;
    writer.set_palette(palette.entries());
    writer.set_base_png(png_bytes);
    writer.set_data_start(data_start_seconds);

    let mut num_edits = 0u64;
    for edit in RawEditLogReader::new(BufReader::new(File::open(log_path)?)) {
        writer.add_edit(edit?);
        num_edits += 1;
    }

    writer.finalize()?;
    buffered.flush()?;

    log::info!("packed {num_edits} edits from {}", log_path.display());
    Ok(num_edits)
}
