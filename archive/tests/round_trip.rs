use std::io::{Seek, SeekFrom};

use archive::{CanvasArchiveReader, CanvasArchiveWriter};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use structures::StoredPixelEdit;

fn encoded_png(width: u32, height: u32) -> Vec<u8> {
    let image = image::RgbImage::from_pixel(width, height, image::Rgb([255, 255, 255]));
    let mut png = Vec::new();
    image
        .write_to(
            &mut std::io::Cursor::new(&mut png),
            image::ImageOutputFormat::Png,
        )
        .unwrap();
    png
}

#[test]
fn round_trips_meta_base_and_edits() {
    let mut rng = StdRng::seed_from_u64(99);

    let mut edits: Vec<StoredPixelEdit> = (0..1_000)
        .map(|_| StoredPixelEdit {
            x: rng.gen_range(0..64),
            y: rng.gen_range(0..64),
            seconds_since_epoch: rng.gen_range(0..10_000),
            color_index: rng.gen_range(0..16),
        })
        .collect();

    let mut file = tempfile::tempfile().unwrap();
    {
        let mut writer = CanvasArchiveWriter::new(&mut file, 64, 64).unwrap();
        writer.set_palette([(0, [255, 255, 255]), (1, [34, 34, 34])]);
        writer.set_base_png(encoded_png(64, 64));
        writer.set_data_start(100);
        for edit in &edits {
            writer.add_edit(*edit);
        }
        writer.finalize().unwrap();
    }

    file.seek(SeekFrom::Start(0)).unwrap();
    let mut reader = CanvasArchiveReader::new(file).unwrap();

    assert_eq!(reader.meta.width, 64);
    assert_eq!(reader.meta.height, 64);
    assert_eq!(reader.meta.num_edits, 1_000);
    assert_eq!(reader.meta.data_start_seconds, 100);
    assert_eq!(reader.meta.color_index_to_rgb.len(), 2);

    let base = reader.base_image().unwrap();
    assert_eq!(base.dimensions(), (64, 64));

    // The writer sorts stably by timestamp, so arrival order is preserved
    // among equal timestamps.
    edits.sort_by_key(|edit| edit.seconds_since_epoch);
    let read_back: Vec<StoredPixelEdit> = reader.collect();
    assert_eq!(read_back, edits);
}

#[test]
fn edits_stream_across_chunk_boundaries_in_order() {
    // More edits than chunks, so every chunk file gets several records.
    let edits: Vec<StoredPixelEdit> = (0..640u32)
        .map(|i| StoredPixelEdit {
            x: (i % 10) as u16,
            y: (i / 10) as u16,
            seconds_since_epoch: i,
            color_index: (i % 16) as u8,
        })
        .collect();

    let mut file = tempfile::tempfile().unwrap();
    {
        let mut writer = CanvasArchiveWriter::new(&mut file, 10, 64).unwrap();
        for edit in &edits {
            writer.add_edit(*edit);
        }
        writer.finalize().unwrap();
    }

    file.seek(SeekFrom::Start(0)).unwrap();
    let reader = CanvasArchiveReader::new(file).unwrap();
    assert_eq!(reader.meta.chunk_descs.len(), 64);

    let timestamps: Vec<u32> = reader.map(|edit| edit.seconds_since_epoch).collect();
    assert_eq!(timestamps, (0..640).collect::<Vec<_>>());
}

#[test]
fn missing_base_image_is_reported() {
    let mut file = tempfile::tempfile().unwrap();
    {
        let writer = CanvasArchiveWriter::new(&mut file, 8, 8).unwrap();
        writer.finalize().unwrap();
    }

    file.seek(SeekFrom::Start(0)).unwrap();
    let mut reader = CanvasArchiveReader::new(file).unwrap();
    assert!(matches!(
        reader.base_image(),
        Err(archive::CanvasArchiveError::MissingBaseImage)
    ));
}
