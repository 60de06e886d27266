use std::io::{Read, Seek};
use std::path::Path;

use archive::{CanvasArchiveError, CanvasArchiveReader};
use engine::{BaseCanvas, CanvasHistory, EngineOptions, Palette};
use image::RgbImage;

use crate::errors::IngestError;

/// Decode a base image from disk.
pub fn load_base_image(path: &Path) -> Result<RgbImage, IngestError> {
    let image = image::open(path).map_err(|source| IngestError::SourceImageUnavailable {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(image.to_rgb8())
}

/// Decode a base image and convert it to palette indices.
pub fn load_base_canvas(path: &Path, palette: &Palette) -> Result<BaseCanvas, IngestError> {
    Ok(BaseCanvas::from_image(&load_base_image(path)?, palette)?)
}

fn palette_from_meta(meta: &structures::CanvasMeta) -> Result<Palette, IngestError> {
    let mut colors = Vec::with_capacity(meta.color_index_to_rgb.len());
    for (position, (index, rgb)) in meta.color_index_to_rgb.iter().enumerate() {
        if *index as usize != position {
            return Err(IngestError::SparsePalette);
        }
        colors.push(*rgb);
    }
    Ok(Palette::new(colors)?)
}

/// Rebuild a queryable [`CanvasHistory`] from an archive.
///
/// The palette and data-start instant come from the archive's meta file. An
/// archive without a base image (a CSV repack) starts from a blank canvas;
/// blank means the palette's white if it has one, else index 0.
pub fn load_history_from_archive<R: Read + Seek>(
    reader: R,
    strict_order: bool,
) -> Result<CanvasHistory, IngestError> {
    let mut archive = CanvasArchiveReader::new(reader)?;
    let meta = archive.meta.clone();

    let palette = palette_from_meta(&meta)?;

    let base = match archive.base_image() {
        Ok(base_image) => BaseCanvas::from_image(&base_image, &palette)?,
        Err(CanvasArchiveError::MissingBaseImage) => {
            let blank = palette.rgb_to_index([255, 255, 255]).unwrap_or(0);
            log::warn!("archive has no base image, starting from a blank canvas");
            BaseCanvas::from_indices(
                meta.width,
                meta.height,
                vec![blank; meta.width as usize * meta.height as usize],
                &palette,
            )?
        }
        Err(err) => return Err(err.into()),
    };

    let options = EngineOptions {
        data_start_seconds: meta.data_start_seconds,
        strict_order,
    };

    log::info!(
        "loading {} edits for a {}x{} canvas",
        meta.num_edits,
        meta.width,
        meta.height
    );

    Ok(CanvasHistory::build(palette, base, archive, &options)?)
}
