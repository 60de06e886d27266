use std::fs::File;

use engine::{EngineError, EngineResult, FrameSink, Palette, SequencePlan, Snapshot};
use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame};

/// Encodes delivered frames into an animated GIF as they arrive, so a long
/// timelapse never holds more than one frame in memory.
pub struct GifFrameSink<'a> {
    encoder: GifEncoder<File>,
    palette: &'a Palette,
    delay: Delay,
}

impl<'a> GifFrameSink<'a> {
    pub fn new(out: File, palette: &'a Palette) -> Self {
        Self {
            encoder: GifEncoder::new(out),
            palette,
            delay: Delay::from_numer_denom_ms(1_000, 30),
        }
    }
}

impl FrameSink for GifFrameSink<'_> {
    fn begin(&mut self, _plan: &SequencePlan, fps: u16) -> EngineResult<()> {
        self.delay = Delay::from_numer_denom_ms(1_000, fps as u32);
        self.encoder
            .set_repeat(Repeat::Infinite)
            .map_err(|err| EngineError::frame_sink(err.to_string()))
    }

    fn write_frame(&mut self, frame: u32, snapshot: &Snapshot) -> EngineResult<()> {
        let rgba = image::DynamicImage::ImageRgb8(snapshot.to_image(self.palette)?).to_rgba8();

        log::debug!("encoding frame {frame} at {}s", snapshot.seconds());
        self.encoder
            .encode_frame(Frame::from_parts(rgba, 0, 0, self.delay))
            .map_err(|err| EngineError::frame_sink(err.to_string()))
    }
}
