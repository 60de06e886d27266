use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{EngineError, EngineResult};
use crate::history::CanvasHistory;
use crate::render::{Region, Snapshot};

/// One planned frame sequence: `frame_count` frames at
/// `start_seconds + i * step_seconds`, all over the same region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequencePlan {
    pub start_seconds: u32,
    pub frame_count: u32,
    /// A zero step is legal and yields repeated identical frames.
    pub step_seconds: u32,
    pub region: Region,
}

impl SequencePlan {
    pub fn frame_seconds(&self, frame: u32) -> EngineResult<u32> {
        frame
            .checked_mul(self.step_seconds)
            .and_then(|offset| self.start_seconds.checked_add(offset))
            .ok_or(EngineError::TimestampOverflow {
                frame,
                start: self.start_seconds,
                step: self.step_seconds,
            })
    }
}

/// Receiver for finished frames, in increasing time order. The encoder side
/// of the animation pipeline lives behind this seam; the engine itself never
/// touches files or containers.
pub trait FrameSink {
    fn begin(&mut self, plan: &SequencePlan, fps: u16) -> EngineResult<()> {
        let _ = (plan, fps);
        Ok(())
    }

    fn write_frame(&mut self, frame: u32, snapshot: &Snapshot) -> EngineResult<()>;

    fn finish(&mut self) -> EngineResult<()> {
        Ok(())
    }
}

impl CanvasHistory {
    /// Drive the renderer across the plan, handing each frame to `deliver`
    /// in increasing time order.
    ///
    /// `cancel` is checked between frames; frames already delivered are never
    /// retracted. A failing frame aborts the remainder and carries its index
    /// and timestamp.
    pub fn for_each_frame(
        &self,
        plan: &SequencePlan,
        cancel: Option<&AtomicBool>,
        mut deliver: impl FnMut(u32, Snapshot) -> EngineResult<()>,
    ) -> EngineResult<()> {
        if plan.frame_count == 0 {
            return Err(EngineError::EmptySequence);
        }
        self.check_region(plan.region)?;

        for frame in 0..plan.frame_count {
            if let Some(cancel) = cancel {
                if cancel.load(Ordering::Relaxed) {
                    log::info!("timelapse cancelled before frame {frame}");
                    return Err(EngineError::Cancelled { frame });
                }
            }

            let seconds = plan.frame_seconds(frame)?;
            let snapshot = self
                .render(plan.region, seconds)
                .map_err(|source| EngineError::FrameFailed {
                    frame,
                    seconds,
                    source: Box::new(source),
                })?;
            deliver(frame, snapshot).map_err(|source| EngineError::FrameFailed {
                frame,
                seconds,
                source: Box::new(source),
            })?;
        }

        Ok(())
    }

    /// Collect the whole sequence in memory.
    pub fn render_sequence(&self, plan: &SequencePlan) -> EngineResult<Vec<Snapshot>> {
        let mut frames = Vec::with_capacity(plan.frame_count as usize);
        self.for_each_frame(plan, None, |_, snapshot| {
            frames.push(snapshot);
            Ok(())
        })?;
        Ok(frames)
    }

    /// Stream the sequence into `sink` at a fixed playback rate.
    pub fn render_animation(
        &self,
        plan: &SequencePlan,
        fps: u16,
        cancel: Option<&AtomicBool>,
        sink: &mut dyn FrameSink,
    ) -> EngineResult<()> {
        if fps == 0 {
            return Err(EngineError::InvalidFrameRate { fps });
        }

        sink.begin(plan, fps)?;
        self.for_each_frame(plan, cancel, |frame, snapshot| {
            sink.write_frame(frame, &snapshot)
        })?;
        sink.finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicBool;

    use structures::StoredPixelEdit;

    use super::*;
    use crate::canvas::BaseCanvas;
    use crate::history::EngineOptions;
    use crate::palette::Palette;

    fn edit(x: u16, y: u16, seconds: u32, color: u8) -> StoredPixelEdit {
        StoredPixelEdit {
            x,
            y,
            seconds_since_epoch: seconds,
            color_index: color,
        }
    }

    fn test_history() -> CanvasHistory {
        let palette = Palette::place_2017();
        let base = BaseCanvas::from_indices(4, 4, vec![0; 16], &palette).unwrap();
        CanvasHistory::build(
            palette,
            base,
            vec![edit(0, 0, 100, 5), edit(1, 1, 130, 9)],
            &EngineOptions::default(),
        )
        .unwrap()
    }

    fn plan(start: u32, frames: u32, step: u32) -> SequencePlan {
        SequencePlan {
            start_seconds: start,
            frame_count: frames,
            step_seconds: step,
            region: Region::new(0, 0, 3, 3).unwrap(),
        }
    }

    #[test]
    fn frames_come_back_in_increasing_time_order() {
        let history = test_history();
        let frames = history.render_sequence(&plan(90, 5, 20)).unwrap();

        assert_eq!(
            frames.iter().map(Snapshot::seconds).collect::<Vec<_>>(),
            vec![90, 110, 130, 150, 170]
        );
        assert_eq!(frames[0].color_at(0, 0), 0);
        assert_eq!(frames[1].color_at(0, 0), 5);
        assert_eq!(frames[2].color_at(1, 1), 9);
    }

    #[test]
    fn zero_step_repeats_the_same_frame() {
        let history = test_history();
        let frames = history.render_sequence(&plan(150, 3, 0)).unwrap();

        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0], frames[1]);
        assert_eq!(frames[1], frames[2]);
    }

    #[test]
    fn empty_sequence_is_rejected() {
        let history = test_history();
        assert!(matches!(
            history.render_sequence(&plan(0, 0, 10)),
            Err(EngineError::EmptySequence)
        ));
    }

    #[test]
    fn cancellation_stops_between_frames() {
        let history = test_history();
        let cancel = AtomicBool::new(false);

        let mut delivered = 0u32;
        let err = history
            .for_each_frame(&plan(0, 10, 10), Some(&cancel), |_, _| {
                delivered += 1;
                if delivered == 3 {
                    cancel.store(true, Ordering::Relaxed);
                }
                Ok(())
            })
            .unwrap_err();

        assert!(matches!(err, EngineError::Cancelled { frame: 3 }));
        assert_eq!(delivered, 3);
    }

    #[test]
    fn sink_failure_carries_the_frame_index_and_timestamp() {
        let history = test_history();

        struct FailingSink {
            written: u32,
        }

        impl FrameSink for FailingSink {
            fn write_frame(&mut self, _frame: u32, _snapshot: &Snapshot) -> EngineResult<()> {
                if self.written == 2 {
                    return Err(EngineError::frame_sink("disk full"));
                }
                self.written += 1;
                Ok(())
            }
        }

        let mut sink = FailingSink { written: 0 };
        let err = history
            .render_animation(&plan(100, 5, 30), 30, None, &mut sink)
            .unwrap_err();

        match err {
            EngineError::FrameFailed { frame, seconds, source } => {
                assert_eq!(frame, 2);
                assert_eq!(seconds, 160);
                assert!(matches!(*source, EngineError::FrameSink(_)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(sink.written, 2);
    }

    #[test]
    fn zero_fps_is_rejected() {
        let history = test_history();

        struct NullSink;
        impl FrameSink for NullSink {
            fn write_frame(&mut self, _: u32, _: &Snapshot) -> EngineResult<()> {
                Ok(())
            }
        }

        assert!(matches!(
            history.render_animation(&plan(0, 1, 0), 0, None, &mut NullSink),
            Err(EngineError::InvalidFrameRate { fps: 0 })
        ));
    }

    #[test]
    fn timestamp_overflow_is_reported() {
        let history = test_history();
        let overflowing = SequencePlan {
            start_seconds: u32::MAX - 5,
            frame_count: 3,
            step_seconds: 10,
            region: Region::new(0, 0, 3, 3).unwrap(),
        };

        let err = history.render_sequence(&overflowing).unwrap_err();
        assert!(matches!(err, EngineError::TimestampOverflow { frame: 1, .. }));
    }
}
