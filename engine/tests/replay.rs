//! Cross-checks the indexed query path against a brute-force replay of the
//! same edit log.

use engine::{BaseCanvas, CanvasHistory, EngineOptions, Palette, Region, StoredPixelEdit};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const WIDTH: u16 = 32;
const HEIGHT: u16 = 24;

fn random_edits(rng: &mut StdRng, count: usize) -> Vec<StoredPixelEdit> {
    let mut seconds = 1_000u32;
    (0..count)
        .map(|_| {
            // Non-decreasing timestamps with frequent ties, like the real log.
            seconds += rng.gen_range(0..3);
            StoredPixelEdit {
                x: rng.gen_range(0..WIDTH),
                y: rng.gen_range(0..HEIGHT),
                seconds_since_epoch: seconds,
                color_index: rng.gen_range(0..16),
            }
        })
        .collect()
}

fn build_history(edits: Vec<StoredPixelEdit>) -> CanvasHistory {
    let palette = Palette::place_2017();
    let base = BaseCanvas::from_indices(
        WIDTH,
        HEIGHT,
        vec![0; WIDTH as usize * HEIGHT as usize],
        &palette,
    )
    .unwrap();
    CanvasHistory::build(palette, base, edits, &EngineOptions::default()).unwrap()
}

/// Applying every edit in arrival order to a mutable copy of the base canvas
/// must match querying every pixel at the final timestamp.
#[test]
fn full_replay_matches_queries_at_the_last_timestamp() {
    let mut rng = StdRng::seed_from_u64(7);
    let edits = random_edits(&mut rng, 5_000);
    let last_seconds = edits.last().unwrap().seconds_since_epoch;

    let mut replayed = vec![0u8; WIDTH as usize * HEIGHT as usize];
    for edit in &edits {
        replayed[edit.y as usize * WIDTH as usize + edit.x as usize] = edit.color_index;
    }

    let history = build_history(edits);
    for y in 0..HEIGHT {
        for x in 0..WIDTH {
            assert_eq!(
                history.color_at(x, y, last_seconds).unwrap(),
                replayed[y as usize * WIDTH as usize + x as usize],
                "pixel ({x}, {y}) diverged from replay"
            );
        }
    }
}

/// Every logged edit is visible at its own timestamp, with the last arrival
/// winning among same-instant edits to the same pixel.
#[test]
fn each_edit_is_authoritative_at_its_own_instant() {
    let mut rng = StdRng::seed_from_u64(42);
    let edits = random_edits(&mut rng, 2_000);
    let history = build_history(edits.clone());

    for (seq, edit) in edits.iter().enumerate() {
        let expected = edits
            .iter()
            .enumerate()
            .filter(|(_, other)| {
                other.x == edit.x
                    && other.y == edit.y
                    && other.seconds_since_epoch == edit.seconds_since_epoch
            })
            .max_by_key(|(other_seq, _)| *other_seq)
            .map(|(_, other)| other.color_index)
            .unwrap();

        assert_eq!(
            history
                .color_at(edit.x, edit.y, edit.seconds_since_epoch)
                .unwrap(),
            expected,
            "edit #{seq} at ({}, {}) t={}",
            edit.x,
            edit.y,
            edit.seconds_since_epoch
        );
    }
}

/// Rendering the full canvas twice at the same instant is byte-identical,
/// and matches per-pixel queries.
#[test]
fn rendering_agrees_with_pointwise_queries() {
    let mut rng = StdRng::seed_from_u64(3);
    let history = build_history(random_edits(&mut rng, 3_000));
    let region = Region::full(WIDTH, HEIGHT).unwrap();
    let at = 2_500;

    let first = history.render(region, at).unwrap();
    let second = history.render(region, at).unwrap();
    assert_eq!(first, second);

    for y in 0..HEIGHT {
        for x in 0..WIDTH {
            assert_eq!(
                first.color_at(x as u32, y as u32),
                history.color_at(x, y, at).unwrap()
            );
        }
    }
}
