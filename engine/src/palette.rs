use std::collections::HashMap;

use crate::error::{EngineError, EngineResult};

/// The 16 colors of the 2017 canvas, in palette-index order.
const PLACE_2017_RGB: [[u8; 3]; 16] = [
    [255, 255, 255], // FFFFFF
    [228, 228, 228], // E4E4E4
    [136, 136, 136], // 888888
    [34, 34, 34],    // 222222
    [255, 167, 209], // FFA7D1
    [229, 0, 0],     // E50000
    [229, 149, 0],   // E59500
    [160, 106, 66],  // A06A42
    [229, 217, 0],   // E5D900
    [148, 224, 68],  // 94E044
    [2, 190, 1],     // 02BE01
    [0, 211, 221],   // 00D3DD
    [0, 131, 199],   // 0083C7
    [0, 0, 234],     // 0000EA
    [207, 110, 228], // CF6EE4
    [130, 0, 128],   // 820080
];

/// Bijective mapping between small color indices and RGB triples.
///
/// The forward table is indexed directly; the reverse map is built once at
/// construction. Vec lookup by index is faster than a map lookup by key, and
/// the reverse direction only pays its hash on ingestion paths.
#[derive(Debug, Clone)]
pub struct Palette {
    rgb_by_index: Vec<[u8; 3]>,
    index_by_rgb: HashMap<[u8; 3], u8>,
}

impl Palette {
    pub fn new(colors: Vec<[u8; 3]>) -> EngineResult<Self> {
        if colors.is_empty() || colors.len() > 256 {
            return Err(EngineError::InvalidPaletteSize { len: colors.len() });
        }

        let mut index_by_rgb = HashMap::with_capacity(colors.len());
        for (index, rgb) in colors.iter().enumerate() {
            if let Some(first) = index_by_rgb.insert(*rgb, index as u8) {
                return Err(EngineError::DuplicateColor {
                    first,
                    second: index as u8,
                    rgb: *rgb,
                });
            }
        }

        Ok(Self {
            rgb_by_index: colors,
            index_by_rgb,
        })
    }

    /// The fixed palette of the 2017 reference dataset.
    pub fn place_2017() -> Self {
        Self::new(PLACE_2017_RGB.to_vec()).unwrap()
    }

    pub fn len(&self) -> usize {
        self.rgb_by_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rgb_by_index.is_empty()
    }

    pub fn contains_index(&self, index: u8) -> bool {
        (index as usize) < self.rgb_by_index.len()
    }

    pub fn index_to_rgb(&self, index: u8) -> EngineResult<[u8; 3]> {
        self.rgb_by_index
            .get(index as usize)
            .copied()
            .ok_or(EngineError::InvalidIndex {
                index,
                palette_len: self.rgb_by_index.len(),
            })
    }

    pub fn rgb_to_index(&self, rgb: [u8; 3]) -> EngineResult<u8> {
        self.index_by_rgb
            .get(&rgb)
            .copied()
            .ok_or(EngineError::UnknownColor { rgb })
    }

    /// All `(index, rgb)` pairs in index order.
    pub fn entries(&self) -> impl Iterator<Item = (u8, [u8; 3])> + '_ {
        self.rgb_by_index
            .iter()
            .enumerate()
            .map(|(index, rgb)| (index as u8, *rgb))
    }
}
