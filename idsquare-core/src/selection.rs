//! Color Selection - Digest Bytes to Colors
//!
//! Strategies are named, not duplicated generators. Both consume only
//! digest bytes, so selection is as deterministic as the hash.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::generator::IdenticonError;
use crate::hashing::{SubjectDigest, DIGEST_LEN};
use crate::palettes::{Color, PaletteTable};

/// Slots filled by the flat strategy (a 3x3 layout).
pub const FLAT_SLOTS: usize = 9;
const FLAT_DIM: usize = 3;

/// Digest offset of the sort keys used by palette reduction.
const SORT_KEY_OFFSET: usize = 2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SelectionStrategy {
    /// Pick one palette, cut a contiguous run, reorder it by digest keys.
    #[default]
    PaletteReduction,
    /// Treat the table as one flat list, pick nine distinct colors.
    FlatUnique,
}

impl SelectionStrategy {
    /// Largest grid edge the strategy has digest bytes for.
    pub fn max_grid_dim(self) -> u32 {
        match self {
            // one sort key per cell, taken after the two selector bytes
            SelectionStrategy::PaletteReduction => 4,
            SelectionStrategy::FlatUnique => FLAT_DIM as u32,
        }
    }

    pub fn check_grid_dim(self, grid_dim: u32) -> Result<(), IdenticonError> {
        if grid_dim == 0 || grid_dim > self.max_grid_dim() {
            return Err(IdenticonError::InvalidGrid {
                grid_dim,
                max: self.max_grid_dim(),
            });
        }
        Ok(())
    }
}

/// Select `grid_dim * grid_dim` colors in row-major cell order.
pub fn select_colors(
    digest: &SubjectDigest,
    table: &PaletteTable,
    strategy: SelectionStrategy,
    grid_dim: u32,
) -> Result<Vec<Color>, IdenticonError> {
    strategy.check_grid_dim(grid_dim)?;
    if table.is_empty() {
        return Err(IdenticonError::EmptyPaletteTable);
    }

    match strategy {
        SelectionStrategy::PaletteReduction => {
            reduce_palette(digest, table, (grid_dim * grid_dim) as usize)
        }
        SelectionStrategy::FlatUnique => {
            let flat = table.flattened();
            let indices = flat_unique_indices(digest, flat.len())?;
            let dim = grid_dim as usize;
            Ok((0..dim)
                .flat_map(|row| (0..dim).map(move |col| row * FLAT_DIM + col))
                .map(|slot| flat[indices[slot]])
                .collect())
        }
    }
}

fn reduce_palette(
    digest: &SubjectDigest,
    table: &PaletteTable,
    count: usize,
) -> Result<Vec<Color>, IdenticonError> {
    debug_assert!(SORT_KEY_OFFSET + count <= DIGEST_LEN);

    let palette_index = digest.byte(0) as usize % table.len();
    let palette = &table.palettes()[palette_index];
    if palette.len() < count {
        return Err(IdenticonError::PaletteTooSmall {
            palette: palette_index,
            required: count,
            available: palette.len(),
        });
    }

    let offset = (digest.byte(1) as usize % palette.len()).saturating_sub(count);
    debug!(
        "palette reduction: palette {} of {}, offset {}, {} colors",
        palette_index,
        table.len(),
        offset,
        count
    );

    let keys = &digest.bytes()[SORT_KEY_OFFSET..SORT_KEY_OFFSET + count];
    let mut keyed: Vec<(u8, Color)> = keys
        .iter()
        .copied()
        .zip(palette.colors()[offset..offset + count].iter().copied())
        .collect();
    // stable: equal keys keep palette order
    keyed.sort_by_key(|(key, _)| *key);

    Ok(keyed.into_iter().map(|(_, color)| color).collect())
}

/// Nine pairwise distinct indices into a flat list of `len` colors.
///
/// Candidates come from digest bytes 0..9; a candidate already taken by
/// an earlier slot is probed forward (wrapping) to the next free index.
pub fn flat_unique_indices(
    digest: &SubjectDigest,
    len: usize,
) -> Result<[usize; FLAT_SLOTS], IdenticonError> {
    if len < FLAT_SLOTS {
        return Err(IdenticonError::PaletteTooSmall {
            palette: 0,
            required: FLAT_SLOTS,
            available: len,
        });
    }

    let mut chosen = [0usize; FLAT_SLOTS];
    for slot in 0..FLAT_SLOTS {
        let mut candidate = digest.byte(slot) as usize % len;
        while chosen[..slot].contains(&candidate) {
            candidate = (candidate + 1) % len;
        }
        chosen[slot] = candidate;
    }
    debug!("flat selection over {} colors: {:?}", len, chosen);

    Ok(chosen)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hashing::{hash_subject, HashAlgorithm};
    use crate::palettes::Palette;

    fn digest_of(bytes: [u8; DIGEST_LEN]) -> SubjectDigest {
        SubjectDigest::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_hello_reduction_on_builtin_table() {
        let digest = hash_subject(b"hello", HashAlgorithm::Sha1).unwrap();
        let colors = select_colors(
            &digest,
            PaletteTable::builtin(),
            SelectionStrategy::PaletteReduction,
            2,
        )
        .unwrap();
        // palette 0xaa % 81 = 8, offset 0, keys c6 1d dc c5
        let packed: Vec<u32> = colors.iter().map(|c| c.packed()).collect();
        assert_eq!(packed, vec![0xADC4CC, 0xE19D29, 0x4298B5, 0x92B06A]);
    }

    #[test]
    fn test_offset_clamped_to_palette_end() {
        let table = PaletteTable::new(vec![Palette::from_packed(&[1, 2, 3, 4, 5, 6])]);
        let mut bytes = [0u8; DIGEST_LEN];
        bytes[1] = 5; // 5 % 6 - 4 = 1
        bytes[2..6].copy_from_slice(&[0, 1, 2, 3]);
        let colors =
            select_colors(&digest_of(bytes), &table, SelectionStrategy::PaletteReduction, 2)
                .unwrap();
        let packed: Vec<u32> = colors.iter().map(|c| c.packed()).collect();
        assert_eq!(packed, vec![2, 3, 4, 5]);
    }

    #[test]
    fn test_equal_keys_keep_palette_order() {
        let table = PaletteTable::new(vec![Palette::from_packed(&[10, 20, 30, 40])]);
        let mut bytes = [0u8; DIGEST_LEN];
        bytes[2..6].copy_from_slice(&[9, 1, 9, 1]);
        let colors =
            select_colors(&digest_of(bytes), &table, SelectionStrategy::PaletteReduction, 2)
                .unwrap();
        let packed: Vec<u32> = colors.iter().map(|c| c.packed()).collect();
        assert_eq!(packed, vec![20, 40, 10, 30]);
    }

    #[test]
    fn test_minimum_sized_palettes_never_out_of_bounds() {
        let table = PaletteTable::new(
            (0..7u32)
                .map(|p| Palette::from_packed(&[p, p + 100, p + 200, p + 300]))
                .collect(),
        );
        for seed in 0..=255u8 {
            let mut bytes = [seed; DIGEST_LEN];
            bytes[1] = seed.wrapping_mul(31);
            let colors =
                select_colors(&digest_of(bytes), &table, SelectionStrategy::PaletteReduction, 2)
                    .unwrap();
            assert_eq!(colors.len(), 4);
        }
    }

    #[test]
    fn test_palette_too_small() {
        let table = PaletteTable::new(vec![Palette::from_packed(&[1, 2, 3])]);
        let digest = hash_subject(b"x", HashAlgorithm::Sha1).unwrap();
        let err = select_colors(&digest, &table, SelectionStrategy::PaletteReduction, 2)
            .unwrap_err();
        assert!(matches!(
            err,
            IdenticonError::PaletteTooSmall {
                palette: 0,
                required: 4,
                available: 3
            }
        ));
    }

    #[test]
    fn test_empty_table_rejected() {
        let digest = hash_subject(b"x", HashAlgorithm::Sha1).unwrap();
        let err = select_colors(
            &digest,
            &PaletteTable::new(vec![]),
            SelectionStrategy::PaletteReduction,
            2,
        )
        .unwrap_err();
        assert!(matches!(err, IdenticonError::EmptyPaletteTable));
    }

    #[test]
    fn test_grid_dim_bounds() {
        let digest = hash_subject(b"x", HashAlgorithm::Sha1).unwrap();
        let table = PaletteTable::builtin();
        for (strategy, bad) in [
            (SelectionStrategy::PaletteReduction, 0),
            (SelectionStrategy::PaletteReduction, 5),
            (SelectionStrategy::FlatUnique, 4),
        ] {
            assert!(matches!(
                select_colors(&digest, table, strategy, bad),
                Err(IdenticonError::InvalidGrid { .. })
            ));
        }
    }

    #[test]
    fn test_flat_indices_distinct_for_colliding_bytes() {
        let digest = digest_of([7u8; DIGEST_LEN]);
        let indices = flat_unique_indices(&digest, 9).unwrap();
        let mut sorted = indices;
        sorted.sort_unstable();
        assert_eq!(sorted, [0, 1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(indices[0], 7);
        assert_eq!(indices[1], 8);
        assert_eq!(indices[2], 0);
    }

    #[test]
    fn test_flat_indices_distinct_for_every_byte_value() {
        for len in [9usize, 10, 16, 255] {
            for value in 0..=255u8 {
                let mut bytes = [value; DIGEST_LEN];
                bytes[4] = value.wrapping_add(1);
                let indices = flat_unique_indices(&digest_of(bytes), len).unwrap();
                for i in 0..FLAT_SLOTS {
                    assert!(indices[i] < len);
                    assert!(!indices[..i].contains(&indices[i]));
                }
            }
        }
    }

    #[test]
    fn test_flat_unique_subgrid_is_top_left() {
        let table = PaletteTable::new(vec![Palette::from_packed(&[
            0, 1, 2, 3, 4, 5, 6, 7, 8,
        ])]);
        let mut bytes = [0u8; DIGEST_LEN];
        bytes[..9].copy_from_slice(&[0, 1, 2, 3, 4, 5, 6, 7, 8]);
        let digest = digest_of(bytes);

        let full = select_colors(&digest, &table, SelectionStrategy::FlatUnique, 3).unwrap();
        assert_eq!(full.len(), 9);
        let sub = select_colors(&digest, &table, SelectionStrategy::FlatUnique, 2).unwrap();
        let packed: Vec<u32> = sub.iter().map(|c| c.packed()).collect();
        assert_eq!(packed, vec![0, 1, 3, 4]);
    }

    #[test]
    fn test_flat_unique_too_few_colors() {
        let table = PaletteTable::new(vec![Palette::from_packed(&[1, 2, 3, 4, 5, 6, 7, 8])]);
        let digest = hash_subject(b"x", HashAlgorithm::Sha1).unwrap();
        assert!(matches!(
            select_colors(&digest, &table, SelectionStrategy::FlatUnique, 3),
            Err(IdenticonError::PaletteTooSmall { required: 9, available: 8, .. })
        ));
    }
}
