//! Grid Composition
//!
//! Cells tile the canvas exactly: edges sit on floor(i * canvas / n),
//! so neighbouring cells share a boundary and never overlap.

use log::trace;

use crate::generator::IdenticonError;
use crate::palettes::Color;
use crate::raster::{RasterBackend, Rect};

/// Pixel bounds of cell (`row`, `col`) in an `n` x `n` grid.
pub fn cell_bounds(row: u32, col: u32, canvas_size: u32, n: u32) -> Result<Rect, IdenticonError> {
    if n == 0 {
        return Err(IdenticonError::InvalidConfig(
            "grid dimension must be at least 1".to_string(),
        ));
    }
    let edge = |i: u32| (i as u64 * canvas_size as u64 / n as u64) as u32;
    Ok(Rect::new(edge(col), edge(row), edge(col + 1), edge(row + 1)))
}

/// Paint `colors` (row-major) as an `n` x `n` grid on a fresh square canvas.
pub fn compose<B: RasterBackend>(
    backend: &B,
    colors: &[Color],
    canvas_size: u32,
    n: u32,
) -> Result<B::Surface, IdenticonError> {
    if n == 0 {
        return Err(IdenticonError::InvalidConfig(
            "grid dimension must be at least 1".to_string(),
        ));
    }
    let cells = n as usize * n as usize;
    if colors.len() < cells {
        return Err(IdenticonError::TooFewColors {
            required: cells,
            available: colors.len(),
        });
    }

    let mut surface = backend.create(canvas_size, canvas_size)?;
    for row in 0..n {
        for col in 0..n {
            let color = colors[(row * n + col) as usize];
            let rect = cell_bounds(row, col, canvas_size, n)?;
            trace!("cell ({}, {}) {:?} {}", row, col, rect, color);
            backend.fill_rect(&mut surface, rect, color);
        }
    }

    Ok(surface)
}
