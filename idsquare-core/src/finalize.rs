//! Rotate and Crop
//!
//! The composed canvas is turned by a digest-chosen quarter turn, tilted,
//! then an inset square is resampled down to the output size. The inset
//! drops the rotated corners so the seams between cells stay hidden.

use log::debug;

use crate::generator::{GeneratorOptions, IdenticonError};
use crate::hashing::SubjectDigest;
use crate::raster::{RasterBackend, Rect};

/// Digest byte that picks the quarter turn.
const QUARTER_TURN_BYTE: usize = 10;

/// Crop inset from the rotated surface's origin.
pub fn padding(canvas_size: u32, padding_divisor: u32) -> Result<u32, IdenticonError> {
    canvas_size.checked_div(padding_divisor).ok_or_else(|| {
        IdenticonError::InvalidConfig("padding divisor must not be zero".to_string())
    })
}

/// Number of counter-clockwise quarter turns for this digest.
pub fn quarter_turns(digest: &SubjectDigest) -> u32 {
    (digest.byte(QUARTER_TURN_BYTE) % 4) as u32
}

/// Turn a composed `canvas_size` canvas into the `output_size` identicon.
pub fn finalize<B: RasterBackend>(
    backend: &B,
    surface: B::Surface,
    canvas_size: u32,
    output_size: u32,
    options: &GeneratorOptions,
    digest: &SubjectDigest,
) -> Result<B::Surface, IdenticonError> {
    options.validate_layout()?;
    let mut surface = surface;

    if options.quarter_turns {
        let turns = quarter_turns(digest);
        if turns != 0 {
            surface = backend.rotate(&surface, turns as f64 * 90.0, options.background)?;
        }
        debug!("quarter turns: {}", turns);
    }

    let tilted = backend.rotate(&surface, options.tilt_degrees, options.background)?;
    drop(surface);

    let inset = padding(canvas_size, options.padding_divisor)?;
    let region = Rect::square(inset, inset, canvas_size - inset);
    debug!(
        "tilt {} deg, surface {:?}, crop {:?} -> {}px",
        options.tilt_degrees,
        backend.dimensions(&tilted),
        region,
        output_size
    );

    Ok(backend.resample(&tilted, region, output_size, output_size)?)
}
