//! IdSquare Core - Deterministic Square Identicons
//!
//! # Guarantees
//! 1. Same subject, same digest
//! 2. Same digest, palettes and options, same pixels
//! 3. Output is exactly `size` x `size`, fully painted
//! 4. Bad input fails before anything is drawn

pub mod hashing;
pub mod palettes;
pub mod selection;
pub mod raster;
pub mod compose;
pub mod finalize;
pub mod generator;
pub mod output;
pub mod request;

pub use hashing::{hash_subject, HashAlgorithm, SubjectDigest, DIGEST_LEN};
pub use palettes::{Color, Palette, PaletteTable};
pub use selection::{select_colors, SelectionStrategy};
pub use raster::{ImageBackend, RasterBackend, RasterError, Rect};
pub use generator::{generate, generate_with, Generator, GeneratorOptions, IdenticonError};
pub use output::{to_base64, to_data_url, CONTENT_TYPE_PNG};
pub use request::{render_request, IdenticonRequest, RenderedIdenticon};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Output edge in pixels when none is given.
pub const DEFAULT_SIZE: u32 = 128;
