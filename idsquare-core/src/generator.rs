//! Identicon Generator - Single Entry Point
//!
//! subject -> digest -> colors -> grid -> rotate -> crop.
//! Every call builds a fresh surface; nothing is cached between calls.

use image::RgbImage;
use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::compose::compose;
use crate::finalize::finalize;
use crate::hashing::{hash_subject, HashAlgorithm, SubjectDigest};
use crate::palettes::{Color, PaletteTable};
use crate::raster::{ImageBackend, RasterBackend, RasterError};
use crate::selection::{select_colors, SelectionStrategy};
use crate::DEFAULT_SIZE;

#[derive(Debug, Error)]
pub enum IdenticonError {
    #[error("Invalid subject: {0}")]
    InvalidSubject(String),

    #[error("Invalid size {0}: must be a positive, even integer")]
    InvalidSize(String),

    #[error("Invalid grid dimension {grid_dim}: must be between 1 and {max}")]
    InvalidGrid { grid_dim: u32, max: u32 },

    #[error("Digest must be at least 20 bytes long, got {0}")]
    InvalidDigest(usize),

    #[error("Palette table must contain at least one palette")]
    EmptyPaletteTable,

    #[error("Palette {palette} has {available} colors, {required} required")]
    PaletteTooSmall {
        palette: usize,
        required: usize,
        available: usize,
    },

    #[error("Grid needs {required} colors, got {available}")]
    TooFewColors { required: usize, available: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Palette table could not be loaded: {0}")]
    PaletteLoad(String),

    #[error("Raster backend failure: {0}")]
    RasterBackendFailure(#[from] RasterError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Per-call generation settings. Every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorOptions {
    #[serde(default = "default_size")]
    pub size: u32,
    #[serde(default)]
    pub strategy: SelectionStrategy,
    #[serde(default = "default_grid_dim")]
    pub grid_dim: u32,
    #[serde(default = "default_oversample")]
    pub oversample: u32,
    #[serde(default = "default_tilt_degrees")]
    pub tilt_degrees: f64,
    #[serde(default = "default_true")]
    pub quarter_turns: bool,
    #[serde(default = "default_padding_divisor")]
    pub padding_divisor: u32,
    #[serde(default = "default_background")]
    pub background: Color,
    #[serde(default)]
    pub hash: HashAlgorithm,
}

fn default_size() -> u32 { DEFAULT_SIZE }
fn default_grid_dim() -> u32 { 2 }
fn default_oversample() -> u32 { 2 }
fn default_tilt_degrees() -> f64 { 5.0 }
fn default_true() -> bool { true }
fn default_padding_divisor() -> u32 { 10 }
fn default_background() -> Color { Color::BLACK }

const MAX_OVERSAMPLE: u32 = 8;

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            size: default_size(),
            strategy: SelectionStrategy::default(),
            grid_dim: default_grid_dim(),
            oversample: default_oversample(),
            tilt_degrees: default_tilt_degrees(),
            quarter_turns: true,
            padding_divisor: default_padding_divisor(),
            background: default_background(),
            hash: HashAlgorithm::default(),
        }
    }
}

impl GeneratorOptions {
    pub fn from_json_str(json: &str) -> Result<Self, IdenticonError> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), IdenticonError> {
        validate_size(self.size)?;
        self.validate_layout()
    }

    /// Everything except the output size.
    pub fn validate_layout(&self) -> Result<(), IdenticonError> {
        self.strategy.check_grid_dim(self.grid_dim)?;
        if self.oversample == 0 || self.oversample > MAX_OVERSAMPLE {
            return Err(IdenticonError::InvalidConfig(format!(
                "oversample must be between 1 and {}, got {}",
                MAX_OVERSAMPLE, self.oversample
            )));
        }
        if self.padding_divisor < 2 {
            return Err(IdenticonError::InvalidConfig(format!(
                "padding divisor must be at least 2, got {}",
                self.padding_divisor
            )));
        }
        if !self.tilt_degrees.is_finite() {
            return Err(IdenticonError::InvalidConfig(
                "tilt angle must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

/// Output sizes must be positive and even.
pub fn validate_size(size: u32) -> Result<(), IdenticonError> {
    if size == 0 || size % 2 == 1 {
        return Err(IdenticonError::InvalidSize(size.to_string()));
    }
    Ok(())
}

/// Identicon generator for one subject.
///
/// Holds the subject and its digest together; changing the subject or
/// the hash algorithm recomputes the digest. Without a custom palette
/// table the built-in one is used.
pub struct Generator<B: RasterBackend = ImageBackend> {
    subject: Vec<u8>,
    digest: SubjectDigest,
    palettes: Option<PaletteTable>,
    options: GeneratorOptions,
    backend: B,
}

impl Generator<ImageBackend> {
    pub fn new(subject: impl AsRef<[u8]>) -> Result<Self, IdenticonError> {
        Self::with_backend(subject, ImageBackend)
    }
}

impl<B: RasterBackend> Generator<B> {
    pub fn with_backend(subject: impl AsRef<[u8]>, backend: B) -> Result<Self, IdenticonError> {
        let options = GeneratorOptions::default();
        let subject = subject.as_ref().to_vec();
        let digest = hash_subject(&subject, options.hash)?;
        Ok(Self {
            subject,
            digest,
            palettes: None,
            options,
            backend,
        })
    }

    pub fn subject(&self) -> &[u8] {
        &self.subject
    }

    pub fn set_subject(&mut self, subject: impl AsRef<[u8]>) -> Result<(), IdenticonError> {
        let subject = subject.as_ref().to_vec();
        self.digest = hash_subject(&subject, self.options.hash)?;
        self.subject = subject;
        Ok(())
    }

    pub fn digest(&self) -> &SubjectDigest {
        &self.digest
    }

    /// The table selection will read: the custom one, else the built-in.
    pub fn palettes(&self) -> &PaletteTable {
        self.palettes.as_ref().unwrap_or_else(|| PaletteTable::builtin())
    }

    /// Replace the palette table. `None` goes back to the built-in table;
    /// an explicitly empty table is kept and fails at generation.
    pub fn set_palettes(&mut self, palettes: Option<PaletteTable>) {
        self.palettes = palettes;
    }

    pub fn with_palettes(mut self, palettes: PaletteTable) -> Self {
        self.palettes = Some(palettes);
        self
    }

    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: GeneratorOptions) -> Result<(), IdenticonError> {
        options.validate()?;
        if options.hash != self.options.hash {
            self.digest = hash_subject(&self.subject, options.hash)?;
        }
        self.options = options;
        Ok(())
    }

    pub fn with_options(mut self, options: GeneratorOptions) -> Result<Self, IdenticonError> {
        self.set_options(options)?;
        Ok(self)
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Generate at the configured size.
    pub fn generate(&self) -> Result<B::Surface, IdenticonError> {
        self.generate_sized(self.options.size)
    }

    /// Generate a `size` x `size` identicon.
    pub fn generate_sized(&self, size: u32) -> Result<B::Surface, IdenticonError> {
        validate_size(size)?;
        self.options.validate_layout()?;

        let options = &self.options;
        let colors = select_colors(&self.digest, self.palettes(), options.strategy, options.grid_dim)?;

        let canvas_size = size
            .checked_mul(options.oversample)
            .ok_or_else(|| IdenticonError::InvalidSize(size.to_string()))?;
        debug!(
            "generating {}px identicon for digest {} ({:?}, {}x{} grid, canvas {})",
            size,
            self.digest.to_hex(),
            options.strategy,
            options.grid_dim,
            options.grid_dim,
            canvas_size
        );

        let surface = compose(&self.backend, &colors, canvas_size, options.grid_dim)?;
        finalize(&self.backend, surface, canvas_size, size, options, &self.digest)
    }
}

/// Generate a `size` x `size` identicon with the built-in palettes.
pub fn generate(subject: impl AsRef<[u8]>, size: u32) -> Result<RgbImage, IdenticonError> {
    Generator::new(subject)?.generate_sized(size)
}

/// Generate with an optional custom palette table and explicit options.
pub fn generate_with(
    subject: impl AsRef<[u8]>,
    palettes: Option<PaletteTable>,
    options: GeneratorOptions,
) -> Result<RgbImage, IdenticonError> {
    let mut generator = Generator::new(subject)?.with_options(options)?;
    generator.set_palettes(palettes);
    generator.generate()
}
