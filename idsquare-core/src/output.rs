//! Output - PNG Bytes, Base64 and Data URLs
//!
//! Pure byte transforms over the encoded image. No generation logic here.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::io::Write;

use crate::generator::{Generator, IdenticonError};
use crate::raster::RasterBackend;

/// Content type to send alongside the PNG bytes.
pub const CONTENT_TYPE_PNG: &str = "image/png";

pub(crate) const DATA_URL_PREFIX: &str = "data:image/png;base64,";

pub fn encode_png<B: RasterBackend>(
    backend: &B,
    surface: &B::Surface,
) -> Result<Vec<u8>, IdenticonError> {
    let mut bytes = Vec::new();
    backend.encode_png(surface, &mut bytes)?;
    Ok(bytes)
}

pub fn to_base64(png: &[u8]) -> String {
    STANDARD.encode(png)
}

pub fn to_data_url(png: &[u8]) -> String {
    format!("{}{}", DATA_URL_PREFIX, to_base64(png))
}

impl<B: RasterBackend> Generator<B> {
    /// Generate and encode as PNG.
    pub fn generate_png(&self) -> Result<Vec<u8>, IdenticonError> {
        let surface = self.generate()?;
        encode_png(self.backend(), &surface)
    }

    /// Generate and stream the PNG into `writer` (stdout, a file, a socket).
    pub fn write_png<W: Write>(&self, writer: W) -> Result<(), IdenticonError> {
        let surface = self.generate()?;
        self.backend().encode_png(&surface, writer)?;
        Ok(())
    }

    /// Generate as Base64, optionally wrapped as a `data:` URL.
    pub fn generate_base64(&self, as_data_url: bool) -> Result<String, IdenticonError> {
        let png = self.generate_png()?;
        Ok(if as_data_url {
            to_data_url(&png)
        } else {
            to_base64(&png)
        })
    }
}
