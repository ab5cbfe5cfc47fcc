//! JSON Requests
//!
//! Lets embedding callers hand over a loosely typed payload. Types are
//! checked here, before anything is hashed or drawn.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::generator::{Generator, GeneratorOptions, IdenticonError};
use crate::hashing::sha256_hex;
use crate::output::{to_base64, CONTENT_TYPE_PNG, DATA_URL_PREFIX};
use crate::palettes::PaletteTable;
use crate::selection::SelectionStrategy;
use crate::{DEFAULT_SIZE, ENGINE_VERSION};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdenticonRequest {
    pub subject: Value,
    #[serde(default)]
    pub size: Option<Value>,
    #[serde(default)]
    pub strategy: Option<SelectionStrategy>,
    #[serde(default)]
    pub grid_dim: Option<u32>,
    #[serde(default)]
    pub palettes: Option<PaletteTable>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedIdenticon {
    pub digest: String,
    pub size: u32,
    pub format: String,
    pub content_type: String,
    pub engine_version: String,
    pub data_base64: String,
    pub hash: String,
}

impl RenderedIdenticon {
    pub fn data_url(&self) -> String {
        format!("{}{}", DATA_URL_PREFIX, self.data_base64)
    }
}

impl IdenticonRequest {
    pub fn from_json_str(json: &str) -> Result<Self, IdenticonError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn subject_text(&self) -> Result<&str, IdenticonError> {
        self.subject.as_str().ok_or_else(|| {
            IdenticonError::InvalidSubject(format!("expected a string, got {}", self.subject))
        })
    }

    pub fn size(&self) -> Result<u32, IdenticonError> {
        match &self.size {
            None => Ok(DEFAULT_SIZE),
            Some(value) => value
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .ok_or_else(|| IdenticonError::InvalidSize(value.to_string())),
        }
    }

    pub fn options(&self) -> Result<GeneratorOptions, IdenticonError> {
        let defaults = GeneratorOptions::default();
        let options = GeneratorOptions {
            size: self.size()?,
            strategy: self.strategy.unwrap_or(defaults.strategy),
            grid_dim: self.grid_dim.unwrap_or(defaults.grid_dim),
            ..defaults
        };
        options.validate()?;
        Ok(options)
    }

    pub fn render(&self) -> Result<RenderedIdenticon, IdenticonError> {
        let subject = self.subject_text()?;
        let options = self.options()?;
        let size = options.size;

        let mut generator = Generator::new(subject)?.with_options(options)?;
        generator.set_palettes(self.palettes.clone());
        let png = generator.generate_png()?;

        Ok(RenderedIdenticon {
            digest: generator.digest().to_hex(),
            size,
            format: "png".to_string(),
            content_type: CONTENT_TYPE_PNG.to_string(),
            engine_version: ENGINE_VERSION.to_string(),
            data_base64: to_base64(&png),
            hash: sha256_hex(&png),
        })
    }
}

/// Parse and render a JSON request in one step.
pub fn render_request(json: &str) -> Result<RenderedIdenticon, IdenticonError> {
    IdenticonRequest::from_json_str(json)?.render()
}
