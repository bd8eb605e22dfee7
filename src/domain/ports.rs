use crate::domain::model::AddressInfo;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::PathBuf;

/// Postal-code lookup. `Ok(None)` means the service answered but knows no
/// address for the code.
#[async_trait]
pub trait AddressLookup: Send + Sync {
    async fn lookup(&self, cep: &str) -> Result<Option<AddressInfo>>;
}

/// Everything a text-generation backend needs to draft the contract body.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub system_instruction: String,
    pub prompt: String,
    pub temperature: f32,
}

/// Prompt in, contract text out. Transport and auth problems surface as
/// `ContractError::Generation`.
#[async_trait]
pub trait ContractGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageFormat {
    A4,
    Letter,
}

impl PageFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            PageFormat::A4 => "A4",
            PageFormat::Letter => "Letter",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Portrait,
    Landscape,
}

impl Orientation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::Portrait => "Portrait",
            Orientation::Landscape => "Landscape",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    pub filename: String,
    /// top, right, bottom, left in millimetres
    pub margins_mm: [u32; 4],
    pub image_quality: f32,
    pub scale: u32,
    pub page_format: PageFormat,
    pub orientation: Orientation,
}

/// Turns the printable HTML into a file. Returns the path written.
#[async_trait]
pub trait DocumentExporter: Send + Sync {
    async fn export(&self, html: &str, options: &ExportOptions) -> Result<PathBuf>;
}
