// Adapters layer: concrete implementations of the domain ports (postal-code
// service, text generation service, document export).

pub mod export;
pub mod gemini;
pub mod viacep;

pub use export::{ExternalPdfExporter, HtmlFileExporter};
pub use gemini::GeminiGenerator;
pub use viacep::ViaCepLookup;
