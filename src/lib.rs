pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use crate::adapters::{ExternalPdfExporter, GeminiGenerator, HtmlFileExporter, ViaCepLookup};
pub use crate::config::{SessionScript, WizardConfig};
pub use crate::core::{SignaturePad, Wizard, WizardSession};
pub use crate::domain::model::{ContractRecord, FieldId, PartyRole, ServiceType, WizardStep};
pub use crate::utils::error::{ContractError, Result};
