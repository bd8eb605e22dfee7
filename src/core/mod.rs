pub mod document;
pub mod formatters;
pub mod prompt;
pub mod renderer;
pub mod session;
pub mod signature;
pub mod wizard;

pub use crate::domain::model::{ContractRecord, FieldId, WizardStep};
pub use crate::domain::ports::{AddressLookup, ContractGenerator, DocumentExporter};
pub use crate::utils::error::Result;
pub use session::WizardSession;
pub use signature::SignaturePad;
pub use wizard::Wizard;
