//! A scripted wizard run: the service, raw field inputs in the order they are
//! typed, an optional hand edit of the draft and the signature strokes.
//!
//! ```toml
//! service = "Consultoria"
//! include_witnesses = false
//!
//! [[input]]
//! field = "provider.cep"
//! value = "01310100"
//! keystrokes = true
//!
//! [signatures]
//! provider = [[[10.0, 50.0], [60.0, 40.0], [120.0, 70.0]]]
//! client = [[[15.0, 60.0], [90.0, 65.0]]]
//! ```

use crate::config::toml_config::substitute_env_vars;
use crate::core::session::WizardSession;
use crate::core::signature::{Point, PointerAction, PointerEvent, PointerSource, SignaturePad};
use crate::domain::model::{FieldId, PartyRole, ServiceType};
use crate::domain::ports::{AddressLookup, ContractGenerator};
use crate::utils::error::{ContractError, Result};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One pen-down-to-pen-up path, in surface pixels.
pub type Stroke = Vec<[f32; 2]>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionScript {
    pub service: String,
    #[serde(default)]
    pub include_witnesses: bool,
    #[serde(default, rename = "input")]
    pub inputs: Vec<ScriptedInput>,
    /// Replaces the generated draft before approval.
    pub contract_edit: Option<String>,
    #[serde(default)]
    pub signatures: ScriptedSignatures,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptedInput {
    pub field: String,
    pub value: String,
    /// Feed the value one character at a time, as a user would type it.
    #[serde(default)]
    pub keystrokes: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScriptedSignatures {
    #[serde(default)]
    pub provider: Vec<Stroke>,
    #[serde(default)]
    pub client: Vec<Stroke>,
}

impl SessionScript {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ContractError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(&substitute_env_vars(content)).map_err(|e| ContractError::ConfigValidationError {
            field: "session_script".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    pub fn service_type(&self) -> Result<ServiceType> {
        self.service
            .parse::<ServiceType>()
            .map_err(|reason| ContractError::InvalidInput {
                field: "service".to_string(),
                reason,
            })
    }

    pub fn fields(&self) -> Result<Vec<(FieldId, &ScriptedInput)>> {
        self.inputs
            .iter()
            .map(|input| {
                input
                    .field
                    .parse::<FieldId>()
                    .map(|id| (id, input))
                    .map_err(|reason| ContractError::InvalidInput {
                        field: input.field.clone(),
                        reason,
                    })
            })
            .collect()
    }

    pub fn strokes(&self, role: PartyRole) -> &[Stroke] {
        match role {
            PartyRole::Provider => &self.signatures.provider,
            PartyRole::Client => &self.signatures.client,
        }
    }

    /// Selects the service and types every input into the session. Lookups
    /// started along the way are left in flight.
    pub fn fill_details<L, G>(&self, session: &mut WizardSession<L, G>) -> Result<()>
    where
        L: AddressLookup + 'static,
        G: ContractGenerator,
    {
        session.select_service(self.service_type()?)?;
        session.set_include_witnesses(self.include_witnesses)?;

        for (field, input) in self.fields()? {
            if input.keystrokes {
                let mut typed = String::new();
                for c in input.value.chars() {
                    typed.push(c);
                    session.input(field, &typed)?;
                }
            } else {
                session.input(field, &input.value)?;
            }
            tracing::debug!("{} <- {:?}", field, input.value);
        }
        Ok(())
    }

    /// Replays the strokes for `role` on `pad` as mouse input.
    pub fn draw(&self, role: PartyRole, pad: &mut SignaturePad) {
        let mouse = |action| PointerEvent {
            source: PointerSource::Mouse,
            action,
        };
        for stroke in self.strokes(role) {
            let mut points = stroke.iter().map(|[x, y]| Point::new(*x, *y));
            let Some(start) = points.next() else {
                continue;
            };
            pad.handle(mouse(PointerAction::Down(start)));
            for p in points {
                pad.handle(mouse(PointerAction::Move(p)));
            }
            pad.handle(mouse(PointerAction::Up));
        }
    }
}

impl Validate for SessionScript {
    fn validate(&self) -> Result<()> {
        self.service_type()?;
        self.fields()?;
        Ok(())
    }
}
