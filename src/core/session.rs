//! Drives a [`Wizard`] against live collaborators.
//!
//! Postal-code lookups run in the background while input continues; their
//! merges are applied whenever the owner calls [`WizardSession::pump`] or
//! [`WizardSession::settle`]. Generation is awaited in place, so nothing can
//! edit the record while the wizard sits in `Generating`.

use crate::core::prompt::DEFAULT_TEMPERATURE;
use crate::core::signature::PadEvent;
use crate::core::wizard::{LookupRequest, Wizard};
use crate::domain::model::{AddressInfo, AddressTarget, FieldId, PartyRole, ServiceType, WizardStep};
use crate::domain::ports::{AddressLookup, ContractGenerator};
use crate::utils::error::{ContractError, Result};
use std::sync::Arc;
use tokio::task::{JoinError, JoinSet};

struct LookupOutcome {
    target: AddressTarget,
    info: Option<AddressInfo>,
}

pub struct WizardSession<L, G> {
    wizard: Wizard,
    lookup: Arc<L>,
    generator: G,
    temperature: f32,
    lookups: JoinSet<LookupOutcome>,
}

impl<L, G> WizardSession<L, G>
where
    L: AddressLookup + 'static,
    G: ContractGenerator,
{
    pub fn new(lookup: L, generator: G) -> Self {
        Self {
            wizard: Wizard::new(),
            lookup: Arc::new(lookup),
            generator,
            temperature: DEFAULT_TEMPERATURE,
            lookups: JoinSet::new(),
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn wizard(&self) -> &Wizard {
        &self.wizard
    }

    pub fn step(&self) -> WizardStep {
        self.wizard.step()
    }

    pub fn pending_lookups(&self) -> usize {
        self.lookups.len()
    }

    pub fn select_service(&mut self, service: ServiceType) -> Result<()> {
        self.wizard.select_service(service)
    }

    pub fn set_include_witnesses(&mut self, include: bool) -> Result<()> {
        self.wizard.set_include_witnesses(include)
    }

    /// Applies one raw input. A postal code that just became complete starts a
    /// lookup in the background; its result lands on a later `pump`/`settle`.
    pub fn input(&mut self, field: FieldId, raw: &str) -> Result<()> {
        if let Some(request) = self.wizard.set_field(field, raw)? {
            self.spawn_lookup(request);
        }
        Ok(())
    }

    fn spawn_lookup(&mut self, request: LookupRequest) {
        let lookup = Arc::clone(&self.lookup);
        tracing::debug!("📮 Looking up postal code {} for {:?}", request.cep, request.target);
        self.lookups.spawn(async move {
            let info = match lookup.lookup(&request.cep).await {
                Ok(info) => info,
                Err(e) => {
                    tracing::warn!("Postal code lookup for {} failed: {}", request.cep, e);
                    None
                }
            };
            LookupOutcome {
                target: request.target,
                info,
            }
        });
    }

    fn apply_outcome(&mut self, joined: std::result::Result<LookupOutcome, JoinError>) {
        match joined {
            Ok(LookupOutcome {
                target,
                info: Some(info),
            }) => self.wizard.apply_address(target, info),
            Ok(LookupOutcome { info: None, .. }) => {}
            Err(e) => tracing::warn!("Postal code lookup task ended abnormally: {}", e),
        }
    }

    /// Applies every lookup that already finished, without waiting.
    /// Returns how many were drained.
    pub fn pump(&mut self) -> usize {
        let mut drained = 0;
        while let Some(joined) = self.lookups.try_join_next() {
            self.apply_outcome(joined);
            drained += 1;
        }
        drained
    }

    /// Waits for every in-flight lookup and applies its result.
    pub async fn settle(&mut self) {
        while let Some(joined) = self.lookups.join_next().await {
            self.apply_outcome(joined);
        }
    }

    /// Submits the details form and awaits the generated contract.
    ///
    /// On failure the wizard is already back in `InputDetails` with its
    /// user-visible error set; the error is returned as well so callers can
    /// log or report it.
    pub async fn generate(&mut self) -> Result<()> {
        self.pump();
        let request = self.wizard.submit(self.temperature)?;

        tracing::info!("✍️  Generating contract for {}", self.wizard.record().service_type);
        let outcome = self.generator.generate(&request).await;
        let failure = outcome.as_ref().err().map(|e| ContractError::Generation {
            message: e.to_string(),
        });

        self.wizard.complete_generation(outcome)?;
        self.pump();

        match failure {
            Some(e) => Err(e),
            None => {
                tracing::info!("✅ Contract draft ready for review");
                Ok(())
            }
        }
    }

    pub fn edit_contract(&mut self, text: impl Into<String>) -> Result<()> {
        self.wizard.edit_contract(text)
    }

    pub fn back_to_details(&mut self) -> Result<()> {
        self.wizard.back_to_details()
    }

    pub fn approve(&mut self) -> Result<()> {
        self.wizard.approve()
    }

    pub fn apply_pad_event(&mut self, role: PartyRole, event: PadEvent) -> Result<()> {
        self.wizard.apply_pad_event(role, event)
    }

    pub fn finalize(&mut self) -> Result<()> {
        self.pump();
        self.wizard.finalize()
    }

    /// Starts over. Lookups still in flight are not cancelled and merge into
    /// the fresh record when they land.
    pub fn reset(&mut self) {
        self.wizard.reset();
    }
}
