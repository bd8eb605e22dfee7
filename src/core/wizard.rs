use crate::core::formatters::{format_for, is_complete_cep, only_digits};
use crate::core::prompt::build_generation_request;
use crate::core::signature::PadEvent;
use crate::domain::model::{
    AddressInfo, AddressTarget, Contact, ContactField, ContractRecord, FieldId, FieldKind, PartyField,
    PartyRole, ServiceType, WizardStep,
};
use crate::domain::ports::GenerationRequest;
use crate::utils::error::{ContractError, Result};
use chrono::{Datelike, NaiveDate};

pub const GENERATION_FAILED_MESSAGE: &str =
    "Ocorreu um erro ao gerar o contrato. Tente novamente.";

const MONTHS_PT_BR: [&str; 12] = [
    "janeiro",
    "fevereiro",
    "março",
    "abril",
    "maio",
    "junho",
    "julho",
    "agosto",
    "setembro",
    "outubro",
    "novembro",
    "dezembro",
];

/// Long pt-BR date as printed above the signatures: `16 de outubro de 2026`.
pub fn format_signature_date(date: NaiveDate) -> String {
    format!(
        "{} de {} de {}",
        date.day(),
        MONTHS_PT_BR[date.month0() as usize],
        date.year()
    )
}

/// A postal-code edit that completed a code and wants its address refreshed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRequest {
    pub target: AddressTarget,
    pub cep: String,
}

/// The wizard: current step, the record being filled and the last
/// user-visible error.
#[derive(Debug, Clone, Default)]
pub struct Wizard {
    step: WizardStep,
    record: ContractRecord,
    last_error: Option<String>,
}

impl Wizard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn record(&self) -> &ContractRecord {
        &self.record
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn expect_step(&self, expected: WizardStep, action: &'static str) -> Result<()> {
        if self.step != expected {
            return Err(ContractError::InvalidTransition {
                from: self.step,
                action,
            });
        }
        Ok(())
    }

    fn move_to(&mut self, next: WizardStep) {
        tracing::debug!("wizard step {} -> {} ({:?})", self.step.label(), next.label(), next);
        self.step = next;
    }

    pub fn select_service(&mut self, service: ServiceType) -> Result<()> {
        self.expect_step(WizardStep::SelectService, "select_service")?;
        self.record.service_type = service;
        self.move_to(WizardStep::InputDetails);
        Ok(())
    }

    /// Stores one keystroke's worth of input, masked for the field's kind.
    /// Returns a lookup request when a postal code just became complete.
    pub fn set_field(&mut self, field: FieldId, raw: &str) -> Result<Option<LookupRequest>> {
        self.expect_step(WizardStep::InputDetails, "set_field")?;

        let kind = field.kind();
        let formatted = format_for(kind, raw);
        let lookup = match field.address_target() {
            Some(target) if kind == FieldKind::PostalCode && is_complete_cep(&formatted) => {
                Some(LookupRequest {
                    target,
                    cep: only_digits(&formatted),
                })
            }
            _ => None,
        };

        match field {
            FieldId::Party(role, PartyField::Contact(c)) => {
                set_contact_field(&mut self.record.party_mut(role).contact, c, formatted)
            }
            FieldId::Party(role, PartyField::Rg) => {
                self.record.party_mut(role).rg = (!formatted.is_empty()).then_some(formatted)
            }
            FieldId::Party(role, PartyField::CivilStatus) => {
                self.record.party_mut(role).civil_status = formatted
            }
            FieldId::Party(role, PartyField::Profession) => {
                self.record.party_mut(role).profession = formatted
            }
            FieldId::Witness(slot, c) => set_contact_field(self.record.witness_mut(slot), c, formatted),
            FieldId::Value => self.record.value = formatted,
            FieldId::Scope => self.record.scope = formatted,
            FieldId::StartDate => self.record.start_date = parse_date(field, &formatted)?,
            FieldId::EndDate => self.record.end_date = parse_date(field, &formatted)?,
        }

        Ok(lookup)
    }

    pub fn set_include_witnesses(&mut self, include: bool) -> Result<()> {
        self.expect_step(WizardStep::InputDetails, "set_include_witnesses")?;
        self.record.include_witnesses = include;
        Ok(())
    }

    /// Merges a lookup result into its own sub-record. Accepted in every step:
    /// lookups are not cancelled when the user moves on.
    pub fn apply_address(&mut self, target: AddressTarget, info: AddressInfo) {
        let contact = self.record.contact_mut(target);
        let keep_or_replace = |slot: &mut String, value: Option<String>| {
            if let Some(v) = value.filter(|v| !v.is_empty()) {
                *slot = v;
            }
        };
        keep_or_replace(&mut contact.address, info.street);
        keep_or_replace(&mut contact.city, info.city);
        keep_or_replace(&mut contact.state, info.state);
    }

    /// Names of required fields that are still empty.
    pub fn missing_required(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        // Whitespace-only input counts as empty.
        if self.record.provider.contact.name.trim().is_empty() {
            missing.push("provider.name");
        }
        if self.record.client.contact.name.trim().is_empty() {
            missing.push("client.name");
        }
        if self.record.scope.trim().is_empty() {
            missing.push("scope");
        }
        missing
    }

    /// Leaves the details form for `Generating` and hands back what the
    /// generator should be asked. Rejected without a transition when a
    /// required field is empty.
    pub fn submit(&mut self, temperature: f32) -> Result<GenerationRequest> {
        self.expect_step(WizardStep::InputDetails, "submit")?;
        let missing = self.missing_required();
        if !missing.is_empty() {
            return Err(ContractError::MissingRequiredFields { fields: missing });
        }

        self.last_error = None;
        self.move_to(WizardStep::Generating);
        Ok(build_generation_request(&self.record, temperature))
    }

    pub fn complete_generation(&mut self, outcome: Result<String>) -> Result<()> {
        self.expect_step(WizardStep::Generating, "complete_generation")?;
        match outcome {
            Ok(text) => {
                self.record.generated_content = text;
                self.move_to(WizardStep::PreviewEdit);
            }
            Err(e) => {
                tracing::error!("contract generation failed: {}", e);
                self.last_error = Some(GENERATION_FAILED_MESSAGE.to_string());
                self.move_to(WizardStep::InputDetails);
            }
        }
        Ok(())
    }

    pub fn edit_contract(&mut self, text: impl Into<String>) -> Result<()> {
        self.expect_step(WizardStep::PreviewEdit, "edit_contract")?;
        self.record.generated_content = text.into();
        Ok(())
    }

    pub fn back_to_details(&mut self) -> Result<()> {
        self.expect_step(WizardStep::PreviewEdit, "back_to_details")?;
        self.move_to(WizardStep::InputDetails);
        Ok(())
    }

    pub fn approve(&mut self) -> Result<()> {
        self.expect_step(WizardStep::PreviewEdit, "approve")?;
        self.move_to(WizardStep::Signature);
        Ok(())
    }

    /// Applies what a signature pad reported for `role`.
    pub fn apply_pad_event(&mut self, role: PartyRole, event: PadEvent) -> Result<()> {
        self.expect_step(WizardStep::Signature, "signature")?;
        let slot = self.record.signature_mut(role);
        match event {
            PadEvent::Saved(image) => *slot = Some(image),
            PadEvent::Cleared => *slot = None,
        }
        Ok(())
    }

    pub fn can_finalize(&self) -> bool {
        self.step == WizardStep::Signature
            && self.record.provider_signature.is_some()
            && self.record.client_signature.is_some()
    }

    pub fn finalize(&mut self) -> Result<()> {
        self.finalize_on(chrono::Local::now().date_naive())
    }

    /// Moves to `Final`, stamping `date` as the signature date.
    pub fn finalize_on(&mut self, date: NaiveDate) -> Result<()> {
        self.expect_step(WizardStep::Signature, "finalize")?;
        if !self.can_finalize() {
            let mut fields = Vec::new();
            if self.record.provider_signature.is_none() {
                fields.push("provider_signature");
            }
            if self.record.client_signature.is_none() {
                fields.push("client_signature");
            }
            return Err(ContractError::MissingRequiredFields { fields });
        }
        self.record.signature_date = Some(format_signature_date(date));
        self.move_to(WizardStep::Final);
        Ok(())
    }

    /// "Start new contract": back to the first step with an empty record.
    pub fn reset(&mut self) {
        tracing::info!("starting a new contract");
        *self = Wizard::new();
    }
}

fn set_contact_field(contact: &mut Contact, field: ContactField, value: String) {
    let slot = match field {
        ContactField::Name => &mut contact.name,
        ContactField::Doc => &mut contact.doc,
        ContactField::Email => &mut contact.email,
        ContactField::Phone => &mut contact.phone,
        ContactField::Cep => &mut contact.cep,
        ContactField::Address => &mut contact.address,
        ContactField::City => &mut contact.city,
        ContactField::State => &mut contact.state,
    };
    *slot = value;
}

fn parse_date(field: FieldId, value: &str) -> Result<Option<NaiveDate>> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(Some)
        .map_err(|e| ContractError::InvalidInput {
            field: field.to_string(),
            reason: format!("expected YYYY-MM-DD: {e}"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{SignatureImage, WitnessSlot};

    fn field(key: &str) -> FieldId {
        key.parse().unwrap()
    }

    fn details_wizard() -> Wizard {
        let mut wizard = Wizard::new();
        wizard.select_service(ServiceType::Consulting).unwrap();
        wizard
    }

    fn filled_wizard() -> Wizard {
        let mut wizard = details_wizard();
        wizard.set_field(field("provider.name"), "Maria Souza").unwrap();
        wizard.set_field(field("client.name"), "João Lima").unwrap();
        wizard.set_field(field("scope"), "Consultoria financeira").unwrap();
        wizard
    }

    fn signature() -> SignatureImage {
        SignatureImage(format!("{}AAAA", SignatureImage::PNG_PREFIX))
    }

    #[test]
    fn select_service_moves_to_details() {
        let wizard = details_wizard();
        assert_eq!(wizard.step(), WizardStep::InputDetails);
        assert_eq!(wizard.record().service_type, ServiceType::Consulting);
    }

    #[test]
    fn set_field_masks_by_kind() {
        let mut wizard = details_wizard();
        wizard.set_field(field("provider.doc"), "12345678901").unwrap();
        wizard.set_field(field("client.phone"), "11987654321").unwrap();
        wizard.set_field(field("client.rg"), "123456789").unwrap();
        wizard.set_field(field("value"), "500000").unwrap();
        wizard.set_field(field("witness1.doc"), "98765432100").unwrap();

        let record = wizard.record();
        assert_eq!(record.provider.contact.doc, "123.456.789-01");
        assert_eq!(record.client.contact.phone, "(11) 98765-4321");
        assert_eq!(record.client.rg.as_deref(), Some("12.345.678-9"));
        assert_eq!(record.value, "5.000,00");
        assert_eq!(record.witness(WitnessSlot::First).unwrap().doc, "987.654.321-00");
    }

    #[test]
    fn empty_rg_is_none() {
        let mut wizard = details_wizard();
        wizard.set_field(field("provider.rg"), "12").unwrap();
        wizard.set_field(field("provider.rg"), "").unwrap();
        assert_eq!(wizard.record().provider.rg, None);
    }

    #[test]
    fn complete_cep_requests_exactly_one_lookup() {
        let mut wizard = details_wizard();
        let mut requests = Vec::new();
        for typed in ["0", "01", "013", "0131", "01310", "013101", "0131010", "01310100"] {
            if let Some(req) = wizard.set_field(field("provider.cep"), typed).unwrap() {
                requests.push(req);
            }
        }
        assert_eq!(
            requests,
            vec![LookupRequest {
                target: AddressTarget::Party(PartyRole::Provider),
                cep: "01310100".to_string(),
            }]
        );
        assert_eq!(wizard.record().provider.contact.cep, "01310-100");
    }

    #[test]
    fn dates_are_parsed_or_rejected() {
        let mut wizard = details_wizard();
        wizard.set_field(field("start_date"), "2026-11-01").unwrap();
        assert_eq!(
            wizard.record().start_date,
            NaiveDate::from_ymd_opt(2026, 11, 1)
        );

        let err = wizard.set_field(field("start_date"), "01/11/2026").unwrap_err();
        assert!(matches!(err, ContractError::InvalidInput { .. }));
        assert_eq!(
            wizard.record().start_date,
            NaiveDate::from_ymd_opt(2026, 11, 1)
        );

        wizard.set_field(field("start_date"), "").unwrap();
        assert_eq!(wizard.record().start_date, None);
    }

    #[test]
    fn address_merge_keeps_fields_not_returned() {
        let mut wizard = details_wizard();
        wizard.set_field(field("client.city"), "Campinas").unwrap();
        wizard.apply_address(
            AddressTarget::Party(PartyRole::Client),
            AddressInfo {
                street: Some("Avenida Paulista".to_string()),
                city: None,
                state: Some("SP".to_string()),
            },
        );
        let client = &wizard.record().client.contact;
        assert_eq!(client.address, "Avenida Paulista");
        assert_eq!(client.city, "Campinas");
        assert_eq!(client.state, "SP");
        // the other party is untouched
        assert_eq!(wizard.record().provider.contact, Contact::default());
    }

    #[test]
    fn submit_rejected_when_required_fields_empty() {
        let mut wizard = details_wizard();
        wizard.set_field(field("provider.name"), "Maria").unwrap();
        let err = wizard.submit(0.4).unwrap_err();
        match err {
            ContractError::MissingRequiredFields { fields } => {
                assert_eq!(fields, vec!["client.name", "scope"])
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(wizard.step(), WizardStep::InputDetails);
    }

    #[test]
    fn whitespace_only_required_fields_count_as_missing() {
        let mut wizard = details_wizard();
        wizard.set_field(field("provider.name"), "   ").unwrap();
        wizard.set_field(field("client.name"), "Beto").unwrap();
        wizard.set_field(field("scope"), "\t\n").unwrap();
        assert_eq!(wizard.missing_required(), vec!["provider.name", "scope"]);
        assert!(matches!(
            wizard.submit(0.4),
            Err(ContractError::MissingRequiredFields { .. })
        ));
    }

    #[test]
    fn generation_failure_returns_to_details_with_error() {
        let mut wizard = filled_wizard();
        wizard.submit(0.4).unwrap();
        assert_eq!(wizard.step(), WizardStep::Generating);
        assert!(wizard.set_field(field("scope"), "x").is_err());

        wizard
            .complete_generation(Err(ContractError::Generation {
                message: "timeout".to_string(),
            }))
            .unwrap();
        assert_eq!(wizard.step(), WizardStep::InputDetails);
        assert_eq!(wizard.last_error(), Some(GENERATION_FAILED_MESSAGE));
        assert_eq!(wizard.record().scope, "Consultoria financeira");

        // a new submission clears the error
        wizard.submit(0.4).unwrap();
        assert_eq!(wizard.last_error(), None);
    }

    #[test]
    fn preview_can_go_back_or_approve() {
        let mut wizard = filled_wizard();
        wizard.submit(0.4).unwrap();
        wizard.complete_generation(Ok("CONTRATO".to_string())).unwrap();
        assert_eq!(wizard.step(), WizardStep::PreviewEdit);

        wizard.edit_contract("CONTRATO EDITADO").unwrap();
        wizard.back_to_details().unwrap();
        assert_eq!(wizard.step(), WizardStep::InputDetails);
        assert_eq!(wizard.record().generated_content, "CONTRATO EDITADO");

        wizard.submit(0.4).unwrap();
        wizard.complete_generation(Ok("CONTRATO 2".to_string())).unwrap();
        wizard.approve().unwrap();
        assert_eq!(wizard.step(), WizardStep::Signature);
    }

    #[test]
    fn actions_out_of_order_are_rejected() {
        let mut wizard = Wizard::new();
        assert!(matches!(
            wizard.approve(),
            Err(ContractError::InvalidTransition { from: WizardStep::SelectService, .. })
        ));
        assert!(wizard.set_field(field("scope"), "x").is_err());
        assert!(wizard.finalize().is_err());
        assert!(wizard.complete_generation(Ok(String::new())).is_err());
        assert_eq!(wizard.step(), WizardStep::SelectService);
    }

    #[test]
    fn finalize_needs_both_signatures_and_stamps_date() {
        let mut wizard = filled_wizard();
        wizard.submit(0.4).unwrap();
        wizard.complete_generation(Ok("TEXTO".to_string())).unwrap();
        wizard.approve().unwrap();

        wizard
            .apply_pad_event(PartyRole::Provider, PadEvent::Saved(signature()))
            .unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        assert!(wizard.finalize_on(date).is_err());

        wizard
            .apply_pad_event(PartyRole::Client, PadEvent::Saved(signature()))
            .unwrap();
        wizard.apply_pad_event(PartyRole::Client, PadEvent::Cleared).unwrap();
        assert!(!wizard.can_finalize());
        wizard
            .apply_pad_event(PartyRole::Client, PadEvent::Saved(signature()))
            .unwrap();

        wizard.finalize_on(date).unwrap();
        assert_eq!(wizard.step(), WizardStep::Final);
        assert_eq!(
            wizard.record().signature_date.as_deref(),
            Some("16 de outubro de 2026")
        );
    }

    #[test]
    fn late_address_merge_applies_after_navigation() {
        let mut wizard = filled_wizard();
        wizard.submit(0.4).unwrap();
        wizard.apply_address(
            AddressTarget::Witness(WitnessSlot::Second),
            AddressInfo {
                street: Some("Rua Augusta".to_string()),
                city: Some("São Paulo".to_string()),
                state: Some("SP".to_string()),
            },
        );
        assert_eq!(
            wizard.record().witness(WitnessSlot::Second).unwrap().address,
            "Rua Augusta"
        );
    }

    #[test]
    fn reset_clears_everything() {
        let mut wizard = filled_wizard();
        wizard.submit(0.4).unwrap();
        wizard.reset();
        assert_eq!(wizard.step(), WizardStep::SelectService);
        assert_eq!(wizard.record(), &ContractRecord::default());
        assert_eq!(wizard.last_error(), None);
    }

    #[test]
    fn signature_date_uses_portuguese_month_names() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 5).unwrap();
        assert_eq!(format_signature_date(date), "5 de março de 2025");
    }
}
