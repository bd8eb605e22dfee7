use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Category of service the contract covers. The label is what ends up in the
/// contract title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    Consulting,
    WebDev,
    Design,
    Photography,
    Marketing,
    Architecture,
    Education,
    Legal,
    Events,
    Construction,
    Video,
    PersonalTrainer,
    Health,
    Beauty,
    ItSupport,
    Cleaning,
    Transport,
    RealEstate,
    Music,
    Translation,
    Finance,
    #[default]
    General,
}

impl ServiceType {
    pub const ALL: [ServiceType; 22] = [
        ServiceType::Consulting,
        ServiceType::WebDev,
        ServiceType::Design,
        ServiceType::Photography,
        ServiceType::Marketing,
        ServiceType::Architecture,
        ServiceType::Education,
        ServiceType::Legal,
        ServiceType::Events,
        ServiceType::Construction,
        ServiceType::Video,
        ServiceType::PersonalTrainer,
        ServiceType::Health,
        ServiceType::Beauty,
        ServiceType::ItSupport,
        ServiceType::Cleaning,
        ServiceType::Transport,
        ServiceType::RealEstate,
        ServiceType::Music,
        ServiceType::Translation,
        ServiceType::Finance,
        ServiceType::General,
    ];

    /// Snake-case key, as used in serialized records and session scripts.
    pub fn key(&self) -> &'static str {
        match self {
            ServiceType::Consulting => "consulting",
            ServiceType::WebDev => "web_dev",
            ServiceType::Design => "design",
            ServiceType::Photography => "photography",
            ServiceType::Marketing => "marketing",
            ServiceType::Architecture => "architecture",
            ServiceType::Education => "education",
            ServiceType::Legal => "legal",
            ServiceType::Events => "events",
            ServiceType::Construction => "construction",
            ServiceType::Video => "video",
            ServiceType::PersonalTrainer => "personal_trainer",
            ServiceType::Health => "health",
            ServiceType::Beauty => "beauty",
            ServiceType::ItSupport => "it_support",
            ServiceType::Cleaning => "cleaning",
            ServiceType::Transport => "transport",
            ServiceType::RealEstate => "real_estate",
            ServiceType::Music => "music",
            ServiceType::Translation => "translation",
            ServiceType::Finance => "finance",
            ServiceType::General => "general",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ServiceType::Consulting => "Consultoria",
            ServiceType::WebDev => "Desenvolvimento Web",
            ServiceType::Design => "Design Gráfico",
            ServiceType::Photography => "Fotografia",
            ServiceType::Marketing => "Marketing Digital",
            ServiceType::Architecture => "Arquitetura / Eng.",
            ServiceType::Education => "Aulas / Treinamentos",
            ServiceType::Legal => "Serviços Jurídicos",
            ServiceType::Events => "Eventos / Festas",
            ServiceType::Construction => "Obras e Reformas",
            ServiceType::Video => "Edição de Vídeo",
            ServiceType::PersonalTrainer => "Personal Trainer",
            ServiceType::Health => "Saúde / Nutrição",
            ServiceType::Beauty => "Beleza / Estética",
            ServiceType::ItSupport => "Suporte T.I. / Reparo",
            ServiceType::Cleaning => "Limpeza / Diarista",
            ServiceType::Transport => "Transporte / Frete",
            ServiceType::RealEstate => "Imobiliário",
            ServiceType::Music => "Música / DJ",
            ServiceType::Translation => "Tradução / Texto",
            ServiceType::Finance => "Finanças / Contábil",
            ServiceType::General => "Serviços Gerais",
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ServiceType {
    type Err = String;

    /// Accepts either the display label (`"Consultoria"`) or the snake-case key
    /// (`"consulting"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ServiceType::ALL
            .iter()
            .copied()
            .find(|t| {
                t.label().eq_ignore_ascii_case(wanted) || t.key() == wanted
            })
            .ok_or_else(|| format!("unknown service type '{wanted}'"))
    }
}

/// Fields shared by both parties and by witnesses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    pub doc: String,
    pub email: String,
    pub phone: String,
    pub cep: String,
    pub address: String,
    pub city: String,
    pub state: String,
}

pub type Witness = Contact;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    #[serde(flatten)]
    pub contact: Contact,
    pub rg: Option<String>,
    pub civil_status: String,
    pub profession: String,
}

impl Party {
    /// A masked tax ID longer than the individual pattern belongs to a company.
    pub fn is_company(&self) -> bool {
        self.contact.doc.chars().count() > 14
    }

    pub fn first_name(&self) -> &str {
        self.contact.name.split(' ').next().unwrap_or_default()
    }
}

/// A PNG image encoded as a `data:image/png;base64,...` URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignatureImage(pub String);

impl SignatureImage {
    pub const PNG_PREFIX: &'static str = "data:image/png;base64,";

    pub fn as_data_url(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContractRecord {
    pub service_type: ServiceType,
    pub provider: Party,
    pub client: Party,
    pub value: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub scope: String,
    pub include_witnesses: bool,
    pub witness1: Option<Witness>,
    pub witness2: Option<Witness>,
    pub generated_content: String,
    pub provider_signature: Option<SignatureImage>,
    pub client_signature: Option<SignatureImage>,
    pub signature_date: Option<String>,
}

impl ContractRecord {
    pub fn party(&self, role: PartyRole) -> &Party {
        match role {
            PartyRole::Provider => &self.provider,
            PartyRole::Client => &self.client,
        }
    }

    pub fn party_mut(&mut self, role: PartyRole) -> &mut Party {
        match role {
            PartyRole::Provider => &mut self.provider,
            PartyRole::Client => &mut self.client,
        }
    }

    pub fn witness(&self, slot: WitnessSlot) -> Option<&Witness> {
        match slot {
            WitnessSlot::First => self.witness1.as_ref(),
            WitnessSlot::Second => self.witness2.as_ref(),
        }
    }

    /// Returns the witness in `slot`, creating an empty one on first access.
    pub fn witness_mut(&mut self, slot: WitnessSlot) -> &mut Witness {
        let entry = match slot {
            WitnessSlot::First => &mut self.witness1,
            WitnessSlot::Second => &mut self.witness2,
        };
        entry.get_or_insert_with(Witness::default)
    }

    pub fn contact_mut(&mut self, target: AddressTarget) -> &mut Contact {
        match target {
            AddressTarget::Party(role) => &mut self.party_mut(role).contact,
            AddressTarget::Witness(slot) => self.witness_mut(slot),
        }
    }

    pub fn signature(&self, role: PartyRole) -> Option<&SignatureImage> {
        match role {
            PartyRole::Provider => self.provider_signature.as_ref(),
            PartyRole::Client => self.client_signature.as_ref(),
        }
    }

    pub fn signature_mut(&mut self, role: PartyRole) -> &mut Option<SignatureImage> {
        match role {
            PartyRole::Provider => &mut self.provider_signature,
            PartyRole::Client => &mut self.client_signature,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum WizardStep {
    #[default]
    SelectService = 0,
    InputDetails = 1,
    Generating = 2,
    PreviewEdit = 3,
    Signature = 4,
    Final = 5,
}

impl WizardStep {
    /// Short label for progress displays. `Generating` has no indicator slot of
    /// its own and shares the details label.
    pub fn label(&self) -> &'static str {
        match self {
            WizardStep::SelectService => "Serviço",
            WizardStep::InputDetails | WizardStep::Generating => "Dados",
            WizardStep::PreviewEdit => "Revisão",
            WizardStep::Signature => "Assinatura",
            WizardStep::Final => "Pronto",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartyRole {
    Provider,
    Client,
}

impl PartyRole {
    pub fn key(&self) -> &'static str {
        match self {
            PartyRole::Provider => "provider",
            PartyRole::Client => "client",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WitnessSlot {
    First,
    Second,
}

impl WitnessSlot {
    pub fn key(&self) -> &'static str {
        match self {
            WitnessSlot::First => "witness1",
            WitnessSlot::Second => "witness2",
        }
    }
}

/// Which sub-record an address lookup result belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressTarget {
    Party(PartyRole),
    Witness(WitnessSlot),
}

/// Address fields returned by a postal-code lookup. `None` means the service
/// did not provide the value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressInfo {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactField {
    Name,
    Doc,
    Email,
    Phone,
    Cep,
    Address,
    City,
    State,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartyField {
    Contact(ContactField),
    Rg,
    CivilStatus,
    Profession,
}

/// Every editable field of the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldId {
    Party(PartyRole, PartyField),
    Witness(WitnessSlot, ContactField),
    Value,
    StartDate,
    EndDate,
    Scope,
}

/// Declared kind of a field; selects the input mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    TaxId,
    Phone,
    NationalId,
    PostalCode,
    Currency,
    Date,
    Text,
}

impl ContactField {
    fn kind(&self) -> FieldKind {
        match self {
            ContactField::Doc => FieldKind::TaxId,
            ContactField::Phone => FieldKind::Phone,
            ContactField::Cep => FieldKind::PostalCode,
            _ => FieldKind::Text,
        }
    }

    fn key(&self) -> &'static str {
        match self {
            ContactField::Name => "name",
            ContactField::Doc => "doc",
            ContactField::Email => "email",
            ContactField::Phone => "phone",
            ContactField::Cep => "cep",
            ContactField::Address => "address",
            ContactField::City => "city",
            ContactField::State => "state",
        }
    }

    fn from_key(key: &str) -> Option<Self> {
        Some(match key {
            "name" => ContactField::Name,
            "doc" => ContactField::Doc,
            "email" => ContactField::Email,
            "phone" => ContactField::Phone,
            "cep" => ContactField::Cep,
            "address" => ContactField::Address,
            "city" => ContactField::City,
            "state" => ContactField::State,
            _ => return None,
        })
    }
}

impl PartyField {
    fn from_key(key: &str) -> Option<Self> {
        Some(match key {
            "rg" => PartyField::Rg,
            "civil_status" => PartyField::CivilStatus,
            "profession" => PartyField::Profession,
            other => PartyField::Contact(ContactField::from_key(other)?),
        })
    }

    fn key(&self) -> &'static str {
        match self {
            PartyField::Contact(c) => c.key(),
            PartyField::Rg => "rg",
            PartyField::CivilStatus => "civil_status",
            PartyField::Profession => "profession",
        }
    }
}

impl FieldId {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldId::Party(_, PartyField::Contact(c)) | FieldId::Witness(_, c) => c.kind(),
            FieldId::Party(_, PartyField::Rg) => FieldKind::NationalId,
            FieldId::Party(_, _) => FieldKind::Text,
            FieldId::Value => FieldKind::Currency,
            FieldId::StartDate | FieldId::EndDate => FieldKind::Date,
            FieldId::Scope => FieldKind::Text,
        }
    }

    /// The sub-record whose address a postal-code edit on this field refreshes.
    pub fn address_target(&self) -> Option<AddressTarget> {
        match self {
            FieldId::Party(role, PartyField::Contact(ContactField::Cep)) => {
                Some(AddressTarget::Party(*role))
            }
            FieldId::Witness(slot, ContactField::Cep) => Some(AddressTarget::Witness(*slot)),
            _ => None,
        }
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldId::Party(role, field) => write!(f, "{}.{}", role.key(), field.key()),
            FieldId::Witness(slot, field) => write!(f, "{}.{}", slot.key(), field.key()),
            FieldId::Value => f.write_str("value"),
            FieldId::StartDate => f.write_str("start_date"),
            FieldId::EndDate => f.write_str("end_date"),
            FieldId::Scope => f.write_str("scope"),
        }
    }
}

impl FromStr for FieldId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || format!("unknown field '{s}'");
        match s.split_once('.') {
            None => match s {
                "value" => Ok(FieldId::Value),
                "start_date" => Ok(FieldId::StartDate),
                "end_date" => Ok(FieldId::EndDate),
                "scope" => Ok(FieldId::Scope),
                _ => Err(unknown()),
            },
            Some((owner, field)) => {
                let role = match owner {
                    "provider" => Some(PartyRole::Provider),
                    "client" => Some(PartyRole::Client),
                    _ => None,
                };
                if let Some(role) = role {
                    return PartyField::from_key(field)
                        .map(|f| FieldId::Party(role, f))
                        .ok_or_else(unknown);
                }
                let slot = match owner {
                    "witness1" => WitnessSlot::First,
                    "witness2" => WitnessSlot::Second,
                    _ => return Err(unknown()),
                };
                ContactField::from_key(field)
                    .map(|f| FieldId::Witness(slot, f))
                    .ok_or_else(unknown)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_kind_is_declared_not_guessed() {
        let doc: FieldId = "provider.doc".parse().unwrap();
        assert_eq!(doc.kind(), FieldKind::TaxId);
        assert_eq!("witness2.doc".parse::<FieldId>().unwrap().kind(), FieldKind::TaxId);
        assert_eq!("client.rg".parse::<FieldId>().unwrap().kind(), FieldKind::NationalId);
        assert_eq!("value".parse::<FieldId>().unwrap().kind(), FieldKind::Currency);
        // a free-text field mentioning a masked word keeps its plain kind
        assert_eq!("client.profession".parse::<FieldId>().unwrap().kind(), FieldKind::Text);
    }

    #[test]
    fn field_keys_round_trip_through_display() {
        for key in ["provider.cep", "client.civil_status", "witness1.state", "end_date"] {
            let id: FieldId = key.parse().unwrap();
            assert_eq!(id.to_string(), key);
        }
        assert!("witness3.name".parse::<FieldId>().is_err());
        assert!("provider.salary".parse::<FieldId>().is_err());
        assert!("witness1.rg".parse::<FieldId>().is_err());
    }

    #[test]
    fn address_target_only_for_postal_codes() {
        let cep: FieldId = "witness1.cep".parse().unwrap();
        assert_eq!(cep.address_target(), Some(AddressTarget::Witness(WitnessSlot::First)));
        assert_eq!(FieldId::Scope.address_target(), None);
    }

    #[test]
    fn service_type_parses_label_and_key() {
        assert_eq!("Consultoria".parse::<ServiceType>().unwrap(), ServiceType::Consulting);
        assert_eq!("web_dev".parse::<ServiceType>().unwrap(), ServiceType::WebDev);
        assert!("Astrologia".parse::<ServiceType>().is_err());
    }

    #[test]
    fn service_key_matches_serialized_form() {
        for t in ServiceType::ALL {
            assert_eq!(serde_json::to_value(t).unwrap(), t.key());
            assert_eq!(t.key().parse::<ServiceType>().unwrap(), t);
        }
        assert_eq!(ServiceType::PersonalTrainer.key(), "personal_trainer");
    }

    #[test]
    fn generating_shares_the_details_label() {
        assert_eq!(WizardStep::Generating.label(), WizardStep::InputDetails.label());
        assert_eq!(WizardStep::Final.label(), "Pronto");
    }

    #[test]
    fn party_with_company_tax_id() {
        let mut party = Party::default();
        party.contact.doc = "123.456.789-01".to_string();
        assert!(!party.is_company());
        party.contact.doc = "12.345.678/0001-95".to_string();
        assert!(party.is_company());
    }

    #[test]
    fn witness_is_created_on_first_edit() {
        let mut record = ContractRecord::default();
        assert!(record.witness(WitnessSlot::Second).is_none());
        record.witness_mut(WitnessSlot::Second).name = "Ana".to_string();
        assert_eq!(record.witness(WitnessSlot::Second).unwrap().name, "Ana");
    }
}
