use crate::domain::model::WizardStep;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContractError {
    #[error("HTTP request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Image encoding error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Action '{action}' is not allowed in step {from:?}")]
    InvalidTransition {
        from: WizardStep,
        action: &'static str,
    },

    #[error("Required fields are empty: {}", fields.join(", "))]
    MissingRequiredFields { fields: Vec<&'static str> },

    #[error("Invalid input for '{field}': {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Contract generation failed: {message}")]
    Generation { message: String },

    #[error("Address lookup failed: {message}")]
    Lookup { message: String },

    #[error("Export utility unavailable: {message}")]
    ExportUnavailable { message: String },

    #[error("Export failed: {message}")]
    ExportFailed { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Configuration,
    UserInput,
    Workflow,
    Export,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ContractError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ContractError::ApiError(_)
            | ContractError::Generation { .. }
            | ContractError::Lookup { .. } => ErrorCategory::Network,
            ContractError::ConfigValidationError { .. }
            | ContractError::InvalidConfigValueError { .. }
            | ContractError::MissingConfigError { .. } => ErrorCategory::Configuration,
            ContractError::MissingRequiredFields { .. } | ContractError::InvalidInput { .. } => {
                ErrorCategory::UserInput
            }
            ContractError::InvalidTransition { .. } => ErrorCategory::Workflow,
            ContractError::ExportUnavailable { .. } | ContractError::ExportFailed { .. } => {
                ErrorCategory::Export
            }
            ContractError::IoError(_) | ContractError::ImageError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::UserInput => ErrorSeverity::Low,
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Workflow | ErrorCategory::Export => ErrorSeverity::High,
            ErrorCategory::Configuration | ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// Message shown to the person filling the contract.
    pub fn user_friendly_message(&self) -> String {
        match self {
            ContractError::Generation { .. } => {
                "Ocorreu um erro ao gerar o contrato. Tente novamente.".to_string()
            }
            ContractError::ExportUnavailable { .. } => {
                "A biblioteca de PDF ainda está carregando. Tente novamente.".to_string()
            }
            ContractError::ExportFailed { .. } => "Erro ao gerar PDF.".to_string(),
            ContractError::MissingRequiredFields { fields } => {
                format!("Preencha os campos obrigatórios: {}", fields.join(", "))
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check connectivity and the API key, then submit again",
            ErrorCategory::Configuration => "Fix the configuration file and run again",
            ErrorCategory::UserInput => "Correct the highlighted fields",
            ErrorCategory::Workflow => "Complete the current step before moving on",
            ErrorCategory::Export => "Make sure the PDF program is installed, then export again",
            ErrorCategory::System => "Check file permissions and disk space",
        }
    }
}

pub type Result<T> = std::result::Result<T, ContractError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_are_listed_in_message() {
        let err = ContractError::MissingRequiredFields {
            fields: vec!["provider.name", "scope"],
        };
        assert_eq!(err.to_string(), "Required fields are empty: provider.name, scope");
        assert_eq!(err.severity(), ErrorSeverity::Low);
    }

    #[test]
    fn generation_failure_has_user_message() {
        let err = ContractError::Generation {
            message: "status 401".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Network);
        assert!(err.user_friendly_message().contains("Tente novamente"));
    }
}
