use crate::adapters::export::DEFAULT_PDF_PROGRAM;
use crate::core::prompt::DEFAULT_TEMPERATURE;
use crate::core::signature::{DEFAULT_HEIGHT, DEFAULT_STROKE_WIDTH, DEFAULT_WIDTH, MAX_PAD_SIDE};
use crate::utils::error::{ContractError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_positive_number, validate_range, validate_url,
    Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WizardConfig {
    #[serde(default)]
    pub address_lookup: AddressLookupConfig,
    pub generation: GenerationConfig,
    #[serde(default)]
    pub signature: SignatureConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressLookupConfig {
    #[serde(default = "default_lookup_endpoint")]
    pub endpoint: String,
    pub timeout_seconds: Option<u64>,
}

impl Default for AddressLookupConfig {
    fn default() -> Self {
        Self {
            endpoint: default_lookup_endpoint(),
            timeout_seconds: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_generation_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    pub api_key: String,
    pub temperature: Option<f32>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignatureConfig {
    #[serde(default = "default_pad_width")]
    pub width: u32,
    #[serde(default = "default_pad_height")]
    pub height: u32,
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f32,
}

impl Default for SignatureConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            stroke_width: DEFAULT_STROKE_WIDTH,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    #[serde(default = "default_pdf_program")]
    pub pdf_program: String,
    pub pdf_args: Option<Vec<String>>,
    pub image_quality: Option<f32>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            pdf_program: default_pdf_program(),
            pdf_args: None,
            image_quality: None,
        }
    }
}

fn default_lookup_endpoint() -> String {
    crate::adapters::viacep::DEFAULT_ENDPOINT.to_string()
}

fn default_generation_endpoint() -> String {
    crate::adapters::gemini::DEFAULT_ENDPOINT.to_string()
}

fn default_model() -> String {
    crate::adapters::gemini::DEFAULT_MODEL.to_string()
}

fn default_pad_width() -> u32 {
    DEFAULT_WIDTH
}

fn default_pad_height() -> u32 {
    DEFAULT_HEIGHT
}

fn default_stroke_width() -> f32 {
    DEFAULT_STROKE_WIDTH
}

fn default_output_dir() -> String {
    "./output".to_string()
}

fn default_pdf_program() -> String {
    DEFAULT_PDF_PROGRAM.to_string()
}

impl WizardConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ContractError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| ContractError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    pub fn temperature(&self) -> f32 {
        self.generation.temperature.unwrap_or(DEFAULT_TEMPERATURE)
    }

    pub fn lookup_timeout(&self) -> Option<Duration> {
        self.address_lookup.timeout_seconds.map(Duration::from_secs)
    }

    pub fn generation_timeout(&self) -> Option<Duration> {
        self.generation.timeout_seconds.map(Duration::from_secs)
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validate_url("address_lookup.endpoint", &self.address_lookup.endpoint)?;
        validate_url("generation.endpoint", &self.generation.endpoint)?;
        validate_non_empty_string("generation.model", &self.generation.model)?;

        // 未替換的 ${VAR} 代表環境變數不存在
        if self.generation.api_key.trim().is_empty() || self.generation.api_key.starts_with("${") {
            return Err(ContractError::MissingConfigError {
                field: "generation.api_key".to_string(),
            });
        }

        if let Some(t) = self.generation.temperature {
            validate_range("generation.temperature", t, 0.0, 2.0)?;
        }
        for (field, timeout) in [
            ("address_lookup.timeout_seconds", self.address_lookup.timeout_seconds),
            ("generation.timeout_seconds", self.generation.timeout_seconds),
        ] {
            if let Some(secs) = timeout {
                let secs = u32::try_from(secs).unwrap_or(u32::MAX);
                validate_positive_number(field, secs, 1)?;
            }
        }

        validate_range("signature.width", self.signature.width, 1, MAX_PAD_SIDE)?;
        validate_range("signature.height", self.signature.height, 1, MAX_PAD_SIDE)?;
        validate_range("signature.stroke_width", self.signature.stroke_width, 0.5, 20.0)?;

        validate_path("export.output_dir", &self.export.output_dir)?;
        validate_non_empty_string("export.pdf_program", &self.export.pdf_program)?;
        if let Some(q) = self.export.image_quality {
            validate_range("export.image_quality", q, 0.0, 1.0)?;
        }

        Ok(())
    }
}

/// 替換環境變數 (例如 ${API_KEY})；未設定的變數保持原樣
pub(crate) fn substitute_env_vars(content: &str) -> String {
    use regex::Regex;
    let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

    let result = re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
    });

    result.to_string()
}

impl Validate for WizardConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
