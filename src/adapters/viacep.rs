use crate::core::formatters::{only_digits, CEP_DIGITS};
use crate::domain::model::AddressInfo;
use crate::domain::ports::AddressLookup;
use crate::utils::error::{ContractError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://viacep.com.br/ws";

/// Body returned by the postal-code service. Unknown codes come back as
/// `{"erro": true}` (older deployments send the string `"true"`).
#[derive(Debug, Deserialize)]
struct ViaCepResponse {
    logradouro: Option<String>,
    localidade: Option<String>,
    uf: Option<String>,
    erro: Option<serde_json::Value>,
}

impl ViaCepResponse {
    fn is_not_found(&self) -> bool {
        match &self.erro {
            Some(serde_json::Value::Bool(flag)) => *flag,
            Some(serde_json::Value::String(s)) => s.eq_ignore_ascii_case("true"),
            _ => false,
        }
    }
}

pub struct ViaCepLookup {
    client: Client,
    endpoint: String,
}

impl ViaCepLookup {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub fn with_timeout(endpoint: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            endpoint: endpoint.into(),
        })
    }

    fn url_for(&self, cep: &str) -> String {
        format!("{}/{}/json/", self.endpoint.trim_end_matches('/'), cep)
    }
}

#[async_trait]
impl AddressLookup for ViaCepLookup {
    async fn lookup(&self, cep: &str) -> Result<Option<AddressInfo>> {
        let cep = only_digits(cep);
        if cep.len() != CEP_DIGITS {
            return Err(ContractError::Lookup {
                message: format!("postal code must have {CEP_DIGITS} digits, got '{cep}'"),
            });
        }

        let url = self.url_for(&cep);
        tracing::debug!("Looking up postal code at: {}", url);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(ContractError::Lookup {
                message: format!("postal code service answered {}", response.status()),
            });
        }

        let body: ViaCepResponse = response.json().await?;
        if body.is_not_found() {
            tracing::debug!("Postal code {} not found", cep);
            return Ok(None);
        }

        Ok(Some(AddressInfo {
            street: body.logradouro,
            city: body.localidade,
            state: body.uf,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn test_lookup_returns_address() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/ws/01310100/json/");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({
                    "cep": "01310-100",
                    "logradouro": "Avenida Paulista",
                    "bairro": "Bela Vista",
                    "localidade": "São Paulo",
                    "uf": "SP"
                }));
        });

        let lookup = ViaCepLookup::new(server.url("/ws"));
        let info = lookup.lookup("01310-100").await.unwrap().unwrap();

        api_mock.assert();
        assert_eq!(info.street.as_deref(), Some("Avenida Paulista"));
        assert_eq!(info.city.as_deref(), Some("São Paulo"));
        assert_eq!(info.state.as_deref(), Some("SP"));
    }

    #[tokio::test]
    async fn test_lookup_not_found() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/ws/99999999/json/");
            then.status(200).json_body(serde_json::json!({"erro": true}));
        });

        let lookup = ViaCepLookup::new(server.url("/ws/"));
        assert_eq!(lookup.lookup("99999999").await.unwrap(), None);
        api_mock.assert();
    }

    #[tokio::test]
    async fn test_lookup_not_found_as_string_flag() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/ws/99999998/json/");
            then.status(200).json_body(serde_json::json!({"erro": "true"}));
        });

        let lookup = ViaCepLookup::new(server.url("/ws"));
        assert_eq!(lookup.lookup("99999998").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_lookup_server_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/ws/01310100/json/");
            then.status(500);
        });

        let lookup = ViaCepLookup::new(server.url("/ws"));
        let err = lookup.lookup("01310100").await.unwrap_err();
        assert!(matches!(err, ContractError::Lookup { .. }));
    }

    #[tokio::test]
    async fn test_lookup_rejects_incomplete_code() {
        let lookup = ViaCepLookup::new("http://127.0.0.1:9");
        assert!(lookup.lookup("0131").await.is_err());
    }
}
