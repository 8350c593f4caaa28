//! Credentials and environment selection.
//!
//! # Design
//! `Config` is plain data supplied by the embedding application and handed to
//! `CanadaPostClient::new`; nothing is stored globally. It can be built in
//! code, deserialized from TOML, or read from `CANADA_POST_*` environment
//! variables.

use std::path::Path;

use serde::Deserialize;

use crate::error::ApiError;

/// Which vendor gateway to talk to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[serde(alias = "dev")]
    Sandbox,
    #[default]
    #[serde(alias = "prod")]
    Production,
}

impl Environment {
    pub fn host(self) -> &'static str {
        match self {
            Environment::Sandbox => "ct.soa-gw.canadapost.ca",
            Environment::Production => "soa-gw.canadapost.ca",
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sandbox" | "dev" => Ok(Environment::Sandbox),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(ApiError::Config(format!("unknown environment {other:?}"))),
        }
    }
}

/// Account settings for the contract shipping and rating services.
#[derive(Clone, Deserialize)]
pub struct Config {
    pub customer_number: String,
    /// Required for contract shipments; also requests contract rates.
    #[serde(default)]
    pub contract_number: Option<String>,
    /// Customer acting on behalf of; defaults to `customer_number`.
    #[serde(default)]
    pub mobo: Option<String>,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub environment: Environment,
    /// Replaces `https://{host}` (e.g. a local mock server).
    #[serde(default)]
    pub base_url: Option<String>,
    /// Indent request XML, for logging.
    #[serde(default)]
    pub pretty_print: bool,
}

impl Config {
    pub fn new(
        customer_number: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        environment: Environment,
    ) -> Self {
        Self {
            customer_number: customer_number.into(),
            contract_number: None,
            mobo: None,
            username: username.into(),
            password: password.into(),
            environment,
            base_url: None,
            pretty_print: false,
        }
    }

    pub fn with_contract_number(mut self, contract_number: impl Into<String>) -> Self {
        self.contract_number = Some(contract_number.into());
        self
    }

    pub fn with_mobo(mut self, mobo: impl Into<String>) -> Self {
        self.mobo = Some(mobo.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn from_toml_str(source: &str) -> Result<Self, ApiError> {
        toml::from_str(source).map_err(|e| ApiError::Config(e.to_string()))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ApiError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| ApiError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&source)
    }

    /// Read `CANADA_POST_CUSTOMER_NUMBER`, `CANADA_POST_USERNAME`,
    /// `CANADA_POST_PASSWORD` and the optional `CANADA_POST_CONTRACT_NUMBER`,
    /// `CANADA_POST_MOBO`, `CANADA_POST_ENVIRONMENT`, `CANADA_POST_BASE_URL`.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ApiError> {
        let required = |key: &str| {
            lookup(key).ok_or_else(|| ApiError::Config(format!("{key} is not set")))
        };
        let environment = match lookup("CANADA_POST_ENVIRONMENT") {
            Some(value) => value.parse()?,
            None => Environment::default(),
        };
        Ok(Self {
            customer_number: required("CANADA_POST_CUSTOMER_NUMBER")?,
            contract_number: lookup("CANADA_POST_CONTRACT_NUMBER"),
            mobo: lookup("CANADA_POST_MOBO"),
            username: required("CANADA_POST_USERNAME")?,
            password: required("CANADA_POST_PASSWORD")?,
            environment,
            base_url: lookup("CANADA_POST_BASE_URL"),
            pretty_print: false,
        })
    }

    /// Scheme and host every request URL starts with, without a trailing slash.
    pub fn base_url(&self) -> String {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://{}", self.environment.host()),
        }
    }

    pub fn mobo(&self) -> &str {
        self.mobo.as_deref().unwrap_or(&self.customer_number)
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("customer_number", &self.customer_number)
            .field("contract_number", &self.contract_number)
            .field("mobo", &self.mobo)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("environment", &self.environment)
            .field("base_url", &self.base_url)
            .field("pretty_print", &self.pretty_print)
            .finish()
    }
}
