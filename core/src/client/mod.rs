//! Stateless request builders and response parsers for the vendor API.
//!
//! # Design
//! `CanadaPostClient` holds only its `Config` and carries no mutable state
//! between calls. Each vendor operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. Validation happens in `build_*`, so a request that would
//! be rejected never leaves the process. `CanadaPost` in `service` glues the
//! two halves to a `Transport`.
//!
//! Operations that follow a relation link returned earlier all go through
//! `build_link_request`, parameterized by the HTTP method.

mod manifest;
mod rating;
mod shipment;

use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::config::Config;
use crate::error::{ApiError, ValidationError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::address::check_len;
use crate::types::{Address, Link, Parcel};
use crate::xml::{self, Element, XmlWriter};

pub const RATE_MEDIA_TYPE: &str = "application/vnd.cpc.ship.rate+xml";
pub const RATE_NAMESPACE: &str = "http://www.canadapost.ca/ws/ship/rate";
pub const SHIPMENT_MEDIA_TYPE: &str = "application/vnd.cpc.shipment-v7+xml";
pub const SHIPMENT_NAMESPACE: &str = "http://www.canadapost.ca/ws/shipment-v7";
pub const MANIFEST_MEDIA_TYPE: &str = "application/vnd.cpc.manifest-v7+xml";
pub const MANIFEST_NAMESPACE: &str = "http://www.canadapost.ca/ws/manifest-v7";
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

const ACCEPT_LANGUAGE: &str = "en-CA";

/// Synchronous, stateless client for the rating and contract shipping services.
#[derive(Debug, Clone)]
pub struct CanadaPostClient {
    config: Config,
}

impl CanadaPostClient {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Request for a link obtained from an earlier response.
    pub fn build_link_request(&self, link: &Link, method: HttpMethod, accept: &str) -> HttpRequest {
        HttpRequest {
            method,
            url: link.href.clone(),
            headers: self.headers(accept, None),
            body: None,
        }
    }

    fn rating_url(&self) -> String {
        format!("{}/rs/ship/price", self.config.base_url())
    }

    /// `{base}/rs/{customer}/{mobo}/{resource}`
    fn contract_url(&self, resource: &str) -> String {
        format!(
            "{}/rs/{}/{}/{resource}",
            self.config.base_url(),
            self.config.customer_number,
            self.config.mobo()
        )
    }

    fn headers(&self, accept: &str, content_type: Option<&str>) -> Vec<(String, String)> {
        let mut headers = vec![("Accept".to_string(), accept.to_string())];
        if let Some(content_type) = content_type {
            headers.push(("Content-Type".to_string(), content_type.to_string()));
        }
        headers.push(("Accept-Language".to_string(), ACCEPT_LANGUAGE.to_string()));
        headers.push(("Authorization".to_string(), self.basic_auth()));
        headers
    }

    fn basic_auth(&self) -> String {
        let credentials = format!("{}:{}", self.config.username, self.config.password);
        format!("Basic {}", STANDARD.encode(credentials))
    }

    fn get(&self, url: String, accept: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url,
            headers: self.headers(accept, None),
            body: None,
        }
    }

    fn post(&self, url: String, media_type: &str, body: String) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Post,
            url,
            headers: self.headers(media_type, Some(media_type)),
            body: Some(body),
        }
    }

    fn writer(&self) -> Result<XmlWriter, ApiError> {
        XmlWriter::new(self.config.pretty_print)
    }
}

/// Map non-success status codes to `ApiError::HttpError`.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: String::from_utf8_lossy(&response.body).into_owned(),
    })
}

fn parse_document(response: &HttpResponse) -> Result<Element, ApiError> {
    check_status(response)?;
    xml::parse(response.text()?)
}

fn require_link<'a>(links: &'a BTreeMap<String, Link>, rel: &str) -> Result<&'a Link, ApiError> {
    links
        .get(rel)
        .ok_or_else(|| ApiError::MissingLink(rel.to_string()))
}

fn require(
    value: Option<&str>,
    field: &'static str,
    operation: &'static str,
) -> Result<(), ValidationError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(()),
        _ => Err(ValidationError::Missing { field, operation }),
    }
}

/// Company, phone and full street address, as the vendor needs for a
/// sender or manifest address.
fn require_full_address(address: &Address, operation: &'static str) -> Result<(), ValidationError> {
    require(address.company.as_deref(), "company", operation)?;
    require(address.phone.as_deref(), "phone", operation)?;
    if !address.has_street() {
        return Err(ValidationError::Missing {
            field: "street address",
            operation,
        });
    }
    require(address.city.as_deref(), "city", operation)?;
    require(address.province.as_deref(), "province", operation)
}

fn write_parcel_characteristics(
    w: &mut XmlWriter,
    parcel: &Parcel,
    include_unpackaged: bool,
) -> Result<(), ApiError> {
    w.element("parcel-characteristics", |w| {
        w.text("weight", parcel.weight.to_string())?;
        if parcel.is_dimensioned() {
            w.element("dimensions", |w| {
                w.text("length", parcel.length.to_string())?;
                w.text("width", parcel.width.to_string())?;
                w.text("height", parcel.height.to_string())
            })?;
        }
        if include_unpackaged {
            w.flag("unpackaged", parcel.unpackaged)?;
        }
        Ok(())
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::Environment;
    use crate::types::{Destination, Origin};

    pub(crate) fn config() -> Config {
        Config::new("0001234567", "user", "pass", Environment::Sandbox)
            .with_contract_number("0040000000")
    }

    pub(crate) fn client() -> CanadaPostClient {
        CanadaPostClient::new(config())
    }

    pub(crate) fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.as_bytes().to_vec(),
        }
    }

    pub(crate) fn origin() -> Origin {
        Address::builder("K1A 0B1")
            .name("Jane Sender")
            .company("Acme Widgets")
            .phone("613-555-0100")
            .street("111 Wellington St")
            .city("Ottawa")
            .province("ON")
            .build_origin()
            .unwrap()
    }

    pub(crate) fn domestic() -> Destination {
        Address::builder("v6b 1a1")
            .name("John Receiver")
            .phone("604-555-0199")
            .street("200 Granville St")
            .city("Vancouver")
            .province("BC")
            .build_destination("CA")
            .unwrap()
    }

    #[test]
    fn headers_carry_media_type_language_and_basic_auth() {
        let req = client().get("https://h/x".to_string(), SHIPMENT_MEDIA_TYPE);
        assert_eq!(req.header("Accept"), Some(SHIPMENT_MEDIA_TYPE));
        assert_eq!(req.header("Content-Type"), None);
        assert_eq!(req.header("Accept-Language"), Some("en-CA"));
        // base64("user:pass")
        assert_eq!(req.header("Authorization"), Some("Basic dXNlcjpwYXNz"));
    }

    #[test]
    fn contract_url_uses_mobo_when_set() {
        let c = CanadaPostClient::new(config().with_mobo("0009999999"));
        assert_eq!(
            c.contract_url("shipment"),
            "https://ct.soa-gw.canadapost.ca/rs/0001234567/0009999999/shipment"
        );
        assert_eq!(
            client().contract_url("group"),
            "https://ct.soa-gw.canadapost.ca/rs/0001234567/0001234567/group"
        );
    }

    #[test]
    fn link_request_uses_given_method() {
        let link = Link::new("self", "https://h/rs/1/1/shipment/9");
        let req = client().build_link_request(&link, HttpMethod::Delete, SHIPMENT_MEDIA_TYPE);
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.url, "https://h/rs/1/1/shipment/9");
        assert!(req.body.is_none());
    }

    #[test]
    fn non_success_becomes_http_error() {
        let err = parse_document(&response(404, "<messages/>")).unwrap_err();
        assert!(matches!(err, ApiError::HttpError { status: 404, ref body } if body == "<messages/>"));
    }

    #[test]
    fn missing_link_is_reported_by_rel() {
        let err = require_link(&BTreeMap::new(), "label").unwrap_err();
        assert!(matches!(err, ApiError::MissingLink(rel) if rel == "label"));
    }
}
