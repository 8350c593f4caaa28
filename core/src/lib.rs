//! Blocking client for the Canada Post rating and contract shipping services.
//!
//! # Overview
//! Builds the vendor's XML request documents from typed value objects, sends
//! them with basic-auth credentials, and parses the XML responses back into
//! rates, shipments, manifests and artifacts.
//!
//! # Design
//! - `CanadaPostClient` is stateless apart from its `Config`: `build_*`
//!   produces an `HttpRequest`, `parse_*` consumes an `HttpResponse`.
//! - `CanadaPost` composes build → `Transport` → parse, one blocking round
//!   trip per operation. `UreqTransport` is the default transport.
//! - Inputs are validated before any network call (`ValidationError`).
//! - No retries, timeouts or pooling are added on top of the transport.
//!
//! ```rust,no_run
//! use canada_post::{Address, CanadaPost, Config, Environment, Parcel};
//! use rust_decimal::Decimal;
//!
//! # fn main() -> Result<(), canada_post::ApiError> {
//! let config = Config::new("0001234567", "user", "pass", Environment::Sandbox);
//! let api = CanadaPost::new(config);
//! let origin = Address::builder("K1A 0B1").build_origin()?;
//! let destination = Address::builder("V6B 1A1").build_destination("CA")?;
//! for service in api.get_rates(&Parcel::new(Decimal::ONE), &origin, &destination)? {
//!     println!("{} {}", service.code, service.price.due);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod service;
pub mod types;
mod xml;

pub use client::CanadaPostClient;
pub use config::{Config, Environment};
pub use error::{ApiError, ValidationError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};
pub use service::CanadaPost;
pub use types::{
    Address, AddressBuilder, Adjustment, ArtifactSource, Customs, Destination, Item, Link,
    Manifest, NewShipment, Origin, OutputFormat, Parcel, PaymentMethod, Price, ReasonForExport,
    References, Service, Shipment, ShipmentOption, Tax, TransmitSet,
};
