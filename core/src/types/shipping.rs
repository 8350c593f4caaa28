//! Rate quotes, shipments, manifests and the inputs that create them.
//!
//! # Design
//! Response objects keep the fields the client acts on as typed fields and
//! collect any other simple child element into `extra`, so new fields the
//! vendor adds are still visible without a code change.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::types::address::{Destination, Origin};
use crate::types::money::Price;
use crate::types::parcel::Parcel;
use crate::xml::Element;

/// A hyperlink returned by the vendor, tagged with a relation name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub rel: String,
    pub href: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    /// Any other attribute, e.g. `index` on label links.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl Link {
    pub fn new(rel: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            rel: rel.into(),
            href: href.into(),
            ..Self::default()
        }
    }

    /// Final path segment of `href`, ignoring any query string.
    pub fn last_segment(&self) -> &str {
        let path = self.href.split(['?', '#']).next().unwrap_or_default();
        path.trim_end_matches('/').rsplit('/').next().unwrap_or_default()
    }

    pub(crate) fn from_xml(el: &Element) -> Result<Self, ApiError> {
        let mut link = Link::default();
        for (key, value) in &el.attributes {
            match key.as_str() {
                "rel" => link.rel = value.clone(),
                "href" => link.href = value.clone(),
                "media-type" => link.media_type = Some(value.clone()),
                _ => {
                    link.extra.insert(key.clone(), value.clone());
                }
            }
        }
        if link.href.is_empty() {
            return Err(ApiError::DeserializationError(format!(
                "<{}> without href",
                el.name
            )));
        }
        Ok(link)
    }
}

/// Collect `<link>` children keyed by their `rel`.
pub(crate) fn links_by_rel(el: &Element) -> Result<BTreeMap<String, Link>, ApiError> {
    el.children_named("link")
        .map(|l| Link::from_xml(l).map(|link| (link.rel.clone(), link)))
        .collect()
}

/// A delivery service and, when it comes from a rate lookup, its quote.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub code: String,
    pub name: String,
    pub link: Option<Link>,
    pub price: Price,
    /// Expected transit time in business days.
    pub transit_time: Option<u32>,
    pub expected_delivery_date: Option<NaiveDate>,
    pub guaranteed_delivery: bool,
}

impl Service {
    /// A service known only by its code, e.g. `"DOM.EP"`.
    pub fn from_code(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            ..Self::default()
        }
    }

    /// Read a `price-quote` element.
    pub(crate) fn from_xml(quote: &Element) -> Result<Self, ApiError> {
        let code = quote
            .child_text("service-code")
            .ok_or_else(|| ApiError::DeserializationError("price-quote without service-code".into()))?;
        let link = quote.child("service-link").map(Link::from_xml).transpose()?;
        let price = quote
            .child("price-details")
            .map(Price::from_xml)
            .transpose()?
            .unwrap_or_default();

        let standard = quote.child("service-standard");
        let transit_time = standard
            .and_then(|s| s.child_text("expected-transit-time"))
            .map(|t| {
                t.parse::<u32>().map_err(|e| {
                    ApiError::DeserializationError(format!("invalid transit time {t:?}: {e}"))
                })
            })
            .transpose()?;
        let expected_delivery_date = standard
            .and_then(|s| s.child_text("expected-delivery-date"))
            .map(|d| {
                NaiveDate::parse_from_str(d, "%Y-%m-%d").map_err(|e| {
                    ApiError::DeserializationError(format!("invalid delivery date {d:?}: {e}"))
                })
            })
            .transpose()?;
        let guaranteed_delivery = standard.and_then(|s| s.child_text("guaranteed-delivery")) == Some("true");

        Ok(Self {
            code: code.to_string(),
            name: quote.child_text("service-name").unwrap_or_default().to_string(),
            link,
            price,
            transit_time,
            expected_delivery_date,
            guaranteed_delivery,
        })
    }
}

/// Services that need a phone number for the recipient.
pub const PHONE_REQUIRED_SERVICES: [&str; 7] = [
    "USA.EP",
    "USA.XP",
    "INT.XP",
    "USA.PW.PARCEL",
    "USA.PW.PAK",
    "INT.PW.PARCEL",
    "INT.PW.PAK",
];

/// An add-on such as signature (`SO`) or coverage (`COV`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShipmentOption {
    pub code: String,
    pub amount: Option<Decimal>,
    pub qualifier_1: Option<String>,
    pub qualifier_2: Option<String>,
}

impl ShipmentOption {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            amount: None,
            qualifier_1: None,
            qualifier_2: None,
        }
    }

    pub fn with_amount(mut self, amount: Decimal) -> Self {
        self.amount = Some(amount);
        self
    }
}

pub const MAX_COST_CENTRE: usize = 30;
pub const MAX_CUSTOMER_REF: usize = 35;

/// Customer-assigned references printed on the label.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct References {
    pub cost_centre: Option<String>,
    pub customer_ref_1: Option<String>,
    pub customer_ref_2: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReasonForExport {
    Gift,
    Document,
    CommercialSample,
    RepairOrWarranty,
    SaleOfGoods,
    /// Requires a free-text reason.
    Other(String),
}

impl ReasonForExport {
    pub fn code(&self) -> &'static str {
        match self {
            ReasonForExport::Gift => "GIF",
            ReasonForExport::Document => "DOC",
            ReasonForExport::CommercialSample => "SAM",
            ReasonForExport::RepairOrWarranty => "REP",
            ReasonForExport::SaleOfGoods => "SOG",
            ReasonForExport::Other(_) => "OTH",
        }
    }
}

/// Customs declaration settings; the line items come from the parcel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customs {
    pub currency: String,
    pub reason_for_export: ReasonForExport,
}

impl Default for Customs {
    fn default() -> Self {
        Self {
            currency: "CAD".to_string(),
            reason_for_export: ReasonForExport::SaleOfGoods,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    FourBySix,
    EightAndHalfByEleven,
}

impl OutputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::FourBySix => "4x6",
            OutputFormat::EightAndHalfByEleven => "8.5x11",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PaymentMethod {
    #[default]
    Account,
    CreditCard,
}

impl PaymentMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentMethod::Account => "Account",
            PaymentMethod::CreditCard => "CreditCard",
        }
    }
}

/// Input for creating a contract shipment.
#[derive(Debug, Clone)]
pub struct NewShipment {
    pub parcel: Parcel,
    pub origin: Origin,
    pub destination: Destination,
    pub service: Service,
    pub group_id: String,
    pub options: Vec<ShipmentOption>,
    pub references: Option<References>,
    pub customs: Customs,
    pub output_format: OutputFormat,
    pub payment_method: PaymentMethod,
}

impl NewShipment {
    pub fn new(
        parcel: Parcel,
        origin: Origin,
        destination: Destination,
        service: Service,
        group_id: impl Into<String>,
    ) -> Self {
        Self {
            parcel,
            origin,
            destination,
            service,
            group_id: group_id.into(),
            options: Vec::new(),
            references: None,
            customs: Customs::default(),
            output_format: OutputFormat::default(),
            payment_method: PaymentMethod::default(),
        }
    }

    pub fn with_option(mut self, option: ShipmentOption) -> Self {
        self.options.push(option);
        self
    }

    pub fn with_references(mut self, references: References) -> Self {
        self.references = Some(references);
        self
    }

    pub fn with_customs(mut self, customs: Customs) -> Self {
        self.customs = customs;
        self
    }
}

/// Input for transmitting groups of shipments into manifests.
#[derive(Debug, Clone)]
pub struct TransmitSet {
    pub origin: Origin,
    pub group_ids: Vec<String>,
    pub manifest_name: Option<String>,
    /// Detailed rather than summary manifests.
    pub detailed: bool,
    pub excluded_shipments: Vec<String>,
    pub payment_method: PaymentMethod,
}

impl TransmitSet {
    pub fn new(origin: Origin, group_ids: Vec<String>) -> Self {
        Self {
            origin,
            group_ids,
            manifest_name: None,
            detailed: true,
            excluded_shipments: Vec::new(),
            payment_method: PaymentMethod::default(),
        }
    }

    pub fn with_manifest_name(mut self, name: impl Into<String>) -> Self {
        self.manifest_name = Some(name.into());
        self
    }

    pub fn excluding(mut self, shipment_ids: Vec<String>) -> Self {
        self.excluded_shipments = shipment_ids;
        self
    }
}

/// Objects whose relation links lead to a printable document.
pub trait ArtifactSource {
    /// Relation name of the document link.
    const ARTIFACT_REL: &'static str;

    fn links(&self) -> &BTreeMap<String, Link>;

    fn artifact_link(&self) -> Option<&Link> {
        self.links().get(Self::ARTIFACT_REL)
    }
}

/// A created shipment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shipment {
    pub id: String,
    pub status: Option<String>,
    pub tracking_pin: Option<String>,
    pub return_tracking_pin: Option<String>,
    pub links: BTreeMap<String, Link>,
    /// Text leaves of other child elements, keyed by slash-joined path.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl Shipment {
    pub(crate) fn from_xml(root: &Element) -> Result<Self, ApiError> {
        let mut shipment = Shipment::default();
        let mut seen = BTreeMap::new();
        for child in &root.children {
            let text = child.text.trim();
            match child.name.as_str() {
                "shipment-id" => shipment.id = text.to_string(),
                "shipment-status" => shipment.status = Some(text.to_string()),
                "tracking-pin" => shipment.tracking_pin = Some(text.to_string()),
                "return-tracking-pin" => shipment.return_tracking_pin = Some(text.to_string()),
                "links" => shipment.links = links_by_rel(child)?,
                other => {
                    let key = sibling_key(&mut seen, None, other);
                    insert_leaves(&mut shipment.extra, key, child);
                }
            }
        }
        if shipment.id.is_empty() {
            return Err(ApiError::DeserializationError(format!(
                "<{}> without shipment-id",
                root.name
            )));
        }
        Ok(shipment)
    }
}

impl ArtifactSource for Shipment {
    const ARTIFACT_REL: &'static str = "label";

    fn links(&self) -> &BTreeMap<String, Link> {
        &self.links
    }
}

/// A transmitted manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub po_number: String,
    pub links: BTreeMap<String, Link>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl Manifest {
    pub(crate) fn from_xml(root: &Element) -> Result<Self, ApiError> {
        let mut manifest = Manifest::default();
        let mut seen = BTreeMap::new();
        for child in &root.children {
            match child.name.as_str() {
                "po-number" => manifest.po_number = child.text.trim().to_string(),
                "links" => manifest.links = links_by_rel(child)?,
                other => {
                    let key = sibling_key(&mut seen, None, other);
                    insert_leaves(&mut manifest.extra, key, child);
                }
            }
        }
        if manifest.po_number.is_empty() {
            return Err(ApiError::DeserializationError(
                "manifest without po-number".into(),
            ));
        }
        Ok(manifest)
    }
}

/// Path of a child under `parent`; repeats of a name get `[1]`, `[2]`, ...
fn sibling_key<'a>(seen: &mut BTreeMap<&'a str, usize>, parent: Option<&str>, name: &'a str) -> String {
    let count = seen.entry(name).or_insert(0);
    let key = match (parent, *count) {
        (None, 0) => name.to_string(),
        (None, n) => format!("{name}[{n}]"),
        (Some(parent), 0) => format!("{parent}/{name}"),
        (Some(parent), n) => format!("{parent}/{name}[{n}]"),
    };
    *count += 1;
    key
}

fn insert_leaves(extra: &mut BTreeMap<String, String>, path: String, element: &Element) {
    if element.children.is_empty() {
        extra.insert(path, element.text.trim().to_string());
        return;
    }
    let mut seen = BTreeMap::new();
    for child in &element.children {
        let key = sibling_key(&mut seen, Some(path.as_str()), &child.name);
        insert_leaves(extra, key, child);
    }
}

impl ArtifactSource for Manifest {
    const ARTIFACT_REL: &'static str = "artifact";

    fn links(&self) -> &BTreeMap<String, Link> {
        &self.links
    }
}
