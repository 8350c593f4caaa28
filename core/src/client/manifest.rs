//! Manifests: transmit groups, list, fetch and enumerate shipments.

use chrono::NaiveDate;

use super::shipment::MAX_GROUP_ID;
use super::{
    check_len, parse_document, require_full_address, require_link, CanadaPostClient,
    MANIFEST_MEDIA_TYPE, MANIFEST_NAMESPACE, SHIPMENT_MEDIA_TYPE,
};
use crate::error::{ApiError, ValidationError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{Link, Manifest, TransmitSet};
use crate::xml::Element;

const TRANSMIT: &str = "transmit shipments";
const MAX_MANIFEST_NAME: usize = 44;
const MAX_SHIPMENT_ID: usize = 32;

impl CanadaPostClient {
    pub fn build_transmit_shipments(&self, transmit: &TransmitSet) -> Result<HttpRequest, ApiError> {
        validate_transmit(transmit)?;
        let origin = &transmit.origin;

        let mut w = self.writer()?;
        w.root("transmit-set", MANIFEST_NAMESPACE, |w| {
            w.element("group-ids", |w| {
                for group_id in &transmit.group_ids {
                    w.text("group-id", group_id)?;
                }
                Ok(())
            })?;
            w.text("requested-shipping-point", &origin.postal_code)?;
            w.flag("detailed-manifests", transmit.detailed)?;
            w.text("method-of-payment", transmit.payment_method.as_str())?;
            w.element("manifest-address", |w| {
                w.opt_text("manifest-company", origin.company.as_deref())?;
                w.opt_text("manifest-name", transmit.manifest_name.as_deref())?;
                w.opt_text("phone-number", origin.phone.as_deref())?;
                w.element("address-details", |w| {
                    w.opt_text("address-line-1", origin.address1.as_deref())?;
                    w.opt_text("address-line-2", origin.address2.as_deref())?;
                    w.opt_text("city", origin.city.as_deref())?;
                    w.opt_text("prov-state", origin.province.as_deref())?;
                    w.text("postal-zip-code", &origin.postal_code)
                })
            })?;
            if !transmit.excluded_shipments.is_empty() {
                w.element("excluded-shipments", |w| {
                    for shipment_id in &transmit.excluded_shipments {
                        w.text("shipment-id", shipment_id)?;
                    }
                    Ok(())
                })?;
            }
            Ok(())
        })?;
        Ok(self.post(self.contract_url("manifest"), MANIFEST_MEDIA_TYPE, w.finish()?))
    }

    /// Links to the manifests created by the transmit.
    pub fn parse_transmit_shipments(&self, response: HttpResponse) -> Result<Vec<Link>, ApiError> {
        child_links(&parse_document(&response)?)
    }

    /// Manifests transmitted between `start` and `end` (today when `None`).
    pub fn build_get_manifests(&self, start: NaiveDate, end: Option<NaiveDate>) -> HttpRequest {
        let mut url = format!(
            "{}?start={}",
            self.contract_url("manifest"),
            start.format("%Y%m%d")
        );
        if let Some(end) = end {
            url.push_str(&format!("&end={}", end.format("%Y%m%d")));
        }
        self.get(url, MANIFEST_MEDIA_TYPE)
    }

    pub fn parse_get_manifests(&self, response: HttpResponse) -> Result<Vec<Link>, ApiError> {
        child_links(&parse_document(&response)?)
    }

    pub fn build_get_manifest(&self, link: &Link) -> HttpRequest {
        self.build_link_request(link, HttpMethod::Get, MANIFEST_MEDIA_TYPE)
    }

    pub fn parse_get_manifest(&self, response: HttpResponse) -> Result<Manifest, ApiError> {
        Manifest::from_xml(&parse_document(&response)?)
    }

    pub fn build_get_manifest_shipments(&self, manifest: &Manifest) -> Result<HttpRequest, ApiError> {
        let link = require_link(&manifest.links, "manifestShipments")?;
        Ok(self.build_link_request(link, HttpMethod::Get, SHIPMENT_MEDIA_TYPE))
    }

    /// Shipment ids, taken from the last path segment of each link.
    pub fn parse_get_manifest_shipments(&self, response: HttpResponse) -> Result<Vec<String>, ApiError> {
        let root = parse_document(&response)?;
        root.children_named("link")
            .map(|el| Link::from_xml(el).map(|link| link.last_segment().to_string()))
            .collect()
    }
}

fn child_links(root: &Element) -> Result<Vec<Link>, ApiError> {
    root.children.iter().map(Link::from_xml).collect()
}

fn validate_transmit(transmit: &TransmitSet) -> Result<(), ValidationError> {
    if transmit.group_ids.is_empty() {
        return Err(ValidationError::Empty("group ids"));
    }
    for group_id in &transmit.group_ids {
        check_len("group id", group_id, MAX_GROUP_ID)?;
    }
    if let Some(name) = &transmit.manifest_name {
        check_len("manifest name", name, MAX_MANIFEST_NAME)?;
    }
    for shipment_id in &transmit.excluded_shipments {
        check_len("shipment id", shipment_id, MAX_SHIPMENT_ID)?;
    }
    require_full_address(&transmit.origin, TRANSMIT)
}
