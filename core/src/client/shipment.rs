//! Contract shipments: create, fetch, void, labels and groups.

use super::{
    check_len, check_status, parse_document, require, require_full_address, require_link,
    write_parcel_characteristics, CanadaPostClient, PDF_MEDIA_TYPE, SHIPMENT_MEDIA_TYPE,
    SHIPMENT_NAMESPACE,
};
use crate::error::{ApiError, ValidationError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::parcel::MAX_ITEM_DESCRIPTION;
use crate::types::shipping::{MAX_COST_CENTRE, MAX_CUSTOMER_REF, PHONE_REQUIRED_SERVICES};
use crate::types::{
    Address, ArtifactSource, Customs, Destination, NewShipment, Parcel, ReasonForExport,
    References, Shipment, ShipmentOption,
};
use crate::xml::XmlWriter;

const CREATE: &str = "create a contract shipment";
pub(crate) const MAX_GROUP_ID: usize = 32;

impl CanadaPostClient {
    pub fn build_create_shipment(&self, shipment: &NewShipment) -> Result<HttpRequest, ApiError> {
        let contract_id = self.validate_shipment(shipment)?;
        let NewShipment {
            parcel,
            origin,
            destination,
            service,
            group_id,
            options,
            references,
            customs,
            output_format,
            payment_method,
        } = shipment;

        let mut w = self.writer()?;
        w.root("shipment", SHIPMENT_NAMESPACE, |w| {
            w.text("group-id", group_id)?;
            w.text("requested-shipping-point", &origin.postal_code)?;
            w.element("delivery-spec", |w| {
                w.text("service-code", &service.code)?;
                w.element("sender", |w| {
                    w.opt_text("name", origin.name.as_deref())?;
                    w.opt_text("company", origin.company.as_deref())?;
                    w.opt_text("contact-phone", origin.phone.as_deref())?;
                    write_address_details(w, origin)
                })?;
                write_destination(w, destination)?;
                if !destination.is_domestic() {
                    write_customs(w, customs, parcel)?;
                }
                write_options(w, options)?;
                write_parcel_characteristics(w, parcel, true)?;
                w.element("print-preferences", |w| {
                    w.text("output-format", output_format.as_str())
                })?;
                w.element("preferences", |w| {
                    w.flag("show-packing-instructions", false)?;
                    w.flag("show-postage-rate", false)?;
                    w.flag("show-insured-value", false)
                })?;
                if let Some(references) = references {
                    write_references(w, references)?;
                }
                w.element("settlement-info", |w| {
                    w.text("contract-id", contract_id)?;
                    w.text("intended-method-of-payment", payment_method.as_str())
                })
            })
        })?;
        Ok(self.post(self.contract_url("shipment"), SHIPMENT_MEDIA_TYPE, w.finish()?))
    }

    pub fn parse_create_shipment(&self, response: HttpResponse) -> Result<Shipment, ApiError> {
        Shipment::from_xml(&parse_document(&response)?)
    }

    /// The id becomes a path segment, so it must not carry `/`, `?` or `#`.
    pub fn build_get_shipment(&self, shipment_id: &str) -> Result<HttpRequest, ApiError> {
        if shipment_id.trim().is_empty() {
            return Err(ValidationError::Empty("shipment id").into());
        }
        if shipment_id.contains(['/', '?', '#']) {
            return Err(ValidationError::UnsafePathSegment {
                field: "shipment id",
                value: shipment_id.to_string(),
            }
            .into());
        }
        let url = format!("{}/{shipment_id}", self.contract_url("shipment"));
        Ok(self.get(url, SHIPMENT_MEDIA_TYPE))
    }

    pub fn parse_get_shipment(&self, response: HttpResponse) -> Result<Shipment, ApiError> {
        Shipment::from_xml(&parse_document(&response)?)
    }

    /// DELETE the shipment's `self` link.
    pub fn build_void_shipment(&self, shipment: &Shipment) -> Result<HttpRequest, ApiError> {
        let link = require_link(&shipment.links, "self")?;
        Ok(self.build_link_request(link, HttpMethod::Delete, SHIPMENT_MEDIA_TYPE))
    }

    pub fn parse_void_shipment(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    /// GET the label of a shipment or the document of a manifest.
    pub fn build_get_artifact<A: ArtifactSource>(&self, source: &A) -> Result<HttpRequest, ApiError> {
        let link = require_link(source.links(), A::ARTIFACT_REL)?;
        let accept = link.media_type.as_deref().unwrap_or(PDF_MEDIA_TYPE);
        Ok(self.build_link_request(link, HttpMethod::Get, accept))
    }

    /// The artifact bytes; `NotReady` while the vendor is still rendering it.
    pub fn parse_get_artifact(&self, response: HttpResponse) -> Result<Vec<u8>, ApiError> {
        if response.status == 202 {
            return Err(ApiError::NotReady);
        }
        check_status(&response)?;
        Ok(response.body)
    }

    pub fn build_get_groups(&self) -> HttpRequest {
        self.get(self.contract_url("group"), SHIPMENT_MEDIA_TYPE)
    }

    pub fn parse_get_groups(&self, response: HttpResponse) -> Result<Vec<String>, ApiError> {
        let root = parse_document(&response)?;
        Ok(root
            .children_named("group")
            .filter_map(|group| group.child_text("group-id"))
            .map(str::to_string)
            .collect())
    }

    /// Returns the contract id to settle with.
    fn validate_shipment<'a>(&'a self, shipment: &NewShipment) -> Result<&'a str, ValidationError> {
        let contract_id = self
            .config
            .contract_number
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .ok_or(ValidationError::Missing {
                field: "contract number",
                operation: CREATE,
            })?;

        if shipment.group_id.trim().is_empty() {
            return Err(ValidationError::Empty("group id"));
        }
        check_len("group id", &shipment.group_id, MAX_GROUP_ID)?;
        if shipment.service.code.trim().is_empty() {
            return Err(ValidationError::Empty("service code"));
        }

        require_full_address(&shipment.origin, CREATE)?;
        check_postal_code(&shipment.origin)?;

        let destination = &shipment.destination;
        if destination.phone.as_deref().map_or(true, |p| p.trim().is_empty())
            && PHONE_REQUIRED_SERVICES.contains(&shipment.service.code.as_str())
        {
            return Err(ValidationError::PhoneRequired(shipment.service.code.clone()));
        }
        if !destination.has_street() {
            return Err(ValidationError::Missing {
                field: "destination street address",
                operation: CREATE,
            });
        }
        if requires_postal_code(&destination.country_code) {
            require(destination.province.as_deref(), "destination province", CREATE)?;
        }
        check_postal_code(destination)?;

        if !destination.is_domestic() && shipment.parcel.items.is_empty() {
            return Err(ValidationError::CustomsRequiresItems);
        }
        // Item fields are public, so `Item::new` is not the only way in.
        for item in &shipment.parcel.items {
            check_len("customs description", &item.description, MAX_ITEM_DESCRIPTION)?;
        }
        if let Some(references) = &shipment.references {
            validate_references(references)?;
        }
        Ok(contract_id)
    }
}

fn requires_postal_code(country_code: &str) -> bool {
    matches!(country_code, "CA" | "US")
}

fn check_postal_code(address: &Address) -> Result<(), ValidationError> {
    if address.postal_code.is_empty() && requires_postal_code(&address.country_code) {
        return Err(ValidationError::PostalCodeRequired(address.country_code.clone()));
    }
    Ok(())
}

fn validate_references(references: &References) -> Result<(), ValidationError> {
    if let Some(cost_centre) = &references.cost_centre {
        check_len("cost centre", cost_centre, MAX_COST_CENTRE)?;
    }
    if let Some(reference) = &references.customer_ref_1 {
        check_len("customer ref 1", reference, MAX_CUSTOMER_REF)?;
    }
    if let Some(reference) = &references.customer_ref_2 {
        check_len("customer ref 2", reference, MAX_CUSTOMER_REF)?;
    }
    Ok(())
}

fn write_address_details(w: &mut XmlWriter, address: &Address) -> Result<(), ApiError> {
    w.element("address-details", |w| {
        w.opt_text("address-line-1", address.address1.as_deref())?;
        w.opt_text("address-line-2", address.address2.as_deref())?;
        w.opt_text("city", address.city.as_deref())?;
        w.opt_text("prov-state", address.province.as_deref())?;
        w.text("country-code", &address.country_code)?;
        if !address.postal_code.is_empty() {
            w.text("postal-zip-code", &address.postal_code)?;
        }
        Ok(())
    })
}

fn write_destination(w: &mut XmlWriter, destination: &Destination) -> Result<(), ApiError> {
    w.element("destination", |w| {
        w.opt_text("name", destination.name.as_deref())?;
        w.opt_text("company", destination.company.as_deref())?;
        w.opt_text("additional-address-info", destination.extra.as_deref())?;
        w.opt_text("client-voice-number", destination.phone.as_deref())?;
        write_address_details(w, destination)
    })
}

fn write_customs(w: &mut XmlWriter, customs: &Customs, parcel: &Parcel) -> Result<(), ApiError> {
    w.element("customs", |w| {
        w.text("currency", &customs.currency)?;
        w.text("reason-for-export", customs.reason_for_export.code())?;
        if let ReasonForExport::Other(reason) = &customs.reason_for_export {
            w.text("other-reason", reason)?;
        }
        w.element("sku-list", |w| {
            for item in &parcel.items {
                w.element("item", |w| {
                    w.text("customs-number-of-units", item.amount.to_string())?;
                    w.text("customs-description", &item.description)?;
                    w.text("unit-weight", item.weight.to_string())?;
                    w.text("customs-value-per-unit", item.unit_price.to_string())
                })?;
            }
            Ok(())
        })
    })
}

fn write_options(w: &mut XmlWriter, options: &[ShipmentOption]) -> Result<(), ApiError> {
    if options.is_empty() {
        return Ok(());
    }
    w.element("options", |w| {
        for option in options {
            w.element("option", |w| {
                w.text("option-code", &option.code)?;
                if let Some(amount) = option.amount {
                    w.text("option-amount", amount.to_string())?;
                }
                w.opt_text("option-qualifier-1", option.qualifier_1.as_deref())?;
                w.opt_text("option-qualifier-2", option.qualifier_2.as_deref())
            })?;
        }
        Ok(())
    })
}

fn write_references(w: &mut XmlWriter, references: &References) -> Result<(), ApiError> {
    w.element("references", |w| {
        w.opt_text("cost-centre", references.cost_centre.as_deref())?;
        w.opt_text("customer-ref-1", references.customer_ref_1.as_deref())?;
        w.opt_text("customer-ref-2", references.customer_ref_2.as_deref())
    })
}
