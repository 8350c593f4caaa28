//! One call per vendor operation: build, execute, parse.
//!
//! # Design
//! `CanadaPost` owns a `CanadaPostClient` and a `Transport`. Every method is
//! a single blocking round trip; nothing is retried. Validation errors come
//! back before the transport is touched.

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::client::CanadaPostClient;
use crate::config::Config;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse, Transport, UreqTransport};
use crate::types::{
    ArtifactSource, Destination, Link, Manifest, NewShipment, Origin, Parcel, Service, Shipment,
    TransmitSet,
};

pub struct CanadaPost<T: Transport = UreqTransport> {
    client: CanadaPostClient,
    transport: T,
}

impl CanadaPost<UreqTransport> {
    pub fn new(config: Config) -> Self {
        Self::with_transport(config, UreqTransport::new())
    }
}

impl<T: Transport> CanadaPost<T> {
    pub fn with_transport(config: Config, transport: T) -> Self {
        Self {
            client: CanadaPostClient::new(config),
            transport,
        }
    }

    pub fn client(&self) -> &CanadaPostClient {
        &self.client
    }

    pub fn get_rates(
        &self,
        parcel: &Parcel,
        origin: &Origin,
        destination: &Destination,
    ) -> Result<Vec<Service>, ApiError> {
        info!(
            origin = %origin.postal_code,
            destination = %destination.country_code,
            weight = %parcel.weight,
            "getting rates"
        );
        let request = self.client.build_get_rates(parcel, origin, destination)?;
        let services = self.client.parse_get_rates(self.send(request)?)?;
        info!(count = services.len(), "rates received");
        Ok(services)
    }

    pub fn create_shipment(&self, shipment: &NewShipment) -> Result<Shipment, ApiError> {
        info!(
            group = %shipment.group_id,
            service = %shipment.service.code,
            destination = %shipment.destination.country_code,
            "creating shipment"
        );
        let request = self.client.build_create_shipment(shipment)?;
        let created = self.client.parse_create_shipment(self.send(request)?)?;
        info!(id = %created.id, tracking_pin = ?created.tracking_pin, "shipment created");
        Ok(created)
    }

    pub fn get_shipment(&self, shipment_id: &str) -> Result<Shipment, ApiError> {
        let request = self.client.build_get_shipment(shipment_id)?;
        self.client.parse_get_shipment(self.send(request)?)
    }

    pub fn void_shipment(&self, shipment: &Shipment) -> Result<(), ApiError> {
        info!(id = %shipment.id, "voiding shipment");
        let request = self.client.build_void_shipment(shipment)?;
        self.client.parse_void_shipment(self.send(request)?)
    }

    /// Fetch a label or manifest document. `ApiError::NotReady` means the
    /// vendor is still producing it and the caller should poll again later.
    pub fn get_artifact<A: ArtifactSource>(&self, source: &A) -> Result<Vec<u8>, ApiError> {
        let request = self.client.build_get_artifact(source)?;
        let artifact = self.client.parse_get_artifact(self.send(request)?)?;
        info!(bytes = artifact.len(), "artifact received");
        Ok(artifact)
    }

    pub fn transmit_shipments(&self, transmit: &TransmitSet) -> Result<Vec<Link>, ApiError> {
        info!(groups = ?transmit.group_ids, "transmitting shipments");
        let request = self.client.build_transmit_shipments(transmit)?;
        self.client.parse_transmit_shipments(self.send(request)?)
    }

    pub fn get_manifests(&self, start: NaiveDate, end: Option<NaiveDate>) -> Result<Vec<Link>, ApiError> {
        let request = self.client.build_get_manifests(start, end);
        self.client.parse_get_manifests(self.send(request)?)
    }

    pub fn get_manifest(&self, link: &Link) -> Result<Manifest, ApiError> {
        let request = self.client.build_get_manifest(link);
        self.client.parse_get_manifest(self.send(request)?)
    }

    pub fn get_manifest_shipments(&self, manifest: &Manifest) -> Result<Vec<String>, ApiError> {
        info!(po_number = %manifest.po_number, "getting manifest shipments");
        let request = self.client.build_get_manifest_shipments(manifest)?;
        self.client.parse_get_manifest_shipments(self.send(request)?)
    }

    pub fn get_groups(&self) -> Result<Vec<String>, ApiError> {
        let request = self.client.build_get_groups();
        self.client.parse_get_groups(self.send(request)?)
    }

    fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        info!(method = request.method.as_str(), url = %request.url, "calling Canada Post");
        if let Some(body) = &request.body {
            debug!(body = %body, "request body");
        }
        let response = self.transport.execute(request)?;
        info!(status = response.status, "Canada Post responded");
        debug!(body = %String::from_utf8_lossy(&response.body), "response body");
        Ok(response)
    }
}
