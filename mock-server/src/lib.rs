//! In-memory stand-in for the Canada Post rating and contract shipping
//! services, used by the client's end-to-end tests.
//!
//! # Design
//! Request bodies are read through the `Xml` extractor into the few fields
//! each handler acts on; responses are serde structs written by quick-xml in
//! the vendor's element names. State lives in a single `Store` behind a
//! `RwLock`; ids come from a counter so runs are reproducible.

use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use axum::{
    extract::{FromRequest, Path, Query, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{info, warn};

pub const RATE_MEDIA_TYPE: &str = "application/vnd.cpc.ship.rate+xml";
pub const SHIPMENT_MEDIA_TYPE: &str = "application/vnd.cpc.shipment-v7+xml";
pub const MANIFEST_MEDIA_TYPE: &str = "application/vnd.cpc.manifest-v7+xml";
pub const MESSAGES_MEDIA_TYPE: &str = "application/vnd.cpc.messages+xml";
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

const RATE_NAMESPACE: &str = "http://www.canadapost.ca/ws/ship/rate";
const SHIPMENT_NAMESPACE: &str = "http://www.canadapost.ca/ws/shipment-v7";
const MANIFEST_NAMESPACE: &str = "http://www.canadapost.ca/ws/manifest-v7";
const MESSAGES_NAMESPACE: &str = "http://www.canadapost.ca/ws/messages";
const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Label polls answered with `202 Accepted` before the PDF is served.
pub const LABEL_PENDING_POLLS: u32 = 1;

// --- request documents ---

#[derive(Debug, Deserialize)]
pub struct MailingScenario {
    pub destination: RateDestination,
}

#[derive(Debug, Deserialize)]
pub struct RateDestination {
    pub domestic: Option<Domestic>,
    #[serde(rename = "united-states")]
    pub united_states: Option<UnitedStates>,
    pub international: Option<International>,
}

#[derive(Debug, Deserialize)]
pub struct Domestic {
    #[serde(rename = "postal-code")]
    pub postal_code: String,
}

#[derive(Debug, Deserialize)]
pub struct UnitedStates {
    #[serde(rename = "zip-code")]
    pub zip_code: String,
}

#[derive(Debug, Deserialize)]
pub struct International {
    #[serde(rename = "country-code")]
    pub country_code: String,
}

#[derive(Debug, Deserialize)]
pub struct ShipmentRequest {
    #[serde(rename = "group-id")]
    pub group_id: String,
    #[serde(rename = "delivery-spec")]
    pub delivery_spec: DeliverySpec,
}

#[derive(Debug, Deserialize)]
pub struct DeliverySpec {
    #[serde(rename = "service-code")]
    pub service_code: String,
}

#[derive(Debug, Deserialize)]
pub struct TransmitRequest {
    #[serde(rename = "group-ids")]
    pub group_ids: GroupIds,
    #[serde(rename = "excluded-shipments")]
    pub excluded_shipments: Option<ExcludedShipments>,
}

#[derive(Debug, Deserialize)]
pub struct GroupIds {
    #[serde(rename = "group-id", default)]
    pub group_id: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ExcludedShipments {
    #[serde(rename = "shipment-id", default)]
    pub shipment_id: Vec<String>,
}

// --- response documents ---

#[derive(Debug, Serialize)]
struct LinkXml {
    #[serde(rename = "@rel")]
    rel: &'static str,
    #[serde(rename = "@href")]
    href: String,
    #[serde(rename = "@media-type")]
    media_type: &'static str,
    #[serde(rename = "@index", skip_serializing_if = "Option::is_none")]
    index: Option<u32>,
}

impl LinkXml {
    fn new(rel: &'static str, href: String, media_type: &'static str) -> Self {
        Self {
            rel,
            href,
            media_type,
            index: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct Links {
    link: Vec<LinkXml>,
}

#[derive(Debug, Serialize)]
struct PriceQuotes {
    #[serde(rename = "@xmlns")]
    xmlns: &'static str,
    #[serde(rename = "price-quote")]
    quotes: Vec<PriceQuote>,
}

#[derive(Debug, Serialize)]
struct PriceQuote {
    #[serde(rename = "service-code")]
    service_code: &'static str,
    #[serde(rename = "service-link")]
    service_link: LinkXml,
    #[serde(rename = "service-name")]
    service_name: &'static str,
    #[serde(rename = "price-details")]
    price_details: PriceDetails,
    #[serde(rename = "service-standard")]
    service_standard: ServiceStandard,
}

#[derive(Debug, Serialize)]
struct PriceDetails {
    base: &'static str,
    taxes: Taxes,
    due: &'static str,
}

#[derive(Debug, Serialize)]
struct Taxes {
    gst: TaxXml,
    pst: TaxXml,
    hst: TaxXml,
}

#[derive(Debug, Serialize)]
struct TaxXml {
    #[serde(rename = "@percent")]
    percent: &'static str,
    #[serde(rename = "$text")]
    amount: &'static str,
}

#[derive(Debug, Serialize)]
struct ServiceStandard {
    #[serde(rename = "am-delivery")]
    am_delivery: bool,
    #[serde(rename = "guaranteed-delivery")]
    guaranteed_delivery: bool,
    #[serde(rename = "expected-transit-time")]
    expected_transit_time: u32,
}

#[derive(Debug, Serialize)]
struct ShipmentInfo {
    #[serde(rename = "@xmlns")]
    xmlns: &'static str,
    #[serde(rename = "shipment-id")]
    shipment_id: String,
    #[serde(rename = "shipment-status")]
    shipment_status: &'static str,
    #[serde(rename = "tracking-pin")]
    tracking_pin: String,
    links: Links,
}

#[derive(Debug, Serialize)]
struct Groups {
    #[serde(rename = "@xmlns")]
    xmlns: &'static str,
    group: Vec<Group>,
}

#[derive(Debug, Serialize)]
struct Group {
    #[serde(rename = "group-id")]
    group_id: String,
    link: LinkXml,
}

/// `<manifests>` and `<shipments>`: a bare list of links.
#[derive(Debug, Serialize)]
struct LinkList {
    #[serde(rename = "@xmlns")]
    xmlns: &'static str,
    link: Vec<LinkXml>,
}

#[derive(Debug, Serialize)]
struct ManifestXml {
    #[serde(rename = "@xmlns")]
    xmlns: &'static str,
    #[serde(rename = "po-number")]
    po_number: String,
    links: Links,
}

#[derive(Debug, Serialize)]
struct Messages {
    #[serde(rename = "@xmlns")]
    xmlns: &'static str,
    message: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    code: &'static str,
    description: String,
}

/// Request body deserialized from XML, rejected with a vendor `<messages>`
/// document when it does not match `T`.
pub struct Xml<T>(pub T);

impl<T, S> FromRequest<S> for Xml<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = String::from_request(req, state)
            .await
            .map_err(IntoResponse::into_response)?;
        quick_xml::de::from_str(&body)
            .map(Xml)
            .map_err(|e| messages(StatusCode::BAD_REQUEST, "9000", e.to_string()))
    }
}

// --- state ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredShipment {
    pub id: String,
    pub group_id: String,
    pub service_code: String,
    pub tracking_pin: String,
    pub transmitted: bool,
    pub label_polls: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredManifest {
    pub po_number: String,
    pub shipment_ids: Vec<String>,
}

#[derive(Debug, Default)]
pub struct Store {
    next_id: u64,
    pub shipments: BTreeMap<String, StoredShipment>,
    pub manifests: BTreeMap<String, StoredManifest>,
}

impl Store {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

pub type Db = Arc<RwLock<Store>>;

#[derive(Clone)]
struct AppState {
    base_url: String,
    db: Db,
}

impl AppState {
    fn contract_url(&self, customer: &str, mobo: &str, resource: &str) -> String {
        format!("{}/rs/{customer}/{mobo}/{resource}", self.base_url)
    }
}

/// Router whose response links point at `base_url`.
pub fn app(base_url: impl Into<String>) -> Router {
    let state = AppState {
        base_url: base_url.into().trim_end_matches('/').to_string(),
        db: Db::default(),
    };
    Router::new()
        .route("/rs/ship/price", post(get_rates))
        .route("/rs/{customer}/{mobo}/shipment", post(create_shipment))
        .route(
            "/rs/{customer}/{mobo}/shipment/{id}",
            get(get_shipment).delete(void_shipment),
        )
        .route("/rs/{customer}/{mobo}/shipment/{id}/label", get(get_label))
        .route("/rs/{customer}/{mobo}/group", get(get_groups))
        .route(
            "/rs/{customer}/{mobo}/manifest",
            get(get_manifests).post(transmit_shipments),
        )
        .route("/rs/{customer}/{mobo}/manifest/{po}", get(get_manifest))
        .route(
            "/rs/{customer}/{mobo}/manifest/{po}/shipment",
            get(get_manifest_shipments),
        )
        .route(
            "/rs/{customer}/{mobo}/manifest/{po}/artifact",
            get(get_manifest_artifact),
        )
        .layer(middleware::from_fn(require_basic_auth))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    let base_url = format!("http://{}", listener.local_addr()?);
    info!(%base_url, "mock Canada Post listening");
    axum::serve(listener, app(base_url)).await
}

async fn require_basic_auth(request: Request, next: Next) -> Response {
    if has_basic_credentials(request.headers()) {
        next.run(request).await
    } else {
        messages(StatusCode::UNAUTHORIZED, "E002", "AAA Authentication Failure")
    }
}

/// Any non-empty `Basic` credentials are accepted.
fn has_basic_credentials(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Basic "))
        .is_some_and(|c| !c.trim().is_empty())
}

// --- handlers ---

async fn get_rates(Xml(scenario): Xml<MailingScenario>) -> Response {
    let destination = &scenario.destination;
    let quotes: &[(&'static str, &'static str, &'static str, u32)] = if let Some(d) =
        &destination.domestic
    {
        info!(postal_code = %d.postal_code, "domestic rates");
        &[
            ("DOM.RP", "Regular Parcel", "10.00", 4),
            ("DOM.EP", "Expedited Parcel", "12.50", 2),
            ("DOM.XP", "Xpresspost", "18.75", 1),
        ]
    } else if let Some(us) = &destination.united_states {
        info!(zip_code = %us.zip_code, "US rates");
        &[
            ("USA.EP", "Expedited Parcel USA", "24.10", 5),
            ("USA.XP", "Xpresspost USA", "39.80", 2),
        ]
    } else if let Some(intl) = &destination.international {
        info!(country = %intl.country_code, "international rates");
        &[("INT.XP", "Xpresspost International", "74.35", 6)]
    } else {
        return messages(StatusCode::BAD_REQUEST, "9122", "destination is required");
    };

    let document = PriceQuotes {
        xmlns: RATE_NAMESPACE,
        quotes: quotes
            .iter()
            .map(|&(code, name, base, transit)| PriceQuote {
                service_code: code,
                service_link: LinkXml::new(
                    "service",
                    format!("https://ct.soa-gw.canadapost.ca/rs/ship/service/{code}"),
                    RATE_MEDIA_TYPE,
                ),
                service_name: name,
                price_details: PriceDetails {
                    base,
                    taxes: Taxes {
                        gst: TaxXml { percent: "5.00", amount: "0.00" },
                        pst: TaxXml { percent: "0", amount: "0.00" },
                        hst: TaxXml { percent: "0", amount: "0.00" },
                    },
                    due: base,
                },
                service_standard: ServiceStandard {
                    am_delivery: false,
                    guaranteed_delivery: true,
                    expected_transit_time: transit,
                },
            })
            .collect(),
    };
    xml_response(StatusCode::OK, RATE_MEDIA_TYPE, "price-quotes", &document)
}

async fn create_shipment(
    State(state): State<AppState>,
    Path((customer, mobo)): Path<(String, String)>,
    Xml(request): Xml<ShipmentRequest>,
) -> Response {
    if request.group_id.trim().is_empty() {
        return messages(StatusCode::BAD_REQUEST, "9115", "group-id is required");
    }
    if request.delivery_spec.service_code.trim().is_empty() {
        return messages(StatusCode::BAD_REQUEST, "9116", "service-code is required");
    }

    let mut store = state.db.write().await;
    let n = store.next_id();
    let shipment = StoredShipment {
        id: format!("3400000000000{n:05}"),
        group_id: request.group_id,
        service_code: request.delivery_spec.service_code,
        tracking_pin: format!("10000000{n:05}"),
        transmitted: false,
        label_polls: 0,
    };
    info!(id = %shipment.id, group = %shipment.group_id, "shipment created");
    let document = shipment_info(&state, &customer, &mobo, &shipment);
    store.shipments.insert(shipment.id.clone(), shipment);
    xml_response(StatusCode::OK, SHIPMENT_MEDIA_TYPE, "shipment-info", &document)
}

async fn get_shipment(
    State(state): State<AppState>,
    Path((customer, mobo, id)): Path<(String, String, String)>,
) -> Response {
    let store = state.db.read().await;
    match store.shipments.get(&id) {
        Some(shipment) => xml_response(
            StatusCode::OK,
            SHIPMENT_MEDIA_TYPE,
            "shipment-info",
            &shipment_info(&state, &customer, &mobo, shipment),
        ),
        None => not_found(&id),
    }
}

async fn void_shipment(
    State(state): State<AppState>,
    Path((_customer, _mobo, id)): Path<(String, String, String)>,
) -> Response {
    let mut store = state.db.write().await;
    let transmitted = match store.shipments.get(&id) {
        Some(shipment) => shipment.transmitted,
        None => return not_found(&id),
    };
    if transmitted {
        return messages(
            StatusCode::BAD_REQUEST,
            "8062",
            "shipment has already been transmitted",
        );
    }
    store.shipments.remove(&id);
    info!(%id, "shipment voided");
    StatusCode::NO_CONTENT.into_response()
}

async fn get_label(
    State(state): State<AppState>,
    Path((_customer, _mobo, id)): Path<(String, String, String)>,
) -> Response {
    let mut store = state.db.write().await;
    let Some(shipment) = store.shipments.get_mut(&id) else {
        return not_found(&id);
    };
    if shipment.label_polls < LABEL_PENDING_POLLS {
        shipment.label_polls += 1;
        return StatusCode::ACCEPTED.into_response();
    }
    pdf_response(format!("%PDF-1.4 label {id}"))
}

async fn get_groups(
    State(state): State<AppState>,
    Path((customer, mobo)): Path<(String, String)>,
) -> Response {
    let store = state.db.read().await;
    let mut group_ids: Vec<&str> = store
        .shipments
        .values()
        .filter(|s| !s.transmitted)
        .map(|s| s.group_id.as_str())
        .collect();
    group_ids.sort_unstable();
    group_ids.dedup();

    let document = Groups {
        xmlns: SHIPMENT_NAMESPACE,
        group: group_ids
            .into_iter()
            .map(|group_id| Group {
                group_id: group_id.to_string(),
                link: LinkXml::new(
                    "group",
                    state.contract_url(&customer, &mobo, &format!("group/{group_id}")),
                    SHIPMENT_MEDIA_TYPE,
                ),
            })
            .collect(),
    };
    xml_response(StatusCode::OK, SHIPMENT_MEDIA_TYPE, "groups", &document)
}

async fn transmit_shipments(
    State(state): State<AppState>,
    Path((customer, mobo)): Path<(String, String)>,
    Xml(request): Xml<TransmitRequest>,
) -> Response {
    let group_ids = request.group_ids.group_id;
    if group_ids.is_empty() {
        return messages(StatusCode::BAD_REQUEST, "9115", "group-id is required");
    }
    let excluded = request
        .excluded_shipments
        .map(|e| e.shipment_id)
        .unwrap_or_default();

    let mut store = state.db.write().await;
    let mut shipment_ids = Vec::new();
    for shipment in store.shipments.values_mut() {
        if shipment.transmitted
            || !group_ids.contains(&shipment.group_id)
            || excluded.contains(&shipment.id)
        {
            continue;
        }
        shipment.transmitted = true;
        shipment_ids.push(shipment.id.clone());
    }
    if shipment_ids.is_empty() {
        warn!(groups = ?group_ids, "transmit matched no shipments");
        return messages(
            StatusCode::BAD_REQUEST,
            "7292",
            "no shipments found for the given groups",
        );
    }

    let n = store.next_id();
    let po_number = format!("P{n:07}");
    info!(%po_number, shipments = shipment_ids.len(), "manifest created");
    store.manifests.insert(
        po_number.clone(),
        StoredManifest {
            po_number: po_number.clone(),
            shipment_ids,
        },
    );

    let document = manifest_links(&state, &customer, &mobo, [po_number.as_str()]);
    xml_response(StatusCode::OK, MANIFEST_MEDIA_TYPE, "manifests", &document)
}

async fn get_manifests(
    State(state): State<AppState>,
    Path((customer, mobo)): Path<(String, String)>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if !query.get("start").is_some_and(|s| is_date(s)) {
        return messages(StatusCode::BAD_REQUEST, "9201", "start must be YYYYMMDD");
    }
    if query.get("end").is_some_and(|e| !is_date(e)) {
        return messages(StatusCode::BAD_REQUEST, "9202", "end must be YYYYMMDD");
    }
    let store = state.db.read().await;
    let document = manifest_links(
        &state,
        &customer,
        &mobo,
        store.manifests.keys().map(String::as_str),
    );
    xml_response(StatusCode::OK, MANIFEST_MEDIA_TYPE, "manifests", &document)
}

async fn get_manifest(
    State(state): State<AppState>,
    Path((customer, mobo, po)): Path<(String, String, String)>,
) -> Response {
    let store = state.db.read().await;
    if !store.manifests.contains_key(&po) {
        return not_found(&po);
    }
    let url = |suffix: &str| state.contract_url(&customer, &mobo, &format!("manifest/{po}{suffix}"));
    let document = ManifestXml {
        xmlns: MANIFEST_NAMESPACE,
        po_number: po.clone(),
        links: Links {
            link: vec![
                LinkXml::new("self", url(""), MANIFEST_MEDIA_TYPE),
                LinkXml::new("details", url("/details"), MANIFEST_MEDIA_TYPE),
                LinkXml::new("artifact", url("/artifact"), PDF_MEDIA_TYPE),
                LinkXml::new("manifestShipments", url("/shipment"), SHIPMENT_MEDIA_TYPE),
            ],
        },
    };
    xml_response(StatusCode::OK, MANIFEST_MEDIA_TYPE, "manifest", &document)
}

async fn get_manifest_shipments(
    State(state): State<AppState>,
    Path((customer, mobo, po)): Path<(String, String, String)>,
) -> Response {
    let store = state.db.read().await;
    let Some(manifest) = store.manifests.get(&po) else {
        return not_found(&po);
    };
    let document = LinkList {
        xmlns: SHIPMENT_NAMESPACE,
        link: manifest
            .shipment_ids
            .iter()
            .map(|id| {
                LinkXml::new(
                    "shipment",
                    state.contract_url(&customer, &mobo, &format!("shipment/{id}")),
                    SHIPMENT_MEDIA_TYPE,
                )
            })
            .collect(),
    };
    xml_response(StatusCode::OK, SHIPMENT_MEDIA_TYPE, "shipments", &document)
}

async fn get_manifest_artifact(
    State(state): State<AppState>,
    Path((_customer, _mobo, po)): Path<(String, String, String)>,
) -> Response {
    let store = state.db.read().await;
    if !store.manifests.contains_key(&po) {
        return not_found(&po);
    }
    pdf_response(format!("%PDF-1.4 manifest {po}"))
}

// --- helpers ---

fn shipment_info(
    state: &AppState,
    customer: &str,
    mobo: &str,
    shipment: &StoredShipment,
) -> ShipmentInfo {
    let url = |resource: String| state.contract_url(customer, mobo, &resource);
    let id = &shipment.id;
    let mut label = LinkXml::new("label", url(format!("shipment/{id}/label")), PDF_MEDIA_TYPE);
    label.index = Some(0);
    ShipmentInfo {
        xmlns: SHIPMENT_NAMESPACE,
        shipment_id: id.clone(),
        shipment_status: if shipment.transmitted {
            "transmitted"
        } else {
            "created"
        },
        tracking_pin: shipment.tracking_pin.clone(),
        links: Links {
            link: vec![
                LinkXml::new("self", url(format!("shipment/{id}")), SHIPMENT_MEDIA_TYPE),
                LinkXml::new(
                    "details",
                    url(format!("shipment/{id}/details")),
                    SHIPMENT_MEDIA_TYPE,
                ),
                LinkXml::new(
                    "group",
                    url(format!("group/{}", shipment.group_id)),
                    SHIPMENT_MEDIA_TYPE,
                ),
                LinkXml::new("price", url(format!("shipment/{id}/price")), SHIPMENT_MEDIA_TYPE),
                label,
            ],
        },
    }
}

fn manifest_links<'a>(
    state: &AppState,
    customer: &str,
    mobo: &str,
    po_numbers: impl IntoIterator<Item = &'a str>,
) -> LinkList {
    LinkList {
        xmlns: MANIFEST_NAMESPACE,
        link: po_numbers
            .into_iter()
            .map(|po| {
                LinkXml::new(
                    "manifest",
                    state.contract_url(customer, mobo, &format!("manifest/{po}")),
                    MANIFEST_MEDIA_TYPE,
                )
            })
            .collect(),
    }
}

fn xml_response<T: Serialize>(
    status: StatusCode,
    media_type: &'static str,
    root: &str,
    document: &T,
) -> Response {
    match quick_xml::se::to_string_with_root(root, document) {
        Ok(body) => (
            status,
            [(header::CONTENT_TYPE, media_type)],
            format!("{XML_DECLARATION}{body}"),
        )
            .into_response(),
        Err(e) => {
            warn!(%root, error = %e, "failed to write response");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn pdf_response(body: String) -> Response {
    (StatusCode::OK, [(header::CONTENT_TYPE, PDF_MEDIA_TYPE)], body.into_bytes()).into_response()
}

fn messages(status: StatusCode, code: &'static str, description: impl Into<String>) -> Response {
    let document = Messages {
        xmlns: MESSAGES_NAMESPACE,
        message: vec![Message {
            code,
            description: description.into(),
        }],
    };
    xml_response(status, MESSAGES_MEDIA_TYPE, "messages", &document)
}

fn not_found(id: &str) -> Response {
    messages(StatusCode::NOT_FOUND, "9999", format!("{id} was not found"))
}

fn is_date(value: &str) -> bool {
    value.len() == 8 && value.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transmit_request_reads_every_group_and_exclusion() {
        let request: TransmitRequest = quick_xml::de::from_str(
            r#"<transmit-set xmlns="http://www.canadapost.ca/ws/manifest-v7">
                 <group-ids><group-id>a</group-id><group-id>R&amp;D</group-id></group-ids>
                 <requested-shipping-point>K1A0B1</requested-shipping-point>
                 <excluded-shipments><shipment-id>7</shipment-id></excluded-shipments>
               </transmit-set>"#,
        )
        .unwrap();
        assert_eq!(request.group_ids.group_id, ["a", "R&D"]);
        assert_eq!(request.excluded_shipments.unwrap().shipment_id, ["7"]);
    }

    #[test]
    fn shipment_request_ignores_unread_elements() {
        let request: ShipmentRequest = quick_xml::de::from_str(
            r#"<shipment><group-id>g</group-id><requested-shipping-point>K1A0B1</requested-shipping-point>
                 <delivery-spec><service-code>DOM.EP</service-code><sender><company>Acme</company></sender></delivery-spec>
               </shipment>"#,
        )
        .unwrap();
        assert_eq!(request.group_id, "g");
        assert_eq!(request.delivery_spec.service_code, "DOM.EP");
    }

    #[test]
    fn rate_destination_variant_is_detected() {
        let scenario: MailingScenario = quick_xml::de::from_str(
            "<mailing-scenario><destination><united-states><zip-code>10001</zip-code></united-states></destination></mailing-scenario>",
        )
        .unwrap();
        assert!(scenario.destination.domestic.is_none());
        assert_eq!(scenario.destination.united_states.unwrap().zip_code, "10001");
    }

    #[test]
    fn written_text_and_attributes_are_escaped() {
        let document = Groups {
            xmlns: SHIPMENT_NAMESPACE,
            group: vec![Group {
                group_id: "R&D <ops>".to_string(),
                link: LinkXml::new("group", "http://h/group/a&b".to_string(), SHIPMENT_MEDIA_TYPE),
            }],
        };
        let xml = quick_xml::se::to_string_with_root("groups", &document).unwrap();
        assert!(xml.contains("<group-id>R&amp;D &lt;ops&gt;</group-id>"));
        assert!(xml.contains(r#"href="http://h/group/a&amp;b""#));
    }

    #[test]
    fn dates_are_eight_digits() {
        assert!(is_date("20261019"));
        assert!(!is_date("2026-10-19"));
        assert!(!is_date("2026101"));
    }

    #[test]
    fn basic_credentials_are_required() {
        let mut headers = HeaderMap::new();
        assert!(!has_basic_credentials(&headers));
        headers.insert(header::AUTHORIZATION, "Bearer token".parse().unwrap());
        assert!(!has_basic_credentials(&headers));
        headers.insert(header::AUTHORIZATION, "Basic dXNlcjpwYXNz".parse().unwrap());
        assert!(has_basic_credentials(&headers));
    }

    #[test]
    fn store_ids_increase() {
        let mut store = Store::default();
        assert_eq!(store.next_id(), 1);
        assert_eq!(store.next_id(), 2);
    }
}
