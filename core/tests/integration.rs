//! Full shipping lifecycle against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives every `CanadaPost`
//! operation over real HTTP with the default ureq transport: rate, ship,
//! fetch the label, transmit, walk the manifest, void.

use canada_post::{
    Address, ApiError, CanadaPost, Config, Destination, Environment, Item, NewShipment, Origin,
    Parcel, Service, ShipmentOption, TransmitSet,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;

fn start_mock_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

fn api(base_url: &str) -> CanadaPost {
    let config = Config::new("0001234567", "user", "pass", Environment::Sandbox)
        .with_contract_number("0040000000")
        .with_base_url(base_url);
    CanadaPost::new(config)
}

fn origin() -> Origin {
    Address::builder("K1A 0B1")
        .name("Shipping Dept")
        .company("Acme Widgets")
        .phone("613-555-0100")
        .street("123 Main Street")
        .city("Ottawa")
        .province("ON")
        .build_origin()
        .unwrap()
}

fn domestic() -> Destination {
    Address::builder("V6B 1A1")
        .name("Jane Doe")
        .street("456 Granville Street")
        .city("Vancouver")
        .province("BC")
        .build_destination("CA")
        .unwrap()
}

fn parcel() -> Parcel {
    let d = |s: &str| s.parse::<Decimal>().unwrap();
    Parcel::new(d("1.5")).with_dimensions(d("30"), d("20"), d("10"))
}

#[test]
fn shipping_lifecycle() {
    let base_url = start_mock_server();
    let api = api(&base_url);

    // Step 1: rate a domestic parcel.
    let services = api.get_rates(&parcel(), &origin(), &domestic()).unwrap();
    assert!(!services.is_empty(), "expected at least one quote");
    let expedited = services
        .iter()
        .find(|s| s.code == "DOM.EP")
        .expect("DOM.EP quoted")
        .clone();
    assert!(expedited.price.due > Decimal::ZERO);
    assert!(expedited.price.is_balanced());
    assert_eq!(expedited.transit_time, Some(2));

    // Step 2: create two shipments in one group.
    let new_shipment = NewShipment::new(parcel(), origin(), domestic(), expedited, "batch-1")
        .with_option(ShipmentOption::new("SO"));
    let first = api.create_shipment(&new_shipment).unwrap();
    let second = api.create_shipment(&new_shipment).unwrap();
    assert_ne!(first.id, second.id);
    assert_eq!(first.status.as_deref(), Some("created"));
    assert!(first.tracking_pin.is_some());
    assert!(first.links.contains_key("label"));

    // Step 3: fetch it back by id.
    let fetched = api.get_shipment(&first.id).unwrap();
    assert_eq!(fetched.id, first.id);
    assert_eq!(fetched.links, first.links);

    // Step 4: the label is pending on the first poll.
    let err = api.get_artifact(&first).unwrap_err();
    assert!(matches!(err, ApiError::NotReady), "expected NotReady, got {err:?}");
    let label = api.get_artifact(&first).unwrap();
    assert!(label.starts_with(b"%PDF"));

    // Step 5: void the second shipment.
    api.void_shipment(&second).unwrap();
    let err = api.get_shipment(&second.id).unwrap_err();
    assert!(matches!(err, ApiError::HttpError { status: 404, .. }));

    // Step 6: the open group is listed.
    assert_eq!(api.get_groups().unwrap(), ["batch-1"]);

    // Step 7: transmit the group.
    let transmit = TransmitSet::new(origin(), vec!["batch-1".to_string()])
        .with_manifest_name("Evening pickup");
    let manifest_links = api.transmit_shipments(&transmit).unwrap();
    assert_eq!(manifest_links.len(), 1);
    assert!(api.get_groups().unwrap().is_empty());

    // Step 8: the manifest is searchable by date and lists the shipment.
    let start = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
    let found = api.get_manifests(start, None).unwrap();
    assert_eq!(found, manifest_links);

    let manifest = api.get_manifest(&found[0]).unwrap();
    assert!(!manifest.po_number.is_empty());
    assert_eq!(api.get_manifest_shipments(&manifest).unwrap(), [first.id.clone()]);
    let document = api.get_artifact(&manifest).unwrap();
    assert!(document.starts_with(b"%PDF"));

    // Step 9: a transmitted shipment can no longer be voided.
    let err = api.void_shipment(&first).unwrap_err();
    assert!(matches!(err, ApiError::HttpError { status: 400, .. }));
}

#[test]
fn international_rates_and_shipment() {
    let base_url = start_mock_server();
    let api = api(&base_url);
    let destination = Address::builder("75008")
        .name("Jean Dupont")
        .phone("+33 1 23 45 67 89")
        .street("10 Rue de Rivoli")
        .city("Paris")
        .build_destination("fr")
        .unwrap();

    let services = api.get_rates(&parcel(), &origin(), &destination).unwrap();
    assert!(services.iter().all(|s| s.code.starts_with("INT.")));

    let item = Item::new(2, "Widget", Decimal::new(5, 1), Decimal::new(1500, 2)).unwrap();
    let shipment = NewShipment::new(
        parcel().with_item(item),
        origin(),
        destination,
        Service::from_code("INT.XP"),
        "intl",
    );
    let created = api.create_shipment(&shipment).unwrap();
    assert!(!created.id.is_empty());
}

#[test]
fn unknown_shipment_is_http_error() {
    let base_url = start_mock_server();
    let err = api(&base_url).get_shipment("404").unwrap_err();
    match err {
        ApiError::HttpError { status, body } => {
            assert_eq!(status, 404);
            assert!(body.contains("<messages"));
        }
        other => panic!("expected HttpError, got {other:?}"),
    }
}

#[test]
fn unreachable_host_is_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = api(&format!("http://{addr}")).get_groups().unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)), "got {err:?}");
}
