//! Domain value objects.
//!
//! Inputs (`Origin`, `Destination`, `Parcel`, `NewShipment`, `TransmitSet`)
//! are validated at construction or while the request is built; results
//! (`Service`, `Shipment`, `Manifest`, `Link`) are parsed from responses and
//! derive serde so they can be stored or compared as JSON.

pub mod address;
pub mod money;
pub mod parcel;
pub mod shipping;

pub use address::{Address, AddressBuilder, Destination, Origin, HOME_COUNTRY};
pub use money::{Adjustment, Price, Tax};
pub use parcel::{Item, Parcel};
pub use shipping::{
    ArtifactSource, Customs, Link, Manifest, NewShipment, OutputFormat, PaymentMethod,
    ReasonForExport, References, Service, Shipment, ShipmentOption, TransmitSet,
};
