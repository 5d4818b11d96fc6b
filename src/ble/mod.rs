//! BLE communication module.
//!
//! The transport contract, its btleplug implementation, and the fixed GATT
//! identifiers and registries for the Volcano firmware.

pub mod adapter;
pub mod registry;
pub mod transport;
pub mod uuids;

pub use adapter::BtleplugTransport;
pub use registry::{CharacteristicRegistry, ServiceRegistry};
pub use transport::{AdapterState, DeviceHandle, Transport, TransportError, TransportEvent};
pub use uuids::*;
