//! The transport contract consumed by the session manager.
//!
//! A [`Transport`] is the underlying BLE stack: it performs scans, connects,
//! discovers services and characteristics, and issues reads and writes.
//! Results of the asynchronous calls arrive as [`TransportEvent`]s on a
//! broadcast channel, keyed by the originating device or characteristic
//! identity, so the session can await exactly the event it caused.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Opaque reference to a physical peripheral.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceHandle {
    /// Stable identifier for the peripheral (MAC address or platform UUID).
    pub id: String,
    /// Advertised local name, empty if the peripheral did not advertise one.
    pub name: String,
}

impl DeviceHandle {
    /// Create a new handle.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Power/authorization state of the BLE adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdapterState {
    /// State not yet reported by the platform.
    #[default]
    Unknown,
    /// The platform has no usable BLE adapter.
    Unsupported,
    /// The user or OS denied BLE access.
    Unauthorized,
    /// The adapter is present but radio is off.
    PoweredOff,
    /// The adapter is ready for use.
    PoweredOn,
}

/// Error type for transport-level failures.
///
/// These never escape the session boundary; the session translates them into
/// [`crate::Error`] variants.
#[derive(Error, Debug)]
pub enum TransportError {
    /// No usable adapter on this system.
    #[error("Bluetooth adapter unavailable")]
    AdapterUnavailable,

    /// BLE access denied by the user or OS.
    #[error("Bluetooth permission denied")]
    PermissionDenied,

    /// The operation needs a connected peripheral.
    #[error("peripheral not connected")]
    NotConnected,

    /// The peripheral does not expose the requested characteristic.
    #[error("characteristic not found: {uuid}")]
    CharacteristicNotFound {
        /// The UUID that was looked up.
        uuid: Uuid,
    },

    /// Any other backend failure.
    #[error("backend error: {0}")]
    Backend(String),
}

/// Asynchronous event delivered by a [`Transport`].
#[derive(Debug, Clone)]
pub enum TransportEvent {
    /// A peripheral was discovered (or re-advertised) during a scan.
    DeviceDiscovered {
        /// The discovered peripheral.
        device: DeviceHandle,
    },
    /// A connection attempt completed.
    DeviceConnected {
        /// Identifier of the now-connected peripheral.
        id: String,
    },
    /// The peripheral dropped, or a deliberate disconnect completed.
    DeviceDisconnected {
        /// Identifier of the now-disconnected peripheral.
        id: String,
    },
    /// Service discovery completed for a peripheral.
    ServicesDiscovered {
        /// Identifier of the peripheral.
        id: String,
        /// UUIDs of every discovered service.
        services: Vec<Uuid>,
    },
    /// Characteristic discovery completed for one service.
    CharacteristicsDiscovered {
        /// UUID of the service that was searched.
        service: Uuid,
        /// UUIDs of the characteristics found under it.
        characteristics: Vec<Uuid>,
    },
    /// A characteristic read produced a value.
    CharacteristicValueUpdated {
        /// UUID of the characteristic that was read.
        characteristic: Uuid,
        /// The raw payload.
        value: Vec<u8>,
    },
    /// The adapter's power/authorization state changed.
    AdapterStateChanged {
        /// The new adapter state.
        state: AdapterState,
    },
}

/// The BLE stack as seen by the session manager.
///
/// Implementations must be cheap to share behind an `Arc` and must deliver
/// completion events on the channel returned by [`subscribe`](Self::subscribe)
/// *after* the corresponding imperative call has been observed, so a caller
/// that subscribes before issuing a request never misses its own completion.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Current adapter power/authorization state.
    async fn adapter_state(&self) -> AdapterState;

    /// Start scanning for peripherals. Discoveries arrive as
    /// [`TransportEvent::DeviceDiscovered`].
    async fn start_scan(&self) -> Result<(), TransportError>;

    /// Stop an in-progress scan.
    async fn stop_scan(&self) -> Result<(), TransportError>;

    /// Re-resolve a previously seen peripheral by identifier without
    /// scanning.
    async fn known_device(&self, id: &str) -> Option<DeviceHandle>;

    /// Initiate a connection. Completion arrives as
    /// [`TransportEvent::DeviceConnected`].
    async fn connect(&self, device: &DeviceHandle) -> Result<(), TransportError>;

    /// Tear down the connection to a peripheral.
    async fn disconnect(&self, device: &DeviceHandle) -> Result<(), TransportError>;

    /// Whether the peripheral currently reports a live connection.
    async fn is_connected(&self, device: &DeviceHandle) -> bool;

    /// Request service discovery. Completion arrives as
    /// [`TransportEvent::ServicesDiscovered`].
    async fn discover_services(&self, device: &DeviceHandle) -> Result<(), TransportError>;

    /// Request characteristic discovery for one service. Completion arrives
    /// as [`TransportEvent::CharacteristicsDiscovered`].
    async fn discover_characteristics(
        &self,
        device: &DeviceHandle,
        service: Uuid,
        characteristics: &[Uuid],
    ) -> Result<(), TransportError>;

    /// Request a characteristic read. The value arrives as
    /// [`TransportEvent::CharacteristicValueUpdated`].
    async fn read_characteristic(
        &self,
        device: &DeviceHandle,
        characteristic: Uuid,
    ) -> Result<(), TransportError>;

    /// Write a payload to a characteristic.
    async fn write_characteristic(
        &self,
        device: &DeviceHandle,
        characteristic: Uuid,
        payload: &[u8],
        with_response: bool,
    ) -> Result<(), TransportError>;

    /// Subscribe to the transport's event stream.
    fn subscribe(&self) -> broadcast::Receiver<TransportEvent>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_handle_identity() {
        let a = DeviceHandle::new("aa:bb", "VOLCANO123");
        let b = DeviceHandle::new("aa:bb", "VOLCANO123");
        assert_eq!(a, b);
        assert_eq!(a.id, "aa:bb");
    }

    #[test]
    fn test_transport_event_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<TransportEvent>();
        assert_clone::<DeviceHandle>();
    }

    #[test]
    fn test_adapter_state_default() {
        assert_eq!(AdapterState::default(), AdapterState::Unknown);
    }
}
