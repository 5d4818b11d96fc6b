//! The BLE session manager.
//!
//! [`VolcanoSession`] turns the transport's asynchronous, notification-driven
//! API into a small set of deduplicated, timeout-bounded request/response
//! operations. Every logical operation (device search, connect, discovery,
//! per-characteristic read) is *single-flight*: concurrent callers of the
//! same operation share one in-progress transport request and observe the
//! identical outcome. Writes are deliberately not single-flighted; callers
//! that spam writes (e.g. a temperature slider) are expected to debounce.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::{Mutex, RwLock};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::ble::adapter::BtleplugTransport;
use crate::ble::registry::{CharacteristicRegistry, ServiceRegistry};
use crate::ble::transport::{
    AdapterState, DeviceHandle, Transport, TransportError, TransportEvent,
};
use crate::ble::uuids::{
    COMMAND_PAYLOAD, CONTROL_CHARACTERISTICS, DEVICE_NAME_MARKER, STATUS_CHARACTERISTICS,
};
use crate::data::{HeatAirState, Temperature};
use crate::error::{Error, Result};
use crate::util::race_with_timeout;

/// Deadline for a single characteristic read.
const READ_TIMEOUT: Duration = Duration::from_secs(3);
/// Deadline for a connect attempt.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);
/// Deadline for a discovery scan.
const SCAN_TIMEOUT: Duration = Duration::from_secs(5);
/// Deadline for service/characteristic discovery.
const DISCOVERY_TIMEOUT: Duration = Duration::from_secs(3);
/// Adapter power-on polls before giving up.
const POWER_ON_ATTEMPTS: u32 = 3;
/// Spacing between adapter power-on polls.
const POWER_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Connection state of a session.
///
/// `Ready` requires a bound device handle and fully resolved service and
/// characteristic registries. Transitions only happen inside the session;
/// callers observe but never mutate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// No device bound.
    #[default]
    Disconnected,
    /// Device bound, connection in progress.
    Connecting,
    /// Connected, resolving services and characteristics.
    Discovering,
    /// Connected with both registries resolved.
    Ready,
    /// The last `discover_and_connect` attempt failed. Only a fresh
    /// `discover_and_connect` call attempts recovery.
    Error(Error),
}

impl ConnectionState {
    /// Check if the session is fully usable.
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    /// Check if in a transitional state.
    pub fn is_transitioning(&self) -> bool {
        matches!(self, Self::Connecting | Self::Discovering)
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disconnected => write!(f, "Disconnected"),
            Self::Connecting => write!(f, "Connecting"),
            Self::Discovering => write!(f, "Discovering"),
            Self::Ready => write!(f, "Ready"),
            Self::Error(e) => write!(f, "Error({e})"),
        }
    }
}

/// An in-flight single-flight operation.
type SharedOp<T> = Shared<BoxFuture<'static, T>>;

/// Translate a transport failure into the session error taxonomy.
fn map_transport(e: TransportError) -> Error {
    match e {
        TransportError::PermissionDenied => Error::PermissionDenied,
        TransportError::AdapterUnavailable => Error::Unsupported,
        _ => Error::DeviceNotFound,
    }
}

/// Run `build()` under a single-flight slot: if an operation is already in
/// flight, await and return its outcome instead of starting duplicate work.
/// The slot entry's presence is the lock; it is cleared once the operation
/// settles, regardless of outcome.
async fn single_flight<T, F>(slot: &Mutex<Option<SharedOp<T>>>, build: F) -> T
where
    T: Clone,
    F: FnOnce() -> BoxFuture<'static, T>,
{
    let fut = {
        let mut guard = slot.lock();
        match guard.as_ref() {
            Some(existing) => {
                debug!("Joining in-flight operation");
                existing.clone()
            }
            None => {
                let fut = build().shared();
                *guard = Some(fut.clone());
                fut
            }
        }
    };

    let outcome = fut.clone().await;

    // Clear the slot only if it still holds this operation; a later caller
    // may already have started a fresh one.
    let mut guard = slot.lock();
    if guard.as_ref().map(|f| f.ptr_eq(&fut)).unwrap_or(false) {
        *guard = None;
    }
    outcome
}

/// Session state shared between the public handle, the single-flight
/// operation futures and the disconnect watcher.
struct Inner {
    transport: Arc<dyn Transport>,
    /// The bound peripheral. Survives a transport-reported drop so the next
    /// device search can re-resolve it by identifier without scanning; a
    /// deliberate disconnect clears it.
    device: RwLock<Option<DeviceHandle>>,
    services: RwLock<Option<ServiceRegistry>>,
    characteristics: RwLock<Option<CharacteristicRegistry>>,
    state: RwLock<ConnectionState>,
    state_tx: broadcast::Sender<ConnectionState>,
    search_op: Mutex<Option<SharedOp<Result<DeviceHandle>>>>,
    connect_op: Mutex<Option<SharedOp<Result<()>>>>,
    service_op: Mutex<Option<SharedOp<Vec<Uuid>>>>,
    characteristic_op: Mutex<Option<SharedOp<Vec<Uuid>>>>,
    read_ops: Mutex<HashMap<Uuid, SharedOp<Result<Vec<u8>>>>>,
}

impl Inner {
    /// Update the connection state and emit an event.
    fn set_state(&self, new_state: ConnectionState) {
        let old_state = {
            let mut state = self.state.write();
            let old = *state;
            *state = new_state;
            old
        };

        if old_state != new_state {
            debug!("Connection state changed: {} -> {}", old_state, new_state);
            let _ = self.state_tx.send(new_state);
        }
    }

    /// Tear down everything that depends on a live connection. The device
    /// handle itself is kept for the re-resolve fast path.
    fn invalidate_connection(&self) {
        *self.services.write() = None;
        *self.characteristics.write() = None;
        *self.search_op.lock() = None;
        *self.connect_op.lock() = None;
        *self.service_op.lock() = None;
        *self.characteristic_op.lock() = None;
        self.read_ops.lock().clear();
        self.set_state(ConnectionState::Disconnected);
    }

    /// Transport readiness preflight.
    ///
    /// The adapter's power state can change at any time outside the
    /// session's control, so this runs before every connect, read and write.
    async fn prepare_transport(&self) -> Result<()> {
        match self.transport.adapter_state().await {
            AdapterState::Unsupported => return Err(Error::Unsupported),
            AdapterState::Unauthorized => return Err(Error::PermissionDenied),
            _ => {}
        }

        let mut attempts_left = POWER_ON_ATTEMPTS;
        while self.transport.adapter_state().await != AdapterState::PoweredOn && attempts_left > 0
        {
            tokio::time::sleep(POWER_POLL_INTERVAL).await;
            attempts_left -= 1;
        }

        if self.transport.adapter_state().await == AdapterState::PoweredOn {
            Ok(())
        } else {
            Err(Error::DeviceNotFound)
        }
    }

    /// Device search. Re-resolves a previously bound device by identifier
    /// when possible, otherwise scans for the first peripheral whose
    /// advertised name carries the product marker.
    async fn device_search(inner: Arc<Inner>) -> Result<DeviceHandle> {
        inner.prepare_transport().await?;

        // Bind before the `if let`: a scrutinee temporary would keep the
        // read guard alive across the await below.
        let bound = inner.device.read().clone();
        if let Some(bound) = bound {
            debug!("Re-resolving previously bound device {}", bound.id);
            return inner
                .transport
                .known_device(&bound.id)
                .await
                .ok_or(Error::DeviceNotFound);
        }

        let mut events = inner.transport.subscribe();
        inner.transport.start_scan().await.map_err(map_transport)?;

        let found = race_with_timeout(SCAN_TIMEOUT, async move {
            loop {
                match events.recv().await {
                    Ok(TransportEvent::DeviceDiscovered { device })
                        if device.name.contains(DEVICE_NAME_MARKER) =>
                    {
                        break Some(device)
                    }
                    Ok(_) | Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => break None,
                }
            }
        })
        .await
        .flatten();

        if let Err(e) = inner.transport.stop_scan().await {
            warn!("Failed to stop scan: {}", e);
        }

        found.ok_or(Error::DeviceNotFound)
    }

    /// Connect the bound device, waiting for the transport's confirmation.
    async fn connect_device(inner: Arc<Inner>) -> Result<()> {
        inner.prepare_transport().await?;

        let device = inner.device.read().clone().ok_or(Error::DeviceNotFound)?;
        if inner.transport.is_connected(&device).await {
            return Ok(());
        }

        let mut events = inner.transport.subscribe();
        inner
            .transport
            .connect(&device)
            .await
            .map_err(map_transport)?;

        let connected = race_with_timeout(CONNECT_TIMEOUT, async move {
            loop {
                match events.recv().await {
                    Ok(TransportEvent::DeviceConnected { id }) if id == device.id => break true,
                    Ok(TransportEvent::DeviceDisconnected { id }) if id == device.id => {
                        break false
                    }
                    Ok(_) | Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => break false,
                }
            }
        })
        .await
        .unwrap_or(false);

        if connected {
            Ok(())
        } else {
            Err(Error::DeviceNotFound)
        }
    }

    /// Single-flight wrapper over [`Self::connect_device`].
    async fn connect_if_needed(inner: &Arc<Inner>) -> Result<()> {
        let task_inner = inner.clone();
        single_flight(&inner.connect_op, move || {
            Inner::connect_device(task_inner).boxed()
        })
        .await
    }

    /// Request service discovery and collect the resulting service UUIDs.
    /// Failures surface as an empty list; the registry constructor decides
    /// whether the result is sufficient.
    async fn service_search(inner: Arc<Inner>) -> Vec<Uuid> {
        let Some(device) = inner.device.read().clone() else {
            return Vec::new();
        };
        if inner.prepare_transport().await.is_err()
            || Inner::connect_if_needed(&inner).await.is_err()
        {
            return Vec::new();
        }

        let mut events = inner.transport.subscribe();
        if inner.transport.discover_services(&device).await.is_err() {
            return Vec::new();
        }

        race_with_timeout(DISCOVERY_TIMEOUT, async move {
            loop {
                match events.recv().await {
                    Ok(TransportEvent::ServicesDiscovered { id, services }) if id == device.id => {
                        break services
                    }
                    Ok(TransportEvent::DeviceDisconnected { id }) if id == device.id => {
                        break Vec::new()
                    }
                    Ok(_) | Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => break Vec::new(),
                }
            }
        })
        .await
        .unwrap_or_default()
    }

    /// Request characteristic discovery for both required services and
    /// collect every characteristic UUID reported under them.
    async fn characteristic_search(inner: Arc<Inner>) -> Vec<Uuid> {
        let (Some(device), Some(services)) =
            (inner.device.read().clone(), *inner.services.read())
        else {
            return Vec::new();
        };
        if inner.prepare_transport().await.is_err()
            || Inner::connect_if_needed(&inner).await.is_err()
        {
            return Vec::new();
        }

        let mut events = inner.transport.subscribe();
        for (service, required) in [
            (services.status, &STATUS_CHARACTERISTICS[..]),
            (services.control, &CONTROL_CHARACTERISTICS[..]),
        ] {
            if inner
                .transport
                .discover_characteristics(&device, service, required)
                .await
                .is_err()
            {
                return Vec::new();
            }
        }

        let wanted = [services.status, services.control];
        race_with_timeout(DISCOVERY_TIMEOUT, async move {
            let mut remaining = wanted.to_vec();
            let mut collected = Vec::new();
            while !remaining.is_empty() {
                match events.recv().await {
                    Ok(TransportEvent::CharacteristicsDiscovered {
                        service,
                        characteristics,
                    }) if remaining.contains(&service) => {
                        remaining.retain(|u| *u != service);
                        collected.extend(characteristics);
                    }
                    Ok(TransportEvent::DeviceDisconnected { id }) if id == device.id => {
                        return Vec::new()
                    }
                    Ok(_) | Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => return Vec::new(),
                }
            }
            collected
        })
        .await
        .unwrap_or_default()
    }

    /// One transport-level characteristic read, raced against the read
    /// deadline. A disconnect observed mid-flight resolves the read instead
    /// of letting it hang.
    async fn read_task(inner: Arc<Inner>, characteristic: Uuid) -> Result<Vec<u8>> {
        let device = inner.device.read().clone().ok_or(Error::Disconnected)?;
        inner.prepare_transport().await?;
        Inner::connect_if_needed(&inner).await?;

        let mut events = inner.transport.subscribe();
        inner
            .transport
            .read_characteristic(&device, characteristic)
            .await
            .map_err(map_transport)?;

        race_with_timeout(READ_TIMEOUT, async move {
            loop {
                match events.recv().await {
                    Ok(TransportEvent::CharacteristicValueUpdated {
                        characteristic: uuid,
                        value,
                    }) if uuid == characteristic => break Ok(value),
                    Ok(TransportEvent::DeviceDisconnected { id }) if id == device.id => {
                        break Err(Error::Disconnected)
                    }
                    Ok(_) | Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => break Err(Error::Disconnected),
                }
            }
        })
        .await
        .unwrap_or(Err(Error::DeviceNotFound))
    }

    /// One characteristic write with acknowledgement.
    async fn write_value(inner: &Arc<Inner>, characteristic: Uuid, payload: &[u8]) -> Result<()> {
        let device = inner.device.read().clone().ok_or(Error::Disconnected)?;
        inner.prepare_transport().await?;
        Inner::connect_if_needed(inner).await?;

        inner
            .transport
            .write_characteristic(&device, characteristic, payload, true)
            .await
            .map_err(map_transport)
    }
}

/// Session manager for one Volcano device.
///
/// Owns the device handle and the service/characteristic registries for the
/// duration of a connection, and presents atomic, idempotent-feeling
/// operations over the flaky transport underneath. One target device at a
/// time; wrap in an `Arc` to share across tasks.
pub struct VolcanoSession {
    inner: Arc<Inner>,
    /// Watcher that reacts to transport-reported disconnects.
    watcher: tokio::task::JoinHandle<()>,
}

impl VolcanoSession {
    /// Create a session over an arbitrary transport.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        let (state_tx, _) = broadcast::channel(16);

        let inner = Arc::new(Inner {
            transport,
            device: RwLock::new(None),
            services: RwLock::new(None),
            characteristics: RwLock::new(None),
            state: RwLock::new(ConnectionState::Disconnected),
            state_tx,
            search_op: Mutex::new(None),
            connect_op: Mutex::new(None),
            service_op: Mutex::new(None),
            characteristic_op: Mutex::new(None),
            read_ops: Mutex::new(HashMap::new()),
        });

        let watcher = Self::spawn_disconnect_watcher(inner.clone());

        Self { inner, watcher }
    }

    /// Create a session over the first available system BLE adapter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unsupported`] if the platform has no usable adapter.
    pub async fn with_default_adapter() -> Result<Self> {
        let transport = BtleplugTransport::new().await.map_err(map_transport)?;
        Ok(Self::new(Arc::new(transport)))
    }

    /// Discover, connect, and resolve both registries.
    ///
    /// No-op success when the session is already bound, connected and
    /// resolved. Each inner step is single-flight, so a concurrent call does
    /// not trigger a second scan or connect. Any step's failure records an
    /// [`ConnectionState::Error`] and returns the error; a later call starts
    /// over from the failed stage's prerequisites.
    pub async fn discover_and_connect(&self) -> Result<()> {
        if self.is_connected_and_ready().await {
            debug!("Already connected and ready");
            return Ok(());
        }

        let inner = &self.inner;

        let task_inner = inner.clone();
        let searched = single_flight(&inner.search_op, move || {
            Inner::device_search(task_inner).boxed()
        })
        .await;
        let device = match searched {
            Ok(device) => device,
            Err(e) => return Err(self.fail(e)),
        };

        info!("Bound device {} ({})", device.name, device.id);
        *inner.device.write() = Some(device);
        inner.set_state(ConnectionState::Connecting);

        if let Err(e) = Inner::connect_if_needed(inner).await {
            return Err(self.fail(e));
        }
        inner.set_state(ConnectionState::Discovering);

        let task_inner = inner.clone();
        let services = single_flight(&inner.service_op, move || {
            Inner::service_search(task_inner).boxed()
        })
        .await;
        let Some(service_registry) = ServiceRegistry::from_discovered(&services) else {
            warn!("Required services missing from discovery result");
            return Err(self.fail(Error::DeviceNotFound));
        };
        *inner.services.write() = Some(service_registry);

        let task_inner = inner.clone();
        let characteristics = single_flight(&inner.characteristic_op, move || {
            Inner::characteristic_search(task_inner).boxed()
        })
        .await;
        let Some(characteristic_registry) =
            CharacteristicRegistry::from_discovered(&characteristics)
        else {
            warn!("Required characteristics missing from discovery result");
            return Err(self.fail(Error::DeviceNotFound));
        };
        *inner.characteristics.write() = Some(characteristic_registry);

        inner.set_state(ConnectionState::Ready);
        info!("Session ready");
        Ok(())
    }

    /// Best-effort disconnect. Clears the bound handle, both registries and
    /// all pending reads; never errors.
    pub async fn disconnect_if_needed(&self) {
        let Some(device) = self.inner.device.read().clone() else {
            return;
        };
        if !self.inner.transport.is_connected(&device).await {
            return;
        }

        info!("Disconnecting from {}", device.id);
        *self.inner.device.write() = None;
        *self.inner.services.write() = None;
        *self.inner.characteristics.write() = None;
        self.inner.read_ops.lock().clear();

        if let Err(e) = self.inner.transport.disconnect(&device).await {
            warn!("Disconnect request failed: {}", e);
        }
        self.inner.set_state(ConnectionState::Disconnected);
    }

    /// True iff a device is bound, the transport reports it connected, and
    /// both registries are resolved.
    pub async fn is_connected_and_ready(&self) -> bool {
        let Some(device) = self.inner.device.read().clone() else {
            return false;
        };
        if self.inner.services.read().is_none() || self.inner.characteristics.read().is_none() {
            return false;
        }
        self.inner.transport.is_connected(&device).await
    }

    /// The current connection state.
    pub fn connection_state(&self) -> ConnectionState {
        *self.inner.state.read()
    }

    /// Subscribe to connection state changes.
    pub fn subscribe_state(&self) -> broadcast::Receiver<ConnectionState> {
        self.inner.state_tx.subscribe()
    }

    /// Read the chamber's current temperature.
    pub async fn read_current_temperature(&self) -> Result<Temperature> {
        let chars = self.require_characteristics()?;
        let payload = self.read_value(chars.current_temperature).await?;
        Temperature::from_wire(&payload).ok_or(Error::DeviceNotFound)
    }

    /// Read the configured target temperature.
    pub async fn read_target_temperature(&self) -> Result<Temperature> {
        let chars = self.require_characteristics()?;
        let payload = self.read_value(chars.target_temperature).await?;
        Temperature::from_wire(&payload).ok_or(Error::DeviceNotFound)
    }

    /// Read the heater/air-pump state.
    pub async fn read_heat_air_state(&self) -> Result<HeatAirState> {
        let chars = self.require_characteristics()?;
        let payload = self.read_value(chars.heat_air_enabled).await?;
        Ok(HeatAirState::from_wire(&payload))
    }

    /// Read the firmware version string.
    pub async fn read_firmware_version(&self) -> Result<String> {
        let chars = self.require_characteristics()?;
        self.read_string(chars.firmware_version).await
    }

    /// Read the serial number string.
    pub async fn read_serial_number(&self) -> Result<String> {
        let chars = self.require_characteristics()?;
        self.read_string(chars.serial_number).await
    }

    /// Read the model number string.
    pub async fn read_model_number(&self) -> Result<String> {
        let chars = self.require_characteristics()?;
        self.read_string(chars.model_number).await
    }

    /// Write a new target temperature.
    ///
    /// Degenerates to a no-op when the registry is unresolved; callers are
    /// expected to check readiness first.
    pub async fn write_target_temperature(&self, temperature: Temperature) -> Result<()> {
        let Some(chars) = *self.inner.characteristics.read() else {
            warn!("Target temperature write with no resolved registry; ignoring");
            return Ok(());
        };

        debug!("Writing target temperature {}", temperature);
        Inner::write_value(&self.inner, chars.target_temperature, &temperature.to_wire()).await
    }

    /// Drive the heater and air pump to the requested state.
    ///
    /// Maps the state onto the two independent command characteristics and
    /// issues both writes concurrently; the call returns once both have
    /// completed. Command failures are logged, not returned — the two writes
    /// are not atomic and a partial failure leaves no reliable state to
    /// report. Degenerates to a no-op when the registry is unresolved.
    pub async fn write_heat_air_state(&self, state: HeatAirState) -> Result<()> {
        let Some(chars) = *self.inner.characteristics.read() else {
            warn!("Heat/air write with no resolved registry; ignoring");
            return Ok(());
        };

        let (air_action, heat_action) = match state {
            HeatAirState::AllOff => (chars.stop_air, chars.stop_heat),
            HeatAirState::HeatOn => (chars.stop_air, chars.start_heat),
            HeatAirState::HeatAndAirOn => (chars.start_air, chars.start_heat),
        };

        debug!("Writing heat/air state {}", state);
        let (air, heat) = tokio::join!(
            Inner::write_value(&self.inner, air_action, &COMMAND_PAYLOAD),
            Inner::write_value(&self.inner, heat_action, &COMMAND_PAYLOAD),
        );
        if let Err(e) = air {
            warn!("Air command write failed: {}", e);
        }
        if let Err(e) = heat {
            warn!("Heat command write failed: {}", e);
        }
        Ok(())
    }

    fn require_characteristics(&self) -> Result<CharacteristicRegistry> {
        (*self.inner.characteristics.read()).ok_or(Error::Disconnected)
    }

    /// Single-flight characteristic read keyed by UUID. The map entry's
    /// presence is the lock; it is removed once the read settles.
    async fn read_value(&self, characteristic: Uuid) -> Result<Vec<u8>> {
        let fut = {
            let mut reads = self.inner.read_ops.lock();
            match reads.get(&characteristic) {
                Some(existing) => {
                    debug!("Joining in-flight read of {}", characteristic);
                    existing.clone()
                }
                None => {
                    let fut = Inner::read_task(self.inner.clone(), characteristic)
                        .boxed()
                        .shared();
                    reads.insert(characteristic, fut.clone());
                    fut
                }
            }
        };

        let outcome = fut.clone().await;

        let mut reads = self.inner.read_ops.lock();
        if reads
            .get(&characteristic)
            .map(|f| f.ptr_eq(&fut))
            .unwrap_or(false)
        {
            reads.remove(&characteristic);
        }
        drop(reads);
        outcome
    }

    async fn read_string(&self, characteristic: Uuid) -> Result<String> {
        let payload = self.read_value(characteristic).await?;
        Ok(String::from_utf8_lossy(&payload).into_owned())
    }

    /// Record a persistent error state and hand the error back.
    fn fail(&self, e: Error) -> Error {
        self.inner.set_state(ConnectionState::Error(e));
        e
    }

    /// Watch the transport for disconnects of the bound device and
    /// invalidate the session when one arrives. In-flight operations observe
    /// the same event through their own subscriptions and resolve to a
    /// failure rather than hanging.
    fn spawn_disconnect_watcher(inner: Arc<Inner>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut events = inner.transport.subscribe();
            loop {
                match events.recv().await {
                    Ok(TransportEvent::DeviceDisconnected { id }) => {
                        let is_bound = inner
                            .device
                            .read()
                            .as_ref()
                            .map(|d| d.id == id)
                            .unwrap_or(false);
                        if is_bound {
                            info!("Device {} dropped; invalidating session", id);
                            inner.invalidate_connection();
                        }
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(n)) => {
                        warn!("Dropped {} transport events", n);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }
}

impl Drop for VolcanoSession {
    fn drop(&mut self) {
        self.watcher.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_state_queries() {
        assert!(!ConnectionState::Disconnected.is_ready());
        assert!(ConnectionState::Ready.is_ready());
        assert!(ConnectionState::Connecting.is_transitioning());
        assert!(ConnectionState::Discovering.is_transitioning());
        assert!(!ConnectionState::Error(Error::DeviceNotFound).is_transitioning());
    }

    #[test]
    fn test_connection_state_display() {
        assert_eq!(ConnectionState::Ready.to_string(), "Ready");
        assert_eq!(
            ConnectionState::Error(Error::Unsupported).to_string(),
            "Error(Bluetooth is not supported on this platform)"
        );
    }

    #[test]
    fn test_connection_state_default() {
        assert_eq!(ConnectionState::default(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_transport_error_mapping() {
        assert_eq!(
            map_transport(TransportError::PermissionDenied),
            Error::PermissionDenied
        );
        assert_eq!(
            map_transport(TransportError::AdapterUnavailable),
            Error::Unsupported
        );
        assert_eq!(
            map_transport(TransportError::NotConnected),
            Error::DeviceNotFound
        );
        assert_eq!(
            map_transport(TransportError::Backend("x".into())),
            Error::DeviceNotFound
        );
    }
}
