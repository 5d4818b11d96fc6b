//! btleplug-backed transport.
//!
//! Bridges the btleplug central/peripheral API onto the [`Transport`]
//! contract: imperative calls go straight to the adapter, and a spawned
//! bridge task folds [`CentralEvent`]s into the typed event channel the
//! session awaits on.

use btleplug::api::{
    Central, CentralEvent, CentralState, Characteristic, Manager as _, Peripheral as _,
    ScanFilter, WriteType,
};
use btleplug::platform::{Adapter, Manager, Peripheral};
use futures::stream::StreamExt;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, error, info, trace};
use uuid::Uuid;

use crate::ble::transport::{
    AdapterState, DeviceHandle, Transport, TransportError, TransportEvent,
};

impl From<btleplug::Error> for TransportError {
    fn from(e: btleplug::Error) -> Self {
        match e {
            btleplug::Error::PermissionDenied => Self::PermissionDenied,
            btleplug::Error::NotConnected => Self::NotConnected,
            other => Self::Backend(other.to_string()),
        }
    }
}

/// Production [`Transport`] over the platform BLE stack.
pub struct BtleplugTransport {
    /// The BLE adapter used for every imperative call.
    adapter: Adapter,
    /// Channel for transport events.
    event_tx: broadcast::Sender<TransportEvent>,
    /// Peripherals seen so far, by stringified identifier.
    peripherals: Arc<RwLock<HashMap<String, Peripheral>>>,
    /// Last adapter power state reported by the platform.
    ///
    /// btleplug only reports power transitions as events, so the state is
    /// assumed powered-on until the platform says otherwise.
    adapter_state: Arc<RwLock<AdapterState>>,
    /// Handle to the event bridge task.
    bridge_handle: Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl BtleplugTransport {
    /// Create a transport on the first available BLE adapter.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform has no usable adapter.
    pub async fn new() -> Result<Self, TransportError> {
        let manager = Manager::new()
            .await
            .map_err(|_| TransportError::AdapterUnavailable)?;

        let adapters = manager.adapters().await.map_err(TransportError::from)?;
        let adapter = adapters
            .into_iter()
            .next()
            .ok_or(TransportError::AdapterUnavailable)?;

        info!(
            "Using Bluetooth adapter: {:?}",
            adapter.adapter_info().await.ok()
        );

        Ok(Self::with_adapter(adapter))
    }

    /// Create a transport on a specific adapter.
    pub fn with_adapter(adapter: Adapter) -> Self {
        let (event_tx, _) = broadcast::channel(64);

        let transport = Self {
            adapter,
            event_tx,
            peripherals: Arc::new(RwLock::new(HashMap::new())),
            adapter_state: Arc::new(RwLock::new(AdapterState::PoweredOn)),
            bridge_handle: Mutex::new(None),
        };
        transport.spawn_event_bridge();
        transport
    }

    /// Spawn the task that translates btleplug central events into
    /// [`TransportEvent`]s.
    fn spawn_event_bridge(&self) {
        let adapter = self.adapter.clone();
        let peripherals = self.peripherals.clone();
        let adapter_state = self.adapter_state.clone();
        let event_tx = self.event_tx.clone();

        let handle = tokio::spawn(async move {
            let mut events = match adapter.events().await {
                Ok(events) => events,
                Err(e) => {
                    error!("Failed to get adapter events: {}", e);
                    return;
                }
            };

            while let Some(event) = events.next().await {
                match event {
                    CentralEvent::DeviceDiscovered(id) | CentralEvent::DeviceUpdated(id) => {
                        let Ok(peripheral) = adapter.peripheral(&id).await else {
                            continue;
                        };
                        let name = match peripheral.properties().await {
                            Ok(Some(props)) => props.local_name.unwrap_or_default(),
                            _ => String::new(),
                        };

                        let handle = DeviceHandle::new(id.to_string(), name);
                        trace!("Discovered peripheral {} ({})", handle.id, handle.name);
                        peripherals.write().insert(handle.id.clone(), peripheral);
                        let _ = event_tx.send(TransportEvent::DeviceDiscovered { device: handle });
                    }
                    CentralEvent::DeviceConnected(id) => {
                        debug!("Peripheral connected: {}", id);
                        let _ = event_tx.send(TransportEvent::DeviceConnected {
                            id: id.to_string(),
                        });
                    }
                    CentralEvent::DeviceDisconnected(id) => {
                        debug!("Peripheral disconnected: {}", id);
                        let _ = event_tx.send(TransportEvent::DeviceDisconnected {
                            id: id.to_string(),
                        });
                    }
                    CentralEvent::StateUpdate(state) => {
                        let mapped = match state {
                            CentralState::PoweredOn => AdapterState::PoweredOn,
                            CentralState::PoweredOff => AdapterState::PoweredOff,
                            CentralState::Unknown => AdapterState::Unknown,
                        };
                        debug!("Adapter state changed: {:?}", mapped);
                        *adapter_state.write() = mapped;
                        let _ = event_tx.send(TransportEvent::AdapterStateChanged { state: mapped });
                    }
                    CentralEvent::ManufacturerDataAdvertisement { .. }
                    | CentralEvent::ServiceDataAdvertisement { .. }
                    | CentralEvent::ServicesAdvertisement { .. } => {}
                }
            }

            debug!("Event bridge ended");
        });

        *self.bridge_handle.lock() = Some(handle);
    }

    /// Look up a peripheral by stringified identifier.
    async fn resolve(&self, id: &str) -> Result<Peripheral, TransportError> {
        if let Some(p) = self.peripherals.read().get(id).cloned() {
            return Ok(p);
        }

        // Fall back to the adapter's own list; covers peripherals the OS
        // remembers from a previous run.
        let peripherals = self.adapter.peripherals().await.map_err(TransportError::from)?;
        for p in peripherals {
            if p.id().to_string() == id {
                self.peripherals.write().insert(id.to_string(), p.clone());
                return Ok(p);
            }
        }

        Err(TransportError::NotConnected)
    }

    fn find_characteristic(
        peripheral: &Peripheral,
        uuid: Uuid,
    ) -> Result<Characteristic, TransportError> {
        peripheral
            .characteristics()
            .into_iter()
            .find(|c| c.uuid == uuid)
            .ok_or(TransportError::CharacteristicNotFound { uuid })
    }
}

#[async_trait::async_trait]
impl Transport for BtleplugTransport {
    async fn adapter_state(&self) -> AdapterState {
        *self.adapter_state.read()
    }

    async fn start_scan(&self) -> Result<(), TransportError> {
        debug!("Starting BLE scan");
        self.adapter
            .start_scan(ScanFilter::default())
            .await
            .map_err(TransportError::from)
    }

    async fn stop_scan(&self) -> Result<(), TransportError> {
        debug!("Stopping BLE scan");
        self.adapter.stop_scan().await.map_err(TransportError::from)
    }

    async fn known_device(&self, id: &str) -> Option<DeviceHandle> {
        let peripheral = self.resolve(id).await.ok()?;
        let name = match peripheral.properties().await {
            Ok(Some(props)) => props.local_name.unwrap_or_default(),
            _ => String::new(),
        };
        Some(DeviceHandle::new(id, name))
    }

    async fn connect(&self, device: &DeviceHandle) -> Result<(), TransportError> {
        let peripheral = self.resolve(&device.id).await?;
        info!("Connecting to {} ({})", device.name, device.id);
        peripheral.connect().await.map_err(TransportError::from)
    }

    async fn disconnect(&self, device: &DeviceHandle) -> Result<(), TransportError> {
        let peripheral = self.resolve(&device.id).await?;
        info!("Disconnecting from {}", device.id);
        peripheral.disconnect().await.map_err(TransportError::from)
    }

    async fn is_connected(&self, device: &DeviceHandle) -> bool {
        match self.resolve(&device.id).await {
            Ok(p) => p.is_connected().await.unwrap_or(false),
            Err(_) => false,
        }
    }

    async fn discover_services(&self, device: &DeviceHandle) -> Result<(), TransportError> {
        let peripheral = self.resolve(&device.id).await?;
        peripheral
            .discover_services()
            .await
            .map_err(TransportError::from)?;

        let services: Vec<Uuid> = peripheral.services().iter().map(|s| s.uuid).collect();
        debug!("Discovered {} services on {}", services.len(), device.id);
        let _ = self.event_tx.send(TransportEvent::ServicesDiscovered {
            id: device.id.clone(),
            services,
        });
        Ok(())
    }

    async fn discover_characteristics(
        &self,
        device: &DeviceHandle,
        service: Uuid,
        characteristics: &[Uuid],
    ) -> Result<(), TransportError> {
        let peripheral = self.resolve(&device.id).await?;

        // btleplug resolves all characteristics during service discovery;
        // filter the cached set down to the requested ones.
        let found: Vec<Uuid> = peripheral
            .services()
            .iter()
            .filter(|s| s.uuid == service)
            .flat_map(|s| s.characteristics.iter().map(|c| c.uuid))
            .filter(|uuid| characteristics.is_empty() || characteristics.contains(uuid))
            .collect();

        debug!(
            "Discovered {} characteristics under service {}",
            found.len(),
            service
        );
        let _ = self
            .event_tx
            .send(TransportEvent::CharacteristicsDiscovered {
                service,
                characteristics: found,
            });
        Ok(())
    }

    async fn read_characteristic(
        &self,
        device: &DeviceHandle,
        characteristic: Uuid,
    ) -> Result<(), TransportError> {
        let peripheral = self.resolve(&device.id).await?;
        let target = Self::find_characteristic(&peripheral, characteristic)?;

        let value = peripheral.read(&target).await.map_err(TransportError::from)?;
        trace!("Read {} bytes from {}", value.len(), characteristic);

        let _ = self
            .event_tx
            .send(TransportEvent::CharacteristicValueUpdated {
                characteristic,
                value,
            });
        Ok(())
    }

    async fn write_characteristic(
        &self,
        device: &DeviceHandle,
        characteristic: Uuid,
        payload: &[u8],
        with_response: bool,
    ) -> Result<(), TransportError> {
        let peripheral = self.resolve(&device.id).await?;
        let target = Self::find_characteristic(&peripheral, characteristic)?;

        let write_type = if with_response {
            WriteType::WithResponse
        } else {
            WriteType::WithoutResponse
        };

        peripheral
            .write(&target, payload, write_type)
            .await
            .map_err(TransportError::from)?;
        trace!("Wrote {} bytes to {}", payload.len(), characteristic);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<TransportEvent> {
        self.event_tx.subscribe()
    }
}

impl Drop for BtleplugTransport {
    fn drop(&mut self) {
        if let Some(handle) = self.bridge_handle.lock().take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_btleplug_error_mapping() {
        assert!(matches!(
            TransportError::from(btleplug::Error::PermissionDenied),
            TransportError::PermissionDenied
        ));
        assert!(matches!(
            TransportError::from(btleplug::Error::NotConnected),
            TransportError::NotConnected
        ));
        assert!(matches!(
            TransportError::from(btleplug::Error::RuntimeError("x".into())),
            TransportError::Backend(_)
        ));
    }
}
