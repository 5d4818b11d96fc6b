//! Service and characteristic registries.
//!
//! Both registries are resolved once per connection and validated as a unit:
//! partial discovery counts as total failure for readiness purposes. They
//! carry the UUIDs the session needs, not transport objects, so they stay
//! plain data.

use uuid::Uuid;

use crate::ble::uuids::*;

/// The two required GATT services, resolved from a discovery result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceRegistry {
    /// The status service (device info plus the heat/air flag register).
    pub status: Uuid,
    /// The control service (temperatures and command characteristics).
    pub control: Uuid,
}

impl ServiceRegistry {
    /// Build the registry from the list of discovered service UUIDs.
    ///
    /// Returns `None` unless both required services were observed. Extra
    /// services are ignored.
    pub fn from_discovered(services: &[Uuid]) -> Option<Self> {
        let status = services.iter().find(|u| **u == STATUS_SERVICE_UUID)?;
        let control = services.iter().find(|u| **u == CONTROL_SERVICE_UUID)?;
        Some(Self {
            status: *status,
            control: *control,
        })
    }
}

/// The ten required characteristics, resolved from a discovery result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharacteristicRegistry {
    /// Firmware version (UTF-8 string).
    pub firmware_version: Uuid,
    /// Serial number (UTF-8 string).
    pub serial_number: Uuid,
    /// Model number (UTF-8 string).
    pub model_number: Uuid,
    /// Current temperature (4-byte LE tenths of °C).
    pub current_temperature: Uuid,
    /// Target temperature (4-byte LE tenths of °C).
    pub target_temperature: Uuid,
    /// Heat/air enabled flag register (2-byte status payload).
    pub heat_air_enabled: Uuid,
    /// Start-heat command.
    pub start_heat: Uuid,
    /// Stop-heat command.
    pub stop_heat: Uuid,
    /// Start-air command.
    pub start_air: Uuid,
    /// Stop-air command.
    pub stop_air: Uuid,
}

impl CharacteristicRegistry {
    /// Build the registry from the list of discovered characteristic UUIDs.
    ///
    /// Returns `None` unless all ten required characteristics were observed.
    /// Extra characteristics are ignored.
    pub fn from_discovered(characteristics: &[Uuid]) -> Option<Self> {
        let find = |uuid: Uuid| characteristics.contains(&uuid).then_some(uuid);
        Some(Self {
            firmware_version: find(FIRMWARE_VERSION_UUID)?,
            serial_number: find(SERIAL_NUMBER_UUID)?,
            model_number: find(MODEL_NUMBER_UUID)?,
            current_temperature: find(CURRENT_TEMPERATURE_UUID)?,
            target_temperature: find(TARGET_TEMPERATURE_UUID)?,
            heat_air_enabled: find(HEAT_AIR_ENABLED_UUID)?,
            start_heat: find(START_HEAT_UUID)?,
            stop_heat: find(STOP_HEAT_UUID)?,
            start_air: find(START_AIR_UUID)?,
            stop_air: find(STOP_AIR_UUID)?,
        })
    }
}
