//! BLE Service and Characteristic UUIDs.
//!
//! All identifiers live in the vendor's custom UUID space (the shared suffix
//! spells out the manufacturer) and must match the device firmware
//! bit-exactly.

use uuid::Uuid;

/// Substring of the advertised name that marks a peripheral as a Volcano.
pub const DEVICE_NAME_MARKER: &str = "VOLCANO";

/// One-byte payload written to the start/stop command characteristics.
pub const COMMAND_PAYLOAD: [u8; 1] = [0x01];

// Status service (firmware/serial/model plus the heat/air flag register)
/// Volcano status service UUID.
pub const STATUS_SERVICE_UUID: Uuid = Uuid::from_u128(0x10100000_5354_4f52_5a26_4249434b454c);
/// Firmware version characteristic UUID.
pub const FIRMWARE_VERSION_UUID: Uuid = Uuid::from_u128(0x10100005_5354_4f52_5a26_4249434b454c);
/// Model number characteristic UUID.
pub const MODEL_NUMBER_UUID: Uuid = Uuid::from_u128(0x10100007_5354_4f52_5a26_4249434b454c);
/// Serial number characteristic UUID.
pub const SERIAL_NUMBER_UUID: Uuid = Uuid::from_u128(0x10100008_5354_4f52_5a26_4249434b454c);
/// Heat/air enabled flag characteristic UUID (the 2-byte status register).
pub const HEAT_AIR_ENABLED_UUID: Uuid = Uuid::from_u128(0x1010000c_5354_4f52_5a26_4249434b454c);

// Control service (temperatures and the four command characteristics)
/// Volcano control service UUID.
pub const CONTROL_SERVICE_UUID: Uuid = Uuid::from_u128(0x10110000_5354_4f52_5a26_4249434b454c);
/// Current temperature characteristic UUID.
pub const CURRENT_TEMPERATURE_UUID: Uuid =
    Uuid::from_u128(0x10110001_5354_4f52_5a26_4249434b454c);
/// Target temperature characteristic UUID.
pub const TARGET_TEMPERATURE_UUID: Uuid = Uuid::from_u128(0x10110003_5354_4f52_5a26_4249434b454c);
/// Start-heat command characteristic UUID.
pub const START_HEAT_UUID: Uuid = Uuid::from_u128(0x1011000f_5354_4f52_5a26_4249434b454c);
/// Stop-heat command characteristic UUID.
pub const STOP_HEAT_UUID: Uuid = Uuid::from_u128(0x10110010_5354_4f52_5a26_4249434b454c);
/// Start-air command characteristic UUID.
pub const START_AIR_UUID: Uuid = Uuid::from_u128(0x10110013_5354_4f52_5a26_4249434b454c);
/// Stop-air command characteristic UUID.
pub const STOP_AIR_UUID: Uuid = Uuid::from_u128(0x10110014_5354_4f52_5a26_4249434b454c);

/// The two required service UUIDs.
pub const REQUIRED_SERVICES: [Uuid; 2] = [STATUS_SERVICE_UUID, CONTROL_SERVICE_UUID];

/// Required characteristics scoped to the status service.
pub const STATUS_CHARACTERISTICS: [Uuid; 4] = [
    FIRMWARE_VERSION_UUID,
    SERIAL_NUMBER_UUID,
    MODEL_NUMBER_UUID,
    HEAT_AIR_ENABLED_UUID,
];

/// Required characteristics scoped to the control service.
pub const CONTROL_CHARACTERISTICS: [Uuid; 6] = [
    CURRENT_TEMPERATURE_UUID,
    TARGET_TEMPERATURE_UUID,
    START_AIR_UUID,
    STOP_AIR_UUID,
    START_HEAT_UUID,
    STOP_HEAT_UUID,
];

/// Check if a service UUID is one of the two required Volcano services.
pub fn is_volcano_service(uuid: &Uuid) -> bool {
    REQUIRED_SERVICES.contains(uuid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uuid_format() {
        let status = STATUS_SERVICE_UUID.to_string();
        assert!(status.starts_with("10100000"));
        assert!(status.ends_with("4249434b454c"));

        let control = CONTROL_SERVICE_UUID.to_string();
        assert!(control.starts_with("10110000"));
    }

    #[test]
    fn test_characteristics_are_scoped_to_their_service() {
        // The UUID prefix encodes the owning service.
        for uuid in STATUS_CHARACTERISTICS {
            assert!(uuid.to_string().starts_with("1010"));
        }
        for uuid in CONTROL_CHARACTERISTICS {
            assert!(uuid.to_string().starts_with("1011"));
        }
    }

    #[test]
    fn test_is_volcano_service() {
        assert!(is_volcano_service(&STATUS_SERVICE_UUID));
        assert!(is_volcano_service(&CONTROL_SERVICE_UUID));
        assert!(!is_volcano_service(&CURRENT_TEMPERATURE_UUID));
    }
}
