// Allow holding locks across await points - we use parking_lot which is designed for this
#![allow(clippy::await_holding_lock)]
// Allow unusual byte groupings for UUIDs which have standard format
#![allow(clippy::unusual_byte_groupings)]

//! # volcano-ble
//!
//! A cross-platform Rust library for controlling Storz & Bickel Volcano
//! vaporizers via Bluetooth Low Energy.
//!
//! The library wraps the device's GATT interface in a session manager with
//! predictable semantics: every operation is deadline-bounded, concurrent
//! identical requests are collapsed into one transport exchange, and a
//! dropped connection resolves outstanding work with a typed error instead
//! of hanging.
//!
//! ## Features
//!
//! - **Device Discovery**: Find a nearby Volcano by its advertised name
//! - **Connection Management**: Connect, resolve services/characteristics,
//!   and recover from drops with an identifier-based fast path
//! - **Temperature Control**: Read the chamber temperature and read/write
//!   the target temperature
//! - **Heater & Air Pump**: Read and drive the combined heat/air state
//! - **Device Info**: Firmware version, serial number and model strings
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use volcano_ble::{HeatAirState, Result, Temperature, VolcanoSession};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let session = VolcanoSession::with_default_adapter().await?;
//!     session.discover_and_connect().await?;
//!
//!     let current = session.read_current_temperature().await?;
//!     println!("Chamber: {}", current);
//!
//!     session
//!         .write_target_temperature(Temperature::from_celsius(185))
//!         .await?;
//!     session.write_heat_air_state(HeatAirState::HeatOn).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Platform Notes
//!
//! ### macOS
//! Requires Bluetooth permission. Add `NSBluetoothAlwaysUsageDescription`
//! to your Info.plist for bundled apps.
//!
//! ### Linux
//! Requires BlueZ. User may need to be in the `bluetooth` group.
//!
//! ### Windows
//! Requires Windows 10 or later with Bluetooth LE support.
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization/deserialization for data types

// Public modules
pub mod ble;
pub mod data;
pub mod error;
pub mod session;
pub mod util;

// Re-exports for convenience
pub use error::{Error, Result};
pub use session::{ConnectionState, VolcanoSession};
pub use util::{celsius_to_fahrenheit, fahrenheit_to_celsius};

// Re-export commonly used types from submodules
pub use ble::adapter::BtleplugTransport;
pub use ble::transport::{AdapterState, DeviceHandle, Transport, TransportError, TransportEvent};
pub use data::{HeatAirState, Temperature};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_exports() {
        // Verify that key types are exported
        let _ = std::any::TypeId::of::<VolcanoSession>();
        let _ = std::any::TypeId::of::<ConnectionState>();
        let _ = std::any::TypeId::of::<Error>();
        let _ = std::any::TypeId::of::<Temperature>();
        let _ = std::any::TypeId::of::<HeatAirState>();
        let _ = std::any::TypeId::of::<DeviceHandle>();
    }

    #[test]
    fn test_temperature_conversion() {
        assert!((celsius_to_fahrenheit(100.0) - 212.0).abs() < 0.001);
        assert!((fahrenheit_to_celsius(212.0) - 100.0).abs() < 0.001);
    }
}
