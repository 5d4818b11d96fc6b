//! Error types for the volcano-ble crate.

use thiserror::Error;

/// The main error type for this crate.
///
/// Every transport-level failure is translated to one of these variants at
/// the session boundary; callers never see raw btleplug errors. Timeouts are
/// not retried by the library — each call attempt is one shot, and retry
/// policy belongs to the caller.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The device could not be found, or a scan/connect/read/write timed out.
    #[error("device not found or not responding")]
    DeviceNotFound,

    /// Operation requires a resolved device handle and registry but the
    /// session is not connected.
    #[error("not connected to a device")]
    Disconnected,

    /// The platform or adapter lacks BLE capability.
    #[error("Bluetooth is not supported on this platform")]
    Unsupported,

    /// The user or OS denied Bluetooth access.
    #[error("Bluetooth access denied")]
    PermissionDenied,
}

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            Error::DeviceNotFound.to_string(),
            "device not found or not responding"
        );
        assert_eq!(Error::Disconnected.to_string(), "not connected to a device");
    }

    #[test]
    fn test_error_is_copy_and_eq() {
        let e = Error::PermissionDenied;
        let copied = e;
        assert_eq!(e, copied);
        assert_ne!(Error::Unsupported, Error::DeviceNotFound);
    }
}
