//! Temperature domain value and wire codec.
//!
//! The Volcano reports temperatures as a signed little-endian 32-bit integer
//! scaled by ten (tenths of a degree Celsius). The same unit is kept
//! internally so repeated conversions never accumulate rounding error.

use std::ops::{Add, AddAssign, Sub, SubAssign};

use crate::util::{celsius_to_fahrenheit, fahrenheit_to_celsius};

/// Number of bytes in the temperature wire encoding.
pub const TEMPERATURE_WIRE_LEN: usize = 4;

/// A temperature, stored as an integer number of tenths of a degree Celsius.
///
/// Equality, ordering and arithmetic all operate on the internal unit, so
/// `Temperature::from_celsius(40) + Temperature::from_tenths(5)` is exactly
/// 40.5 °C with no float involved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Temperature(i32);

impl Temperature {
    /// Zero degrees Celsius.
    pub const ZERO: Self = Self(0);

    /// Create a temperature from tenths of a degree Celsius.
    pub const fn from_tenths(tenths: i32) -> Self {
        Self(tenths)
    }

    /// Create a temperature from whole degrees Celsius.
    pub const fn from_celsius(celsius: i32) -> Self {
        Self(celsius * 10)
    }

    /// Create a temperature from whole degrees Fahrenheit.
    pub fn from_fahrenheit(fahrenheit: i32) -> Self {
        let celsius = fahrenheit_to_celsius(f64::from(fahrenheit));
        Self((celsius * 10.0).round() as i32)
    }

    /// The internal value in tenths of a degree Celsius.
    pub const fn tenths(self) -> i32 {
        self.0
    }

    /// The value in degrees Celsius.
    pub fn as_celsius(self) -> f64 {
        f64::from(self.0) / 10.0
    }

    /// The value in whole degrees Fahrenheit, rounded half away from zero.
    pub fn as_fahrenheit(self) -> i32 {
        celsius_to_fahrenheit(self.as_celsius()).round() as i32
    }

    /// Decode a temperature from its 4-byte little-endian wire form.
    ///
    /// Returns `None` unless the payload is exactly [`TEMPERATURE_WIRE_LEN`]
    /// bytes.
    pub fn from_wire(payload: &[u8]) -> Option<Self> {
        let bytes: [u8; TEMPERATURE_WIRE_LEN] = payload.try_into().ok()?;
        Some(Self(i32::from_le_bytes(bytes)))
    }

    /// Encode the temperature into its 4-byte little-endian wire form.
    pub fn to_wire(self) -> [u8; TEMPERATURE_WIRE_LEN] {
        self.0.to_le_bytes()
    }
}

impl Add for Temperature {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Temperature {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Temperature {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Temperature {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl std::fmt::Display for Temperature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1}°C", self.as_celsius())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_wire_decode() {
        // 185.0 °C = 1850 tenths = 0x073A
        assert_eq!(
            Temperature::from_wire(&[0x3A, 0x07, 0x00, 0x00]),
            Some(Temperature::from_tenths(1850))
        );
        // Negative values survive the signed decode.
        assert_eq!(
            Temperature::from_wire(&(-5i32).to_le_bytes()),
            Some(Temperature::from_tenths(-5))
        );
    }

    #[test]
    fn test_wire_decode_rejects_bad_length() {
        assert_eq!(Temperature::from_wire(&[]), None);
        assert_eq!(Temperature::from_wire(&[0x01, 0x02]), None);
        assert_eq!(Temperature::from_wire(&[0; 5]), None);
    }

    #[test]
    fn test_fahrenheit_anchors() {
        assert_eq!(Temperature::from_fahrenheit(32), Temperature::from_celsius(0));
        assert_eq!(
            Temperature::from_fahrenheit(212),
            Temperature::from_celsius(100)
        );
        assert_eq!(Temperature::from_celsius(0).as_fahrenheit(), 32);
        assert_eq!(Temperature::from_celsius(100).as_fahrenheit(), 212);
    }

    #[test]
    fn test_fahrenheit_rounds_half_away_from_zero() {
        // 40.5 °C = 104.9 °F -> 105
        assert_eq!(Temperature::from_tenths(405).as_fahrenheit(), 105);
        // 0.3 °C = 32.54 °F -> 33
        assert_eq!(Temperature::from_tenths(3).as_fahrenheit(), 33);
        // -0.3 °C = 31.46 °F -> 31
        assert_eq!(Temperature::from_tenths(-3).as_fahrenheit(), 31);
    }

    #[test]
    fn test_arithmetic_on_internal_unit() {
        let mut t = Temperature::from_celsius(180);
        t += Temperature::from_tenths(5);
        assert_eq!(t.tenths(), 1805);
        t -= Temperature::from_celsius(1);
        assert_eq!(t.tenths(), 1795);
        assert!(Temperature::from_celsius(180) < t);
    }

    #[test]
    fn test_display() {
        assert_eq!(Temperature::from_tenths(1850).to_string(), "185.0°C");
    }

    proptest! {
        #[test]
        fn prop_wire_round_trip(tenths in any::<i32>()) {
            let t = Temperature::from_tenths(tenths);
            prop_assert_eq!(Temperature::from_wire(&t.to_wire()), Some(t));
        }

        #[test]
        fn prop_fahrenheit_round_trip_is_stable(celsius in -200i32..400) {
            // One conversion each way lands within a degree; a second pass
            // through the same path must not drift further.
            let t = Temperature::from_celsius(celsius);
            let once = Temperature::from_fahrenheit(t.as_fahrenheit());
            let twice = Temperature::from_fahrenheit(once.as_fahrenheit());
            prop_assert!((once.tenths() - t.tenths()).abs() <= 10);
            prop_assert!((twice.tenths() - once.tenths()).abs() <= 1);
        }
    }
}
