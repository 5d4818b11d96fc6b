//! Heater and air pump state.
//!
//! The device reports heat and air as two independent flags packed into one
//! status payload, but drives them through four separate command
//! characteristics. This module only covers the value itself; the session
//! maps a state change onto the command writes.

/// Value of byte 0 in the status payload when the heater is on.
pub const HEAT_ON_SENTINEL: u8 = 0x23;

/// Value of the top nibble of byte 1 in the status payload when the air pump
/// is on.
pub const AIR_ON_SENTINEL: u8 = 0x03;

/// Combined heater / air pump state.
///
/// Air-without-heat is not representable: the firmware never reports the pump
/// running with the heater off, so that flag combination collapses to
/// [`AllOff`](Self::AllOff) on decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HeatAirState {
    /// Heater and air pump both off.
    #[default]
    AllOff,
    /// Heater on, air pump off.
    HeatOn,
    /// Heater and air pump both on.
    HeatAndAirOn,
}

impl HeatAirState {
    /// Decode the state from a device status payload.
    ///
    /// Payloads shorter than two bytes decode to [`AllOff`](Self::AllOff);
    /// this is the one codec operation defined as total rather than partial.
    pub fn from_wire(payload: &[u8]) -> Self {
        if payload.len() < 2 {
            return Self::AllOff;
        }

        let heat = payload[0] == HEAT_ON_SENTINEL;
        let air = payload[1] >> 4 == AIR_ON_SENTINEL;

        Self::from_flags(heat, air)
    }

    /// Build the state from the two independent device flags.
    pub fn from_flags(heat: bool, air: bool) -> Self {
        match (heat, air) {
            (true, true) => Self::HeatAndAirOn,
            (true, false) => Self::HeatOn,
            (false, _) => Self::AllOff,
        }
    }

    /// Whether the heater is on in this state.
    pub fn is_heat_on(self) -> bool {
        matches!(self, Self::HeatOn | Self::HeatAndAirOn)
    }

    /// Whether the air pump is on in this state.
    pub fn is_air_on(self) -> bool {
        matches!(self, Self::HeatAndAirOn)
    }
}

impl std::fmt::Display for HeatAirState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AllOff => write!(f, "off"),
            Self::HeatOn => write!(f, "heat"),
            Self::HeatAndAirOn => write!(f, "heat+air"),
        }
    }
}
