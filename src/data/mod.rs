//! Domain values and their wire codecs.
//!
//! Pure, stateless conversions between raw GATT payloads and the values the
//! rest of the crate works with.

pub mod heat_air;
pub mod temperature;

pub use heat_air::HeatAirState;
pub use temperature::Temperature;
