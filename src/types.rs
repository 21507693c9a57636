use crate::hw_def::*;

use core::fmt;

#[cfg(feature="defmt")]
use defmt::Format;

/// Convert a raw temperature word to degrees centigrade
pub fn raw_temp_to_centigrade(raw: u16) -> f32 {
    175.25 * raw as f32 / 65536.0 - 46.85
}

/// Convert a raw temperature word to degrees fahrenheit
pub fn raw_temp_to_fahrenheit(raw: u16) -> f32 {
    centigrade_to_fahrenheit(raw_temp_to_centigrade(raw))
}

/// Convert a raw relative humidity word to percent
pub fn raw_rel_humid_to_percent(raw: u16) -> f32 {
    125.0 * raw as f32 / 65536.0 - 6.0
}

/// Convert degrees centigrade to degrees fahrenheit
pub fn centigrade_to_fahrenheit(centigrade: f32) -> f32 {
    centigrade * 1.8 + 32.0
}

/// Raw (still in u16 format) measurement word from the device, status bits cleared
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RawReading(u16);
impl RawReading {
    /// Compose a reading from the MSB and LSB as received. The two low bits of the LSB are status
    /// bits (a humidity reading always ends in `0b10`) and are cleared here.
    pub fn from_be_bytes(msb: u8, lsb: u8) -> Self {
        Self(u16::from_be_bytes([msb, lsb]) & !MEASUREMENT_STATUS_MASK)
    }
    /// Get the raw word
    pub fn raw(&self) -> u16 {
        self.0
    }
    /// Interpret as a temperature, degrees centigrade
    pub fn centigrade(&self) -> f32 {
        raw_temp_to_centigrade(self.0)
    }
    /// Interpret as a temperature, degrees fahrenheit
    pub fn fahrenheit(&self) -> f32 {
        raw_temp_to_fahrenheit(self.0)
    }
    /// Interpret as relative humidity in percent
    pub fn humidity_percent(&self) -> f32 {
        raw_rel_humid_to_percent(self.0)
    }
}

/// RH/T user register 1
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct UserRegister {
    raw: u8,
    /// measurement resolution (RES1, RES0)
    pub resolution: Resolution,
    /// supply voltage is below the operating threshold (VDDS)
    pub vdd_low: bool,
    /// on-chip heater is enabled (HTRE)
    pub heater_enabled: bool,
}
impl From<u8> for UserRegister {
    fn from(raw: u8) -> Self {
        Self {
            raw,
            resolution: Resolution::from_user_register(raw),
            vdd_low: raw & USER_REG_MASK_VDDS != 0,
            heater_enabled: raw & USER_REG_MASK_HTRE != 0,
        }
    }
}
impl UserRegister {
    /// Get the raw register value
    pub fn raw(&self) -> u8 {
        self.raw
    }
}
impl fmt::Display for UserRegister {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserRegister {{ 0x{:02x}; {:?} ", self.raw, self.resolution)?;
        if self.vdd_low {
            write!(f, "vdd_low ")?;
        }
        if self.heater_enabled {
            write!(f, "heater_enabled ")?;
        }
        write!(f, "}}")
    }
}

/// Heater control register
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct HeaterRegister(pub u8);
impl HeaterRegister {
    /// Heater current setting, 0 (3.09 mA) to 15 (94.2 mA)
    pub fn power(&self) -> u8 {
        self.0 & HEATER_REG_MASK_POWER
    }
}
impl fmt::Display for HeaterRegister {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HeaterRegister {{ 0x{:02x}; power {} }}", self.0, self.power())
    }
}

/// 64-bit electronic ID of the device
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SerialNumber(pub u64);
impl SerialNumber {
    /// Shift the data bytes of one electronic ID response into the accumulator.
    ///
    /// The response alternates data and checksum bytes; checksums are dropped unchecked.
    pub(crate) fn accumulate(&mut self, response: &[u8]) {
        for pair in response.chunks_exact(2) {
            self.0 = (self.0 << 8) | pair[0] as u64;
        }
    }
}
impl fmt::Display for SerialNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016X}", self.0)
    }
}

/// Firmware revision as reported by the device
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FirmwareVersion {
    /// Firmware 1.0
    V1_0,
    /// Firmware 2.0
    V2_0,
    /// Unknown encoding
    Other(u8),
}
impl From<u8> for FirmwareVersion {
    fn from(raw: u8) -> Self {
        match raw {
            FIRMWARE_REVISION_1_0 => FirmwareVersion::V1_0,
            FIRMWARE_REVISION_2_0 => FirmwareVersion::V2_0,
            _ => FirmwareVersion::Other(raw),
        }
    }
}
impl From<FirmwareVersion> for u8 {
    fn from(version: FirmwareVersion) -> u8 {
        match version {
            FirmwareVersion::V1_0 => FIRMWARE_REVISION_1_0,
            FirmwareVersion::V2_0 => FIRMWARE_REVISION_2_0,
            FirmwareVersion::Other(raw) => raw,
        }
    }
}
impl fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let raw: u8 = (*self).into();
        match self {
            FirmwareVersion::V1_0 => write!(f, "1.0 (0x{raw:02X})"),
            FirmwareVersion::V2_0 => write!(f, "2.0 (0x{raw:02X})"),
            FirmwareVersion::Other(_) => write!(f, "Unknown (0x{raw:02X})"),
        }
    }
}
