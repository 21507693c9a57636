//! Register map, command opcodes and timing of the Si7021 family.

/// 7-bit I²C address of the Si7021 (fixed, not strappable)
pub const SI7021_I2C_ADDR: u8 = 0x40;

/// Settle time after issuing a no-hold measurement command.
///
/// Worst case is a 14-bit humidity conversion followed by the implicit temperature conversion
/// (12 ms + 10.8 ms), so a single duration covers every measurement command.
pub const CONVERSION_SETTLE_MS: u32 = 25;
/// Delay between two read attempts while the device is still converting
pub const POLL_INTERVAL_MS: u32 = 1;
/// Number of read retries after the settle time. Every failed attempt, the last one included, is
/// followed by a poll interval, so a timeout costs `POLL_RETRIES + 1` intervals.
pub const POLL_RETRIES: u8 = 50;
/// Power-up time after a software reset (15 ms max, 5 ms typical)
pub const RESET_SETTLE_MS: u32 = 15;

pub(crate) const USER_REG_FIELD_LSBIT_RES0: u8 = 0;
pub(crate) const USER_REG_FIELD_LSBIT_HTRE: u8 = 2;
pub(crate) const USER_REG_FIELD_LSBIT_VDDS: u8 = 6;
pub(crate) const USER_REG_FIELD_LSBIT_RES1: u8 = 7;

pub(crate) const USER_REG_MASK_RES: u8 = (1 << USER_REG_FIELD_LSBIT_RES1) | (1 << USER_REG_FIELD_LSBIT_RES0);
pub(crate) const USER_REG_MASK_HTRE: u8 = 1 << USER_REG_FIELD_LSBIT_HTRE;
pub(crate) const USER_REG_MASK_VDDS: u8 = 1 << USER_REG_FIELD_LSBIT_VDDS;

pub(crate) const HEATER_REG_MASK_POWER: u8 = 0x0F;

/// Low bits of a measurement LSB that carry status, not data
pub(crate) const MEASUREMENT_STATUS_MASK: u16 = 0x0003;

/// Known firmware revision encodings
pub(crate) const FIRMWARE_REVISION_1_0: u8 = 0xFF;
pub(crate) const FIRMWARE_REVISION_2_0: u8 = 0x20;

/// CRC-8 used by the Si7021 for measurement and electronic ID checksums
#[cfg(feature = "crc")]
pub(crate) const CRC_8_SI7021: crc::Algorithm<u8> = crc::Algorithm {
    width: 8,
    poly: 0x31,
    init: 0x00,
    refin: false,
    refout: false,
    xorout: 0x00,
    check: 0xa2,
    residue: 0x00,
};

/// Device commands
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Command {
    /// Measure relative humidity, hold master (clock stretching)
    MeasureRelHumidHold,
    /// Measure relative humidity, no hold master (poll for completion)
    MeasureRelHumidNoHold,
    /// Measure temperature, hold master (clock stretching)
    MeasureTempHold,
    /// Measure temperature, no hold master (poll for completion)
    MeasureTempNoHold,
    /// Read the temperature taken during the last humidity conversion
    ReadTempFromPreviousRelHumid,
    /// Software reset
    Reset,
    /// Write RH/T user register 1
    WriteUserRegister,
    /// Read RH/T user register 1
    ReadUserRegister,
    /// Write heater control register
    WriteHeaterRegister,
    /// Read heater control register
    ReadHeaterRegister,
    /// Read electronic ID, first access
    ReadSerialPart1,
    /// Read electronic ID, second access
    ReadSerialPart2,
    /// Read firmware revision
    ReadFirmwareRevision,
}

impl Command {
    /// Opcode bytes as sent on the wire
    pub const fn as_bytes(&self) -> &'static [u8] {
        match self {
            Command::MeasureRelHumidHold => &[0xE5],
            Command::MeasureRelHumidNoHold => &[0xF5],
            Command::MeasureTempHold => &[0xE3],
            Command::MeasureTempNoHold => &[0xF3],
            Command::ReadTempFromPreviousRelHumid => &[0xE0],
            Command::Reset => &[0xFE],
            Command::WriteUserRegister => &[0xE6],
            Command::ReadUserRegister => &[0xE7],
            Command::WriteHeaterRegister => &[0x51],
            Command::ReadHeaterRegister => &[0x11],
            Command::ReadSerialPart1 => &[0xFA, 0x0F],
            Command::ReadSerialPart2 => &[0xFC, 0xC9],
            Command::ReadFirmwareRevision => &[0x84, 0xB8],
        }
    }

    /// Register address for the single-byte register commands
    pub(crate) const fn register_address(&self) -> u8 {
        self.as_bytes()[0]
    }
}

/// Number of bytes the device returns for a measurement command
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ResponseLength {
    /// MSB and LSB only
    ValueOnly = 2,
    /// MSB, LSB and checksum
    WithChecksum = 3,
}

impl ResponseLength {
    /// Length in bytes
    pub const fn len(&self) -> usize {
        *self as usize
    }
}

/// Measurement resolution, RH / temperature bits.
///
/// Any index outside `0..=3` normalizes to [`Resolution::Rh12Temp14`]; this conversion never fails.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Resolution {
    /// 12-bit RH, 14-bit temperature (power-on default)
    #[default]
    Rh12Temp14,
    /// 8-bit RH, 12-bit temperature
    Rh8Temp12,
    /// 10-bit RH, 13-bit temperature
    Rh10Temp13,
    /// 11-bit RH, 11-bit temperature
    Rh11Temp11,
}

impl Resolution {
    /// RES1 (bit 7) and RES0 (bit 0) of the user register for this setting
    pub const fn user_register_bits(&self) -> u8 {
        match self {
            Resolution::Rh12Temp14 => 0,
            Resolution::Rh8Temp12 => 1 << USER_REG_FIELD_LSBIT_RES0,
            Resolution::Rh10Temp13 => 1 << USER_REG_FIELD_LSBIT_RES1,
            Resolution::Rh11Temp11 => USER_REG_MASK_RES,
        }
    }

    pub(crate) const fn from_user_register(reg: u8) -> Self {
        match reg & USER_REG_MASK_RES {
            0x00 => Resolution::Rh12Temp14,
            0x01 => Resolution::Rh8Temp12,
            0x80 => Resolution::Rh10Temp13,
            _ => Resolution::Rh11Temp11,
        }
    }
}

impl From<u8> for Resolution {
    fn from(index: u8) -> Self {
        match index {
            1 => Resolution::Rh8Temp12,
            2 => Resolution::Rh10Temp13,
            3 => Resolution::Rh11Temp11,
            _ => Resolution::Rh12Temp14,
        }
    }
}

/// User register value after setting or clearing the heater enable bit
pub(crate) const fn user_register_with_heater(reg: u8, on: bool) -> u8 {
    if on {
        reg | USER_REG_MASK_HTRE
    } else {
        reg & !USER_REG_MASK_HTRE
    }
}

/// User register value with the resolution bits replaced
pub(crate) const fn user_register_with_resolution(reg: u8, resolution: Resolution) -> u8 {
    (reg & !USER_REG_MASK_RES) | resolution.user_register_bits()
}

/// Heater register value with `power & 0x0F` ORed into the power field.
///
/// Power bits are never cleared, so the setting can only be raised until a reset.
pub(crate) const fn heater_register_with_power(reg: u8, power: u8) -> u8 {
    reg | (power & HEATER_REG_MASK_POWER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opcodes_match_datasheet() {
        assert_eq!(Command::MeasureRelHumidNoHold.as_bytes(), &[0xF5]);
        assert_eq!(Command::MeasureTempNoHold.as_bytes(), &[0xF3]);
        assert_eq!(Command::ReadTempFromPreviousRelHumid.as_bytes(), &[0xE0]);
        assert_eq!(Command::Reset.as_bytes(), &[0xFE]);
        assert_eq!(Command::ReadUserRegister.register_address(), 0xE7);
        assert_eq!(Command::WriteUserRegister.register_address(), 0xE6);
        assert_eq!(Command::ReadHeaterRegister.register_address(), 0x11);
        assert_eq!(Command::WriteHeaterRegister.register_address(), 0x51);
        assert_eq!(Command::ReadSerialPart1.as_bytes(), &[0xFA, 0x0F]);
        assert_eq!(Command::ReadSerialPart2.as_bytes(), &[0xFC, 0xC9]);
        assert_eq!(Command::ReadFirmwareRevision.as_bytes(), &[0x84, 0xB8]);
    }

    #[test]
    fn resolution_out_of_range_is_default() {
        assert_eq!(Resolution::from(5u8), Resolution::from(0u8));
        assert_eq!(Resolution::from(0xFFu8), Resolution::Rh12Temp14);
        assert_eq!(user_register_with_resolution(0xBB, Resolution::from(5u8)), 0x3A);
    }

    #[test]
    fn resolution_bits() {
        assert_eq!(user_register_with_resolution(0x3A, Resolution::from(1u8)), 0x3B);
        assert_eq!(user_register_with_resolution(0x3A, Resolution::from(2u8)), 0xBA);
        assert_eq!(user_register_with_resolution(0x3A, Resolution::from(3u8)), 0xBB);
        for index in 0..4u8 {
            let res = Resolution::from(index);
            assert_eq!(Resolution::from_user_register(user_register_with_resolution(0x3A, res)), res);
        }
    }

    #[test]
    fn heater_power_is_masked_and_ored() {
        assert_eq!(heater_register_with_power(0x00, 20), 0x04);
        assert_eq!(heater_register_with_power(0xA0, 20), 0xA4);
        assert_eq!(heater_register_with_power(0xA3, 20), 0xA7);
        assert_eq!(heater_register_with_power(0x0F, 20), 0x0F);
        assert_eq!(heater_register_with_power(0xF0, 0xFF), 0xFF);
    }

    #[test]
    fn heater_enable_only_touches_bit_2() {
        assert_eq!(user_register_with_heater(0x3A, true), 0x3E);
        assert_eq!(user_register_with_heater(0xFF, false), 0xFB);
        assert_eq!(user_register_with_heater(0x3A, false), 0x3A);
    }
}
