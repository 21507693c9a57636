//! This is a platform-agnostic Rust driver for the Si7021 I²C humidity and temperature sensor
//! using the [`embedded-hal`] or [`embedded-hal-async`] traits.
//!
//! [`embedded-hal`]: https://github.com/rust-embedded/embedded-hal/tree/master/embedded-hal
//! [`embedded-hal-async`]: https://github.com/rust-embedded/embedded-hal/tree/master/embedded-hal-async
//!
//! This driver allows you to:
//! - Measure relative humidity and temperature in no-hold (polled) and hold (clock stretching)
//!   master mode.
//! - Read the temperature taken during the previous humidity measurement.
//! - Enable/disable the heater and set its power (0 to 15).
//! - Set the measurement resolution.
//! - Read the user and heater registers.
//! - Trigger a software reset.
//! - Read the 64-bit electronic serial number.
//! - Read the firmware revision.
//! - blocking API support.
//! - async API support.
//!
//! ## Features
//!
//! - `async`: Enables async API ([`Si7021Async`]).
//! - `blocking`: Enables blocking API ([`Si7021`]).
//! - `crc`: Checks received measurement CRC against computed CRC.
//! - `defmt`: Enables logging using the `defmt` framework.
//! - `log`: Enables logging using the `log` framework.
//!
//! ## Timing
//!
//! No-hold measurements write the command, wait [`CONVERSION_SETTLE_MS`], then poll the device
//! every [`POLL_INTERVAL_MS`] until it acknowledges the read. After [`POLL_RETRIES`] retries the
//! measurement fails with [`Error::Timeout`]. Register accesses are not polled.
//!
//! Every operation blocks (or awaits) for the whole command/response cycle. Share the bus with
//! other drivers through a mutex-backed `I2c` implementation; register read-modify-write sequences
//! are two bus transactions and are not atomic with respect to other bus users.
//!
//! Datasheet:
//!   [Si7021-A20](https://www.silabs.com/documents/public/data-sheets/Si7021-A20.pdf)
//!
//! ## Blocking Example:
//!
//! ```ignore
//! use si7021::Si7021;
//!
//! // Platform-specific
//! let i2c = /* embedded_hal::i2c::I2c instance */;
//! let delay = /* embedded_hal::delay::DelayNs instance */;
//!
//! let mut si7021 = Si7021::new(i2c, delay);
//! si7021.set_sensor_resolution(0u8).unwrap();
//!
//! // humidity first, then the temperature cached by the same conversion
//! let humidity = si7021.measure_humidity().unwrap();
//! let centigrade = si7021.temperature_from_previous_humidity().unwrap();
//! println!("{:0.1} %RH, {:0.1} °C", humidity, centigrade);
//! println!("serial number: {}", si7021.serial_number().unwrap());
//! ```
//!
//! ## Async Example:
//!
//! ```ignore
//! use si7021::Si7021Async;
//!
//! let mut si7021 = Si7021Async::new(i2c, delay);
//! let centigrade = si7021.measure_temperature().await.unwrap();
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![cfg_attr(not(test), no_std)]

#[cfg(not(any(feature = "async", feature = "blocking")))]
compile_error!("At least one of \"async\" and \"blocking\" features must be enabled");

#[cfg(all(feature = "defmt", feature = "log"))]
compile_error!("Features \"defmt\" and \"log\" are mutually exclusive and cannot be enabled together");

// No-op fallbacks, textually in scope for every module declared below
#[cfg(not(any(feature = "defmt", feature = "log")))]
macro_rules! trace {
    ($($arg:tt)*) => {};
}
#[cfg(not(any(feature = "defmt", feature = "log")))]
macro_rules! debug {
    ($($arg:tt)*) => {};
}
#[cfg(not(any(feature = "defmt", feature = "log")))]
macro_rules! warn {
    ($($arg:tt)*) => {};
}

cfg_if::cfg_if! {
    if #[cfg(all(feature = "crc", feature = "defmt"))] {
        use defmt::warn;
    } else if #[cfg(all(feature = "crc", feature = "log"))] {
        use log::warn;
    }
}

#[cfg(feature = "blocking")]
mod device_impl;
#[cfg(feature = "async")]
mod device_impl_async;
mod hw_def;
mod types;

pub use crate::{hw_def::*, types::*};

#[cfg(feature = "crc")]
use crc::Crc;
use embedded_hal::i2c::{self, ErrorKind};

#[cfg(feature="defmt")]
use defmt::Format;

#[cfg(feature = "crc")]
const CRC: Crc<u8> = Crc::<u8>::new(&hw_def::CRC_8_SI7021);

/// Si7021 device driver, blocking API
#[cfg(feature = "blocking")]
#[derive(Debug)]
pub struct Si7021<I2C, Delay> {
    pub(crate) i2c: I2C,
    pub(crate) delay: Delay,
}

/// Si7021 device driver, async API
#[cfg(feature = "async")]
#[derive(Debug)]
pub struct Si7021Async<I2C, Delay> {
    pub(crate) i2c: I2C,
    pub(crate) delay: Delay,
}

/// All possible errors in this crate
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Debug, PartialEq)]
pub enum Error<E> {
    /// I²C communication error
    I2c(E),
    /// Conversion did not complete within the poll budget
    Timeout,
    /// Failure of a checksum from the device was detected
    #[cfg(feature = "crc")]
    CrcMismatch,
}

/// A no-hold conversion in progress is signalled by the device NACKing its address
pub(crate) fn is_not_ready<E: i2c::Error>(err: &E) -> bool {
    matches!(err.kind(), ErrorKind::NoAcknowledge(_))
}

/// Strip the checksum byte and status bits from a measurement response
pub(crate) fn measurement_from_response<E>(response: &[u8]) -> Result<RawReading, Error<E>> {
    #[cfg(feature = "crc")]
    if let [msb, lsb, read_crc] = response {
        let crc_expect = CRC.checksum(&[*msb, *lsb]);
        if *read_crc != crc_expect {
            warn!("si7021::measurement_from_response(): crc mismatch: response={:?}, crc_expect={}", response, crc_expect);
            return Err(Error::CrcMismatch);
        }
    }
    Ok(RawReading::from_be_bytes(response[0], response[1]))
}

/// Delay provider for tests that records every requested delay
#[cfg(test)]
pub(crate) mod mock_utils {
    use std::vec::Vec;

    #[derive(Debug, Default)]
    pub struct RecordingDelay {
        pub delays_ms: Vec<u32>,
        pub delays_ns: Vec<u32>,
    }

    impl embedded_hal::delay::DelayNs for RecordingDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.delays_ns.push(ns);
        }
        fn delay_ms(&mut self, ms: u32) {
            self.delays_ms.push(ms);
        }
    }

    #[cfg(feature = "async")]
    impl embedded_hal_async::delay::DelayNs for RecordingDelay {
        async fn delay_ns(&mut self, ns: u32) {
            self.delays_ns.push(ns);
        }
        async fn delay_ms(&mut self, ms: u32) {
            self.delays_ms.push(ms);
        }
    }
}
