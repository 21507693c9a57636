use crate::hw_def::*;
use crate::types::*;
use crate::{Error, Si7021Async, is_not_ready, measurement_from_response};

use embedded_hal_async::{delay::DelayNs, i2c::{self, I2c}};

cfg_if::cfg_if! {
    if #[cfg(feature = "defmt")] {
        use defmt::{debug, trace, warn};
    } else if #[cfg(feature = "log")] {
        use log::{debug, trace, warn};
    }
}

impl<I2C, Delay, E> Si7021Async<I2C, Delay>
where
    I2C: I2c<Error = E>,
    E: i2c::Error,
    Delay: DelayNs,
{
    /// Create a new Si7021 driver instance. The bus must already be initialized.
    pub fn new(i2c: I2C, delay: Delay) -> Self {
        Self { i2c, delay }
    }

    /// Destroy the driver and return the bus and delay provider
    pub fn release(self) -> (I2C, Delay) {
        (self.i2c, self.delay)
    }

    async fn write(&mut self, bytes: &[u8]) -> Result<(), Error<E>> {
        self.i2c.write(SI7021_I2C_ADDR, bytes).await.map_err(Error::I2c)
    }

    async fn read(&mut self, buf: &mut [u8]) -> Result<(), Error<E>> {
        self.i2c.read(SI7021_I2C_ADDR, buf).await.map_err(Error::I2c)
    }

    /// Issue a no-hold measurement command and read back the raw word.
    ///
    /// Same timing as the blocking [`Si7021::read_sensor`](crate::Si7021), with the delays awaited.
    pub async fn read_sensor(&mut self, command: Command, response_len: ResponseLength) -> Result<RawReading, Error<E>> {
        trace!("si7021::read_sensor(): command={:?}, response_len={}", command.as_bytes(), response_len.len());
        self.write(command.as_bytes()).await?;
        self.delay.delay_ms(CONVERSION_SETTLE_MS).await;

        let mut read_buf = [0u8; 3];
        let response = &mut read_buf[..response_len.len()];
        let mut retries = 0;
        loop {
            match self.i2c.read(SI7021_I2C_ADDR, response).await {
                Ok(()) => break,
                Err(i2c_err) if is_not_ready(&i2c_err) => {
                    self.delay.delay_ms(POLL_INTERVAL_MS).await;
                    retries += 1;
                    if retries > POLL_RETRIES {
                        warn!("si7021::read_sensor(): no response after {} retries", POLL_RETRIES);
                        return Err(Error::Timeout);
                    }
                }
                Err(i2c_err) => return Err(Error::I2c(i2c_err)),
            }
        }
        trace!("si7021::read_sensor(): response={:?} after {} retries", response, retries);
        measurement_from_response(response)
    }

    async fn read_sensor_hold(&mut self, command: Command) -> Result<RawReading, Error<E>> {
        let mut read_buf = [0u8; 3];
        self.i2c.write_read(SI7021_I2C_ADDR, command.as_bytes(), &mut read_buf).await.map_err(Error::I2c)?;
        measurement_from_response(&read_buf)
    }

    /// Measure temperature in degrees centigrade
    pub async fn measure_temperature(&mut self) -> Result<f32, Error<E>> {
        Ok(self.read_sensor(Command::MeasureTempNoHold, ResponseLength::WithChecksum).await?.centigrade())
    }

    /// Measure temperature in degrees fahrenheit
    pub async fn measure_temperature_fahrenheit(&mut self) -> Result<f32, Error<E>> {
        Ok(centigrade_to_fahrenheit(self.measure_temperature().await?))
    }

    /// Measure relative humidity in percent
    pub async fn measure_humidity(&mut self) -> Result<f32, Error<E>> {
        Ok(self.read_sensor(Command::MeasureRelHumidNoHold, ResponseLength::WithChecksum).await?.humidity_percent())
    }

    /// Measure temperature in hold master mode
    pub async fn measure_temperature_hold(&mut self) -> Result<f32, Error<E>> {
        Ok(self.read_sensor_hold(Command::MeasureTempHold).await?.centigrade())
    }

    /// Measure relative humidity in hold master mode
    pub async fn measure_humidity_hold(&mut self) -> Result<f32, Error<E>> {
        Ok(self.read_sensor_hold(Command::MeasureRelHumidHold).await?.humidity_percent())
    }

    /// Temperature in degrees centigrade taken during the last humidity measurement
    pub async fn temperature_from_previous_humidity(&mut self) -> Result<f32, Error<E>> {
        Ok(self.read_sensor(Command::ReadTempFromPreviousRelHumid, ResponseLength::ValueOnly).await?.centigrade())
    }

    /// Temperature in degrees fahrenheit taken during the last humidity measurement
    pub async fn temperature_from_previous_humidity_fahrenheit(&mut self) -> Result<f32, Error<E>> {
        Ok(centigrade_to_fahrenheit(self.temperature_from_previous_humidity().await?))
    }

    /// software reset
    pub async fn reset(&mut self) -> Result<(), Error<E>> {
        self.write(Command::Reset.as_bytes()).await?;
        self.delay.delay_ms(RESET_SETTLE_MS).await;
        Ok(())
    }

    /// Read the 64-bit electronic ID. Checksums are not validated.
    pub async fn serial_number(&mut self) -> Result<SerialNumber, Error<E>> {
        let mut serial = SerialNumber(0);
        let mut read_buf = [0u8; 8];
        for command in [Command::ReadSerialPart1, Command::ReadSerialPart2] {
            self.write(command.as_bytes()).await?;
            self.read(&mut read_buf).await?;
            serial.accumulate(&read_buf);
        }
        debug!("si7021::serial_number(): {:#x}", serial.0);
        Ok(serial)
    }

    /// Read the raw firmware revision byte
    pub async fn firmware_version(&mut self) -> Result<u8, Error<E>> {
        self.write(Command::ReadFirmwareRevision.as_bytes()).await?;
        let mut read_buf = [0u8; 1];
        self.read(&mut read_buf).await?;
        Ok(read_buf[0])
    }

    /// Read a single register
    pub async fn read_register(&mut self, address: u8) -> Result<u8, Error<E>> {
        self.write(&[address]).await?;
        let mut read_buf = [0u8; 1];
        self.read(&mut read_buf).await?;
        trace!("si7021::read_register(): address={:#x}, value={:#x}", address, read_buf[0]);
        Ok(read_buf[0])
    }

    /// Write a single register
    pub async fn write_register(&mut self, address: u8, value: u8) -> Result<(), Error<E>> {
        trace!("si7021::write_register(): address={:#x}, value={:#x}", address, value);
        self.write(&[address, value]).await
    }

    /// Read the RH/T user register
    pub async fn user_register(&mut self) -> Result<UserRegister, Error<E>> {
        Ok(UserRegister::from(self.read_register(Command::ReadUserRegister.register_address()).await?))
    }

    /// Read the heater control register
    pub async fn heater_register(&mut self) -> Result<HeaterRegister, Error<E>> {
        Ok(HeaterRegister(self.read_register(Command::ReadHeaterRegister.register_address()).await?))
    }

    async fn modify_user_register(&mut self, f: impl FnOnce(u8) -> u8) -> Result<(), Error<E>> {
        let reg = self.read_register(Command::ReadUserRegister.register_address()).await?;
        self.write_register(Command::WriteUserRegister.register_address(), f(reg)).await
    }

    /// Condensation heater. `power` is masked to 0..=15 and ORed into the heater register, so the
    /// level can only be raised until a reset.
    pub async fn set_heater(&mut self, on: bool, power: u8) -> Result<(), Error<E>> {
        if on {
            let reg = self.read_register(Command::ReadHeaterRegister.register_address()).await?;
            self.write_register(Command::WriteHeaterRegister.register_address(), heater_register_with_power(reg, power)).await?;
        }
        self.modify_user_register(|reg| user_register_with_heater(reg, on)).await
    }

    /// Set the measurement resolution. Indices outside `0..=3` select the default resolution.
    pub async fn set_sensor_resolution(&mut self, resolution: impl Into<Resolution>) -> Result<(), Error<E>> {
        let resolution = resolution.into();
        self.modify_user_register(|reg| user_register_with_resolution(reg, resolution)).await
    }
}
