//! Serial ports
//!
//! The port is opened once and split into a transmit half owned by the
//! broadcaster and a receive half drained by a listener thread.

use std::io::{self, Read, Write};
use std::time::Duration;

use regulator_hal::{UartConfig, UartRx, UartTx};
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use thiserror::Error;

/// How long a read waits before reporting no data
const READ_TIMEOUT: Duration = Duration::from_millis(500);

/// Serial port errors
#[derive(Debug, Error)]
pub enum SerialError {
    #[error("cannot open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: serialport::Error,
    },
    #[error("cannot split {path} into halves: {source}")]
    Split {
        path: String,
        #[source]
        source: serialport::Error,
    },
    #[error("serial I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Open `path` and split it into transmit and receive halves
pub fn open_serial(path: &str, config: &UartConfig) -> Result<(SerialTx, SerialRx), SerialError> {
    let port = serialport::new(path, config.baudrate)
        .data_bits(DataBits::Eight)
        .parity(Parity::None)
        .stop_bits(StopBits::One)
        .flow_control(FlowControl::None)
        .timeout(READ_TIMEOUT)
        .open()
        .map_err(|source| SerialError::Open {
            path: path.into(),
            source,
        })?;
    let rx = port.try_clone().map_err(|source| SerialError::Split {
        path: path.into(),
        source,
    })?;

    Ok((SerialTx { port }, SerialRx { port: rx }))
}

/// Transmit half of a serial port
pub struct SerialTx {
    port: Box<dyn SerialPort>,
}

impl UartTx for SerialTx {
    type Error = SerialError;

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), SerialError> {
        self.port.write_all(data)?;
        self.port.flush()?;
        Ok(())
    }
}

/// Receive half of a serial port
pub struct SerialRx {
    port: Box<dyn SerialPort>,
}

impl UartRx for SerialRx {
    type Error = SerialError;

    fn read_blocking(&mut self, buf: &mut [u8]) -> Result<usize, SerialError> {
        match self.port.read(buf) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == io::ErrorKind::TimedOut => Ok(0),
            Err(e) => Err(e.into()),
        }
    }
}
