//! Inbound serial listener
//!
//! The slave clocks never answer, but anything that shows up on the line is
//! logged. A read failure means the port is gone and the daemon exits.

use std::io;
use std::process;
use std::thread::{self, JoinHandle};

use tracing::{debug, error, info};

use regulator_hal::UartRx;
use regulator_hal_linux::SerialRx;

/// Buffer size for serial receive
const RX_BUF_SIZE: usize = 64;

/// Start the listener on its own thread
pub fn spawn_serial_listener(rx: SerialRx) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("serial-rx".into())
        .spawn(move || listen(rx))
}

fn listen(mut rx: SerialRx) {
    info!("Listening..");
    let mut buf = [0u8; RX_BUF_SIZE];

    loop {
        match rx.read_blocking(&mut buf) {
            Ok(0) => {}
            Ok(n) => {
                debug!("RX: {} bytes", n);
                info!("{}", String::from_utf8_lossy(&buf[..n]));
            }
            Err(e) => {
                error!("Serial read failed: {}", e);
                process::exit(1);
            }
        }
    }
}
