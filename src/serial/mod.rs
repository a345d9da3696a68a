//! Serial command channel: frames textual commands onto the device line and
//! waits, with a bounded timeout, for a delimited acknowledgment.

pub mod ack;
pub mod device;

pub use ack::AckReader;
pub use device::{PortDevice, SerialDevice, open_port};

use std::io;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::config::Config;

#[derive(Debug, Error)]
pub enum SerialError {
    #[error("No suitable serial port found")]
    NoPortFound,
    #[error("Serial port error: {0}")]
    PortError(#[from] serialport::Error),
    #[error("Failed to write to serial port: {0}")]
    WriteError(#[from] io::Error),
}

/// How the acknowledgment wait ended. Secondary to the write result: none of
/// these variants fail the overall send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AckOutcome {
    Received(String),
    TimedOut,
    ReadError(String),
}

const FRAME_TERMINATOR: &[u8] = b"\r\n";
const READ_CHUNK_SIZE: usize = 128;
const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub const DEFAULT_ACK_TIMEOUT: Duration = Duration::from_secs(5);

/// One command at a time over a single shared device. The channel offers no
/// internal locking; the server layer serializes access around it.
pub struct Channel<D: SerialDevice> {
    device: D,
    ack_timeout: Duration,
}

impl Channel<PortDevice> {
    pub fn open(config: &Config) -> Result<Self, SerialError> {
        Ok(Self::new(device::open_port(config)?))
    }
}

impl<D: SerialDevice> Channel<D> {
    pub fn new(device: D) -> Self {
        Self {
            device,
            ack_timeout: DEFAULT_ACK_TIMEOUT,
        }
    }

    pub fn with_ack_timeout(mut self, ack_timeout: Duration) -> Self {
        self.ack_timeout = ack_timeout;
        self
    }

    /// Writes `command` plus the line terminator in one call, then waits for
    /// an acknowledgment.
    ///
    /// Only the write decides `Ok`/`Err`. The acknowledgment outcome rides
    /// along in `Ok`: device wiring is assumed lossy, so a command the device
    /// never confirmed is still a success to the caller.
    pub fn send(&mut self, command: &str) -> Result<AckOutcome, SerialError> {
        let mut frame = Vec::with_capacity(command.len() + FRAME_TERMINATOR.len());
        frame.extend_from_slice(command.as_bytes());
        frame.extend_from_slice(FRAME_TERMINATOR);

        if let Err(err) = self.device.write_frame(&frame) {
            tracing::error!("Failed to write to serial port: {}", err);
            return Err(SerialError::WriteError(err));
        }
        tracing::info!("Command sent: {}", command);

        let outcome = self.wait_for_acknowledgment();
        match &outcome {
            AckOutcome::Received(message) => tracing::info!("Received: {}", message),
            AckOutcome::TimedOut => {
                tracing::warn!("No acknowledgment received for command: {}", command);
            }
            AckOutcome::ReadError(err) => {
                tracing::warn!("Error reading from serial port: {}", err);
            }
        }

        Ok(outcome)
    }

    fn wait_for_acknowledgment(&mut self) -> AckOutcome {
        let started = Instant::now();
        let mut reader = AckReader::new();
        let mut chunk = [0u8; READ_CHUNK_SIZE];

        loop {
            if started.elapsed() > self.ack_timeout {
                return AckOutcome::TimedOut;
            }

            let read = match self.device.poll_read(&mut chunk) {
                Ok(read) => read,
                Err(err) => return AckOutcome::ReadError(err.to_string()),
            };

            if read > 0 {
                if let Some(message) = reader.feed(&chunk[..read]) {
                    return AckOutcome::Received(message);
                }
            }

            std::thread::sleep(POLL_INTERVAL);
        }
    }

    /// Sends each startup command independently; a failure is logged and the
    /// remaining commands still run.
    pub fn run_startup_commands(&mut self, commands: &[String]) {
        for command in commands {
            match self.send(command) {
                Ok(_) => tracing::info!("Startup command executed: {}", command),
                Err(err) => {
                    tracing::warn!("Failed to execute startup command {}: {}", command, err);
                }
            }
        }
    }
}
