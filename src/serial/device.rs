use std::io::{self, Read, Write};
use std::time::Duration;

use serialport::{DataBits, Parity, StopBits};

use super::SerialError;
use crate::config::Config;

/// Read timeout on the underlying port; a poll that reaches it reads nothing
/// rather than failing.
const POLL_READ_TIMEOUT: Duration = Duration::from_millis(100);

/// Raw duplex byte stream the command channel drives. Production wraps a real
/// serial port; tests script one.
pub trait SerialDevice: Send {
    fn write_frame(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Reads at most `buf.len()` bytes. Returning `Ok(0)` means no data was
    /// available this poll; only genuine transport failures are errors.
    fn poll_read(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

pub struct PortDevice {
    port: Box<dyn serialport::SerialPort>,
}

impl SerialDevice for PortDevice {
    fn write_frame(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.port.write_all(bytes)?;
        self.port.flush()
    }

    fn poll_read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.port.read(buf) {
            Ok(read) => Ok(read),
            Err(err) if err.kind() == io::ErrorKind::TimedOut => Ok(0),
            Err(err) => Err(err),
        }
    }
}

/// Opens the configured serial port, or the first available port whose name
/// contains "com" (case-insensitive) when no device is configured.
pub fn open_port(config: &Config) -> Result<PortDevice, SerialError> {
    let name = select_port_name(config)?;
    tracing::info!("Connecting to port: {}", name);

    let port = serialport::new(&name, config.baud_rate)
        .data_bits(parse_data_bits(config.data_bits))
        .stop_bits(parse_stop_bits(config.stop_bits))
        .parity(parse_parity(&config.parity))
        .timeout(POLL_READ_TIMEOUT)
        .open()?;

    tracing::info!("Serial port successfully opened");
    Ok(PortDevice { port })
}

fn select_port_name(config: &Config) -> Result<String, SerialError> {
    if !config.device.is_empty() {
        return Ok(config.device.clone());
    }

    let ports = serialport::available_ports()?;
    ports
        .into_iter()
        .map(|info| info.port_name)
        .find(|name| name.to_lowercase().contains("com"))
        .ok_or(SerialError::NoPortFound)
}

fn parse_parity(parity: &str) -> Parity {
    match parity {
        "none" => Parity::None,
        "even" => Parity::Even,
        "odd" => Parity::Odd,
        other => {
            tracing::warn!("Invalid parity value: {}. Defaulting to none.", other);
            Parity::None
        }
    }
}

fn parse_data_bits(bits: u8) -> DataBits {
    match bits {
        5 => DataBits::Five,
        6 => DataBits::Six,
        7 => DataBits::Seven,
        8 => DataBits::Eight,
        other => {
            tracing::warn!("Invalid data bits value: {}. Defaulting to 8.", other);
            DataBits::Eight
        }
    }
}

fn parse_stop_bits(bits: u8) -> StopBits {
    match bits {
        1 => StopBits::One,
        2 => StopBits::Two,
        other => {
            tracing::warn!("Invalid stop bits value: {}. Defaulting to 1.", other);
            StopBits::One
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parity_strings_map_to_port_settings() {
        assert_eq!(parse_parity("none"), Parity::None);
        assert_eq!(parse_parity("even"), Parity::Even);
        assert_eq!(parse_parity("odd"), Parity::Odd);
    }

    #[test]
    fn unknown_parity_defaults_to_none() {
        assert_eq!(parse_parity("banana"), Parity::None);
    }

    #[test]
    fn stop_bits_map_with_fallback() {
        assert_eq!(parse_stop_bits(1), StopBits::One);
        assert_eq!(parse_stop_bits(2), StopBits::Two);
        assert_eq!(parse_stop_bits(9), StopBits::One);
    }

    #[test]
    fn data_bits_map_with_fallback() {
        assert_eq!(parse_data_bits(7), DataBits::Seven);
        assert_eq!(parse_data_bits(8), DataBits::Eight);
        assert_eq!(parse_data_bits(0), DataBits::Eight);
    }

    #[test]
    fn configured_device_name_is_used_verbatim() {
        let config = Config {
            device: "/dev/ttyS7".to_string(),
            ..Config::default()
        };

        assert_eq!(select_port_name(&config).unwrap(), "/dev/ttyS7");
    }
}
