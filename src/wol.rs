use std::net::UdpSocket;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WolError {
    #[error("Invalid MAC address: {0}")]
    InvalidMac(String),
    #[error("Failed to send magic packet: {0}")]
    SendError(#[from] std::io::Error),
}

const WOL_PORT: u16 = 9;

/// Sends a Wake-on-LAN magic packet for `mac_address` to the broadcast
/// address. Callers treat the whole operation as best-effort.
pub fn send_magic_packet(mac_address: &str, broadcast_ip: &str) -> Result<(), WolError> {
    let packet = build_magic_packet(parse_mac(mac_address)?);

    let socket = UdpSocket::bind(("0.0.0.0", 0))?;
    socket.set_broadcast(true)?;
    socket.send_to(&packet, (broadcast_ip, WOL_PORT))?;

    tracing::info!("Sent Wake on LAN signal to {}", mac_address);
    Ok(())
}

fn parse_mac(mac: &str) -> Result<[u8; 6], WolError> {
    let mut bytes = [0u8; 6];
    let mut parts = mac.split([':', '-']);

    for slot in &mut bytes {
        let part = parts
            .next()
            .ok_or_else(|| WolError::InvalidMac(mac.to_string()))?;
        *slot = u8::from_str_radix(part, 16).map_err(|_| WolError::InvalidMac(mac.to_string()))?;
    }

    if parts.next().is_some() {
        return Err(WolError::InvalidMac(mac.to_string()));
    }

    Ok(bytes)
}

/// Six sync bytes followed by the target MAC repeated sixteen times.
fn build_magic_packet(mac: [u8; 6]) -> Vec<u8> {
    let mut packet = Vec::with_capacity(102);
    packet.extend_from_slice(&[0xFF; 6]);
    for _ in 0..16 {
        packet.extend_from_slice(&mac);
    }
    packet
}
