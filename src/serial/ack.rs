/// Reassembles delimiter-terminated acknowledgment messages from a chunked
/// byte stream. Owns nothing but its accumulator; timing and polling live in
/// the channel's wait loop.
#[derive(Debug, Default)]
pub struct AckReader {
    buffer: Vec<u8>,
}

const ACK_DELIMITER: u8 = b'\n';

impl AckReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `bytes` and returns the first complete message, if any.
    ///
    /// The message and its delimiter are consumed from the accumulator;
    /// anything after the delimiter stays buffered.
    pub fn feed(&mut self, bytes: &[u8]) -> Option<String> {
        self.buffer.extend_from_slice(bytes);

        let delimiter = self.buffer.iter().position(|&b| b == ACK_DELIMITER)?;
        let message: Vec<u8> = self.buffer.drain(..=delimiter).take(delimiter).collect();
        Some(String::from_utf8_lossy(&message).into_owned())
    }
}
