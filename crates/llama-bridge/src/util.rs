//! Small helpers shared by engine implementations.

/// Accumulates raw token pieces until they form valid UTF-8.
///
/// A single token is not guaranteed to decode on its own, as a multi-byte
/// character can span several tokens. Bytes are buffered until they form a
/// valid string, which is then handed back whole.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct TokenUtf8Buffer(Vec<u8>);

impl TokenUtf8Buffer {
    /// Creates an empty buffer.
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Appends a token piece to the buffer. Returns the buffered text once
    /// it forms a valid UTF-8 string, clearing the buffer for the next
    /// piece.
    pub fn push(&mut self, piece: &[u8]) -> Option<String> {
        self.0.extend_from_slice(piece);

        // Skip invalid prefix bytes so that one bad piece cannot wedge the
        // buffer for the rest of the generation.
        for start in 0..self.0.len() {
            if let Ok(text) = std::str::from_utf8(&self.0[start..]) {
                if text.is_empty() {
                    break;
                }
                let out = text.to_owned();
                self.0.clear();
                return Some(out);
            }
        }
        None
    }

    /// Drains whatever is left in the buffer, decoding it lossily. Returns
    /// `None` when the buffer is empty.
    pub fn flush_lossy(&mut self) -> Option<String> {
        if self.0.is_empty() {
            return None;
        }
        let out = String::from_utf8_lossy(&self.0).into_owned();
        self.0.clear();
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_bytes_pass_through() {
        let mut buffer = TokenUtf8Buffer::new();
        assert_eq!(buffer.push(b"hello"), Some("hello".to_string()));
    }

    #[test]
    fn partial_characters_are_buffered() {
        let mut buffer = TokenUtf8Buffer::new();
        assert_eq!(buffer.push(&[0xE2, 0x82]), None);
        assert_eq!(buffer.push(&[0xAC]), Some("€".to_string()));
    }

    #[test]
    fn invalid_prefix_bytes_are_skipped() {
        let mut buffer = TokenUtf8Buffer::new();
        assert_eq!(buffer.push(&[0xD8]), None);
        assert_eq!(buffer.push(&[0xE2, 0x82]), None);
        assert_eq!(buffer.push(&[0xAC]), Some("€".to_string()));
    }

    #[test]
    fn flush_decodes_leftovers_lossily() {
        let mut buffer = TokenUtf8Buffer::new();
        assert_eq!(buffer.push(&[0xE2, 0x82]), None);
        assert_eq!(buffer.flush_lossy(), Some("\u{FFFD}".to_string()));
        assert_eq!(buffer.flush_lossy(), None);
    }
}
