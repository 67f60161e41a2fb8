//! XOR line checksum
//!
//! The serial framing protects each line with a single XOR byte over the
//! payload, rendered as two uppercase hex digits after the `*` separator.

/// XOR of all bytes
#[inline]
pub fn xor8(data: &[u8]) -> u8 {
    data.iter().fold(0, |acc, &b| acc ^ b)
}

/// Render a checksum as its two-digit uppercase hex trailer
pub fn checksum_hex(cs: u8) -> [u8; 2] {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    [HEX[(cs >> 4) as usize], HEX[(cs & 0x0F) as usize]]
}

/// Parse a two-digit hex trailer; lowercase is tolerated on receive
pub fn parse_checksum_hex(digits: &[u8]) -> Option<u8> {
    fn nibble(b: u8) -> Option<u8> {
        match b {
            b'0'..=b'9' => Some(b - b'0'),
            b'A'..=b'F' => Some(b - b'A' + 10),
            b'a'..=b'f' => Some(b - b'a' + 10),
            _ => None,
        }
    }
    if digits.len() != 2 {
        return None;
    }
    Some((nibble(digits[0])? << 4) | nibble(digits[1])?)
}
