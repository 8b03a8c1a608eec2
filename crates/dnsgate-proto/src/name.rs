//! Domain name operations over raw message bytes.
//!
//! Names are never copied out of the packet during parsing. The scanner
//! walks the label sequence in place, following compression pointers
//! (RFC 1035 Section 4.1.4) with a bounded jump budget, and offers
//! decode/compare operations that work directly against the wire bytes.

use crate::error::{Error, Result};
use crate::{MAX_DOMAIN_LENGTH, MAX_NAME_JUMPS};

/// Result of scanning a name: where it ends and how many bytes of the
/// original (pre-jump) encoding it occupies.
///
/// `wire_len` is the number of bytes that must be copied to reproduce the
/// name faithfully: the literal labels up to the first compression pointer
/// plus either the terminating zero byte or that 2-byte pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameBounds {
    /// Offset of the first byte after the name in the original encoding.
    pub end: usize,
    /// Length of the name in the original encoding.
    pub wire_len: usize,
}

/// Walks and decodes domain names inside a DNS message.
///
/// The scanner holds the complete message buffer so compression pointers
/// can be resolved against absolute offsets.
#[derive(Debug, Clone, Copy)]
pub struct NameScanner<'a> {
    /// The complete message buffer.
    message: &'a [u8],
}

impl<'a> NameScanner<'a> {
    /// Creates a new scanner over `message`.
    #[inline]
    pub const fn new(message: &'a [u8]) -> Self {
        Self { message }
    }

    /// Scans the name starting at `offset` without decoding it.
    ///
    /// Validates every label, follows compression pointers up to the jump
    /// cap, and returns the name's bounds in the original encoding. A
    /// pointer whose target lies at or past the end of the message is
    /// treated as a loop, as is exhausting the jump budget.
    pub fn scan(&self, offset: usize) -> Result<NameBounds> {
        let msg = self.message;
        let mut pos = offset;
        let mut jumps = 0usize;
        // Offset just past the first (and only counted) pointer word.
        let mut return_end: Option<usize> = None;

        loop {
            let len_byte = *msg.get(pos).ok_or_else(|| Error::truncated(pos))?;

            if len_byte == 0 {
                let end = return_end.unwrap_or(pos + 1);
                return Ok(NameBounds {
                    end,
                    wire_len: end - offset,
                });
            }

            match len_byte & 0xC0 {
                0xC0 => {
                    if pos + 1 >= msg.len() {
                        return Err(Error::truncated(pos + 1));
                    }
                    let target =
                        usize::from(u16::from_be_bytes([len_byte & 0x3F, msg[pos + 1]]));
                    if target >= msg.len() {
                        return Err(Error::pointer_loop(pos));
                    }
                    if return_end.is_none() {
                        return_end = Some(pos + 2);
                    }
                    jumps += 1;
                    if jumps >= MAX_NAME_JUMPS {
                        return Err(Error::pointer_loop(pos));
                    }
                    pos = target;
                }
                0x00 => {
                    // Top bits 00: literal label, length is at most 63.
                    let len = usize::from(len_byte);
                    if pos + 1 + len > msg.len() {
                        return Err(Error::truncated(pos + 1 + len));
                    }
                    pos += 1 + len;
                }
                _ => return Err(Error::invalid_label(pos, len_byte)),
            }
        }
    }

    /// Decodes the name at `offset` into `out` as lowercase dot-separated
    /// ASCII with no trailing dot, returning the number of bytes written.
    pub fn decode_into(&self, offset: usize, out: &mut [u8]) -> Result<usize> {
        let msg = self.message;
        let mut pos = offset;
        let mut out_pos = 0usize;
        let mut jumps = 0usize;
        let mut first_label = true;

        loop {
            let len_byte = *msg.get(pos).ok_or_else(|| Error::truncated(pos))?;

            if len_byte == 0 {
                return Ok(out_pos);
            }

            match len_byte & 0xC0 {
                0xC0 => {
                    if pos + 1 >= msg.len() {
                        return Err(Error::truncated(pos + 1));
                    }
                    let target =
                        usize::from(u16::from_be_bytes([len_byte & 0x3F, msg[pos + 1]]));
                    if target >= msg.len() {
                        return Err(Error::pointer_loop(pos));
                    }
                    jumps += 1;
                    if jumps >= MAX_NAME_JUMPS {
                        return Err(Error::pointer_loop(pos));
                    }
                    pos = target;
                }
                0x00 => {
                    let len = usize::from(len_byte);
                    if pos + 1 + len > msg.len() {
                        return Err(Error::truncated(pos + 1 + len));
                    }

                    if !first_label {
                        if out_pos >= out.len() {
                            return Err(Error::buffer_too_small(out_pos + 1, out.len()));
                        }
                        out[out_pos] = b'.';
                        out_pos += 1;
                    }
                    first_label = false;

                    if out_pos + len > out.len() {
                        return Err(Error::buffer_too_small(out_pos + len, out.len()));
                    }
                    for i in 0..len {
                        out[out_pos + i] = msg[pos + 1 + i].to_ascii_lowercase();
                    }
                    out_pos += len;
                    pos += 1 + len;
                }
                _ => return Err(Error::invalid_label(pos, len_byte)),
            }
        }
    }

    /// Decodes the name at `offset` into an owned string.
    ///
    /// Convenience wrapper over [`decode_into`](Self::decode_into) using a
    /// stack buffer sized for the longest legal name.
    pub fn decode_string(&self, offset: usize) -> Result<String> {
        let mut buf = [0u8; MAX_DOMAIN_LENGTH + 1];
        let len = self.decode_into(offset, &mut buf)?;
        Ok(String::from_utf8_lossy(&buf[..len]).into_owned())
    }

    /// Compares the wire name at `offset` against a dotted string,
    /// case-insensitively, without decoding.
    ///
    /// Walks both in lock step, consuming one wire label per dot-separated
    /// segment of `candidate`; true only when both terminate together.
    pub fn equals(&self, offset: usize, candidate: &str) -> bool {
        let msg = self.message;
        let cand = candidate.as_bytes();
        let mut pos = offset;
        let mut cpos = 0usize;
        let mut jumps = 0usize;

        loop {
            let Some(&len_byte) = msg.get(pos) else {
                return false;
            };

            if len_byte == 0 {
                return cpos == cand.len();
            }

            match len_byte & 0xC0 {
                0xC0 => {
                    if pos + 1 >= msg.len() {
                        return false;
                    }
                    let target =
                        usize::from(u16::from_be_bytes([len_byte & 0x3F, msg[pos + 1]]));
                    if target >= msg.len() {
                        return false;
                    }
                    jumps += 1;
                    if jumps >= MAX_NAME_JUMPS {
                        return false;
                    }
                    pos = target;
                }
                0x00 => {
                    let len = usize::from(len_byte);
                    if pos + 1 + len > msg.len() {
                        return false;
                    }
                    for i in 0..len {
                        if cpos >= cand.len() {
                            return false;
                        }
                        let wire = msg[pos + 1 + i].to_ascii_lowercase();
                        if wire != cand[cpos].to_ascii_lowercase() {
                            return false;
                        }
                        cpos += 1;
                    }
                    pos += 1 + len;

                    // More labels follow: the candidate must have a dot here.
                    let Some(&next) = msg.get(pos) else {
                        return false;
                    };
                    if next != 0 {
                        if cpos >= cand.len() || cand[cpos] != b'.' {
                            return false;
                        }
                        cpos += 1;
                    }
                }
                _ => return false,
            }
        }
    }

    /// Tests whether the wire name at `offset` ends with `suffix`, with the
    /// suffix starting on a label boundary.
    ///
    /// `"ample.com"` does not match a name of `example.com`; the byte
    /// before the tail, when present, must be a dot.
    pub fn ends_with(&self, offset: usize, suffix: &str) -> bool {
        let mut buf = [0u8; MAX_DOMAIN_LENGTH + 1];
        let Ok(len) = self.decode_into(offset, &mut buf) else {
            return false;
        };
        let domain = &buf[..len];
        let suffix = suffix.as_bytes();

        if domain.len() < suffix.len() {
            return false;
        }

        let start = domain.len() - suffix.len();
        if !domain[start..].eq_ignore_ascii_case(suffix) {
            return false;
        }

        start == 0 || domain[start - 1] == b'.'
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // www.example.com in wire format
    const WWW_EXAMPLE_COM: [u8; 17] = [
        3, b'w', b'w', b'w', 7, b'e', b'x', b'a', b'm', b'p', b'l', b'e', 3, b'c', b'o', b'm', 0,
    ];

    #[test]
    fn test_scan_simple_name() {
        let scanner = NameScanner::new(&WWW_EXAMPLE_COM);
        let bounds = scanner.scan(0).unwrap();

        assert_eq!(bounds.end, 17);
        assert_eq!(bounds.wire_len, 17);
    }

    #[test]
    fn test_scan_compressed_name() {
        // At offset 0: example.com.
        // At offset 13: www.<pointer to 0>
        let wire = [
            7, b'e', b'x', b'a', b'm', b'p', b'l', b'e', 3, b'c', b'o', b'm', 0, // example.com.
            3, b'w', b'w', b'w', 0xC0, 0x00, // www.<ptr to 0>
        ];

        let scanner = NameScanner::new(&wire);
        let bounds = scanner.scan(13).unwrap();

        // 1 + "www" + 2-byte pointer
        assert_eq!(bounds.end, 19);
        assert_eq!(bounds.wire_len, 6);
        assert_eq!(scanner.decode_string(13).unwrap(), "www.example.com");
    }

    #[test]
    fn test_scan_pointer_loop() {
        // Self-referencing pointer
        let wire = [0xC0, 0x00];
        let scanner = NameScanner::new(&wire);

        assert!(matches!(scanner.scan(0), Err(Error::PointerLoop { .. })));
    }

    #[test]
    fn test_scan_pointer_out_of_bounds() {
        let wire = [0xC0, 0x50, 0x00];
        let scanner = NameScanner::new(&wire);

        assert!(matches!(scanner.scan(0), Err(Error::PointerLoop { .. })));
    }

    #[test]
    fn test_scan_invalid_label_bits() {
        for byte in [0x40u8, 0x80, 0xBF] {
            let wire = [byte, b'x', 0x00];
            let scanner = NameScanner::new(&wire);
            assert!(
                matches!(scanner.scan(0), Err(Error::InvalidLabel { .. })),
                "byte 0x{byte:02X} must be rejected"
            );
        }
    }

    #[test]
    fn test_scan_truncated_mid_label() {
        let wire = [3, b'w', b'w'];
        let scanner = NameScanner::new(&wire);

        assert!(matches!(
            scanner.scan(0),
            Err(Error::TruncatedMessage { .. })
        ));
    }

    #[test]
    fn test_decode_lowercases() {
        let wire = [
            3, b'W', b'w', b'W', 7, b'E', b'x', b'A', b'm', b'P', b'l', b'E', 3, b'C', b'O', b'M',
            0,
        ];
        let scanner = NameScanner::new(&wire);

        assert_eq!(scanner.decode_string(0).unwrap(), "www.example.com");
    }

    #[test]
    fn test_decode_buffer_too_small() {
        let scanner = NameScanner::new(&WWW_EXAMPLE_COM);
        let mut buf = [0u8; 8];

        assert!(matches!(
            scanner.decode_into(0, &mut buf),
            Err(Error::BufferTooSmall { .. })
        ));
    }

    #[test]
    fn test_decode_root_name() {
        let wire = [0u8];
        let scanner = NameScanner::new(&wire);
        let mut buf = [0u8; 4];

        assert_eq!(scanner.decode_into(0, &mut buf).unwrap(), 0);
    }

    #[test]
    fn test_equals() {
        let scanner = NameScanner::new(&WWW_EXAMPLE_COM);

        assert!(scanner.equals(0, "www.example.com"));
        assert!(scanner.equals(0, "WWW.Example.COM"));
        assert!(!scanner.equals(0, "www.example.co"));
        assert!(!scanner.equals(0, "www.example.com.x"));
        assert!(!scanner.equals(0, "wwwexample.com"));
        assert!(!scanner.equals(0, "example.com"));
    }

    #[test]
    fn test_equals_compressed() {
        let wire = [
            7, b'e', b'x', b'a', b'm', b'p', b'l', b'e', 3, b'c', b'o', b'm', 0,
            3, b'w', b'w', b'w', 0xC0, 0x00,
        ];
        let scanner = NameScanner::new(&wire);

        assert!(scanner.equals(13, "www.example.com"));
        assert!(!scanner.equals(13, "www.example.org"));
    }

    #[test]
    fn test_ends_with_label_boundary() {
        let scanner = NameScanner::new(&WWW_EXAMPLE_COM);

        assert!(scanner.ends_with(0, "example.com"));
        assert!(scanner.ends_with(0, "com"));
        assert!(scanner.ends_with(0, "www.example.com"));
        assert!(!scanner.ends_with(0, "ample.com"));
        assert!(!scanner.ends_with(0, "other.com"));
    }

    #[test]
    fn test_oversize_name_errors_cleanly() {
        // 10 labels of 63 bytes: 640 bytes of wire, decoding to > 255 chars.
        let mut wire = Vec::new();
        for _ in 0..10 {
            wire.push(63u8);
            wire.extend(std::iter::repeat(b'a').take(63));
        }
        wire.push(0);

        let scanner = NameScanner::new(&wire);
        // The scan itself is fine; only the bounded decode buffer objects.
        assert!(scanner.scan(0).is_ok());
        assert!(matches!(
            scanner.decode_string(0),
            Err(Error::BufferTooSmall { .. })
        ));
    }
}
