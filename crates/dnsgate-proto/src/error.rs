//! Wire codec error types.

use thiserror::Error;

/// Result type alias for wire codec operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while parsing a query or building a response.
///
/// Every error is a value returned at the call site; a failed parse never
/// leaves a partially written output behind.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Packet is shorter than the smallest possible DNS query.
    #[error("packet too short: expected at least {expected} bytes, got {actual}")]
    PacketTooShort {
        /// Minimum acceptable packet size.
        expected: usize,
        /// Actual packet size.
        actual: usize,
    },

    /// Header is well-formed but unusable (no question present).
    #[error("invalid header: question count is zero")]
    InvalidHeader,

    /// Packet ends in the middle of a name or fixed-size field.
    #[error("truncated message at offset {offset}")]
    TruncatedMessage {
        /// Offset of the first byte that was needed but missing.
        offset: usize,
    },

    /// Compression pointer chain is out of bounds or exceeds the jump cap.
    #[error("compression pointer loop at offset {offset}")]
    PointerLoop {
        /// Offset of the offending pointer.
        offset: usize,
    },

    /// Label length byte uses a reserved bit pattern.
    #[error("invalid label byte 0x{value:02X} at offset {offset}")]
    InvalidLabel {
        /// Offset of the length byte.
        offset: usize,
        /// The rejected byte.
        value: u8,
    },

    /// The datagram carries a response (QR=1), not a query.
    #[error("message is a response, not a query")]
    NotQuery,

    /// Output buffer cannot hold the result.
    #[error("buffer too small: need {needed} bytes, have {available}")]
    BufferTooSmall {
        /// Bytes required.
        needed: usize,
        /// Bytes available.
        available: usize,
    },
}

impl Error {
    /// Creates a new `PacketTooShort` error.
    #[inline]
    pub fn packet_too_short(expected: usize, actual: usize) -> Self {
        Self::PacketTooShort { expected, actual }
    }

    /// Creates a new `TruncatedMessage` error.
    #[inline]
    pub fn truncated(offset: usize) -> Self {
        Self::TruncatedMessage { offset }
    }

    /// Creates a new `PointerLoop` error.
    #[inline]
    pub fn pointer_loop(offset: usize) -> Self {
        Self::PointerLoop { offset }
    }

    /// Creates a new `InvalidLabel` error.
    #[inline]
    pub fn invalid_label(offset: usize, value: u8) -> Self {
        Self::InvalidLabel { offset, value }
    }

    /// Creates a new `BufferTooSmall` error.
    #[inline]
    pub fn buffer_too_small(needed: usize, available: usize) -> Self {
        Self::BufferTooSmall { needed, available }
    }

    /// Returns true if this error indicates a malformed packet that should
    /// be dropped (as opposed to a caller-side buffer or usage problem).
    #[inline]
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            Self::PacketTooShort { .. }
                | Self::InvalidHeader
                | Self::TruncatedMessage { .. }
                | Self::PointerLoop { .. }
                | Self::InvalidLabel { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::packet_too_short(17, 8);
        assert_eq!(
            err.to_string(),
            "packet too short: expected at least 17 bytes, got 8"
        );

        let err = Error::invalid_label(12, 0x80);
        assert_eq!(err.to_string(), "invalid label byte 0x80 at offset 12");
    }

    #[test]
    fn test_error_classification() {
        assert!(Error::packet_too_short(17, 3).is_malformed());
        assert!(Error::pointer_loop(12).is_malformed());
        assert!(Error::truncated(20).is_malformed());
        assert!(!Error::NotQuery.is_malformed());
        assert!(!Error::buffer_too_small(33, 16).is_malformed());
    }
}
