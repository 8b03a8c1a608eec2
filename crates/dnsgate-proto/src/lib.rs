//! # dnsgate DNS wire codec
//!
//! Zero-copy parsing of DNS query datagrams and in-place synthesis of
//! response datagrams, built for a per-packet filtering hot path.
//!
//! ## Features
//!
//! - **Borrowed query views**: [`QueryView`] points into the caller's packet
//!   buffer; parsing allocates nothing.
//! - **Adversarial-input safe**: bounded compression-pointer walks, strict
//!   label validation, and full bounds checking on every read.
//! - **Response builders**: NXDOMAIN, REFUSED, A, and AAAA responses are
//!   written into a caller-provided buffer, reusing the original question
//!   bytes via an RFC 1035 §4.1.4 compression pointer.
//!
//! ## Example
//!
//! ```rust,ignore
//! use dnsgate_proto::{QueryView, response};
//!
//! let view = QueryView::parse(&packet)?;
//! let mut out = [0u8; 512];
//! let len = response::build_nxdomain(&view, &mut out)?;
//! // out[..len] is ready for transmit
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod class;
pub mod error;
pub mod header;
pub mod name;
pub mod query;
pub mod rcode;
pub mod response;
pub mod rtype;
pub mod wire;

pub use class::RecordClass;
pub use error::{Error, Result};
pub use header::{Header, HeaderFlags};
pub use name::{NameBounds, NameScanner};
pub use query::{QueryView, QuestionSlice};
pub use rcode::ResponseCode;
pub use rtype::RecordType;
pub use wire::WireReader;

/// Size of the DNS message header in bytes.
pub const DNS_HEADER_SIZE: usize = 12;

/// Minimum size of a parseable query: header, root label, qtype, qclass.
pub const MIN_QUERY_SIZE: usize = DNS_HEADER_SIZE + 1 + 2 + 2;

/// Maximum length of a DNS label (63 bytes per RFC 1035).
pub const MAX_LABEL_LENGTH: usize = 63;

/// Maximum length of a presentation-format domain name.
pub const MAX_DOMAIN_LENGTH: usize = 255;

/// Maximum number of compression-pointer jumps before a name is rejected.
pub const MAX_NAME_JUMPS: usize = 128;
