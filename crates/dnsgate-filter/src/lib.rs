//! # dnsgate filtering engine
//!
//! Domain classification for the dnsgate packet filter. Rules are keyed by
//! domain name and stored in a trie indexed by reversed label path, giving
//! O(label-count) lookup with exact and wildcard matching under a single
//! reader-writer lock.
//!
//! ## Example
//!
//! ```rust,ignore
//! use dnsgate_filter::{Action, FilterEngine, Rule};
//!
//! let engine = FilterEngine::new();
//! engine.add_rule(Rule::block(1).with_tag("ads"), "*.ads.example.com");
//!
//! let result = engine.check("tracker.ads.example.com", 1);
//! assert!(result.is_blocked());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod config;
pub mod engine;
pub mod rule;
pub mod trie;

pub use config::{RuleEntry, RuleSet};
pub use engine::{EngineStats, FilterEngine, FilterResult};
pub use rule::{Action, Rule};
pub use trie::DomainTrie;
