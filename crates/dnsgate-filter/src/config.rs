//! Deserializable rule-set configuration.
//!
//! The shapes here are format-agnostic: the caller deserializes its rule
//! file (YAML, JSON, ...) into a [`RuleSet`] and hands it to
//! [`FilterEngine::load_rule_set`](crate::FilterEngine::load_rule_set).
//! File reading and format choice live above this layer.

use crate::rule::{Action, Rule, DEFAULT_RULE_TTL};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

/// A complete rule set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleSet {
    /// The rules, in declaration order.
    #[serde(default)]
    pub rules: Vec<RuleEntry>,
}

/// One configured rule, possibly covering several domains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleEntry {
    /// Numeric rule id.
    pub id: u32,

    /// Action taken on a match.
    #[serde(default)]
    pub action: Action,

    /// Domain patterns this rule covers (`*.` prefix for wildcards).
    pub domains: Vec<String>,

    /// Redirect target for [`Action::Redirect`].
    #[serde(default)]
    pub redirect_ip: Option<Ipv4Addr>,

    /// TTL for synthesized answers.
    #[serde(default = "default_ttl")]
    pub ttl: u32,

    /// Short identifier carried into logs.
    #[serde(default)]
    pub tag: CompactString,

    /// Whether the entry is active.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_ttl() -> u32 {
    DEFAULT_RULE_TTL
}

fn default_true() -> bool {
    true
}

impl RuleEntry {
    /// Converts this entry into an engine rule.
    pub fn to_rule(&self) -> Rule {
        let mut rule = Rule::new(self.id, self.action).with_ttl(self.ttl);
        rule.redirect_ip = self.redirect_ip;
        if !self.tag.is_empty() {
            rule = rule.with_tag(&self.tag);
        }
        rule
    }
}
