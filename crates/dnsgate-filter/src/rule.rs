//! Filter rules and actions.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;

/// Maximum length of a rule tag in bytes.
pub const MAX_TAG_LENGTH: usize = 31;

/// Default TTL for synthesized answers, in seconds.
pub const DEFAULT_RULE_TTL: u32 = 300;

/// Action to take when a domain matches a filter rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Let the query through.
    #[default]
    Allow,

    /// Answer with NXDOMAIN.
    Block,

    /// Answer with the rule's redirect address.
    Redirect,

    /// Record the query, then let it through.
    Log,
}

impl Action {
    /// Returns true if this action suppresses the real answer.
    pub fn is_blocking(&self) -> bool {
        matches!(self, Self::Block | Self::Redirect)
    }

    /// Returns true if this action lets the query through.
    pub fn is_allowing(&self) -> bool {
        matches!(self, Self::Allow | Self::Log)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allow => write!(f, "allow"),
            Self::Block => write!(f, "block"),
            Self::Redirect => write!(f, "redirect"),
            Self::Log => write!(f, "log"),
        }
    }
}

/// A filter rule.
///
/// Rules are immutable once inserted into an engine; replacing the rule at
/// a domain is a remove followed by an insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Numeric rule id.
    pub id: u32,

    /// Action taken on a match.
    pub action: Action,

    /// Redirect target, used only by [`Action::Redirect`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_ip: Option<Ipv4Addr>,

    /// TTL in seconds for synthesized answers.
    pub ttl: u32,

    /// Short opaque identifier, carried through to logs and results.
    pub tag: CompactString,
}

impl Rule {
    /// Creates a new rule with the given id and action.
    pub fn new(id: u32, action: Action) -> Self {
        Self {
            id,
            action,
            redirect_ip: None,
            ttl: DEFAULT_RULE_TTL,
            tag: CompactString::default(),
        }
    }

    /// Creates an allow rule.
    pub fn allow(id: u32) -> Self {
        Self::new(id, Action::Allow)
    }

    /// Creates a block rule.
    pub fn block(id: u32) -> Self {
        Self::new(id, Action::Block)
    }

    /// Creates a redirect rule targeting `ip`.
    pub fn redirect(id: u32, ip: Ipv4Addr) -> Self {
        let mut rule = Self::new(id, Action::Redirect);
        rule.redirect_ip = Some(ip);
        rule
    }

    /// Creates a log rule.
    pub fn log(id: u32) -> Self {
        Self::new(id, Action::Log)
    }

    /// Sets the answer TTL.
    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }

    /// Sets the rule tag, truncated to [`MAX_TAG_LENGTH`] bytes.
    pub fn with_tag(mut self, tag: impl AsRef<str>) -> Self {
        let tag = tag.as_ref();
        let end = tag
            .char_indices()
            .map(|(i, c)| i + c.len_utf8())
            .take_while(|&end| end <= MAX_TAG_LENGTH)
            .last()
            .unwrap_or(0);
        self.tag = CompactString::from(&tag[..end]);
        self
    }
}
