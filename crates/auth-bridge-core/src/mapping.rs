// Mapping-list configuration: textual `left|right` lines parsed into
// ordered pairs. Used for both claim→field and claim-value→role mappings.

use serde::{Deserialize, Serialize};

/// One configured mapping pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingPair {
    pub from: String,
    pub to: String,
}

impl MappingPair {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Account fields owned by the bridge's built-in handling. Claim mappings
/// targeting these are always ignored, regardless of configuration.
pub const PROTECTED_FIELDS: [&str; 7] = ["uid", "name", "mail", "init", "is_new", "status", "pass"];

pub fn is_protected_field(name: &str) -> bool {
    PROTECTED_FIELDS.contains(&name)
}

/// Parse a mapping blob into ordered pairs. Each line must contain exactly
/// one `|`; values are trimmed. Blank and malformed lines are dropped
/// silently; misconfiguration of a single line never fails a login.
pub fn parse_pipe_list(text: &str) -> Vec<MappingPair> {
    let mut pairs = Vec::new();
    for line in text.lines() {
        let parts: Vec<&str> = line.trim().split('|').collect();
        if parts.len() == 2 {
            pairs.push(MappingPair::new(parts[0].trim(), parts[1].trim()));
        }
    }
    pairs
}

/// Serialize pairs back to the textual form. Round-trips through
/// `parse_pipe_list` to the same pair list.
pub fn to_pipe_list(pairs: &[MappingPair]) -> String {
    pairs
        .iter()
        .map(|p| format!("{}|{}", p.from, p.to))
        .collect::<Vec<_>>()
        .join("\n")
}
