// ABOUTME: Agent persona selector for chat conversations (SDR or Copilot)
// ABOUTME: Closed enum with the backend wire names and lenient parsing for user-supplied values
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 DOM360

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Agent persona a conversation is held with
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgentType {
    /// Lead qualification persona
    #[default]
    Sdr,
    /// Support assistant persona
    Copilot,
}

impl AgentType {
    /// Wire name sent in `agent_type`
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sdr => "SDR",
            Self::Copilot => "COPILOT",
        }
    }

    /// Parse a wire name; anything other than `SDR` or `COPILOT` is rejected
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "SDR" => Some(Self::Sdr),
            "COPILOT" => Some(Self::Copilot),
            _ => None,
        }
    }
}

impl fmt::Display for AgentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown agent type '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names() {
        assert_eq!(serde_json::to_string(&AgentType::Sdr).unwrap(), "\"SDR\"");
        assert_eq!(
            serde_json::to_string(&AgentType::Copilot).unwrap(),
            "\"COPILOT\""
        );
    }

    #[test]
    fn test_parse_is_exact() {
        assert_eq!(AgentType::parse("COPILOT"), Some(AgentType::Copilot));
        assert_eq!(AgentType::parse("copilot"), None);
        assert!("SUPPORT".parse::<AgentType>().is_err());
    }
}
