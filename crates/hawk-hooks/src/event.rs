//! Canonical hook event vocabulary.
//!
//! Host tools use differing event names; hooks declare canonical names
//! (or known aliases) and each adapter maps canonical events to its
//! tool's native vocabulary.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Events a hook can subscribe to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum HookEvent {
    PreToolUse,
    PostToolUse,
    Stop,
    SubagentStop,
    Notification,
    UserPromptSubmit,
    SessionStart,
    SessionEnd,
    PreCompact,
}

/// All events, in runner-generation order.
pub const ALL_EVENTS: [HookEvent; 9] = [
    HookEvent::PreToolUse,
    HookEvent::PostToolUse,
    HookEvent::Stop,
    HookEvent::SubagentStop,
    HookEvent::Notification,
    HookEvent::UserPromptSubmit,
    HookEvent::SessionStart,
    HookEvent::SessionEnd,
    HookEvent::PreCompact,
];

impl HookEvent {
    /// Canonical snake_case name; also the runner file stem
    /// (`<event>.sh`).
    pub fn as_str(&self) -> &'static str {
        match self {
            HookEvent::PreToolUse => "pre_tool_use",
            HookEvent::PostToolUse => "post_tool_use",
            HookEvent::Stop => "stop",
            HookEvent::SubagentStop => "subagent_stop",
            HookEvent::Notification => "notification",
            HookEvent::UserPromptSubmit => "user_prompt_submit",
            HookEvent::SessionStart => "session_start",
            HookEvent::SessionEnd => "session_end",
            HookEvent::PreCompact => "pre_compact",
        }
    }

    /// Runner script file name for this event.
    pub fn runner_file_name(&self) -> String {
        format!("{}.sh", self.as_str())
    }

    /// Normalize a declared token to a canonical event.
    ///
    /// Accepts canonical names plus known aliases, case-insensitively,
    /// with `-` treated as `_`. Returns `None` for unknown tokens; the
    /// caller decides whether to diagnose.
    pub fn from_token(token: &str) -> Option<Self> {
        let normalized = token.trim().to_ascii_lowercase().replace('-', "_");
        let event = match normalized.as_str() {
            "pre_tool_use" | "pre_tool" => HookEvent::PreToolUse,
            "post_tool_use" | "post_tool" => HookEvent::PostToolUse,
            "stop" => HookEvent::Stop,
            "subagent_stop" | "agent_stop" => HookEvent::SubagentStop,
            "notification" => HookEvent::Notification,
            "user_prompt_submit" | "user_prompt" => HookEvent::UserPromptSubmit,
            "session_start" => HookEvent::SessionStart,
            "session_end" | "session_stop" => HookEvent::SessionEnd,
            "pre_compact" | "compact" => HookEvent::PreCompact,
            _ => return None,
        };
        Some(event)
    }
}

impl fmt::Display for HookEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HookEvent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HookEvent::from_token(s).ok_or_else(|| format!("unknown hook event '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_names_roundtrip() {
        for event in ALL_EVENTS {
            assert_eq!(HookEvent::from_token(event.as_str()), Some(event));
        }
    }

    #[test]
    fn test_aliases_normalize() {
        assert_eq!(HookEvent::from_token("pre_tool"), Some(HookEvent::PreToolUse));
        assert_eq!(HookEvent::from_token("post_tool"), Some(HookEvent::PostToolUse));
        assert_eq!(
            HookEvent::from_token("user_prompt"),
            Some(HookEvent::UserPromptSubmit)
        );
        assert_eq!(HookEvent::from_token("session_stop"), Some(HookEvent::SessionEnd));
        assert_eq!(HookEvent::from_token("compact"), Some(HookEvent::PreCompact));
        assert_eq!(HookEvent::from_token("agent_stop"), Some(HookEvent::SubagentStop));
    }

    #[test]
    fn test_case_and_hyphens_tolerated() {
        assert_eq!(
            HookEvent::from_token("Pre-Tool-Use"),
            Some(HookEvent::PreToolUse)
        );
        assert_eq!(HookEvent::from_token(" stop "), Some(HookEvent::Stop));
    }

    #[test]
    fn test_unknown_token_is_none() {
        assert_eq!(HookEvent::from_token("on_save"), None);
        assert_eq!(HookEvent::from_token(""), None);
    }

    #[test]
    fn test_runner_file_name() {
        assert_eq!(HookEvent::Stop.runner_file_name(), "stop.sh");
        assert_eq!(
            HookEvent::PreToolUse.runner_file_name(),
            "pre_tool_use.sh"
        );
    }

    #[test]
    fn test_all_names_unique_and_snake_case() {
        let mut seen = std::collections::HashSet::new();
        for event in ALL_EVENTS {
            let name = event.as_str();
            assert!(seen.insert(name), "duplicate event name {name}");
            assert!(
                name.chars().all(|c| c.is_ascii_lowercase() || c == '_'),
                "event name {name:?} is not snake_case"
            );
        }
        assert_eq!(seen.len(), 9);
    }

    #[test]
    fn test_serde_snake_case() {
        let yaml = serde_yaml::to_string(&HookEvent::PreToolUse).unwrap();
        assert_eq!(yaml.trim(), "pre_tool_use");
        let parsed: HookEvent = serde_yaml::from_str("subagent_stop").unwrap();
        assert_eq!(parsed, HookEvent::SubagentStop);
    }
}
