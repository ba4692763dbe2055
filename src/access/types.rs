//! Core access control types
//!
//! Authoring-time role shapes live in [`crate::config`]; this module holds
//! the baked runtime forms plus the system/verb vocabulary shared by both.

use crate::access::pattern::Pattern;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Coarse partition of protectable resources a rule applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum System {
    /// Applies to every system
    #[serde(rename = "*")]
    All,
    /// The device subsystem
    Device,
}

impl System {
    /// Get the system tag as a string
    pub const fn as_str(&self) -> &'static str {
        match self {
            System::All => "*",
            System::Device => "device",
        }
    }

    /// Try to parse a system tag
    pub fn try_parse(s: &str) -> Option<Self> {
        match s {
            "*" => Some(System::All),
            "device" => Some(System::Device),
            _ => None,
        }
    }
}

impl fmt::Display for System {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An action category a rule permits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verb {
    /// Every verb at once
    #[serde(rename = "*")]
    All,
    /// Read current state
    Get,
    /// Execute a command
    Command,
    /// Read state history
    History,
}

impl Verb {
    /// Get the verb tag as a string
    pub const fn as_str(&self) -> &'static str {
        match self {
            Verb::All => "*",
            Verb::Get => "get",
            Verb::Command => "command",
            Verb::History => "history",
        }
    }

    /// Try to parse a verb tag
    pub fn try_parse(s: &str) -> Option<Self> {
        match s {
            "*" => Some(Verb::All),
            "get" => Some(Verb::Get),
            "command" => Some(Verb::Command),
            "history" => Some(Verb::History),
            _ => None,
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single compiled access rule
///
/// Produced by the baker from a rule definition; immutable for the process
/// lifetime. The universal verb tag sets all three flags.
#[derive(Debug)]
pub struct BakedRule {
    /// System this rule applies to
    pub system: System,
    /// Compiled resource patterns (non-empty)
    pub resources: Vec<Pattern>,
    /// Grants the `get` verb
    pub allows_get: bool,
    /// Grants the `command` verb
    pub allows_command: bool,
    /// Grants the `history` verb
    pub allows_history: bool,
}

impl BakedRule {
    /// Whether this rule grants the given verb
    pub const fn allows(&self, verb: Verb) -> bool {
        match verb {
            Verb::All => self.allows_get && self.allows_command && self.allows_history,
            Verb::Get => self.allows_get,
            Verb::Command => self.allows_command,
            Verb::History => self.allows_history,
        }
    }

    /// Whether any resource pattern matches the resource
    pub fn matches_resource(&self, resource: &str) -> bool {
        self.resources.iter().any(|p| p.matches(resource))
    }
}

/// A compiled role: user predicates plus surviving rules
#[derive(Debug)]
pub struct BakedRole {
    /// Name from the role definition (diagnostics only)
    pub name: String,
    /// Compiled user patterns (non-empty)
    pub users: Vec<Pattern>,
    /// Rules that survived baking (non-empty)
    pub rules: Vec<Arc<BakedRule>>,
}

impl BakedRole {
    /// Whether any user pattern matches the username
    pub fn matches_user(&self, username: &str) -> bool {
        self.users.iter().any(|p| p.matches(username))
    }
}

/// A resolved caller with the merged grants of every matching role
///
/// Built fresh per resolution, never cached across requests. An empty grant
/// mapping is a valid state: authenticated, authorized for nothing.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// Resolved username
    pub username: String,
    /// Merged rules keyed by system
    pub rules: HashMap<System, Vec<Arc<BakedRule>>>,
}

impl AuthenticatedUser {
    /// Whether this identity may apply `verb` to `resource` within `system`
    ///
    /// Checks the rules granted under `system` and under the universal
    /// system. Pure and side-effect-free.
    pub fn is_allowed(&self, system: System, resource: &str, verb: Verb) -> bool {
        [system, System::All]
            .iter()
            .filter_map(|s| self.rules.get(s))
            .flatten()
            .any(|rule| rule.allows(verb) && rule.matches_resource(resource))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(system: System, resource: &str, verbs: (bool, bool, bool)) -> BakedRule {
        BakedRule {
            system,
            resources: vec![Pattern::compile(resource).unwrap()],
            allows_get: verbs.0,
            allows_command: verbs.1,
            allows_history: verbs.2,
        }
    }

    #[test]
    fn test_system_tag_roundtrip() {
        for system in [System::All, System::Device] {
            assert_eq!(System::try_parse(system.as_str()), Some(system));
        }
        assert_eq!(System::try_parse("wrong"), None);
    }

    #[test]
    fn test_verb_tag_roundtrip() {
        for verb in [Verb::All, Verb::Get, Verb::Command, Verb::History] {
            assert_eq!(Verb::try_parse(verb.as_str()), Some(verb));
        }
        assert_eq!(Verb::try_parse("delete"), None);
    }

    #[test]
    fn test_rule_verb_flags() {
        let r = rule(System::Device, "res", (true, false, true));
        assert!(r.allows(Verb::Get));
        assert!(!r.allows(Verb::Command));
        assert!(r.allows(Verb::History));
        assert!(!r.allows(Verb::All));
    }

    #[test]
    fn test_universal_system_rules_apply_everywhere() {
        let mut rules = HashMap::new();
        rules.insert(
            System::All,
            vec![Arc::new(rule(System::All, "res", (true, true, true)))],
        );
        let user = AuthenticatedUser {
            username: "alice".into(),
            rules,
        };

        assert!(user.is_allowed(System::Device, "res", Verb::Command));
        assert!(!user.is_allowed(System::Device, "other", Verb::Get));
    }

    #[test]
    fn test_empty_grants_deny_everything() {
        let user = AuthenticatedUser {
            username: "nobody".into(),
            rules: HashMap::new(),
        };
        assert!(!user.is_allowed(System::Device, "res", Verb::Get));
        assert!(!user.is_allowed(System::All, "res", Verb::Get));
    }

    #[test]
    fn test_deserialize_system_and_verb_tags() {
        let system: System = serde_json::from_str(r#""*""#).unwrap();
        assert_eq!(system, System::All);
        let system: System = serde_json::from_str(r#""device""#).unwrap();
        assert_eq!(system, System::Device);

        let verb: Verb = serde_json::from_str(r#""command""#).unwrap();
        assert_eq!(verb, Verb::Command);
    }
}
