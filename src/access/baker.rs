//! Role baking
//!
//! Compiles author-supplied role definitions into immutable [`BakedRole`]s
//! once at startup. Baking is fail-skip: an invalid rule drops that rule,
//! an invalid role drops that role, and nothing halts the process. A
//! dropped role grants nothing, so degradation is always toward denial.
//!
//! A single malformed user pattern invalidates the whole role, not just the
//! pattern: a partially matchable identity predicate could silently narrow
//! who a role applies to.

use crate::access::pattern::Pattern;
use crate::access::types::{BakedRole, BakedRule, System, Verb};
use crate::config::{RoleConfig, RuleConfig};
use std::sync::Arc;
use tracing::warn;

/// Compile role definitions into baked roles
///
/// Runs once, synchronously, before request handling begins. Diagnostics
/// for dropped entries go to the log; they never become errors.
pub fn bake(roles: &[RoleConfig]) -> Vec<BakedRole> {
    roles.iter().filter_map(bake_role).collect()
}

fn bake_role(role: &RoleConfig) -> Option<BakedRole> {
    if role.rules.is_empty() {
        warn!(role = %role.name, "skipping role since rules are empty");
        return None;
    }

    if role.users.is_empty() {
        warn!(role = %role.name, "skipping role since users are empty");
        return None;
    }

    let mut users = Vec::with_capacity(role.users.len());
    for pattern in &role.users {
        match Pattern::compile(pattern) {
            Ok(compiled) => users.push(compiled),
            Err(err) => {
                warn!(role = %role.name, pattern = %pattern, error = %err,
                    "failed to compile role's user pattern");
                return None;
            }
        }
    }

    let rules: Vec<Arc<BakedRule>> = role
        .rules
        .iter()
        .filter_map(|rule| bake_rule(&role.name, rule))
        .map(Arc::new)
        .collect();

    if rules.is_empty() {
        warn!(role = %role.name, "skipping role since no rules survived");
        return None;
    }

    Some(BakedRole {
        name: role.name.clone(),
        users,
        rules,
    })
}

fn bake_rule(role_name: &str, rule: &RuleConfig) -> Option<BakedRule> {
    if rule.resources.is_empty() {
        warn!(role = %role_name, "skipping rule since resources are empty");
        return None;
    }

    let mut resources = Vec::with_capacity(rule.resources.len());
    for pattern in &rule.resources {
        match Pattern::compile(pattern) {
            Ok(compiled) => resources.push(compiled),
            Err(err) => {
                warn!(role = %role_name, pattern = %pattern, error = %err,
                    "failed to compile rule's resource pattern");
                return None;
            }
        }
    }

    let Some(system) = System::try_parse(&rule.system) else {
        warn!(role = %role_name, system = %rule.system,
            "skipping rule since system is unknown");
        return None;
    };

    let mut allows_get = false;
    let mut allows_command = false;
    let mut allows_history = false;
    for tag in &rule.verbs {
        match Verb::try_parse(tag) {
            Some(Verb::All) => {
                allows_get = true;
                allows_command = true;
                allows_history = true;
            }
            Some(Verb::Get) => allows_get = true,
            Some(Verb::Command) => allows_command = true,
            Some(Verb::History) => allows_history = true,
            None => {
                warn!(role = %role_name, verb = %tag,
                    "skipping rule since verb is unknown");
                return None;
            }
        }
    }

    Some(BakedRule {
        system,
        resources,
        allows_get,
        allows_command,
        allows_history,
    })
}
