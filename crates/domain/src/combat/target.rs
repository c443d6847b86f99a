use std::collections::BTreeSet;

use serde::Serialize;

use crate::ids::UserId;

/// Who an action is aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "user_id", rename_all = "snake_case")]
pub enum Target {
    Monster,
    Own,
    Ally(UserId),
}

/// Resolves free-form target input.
///
/// Empty, `monster` and `enemy` aim at the monster; `self`, `me` or the
/// actor's own id aim at the actor; a participant's id or mention aims at that
/// ally. Anything else falls back to the monster.
pub fn resolve_target(raw: Option<&str>, actor: UserId, participants: &BTreeSet<UserId>) -> Target {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Target::Monster;
    };
    match raw.to_lowercase().as_str() {
        "monster" | "enemy" => return Target::Monster,
        "self" | "me" => return Target::Own,
        _ => {}
    }
    match UserId::parse_mention(raw) {
        Some(user) if user == actor => Target::Own,
        Some(user) if participants.contains(&user) => Target::Ally(user),
        _ => Target::Monster,
    }
}
