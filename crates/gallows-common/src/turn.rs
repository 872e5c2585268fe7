//! Turn order policy.
//!
//! Every function here is pure: the answer depends only on the roster (in
//! join order), the round host and, where relevant, the player the turn is
//! moving away from.

use uuid::Uuid;

use crate::player::Player;

/// Roster minus the round host, in join order.
pub fn eligible_guessers(roster: &[Player], host_id: Option<Uuid>) -> Vec<Uuid> {
    roster
        .iter()
        .map(|p| p.id)
        .filter(|id| Some(*id) != host_id)
        .collect()
}

pub fn first_guesser(roster: &[Player], host_id: Option<Uuid>) -> Option<Uuid> {
    eligible_guessers(roster, host_id).first().copied()
}

/// The guesser after `after`, wrapping around. When `after` is no longer
/// eligible (departed, or became host) the turn restarts at the first
/// guesser.
pub fn next_guesser(roster: &[Player], host_id: Option<Uuid>, after: Uuid) -> Option<Uuid> {
    let guessers = eligible_guessers(roster, host_id);
    if guessers.is_empty() {
        return None;
    }
    let next = match guessers.iter().position(|id| *id == after) {
        Some(idx) => (idx + 1) % guessers.len(),
        None => 0,
    };
    Some(guessers[next])
}

/// The roster member after `after`, wrapping, host included. Used when the
/// next round host is picked by seat rather than by rotation history.
pub fn next_in_roster(roster: &[Player], after: Option<Uuid>) -> Option<Uuid> {
    if roster.is_empty() {
        return None;
    }
    let next = after
        .and_then(|id| roster.iter().position(|p| p.id == id))
        .map(|idx| (idx + 1) % roster.len())
        .unwrap_or(0);
    Some(roster[next].id)
}
