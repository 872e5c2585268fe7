use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A roster entry. The roster keeps players in join order, which is also the
/// order guessers take turns in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Player {
    pub id: Uuid,
    pub name: String,
    /// Rounds won in this room.
    pub wins: u32,
    /// Rounds won across every room on this server.
    pub global_wins: u32,
}

impl Player {
    pub fn new(id: Uuid, name: String) -> Self {
        Self {
            id,
            name,
            wins: 0,
            global_wins: 0,
        }
    }

    pub fn with_global_wins(mut self, global_wins: u32) -> Self {
        self.global_wins = global_wins;
        self
    }

    pub fn award_win(&mut self) {
        self.wins += 1;
        self.global_wins += 1;
    }

    /// Penalty for a wrong full-word guess. Both counters floor at zero
    /// independently.
    pub fn forfeit_win(&mut self) {
        self.wins = self.wins.saturating_sub(1);
        self.global_wins = self.global_wins.saturating_sub(1);
    }
}

/// Players ordered for a leaderboard: most room wins first, ties keep join
/// order.
pub fn ranking(players: &[Player]) -> Vec<&Player> {
    let mut ranked: Vec<&Player> = players.iter().collect();
    ranked.sort_by(|a, b| b.wins.cmp(&a.wins));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> Player {
        Player::new(Uuid::new_v4(), name.into())
    }

    #[test]
    fn test_award_increments_both_counters() {
        let mut p = named("Ana").with_global_wins(4);
        p.award_win();
        assert_eq!(p.wins, 1);
        assert_eq!(p.global_wins, 5);
    }

    #[test]
    fn test_forfeit_floors_each_counter_at_zero() {
        let mut p = named("Ana").with_global_wins(2);
        p.forfeit_win();
        assert_eq!(p.wins, 0);
        assert_eq!(p.global_wins, 1);

        p.forfeit_win();
        p.forfeit_win();
        assert_eq!(p.wins, 0);
        assert_eq!(p.global_wins, 0);
    }

    #[test]
    fn test_ranking_is_stable_for_ties() {
        let mut a = named("A");
        let b = named("B");
        let mut c = named("C");
        a.wins = 1;
        c.wins = 3;
        let players = vec![a, b.clone(), c];
        let ranked: Vec<&str> = ranking(&players).iter().map(|p| p.name.as_str()).collect();
        assert_eq!(ranked, vec!["C", "A", "B"]);

        let tied = vec![named("X"), named("Y"), named("Z")];
        let ranked: Vec<&str> = ranking(&tied).iter().map(|p| p.name.as_str()).collect();
        assert_eq!(ranked, vec!["X", "Y", "Z"]);
    }
}
