use std::collections::HashMap;

use uuid::Uuid;

use gallows_common::lobby::LeaderboardEntry;

/// Wins per player across every room, for the lifetime of the process.
/// Rows keep the order players were first seen in, so ties rank by who
/// showed up first.
#[derive(Debug, Default)]
pub struct WinLedger {
    rows: Vec<LeaderboardEntry>,
    index: HashMap<Uuid, usize>,
}

impl WinLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn wins(&self, player_id: Uuid) -> u32 {
        self.index
            .get(&player_id)
            .map(|&i| self.rows[i].wins)
            .unwrap_or(0)
    }

    /// Stores the latest count and name for a player.
    pub fn record(&mut self, player_id: Uuid, name: &str, wins: u32) {
        match self.index.get(&player_id) {
            Some(&i) => {
                let row = &mut self.rows[i];
                row.wins = wins;
                if row.name != name {
                    row.name = name.to_string();
                }
            }
            None => {
                self.index.insert(player_id, self.rows.len());
                self.rows.push(LeaderboardEntry {
                    player_id,
                    name: name.to_string(),
                    wins,
                });
            }
        }
    }

    pub fn top(&self, limit: usize) -> Vec<LeaderboardEntry> {
        let mut rows = self.rows.clone();
        // stable: equal counts keep first-seen order
        rows.sort_by(|a, b| b.wins.cmp(&a.wins));
        rows.truncate(limit);
        rows
    }
}
