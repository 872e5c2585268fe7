use std::collections::HashMap;

use rand::Rng;

use gallows_common::game::{GameRules, RoomVariant};
use gallows_common::lobby::{RoomCode, RoomInfo};

use crate::room::Room;

pub struct LobbyManager {
    pub rooms: HashMap<RoomCode, Room>,
}

impl LobbyManager {
    pub fn new() -> Self {
        Self {
            rooms: HashMap::new(),
        }
    }

    /// Opens a room under a code no other live room uses.
    pub fn create_room<R: Rng + ?Sized>(
        &mut self,
        variant: RoomVariant,
        rules: GameRules,
        rng: &mut R,
    ) -> RoomCode {
        let code = loop {
            let candidate = RoomCode::generate(rng);
            if !self.rooms.contains_key(&candidate) {
                break candidate;
            }
        };
        self.rooms
            .insert(code.clone(), Room::new(code.clone(), variant, rules));
        code
    }

    pub fn list_rooms(&self) -> Vec<RoomInfo> {
        let mut rooms: Vec<RoomInfo> = self.rooms.values().map(|r| r.info()).collect();
        rooms.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        rooms
    }

    pub fn get_room(&self, code: &RoomCode) -> Option<&Room> {
        self.rooms.get(code)
    }

    pub fn get_room_mut(&mut self, code: &RoomCode) -> Option<&mut Room> {
        self.rooms.get_mut(code)
    }

    pub fn remove_room(&mut self, code: &RoomCode) {
        if self.rooms.remove(code).is_some() {
            tracing::info!("Room {} closed", code);
        }
    }

    pub fn prune_empty_rooms(&mut self) {
        self.rooms.retain(|_, r| !r.is_empty());
    }
}
