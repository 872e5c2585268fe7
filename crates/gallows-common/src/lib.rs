pub mod game;
pub mod lobby;
pub mod normalize;
pub mod player;
pub mod protocol;
pub mod turn;
pub mod words;
