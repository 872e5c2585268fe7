pub mod connect;
pub mod gallows_widget;
pub mod game;
pub mod help_popup;
pub mod keyboard_widget;
pub mod lobby;
pub mod ranking_widget;
pub mod results;
