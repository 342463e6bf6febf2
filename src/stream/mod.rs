//! Local playback

pub mod player;

pub use player::{LocalPlayer, PlayerError, PlayerType};
