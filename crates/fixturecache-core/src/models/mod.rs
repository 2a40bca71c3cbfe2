//! Data models for fixturecache entities.
//!
//! This module contains the data structures served by the remote API and
//! stored in the local cache:
//!
//! - `Category`: The fixed set of cached resource kinds
//! - `Resource`: Trait tying an entity type to its category
//! - `Game`: A football fixture (the only time-filtered category)
//! - `Race`: An F1 calendar session
//! - `EpicGame`: A free Epic Games Store listing

pub mod category;
pub mod epic_game;
pub mod game;
pub mod race;

pub use category::{Category, Resource};
pub use epic_game::EpicGame;
pub use game::Game;
pub use race::Race;
