//! Core run-progression engine. Keep this crate free of IO and platform concerns.

pub mod cards;
pub mod config;
pub mod deck;
pub mod economy;
pub mod events;
pub mod hand;
pub mod jokers;
pub mod map;
pub mod rng;
pub mod rules;
pub mod run;
pub mod scoring;
pub mod shop;
pub mod state;

pub use cards::*;
pub use config::*;
pub use deck::*;
pub use economy::*;
pub use events::*;
pub use hand::*;
pub use jokers::*;
pub use map::*;
pub use rng::*;
pub use rules::*;
pub use run::*;
pub use scoring::*;
pub use shop::*;
pub use state::*;
