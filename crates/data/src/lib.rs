//! Loading and validation of game tuning from JSON.

pub mod load;

pub use load::*;
