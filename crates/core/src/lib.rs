//! # spot-game-core
//!
//! A timed "spot the object" game. Each round asks for one item from a fixed
//! catalog; a background loop polls a detector once a second and scores when
//! the item shows up on camera with enough confidence.

pub mod catalog;
pub mod config;
pub mod controller;
pub mod detector;
pub mod error;
pub mod game;
pub mod observer;
pub mod resource;

pub use catalog::Item;
pub use config::{Attributes, GameConfig};
pub use controller::GameController;
pub use detector::{Dependencies, Detector};
pub use error::{DetectionError, GameError, Result};
pub use game::{GameState, GameStatus};
pub use observer::{GameEvent, GameObserver, TracingObserver};
pub use resource::Button;

// Re-export the wire types the public API is written in
pub use game_api_types as api;
