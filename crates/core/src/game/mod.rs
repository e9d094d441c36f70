pub mod runner;
pub mod state;

pub use runner::TICK_INTERVAL;
pub use state::{CONFIDENCE_THRESHOLD, GameState, GameStatus, ROUND_DURATION_SECS, Round};
