//! Where the game reports what happened during a tick.

use chrono::{DateTime, Local};

use crate::catalog::Item;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    GameStarted { at: DateTime<Local>, item: Item },
    Detected { item: Item, score: u32 },
    NotDetected { item: Item },
    RoundStarted { at: DateTime<Local>, item: Item },
    RoundOver { at: DateTime<Local>, final_score: u32 },
    TickFailed { error: String },
    LoopStopped,
}

pub trait GameObserver: Send + Sync {
    fn on_event(&self, event: &GameEvent);
}

/// Forwards every game event to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl GameObserver for TracingObserver {
    fn on_event(&self, event: &GameEvent) {
        match event {
            GameEvent::GameStarted { at, item } => {
                tracing::info!(started_at = %at.format(TIME_FORMAT), %item, "game is starting");
            }
            GameEvent::Detected { item, score } => {
                tracing::info!(%item, score, "item detected");
            }
            GameEvent::NotDetected { item } => {
                tracing::debug!(%item, "item not detected");
            }
            GameEvent::RoundStarted { at, item } => {
                tracing::info!(started_at = %at.format(TIME_FORMAT), %item, "starting new round");
            }
            GameEvent::RoundOver { at, final_score } => {
                tracing::info!(ended_at = %at.format(TIME_FORMAT), final_score, "round over");
            }
            GameEvent::TickFailed { error } => {
                tracing::error!(%error, "game state processing error");
            }
            GameEvent::LoopStopped => {
                tracing::info!("game loop cancelled");
            }
        }
    }
}
