use chrono::{DateTime, Local, TimeDelta};
use game_api_types::{Detection, GameData, ROUND_START_ABSENT};

use crate::catalog::Item;

/// How long a round stays open, boundary included.
pub const ROUND_DURATION_SECS: i64 = 60;

/// A detection only counts when its confidence is strictly above this.
pub const CONFIDENCE_THRESHOLD: f64 = 0.5;

const STATUS_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Round {
    pub started_at: DateTime<Local>,
    pub item: Item,
}

impl Round {
    pub fn new(started_at: DateTime<Local>, item: Item) -> Self {
        Self { started_at, item }
    }

    pub fn is_active(&self, now: DateTime<Local>) -> bool {
        now - self.started_at <= TimeDelta::seconds(ROUND_DURATION_SECS)
    }
}

/// Score plus the round in progress, if any.
///
/// Every transition returns a whole new value so the loop can publish it with
/// a single write.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameState {
    pub score: u32,
    pub round: Option<Round>,
}

impl GameState {
    pub fn is_round_active(&self, now: DateTime<Local>) -> bool {
        self.round.is_some_and(|round| round.is_active(now))
    }

    pub fn new_game(&self, now: DateTime<Local>, item: Item) -> Self {
        Self {
            score: 0,
            round: Some(Round::new(now, item)),
        }
    }

    /// Next round after a successful detection. Keeps the running score.
    pub fn scored(&self, now: DateTime<Local>, item: Item) -> Self {
        Self {
            score: self.score.saturating_add(1),
            round: Some(Round::new(now, item)),
        }
    }

    pub fn round_over(&self) -> Self {
        Self {
            score: self.score,
            round: None,
        }
    }

    pub fn status(&self) -> GameStatus {
        GameStatus {
            score: self.score,
            round_start: self.round.map(|round| round.started_at),
            item_to_detect: self
                .round
                .map(|round| round.item.label().to_owned())
                .unwrap_or_default(),
        }
    }
}

pub fn is_target_detected(detections: &[Detection], item: Item) -> bool {
    detections.iter().any(|detection| {
        detection.label == item.label() && detection.confidence > CONFIDENCE_THRESHOLD
    })
}

/// Read-only snapshot handed out by status queries.
#[derive(Debug, Clone, PartialEq)]
pub struct GameStatus {
    pub score: u32,
    pub round_start: Option<DateTime<Local>>,
    /// Empty while no round is running.
    pub item_to_detect: String,
}

impl GameStatus {
    pub fn to_data(&self) -> GameData {
        GameData {
            score: self.score,
            time_round_start: self
                .round_start
                .map(|at| at.format(STATUS_TIME_FORMAT).to_string())
                .unwrap_or_else(|| ROUND_START_ABSENT.to_owned()),
            item_to_detect: self.item_to_detect.clone(),
        }
    }
}
