//! Wire types shared between the game core and its host adapter.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A generic `do_command` payload: command name mapped to its argument.
pub type Command = Map<String, Value>;

/// A generic `do_command` response. Unknown commands answer with an empty map.
pub type CommandResponse = Map<String, Value>;

pub const ACTION_KEY: &str = "action";
pub const GET_DATA_ACTION: &str = "get_data";

/// Rendered in place of `time_round_start` while no round is running.
pub const ROUND_START_ABSENT: &str = "None";

/// One labelled result returned by a detector for a single camera query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    #[serde(alias = "class_name")]
    pub label: String,
    pub confidence: f64,
}

impl Detection {
    pub fn new(label: impl Into<String>, confidence: f64) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }
}

/// A box in the resource's frame. Part of the button interface; the game
/// itself has no geometry to report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub label: String,
    pub center_mm: [f64; 3],
    pub dims_mm: [f64; 3],
}

/// The `get_data` answer, flattened to plain values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameData {
    pub score: u32,
    pub time_round_start: String,
    pub item_to_detect: String,
}

impl GameData {
    pub fn into_response(self) -> CommandResponse {
        match serde_json::to_value(self) {
            Ok(Value::Object(response)) => response,
            _ => CommandResponse::new(),
        }
    }
}

/// Returns true when `command` carries `{"action": "get_data"}`.
pub fn is_get_data(command: &Command) -> bool {
    command
        .iter()
        .any(|(name, arg)| name == ACTION_KEY && arg.as_str() == Some(GET_DATA_ACTION))
}
