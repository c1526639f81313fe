use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::games::GameState;

/// One row of the games list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSummary {
    pub id: Uuid,
    pub state: GameState,
    pub score_a: i32,
    pub score_b: i32,
    pub target_points: i32,
    pub team_a: Vec<String>,
    pub team_b: Vec<String>,
    pub is_player_in_game: bool,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}
