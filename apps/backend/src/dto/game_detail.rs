use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::games::GameState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameDetail {
    pub game: GameInfo,
    pub team_a: Vec<PlayerEntry>,
    pub team_b: Vec<PlayerEntry>,
    pub hands: Vec<HandEntry>,
    pub can_add_hand: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameInfo {
    pub id: Uuid,
    pub created_by: Uuid,
    pub state: GameState,
    pub score_a: i32,
    pub score_b: i32,
    pub target_points: i32,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerEntry {
    pub user_id: Uuid,
    pub name: String,
    pub team: String,
    pub position: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandEntry {
    pub id: Uuid,
    pub number: i32,
    pub taker_user_id: Option<Uuid>,
    pub taker_name: Option<String>,
    pub contract: String,
    pub trump: Option<String>,
    pub score_a: i32,
    pub score_b: i32,
    pub points_made_a: i32,
    pub points_made_b: i32,
    pub coinche: bool,
    pub surcoinche: bool,
    pub general: bool,
    pub belote_a: i32,
    pub belote_b: i32,
    pub capot_team: Option<String>,
    pub cumulative_a: i32, // running total after this hand
    pub cumulative_b: i32,
    pub created_at: DateTime<FixedOffset>,
}
