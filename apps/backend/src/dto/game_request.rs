use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// New game: `players[0..2]` form team A, `players[2..4]` team B
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGameRequest {
    pub players: [Uuid; 4],
    pub target_points: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetPointsRequest {
    pub target_points: i32,
}
