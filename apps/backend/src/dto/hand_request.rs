use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A hand as entered by a player, before validation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandRequest {
    pub taker_user_id: Uuid,
    pub contract: String,
    #[serde(default)]
    pub trump: Option<String>,
    pub score_team_a: i32, // raw card points made by team A
    pub score_team_b: i32,
    #[serde(default)]
    pub coinche: bool,
    #[serde(default)]
    pub surcoinche: bool,
    #[serde(default)]
    pub general: bool,
    #[serde(default)]
    pub belote_a: u8,
    #[serde(default)]
    pub belote_b: u8,
}
