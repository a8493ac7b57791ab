use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;

/// Fantasy bookkeeping owned by exactly one player.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct MatchRecord {
    pub id: i64,
    pub player_id: i64,
    pub matches: Json<Vec<i64>>,
    pub prev_xi: bool,
    pub current_xi: bool,
    pub next_xi: bool,
    pub earned_points: i64,
    pub benched_points: i64,
    pub total_points: i64,
    pub prev_total_points: i64,
    pub prev_earned_points: i64,
    pub prev_benched_points: i64,
}
